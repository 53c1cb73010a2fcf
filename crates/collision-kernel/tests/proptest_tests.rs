//! Property-based tests for the shape queries using the `proptest` crate.

use nalgebra::{Point3, Vector3};
use proptest::prelude::*;

use collision_kernel::{Capsule, Pose, Primitive, Sphere};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

fn arb_point() -> impl Strategy<Value = (f64, f64, f64)> {
    (-10.0f64..10.0, -10.0f64..10.0, -10.0f64..10.0)
}

fn arb_angle() -> impl Strategy<Value = f64> {
    -std::f64::consts::PI..std::f64::consts::PI
}

fn arb_radius() -> impl Strategy<Value = f64> {
    0.0f64..0.5
}

/// A pose with an arbitrary rotation (z then x then z) and translation.
fn arb_pose() -> impl Strategy<Value = Pose> {
    (arb_point(), arb_angle(), arb_angle(), arb_angle()).prop_map(|((x, y, z), a, b, c)| {
        Pose::translation(x, y, z)
            .then(&Pose::rotation_z(a))
            .then(&Pose::rotation_x(b))
            .then(&Pose::rotation_z(c))
    })
}

fn arb_sphere() -> impl Strategy<Value = Sphere> {
    (arb_pose(), arb_radius()).prop_map(|(pose, r)| Sphere::new(pose, r).unwrap())
}

fn arb_capsule() -> impl Strategy<Value = Capsule> {
    (arb_pose(), 0.1f64..5.0, arb_radius()).prop_map(|(pose, l, r)| Capsule::new(pose, l, r).unwrap())
}

/// Two capsules sharing one length.
fn arb_equal_length_pair() -> impl Strategy<Value = (Capsule, Capsule)> {
    (arb_pose(), arb_pose(), 0.1f64..5.0, arb_radius(), arb_radius()).prop_map(|(pa, pb, l, ra, rb)| {
        (Capsule::new(pa, l, ra).unwrap(), Capsule::new(pb, l, rb).unwrap())
    })
}

const TOL: f64 = 1e-9;

// ---------------------------------------------------------------------------
// 1. Symmetry: distance(A, B) == distance(B, A)
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn capsule_capsule_symmetry(a in arb_capsule(), b in arb_capsule()) {
        let pa = Primitive::Capsule(a);
        let pb = Primitive::Capsule(b);
        let d_ab = pa.shortest_distance(&pb).unwrap();
        let d_ba = pb.shortest_distance(&pa).unwrap();
        prop_assert!((d_ab - d_ba).abs() < TOL, "d(a,b)={} != d(b,a)={}", d_ab, d_ba);
    }

    #[test]
    fn equal_length_capsule_symmetry((a, b) in arb_equal_length_pair()) {
        let ab = a.closest_points_to_capsule(&b).unwrap();
        let ba = b.closest_points_to_capsule(&a).unwrap();
        prop_assert_eq!(ab, ba.swapped());

        let pa = Primitive::Capsule(a);
        let pb = Primitive::Capsule(b);
        let d_ab = pa.shortest_distance(&pb).unwrap();
        let d_ba = pb.shortest_distance(&pa).unwrap();
        prop_assert!((d_ab - d_ba).abs() < TOL, "d(a,b)={} != d(b,a)={}", d_ab, d_ba);
    }

    #[test]
    fn capsule_sphere_symmetry(c in arb_capsule(), s in arb_sphere()) {
        let pc = Primitive::Capsule(c);
        let ps = Primitive::Sphere(s);
        let d_cs = pc.shortest_distance(&ps).unwrap();
        let d_sc = ps.shortest_distance(&pc).unwrap();
        prop_assert!((d_cs - d_sc).abs() < TOL, "d(c,s)={} != d(s,c)={}", d_cs, d_sc);
    }

    #[test]
    fn sphere_sphere_symmetry(a in arb_sphere(), b in arb_sphere()) {
        let pa = Primitive::Sphere(a);
        let pb = Primitive::Sphere(b);
        prop_assert!((pa.shortest_distance(&pb).unwrap() - pb.shortest_distance(&pa).unwrap()).abs() < TOL);
    }
}

// ---------------------------------------------------------------------------
// 2. Closed forms
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn sphere_sphere_closed_form(d in 0.0f64..100.0, r1 in arb_radius(), r2 in arb_radius()) {
        let a = Sphere::new(Pose::identity(), r1).unwrap();
        let b = Primitive::Sphere(Sphere::new(Pose::translation(d, 0.0, 0.0), r2).unwrap());
        let distance = a.shortest_distance(&b).unwrap();
        prop_assert!((distance - (d - r1 - r2)).abs() < 1e-12);
    }

    #[test]
    fn parallel_capsules_closed_form(
        rotation in arb_pose(),
        d in 0.01f64..10.0,
        length in 0.1f64..3.0,
        r1 in arb_radius(),
        r2 in arb_radius(),
    ) {
        let a = Capsule::new(rotation, length, r1).unwrap();
        let b = Capsule::new(rotation.then(&Pose::translation(d, 0.0, 0.0)), length, r2).unwrap();
        let distance = a.shortest_distance(&Primitive::Capsule(b)).unwrap();
        prop_assert!((distance - (d - r1 - r2)).abs() < 1e-6,
            "expected {}, got {}", d - r1 - r2, distance);
    }
}

// ---------------------------------------------------------------------------
// 3. A zero-length capsule behaves like a sphere of the same radius
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn zero_length_capsule_matches_sphere_against_capsules(
        pose in arb_pose(),
        r in arb_radius(),
        other in arb_capsule(),
    ) {
        let dot = Primitive::Capsule(Capsule::new(pose, 0.0, r).unwrap());
        let ball = Primitive::Sphere(Sphere::new(pose, r).unwrap());
        let other = Primitive::Capsule(other);
        let d_dot = dot.shortest_distance(&other).unwrap();
        let d_ball = ball.shortest_distance(&other).unwrap();
        prop_assert!((d_dot - d_ball).abs() < TOL);
        prop_assert!((other.shortest_distance(&dot).unwrap() - d_ball).abs() < TOL);
    }

    #[test]
    fn zero_length_capsule_matches_sphere_against_spheres(
        pose in arb_pose(),
        r in arb_radius(),
        other in arb_sphere(),
    ) {
        let dot = Primitive::Capsule(Capsule::new(pose, 0.0, r).unwrap());
        let ball = Primitive::Sphere(Sphere::new(pose, r).unwrap());
        let other = Primitive::Sphere(other);
        prop_assert!((dot.shortest_distance(&other).unwrap() - ball.shortest_distance(&other).unwrap()).abs() < TOL);
    }
}

// ---------------------------------------------------------------------------
// 4. Closest points lie on the finite axes
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn closest_points_stay_on_axes(a in arb_capsule(), b in arb_capsule()) {
        let cp = a.closest_points_to_capsule(&b).unwrap();
        prop_assert!(a.axis().distance_to_point(&cp.own) < 1e-6);
        prop_assert!(b.axis().distance_to_point(&cp.other) < 1e-6);
    }
}

// ---------------------------------------------------------------------------
// 5. Separated shapes never report overlap
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn separated_capsules_are_non_negative(
        r1 in arb_radius(),
        r2 in arb_radius(),
        gap in 0.0f64..5.0,
        (y, z) in (-5.0f64..5.0, -5.0f64..5.0),
        (dx, dy, dz) in (0.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0),
        length_a in 0.1f64..4.0,
        length_b in 0.1f64..4.0,
    ) {
        // `a` lies on x = 0; every point of `b`'s axis has x >= r1 + r2 + gap.
        let a = Capsule::new(Pose::identity(), length_a, r1).unwrap();
        let direction = Vector3::new(dx, dy, dz);
        prop_assume!(direction.norm() > 1e-3);
        let direction = direction.normalize();
        let base = Point3::new(r1 + r2 + gap, y, z);
        let pose = match nalgebra::Rotation3::rotation_between(&Vector3::z(), &direction) {
            Some(rotation) => Pose::from_rotation_at(rotation, base),
            None => Pose::from_rotation_at(
                nalgebra::Rotation3::from_axis_angle(&Vector3::x_axis(), std::f64::consts::PI),
                base,
            ),
        };
        let b = Capsule::new(pose, length_b, r2).unwrap();
        let distance = a.shortest_distance(&Primitive::Capsule(b)).unwrap();
        prop_assert!(distance >= gap - 1e-9, "gap {} but distance {}", gap, distance);
    }

    #[test]
    fn separated_sphere_and_capsule_are_non_negative(
        rc in arb_radius(),
        rs in arb_radius(),
        gap in 0.0f64..5.0,
        angle in arb_angle(),
        z in -5.0f64..5.0,
        length in 0.0f64..3.0,
    ) {
        let c = Capsule::new(Pose::identity(), length, rc).unwrap();
        let radial = rc + rs + gap;
        let s = Sphere::new(Pose::translation(radial * angle.cos(), radial * angle.sin(), z), rs).unwrap();
        let distance = c.shortest_distance(&Primitive::Sphere(s)).unwrap();
        prop_assert!(distance >= gap - 1e-9);
    }
}
