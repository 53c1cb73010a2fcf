use std::cmp::Ordering;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{ClosestPoints, Primitive, Sphere};
use crate::error::GeometryError;
use crate::geometry::pose::Pose;
use crate::geometry::segment::Segment;

/// A cylinder with hemispherical caps.
///
/// In its local frame the axis runs from the origin to `(0, 0, length)`.
/// The world-space axis is derived from `pose` on every query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capsule {
    pub pose: Pose,
    length: f64,
    radius: f64,
}

impl Capsule {
    pub fn new(pose: Pose, length: f64, radius: f64) -> Result<Self, GeometryError> {
        Ok(Self {
            pose,
            length: GeometryError::check_dimension("capsule length", length)?,
            radius: GeometryError::check_dimension("capsule radius", radius)?,
        })
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// World-space axis of symmetry.
    pub fn axis(&self) -> Segment {
        Segment::new(
            self.pose.transform_point(&Point3::origin()),
            self.pose.transform_point(&Point3::new(0.0, 0.0, self.length)),
        )
    }

    pub fn closest_points(&self, other: &Primitive) -> Result<ClosestPoints, GeometryError> {
        match other {
            Primitive::Capsule(capsule) => self.closest_points_to_capsule(capsule),
            Primitive::Sphere(sphere) => Ok(self.closest_points_to_sphere(sphere)),
        }
    }

    /// Closest points between the two axes, as (point on `self`, point on `other`).
    pub fn closest_points_to_capsule(&self, other: &Capsule) -> Result<ClosestPoints, GeometryError> {
        let self_axis = self.axis();
        let other_axis = other.axis();

        // The longer capsule drives the branch table. Equal lengths fall back
        // to an axis ordering so both argument orders pick the same driver.
        let self_is_own = match self.length.partial_cmp(&other.length) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Less) => false,
            _ => axis_order(&self_axis, &other_axis) == Ordering::Greater,
        };

        Ok(if self_is_own {
            let (own_point, obstacle_point) = axis_closest_points(&self_axis, &other_axis)?;
            ClosestPoints::new(own_point, obstacle_point)
        } else {
            let (own_point, obstacle_point) = axis_closest_points(&other_axis, &self_axis)?;
            ClosestPoints::new(obstacle_point, own_point)
        })
    }

    pub fn closest_points_to_sphere(&self, sphere: &Sphere) -> ClosestPoints {
        let center = sphere.center();
        ClosestPoints::new(self.axis().closest_point(&center), center)
    }

    pub fn shortest_direction(&self, other: &Primitive) -> Result<Vector3<f64>, GeometryError> {
        Ok(self.closest_points(other)?.direction())
    }

    /// Surface gap to `other`; negative when they overlap.
    pub fn shortest_distance(&self, other: &Primitive) -> Result<f64, GeometryError> {
        let direction = self.shortest_direction(other)?;
        Ok(direction.norm() - self.radius - other.radius())
    }
}

/// Lexicographic order over (base, end) coordinates. Incomparable (NaN)
/// coordinates count as equal.
fn axis_order(a: &Segment, b: &Segment) -> Ordering {
    let coords = |s: &Segment| [s.base.x, s.base.y, s.base.z, s.end.x, s.end.y, s.end.z];
    coords(a)
        .iter()
        .zip(coords(b).iter())
        .map(|(x, y)| x.partial_cmp(y).unwrap_or(Ordering::Equal))
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

/// Closest points between the axis of the longer capsule (`own`) and the
/// shorter one (`obstacle`), returned as (point on own, point on obstacle).
///
/// The raw projection parameters of the obstacle endpoints onto the own axis
/// pick which axis starts the segment query, which keeps the pair on the
/// finite part of both axes.
fn axis_closest_points(
    own: &Segment,
    obstacle: &Segment,
) -> Result<(Point3<f64>, Point3<f64>), GeometryError> {
    let tolerance = crate::default_tolerance();
    let own_is_point = own.is_degenerate(&tolerance);
    let obstacle_is_point = obstacle.is_degenerate(&tolerance);

    // Zero-length axes behave exactly like sphere centers.
    if own_is_point || obstacle_is_point {
        trace!(own_is_point, obstacle_is_point, "zero-length capsule axis");
    }
    match (own_is_point, obstacle_is_point) {
        (true, true) => return Ok((own.base, obstacle.base)),
        (true, false) => return Ok((own.base, obstacle.closest_point(&own.base))),
        (false, true) => return Ok((own.closest_point(&obstacle.base), obstacle.base)),
        (false, false) => {}
    }

    let lambda_m1 = own.parameter_of(&obstacle.base)?;
    let lambda_m2 = own.parameter_of(&obstacle.end)?;
    let inside = |lambda: f64| (0.0..=1.0).contains(&lambda);

    let from_own = || own.closest_points_to_segment(obstacle);
    let from_obstacle = || {
        obstacle
            .closest_points_to_segment(own)
            .map(|(on_obstacle, on_own)| (on_own, on_obstacle))
    };

    if inside(lambda_m1) {
        if inside(lambda_m2) {
            from_own()
        } else if own.distance_to_point(&obstacle.base) < obstacle.distance_to_point(&own.end) {
            from_own()
        } else {
            from_obstacle()
        }
    } else if inside(lambda_m2) {
        if own.distance_to_point(&obstacle.end) < obstacle.distance_to_point(&own.base) {
            from_own()
        } else {
            from_obstacle()
        }
    } else if own.distance_to_point(&obstacle.end) < own.distance_to_point(&obstacle.base) {
        from_obstacle()
    } else {
        from_own()
    }
}
