use approx::relative_eq;
use nalgebra::{Isometry3, Matrix4, Point3, Rotation3, Translation3, UnitQuaternion, Vector3, Vector4};
use serde::{Deserialize, Serialize};

/// A rigid-body pose: a 4x4 homogeneous transform placing a local frame in
/// the world frame.
///
/// Poses are replaced wholesale when a link or obstacle moves; nothing
/// derived from a pose is cached anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    matrix: Matrix4<f64>,
}

impl Pose {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Wrap a raw homogeneous matrix. No rigidity check is made; see [`Pose::is_rigid`].
    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self { matrix }
    }

    pub fn from_isometry(isometry: &Isometry3<f64>) -> Self {
        Self {
            matrix: isometry.to_homogeneous(),
        }
    }

    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            matrix: Translation3::new(dx, dy, dz).to_homogeneous(),
        }
    }

    /// Rotation around the X axis by `angle` radians.
    pub fn rotation_x(angle: f64) -> Self {
        Self::from_rotation(Rotation3::from_axis_angle(&Vector3::x_axis(), angle))
    }

    /// Rotation around the Y axis by `angle` radians.
    pub fn rotation_y(angle: f64) -> Self {
        Self::from_rotation(Rotation3::from_axis_angle(&Vector3::y_axis(), angle))
    }

    /// Rotation around the Z axis by `angle` radians.
    pub fn rotation_z(angle: f64) -> Self {
        Self::from_rotation(Rotation3::from_axis_angle(&Vector3::z_axis(), angle))
    }

    pub fn from_rotation(rotation: Rotation3<f64>) -> Self {
        Self {
            matrix: rotation.to_homogeneous(),
        }
    }

    /// Pose from a position and a unit quaternion orientation.
    pub fn from_position_orientation(position: Vector3<f64>, orientation: UnitQuaternion<f64>) -> Self {
        let isometry = Isometry3::from_parts(Translation3::from(position), orientation);
        Self::from_isometry(&isometry)
    }

    /// Pose with the given rotation placed at `origin`.
    pub fn from_rotation_at(rotation: Rotation3<f64>, origin: Point3<f64>) -> Self {
        let mut matrix = rotation.to_homogeneous();
        matrix.fixed_view_mut::<3, 1>(0, 3).copy_from(&origin.coords);
        Self { matrix }
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    /// Compose two poses: `self * other`.
    pub fn then(&self, other: &Pose) -> Pose {
        Pose {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Map a point given in the local frame into the world frame.
    pub fn transform_point(&self, p: &Point3<f64>) -> Point3<f64> {
        let h = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(h.x, h.y, h.z)
    }

    /// World position of the local origin.
    pub fn origin(&self) -> Point3<f64> {
        self.transform_point(&Point3::origin())
    }

    pub fn translation_vector(&self) -> Vector3<f64> {
        self.matrix.fixed_view::<3, 1>(0, 3).into_owned()
    }

    /// Whether the upper-left block is a proper rotation and the last row is `[0 0 0 1]`.
    pub fn is_rigid(&self, epsilon: f64) -> bool {
        let r = self.matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let bottom = self.matrix.fixed_view::<1, 4>(3, 0).into_owned();
        relative_eq!(r.transpose() * r, nalgebra::Matrix3::identity(), epsilon = epsilon)
            && relative_eq!(r.determinant(), 1.0, epsilon = epsilon)
            && relative_eq!(bottom, nalgebra::RowVector4::new(0.0, 0.0, 0.0, 1.0), epsilon = epsilon)
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Isometry3<f64>> for Pose {
    fn from(isometry: Isometry3<f64>) -> Self {
        Self::from_isometry(&isometry)
    }
}
