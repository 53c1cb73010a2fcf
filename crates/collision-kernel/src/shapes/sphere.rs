use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use super::{Capsule, ClosestPoints, Primitive};
use crate::error::GeometryError;
use crate::geometry::pose::Pose;

/// A sphere centered on the origin of its pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub pose: Pose,
    radius: f64,
}

impl Sphere {
    pub fn new(pose: Pose, radius: f64) -> Result<Self, GeometryError> {
        Ok(Self {
            pose,
            radius: GeometryError::check_dimension("sphere radius", radius)?,
        })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn center(&self) -> Point3<f64> {
        self.pose.origin()
    }

    pub fn closest_points(&self, other: &Primitive) -> Result<ClosestPoints, GeometryError> {
        match other {
            Primitive::Capsule(capsule) => Ok(self.closest_points_to_capsule(capsule)),
            Primitive::Sphere(sphere) => Ok(self.closest_points_to_sphere(sphere)),
        }
    }

    /// Reuses the capsule-side query with the pair flipped so the sphere comes first.
    pub fn closest_points_to_capsule(&self, capsule: &Capsule) -> ClosestPoints {
        capsule.closest_points_to_sphere(self).swapped()
    }

    pub fn closest_points_to_sphere(&self, sphere: &Sphere) -> ClosestPoints {
        ClosestPoints::new(self.center(), sphere.center())
    }

    pub fn shortest_direction(&self, other: &Primitive) -> Result<Vector3<f64>, GeometryError> {
        Ok(self.closest_points(other)?.direction())
    }

    pub fn shortest_distance(&self, other: &Primitive) -> Result<f64, GeometryError> {
        let direction = self.shortest_direction(other)?;
        Ok(direction.norm() - self.radius - other.radius())
    }
}
