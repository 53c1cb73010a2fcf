//! Collision primitives and their pairwise queries.
//!
//! Every query is answered by matching on the concrete kind of both shapes,
//! so adding a variant to [`Primitive`] forces every pairing to be written.

pub mod capsule;
pub mod sphere;

pub use capsule::Capsule;
pub use sphere::Sphere;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::geometry::pose::Pose;

/// A pair of closest points, ordered as (queried shape, other shape).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosestPoints {
    pub own: Point3<f64>,
    pub other: Point3<f64>,
}

impl ClosestPoints {
    pub fn new(own: Point3<f64>, other: Point3<f64>) -> Self {
        Self { own, other }
    }

    /// Vector from the own point to the other point (not normalized).
    pub fn direction(&self) -> Vector3<f64> {
        self.other - self.own
    }

    pub fn swapped(self) -> Self {
        Self {
            own: self.other,
            other: self.own,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Capsule,
    Sphere,
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Capsule => "Capsule",
            ShapeKind::Sphere => "Sphere",
        }
    }
}

/// Closed set of shapes the monitor can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Primitive {
    Capsule(Capsule),
    Sphere(Sphere),
}

impl Primitive {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Primitive::Capsule(_) => ShapeKind::Capsule,
            Primitive::Sphere(_) => ShapeKind::Sphere,
        }
    }

    pub fn pose(&self) -> &Pose {
        match self {
            Primitive::Capsule(c) => &c.pose,
            Primitive::Sphere(s) => &s.pose,
        }
    }

    /// Replace the pose. Shape parameters never change after construction.
    pub fn set_pose(&mut self, pose: Pose) {
        match self {
            Primitive::Capsule(c) => c.pose = pose,
            Primitive::Sphere(s) => s.pose = pose,
        }
    }

    pub fn radius(&self) -> f64 {
        match self {
            Primitive::Capsule(c) => c.radius(),
            Primitive::Sphere(s) => s.radius(),
        }
    }

    pub fn closest_points(&self, other: &Primitive) -> Result<ClosestPoints, GeometryError> {
        match self {
            Primitive::Capsule(c) => c.closest_points(other),
            Primitive::Sphere(s) => s.closest_points(other),
        }
    }

    pub fn shortest_direction(&self, other: &Primitive) -> Result<Vector3<f64>, GeometryError> {
        Ok(self.closest_points(other)?.direction())
    }

    /// Surface-to-surface gap; negative when the shapes overlap.
    pub fn shortest_distance(&self, other: &Primitive) -> Result<f64, GeometryError> {
        match self {
            Primitive::Capsule(c) => c.shortest_distance(other),
            Primitive::Sphere(s) => s.shortest_distance(other),
        }
    }
}

impl From<Capsule> for Primitive {
    fn from(capsule: Capsule) -> Self {
        Primitive::Capsule(capsule)
    }
}

impl From<Sphere> for Primitive {
    fn from(sphere: Sphere) -> Self {
        Primitive::Sphere(sphere)
    }
}
