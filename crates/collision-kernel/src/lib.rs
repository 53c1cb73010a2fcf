pub mod error;
pub mod geometry;
pub mod shapes;

// Re-export the types every consumer touches at crate root.
pub use error::GeometryError;
pub use geometry::pose::Pose;
pub use geometry::segment::Segment;
pub use shapes::{Capsule, ClosestPoints, Primitive, ShapeKind, Sphere};

/// Tolerance configuration for degenerate-geometry checks.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// Points closer than this are considered coincident (meters).
    pub coincidence: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self { coincidence: 1e-12 }
    }
}

impl Tolerance {
    pub fn is_zero_length(&self, length: f64) -> bool {
        length.abs() < self.coincidence
    }
}

/// Default tolerance used by the shape queries.
pub fn default_tolerance() -> Tolerance {
    Tolerance::default()
}
