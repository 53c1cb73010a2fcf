//! Closest-point math on bounded line segments.
//!
//! A [`Segment`] is the finite axis of a capsule. The pairwise query does not
//! solve the skew-line system directly: it projects the other segment onto the
//! plane through this segment's midpoint normal to its direction, finds the
//! projected point nearest the midpoint, maps that back onto the other segment
//! by ratio, and finally clamps onto this segment.

use nalgebra::{Point3, Vector3};
use tracing::trace;

use crate::error::GeometryError;
use crate::Tolerance;

/// A bounded line segment from `base` to `end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub base: Point3<f64>,
    pub end: Point3<f64>,
}

impl Segment {
    pub fn new(base: Point3<f64>, end: Point3<f64>) -> Self {
        Self { base, end }
    }

    pub fn direction(&self) -> Vector3<f64> {
        self.end - self.base
    }

    pub fn length(&self) -> f64 {
        self.direction().norm()
    }

    pub fn midpoint(&self) -> Point3<f64> {
        Point3::from((self.end.coords + self.base.coords) / 2.0)
    }

    /// Whether the segment is too short to have a direction.
    pub fn is_degenerate(&self, tolerance: &Tolerance) -> bool {
        tolerance.is_zero_length(self.length())
    }

    /// Raw projection parameter of `point` onto the infinite line, unclamped.
    /// 0 maps to `base`, 1 to `end`.
    pub fn parameter_of(&self, point: &Point3<f64>) -> Result<f64, GeometryError> {
        let direction = self.direction();
        let length_squared = direction.norm_squared();
        if length_squared == 0.0 {
            return Err(GeometryError::degenerate(
                "projection onto a zero-length segment",
            ));
        }
        Ok((point - self.base).dot(&direction) / length_squared)
    }

    /// Project `point` onto the plane through the midpoint, normal to the segment.
    pub fn project_onto_normal_plane(&self, point: &Point3<f64>) -> Result<Point3<f64>, GeometryError> {
        let normal = self
            .direction()
            .try_normalize(0.0)
            .ok_or_else(|| GeometryError::degenerate("segment has no direction"))?;
        let mid = self.midpoint();
        Ok(point - normal * (point - mid).dot(&normal))
    }

    /// Closest point on the segment to `point`, with the parameter clamped to `[0, 1]`.
    ///
    /// A zero-length segment answers with its base point.
    pub fn closest_point(&self, point: &Point3<f64>) -> Point3<f64> {
        let lambda = match self.parameter_of(point) {
            Ok(lambda) => lambda,
            Err(_) => return self.base,
        };

        if lambda <= 0.0 {
            self.base
        } else if lambda >= 1.0 {
            self.end
        } else {
            self.base + self.direction() * lambda
        }
    }

    /// Closest pair between two segments as `(point on self, point on other)`.
    ///
    /// When `other` projects onto a single point (the segments are parallel)
    /// the two midpoints are returned. Both segments must have a direction.
    pub fn closest_points_to_segment(
        &self,
        other: &Segment,
    ) -> Result<(Point3<f64>, Point3<f64>), GeometryError> {
        if other.length() == 0.0 {
            return Err(GeometryError::degenerate(
                "segment-segment query against a zero-length segment",
            ));
        }

        let base_projected = self.project_onto_normal_plane(&other.base)?;
        let end_projected = self.project_onto_normal_plane(&other.end)?;
        let mid = self.midpoint();

        let projected = Segment::new(base_projected, end_projected);
        let projected_length = projected.length();

        if projected_length == 0.0 {
            trace!("parallel segments, answering with midpoints");
            return Ok((mid, other.midpoint()));
        }

        let projected_closest = projected.closest_point(&mid);
        let ratio = (projected_closest - base_projected).norm() / projected_length;
        let other_closest = other.base + other.direction() * ratio;
        let own_closest = self.closest_point(&other_closest);

        Ok((own_closest, other_closest))
    }

    pub fn distance_to_point(&self, point: &Point3<f64>) -> f64 {
        (point - self.closest_point(point)).norm()
    }

    pub fn distance_to_segment(&self, other: &Segment) -> Result<f64, GeometryError> {
        let (own, theirs) = self.closest_points_to_segment(other)?;
        Ok((theirs - own).norm())
    }
}
