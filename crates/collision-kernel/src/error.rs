use thiserror::Error;

/// Failures raised by the geometry kernel and the primitive shapes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("Unsupported primitive kind: {kind}")]
    UnsupportedPrimitiveKind { kind: String },

    #[error("Degenerate geometry: {reason}")]
    DegenerateGeometry { reason: String },

    #[error("Invalid {name}: {value} (must be finite and >= 0)")]
    InvalidDimension { name: &'static str, value: f64 },
}

impl GeometryError {
    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateGeometry {
            reason: reason.into(),
        }
    }

    /// Check a radius or length before it enters a shape.
    pub(crate) fn check_dimension(name: &'static str, value: f64) -> Result<f64, Self> {
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(Self::InvalidDimension { name, value })
        }
    }
}
