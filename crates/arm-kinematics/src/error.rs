use collision_kernel::GeometryError;
use thiserror::Error;

/// Failures from the kinematic chain, the arm model, or its configuration.
#[derive(Debug, Error)]
pub enum KinematicsError {
    #[error("Expected {expected} joint values, got {actual}")]
    JointCountMismatch { expected: usize, actual: usize },

    #[error("Joint {index} has non-finite value {value}")]
    NonFiniteJointValue { index: usize, value: f64 },

    #[error("Solver yields {solver} links but {configured} are configured")]
    LinkCountMismatch { solver: usize, configured: usize },

    #[error("Joint frame {index} out of range ({count} frames)")]
    JointOutOfRange { index: usize, count: usize },

    #[error("Jacobian is singular even with damping")]
    SingularJacobian,

    #[error("Kinematic solver failed: {reason}")]
    SolverFailure { reason: String },

    #[error("Invalid link geometry: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Config IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),
}
