use arm_kinematics::KinematicsError;
use collision_kernel::GeometryError;
use thiserror::Error;

use crate::monitor::ObstacleId;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Obstacle not found: {0:?}")]
    NotFound(ObstacleId),

    #[error("Obstacle {0:?} is a borrowed arm link and cannot be re-posed")]
    ReadOnlyObstacle(ObstacleId),

    #[error("Borrowed link {index} no longer exists ({count} links)")]
    LinkOutOfRange { index: usize, count: usize },

    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Kinematics failure: {0}")]
    KinematicsFailure(#[from] KinematicsError),
}
