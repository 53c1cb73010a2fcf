pub mod arm;
pub mod chain;
pub mod config;
pub mod error;

pub use arm::{link_pose_from_frames, Arm, SharedArm};
pub use chain::{ChainJoint, DlsConfig, KinematicSolver, SerialChain, Twist};
pub use config::{ArmConfig, LinkGeometry};
pub use error::KinematicsError;
