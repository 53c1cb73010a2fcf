pub mod controller;
pub mod error;
pub mod monitor;
pub mod tracker;

pub use controller::{ArmController, ControlOutput, ControllerConfig};
pub use error::MonitorError;
pub use monitor::{Monitor, ObstacleId};
pub use tracker::{Marker, MarkerAction, MarkerShape, MarkerTracker};
