//! Obstacle ingestion from marker observations.
//!
//! A perception feed reports the same physical object under a stable marker
//! id every tick. The tracker maps marker ids to monitor obstacles so a
//! repeated observation re-poses the obstacle instead of adding a new one.

use std::collections::HashMap;

use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use collision_kernel::{Capsule, GeometryError, Pose, Primitive, Sphere};

use crate::error::MonitorError;
use crate::monitor::{Monitor, ObstacleId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerShape {
    Arrow,
    Cube,
    Sphere,
    Cylinder,
    Mesh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerAction {
    /// Add the marker, or move it if the id is already tracked.
    #[default]
    Add,
    Delete,
    DeleteAll,
}

/// One marker observation in the world frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: i32,
    pub shape: MarkerShape,
    #[serde(default)]
    pub action: MarkerAction,
    pub position: Vector3<f64>,
    /// Need not be normalized; a zero quaternion is rejected.
    pub orientation: Quaternion<f64>,
    /// Sphere: `x` is the radius. Cylinder: `x` is the radius, `z` the height.
    pub scale: Vector3<f64>,
}

impl Marker {
    pub fn pose(&self) -> Result<Pose, GeometryError> {
        if self.orientation.norm() == 0.0 {
            return Err(GeometryError::DegenerateGeometry {
                reason: format!("marker {} has a zero orientation quaternion", self.id),
            });
        }
        let rotation = UnitQuaternion::from_quaternion(self.orientation);
        Ok(Pose::from_position_orientation(self.position, rotation))
    }

    /// Pose of the obstacle built from this marker.
    ///
    /// A cylinder's capsule axis starts half its height below the marker
    /// position so the capsule is centered on the marker.
    pub fn obstacle_pose(&self) -> Result<Pose, GeometryError> {
        let pose = self.pose()?;
        Ok(match self.shape {
            MarkerShape::Cylinder => pose.then(&Pose::translation(0.0, 0.0, -self.scale.z / 2.0)),
            _ => pose,
        })
    }

    /// Collision shape for this marker.
    ///
    /// A cylinder becomes a capsule with its axis along the marker's z axis.
    pub fn to_primitive(&self) -> Result<Primitive, GeometryError> {
        match self.shape {
            MarkerShape::Sphere => Ok(Sphere::new(self.obstacle_pose()?, self.scale.x)?.into()),
            MarkerShape::Cylinder => Ok(Capsule::new(self.obstacle_pose()?, self.scale.z, self.scale.x)?.into()),
            other => Err(GeometryError::UnsupportedPrimitiveKind {
                kind: format!("{other:?}"),
            }),
        }
    }
}

/// Keeps marker ids in step with monitor obstacles.
#[derive(Debug, Default)]
pub struct MarkerTracker {
    tracked: HashMap<i32, ObstacleId>,
}

impl MarkerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    pub fn obstacle_id(&self, marker_id: i32) -> Option<ObstacleId> {
        self.tracked.get(&marker_id).copied()
    }

    /// Apply an observation according to its action. Returns the obstacle
    /// the marker maps to after an add, `None` after a delete.
    pub fn apply(&mut self, monitor: &Monitor, marker: &Marker) -> Result<Option<ObstacleId>, MonitorError> {
        match marker.action {
            MarkerAction::Add => self.observe(monitor, marker).map(Some),
            MarkerAction::Delete => {
                self.remove(monitor, marker.id)?;
                Ok(None)
            }
            MarkerAction::DeleteAll => {
                self.clear(monitor)?;
                Ok(None)
            }
        }
    }

    /// Add the marker as a new obstacle, or re-pose the one already tracked
    /// under its id. The shape of a tracked marker is not revisited. A
    /// tracked obstacle that was removed from the monitor is added again.
    pub fn observe(&mut self, monitor: &Monitor, marker: &Marker) -> Result<ObstacleId, MonitorError> {
        if let Some(&id) = self.tracked.get(&marker.id) {
            match monitor.update_obstacle_pose(id, marker.obstacle_pose()?) {
                Ok(()) => {
                    debug!(marker = marker.id, "tracked obstacle moved");
                    return Ok(id);
                }
                Err(MonitorError::NotFound(_)) => {
                    debug!(marker = marker.id, "tracked obstacle vanished, re-adding");
                    self.tracked.remove(&marker.id);
                }
                Err(e) => return Err(e),
            }
        }

        let primitive = marker.to_primitive().map_err(|e| {
            warn!(marker = marker.id, shape = ?marker.shape, error = %e, "marker rejected");
            e
        })?;
        let id = monitor.add_obstacle(primitive);
        self.tracked.insert(marker.id, id);
        Ok(id)
    }

    /// Forget a marker and remove its obstacle. Returns `false` for an
    /// untracked id.
    pub fn remove(&mut self, monitor: &Monitor, marker_id: i32) -> Result<bool, MonitorError> {
        match self.tracked.remove(&marker_id) {
            Some(id) => {
                monitor.remove_obstacle(id)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Remove every tracked obstacle.
    pub fn clear(&mut self, monitor: &Monitor) -> Result<(), MonitorError> {
        for (_, id) in self.tracked.drain() {
            match monitor.remove_obstacle(id) {
                Ok(()) | Err(MonitorError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}
