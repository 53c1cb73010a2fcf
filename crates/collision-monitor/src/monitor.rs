//! Obstacle bookkeeping and the two distance matrices consumed by the
//! control loop.
//!
//! Obstacles live in a slot map behind one reader/writer lock. Rows of the
//! obstacle matrix follow insertion order, which `obstacle_ids` reports.
//! Every matrix is computed against a snapshot: obstacles and arm links are
//! copied out while both locks are held, then distances are computed
//! lock-free.

use parking_lot::RwLock;
use slotmap::{new_key_type, SlotMap};
use tracing::{debug, info, instrument};

use arm_kinematics::SharedArm;
use collision_kernel::{Pose, Primitive};

use crate::error::MonitorError;

new_key_type! {
    /// Stable handle to an obstacle held by a [`Monitor`].
    pub struct ObstacleId;
}

// ─── Storage ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum ObstacleEntry {
    /// Copied into the monitor at insertion.
    Owned(Primitive),
    /// Link `index` of another arm, read through its lock at query time.
    ArmLink { arm: SharedArm, index: usize },
}

impl ObstacleEntry {
    fn resolve(&self) -> Result<Primitive, MonitorError> {
        match self {
            ObstacleEntry::Owned(primitive) => Ok(primitive.clone()),
            ObstacleEntry::ArmLink { arm, index } => {
                // Recursive: the borrowed arm may be the monitored one, whose
                // read lock the caller already holds.
                let arm = arm.read_recursive();
                arm.links()
                    .get(*index)
                    .cloned()
                    .map(Primitive::Capsule)
                    .ok_or(MonitorError::LinkOutOfRange {
                        index: *index,
                        count: arm.link_count(),
                    })
            }
        }
    }
}

#[derive(Debug, Default)]
struct ObstacleSet {
    entries: SlotMap<ObstacleId, ObstacleEntry>,
    order: Vec<ObstacleId>,
}

impl ObstacleSet {
    fn insert(&mut self, entry: ObstacleEntry) -> ObstacleId {
        let id = self.entries.insert(entry);
        self.order.push(id);
        id
    }
}

// ─── Monitor ────────────────────────────────────────────────────────────────

/// Clearance monitor for one arm against a set of obstacles.
#[derive(Debug)]
pub struct Monitor {
    arm: SharedArm,
    obstacles: RwLock<ObstacleSet>,
}

impl Monitor {
    pub fn new(arm: SharedArm) -> Self {
        Self {
            arm,
            obstacles: RwLock::new(ObstacleSet::default()),
        }
    }

    /// The monitored arm.
    pub fn arm(&self) -> &SharedArm {
        &self.arm
    }

    pub fn link_count(&self) -> usize {
        self.arm.read().link_count()
    }

    /// Take ownership of a copy of `obstacle`.
    #[instrument(skip_all)]
    pub fn add_obstacle(&self, obstacle: impl Into<Primitive>) -> ObstacleId {
        let obstacle = obstacle.into();
        let kind = obstacle.kind();
        let id = self.obstacles.write().insert(ObstacleEntry::Owned(obstacle));
        info!(?id, kind = kind.name(), "obstacle added");
        id
    }

    /// Register every link of `arm` as an obstacle. The links stay owned by
    /// `arm` and follow its pose updates; they cannot be re-posed here.
    #[instrument(skip_all)]
    pub fn add_arm_obstacles(&self, arm: &SharedArm) -> Vec<ObstacleId> {
        let count = arm.read().link_count();
        let mut set = self.obstacles.write();
        let ids: Vec<_> = (0..count)
            .map(|index| {
                set.insert(ObstacleEntry::ArmLink {
                    arm: arm.clone(),
                    index,
                })
            })
            .collect();
        info!(links = ids.len(), "arm links added as obstacles");
        ids
    }

    /// Replace the pose of an owned obstacle. Shape parameters are kept.
    #[instrument(skip(self, pose))]
    pub fn update_obstacle_pose(&self, id: ObstacleId, pose: Pose) -> Result<(), MonitorError> {
        let mut set = self.obstacles.write();
        match set.entries.get_mut(id) {
            Some(ObstacleEntry::Owned(primitive)) => {
                primitive.set_pose(pose);
                Ok(())
            }
            Some(ObstacleEntry::ArmLink { .. }) => Err(MonitorError::ReadOnlyObstacle(id)),
            None => Err(MonitorError::NotFound(id)),
        }
    }

    #[instrument(skip(self))]
    pub fn remove_obstacle(&self, id: ObstacleId) -> Result<(), MonitorError> {
        let mut set = self.obstacles.write();
        set.entries.remove(id).ok_or(MonitorError::NotFound(id))?;
        set.order.retain(|&other| other != id);
        info!(remaining = set.order.len(), "obstacle removed");
        Ok(())
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacles.read().order.len()
    }

    /// Obstacle ids in matrix row order.
    pub fn obstacle_ids(&self) -> Vec<ObstacleId> {
        self.obstacles.read().order.clone()
    }

    pub fn contains(&self, id: ObstacleId) -> bool {
        self.obstacles.read().entries.contains_key(id)
    }

    /// Current shape and pose of an obstacle.
    pub fn obstacle(&self, id: ObstacleId) -> Result<Primitive, MonitorError> {
        let set = self.obstacles.read();
        set.entries.get(id).ok_or(MonitorError::NotFound(id))?.resolve()
    }

    /// Obstacles (row order) and links, copied under one acquisition of
    /// both locks.
    fn snapshot(&self) -> Result<(Vec<Primitive>, Vec<Primitive>), MonitorError> {
        let set = self.obstacles.read();
        let arm = self.arm.read();
        let obstacles = set
            .order
            .iter()
            .map(|&id| set.entries.get(id).ok_or(MonitorError::NotFound(id))?.resolve())
            .collect::<Result<Vec<_>, _>>()?;
        let links = arm.links().iter().cloned().map(Primitive::Capsule).collect();
        Ok((obstacles, links))
    }

    fn link_snapshot(&self) -> Vec<Primitive> {
        self.arm.read().links().iter().cloned().map(Primitive::Capsule).collect()
    }

    /// `[i][j]` is the surface distance from obstacle `i` (row order of
    /// [`obstacle_ids`](Self::obstacle_ids)) to arm link `j`.
    #[instrument(skip(self))]
    pub fn distance_to_obstacles(&self) -> Result<Vec<Vec<f64>>, MonitorError> {
        let (obstacles, links) = self.snapshot()?;

        let matrix = obstacles
            .iter()
            .map(|obstacle| {
                links
                    .iter()
                    .map(|link| obstacle.shortest_distance(link))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(rows = matrix.len(), cols = links.len(), "obstacle distances computed");
        Ok(matrix)
    }

    /// `[i][j]` is the surface distance from link `i` to link `j`; the
    /// diagonal is zero. Both triangles are computed independently.
    #[instrument(skip(self))]
    pub fn distance_between_links(&self) -> Result<Vec<Vec<f64>>, MonitorError> {
        let links = self.link_snapshot();

        let matrix = links
            .iter()
            .enumerate()
            .map(|(i, from)| {
                links
                    .iter()
                    .enumerate()
                    .map(|(j, to)| if i == j { Ok(0.0) } else { from.shortest_distance(to) })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(links = links.len(), "link distances computed");
        Ok(matrix)
    }

    /// Smallest obstacle-to-link distance, or `None` with no obstacles or links.
    pub fn min_clearance(&self) -> Result<Option<f64>, MonitorError> {
        Ok(min_entry(&self.distance_to_obstacles()?))
    }
}

pub(crate) fn min_entry(matrix: &[Vec<f64>]) -> Option<f64> {
    matrix.iter().flatten().copied().reduce(f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arm_kinematics::{Arm, ArmConfig, LinkGeometry, SerialChain};
    use collision_kernel::{Capsule, Sphere};

    fn single_link_monitor() -> Monitor {
        let config = ArmConfig {
            links: vec![LinkGeometry { length: 1.0, radius: 0.1 }],
        };
        let arm = Arm::new(Box::new(SerialChain::planar(&[1.0])), &config).unwrap();
        Monitor::new(arm.into_shared())
    }

    fn ball(x: f64, r: f64) -> Sphere {
        Sphere::new(Pose::translation(x, 0.0, 0.5), r).unwrap()
    }

    #[test]
    fn test_add_copies_obstacle() {
        let monitor = single_link_monitor();
        let mut original = ball(2.0, 0.5);
        let id = monitor.add_obstacle(original.clone());
        original.pose = Pose::translation(10.0, 0.0, 0.0);
        assert_eq!(monitor.obstacle(id).unwrap(), Primitive::Sphere(ball(2.0, 0.5)));
    }

    #[test]
    fn test_update_pose_keeps_shape() {
        let monitor = single_link_monitor();
        let id = monitor.add_obstacle(ball(2.0, 0.5));
        monitor.update_obstacle_pose(id, Pose::translation(3.0, 0.0, 0.5)).unwrap();
        let obstacle = monitor.obstacle(id).unwrap();
        assert_eq!(obstacle.radius(), 0.5);
        assert_eq!(obstacle.pose().origin().x, 3.0);
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let monitor = single_link_monitor();
        let id = monitor.add_obstacle(ball(2.0, 0.5));
        monitor.remove_obstacle(id).unwrap();
        assert!(matches!(monitor.remove_obstacle(id), Err(MonitorError::NotFound(_))));
        assert!(matches!(
            monitor.update_obstacle_pose(id, Pose::identity()),
            Err(MonitorError::NotFound(_))
        ));
        assert!(matches!(monitor.obstacle(id), Err(MonitorError::NotFound(_))));
    }

    #[test]
    fn test_removal_keeps_row_order() {
        let monitor = single_link_monitor();
        let a = monitor.add_obstacle(ball(2.0, 0.5));
        let b = monitor.add_obstacle(ball(3.0, 0.5));
        let c = monitor.add_obstacle(ball(4.0, 0.5));
        monitor.remove_obstacle(b).unwrap();
        assert_eq!(monitor.obstacle_ids(), vec![a, c]);

        let matrix = monitor.distance_to_obstacles().unwrap();
        assert!((matrix[0][0] - 1.4).abs() < 1e-12);
        assert!((matrix[1][0] - 3.4).abs() < 1e-12);
    }

    #[test]
    fn test_borrowed_links_are_read_only() {
        let monitor = single_link_monitor();
        let other = single_link_monitor();
        let ids = monitor.add_arm_obstacles(other.arm());
        assert_eq!(ids.len(), 1);
        assert!(matches!(
            monitor.update_obstacle_pose(ids[0], Pose::identity()),
            Err(MonitorError::ReadOnlyObstacle(_))
        ));
        assert!(matches!(monitor.obstacle(ids[0]).unwrap(), Primitive::Capsule(_)));
    }

    #[test]
    fn test_empty_monitor_has_no_clearance() {
        let monitor = single_link_monitor();
        assert!(monitor.distance_to_obstacles().unwrap().is_empty());
        assert_eq!(monitor.min_clearance().unwrap(), None);
        assert_eq!(monitor.distance_between_links().unwrap(), vec![vec![0.0]]);
    }

    #[test]
    fn test_capsule_obstacle_distance() {
        let monitor = single_link_monitor();
        let capsule = Capsule::new(Pose::translation(1.0, 0.0, 0.0), 1.0, 0.2).unwrap();
        monitor.add_obstacle(capsule);
        let clearance = monitor.min_clearance().unwrap().unwrap();
        assert!((clearance - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_own_links_as_obstacles() {
        let monitor = single_link_monitor();
        let arm = monitor.arm().clone();
        monitor.add_arm_obstacles(&arm);
        let matrix = monitor.distance_to_obstacles().unwrap();
        assert!((matrix[0][0] + 0.2).abs() < 1e-12);
    }
}
