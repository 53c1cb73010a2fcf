//! The arm model: one collision capsule per link, re-posed from the
//! kinematic solver on every update.

use std::f64::consts::PI;
use std::sync::Arc;

use nalgebra::{Rotation3, Vector3};
use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};

use collision_kernel::{Capsule, Pose};

use crate::chain::{KinematicSolver, Twist};
use crate::config::ArmConfig;
use crate::error::KinematicsError;

/// Joint frames closer than this produce an unrotated link pose.
const FRAME_COINCIDENCE: f64 = 1e-4;

/// Handle shared between the control loop (writer) and monitors (readers).
pub type SharedArm = Arc<RwLock<Arm>>;

/// A serial arm and the capsules that cover its links.
pub struct Arm {
    solver: Box<dyn KinematicSolver>,
    joint_positions: Vec<f64>,
    frames: Vec<Pose>,
    links: Vec<Capsule>,
}

impl std::fmt::Debug for Arm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arm")
            .field("joint_positions", &self.joint_positions)
            .field("links", &self.links)
            .finish_non_exhaustive()
    }
}

impl Arm {
    /// Build the arm at zero joint positions.
    ///
    /// The solver must bound exactly one link per entry of `config.links`.
    #[instrument(skip(solver, config), fields(links = config.links.len()))]
    pub fn new(solver: Box<dyn KinematicSolver>, config: &ArmConfig) -> Result<Self, KinematicsError> {
        let joint_positions = vec![0.0; solver.joint_count()];
        let frames = solver.link_frames(&joint_positions)?;

        let solver_links = frames.len().saturating_sub(1);
        if solver_links != config.links.len() {
            return Err(KinematicsError::LinkCountMismatch {
                solver: solver_links,
                configured: config.links.len(),
            });
        }

        let links = frames
            .windows(2)
            .zip(&config.links)
            .map(|(pair, geometry)| {
                Capsule::new(link_pose_from_frames(&pair[0], &pair[1]), geometry.length, geometry.radius)
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(joints = joint_positions.len(), links = links.len(), "arm built");

        Ok(Self {
            solver,
            joint_positions,
            frames,
            links,
        })
    }

    pub fn into_shared(self) -> SharedArm {
        Arc::new(RwLock::new(self))
    }

    pub fn joint_count(&self) -> usize {
        self.solver.joint_count()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Link capsules in base-to-tip order.
    pub fn links(&self) -> &[Capsule] {
        &self.links
    }

    pub fn joint_positions(&self) -> &[f64] {
        &self.joint_positions
    }

    /// Re-pose every link for new joint positions.
    ///
    /// On failure nothing is changed and the error is returned; the arm never
    /// reports success while holding stale poses.
    #[instrument(skip(self))]
    pub fn update_pose(&mut self, joint_positions: &[f64]) -> Result<(), KinematicsError> {
        let frames = self.solver.link_frames(joint_positions).map_err(|e| {
            warn!(error = %e, "forward kinematics failed");
            e
        })?;

        if frames.len() != self.links.len() + 1 {
            return Err(KinematicsError::LinkCountMismatch {
                solver: frames.len().saturating_sub(1),
                configured: self.links.len(),
            });
        }

        for (link, pair) in self.links.iter_mut().zip(frames.windows(2)) {
            link.pose = link_pose_from_frames(&pair[0], &pair[1]);
        }
        self.frames = frames;
        self.joint_positions = joint_positions.to_vec();

        debug!("arm pose updated");
        Ok(())
    }

    /// Pose of the last frame (the end effector).
    pub fn end_effector_pose(&self) -> Pose {
        self.frames.last().copied().unwrap_or_default()
    }

    /// Pose of frame `index` (0 is the base).
    pub fn joint_pose(&self, index: usize) -> Result<Pose, KinematicsError> {
        self.frames
            .get(index)
            .copied()
            .ok_or(KinematicsError::JointOutOfRange {
                index,
                count: self.frames.len(),
            })
    }

    /// Joint velocities that move the end effector with `twist` from the current pose.
    pub fn joint_velocities(&self, twist: &Twist) -> Result<Vec<f64>, KinematicsError> {
        self.solver.joint_velocities(&self.joint_positions, twist)
    }
}

/// Capsule pose for the link between two consecutive joint frames.
///
/// The pose sits at the start frame's origin with its local z axis turned
/// toward the end frame's origin. Coincident origins keep the identity
/// rotation.
pub fn link_pose_from_frames(start: &Pose, end: &Pose) -> Pose {
    let base = start.origin();
    let span = end.origin() - base;

    if span.norm() <= FRAME_COINCIDENCE {
        return Pose::from_rotation_at(Rotation3::identity(), base);
    }

    let direction = span.normalize();
    let rotation = Rotation3::rotation_between(&Vector3::z(), &direction)
        .unwrap_or_else(|| Rotation3::from_axis_angle(&Vector3::x_axis(), PI));
    Pose::from_rotation_at(rotation, base)
}
