//! One control tick: pose the arm from the latest joint state, refresh both
//! distance matrices, and command a Cartesian pull toward the goal.
//!
//! Obstacle avoidance is not applied to the command; the distances are
//! reported alongside it for the caller to act on.

use std::sync::Arc;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use arm_kinematics::Twist;

use crate::error::MonitorError;
use crate::monitor::{min_entry, Monitor};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Proportional gain on the position error (1/s).
    pub gain: f64,
    /// Linear speed limit of the end effector (m/s).
    pub max_speed: f64,
    /// Within this distance of the goal the command is zero (m).
    pub goal_tolerance: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            gain: 1.0,
            max_speed: 0.1,
            goal_tolerance: 0.005,
        }
    }
}

/// Everything one tick produces.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlOutput {
    pub twist: Twist,
    pub joint_velocities: Vec<f64>,
    pub end_effector: Point3<f64>,
    /// Obstacles x links.
    pub obstacle_distances: Vec<Vec<f64>>,
    /// Links x links, zero diagonal.
    pub link_distances: Vec<Vec<f64>>,
    /// Smallest entry of `obstacle_distances`.
    pub min_clearance: Option<f64>,
}

#[derive(Debug)]
pub struct ArmController {
    monitor: Arc<Monitor>,
    config: ControllerConfig,
    joint_positions: Vec<f64>,
    goal: Point3<f64>,
}

impl ArmController {
    /// The goal starts at the arm's current end effector, so the first tick
    /// commands no motion.
    pub fn new(monitor: Arc<Monitor>, config: ControllerConfig) -> Self {
        let (joint_positions, goal) = {
            let arm = monitor.arm().read();
            (arm.joint_positions().to_vec(), arm.end_effector_pose().origin())
        };
        Self {
            monitor,
            config,
            joint_positions,
            goal,
        }
    }

    pub fn monitor(&self) -> &Arc<Monitor> {
        &self.monitor
    }

    pub fn goal(&self) -> Point3<f64> {
        self.goal
    }

    pub fn set_goal(&mut self, goal: Point3<f64>) {
        debug!(?goal, "goal updated");
        self.goal = goal;
    }

    /// Latest measured joint positions; applied on the next tick.
    pub fn set_joint_state(&mut self, positions: &[f64]) {
        self.joint_positions.clear();
        self.joint_positions.extend_from_slice(positions);
    }

    /// Proportional, speed-limited pull from `position` toward the goal.
    pub fn goal_twist(&self, position: &Point3<f64>) -> Twist {
        let error = self.goal - position;
        if error.norm() <= self.config.goal_tolerance {
            return Twist::zero();
        }
        let mut linear = error * self.config.gain;
        let speed = linear.norm();
        if speed > self.config.max_speed {
            linear *= self.config.max_speed / speed;
        }
        Twist::new(linear, Vector3::zeros())
    }

    #[instrument(skip(self))]
    pub fn tick(&mut self) -> Result<ControlOutput, MonitorError> {
        let (end_effector, twist, joint_velocities) = {
            let mut arm = self.monitor.arm().write();
            arm.update_pose(&self.joint_positions)?;
            let end_effector = arm.end_effector_pose().origin();
            let twist = self.goal_twist(&end_effector);
            let joint_velocities = arm.joint_velocities(&twist)?;
            (end_effector, twist, joint_velocities)
        };

        let obstacle_distances = self.monitor.distance_to_obstacles()?;
        let link_distances = self.monitor.distance_between_links()?;
        let min_clearance = min_entry(&obstacle_distances);

        debug!(?min_clearance, "tick complete");
        Ok(ControlOutput {
            twist,
            joint_velocities,
            end_effector,
            obstacle_distances,
            link_distances,
            min_clearance,
        })
    }
}
