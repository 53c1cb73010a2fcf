//! Kinematic chain interface and a revolute serial-chain solver.
//!
//! The monitor only needs the ordered frames that bound each link and a
//! joint-velocity solve for a desired end-effector twist. Anything able to
//! produce those (a URDF-backed solver, a vendor SDK, a test double)
//! implements [`KinematicSolver`].

use nalgebra::{DMatrix, DVector, Isometry3, Translation3, UnitQuaternion, UnitVector3, Vector3, Vector6};
use serde::{Deserialize, Serialize};

use collision_kernel::Pose;

use crate::error::KinematicsError;

/// Desired end-effector velocity: linear (m/s) and angular (rad/s), world frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Twist {
    pub linear: Vector3<f64>,
    pub angular: Vector3<f64>,
}

impl Twist {
    pub fn new(linear: Vector3<f64>, angular: Vector3<f64>) -> Self {
        Self { linear, angular }
    }

    pub fn zero() -> Self {
        Self::new(Vector3::zeros(), Vector3::zeros())
    }

    pub fn to_vector6(&self) -> Vector6<f64> {
        Vector6::new(
            self.linear.x,
            self.linear.y,
            self.linear.z,
            self.angular.x,
            self.angular.y,
            self.angular.z,
        )
    }
}

/// Forward and differential kinematics of a serial arm.
pub trait KinematicSolver: Send + Sync {
    /// Number of actuated joints.
    fn joint_count(&self) -> usize;

    /// Ordered frames bounding the links, base first. Link `i` runs from
    /// frame `i` to frame `i + 1`.
    fn link_frames(&self, joints: &[f64]) -> Result<Vec<Pose>, KinematicsError>;

    /// Joint velocities that realize `twist` at the end effector.
    fn joint_velocities(&self, joints: &[f64], twist: &Twist) -> Result<Vec<f64>, KinematicsError>;
}

/// A single revolute joint.
#[derive(Debug, Clone)]
pub struct ChainJoint {
    pub name: String,
    /// Static transform from the previous joint frame to this one.
    pub origin: Isometry3<f64>,
    /// Rotation axis in this joint's frame.
    pub axis: UnitVector3<f64>,
}

/// Damped least-squares parameters for the velocity solve.
#[derive(Debug, Clone, Copy)]
pub struct DlsConfig {
    /// Damping factor (lambda); larger is more robust near singularities.
    pub damping: f64,
}

impl Default for DlsConfig {
    fn default() -> Self {
        Self { damping: 0.01 }
    }
}

/// Revolute serial chain: each joint applies its static origin, then rotates
/// about its axis; a fixed tip offset follows the last joint.
#[derive(Debug, Clone)]
pub struct SerialChain {
    joints: Vec<ChainJoint>,
    tip: Isometry3<f64>,
    dls: DlsConfig,
}

impl SerialChain {
    pub fn new(joints: Vec<ChainJoint>, tip: Isometry3<f64>) -> Self {
        Self {
            joints,
            tip,
            dls: DlsConfig::default(),
        }
    }

    pub fn with_dls(mut self, dls: DlsConfig) -> Self {
        self.dls = dls;
        self
    }

    /// Chain whose links are stacked along z with the given lengths, every
    /// joint turning about its local y axis. At zero joint angles the arm is
    /// a straight vertical line.
    pub fn planar(lengths: &[f64]) -> Self {
        let mut offset = 0.0;
        let joints = lengths
            .iter()
            .enumerate()
            .map(|(i, &length)| {
                let joint = ChainJoint {
                    name: format!("joint_{}", i + 1),
                    origin: Isometry3::from_parts(Translation3::new(0.0, 0.0, offset), UnitQuaternion::identity()),
                    axis: Vector3::y_axis(),
                };
                offset = length;
                joint
            })
            .collect();
        let tip = Isometry3::from_parts(Translation3::new(0.0, 0.0, offset), UnitQuaternion::identity());
        Self::new(joints, tip)
    }

    pub fn joints(&self) -> &[ChainJoint] {
        &self.joints
    }

    fn check_joints(&self, q: &[f64]) -> Result<(), KinematicsError> {
        if q.len() != self.joints.len() {
            return Err(KinematicsError::JointCountMismatch {
                expected: self.joints.len(),
                actual: q.len(),
            });
        }
        if let Some((index, &value)) = q.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(KinematicsError::NonFiniteJointValue { index, value });
        }
        Ok(())
    }

    /// World isometries of every joint frame after motion, followed by the tip.
    fn frames(&self, q: &[f64]) -> Vec<Isometry3<f64>> {
        let mut transform = Isometry3::identity();
        let mut frames = Vec::with_capacity(self.joints.len() + 1);
        for (joint, &angle) in self.joints.iter().zip(q) {
            transform *= joint.origin;
            transform *= joint_rotation(&joint.axis, angle);
            frames.push(transform);
        }
        frames.push(transform * self.tip);
        frames
    }

    /// Geometric Jacobian (6 x n): linear rows on top, angular below.
    pub fn jacobian(&self, q: &[f64]) -> Result<DMatrix<f64>, KinematicsError> {
        self.check_joints(q)?;

        let n = self.joints.len();
        let mut transform = Isometry3::identity();
        let mut origins = Vec::with_capacity(n);
        let mut axes = Vec::with_capacity(n);
        for (joint, &angle) in self.joints.iter().zip(q) {
            transform *= joint.origin;
            origins.push(transform.translation.vector);
            axes.push(transform.rotation * joint.axis.into_inner());
            transform *= joint_rotation(&joint.axis, angle);
        }
        let ee = (transform * self.tip).translation.vector;

        let mut jacobian = DMatrix::<f64>::zeros(6, n);
        for (i, (origin, axis)) in origins.iter().zip(&axes).enumerate() {
            let linear = axis.cross(&(ee - origin));
            jacobian.fixed_view_mut::<3, 1>(0, i).copy_from(&linear);
            jacobian.fixed_view_mut::<3, 1>(3, i).copy_from(axis);
        }
        Ok(jacobian)
    }
}

impl KinematicSolver for SerialChain {
    fn joint_count(&self) -> usize {
        self.joints.len()
    }

    fn link_frames(&self, joints: &[f64]) -> Result<Vec<Pose>, KinematicsError> {
        self.check_joints(joints)?;
        Ok(self.frames(joints).iter().map(Pose::from_isometry).collect())
    }

    fn joint_velocities(&self, joints: &[f64], twist: &Twist) -> Result<Vec<f64>, KinematicsError> {
        let jacobian = self.jacobian(joints)?;

        // DLS: dq = J^T (J J^T + lambda^2 I)^{-1} * twist
        let jjt = &jacobian * jacobian.transpose();
        let damped = jjt + DMatrix::<f64>::identity(6, 6) * (self.dls.damping * self.dls.damping);
        let damped_inv = damped.try_inverse().ok_or(KinematicsError::SingularJacobian)?;
        let target = DVector::from_column_slice(twist.to_vector6().as_slice());
        let dq = jacobian.transpose() * damped_inv * target;

        Ok(dq.iter().copied().collect())
    }
}

fn joint_rotation(axis: &UnitVector3<f64>, angle: f64) -> Isometry3<f64> {
    Isometry3::from_parts(Translation3::identity(), UnitQuaternion::from_axis_angle(axis, angle))
}
