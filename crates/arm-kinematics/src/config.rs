//! Link geometry configuration for the arm model.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::KinematicsError;

/// Collision capsule dimensions for one link.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkGeometry {
    /// Capsule axis length (meters).
    pub length: f64,
    /// Capsule radius (meters).
    pub radius: f64,
}

/// Ordered link geometry, base link first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmConfig {
    pub links: Vec<LinkGeometry>,
}

impl Default for ArmConfig {
    /// Six-link manipulator with 4 cm capsules.
    fn default() -> Self {
        let lengths = [0.15643, 0.12838, 0.21038, 0.21038, 0.20843, 0.10593];
        Self {
            links: lengths
                .iter()
                .map(|&length| LinkGeometry {
                    length,
                    radius: 0.04,
                })
                .collect(),
        }
    }
}

impl ArmConfig {
    pub fn from_json_str(json: &str) -> Result<Self, KinematicsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, KinematicsError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String, KinematicsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
