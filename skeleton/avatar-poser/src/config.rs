//! Animator configuration

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::character::RegionId;
use crate::error::{PoserError, Result};
use crate::joint_pose::DEFAULT_HISTORY_LIMIT;

/// Tunables of a [`PoseAnimator`](crate::animator::PoseAnimator)
///
/// Loaded from JSON; missing fields take their defaults.
///
/// ```rust
/// use avatar_poser::config::PoserConfig;
///
/// let config = PoserConfig::from_json_str(r#"{ "history_limit": 32 }"#).unwrap();
/// assert_eq!(config.history_limit, 32);
/// assert_eq!(config.frame_blend, 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoserConfig {
    /// Bound on each undo and redo stack, per joint and attribute
    pub history_limit: usize,
    /// Fraction of the remaining distance to the target covered per frame
    pub frame_blend: f64,
    /// Region of the controlling agent; characters elsewhere are not editable
    pub agent_region: u64,
}

impl Default for PoserConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            frame_blend: 1.0,
            agent_region: 0,
        }
    }
}

impl PoserConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.history_limit == 0 {
            return Err(PoserError::Config(
                "history_limit must be at least 1".to_string(),
            ));
        }

        if !(self.frame_blend > 0.0 && self.frame_blend <= 1.0) {
            return Err(PoserError::Config(format!(
                "frame_blend must be in (0, 1], got {}",
                self.frame_blend
            )));
        }

        Ok(())
    }

    pub fn agent_region(&self) -> RegionId {
        RegionId(self.agent_region)
    }
}
