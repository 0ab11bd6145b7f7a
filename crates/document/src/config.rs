use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::DocumentError;

/// Durations at or above this mark elements without a fixed length.
pub const OPEN_ENDED_DURATION: f64 = 999_999.0;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImportConfig {
    pub open_ended_duration: f64,
    /// Random ids for imported timelines and elements. When off, ids are
    /// derived from the owning chapter or track so repeated imports match.
    pub generate_ids: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            open_ended_duration: OPEN_ENDED_DURATION,
            generate_ids: true,
        }
    }
}

impl ImportConfig {
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub(crate) fn import_duration(&self, duration: f64) -> f64 {
        if duration >= self.open_ended_duration {
            0.0
        } else {
            duration
        }
    }

    pub(crate) fn export_duration(&self, duration: f64) -> f64 {
        if duration == 0.0 {
            self.open_ended_duration
        } else {
            duration
        }
    }
}
