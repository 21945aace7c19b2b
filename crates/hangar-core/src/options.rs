//! Campaign ruleset options.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::SaveError;

/// Ruleset values threaded into sync and repair calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignOptions {
    /// A part whose damage rises is destroyed when 2d6 rolls below this.
    /// 2 never destroys, 13 always does.
    pub destroy_part_target: u32,
    /// Days an ordered replacement spends in transit
    pub replacement_transit_days: u32,
}

impl Default for CampaignOptions {
    fn default() -> Self {
        Self {
            destroy_part_target: 10,
            replacement_transit_days: 0,
        }
    }
}

impl CampaignOptions {
    /// Load options from a JSON file; missing keys keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SaveError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
