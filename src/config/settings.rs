//! User settings for CAM Ledger
//!
//! Display preferences and the status transition policy.

use std::io::ErrorKind;

use serde::{Deserialize, Serialize};

use super::paths::LedgerPaths;
use crate::error::CamError;
use crate::models::TransitionPolicy;

/// User settings for CAM Ledger
///
/// Missing fields fall back to their defaults, so older config files keep
/// loading as settings are added.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub schema_version: u32,
    /// Currency symbol used in tables
    pub currency_symbol: String,
    /// strftime format for recorded dates
    pub date_format: String,
    /// Label for area figures
    pub area_unit: String,
    /// Which status changes the lifecycle manager accepts
    pub status_transitions: TransitionPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: 1,
            currency_symbol: "$".into(),
            date_format: "%Y-%m-%d".into(),
            area_unit: "sq ft".into(),
            status_transitions: TransitionPolicy::Strict,
        }
    }
}

impl Settings {
    /// Settings from `config.json`, or defaults when the file is absent
    ///
    /// Defaults are not written back; `init` persists them explicitly.
    pub fn load_or_create(paths: &LedgerPaths) -> Result<Self, CamError> {
        let path = paths.settings_file();
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(CamError::Io(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        serde_json::from_str(&contents)
            .map_err(|e| CamError::Config(format!("Invalid settings in {}: {}", path.display(), e)))
    }

    pub fn save(&self, paths: &LedgerPaths) -> Result<(), CamError> {
        paths.ensure_directories()?;
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| CamError::Config(format!("Failed to serialize settings: {}", e)))?;
        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| CamError::Io(format!("Failed to write settings file: {}", e)))
    }
}
