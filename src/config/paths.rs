//! Path management for CAM Ledger
//!
//! ## Path Resolution Order
//!
//! 1. `CAM_LEDGER_DATA_DIR` environment variable (if set)
//! 2. Unix (Linux/macOS): `$XDG_CONFIG_HOME/cam-ledger` or `~/.config/cam-ledger`
//! 3. Windows: `%APPDATA%\cam-ledger`

use std::path::{Path, PathBuf};

use crate::error::CamError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "CAM_LEDGER_DATA_DIR";

/// Locations of everything CAM Ledger keeps on disk
///
/// ```text
/// <base>/config.json
/// <base>/audit.log
/// <base>/data/records.json
/// <base>/data/directory.json
/// ```
#[derive(Debug, Clone)]
pub struct LedgerPaths {
    base_dir: PathBuf,
}

impl LedgerPaths {
    /// Resolve the base directory, honouring [`DATA_DIR_ENV`]
    pub fn new() -> Result<Self, CamError> {
        let base_dir = std::env::var_os(DATA_DIR_ENV)
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .map_or_else(resolve_default_path, Ok)?;
        Ok(Self { base_dir })
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    pub fn records_file(&self) -> PathBuf {
        self.data_dir().join("records.json")
    }

    /// Building, unit and lease snapshot imported from the property system
    pub fn directory_file(&self) -> PathBuf {
        self.data_dir().join("directory.json")
    }

    /// Create the base and data directories if they are missing
    pub fn ensure_directories(&self) -> Result<(), CamError> {
        let data_dir = self.data_dir();
        std::fs::create_dir_all(&data_dir).map_err(|e| {
            CamError::Io(format!("Failed to create {}: {}", data_dir.display(), e))
        })
    }

    /// Whether `init` has written a settings file
    pub fn is_initialized(&self) -> bool {
        self.settings_file().is_file()
    }
}

#[cfg(not(windows))]
fn resolve_default_path() -> Result<PathBuf, CamError> {
    let config_base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".config"))
            .ok_or_else(|| CamError::Config("HOME environment variable not set".into()))?,
    };
    Ok(config_base.join("cam-ledger"))
}

#[cfg(windows)]
fn resolve_default_path() -> Result<PathBuf, CamError> {
    std::env::var_os("APPDATA")
        .map(|appdata| PathBuf::from(appdata).join("cam-ledger"))
        .ok_or_else(|| CamError::Config("Could not determine APPDATA directory".into()))
}
