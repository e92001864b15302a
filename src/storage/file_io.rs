//! JSON file I/O with atomic replacement
//!
//! Data files are only ever replaced whole: the new content goes to a
//! sibling temp file, is synced, then renamed over the original. A crash
//! leaves either the old file or the new one, never a torn write.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::CamError;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

fn storage_err(action: &str, path: &Path, err: impl std::fmt::Display) -> CamError {
    CamError::Storage(format!("Failed to {} {}: {}", action, path.display(), err))
}

/// Read JSON from `path`, or `T::default()` when the file is absent
pub fn read_json<T, P>(path: P) -> Result<T, CamError>
where
    T: DeserializeOwned + Default,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    match File::open(path) {
        Ok(file) => parse(path, file),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(storage_err("open", path, e)),
    }
}

/// Read JSON from a file that must exist
pub fn read_json_required<T, P>(path: P) -> Result<T, CamError>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| storage_err("open", path, e))?;
    parse(path, file)
}

fn parse<T: DeserializeOwned>(path: &Path, file: File) -> Result<T, CamError> {
    serde_json::from_reader(BufReader::new(file)).map_err(|e| storage_err("parse", path, e))
}

/// Temp path unique to this process and write, next to the target
fn temp_path_for(path: &Path) -> PathBuf {
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_string());
    path.with_file_name(format!(".{}.{}.{}.tmp", name, std::process::id(), n))
}

/// Write JSON to a file atomically (write to temp, sync, then rename)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> Result<(), CamError>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| storage_err("create directory", parent, e))?;
    }

    let temp_path = temp_path_for(path);
    let result = write_then_rename(&temp_path, path, data);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_then_rename<T: Serialize>(temp_path: &Path, path: &Path, data: &T) -> Result<(), CamError> {
    let file = File::create(temp_path).map_err(|e| storage_err("create", temp_path, e))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| storage_err("serialize", path, e))?;
    writer.flush().map_err(|e| storage_err("flush", temp_path, e))?;
    writer
        .get_ref()
        .sync_all()
        .map_err(|e| storage_err("sync", temp_path, e))?;

    fs::rename(temp_path, path).map_err(|e| storage_err("replace", path, e))
}
