//! File-backed storage for the global record and zone records
//!
//! Layout under the store root:
//!
//! ```text
//! <root>/Settings/global_config.json
//! <root>/Zones/<safe zone name>.json
//! ```
//!
//! A missing or unreadable file never stops the application: loads fall back
//! to defaults (or skip the zone) and log what went wrong.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::settings::SettingsRecord;
use super::zone::ZoneRecord;

/// File name of the global record
pub const GLOBAL_CONFIG_FILE_NAME: &str = "global_config.json";

/// Longest file stem derived from a zone name
pub const MAX_ZONE_FILE_STEM: usize = 60;

const APP_DIR: &str = "EgansFloatboard";
const STORE_DIR: &str = "Zones";
const ZONES_DIR: &str = "Zones";
const SETTINGS_DIR: &str = "Settings";

/// Errors raised by the config store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No local data or home directory is available")]
    NoDataDirectory,

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Durable storage for global and per-zone settings
#[derive(Debug, Clone)]
pub struct ConfigStore {
    root: PathBuf,
}

impl ConfigStore {
    /// Creates a store rooted at `root`; directories are created on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store under the user's local application data directory
    pub fn default_location() -> Result<Self, StoreError> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or(StoreError::NoDataDirectory)?;
        Ok(Self::new(base.join(APP_DIR).join(STORE_DIR)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn zones_dir(&self) -> PathBuf {
        self.root.join(ZONES_DIR)
    }

    pub fn settings_dir(&self) -> PathBuf {
        self.root.join(SETTINGS_DIR)
    }

    pub fn global_file(&self) -> PathBuf {
        self.settings_dir().join(GLOBAL_CONFIG_FILE_NAME)
    }

    /// File a zone with this display name is saved to
    pub fn zone_file_path(&self, zone_name: &str) -> PathBuf {
        self.zones_dir()
            .join(format!("{}.json", sanitize_zone_name(zone_name)))
    }

    /// Loads the global record, falling back to defaults
    ///
    /// Missing keys take their default value and out-of-range integers are
    /// clamped into range.
    pub fn load_global(&self) -> SettingsRecord {
        let path = self.global_file();
        match read_json::<SettingsRecord>(&path) {
            Ok(Some(record)) => record.sanitized(),
            Ok(None) => {
                log::info!("No global config at {}, using defaults", path.display());
                SettingsRecord::default()
            }
            Err(err) => {
                log::warn!("{err}; using default global settings");
                SettingsRecord::default()
            }
        }
    }

    pub fn save_global(&self, record: &SettingsRecord) -> Result<(), StoreError> {
        write_json_atomic(&self.global_file(), record)
    }

    /// Loads every readable zone file, ordered by file name
    ///
    /// Corrupt files are logged and skipped.
    pub fn load_all_zones(&self) -> Vec<ZoneRecord> {
        let dir = self.zones_dir();
        let read_dir = match fs::read_dir(&dir) {
            Ok(read_dir) => read_dir,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                log::warn!("Cannot list zones in {}: {err}", dir.display());
                return Vec::new();
            }
        };

        let mut paths: Vec<PathBuf> = read_dir
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| is_zone_file(path))
            .collect();
        paths.sort();

        let mut zones = Vec::with_capacity(paths.len());
        for path in paths {
            match read_json::<ZoneRecord>(&path) {
                Ok(Some(mut record)) => {
                    record.settings = record.settings.sanitized();
                    zones.push(record);
                }
                Ok(None) => {}
                Err(err) => log::warn!("Skipping zone file: {err}"),
            }
        }
        log::debug!("Loaded {} zone record(s) from {}", zones.len(), dir.display());
        zones
    }

    /// Writes a zone record to the file derived from its display name
    pub fn save_zone(&self, record: &ZoneRecord) -> Result<PathBuf, StoreError> {
        let path = self.zone_file_path(&record.zone_name);
        write_json_atomic(&path, record)?;
        Ok(path)
    }

    /// Deletes the file of a display name; a missing file is not an error
    pub fn remove_zone_file(&self, zone_name: &str) -> Result<(), StoreError> {
        let path = self.zone_file_path(zone_name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

/// Derives a filesystem-safe file stem from a zone display name
///
/// Keeps alphanumerics, `-`, `_` and spaces, trims, turns each space into
/// `_`, falls back to `Zone` and keeps at most 60 characters.
pub fn sanitize_zone_name(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | ' '))
        .collect();
    let stem = kept.trim().replace(' ', "_");
    let stem = if stem.is_empty() { "Zone".to_string() } else { stem };
    stem.chars().take(MAX_ZONE_FILE_STEM).collect()
}

/// `name` with a ` n` suffix that survives sanitizing
///
/// The base is shortened so the file stem never loses the suffix to
/// truncation.
pub fn numbered_zone_name(name: &str, n: u32) -> String {
    let suffix = format!(" {n}");
    let keep = MAX_ZONE_FILE_STEM.saturating_sub(suffix.chars().count());
    let base: String = name.trim().chars().take(keep).collect();
    format!("{}{suffix}", base.trim_end())
}

fn is_zone_file(path: &Path) -> bool {
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let is_global = path
        .file_name()
        .is_some_and(|name| name.to_string_lossy().eq_ignore_ascii_case(GLOBAL_CONFIG_FILE_NAME));
    is_json && !is_global && path.is_file()
}

/// Reads and parses a JSON file; `Ok(None)` when it does not exist
fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&text)
        .map(Some)
        .map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })
}

/// Writes pretty JSON to a sibling temp file, then renames it over `path`
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let io_error = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let text = serde_json::to_string_pretty(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, text).map_err(io_error)?;
    if let Err(source) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(io_error(source));
    }
    Ok(())
}
