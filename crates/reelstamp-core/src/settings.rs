//! Timestamp Settings
//!
//! Persistent conversion settings with:
//! - Serde defaults for missing fields
//! - Atomic file writes (temp file + rename)
//! - Schema version for migrations
//!
//! Stored as camelCase JSON, e.g.:
//!
//! ```json
//! { "version": 1, "minutesFormula": "conventional", "negativeSeconds": "reject" }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::{MinutesFormula, Timestamp, TimestampError, TimestampResult};

/// Settings schema version for migration support
pub const SETTINGS_VERSION: u32 = 1;

/// Default settings file name
pub const SETTINGS_FILE: &str = "reelstamp.json";

/// What to do with negative, non-finite or out-of-range seconds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NegativeSecondsPolicy {
    /// Clamp to `00:00:00.000`
    #[default]
    Clamp,
    /// Fail with `InvalidSeconds`
    Reject,
}

/// Conversion settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimestampSettings {
    /// Schema version for migrations
    #[serde(default = "default_version")]
    pub version: u32,

    /// Minutes derivation used when building timestamps from seconds
    #[serde(default)]
    pub minutes_formula: MinutesFormula,

    /// Handling of negative and non-finite seconds
    #[serde(default)]
    pub negative_seconds: NegativeSecondsPolicy,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

impl Default for TimestampSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            minutes_formula: MinutesFormula::default(),
            negative_seconds: NegativeSecondsPolicy::default(),
        }
    }
}

impl TimestampSettings {
    /// Normalizes settings so persisted state is always valid.
    pub fn normalize(&mut self) {
        self.version = SETTINGS_VERSION;
    }

    /// Builds a timestamp from seconds according to these settings
    pub fn seconds_to_timestamp(&self, seconds: f64) -> TimestampResult<Timestamp> {
        match self.negative_seconds {
            NegativeSecondsPolicy::Clamp => {
                Ok(Timestamp::from_seconds_with(seconds, self.minutes_formula))
            }
            NegativeSecondsPolicy::Reject => {
                Timestamp::try_from_seconds(seconds, self.minutes_formula)
            }
        }
    }

    /// Returns `left - right` using the configured minutes formula
    pub fn difference(&self, left: &Timestamp, right: &Timestamp) -> TimestampResult<Timestamp> {
        left.subtract_with(right, self.minutes_formula)
    }
}

// =============================================================================
// Settings Store
// =============================================================================

/// Loads and saves settings at a fixed path
pub struct SettingsStore {
    settings_path: PathBuf,
}

impl SettingsStore {
    /// Create a store for the given settings file
    pub fn new(settings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
        }
    }

    /// Create a store for [`SETTINGS_FILE`] inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(SETTINGS_FILE))
    }

    /// Get the settings file path
    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Load settings, returning defaults if the file is missing or unreadable
    pub fn load(&self) -> TimestampSettings {
        match self.try_load() {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to load settings, using defaults: {}", e);
                TimestampSettings::default()
            }
        }
    }

    /// Load settings, returning defaults only if the file is missing
    pub fn try_load(&self) -> TimestampResult<TimestampSettings> {
        if !self.settings_path.exists() {
            info!("Settings file not found, using defaults");
            return Ok(TimestampSettings::default());
        }

        let content = fs::read_to_string(&self.settings_path).map_err(|e| {
            TimestampError::Settings(format!("Failed to read settings file: {}", e))
        })?;

        let mut settings = serde_json::from_str::<TimestampSettings>(&content).map_err(|e| {
            TimestampError::Settings(format!("Failed to parse settings file: {}", e))
        })?;

        if settings.version < SETTINGS_VERSION {
            info!(
                "Migrating settings from version {} to {}",
                settings.version, SETTINGS_VERSION
            );
        }

        settings.normalize();
        Ok(settings)
    }

    /// Save settings using atomic write (temp file + rename)
    pub fn save(&self, settings: &TimestampSettings) -> TimestampResult<TimestampSettings> {
        let mut normalized = settings.clone();
        normalized.normalize();

        if let Some(parent) = self.settings_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    TimestampError::Settings(format!("Failed to create settings directory: {}", e))
                })?;
            }
        }

        let content = serde_json::to_string_pretty(&normalized).map_err(|e| {
            TimestampError::Settings(format!("Failed to serialize settings: {}", e))
        })?;

        let temp_path = self.settings_path.with_extension("json.tmp");
        if temp_path.exists() {
            let _ = fs::remove_file(&temp_path);
        }

        if let Err(e) = write_synced(&temp_path, &content).and_then(|()| self.swap_in(&temp_path))
        {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        info!("Settings saved to {:?}", self.settings_path);
        Ok(normalized)
    }

    /// Moves the written temp file over the settings file.
    ///
    /// `fs::rename` does not overwrite on Windows, so the old file is moved to
    /// a backup first and put back if the swap fails.
    fn swap_in(&self, temp_path: &Path) -> TimestampResult<()> {
        if !cfg!(windows) {
            return fs::rename(temp_path, &self.settings_path).map_err(|e| {
                TimestampError::Settings(format!("Failed to finalize settings file: {}", e))
            });
        }

        let backup_path = self.settings_path.with_extension("json.bak");
        if backup_path.exists() {
            let _ = fs::remove_file(&backup_path);
        }

        if self.settings_path.exists() {
            fs::rename(&self.settings_path, &backup_path).map_err(|e| {
                TimestampError::Settings(format!("Failed to backup existing settings file: {}", e))
            })?;
        }

        match fs::rename(temp_path, &self.settings_path) {
            Ok(()) => {
                if backup_path.exists() {
                    let _ = fs::remove_file(&backup_path);
                }
                Ok(())
            }
            Err(e) => {
                if backup_path.exists() {
                    let _ = fs::rename(&backup_path, &self.settings_path);
                }
                Err(TimestampError::Settings(format!(
                    "Failed to finalize settings file: {}",
                    e
                )))
            }
        }
    }
}

fn write_synced(path: &Path, content: &str) -> TimestampResult<()> {
    let mut file = fs::File::create(path).map_err(|e| {
        TimestampError::Settings(format!("Failed to create temp settings file: {}", e))
    })?;
    file.write_all(content.as_bytes())
        .map_err(|e| TimestampError::Settings(format!("Failed to write settings: {}", e)))?;
    file.sync_all()
        .map_err(|e| TimestampError::Settings(format!("Failed to sync settings file: {}", e)))
}
