// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Persistence of the high score and the sound preference.
//!
//! The engine never touches storage directly. The session reads the
//! preferences once at startup and writes them back at terminal
//! transitions (high score) or on toggle (sound).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Storage error types
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Stored file could not be parsed
    #[error("Failed to parse preferences: {0}")]
    Parse(#[from] toml::de::Error),
    /// Preferences could not be serialized
    #[error("Failed to serialize preferences: {0}")]
    Serialize(#[from] toml::ser::Error),
    /// Platform has no data directory
    #[error("Failed to locate a data directory")]
    NoDataDir,
}

/// Key-value store for the values that outlive a round
pub trait ScoreStore: Send {
    /// Read the stored high score
    fn read_high_score(&self) -> Result<u32, StoreError>;
    /// Replace the stored high score
    fn write_high_score(&mut self, score: u32) -> Result<(), StoreError>;
    /// Read the sound preference
    fn read_sound_enabled(&self) -> Result<bool, StoreError>;
    /// Replace the sound preference
    fn write_sound_enabled(&mut self, enabled: bool) -> Result<(), StoreError>;
}

/// Values persisted between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Best final score seen
    #[serde(default)]
    pub high_score: u32,
    /// Whether tones are played
    #[serde(default = "default_sound_enabled")]
    pub sound_enabled: bool,
}

fn default_sound_enabled() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            high_score: 0,
            sound_enabled: default_sound_enabled(),
        }
    }
}

/// Read both preferences, falling back to defaults on any failure
pub fn load_preferences(store: &dyn ScoreStore) -> Preferences {
    let defaults = Preferences::default();

    let high_score = store.read_high_score().unwrap_or_else(|e| {
        warn!(error = %e, "could not read high score, starting from 0");
        defaults.high_score
    });
    let sound_enabled = store.read_sound_enabled().unwrap_or_else(|e| {
        warn!(error = %e, "could not read sound preference, using default");
        defaults.sound_enabled
    });

    Preferences { high_score, sound_enabled }
}

/// In-memory store, used headless and in tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    prefs: Preferences,
}

impl MemoryStore {
    /// Create a store holding the given preferences
    pub fn new(prefs: Preferences) -> Self {
        Self { prefs }
    }

    /// Current contents
    pub fn preferences(&self) -> Preferences {
        self.prefs
    }
}

impl ScoreStore for MemoryStore {
    fn read_high_score(&self) -> Result<u32, StoreError> {
        Ok(self.prefs.high_score)
    }

    fn write_high_score(&mut self, score: u32) -> Result<(), StoreError> {
        self.prefs.high_score = score;
        Ok(())
    }

    fn read_sound_enabled(&self) -> Result<bool, StoreError> {
        Ok(self.prefs.sound_enabled)
    }

    fn write_sound_enabled(&mut self, enabled: bool) -> Result<(), StoreError> {
        self.prefs.sound_enabled = enabled;
        Ok(())
    }
}

/// TOML file store
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    prefs: Preferences,
}

impl FileStore {
    /// Open a store at `path`, reading it if it exists
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let prefs = if path.exists() {
            toml::from_str(&fs::read_to_string(&path)?)?
        } else {
            Preferences::default()
        };
        Ok(Self { path, prefs })
    }

    /// Default location under the platform data directory
    pub fn default_path() -> Result<PathBuf, StoreError> {
        let data_dir = dirs::data_dir().ok_or(StoreError::NoDataDir)?;
        Ok(data_dir.join("soundmem").join("preferences.toml"))
    }

    /// Path backing this store
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, toml::to_string(&self.prefs)?)?;
        Ok(())
    }
}

impl ScoreStore for FileStore {
    fn read_high_score(&self) -> Result<u32, StoreError> {
        Ok(self.prefs.high_score)
    }

    fn write_high_score(&mut self, score: u32) -> Result<(), StoreError> {
        self.prefs.high_score = score;
        self.flush()
    }

    fn read_sound_enabled(&self) -> Result<bool, StoreError> {
        Ok(self.prefs.sound_enabled)
    }

    fn write_sound_enabled(&mut self, enabled: bool) -> Result<(), StoreError> {
        self.prefs.sound_enabled = enabled;
        self.flush()
    }
}
