//! Configuration file loading for the trainer.
//!
//! Settings live in a TOML file (`trainer.toml` by default). Every key is
//! optional; a missing file yields the defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use trainer_core::BoardGeometry;
use trainer_engine::EngineOptions;

/// Highest value Stockfish accepts for `Skill Level`.
pub const MAX_SKILL_LEVEL: u8 = 20;
/// Widest board square, in cells.
pub const MAX_SQUARE_WIDTH: u16 = 64;
/// Tallest board square, in cells.
pub const MAX_SQUARE_HEIGHT: u16 = 32;

/// Errors that can occur when loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// A value is out of range.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// The `[engine]` table.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct EngineSection {
    /// Engine executable, looked up on `PATH` when it is a bare name.
    #[serde(default = "default_engine_path")]
    pub path: String,
    #[serde(default = "default_skill_level")]
    pub skill_level: u8,
    #[serde(default = "default_depth")]
    pub depth: u32,
    #[serde(default)]
    pub threads: Option<u32>,
    #[serde(default)]
    pub hash_mb: Option<u32>,
}

fn default_engine_path() -> String {
    "stockfish".to_string()
}

fn default_skill_level() -> u8 {
    12
}

fn default_depth() -> u32 {
    15
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            path: default_engine_path(),
            skill_level: default_skill_level(),
            depth: default_depth(),
            threads: None,
            hash_mb: None,
        }
    }
}

/// The `[board]` table. Sizes are terminal cells per square.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct BoardSection {
    #[serde(default = "default_square_width")]
    pub square_width: u16,
    #[serde(default = "default_square_height")]
    pub square_height: u16,
}

fn default_square_width() -> u16 {
    7
}

fn default_square_height() -> u16 {
    3
}

impl Default for BoardSection {
    fn default() -> Self {
        Self {
            square_width: default_square_width(),
            square_height: default_square_height(),
        }
    }
}

impl BoardSection {
    /// Board geometry anchored at the terminal's top-left corner.
    #[must_use]
    pub fn geometry(&self) -> BoardGeometry {
        BoardGeometry::new(0, 0, self.square_width, self.square_height)
    }
}

/// Main trainer configuration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct TrainerConfig {
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub board: BoardSection,
    /// JSON opening catalog; the built-in catalog is used when unset.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    /// Directory for `opening-trainer.log`.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Directory SVG snapshots are written to.
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("snapshots")
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            engine: EngineSection::default(),
            board: BoardSection::default(),
            catalog: None,
            log_dir: default_log_dir(),
            snapshot_dir: default_snapshot_dir(),
        }
    }
}

impl TrainerConfig {
    /// Loads the configuration from `path`.
    ///
    /// If the file does not exist, returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// or [`ConfigError::ParseError`] if the file contains invalid TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Checks value ranges the engine and the renderer rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.path.trim().is_empty() {
            return Err(ConfigError::Invalid("engine.path is empty".to_string()));
        }
        if self.engine.skill_level > MAX_SKILL_LEVEL {
            return Err(ConfigError::Invalid(format!(
                "engine.skill_level must be at most {MAX_SKILL_LEVEL}, got {}",
                self.engine.skill_level
            )));
        }
        if self.engine.depth == 0 {
            return Err(ConfigError::Invalid("engine.depth must be at least 1".to_string()));
        }
        let width = self.board.square_width;
        let height = self.board.square_height;
        if !(3..=MAX_SQUARE_WIDTH).contains(&width) || !(1..=MAX_SQUARE_HEIGHT).contains(&height) {
            return Err(ConfigError::Invalid(format!(
                "board squares must be between 3x1 and {MAX_SQUARE_WIDTH}x{MAX_SQUARE_HEIGHT} cells, got {width}x{height}"
            )));
        }
        Ok(())
    }

    /// Engine settings for the UCI handshake and searches.
    #[must_use]
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            skill_level: Some(self.engine.skill_level),
            depth: self.engine.depth,
            threads: self.engine.threads,
            hash_mb: self.engine.hash_mb,
        }
    }
}
