//! Configuration module
//!
//! Handles calibration constants, pacing ranges, and debug output settings.

pub mod settings;

use std::path::PathBuf;

pub use settings::{
    ButtonSettings, ColorSignature, DebugSettings, DetectionSettings, Settings, REFERENCE_HEIGHT,
};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}
