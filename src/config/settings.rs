//! Calibration settings and detection constants
//!
//! Every threshold the detectors use lives here so it can be recalibrated per
//! device resolution without touching the scanners. The defaults are tuned for
//! a 1080x1920 portrait capture.

use std::fs;
use std::path::Path;

use image::Rgb;
use serde::{Deserialize, Serialize};

use crate::stealth::StealthConfig;

use super::ConfigError;

/// Height the default constants were measured at
pub const REFERENCE_HEIGHT: u32 = 1920;

/// Main settings structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Press time per pixel of jump distance (ms/px)
    pub press_coefficient: f64,
    /// Shortest press ever dispatched (ms)
    pub min_press_ms: u32,
    /// Scanner thresholds
    pub detection: DetectionSettings,
    /// Where the swipe lands on screen
    pub button: ButtonSettings,
    /// Anti-detection pacing
    pub stealth: StealthConfig,
    /// Screenshot backups and annotated frames
    pub debug: DebugSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            press_coefficient: 1.392,
            min_press_ms: 200,
            detection: DetectionSettings::default(),
            button: ButtonSettings::default(),
            stealth: StealthConfig::default(),
            debug: DebugSettings::default(),
        }
    }
}

impl Settings {
    /// Built-in settings scaled to a capture height
    ///
    /// Only the vertical platform span depends on resolution; the color bands
    /// are resolution independent.
    pub fn for_resolution(width: u32, height: u32) -> Self {
        let mut settings = Self::default();
        if height != REFERENCE_HEIGHT && height > 0 {
            let scale = height as f64 / REFERENCE_HEIGHT as f64;
            let span = settings.detection.max_platform_span as f64 * scale;
            settings.detection.max_platform_span = span.round() as u32;
            // Same jump covers fewer pixels on a shorter screen
            settings.press_coefficient /= scale;
        }
        log::debug!(
            "Built-in settings for {}x{}: span={} coefficient={:.3}",
            width,
            height,
            settings.detection.max_platform_span,
            settings.press_coefficient
        );
        settings
    }

    /// Parse settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Load the config that matches a screen resolution
    ///
    /// Looks for `<dir>/<w>x<h>/config.json`, then `<dir>/default.json`, then
    /// falls back to [`Settings::for_resolution`].
    pub fn load_for_resolution(dir: &Path, width: u32, height: u32) -> Result<Self, ConfigError> {
        let specific = dir.join(format!("{}x{}", width, height)).join("config.json");
        if specific.is_file() {
            log::info!("Loading config {}", specific.display());
            return Self::load(&specific);
        }

        let fallback = dir.join("default.json");
        if fallback.is_file() {
            log::info!("No config for {}x{}, using {}", width, height, fallback.display());
            return Self::load(&fallback);
        }

        log::warn!(
            "No config found under {}, using built-in values for {}x{}",
            dir.display(),
            width,
            height
        );
        Ok(Self::for_resolution(width, height))
    }
}

/// Per-channel color band with exclusive bounds, `min < c < max`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSignature {
    pub red: (u8, u8),
    pub green: (u8, u8),
    pub blue: (u8, u8),
}

impl ColorSignature {
    /// Check whether a pixel lies strictly inside all three bands
    pub fn matches(&self, pixel: &Rgb<u8>) -> bool {
        let within = |value: u8, (min, max): (u8, u8)| min < value && value < max;
        within(pixel[0], self.red) && within(pixel[1], self.green) && within(pixel[2], self.blue)
    }
}

impl Default for ColorSignature {
    /// The dark purple-blue of the piece's body
    fn default() -> Self {
        Self {
            red: (50, 60),
            green: (50, 60),
            blue: (85, 105),
        }
    }
}

/// Thresholds for the piece and platform scanners
///
/// All of these were measured on one game version at 1080x1920 and must be
/// recalibrated for other devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSettings {
    /// Color band of the piece body
    pub piece_color: ColorSignature,
    /// Row stride when probing for the first non-flat row
    pub scan_step: u32,
    /// Manhattan color distance that counts as an edge
    pub edge_threshold: u32,
    /// Largest vertical distance between a platform's top and bottom vertex
    pub max_platform_span: u32,
    /// Rows above/below the landing point compared by the asymmetry check
    pub symmetry_probe: u32,
    /// Center marker shown after a perfect landing
    pub marker_color: [u8; 3],
    /// Rows below the top vertex searched for the marker
    pub marker_search_depth: u32,
    /// Offset from the marker's first row to the landing point
    pub marker_offset: u32,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            piece_color: ColorSignature::default(),
            scan_step: 50,
            edge_threshold: 10,
            max_platform_span: 274,
            symmetry_probe: 3,
            marker_color: [245, 245, 245],
            marker_search_depth: 200,
            marker_offset: 10,
        }
    }
}

/// Swipe anchor, expressed against the reference height
///
/// The anchor sits on the "play again" button so a press after game over
/// restarts the round. X is always the horizontal centre.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ButtonSettings {
    /// Anchor Y on a [`REFERENCE_HEIGHT`] screen
    pub ref_y: u32,
}

impl Default for ButtonSettings {
    fn default() -> Self {
        Self { ref_y: 1584 }
    }
}

/// Screenshot persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugSettings {
    /// Save raw and annotated frames every jump
    pub enabled: bool,
    /// Output directory
    pub backup_dir: String,
    /// Files kept before the oldest are pruned (0 = unlimited)
    pub max_files: usize,
}

impl Default for DebugSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            backup_dir: "screenshot_backups".to_string(),
            max_files: 200,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.min_press_ms, 200);
        assert_eq!(settings.detection.max_platform_span, 274);
        assert_eq!(settings.detection.marker_color, [245, 245, 245]);
    }

    #[test]
    fn test_color_signature_bounds_are_exclusive() {
        let signature = ColorSignature::default();
        assert!(signature.matches(&Rgb([55, 55, 95])));
        assert!(!signature.matches(&Rgb([50, 55, 95])));
        assert!(!signature.matches(&Rgb([55, 60, 95])));
        assert!(!signature.matches(&Rgb([55, 55, 105])));
        assert!(!signature.matches(&Rgb([200, 200, 200])));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{"press_coefficient": 2.0}"#).unwrap();
        assert_eq!(settings.press_coefficient, 2.0);
        assert_eq!(settings.min_press_ms, 200);
        assert_eq!(settings.detection.scan_step, 50);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(Settings::from_json("{not json").is_err());
    }

    #[test]
    fn test_for_resolution_scales_span() {
        let settings = Settings::for_resolution(720, 1280);
        assert_eq!(settings.detection.max_platform_span, 183);
        assert!(settings.press_coefficient > Settings::default().press_coefficient);

        let reference = Settings::for_resolution(1080, 1920);
        assert_eq!(reference.detection.max_platform_span, 274);
    }

    #[test]
    fn test_load_for_resolution_prefers_specific_file() {
        let dir = tempfile::tempdir().unwrap();
        let specific = dir.path().join("1080x1920");
        fs::create_dir_all(&specific).unwrap();
        fs::write(specific.join("config.json"), r#"{"press_coefficient": 1.5}"#).unwrap();
        fs::write(dir.path().join("default.json"), r#"{"press_coefficient": 9.0}"#).unwrap();

        let settings = Settings::load_for_resolution(dir.path(), 1080, 1920).unwrap();
        assert_eq!(settings.press_coefficient, 1.5);

        let settings = Settings::load_for_resolution(dir.path(), 720, 1280).unwrap();
        assert_eq!(settings.press_coefficient, 9.0);
    }

    #[test]
    fn test_load_for_resolution_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_for_resolution(dir.path(), 1080, 1920).unwrap();
        assert_eq!(settings.press_coefficient, Settings::default().press_coefficient);
    }
}
