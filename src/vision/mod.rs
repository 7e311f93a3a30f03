//! Vision and image processing module
//!
//! Turns a screenshot into the two points a jump needs: where the piece
//! stands and where it should land.

pub mod capture;
pub mod debug;
pub mod histogram;
pub mod piece;
pub mod platform;

use std::ops::Range;

use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::config::DetectionSettings;
use crate::game::Point;

pub use capture::{decode_png, decode_raw};
pub use debug::DebugSink;
pub use histogram::FrequencyMap;
pub use piece::{PieceLocation, PieceLocator};
pub use platform::{PlatformCandidate, PlatformLocator};

/// Result of analyzing one frame
///
/// Either both points are real or both are the sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detection {
    /// Base of the piece
    pub piece: Point,
    /// Landing point on the next platform
    pub platform: Point,
    /// Piece half-width estimate
    pub piece_radius: u32,
}

impl Detection {
    /// Whether both objects were found
    pub fn is_complete(&self) -> bool {
        !self.piece.is_sentinel() && !self.platform.is_sentinel()
    }

    /// Jump distance in pixels
    pub fn distance(&self) -> f64 {
        self.piece.distance_to(&self.platform)
    }
}

/// Runs the piece and platform locators in order
pub struct Detector {
    piece: PieceLocator,
    platform: PlatformLocator,
}

impl Detector {
    /// Create a detector from detection settings
    pub fn new(settings: &DetectionSettings) -> Self {
        Self {
            piece: PieceLocator::new(settings),
            platform: PlatformLocator::new(settings),
        }
    }

    /// Locate piece and platform
    ///
    /// A miss on either side yields the all-sentinel detection, which the
    /// press calculator turns into a minimum-length tap.
    pub fn detect(&self, frame: &RgbImage) -> Detection {
        let Some(piece) = self.piece.locate(frame) else {
            log::warn!("Piece not found");
            return Detection::default();
        };

        let Some(platform) = self.platform.locate(frame, &piece) else {
            log::warn!(
                "Platform not found (piece at {}, {})",
                piece.point.x,
                piece.point.y
            );
            return Detection::default();
        };

        Detection {
            piece: piece.point,
            platform,
            piece_radius: piece.radius,
        }
    }
}

impl Default for Detector {
    fn default() -> Self {
        Self::new(&DetectionSettings::default())
    }
}

/// Rows and columns a scan pass is restricted to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanWindow {
    pub rows: Range<u32>,
    pub columns: Range<u32>,
}

impl ScanWindow {
    pub fn new(rows: Range<u32>, columns: Range<u32>) -> Self {
        Self { rows, columns }
    }

    /// Full width, rows `[h/3, 2h/3)`
    pub fn middle_band(width: u32, height: u32) -> Self {
        Self::new(height / 3..height * 2 / 3, 0..width)
    }

    /// Restrict to `[0, width) x [0, height)`
    pub fn clipped(self, width: u32, height: u32) -> Self {
        let clip = |range: Range<u32>, limit: u32| {
            let end = range.end.min(limit);
            range.start.min(end)..end
        };
        Self {
            rows: clip(self.rows, height),
            columns: clip(self.columns, width),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }
}

/// Manhattan distance between two colors
pub fn color_distance(a: &Rgb<u8>, b: &Rgb<u8>) -> u32 {
    a.0.iter()
        .zip(b.0.iter())
        .map(|(&x, &y)| x.abs_diff(y) as u32)
        .sum()
}

/// Vision system errors
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    #[error("Invalid frame data: expected {expected} bytes, got {actual}")]
    InvalidFrameData { expected: usize, actual: usize },
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Failed to write debug output: {0}")]
    Io(#[from] std::io::Error),
}
