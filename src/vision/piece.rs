//! Piece detection
//!
//! Finds the player piece by its body color. The widest row of the piece is
//! its base, so the modal row doubles as the base line and its width as a
//! radius estimate.

use image::RgbImage;

use super::histogram::FrequencyMap;
use super::ScanWindow;
use crate::config::{ColorSignature, DetectionSettings};
use crate::game::Point;

/// Detected piece position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceLocation {
    /// Modal column and modal row of piece-colored pixels
    pub point: Point,
    /// Pixel count of the modal row, used as the piece's half-width
    pub radius: u32,
}

/// Color-signature scanner for the piece
#[derive(Debug, Clone)]
pub struct PieceLocator {
    signature: ColorSignature,
    scan_step: u32,
}

impl PieceLocator {
    /// Create a locator from detection settings
    pub fn new(settings: &DetectionSettings) -> Self {
        Self {
            signature: settings.piece_color,
            scan_step: settings.scan_step.max(1),
        }
    }

    /// Locate the piece, or `None` if no pixel matches its color
    pub fn locate(&self, frame: &RgbImage) -> Option<PieceLocation> {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return None;
        }

        let window = ScanWindow::new(
            self.scan_start(frame)..height * 2 / 3,
            width / 8..width - width / 8,
        )
        .clipped(width, height);

        let mut columns = FrequencyMap::new();
        let mut rows = FrequencyMap::new();
        for y in window.rows.clone() {
            for x in window.columns.clone() {
                if self.signature.matches(frame.get_pixel(x, y)) {
                    columns.add(x);
                    rows.add(y);
                }
            }
        }

        let (x, _) = columns.mode()?;
        let (y, radius) = rows.mode()?;
        log::debug!(
            "Piece at ({}, {}) radius {} from {} columns / {} rows",
            x,
            y,
            radius,
            columns.len(),
            rows.len()
        );

        Some(PieceLocation {
            point: Point::new(x, y),
            radius,
        })
    }

    /// First row worth scanning
    ///
    /// The background above the action is a flat gradient, one color per row.
    /// Probes every `scan_step` rows of the middle band and backs off one step
    /// from the first row that is not a single color. Starts at the top when
    /// every probe is flat.
    pub fn scan_start(&self, frame: &RgbImage) -> u32 {
        let (_, height) = frame.dimensions();
        let band = ScanWindow::middle_band(frame.width(), height);

        band.rows
            .step_by(self.scan_step as usize)
            .find(|&y| !row_is_flat(frame, y))
            .map(|y| y.saturating_sub(self.scan_step))
            .unwrap_or(0)
    }
}

/// Whether every pixel in row `y` equals the row's first pixel
fn row_is_flat(frame: &RgbImage, y: u32) -> bool {
    let first = frame.get_pixel(0, y);
    (1..frame.width()).all(|x| frame.get_pixel(x, y) == first)
}
