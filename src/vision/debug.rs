//! Screenshot backups and annotated debug frames
//!
//! Purely observational: nothing written here feeds back into detection.

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, draw_line_segment_mut};

use super::{Detection, VisionError};
use crate::config::DebugSettings;

const PIECE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const PLATFORM_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const LINE_COLOR: Rgb<u8> = Rgb([255, 0, 255]);
const MARK_RADIUS: i32 = 10;

/// Writes raw and annotated screenshots into one directory
pub struct DebugSink {
    dir: PathBuf,
    max_files: usize,
}

impl DebugSink {
    /// Create the sink, creating its directory if needed
    pub fn new(dir: impl Into<PathBuf>, max_files: usize) -> Result<Self, VisionError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, max_files })
    }

    /// Create the sink from settings, or `None` when disabled
    pub fn from_settings(settings: &DebugSettings) -> Result<Option<Self>, VisionError> {
        if !settings.enabled {
            return Ok(None);
        }
        Self::new(&settings.backup_dir, settings.max_files).map(Some)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save the raw frame as `<ts>.png`
    pub fn backup(&self, timestamp: u64, frame: &RgbImage) -> Result<PathBuf, VisionError> {
        let path = self.dir.join(format!("{}.png", timestamp));
        frame.save(&path)?;
        Ok(path)
    }

    /// Save the frame with the detection drawn on it as `<ts>_d.png`
    pub fn save_annotated(
        &self,
        timestamp: u64,
        frame: &RgbImage,
        detection: &Detection,
    ) -> Result<PathBuf, VisionError> {
        let annotated = annotate(frame, detection);
        let path = self.dir.join(format!("{}_d.png", timestamp));
        annotated.save(&path)?;
        Ok(path)
    }

    /// Backup, annotate, and prune in one go
    pub fn record(
        &self,
        timestamp: u64,
        frame: &RgbImage,
        detection: &Detection,
    ) -> Result<(), VisionError> {
        self.backup(timestamp, frame)?;
        self.save_annotated(timestamp, frame, detection)?;
        self.prune()?;
        Ok(())
    }

    /// Delete the oldest PNGs beyond `max_files`
    pub fn prune(&self) -> Result<usize, VisionError> {
        if self.max_files == 0 {
            return Ok(0);
        }

        let mut files: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "png"))
            .collect();
        if files.len() <= self.max_files {
            return Ok(0);
        }

        // Names start with the unix timestamp
        files.sort();
        let excess = files.len() - self.max_files;
        for path in &files[..excess] {
            fs::remove_file(path)?;
        }
        log::debug!("Pruned {} old screenshots from {}", excess, self.dir.display());
        Ok(excess)
    }
}

/// Draw piece, platform, and the jump line onto a copy of the frame
pub fn annotate(frame: &RgbImage, detection: &Detection) -> RgbImage {
    let mut canvas = frame.clone();
    let (width, height) = canvas.dimensions();
    let piece = (detection.piece.x as f32, detection.piece.y as f32);
    let platform = (detection.platform.x as f32, detection.platform.y as f32);

    draw_line_segment_mut(&mut canvas, piece, platform, LINE_COLOR);

    // Cross-hair through the landing point
    draw_line_segment_mut(
        &mut canvas,
        (platform.0, 0.0),
        (platform.0, height as f32),
        PLATFORM_COLOR,
    );
    draw_line_segment_mut(
        &mut canvas,
        (0.0, platform.1),
        (width as f32, platform.1),
        PLATFORM_COLOR,
    );

    draw_filled_circle_mut(
        &mut canvas,
        (piece.0 as i32, piece.1 as i32),
        MARK_RADIUS,
        PIECE_COLOR,
    );
    draw_filled_circle_mut(
        &mut canvas,
        (platform.0 as i32, platform.1 as i32),
        MARK_RADIUS,
        PLATFORM_COLOR,
    );
    if detection.piece_radius > 0 {
        draw_hollow_circle_mut(
            &mut canvas,
            (piece.0 as i32, piece.1 as i32),
            detection.piece_radius as i32,
            PIECE_COLOR,
        );
    }

    canvas
}
