//! Android integration
//!
//! The device side of the loop: pulling screenshots and sending presses,
//! either over adb from a desktop or through JNI from an on-device service.

pub mod adb;
pub mod bridge;
pub mod input;

use image::RgbImage;

use crate::game::Swipe;
use crate::vision::VisionError;

pub use adb::{AdbDevice, DeviceInfo, ScreenshotMethod};
pub use input::{InputGenerator, ScreenCoordinates};

/// Something that can hand over the latest screen
pub trait FrameSource {
    /// Capture the current screen as an RGB frame
    fn pull_frame(&mut self) -> Result<RgbImage, DeviceError>;
}

/// Something that can press the screen
pub trait InputSink {
    /// Dispatch one swipe; no result beyond success
    fn swipe(&mut self, swipe: &Swipe) -> Result<(), DeviceError>;
}

/// Device communication errors
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("adb I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("`adb {command}` failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("Unreadable screenshot: {0}")]
    Screenshot(#[from] VisionError),
    #[error("No screenshot method works on this device")]
    NoScreenshotMethod,
    #[error("Unexpected adb output: {0}")]
    UnexpectedOutput(String),
}
