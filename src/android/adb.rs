//! adb-backed device access
//!
//! Runs `adb` as a child process for screenshots, swipes, and device
//! queries. Failures are returned as-is; there is no retry.

use std::fs;
use std::path::PathBuf;
use std::process::Command;

use image::RgbImage;

use super::{DeviceError, FrameSource, InputSink};
use crate::game::Swipe;
use crate::vision::capture::decode_png;

/// Remote path used by the pull-file screenshot method
const REMOTE_SCREENSHOT: &str = "/sdcard/autojump.png";

/// How screenshots are taken
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenshotMethod {
    /// `adb exec-out screencap -p`, PNG on stdout
    ExecOut,
    /// `screencap` to a device file, then `adb pull`
    PullFile,
}

impl ScreenshotMethod {
    /// Methods in the order they are probed
    pub const ALL: [ScreenshotMethod; 2] = [ScreenshotMethod::ExecOut, ScreenshotMethod::PullFile];
}

/// Basic device facts, logged at startup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceInfo {
    pub model: String,
    pub android_version: String,
    pub screen_size: String,
    pub density: String,
}

/// A device reached through the adb binary
pub struct AdbDevice {
    /// adb executable
    adb: PathBuf,
    /// Device serial for `adb -s`
    serial: Option<String>,
    /// Screenshot method once one is known to work
    method: Option<ScreenshotMethod>,
    /// Local file for the pull-file method
    local_screenshot: PathBuf,
}

impl AdbDevice {
    /// Create a device handle using `adb` from `PATH`
    pub fn new(serial: Option<String>) -> Self {
        Self {
            adb: PathBuf::from("adb"),
            serial,
            method: None,
            local_screenshot: PathBuf::from("autojump.png"),
        }
    }

    /// Use a specific adb executable
    pub fn with_adb_path(mut self, adb: impl Into<PathBuf>) -> Self {
        self.adb = adb.into();
        self
    }

    /// Force a screenshot method instead of probing
    pub fn with_screenshot_method(mut self, method: ScreenshotMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn screenshot_method(&self) -> Option<ScreenshotMethod> {
        self.method
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.adb);
        if let Some(serial) = &self.serial {
            cmd.arg("-s").arg(serial);
        }
        cmd
    }

    /// Run `adb <args>` and return stdout
    pub fn run(&self, args: &[&str]) -> Result<Vec<u8>, DeviceError> {
        let output = self.command().args(args).output()?;
        if !output.status.success() {
            return Err(DeviceError::CommandFailed {
                command: args.join(" "),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(output.stdout)
    }

    /// Run `adb shell <args>` and return trimmed stdout
    pub fn shell(&self, args: &[&str]) -> Result<String, DeviceError> {
        let mut full = vec!["shell"];
        full.extend_from_slice(args);
        let stdout = self.run(&full)?;
        Ok(String::from_utf8_lossy(&stdout).trim().to_string())
    }

    /// Screen resolution as `(width, height)`
    pub fn screen_size(&self) -> Result<(u32, u32), DeviceError> {
        let output = self.shell(&["wm", "size"])?;
        parse_wm_size(&output).ok_or(DeviceError::UnexpectedOutput(output))
    }

    /// Query model, Android version, size, and density
    pub fn device_info(&self) -> Result<DeviceInfo, DeviceError> {
        Ok(DeviceInfo {
            model: self.shell(&["getprop", "ro.product.model"])?,
            android_version: self.shell(&["getprop", "ro.build.version.release"])?,
            screen_size: self.shell(&["wm", "size"])?,
            density: self.shell(&["wm", "density"])?,
        })
    }

    /// Find the first screenshot method that yields a decodable image
    pub fn probe_screenshot(&mut self) -> Result<ScreenshotMethod, DeviceError> {
        for method in ScreenshotMethod::ALL {
            match self.capture_with(method) {
                Ok(frame) => {
                    log::info!(
                        "Screenshot method {:?} works ({}x{})",
                        method,
                        frame.width(),
                        frame.height()
                    );
                    self.method = Some(method);
                    return Ok(method);
                }
                Err(e) => log::warn!("Screenshot method {:?} failed: {}", method, e),
            }
        }
        Err(DeviceError::NoScreenshotMethod)
    }

    /// Take a screenshot with a given method
    pub fn capture_with(&self, method: ScreenshotMethod) -> Result<RgbImage, DeviceError> {
        let png = match method {
            ScreenshotMethod::ExecOut => self.run(&["exec-out", "screencap", "-p"])?,
            ScreenshotMethod::PullFile => {
                self.shell(&["screencap", "-p", REMOTE_SCREENSHOT])?;
                let local = self.local_screenshot.to_string_lossy().to_string();
                self.run(&["pull", REMOTE_SCREENSHOT, &local])?;
                fs::read(&self.local_screenshot)?
            }
        };
        Ok(decode_png(&png)?)
    }
}

impl FrameSource for AdbDevice {
    fn pull_frame(&mut self) -> Result<RgbImage, DeviceError> {
        let method = match self.method {
            Some(method) => method,
            None => self.probe_screenshot()?,
        };
        self.capture_with(method)
    }
}

impl InputSink for AdbDevice {
    fn swipe(&mut self, swipe: &Swipe) -> Result<(), DeviceError> {
        let args = swipe_args(swipe);
        let mut full: Vec<&str> = vec!["shell"];
        full.extend(args.iter().map(String::as_str));
        log::debug!("adb {}", full.join(" "));
        self.run(&full)?;
        Ok(())
    }
}

/// `input swipe x1 y1 x2 y2 duration` arguments
pub fn swipe_args(swipe: &Swipe) -> Vec<String> {
    vec![
        "input".to_string(),
        "swipe".to_string(),
        swipe.start_x.to_string(),
        swipe.start_y.to_string(),
        swipe.end_x.to_string(),
        swipe.end_y.to_string(),
        swipe.duration_ms.to_string(),
    ]
}

/// Parse `wm size` output
///
/// An override size, when present, is what apps actually render at.
pub fn parse_wm_size(output: &str) -> Option<(u32, u32)> {
    let parse_line = |prefix: &str| {
        output
            .lines()
            .find_map(|line| line.trim().strip_prefix(prefix))
            .and_then(|size| {
                let (w, h) = size.trim().split_once('x')?;
                Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
            })
    };
    parse_line("Override size:").or_else(|| parse_line("Physical size:"))
}
