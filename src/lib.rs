//! AutoJump - screen-reading auto player for jump-timing mobile games
//!
//! Each round the player holds the screen for a time proportional to the
//! distance between the piece and the next platform. This crate finds both in
//! a screenshot with color heuristics, turns the distance into a press
//! duration, and sends the press to an Android device.
//!
//! ## Anti-Detection
//!
//! The `stealth` module jitters the press position, randomizes the delay
//! between jumps, and schedules periodic rests.

pub mod android;
pub mod config;
pub mod game;
pub mod stealth;
pub mod vision;

use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use image::RgbImage;
use once_cell::sync::OnceCell;

use crate::android::{DeviceError, FrameSource, InputGenerator, InputSink};
use crate::config::{ConfigError, Settings};
use crate::game::{GameState, PressCalculator, Swipe};
use crate::stealth::Humanizer;
use crate::vision::{decode_raw, DebugSink, Detection, Detector, VisionError};

/// The planned jump for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpPlan {
    /// Where piece and platform were found
    pub detection: Detection,
    /// Pixel distance between them
    pub distance: f64,
    /// Press duration (ms)
    pub press_ms: u32,
    /// The press to dispatch
    pub swipe: Swipe,
}

/// What happened in one loop iteration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationReport {
    /// The jump that was dispatched
    pub plan: JumpPlan,
    /// Rest to take now, in seconds
    pub rest_secs: Option<u64>,
    /// Delay before the next screenshot (ms)
    pub delay_ms: u64,
}

/// Drives detection, timing, and pacing
pub struct Jumper {
    pub settings: Settings,
    pub game_state: GameState,
    detector: Detector,
    press: PressCalculator,
    humanizer: Humanizer,
    debug: Option<DebugSink>,
    /// Rest owed to a host that pushes frames
    pending_rest: Option<u64>,
}

impl Jumper {
    /// Create a new Jumper with the given settings
    pub fn new(settings: Settings) -> Self {
        Self::with_humanizer(settings.clone(), Humanizer::new(settings.stealth))
    }

    /// Create a Jumper with a specific humanizer (seeded or disabled)
    pub fn with_humanizer(settings: Settings, mut humanizer: Humanizer) -> Self {
        Self {
            detector: Detector::new(&settings.detection),
            press: PressCalculator::from_settings(&settings),
            game_state: GameState::new(&mut humanizer),
            humanizer,
            debug: None,
            pending_rest: None,
            settings,
        }
    }

    /// Save every frame through a debug sink
    pub fn with_debug_sink(mut self, sink: DebugSink) -> Self {
        self.debug = Some(sink);
        self
    }

    /// Replace settings, rebuilding detector and press calculator
    ///
    /// Session counters are kept.
    pub fn update_settings(&mut self, settings: Settings) {
        self.detector = Detector::new(&settings.detection);
        self.press = PressCalculator::from_settings(&settings);
        self.humanizer = Humanizer::new(settings.stealth.clone());
        self.settings = settings;
    }

    /// Detect, time, and build the press for one frame
    pub fn plan(&mut self, frame: &RgbImage) -> JumpPlan {
        let detection = self.detector.detect(frame);
        let distance = detection.distance();
        let press_ms = self.press.press_duration(distance);

        let (width, height) = frame.dimensions();
        let input = InputGenerator::new(width, height, self.settings.button.clone());
        let swipe = input.press(&mut self.humanizer, press_ms);

        JumpPlan {
            detection,
            distance,
            press_ms,
            swipe,
        }
    }

    /// Run one capture → detect → press iteration against a device
    ///
    /// Rest and delay are returned rather than slept so the caller owns the
    /// clock. Only capture failures are returned; a failed press or debug
    /// write is logged and the jump still counts.
    pub fn run_iteration<D>(&mut self, device: &mut D) -> Result<IterationReport, Error>
    where
        D: FrameSource + InputSink,
    {
        let frame = device.pull_frame()?;
        let plan = self.plan(&frame);
        if !plan.detection.is_complete() {
            self.game_state.record_miss();
        }

        log::info!(
            "Jump {:.1}px, press {}ms (piece {:?} -> platform {:?})",
            plan.distance,
            plan.press_ms,
            (plan.detection.piece.x, plan.detection.piece.y),
            (plan.detection.platform.x, plan.detection.platform.y)
        );
        if let Err(e) = device.swipe(&plan.swipe) {
            log::error!("Failed to dispatch press: {}", e);
        }

        if let Some(sink) = &self.debug {
            if let Err(e) = sink.record(unix_timestamp(), &frame, &plan.detection) {
                log::warn!("Failed to save debug screenshot: {}", e);
            }
        }

        let rest_secs = self.game_state.record_jump(plan.press_ms, &mut self.humanizer);
        let delay_ms = self.humanizer.jump_delay_ms();

        Ok(IterationReport {
            plan,
            rest_secs,
            delay_ms,
        })
    }

    /// Process a raw frame pushed from the device
    ///
    /// When the previous jump completed a stretch, the frame is skipped and
    /// the host is told to rest instead.
    pub fn process_frame(&mut self, frame_data: &[u8], width: u32, height: u32) -> JumpAction {
        if self.game_state.is_paused {
            return JumpAction::None;
        }
        if let Some(secs) = self.pending_rest.take() {
            return JumpAction::Wait {
                duration_ms: (secs * 1000) as u32,
            };
        }

        let frame = match decode_raw(frame_data, width, height) {
            Ok(frame) => frame,
            Err(e) => {
                log::error!("Failed to process frame: {}", e);
                return JumpAction::None;
            }
        };

        let plan = self.plan(&frame);
        if !plan.detection.is_complete() {
            self.game_state.record_miss();
        }
        self.pending_rest = self.game_state.record_jump(plan.press_ms, &mut self.humanizer);
        JumpAction::Swipe(plan.swipe)
    }

    /// Delay the host should wait before the next frame (ms)
    pub fn next_delay_ms(&mut self) -> u64 {
        self.humanizer.jump_delay_ms()
    }
}

/// Actions the host should perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpAction {
    /// No action needed
    None,
    /// Press the screen
    Swipe(Swipe),
    /// Wait for a specified duration
    Wait { duration_ms: u32 },
}

/// Crate-level errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Vision(#[from] VisionError),
    #[error(transparent)]
    Device(#[from] DeviceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Seconds since the unix epoch, used to name debug screenshots
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Global Jumper instance for JNI access
static JUMPER_INSTANCE: OnceCell<Mutex<Jumper>> = OnceCell::new();

/// Initialize the global Jumper instance
pub fn init_jumper(settings: Settings) {
    let _ = JUMPER_INSTANCE.set(Mutex::new(Jumper::new(settings)));
}

/// Get a reference to the global Jumper instance
pub fn get_jumper() -> Option<&'static Mutex<Jumper>> {
    JUMPER_INSTANCE.get()
}
