//! Touch event generation
//!
//! Every jump is a long press at one anchor. The anchor sits on the
//! "play again" button, so the same press restarts the game after a miss.

use crate::config::{ButtonSettings, REFERENCE_HEIGHT};
use crate::game::Swipe;
use crate::stealth::Humanizer;

/// Screen geometry relative to the reference height
pub struct ScreenCoordinates {
    /// Reference height
    pub ref_height: u32,
    /// Current screen width
    pub screen_width: u32,
    /// Current screen height
    pub screen_height: u32,
}

impl ScreenCoordinates {
    /// Create new screen coordinates
    pub fn new(screen_width: u32, screen_height: u32) -> Self {
        Self {
            ref_height: REFERENCE_HEIGHT,
            screen_width,
            screen_height,
        }
    }

    /// Scale Y coordinate from reference to actual screen
    pub fn scale_y(&self, y: u32) -> i32 {
        (y as f64 * self.screen_height as f64 / self.ref_height as f64) as i32
    }

    /// Press anchor before jitter
    pub fn button_anchor(&self, button: &ButtonSettings) -> (i32, i32) {
        ((self.screen_width / 2) as i32, self.scale_y(button.ref_y))
    }
}

impl Default for ScreenCoordinates {
    fn default() -> Self {
        Self::new(1080, REFERENCE_HEIGHT)
    }
}

/// Input generator for jump presses
pub struct InputGenerator {
    /// Screen coordinates
    coords: ScreenCoordinates,
    /// Anchor settings
    button: ButtonSettings,
}

impl InputGenerator {
    /// Create a new input generator
    pub fn new(screen_width: u32, screen_height: u32, button: ButtonSettings) -> Self {
        Self {
            coords: ScreenCoordinates::new(screen_width, screen_height),
            button,
        }
    }

    /// Long press of `duration_ms` at the jittered anchor
    pub fn press(&self, humanizer: &mut Humanizer, duration_ms: u32) -> Swipe {
        let (x, y) = self.coords.button_anchor(&self.button);
        let (x, y) = humanizer.humanize_position(x, y);
        Swipe::hold(x, y, duration_ms)
    }
}

impl Default for InputGenerator {
    fn default() -> Self {
        Self::new(1080, REFERENCE_HEIGHT, ButtonSettings::default())
    }
}
