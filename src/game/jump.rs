//! Jump geometry and press timing
//!
//! Converts the two detected points into the press that carries the piece
//! from one to the other.

use serde::{Deserialize, Serialize};

use crate::config::Settings;

/// A position in grid coordinates
///
/// `(0, 0)` doubles as the "not found" marker; the top-left corner is never a
/// real piece or platform position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    /// The "not found" point
    pub const SENTINEL: Point = Point { x: 0, y: 0 };

    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Whether this point means "not found"
    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        distance(*self, *other)
    }
}

impl From<(u32, u32)> for Point {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

/// Euclidean pixel distance between two points
pub fn distance(a: Point, b: Point) -> f64 {
    let dx = a.x as f64 - b.x as f64;
    let dy = a.y as f64 - b.y as f64;
    dx.hypot(dy)
}

/// Turns jump distance into a press duration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressCalculator {
    /// Milliseconds of press per pixel
    coefficient: f64,
    /// Floor applied to every press
    min_press_ms: u32,
}

impl PressCalculator {
    /// Create a calculator
    pub fn new(coefficient: f64, min_press_ms: u32) -> Self {
        Self {
            coefficient,
            min_press_ms,
        }
    }

    /// Build from settings
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.press_coefficient, settings.min_press_ms)
    }

    /// Press duration in milliseconds for a distance
    ///
    /// Never below the floor so the touch always registers; no ceiling.
    pub fn press_duration(&self, distance: f64) -> u32 {
        let press = (distance * self.coefficient).max(self.min_press_ms as f64);
        press as u32
    }
}

impl Default for PressCalculator {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// A single press on the screen, `adb shell input swipe` style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swipe {
    pub start_x: i32,
    pub start_y: i32,
    pub end_x: i32,
    pub end_y: i32,
    pub duration_ms: u32,
}

impl Swipe {
    /// A press that stays on one spot
    pub fn hold(x: i32, y: i32, duration_ms: u32) -> Self {
        Self {
            start_x: x,
            start_y: y,
            end_x: x,
            end_y: y,
            duration_ms,
        }
    }
}
