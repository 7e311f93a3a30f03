//! Stealth and anti-detection module
//!
//! This module provides functionality to make automation less detectable:
//! - Jittered press positions around the swipe anchor
//! - Randomized settle delay between jumps
//! - Periodic rests after a random number of jumps

pub mod humanize;

use serde::{Deserialize, Serialize};

pub use humanize::*;

/// Configuration for stealth behavior
///
/// Ranges are half-open `[min, max)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StealthConfig {
    /// Jitter the press position
    pub humanize_position: bool,
    /// Horizontal jitter either side of the anchor (px)
    pub jitter_x: i32,
    /// Vertical jitter either side of the anchor (px)
    pub jitter_y: i32,
    /// Randomize the delay between jumps
    pub humanize_timing: bool,
    /// Settle delay between jumps (ms)
    pub jump_delay_ms: (u64, u64),
    /// Take periodic rests
    pub enable_rests: bool,
    /// Jumps before the first rest
    pub first_rest_after: (u32, u32),
    /// Length of the first rest (s)
    pub first_rest_secs: (u64, u64),
    /// Jumps between later rests
    pub rest_after: (u32, u32),
    /// Length of later rests (s)
    pub rest_secs: (u64, u64),
}

impl Default for StealthConfig {
    fn default() -> Self {
        Self {
            humanize_position: true,
            jitter_x: 50,
            jitter_y: 10,
            humanize_timing: true,
            jump_delay_ms: (900, 1200),
            enable_rests: true,
            first_rest_after: (3, 10),
            first_rest_secs: (5, 10),
            rest_after: (30, 100),
            rest_secs: (10, 60),
        }
    }
}

impl StealthConfig {
    /// Create a config with no stealth (for testing)
    pub fn disabled() -> Self {
        Self {
            humanize_position: false,
            jitter_x: 0,
            jitter_y: 0,
            humanize_timing: false,
            enable_rests: false,
            ..Self::default()
        }
    }
}
