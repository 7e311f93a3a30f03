//! Human behavior simulation for anti-detection
//!
//! Adds variance to where the press lands, how long the loop waits between
//! jumps, and when it takes a break.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::StealthConfig;

/// When the next rest happens and how long it lasts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestPlan {
    /// Jumps to play before resting
    pub after_jumps: u32,
    /// Rest length in seconds
    pub duration_secs: u64,
}

/// Humanizer for generating jittered positions and pacing
pub struct Humanizer {
    rng: StdRng,
    config: StealthConfig,
}

impl Default for Humanizer {
    fn default() -> Self {
        Self::new(StealthConfig::default())
    }
}

impl Humanizer {
    /// Create a new humanizer
    pub fn new(config: StealthConfig) -> Self {
        Self {
            rng: StdRng::from_os_rng(),
            config,
        }
    }

    /// Create a humanizer with a fixed seed (for replaying a session)
    pub fn with_seed(config: StealthConfig, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            config,
        }
    }

    /// Jitter a press position around its anchor
    pub fn humanize_position(&mut self, x: i32, y: i32) -> (i32, i32) {
        if !self.config.humanize_position {
            return (x, y);
        }
        let jx = self.config.jitter_x.abs();
        let jy = self.config.jitter_y.abs();
        (
            x + self.rng.random_range(-jx..=jx),
            y + self.rng.random_range(-jy..=jy),
        )
    }

    /// Delay before the next screenshot so the piece has landed
    pub fn jump_delay_ms(&mut self) -> u64 {
        let (min, max) = self.config.jump_delay_ms;
        if !self.config.humanize_timing {
            return min;
        }
        self.pick(min, max)
    }

    /// Plan the first rest of a session
    ///
    /// Returns `None` when rests are disabled.
    pub fn first_rest(&mut self) -> Option<RestPlan> {
        if !self.config.enable_rests {
            return None;
        }
        let (after_min, after_max) = self.config.first_rest_after;
        let (secs_min, secs_max) = self.config.first_rest_secs;
        Some(RestPlan {
            after_jumps: self.pick(after_min as u64, after_max as u64) as u32,
            duration_secs: self.pick(secs_min, secs_max),
        })
    }

    /// Plan every rest after the first
    pub fn next_rest(&mut self) -> Option<RestPlan> {
        if !self.config.enable_rests {
            return None;
        }
        let (after_min, after_max) = self.config.rest_after;
        let (secs_min, secs_max) = self.config.rest_secs;
        Some(RestPlan {
            after_jumps: self.pick(after_min as u64, after_max as u64) as u32,
            duration_secs: self.pick(secs_min, secs_max),
        })
    }

    /// Uniform pick in `[min, max)`, or `min` for an empty range
    fn pick(&mut self, min: u64, max: u64) -> u64 {
        if max <= min {
            min
        } else {
            self.rng.random_range(min..max)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_jitter_bounded() {
        let mut humanizer = Humanizer::default();

        for _ in 0..200 {
            let (x, y) = humanizer.humanize_position(540, 1584);
            assert!((490..=590).contains(&x));
            assert!((1574..=1594).contains(&y));
        }
    }

    #[test]
    fn test_disabled_is_deterministic() {
        let mut humanizer = Humanizer::new(StealthConfig::disabled());

        for _ in 0..10 {
            assert_eq!(humanizer.humanize_position(540, 1584), (540, 1584));
            assert_eq!(humanizer.jump_delay_ms(), 900);
        }
        assert!(humanizer.first_rest().is_none());
        assert!(humanizer.next_rest().is_none());
    }

    #[test]
    fn test_jump_delay_range() {
        let mut humanizer = Humanizer::default();

        let mut min_seen = u64::MAX;
        let mut max_seen = 0;
        for _ in 0..1000 {
            let delay = humanizer.jump_delay_ms();
            assert!((900..1200).contains(&delay));
            min_seen = min_seen.min(delay);
            max_seen = max_seen.max(delay);
        }

        // Should see variance
        assert!(min_seen < max_seen);
    }

    #[test]
    fn test_rest_plans_in_range() {
        let mut humanizer = Humanizer::default();

        for _ in 0..100 {
            let first = humanizer.first_rest().unwrap();
            assert!((3..10).contains(&first.after_jumps));
            assert!((5..10).contains(&first.duration_secs));

            let next = humanizer.next_rest().unwrap();
            assert!((30..100).contains(&next.after_jumps));
            assert!((10..60).contains(&next.duration_secs));
        }
    }

    #[test]
    fn test_seeded_is_repeatable() {
        let mut a = Humanizer::with_seed(StealthConfig::default(), 42);
        let mut b = Humanizer::with_seed(StealthConfig::default(), 42);

        for _ in 0..20 {
            assert_eq!(a.humanize_position(540, 1584), b.humanize_position(540, 1584));
            assert_eq!(a.jump_delay_ms(), b.jump_delay_ms());
        }
    }

    #[test]
    fn test_empty_range_returns_min() {
        let config = StealthConfig {
            jump_delay_ms: (500, 500),
            ..StealthConfig::default()
        };
        let mut humanizer = Humanizer::new(config);
        assert_eq!(humanizer.jump_delay_ms(), 500);
    }
}
