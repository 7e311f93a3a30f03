//! Session state
//!
//! The only state that survives between jumps: counters, the rest schedule,
//! and the pause flag. Detection itself is rebuilt from each frame.

use serde::{Deserialize, Serialize};

use crate::stealth::{Humanizer, RestPlan};

/// Overall session state
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameState {
    /// Jumps dispatched this session
    pub jumps_total: u64,
    /// Jumps since the last rest
    pub jumps_since_rest: u32,
    /// Rests taken
    pub rests_taken: u32,
    /// Frames where piece or platform was not found
    pub failed_detections: u64,
    /// Last press dispatched (ms)
    pub last_press_ms: Option<u32>,
    /// Whether automation is paused
    pub is_paused: bool,
    /// Upcoming rest, if rests are enabled
    #[serde(skip)]
    next_rest: Option<RestPlan>,
}

impl GameState {
    /// Create a new session, drawing the first rest from the humanizer
    pub fn new(humanizer: &mut Humanizer) -> Self {
        Self {
            next_rest: humanizer.first_rest(),
            ..Self::default()
        }
    }

    /// Record a dispatched jump
    ///
    /// Returns the rest length in seconds if this jump completes the current
    /// stretch, and schedules the next rest.
    pub fn record_jump(&mut self, press_ms: u32, humanizer: &mut Humanizer) -> Option<u64> {
        self.jumps_total += 1;
        self.jumps_since_rest += 1;
        self.last_press_ms = Some(press_ms);

        let plan = self.next_rest?;
        if self.jumps_since_rest < plan.after_jumps {
            return None;
        }

        log::info!(
            "Played {} jumps in a row, resting {}s",
            self.jumps_since_rest,
            plan.duration_secs
        );
        self.jumps_since_rest = 0;
        self.rests_taken += 1;
        self.next_rest = humanizer.next_rest();
        Some(plan.duration_secs)
    }

    /// Record a frame with no usable detection
    pub fn record_miss(&mut self) {
        self.failed_detections += 1;
    }

    /// The rest currently scheduled
    pub fn next_rest(&self) -> Option<RestPlan> {
        self.next_rest
    }

    /// Pause automation
    pub fn pause(&mut self) {
        self.is_paused = true;
    }

    /// Resume automation
    pub fn resume(&mut self) {
        self.is_paused = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stealth::StealthConfig;

    #[test]
    fn test_rest_schedule() {
        let config = StealthConfig {
            first_rest_after: (3, 4),
            first_rest_secs: (7, 8),
            rest_after: (5, 6),
            rest_secs: (20, 21),
            ..StealthConfig::default()
        };
        let mut humanizer = Humanizer::new(config);
        let mut state = GameState::new(&mut humanizer);

        assert_eq!(state.record_jump(300, &mut humanizer), None);
        assert_eq!(state.record_jump(300, &mut humanizer), None);
        assert_eq!(state.record_jump(300, &mut humanizer), Some(7));
        assert_eq!(state.jumps_since_rest, 0);
        assert_eq!(state.rests_taken, 1);

        for _ in 0..4 {
            assert_eq!(state.record_jump(300, &mut humanizer), None);
        }
        assert_eq!(state.record_jump(300, &mut humanizer), Some(20));
        assert_eq!(state.jumps_total, 8);
    }

    #[test]
    fn test_no_rests_when_disabled() {
        let mut humanizer = Humanizer::new(StealthConfig::disabled());
        let mut state = GameState::new(&mut humanizer);

        for _ in 0..500 {
            assert_eq!(state.record_jump(250, &mut humanizer), None);
        }
        assert_eq!(state.rests_taken, 0);
        assert_eq!(state.last_press_ms, Some(250));
    }

    #[test]
    fn test_pause_resume() {
        let mut humanizer = Humanizer::new(StealthConfig::disabled());
        let mut state = GameState::new(&mut humanizer);
        assert!(!state.is_paused);

        state.pause();
        assert!(state.is_paused);

        state.resume();
        assert!(!state.is_paused);

        state.record_miss();
        assert_eq!(state.failed_detections, 1);
    }
}
