//! Game logic module
//!
//! Jump geometry, press timing, and the per-session counters that pace the
//! control loop.

pub mod jump;
pub mod state;

pub use jump::{distance, Point, PressCalculator, Swipe};
pub use state::GameState;
