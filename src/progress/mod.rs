//! Study progress and daily streaks

pub mod service;
pub mod streak;

pub use service::{ProgressService, ProgressSnapshot};
pub use streak::{advance_streak, completion_rate, Clock, FixedClock, SystemClock};
