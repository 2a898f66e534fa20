//! Utility Module
//!
//! This module provides small supporting types:
//!
//! - [`Timer`]: wall-clock source for driving the animation player
//! - [`Stopwatch`]: one-shot phase timing used by the model update report

pub mod time;

pub use time::{Stopwatch, Timer};
