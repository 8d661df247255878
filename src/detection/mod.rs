//! Detection utilities for panel analysis.
//!
//! This module provides sampling cadence detection: the dominant spacing
//! between timestamps and the calendar unit it corresponds to.

mod frequency;

pub use frequency::{detect_frequency, Frequency, TimeUnit};
