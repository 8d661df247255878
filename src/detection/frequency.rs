//! Sampling cadence detection.
//!
//! The modal spacing between distinct timestamps is classified into a
//! calendar unit using fixed second thresholds.

use crate::error::{PanelError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Calendar unit of a panel's sampling cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Years,
    Quarters,
    Months,
    Weeks,
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl TimeUnit {
    /// Units from coarsest to finest.
    pub const ALL: [TimeUnit; 8] = [
        TimeUnit::Years,
        TimeUnit::Quarters,
        TimeUnit::Months,
        TimeUnit::Weeks,
        TimeUnit::Days,
        TimeUnit::Hours,
        TimeUnit::Minutes,
        TimeUnit::Seconds,
    ];

    /// Nominal length of one unit in seconds.
    pub fn seconds(self) -> i64 {
        match self {
            TimeUnit::Years => 31_536_000,
            TimeUnit::Quarters => 7_948_800,
            TimeUnit::Months => 2_592_000,
            TimeUnit::Weeks => 604_800,
            TimeUnit::Days => 86_400,
            TimeUnit::Hours => 3_600,
            TimeUnit::Minutes => 60,
            TimeUnit::Seconds => 1,
        }
    }

    /// Lowercase plural name used in feature column names.
    pub fn name(self) -> &'static str {
        match self {
            TimeUnit::Years => "years",
            TimeUnit::Quarters => "quarters",
            TimeUnit::Months => "months",
            TimeUnit::Weeks => "weeks",
            TimeUnit::Days => "days",
            TimeUnit::Hours => "hours",
            TimeUnit::Minutes => "minutes",
            TimeUnit::Seconds => "seconds",
        }
    }

    /// Next finer unit; seconds is its own successor.
    fn finer(self) -> TimeUnit {
        match self {
            TimeUnit::Years => TimeUnit::Quarters,
            TimeUnit::Quarters => TimeUnit::Months,
            TimeUnit::Months => TimeUnit::Weeks,
            TimeUnit::Weeks => TimeUnit::Days,
            TimeUnit::Days => TimeUnit::Hours,
            TimeUnit::Hours => TimeUnit::Minutes,
            TimeUnit::Minutes | TimeUnit::Seconds => TimeUnit::Seconds,
        }
    }

    /// Classify a spacing in seconds.
    ///
    /// The first unit whose length does not exceed `delta` is chosen when it
    /// divides `delta` evenly; otherwise the next finer unit is used.
    pub fn classify(delta_seconds: i64) -> Option<TimeUnit> {
        if delta_seconds < 1 {
            return None;
        }
        TimeUnit::ALL
            .iter()
            .find(|unit| delta_seconds >= unit.seconds())
            .map(|&unit| {
                if delta_seconds % unit.seconds() == 0 {
                    unit
                } else {
                    unit.finer()
                }
            })
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Detected sampling cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frequency {
    pub unit: TimeUnit,
    /// Modal spacing between consecutive distinct timestamps.
    pub delta_seconds: i64,
}

impl Frequency {
    /// Express a window of `rows` observations in detected units, truncating.
    pub fn rescale(&self, rows: usize) -> i64 {
        rows as i64 * self.delta_seconds / self.unit.seconds()
    }
}

/// Detect the sampling cadence of a set of timestamps.
///
/// Duplicates are ignored, so a stacked panel yields the cadence of its
/// shared calendar. Ties between equally common spacings resolve to the one
/// seen first in time order.
///
/// # Example
/// ```
/// use anofox_panel::detection::{detect_frequency, TimeUnit};
/// use chrono::{Duration, TimeZone, Utc};
///
/// let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let ts: Vec<_> = (0..10).map(|i| base + Duration::weeks(i)).collect();
/// let freq = detect_frequency(&ts).unwrap();
/// assert_eq!(freq.unit, TimeUnit::Weeks);
/// assert_eq!(freq.delta_seconds, 604_800);
/// ```
pub fn detect_frequency(timestamps: &[DateTime<Utc>]) -> Result<Frequency> {
    let mut distinct = timestamps.to_vec();
    distinct.sort();
    distinct.dedup();

    if distinct.len() < 2 {
        return Err(PanelError::InsufficientData {
            needed: 2,
            got: distinct.len(),
        });
    }

    let mut counts: HashMap<i64, usize> = HashMap::new();
    let mut order: Vec<i64> = Vec::new();
    for w in distinct.windows(2) {
        let diff = (w[1] - w[0]).num_seconds();
        let count = counts.entry(diff).or_insert(0);
        if *count == 0 {
            order.push(diff);
        }
        *count += 1;
    }

    let mut modal = order[0];
    for &diff in &order[1..] {
        if counts[&diff] > counts[&modal] {
            modal = diff;
        }
    }

    let unit = TimeUnit::classify(modal).ok_or_else(|| {
        PanelError::FrequencyInference(format!("sub-second spacing ({}s)", modal))
    })?;

    Ok(Frequency {
        unit,
        delta_seconds: modal,
    })
}
