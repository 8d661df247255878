//! Trailing rolling-window statistics.
//!
//! One pass computes every requested statistic: monotonic deques for min
//! and max, a sorted buffer for the median, and a two-pass sum over the
//! held values for mean and standard deviation. Running moments are not
//! kept, so a spike or an infinity leaving the window leaves no residue in
//! later rows. Windows end at (and
//! include) the current row, need at least one non-missing observation, and
//! skip `NaN` values, so the first rows use a partial window.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Statistic computed over a trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollingStat {
    Min,
    Max,
    Mean,
    /// Sample standard deviation (`n - 1` denominator).
    Std,
    Median,
}

impl RollingStat {
    /// Statistics in feature column order.
    pub const ALL: [RollingStat; 5] = [
        RollingStat::Min,
        RollingStat::Max,
        RollingStat::Mean,
        RollingStat::Std,
        RollingStat::Median,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RollingStat::Min => "min",
            RollingStat::Max => "max",
            RollingStat::Mean => "mean",
            RollingStat::Std => "std",
            RollingStat::Median => "median",
        }
    }
}

impl fmt::Display for RollingStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sliding window state over one series.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    window: usize,
    /// Raw values currently in the window, missing ones included.
    values: VecDeque<f64>,
    /// Position of the next value pushed.
    next: usize,
    /// (position, value) candidates for the minimum, values ascending.
    min_queue: VecDeque<(usize, f64)>,
    /// (position, value) candidates for the maximum, values descending.
    max_queue: VecDeque<(usize, f64)>,
    /// Non-missing values currently in the window.
    count: usize,
    /// Non-missing window values in ascending order.
    sorted: Vec<f64>,
    track_median: bool,
}

impl RollingWindow {
    /// Create an empty window of `window` rows (at least one).
    pub fn new(window: usize, track_median: bool) -> Self {
        let window = window.max(1);
        Self {
            window,
            values: VecDeque::with_capacity(window + 1),
            next: 0,
            min_queue: VecDeque::new(),
            max_queue: VecDeque::new(),
            count: 0,
            sorted: Vec::with_capacity(if track_median { window } else { 0 }),
            track_median,
        }
    }

    /// Slide the window forward by one row.
    pub fn push(&mut self, value: f64) {
        if self.values.len() == self.window {
            if let Some(old) = self.values.pop_front() {
                self.evict(old);
            }
        }

        let pos = self.next;
        self.next += 1;
        self.values.push_back(value);

        let oldest = self.next.saturating_sub(self.window);
        while self.min_queue.front().is_some_and(|&(p, _)| p < oldest) {
            self.min_queue.pop_front();
        }
        while self.max_queue.front().is_some_and(|&(p, _)| p < oldest) {
            self.max_queue.pop_front();
        }

        if value.is_nan() {
            return;
        }

        while self.min_queue.back().is_some_and(|&(_, v)| v >= value) {
            self.min_queue.pop_back();
        }
        self.min_queue.push_back((pos, value));
        while self.max_queue.back().is_some_and(|&(_, v)| v <= value) {
            self.max_queue.pop_back();
        }
        self.max_queue.push_back((pos, value));

        self.count += 1;

        if self.track_median {
            let at = self.sorted.partition_point(|&v| v < value);
            self.sorted.insert(at, value);
        }
    }

    fn evict(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        self.count = self.count.saturating_sub(1);

        if self.track_median {
            let at = self.sorted.partition_point(|&v| v < value);
            if at < self.sorted.len() {
                self.sorted.remove(at);
            }
        }
    }

    /// Non-missing observations in the window.
    pub fn count(&self) -> usize {
        self.count
    }

    fn present(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied().filter(|v| !v.is_nan())
    }

    fn mean(&self) -> f64 {
        self.present().sum::<f64>() / self.count as f64
    }

    fn sample_std(&self) -> f64 {
        let mean = self.mean();
        let ss: f64 = self.present().map(|x| (x - mean).powi(2)).sum();
        (ss / (self.count - 1) as f64).sqrt()
    }

    /// Current value of `stat`, `NaN` when undefined.
    pub fn value(&self, stat: RollingStat) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        match stat {
            RollingStat::Min => self.min_queue.front().map_or(f64::NAN, |&(_, v)| v),
            RollingStat::Max => self.max_queue.front().map_or(f64::NAN, |&(_, v)| v),
            RollingStat::Mean => self.mean(),
            RollingStat::Std => {
                if self.count < 2 {
                    f64::NAN
                } else {
                    self.sample_std()
                }
            }
            RollingStat::Median => {
                let n = self.sorted.len();
                if n == 0 {
                    f64::NAN
                } else if n % 2 == 0 {
                    (self.sorted[n / 2 - 1] + self.sorted[n / 2]) / 2.0
                } else {
                    self.sorted[n / 2]
                }
            }
        }
    }
}

/// Compute trailing rolling statistics over `series`.
///
/// Returns one output vector per entry of `stats`, each as long as `series`.
///
/// # Example
/// ```
/// use anofox_panel::transform::{rolling_statistics, RollingStat};
///
/// let out = rolling_statistics(&[1.0, 3.0, 2.0, 5.0], 2, &[RollingStat::Max, RollingStat::Mean]);
/// assert_eq!(out[0], vec![1.0, 3.0, 3.0, 5.0]);
/// assert_eq!(out[1], vec![1.0, 2.0, 2.5, 3.5]);
/// ```
pub fn rolling_statistics(series: &[f64], window: usize, stats: &[RollingStat]) -> Vec<Vec<f64>> {
    let mut outputs: Vec<Vec<f64>> = stats
        .iter()
        .map(|_| Vec::with_capacity(series.len()))
        .collect();
    let mut state = RollingWindow::new(window, stats.contains(&RollingStat::Median));

    for &x in series {
        state.push(x);
        for (out, &stat) in outputs.iter_mut().zip(stats) {
            out.push(state.value(stat));
        }
    }
    outputs
}

/// Compute a single trailing rolling statistic.
pub fn rolling_statistic(series: &[f64], window: usize, stat: RollingStat) -> Vec<f64> {
    rolling_statistics(series, window, &[stat])
        .pop()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Direct recomputation over the trailing slice.
    fn naive(series: &[f64], window: usize, stat: RollingStat) -> Vec<f64> {
        (0..series.len())
            .map(|i| {
                let start = (i + 1).saturating_sub(window);
                let mut w: Vec<f64> = series[start..=i]
                    .iter()
                    .copied()
                    .filter(|v| !v.is_nan())
                    .collect();
                let n = w.len();
                if n == 0 {
                    return f64::NAN;
                }
                let mean = w.iter().sum::<f64>() / n as f64;
                match stat {
                    RollingStat::Min => w.iter().copied().fold(f64::INFINITY, f64::min),
                    RollingStat::Max => w.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                    RollingStat::Mean => mean,
                    RollingStat::Std if n < 2 => f64::NAN,
                    RollingStat::Std => {
                        (w.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64)
                            .sqrt()
                    }
                    RollingStat::Median => {
                        w.sort_by(|a, b| a.total_cmp(b));
                        if n % 2 == 0 {
                            (w[n / 2 - 1] + w[n / 2]) / 2.0
                        } else {
                            w[n / 2]
                        }
                    }
                }
            })
            .collect()
    }

    fn assert_matches_naive(series: &[f64], window: usize) {
        let out = rolling_statistics(series, window, &RollingStat::ALL);
        for (stat, values) in RollingStat::ALL.iter().zip(&out) {
            let expected = naive(series, window, *stat);
            for (got, want) in values.iter().zip(&expected) {
                if want.is_nan() {
                    assert!(got.is_nan(), "{} window {}: expected NaN, got {}", stat, window, got);
                } else {
                    assert_relative_eq!(*got, *want, epsilon = 1e-9, max_relative = 1e-9);
                }
            }
        }
    }

    #[test]
    fn matches_naive_for_small_and_large_windows() {
        let series: Vec<f64> = (0..60)
            .map(|i| ((i * 37 + 11) % 23) as f64 * 1.5 - (i as f64 * 0.3).sin() * 4.0)
            .collect();
        for window in [1, 2, 3, 5, 6, 7, 12, 59, 60, 100] {
            assert_matches_naive(&series, window);
        }
    }

    #[test]
    fn missing_values_are_skipped() {
        let series = vec![1.0, f64::NAN, 3.0, f64::NAN, f64::NAN, f64::NAN, 8.0, 2.0];
        for window in [1, 2, 3, 4] {
            assert_matches_naive(&series, window);
        }
        let mean = rolling_statistic(&series, 3, RollingStat::Mean);
        assert!(mean[5].is_nan());
        assert_eq!(mean[2], 2.0);
    }

    #[test]
    fn partial_windows_at_the_start() {
        let series = vec![4.0, 2.0, 6.0];
        assert_eq!(rolling_statistic(&series, 5, RollingStat::Mean), vec![4.0, 3.0, 4.0]);
        assert_eq!(rolling_statistic(&series, 5, RollingStat::Median), vec![4.0, 3.0, 4.0]);
        let std = rolling_statistic(&series, 5, RollingStat::Std);
        assert!(std[0].is_nan());
        assert_relative_eq!(std[1], 2.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn duplicates_in_median_buffer() {
        let series = vec![2.0, 2.0, 2.0, 1.0, 2.0, 3.0];
        assert_matches_naive(&series, 3);
    }

    #[test]
    fn large_magnitudes_stay_accurate() {
        let series: Vec<f64> = (0..200)
            .map(|i| 1.5e6 + ((i * 7919) % 101) as f64 * 13.0)
            .collect();
        assert_matches_naive(&series, 10);
    }

    #[test]
    fn spike_leaves_no_residue() {
        let series = vec![1e9, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let std = rolling_statistic(&series, 3, RollingStat::Std);
        let mean = rolling_statistic(&series, 3, RollingStat::Mean);
        for t in 3..series.len() {
            assert_eq!(std[t], 1.0);
            assert_eq!(mean[t], series[t] - 1.0);
        }
        assert_matches_naive(&series, 3);
    }

    #[test]
    fn infinity_recovers_after_eviction() {
        let series = vec![1.0, f64::INFINITY, 2.0, 3.0, 4.0, 5.0, 6.0];
        let mean = rolling_statistic(&series, 2, RollingStat::Mean);
        assert_eq!(mean[1], f64::INFINITY);
        assert_eq!(mean[2], f64::INFINITY);
        assert_eq!(mean[3], 2.5);
        assert_eq!(mean[6], 5.5);
        let std = rolling_statistic(&series, 2, RollingStat::Std);
        assert!(std[2].is_nan());
        assert_relative_eq!(std[6], 0.5_f64.sqrt(), epsilon = 1e-12);
        assert_eq!(rolling_statistic(&series, 2, RollingStat::Max)[2], f64::INFINITY);
        assert_eq!(rolling_statistic(&series, 2, RollingStat::Max)[3], 3.0);
    }

    #[test]
    fn empty_series() {
        assert!(rolling_statistic(&[], 3, RollingStat::Max).is_empty());
    }

    #[test]
    fn stat_names() {
        let names: Vec<&str> = RollingStat::ALL.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["min", "max", "mean", "std", "median"]);
    }
}
