//! Series identifier detection.

use crate::core::Panel;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

/// Whether any timestamp occurs more than once, i.e. several series share
/// the calendar.
pub fn has_duplicate_timestamps(timestamps: &[DateTime<Utc>]) -> bool {
    let mut seen = HashSet::with_capacity(timestamps.len());
    !timestamps.iter().all(|t| seen.insert(*t))
}

/// Number of series implied by the timestamp column: rows per distinct timestamp.
pub fn expected_series_count(timestamps: &[DateTime<Utc>]) -> usize {
    let distinct: HashSet<_> = timestamps.iter().collect();
    if distinct.is_empty() {
        0
    } else {
        timestamps.len() / distinct.len()
    }
}

fn max_rows_per_timestamp(timestamps: &[DateTime<Utc>]) -> usize {
    let mut counts: HashMap<&DateTime<Utc>, usize> = HashMap::with_capacity(timestamps.len());
    for t in timestamps {
        *counts.entry(t).or_default() += 1;
    }
    counts.into_values().max().unwrap_or(0)
}

/// Whether `column` identifies series in `panel`.
///
/// A column qualifies when it has as many distinct values as the expected
/// series count, no missing values, and its values paired with the
/// timestamp are unique across rows.
pub fn is_identifier(panel: &Panel, timestamps: &[DateTime<Utc>], column: &str) -> bool {
    panel
        .column(column)
        .is_some_and(|values| values.distinct_count() == expected_series_count(timestamps))
        && is_series_key(panel, timestamps, column)
}

/// Whether `column` has no missing values, names at most one row per
/// timestamp, and has no more values than the busiest timestamp has rows.
/// Series may have different lengths.
pub fn is_series_key(panel: &Panel, timestamps: &[DateTime<Utc>], column: &str) -> bool {
    let Some(values) = panel.column(column) else {
        return false;
    };
    if values.len() != timestamps.len() || values.null_count() > 0 {
        return false;
    }
    if values.distinct_count() > max_rows_per_timestamp(timestamps) {
        return false;
    }

    let mut pairs = HashSet::with_capacity(timestamps.len());
    (0..timestamps.len()).all(|row| pairs.insert((values.key(row), timestamps[row])))
}

/// All identifier candidates, in column order.
///
/// An empty result means the panel has no usable identifier.
pub fn detect_series_id(
    panel: &Panel,
    timestamp_column: &str,
    timestamps: &[DateTime<Utc>],
) -> Vec<String> {
    panel
        .column_names()
        .iter()
        .filter(|name| name.as_str() != timestamp_column)
        .filter(|name| is_identifier(panel, timestamps, name))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Column;
    use chrono::{Duration, TimeZone};

    fn stacked(series: usize, steps: usize) -> (Panel, Vec<DateTime<Utc>>) {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut ts = Vec::new();
        let mut store = Vec::new();
        let mut region = Vec::new();
        let mut sales = Vec::new();
        let mut flag = Vec::new();
        for t in 0..steps {
            for s in 0..series {
                ts.push(base + Duration::days(t as i64));
                store.push(s as f64 + 1.0);
                region.push(Some(if s % 2 == 0 { "north" } else { "south" }.to_string()));
                sales.push((t * 10 + s) as f64);
                flag.push((t % 2) as f64);
            }
        }
        let panel = Panel::new(vec![
            ("date".to_string(), Column::Timestamp(ts.clone())),
            ("store".to_string(), Column::Numeric(store)),
            ("region".to_string(), Column::Categorical(region)),
            ("sales".to_string(), Column::Numeric(sales)),
            ("holiday".to_string(), Column::Numeric(flag)),
        ])
        .unwrap();
        (panel, ts)
    }

    #[test]
    fn detects_duplicates() {
        let (_, ts) = stacked(3, 4);
        assert!(has_duplicate_timestamps(&ts));
        let (_, ts) = stacked(1, 4);
        assert!(!has_duplicate_timestamps(&ts));
    }

    #[test]
    fn finds_the_store_column() {
        let (panel, ts) = stacked(3, 5);
        assert_eq!(expected_series_count(&ts), 3);
        assert_eq!(detect_series_id(&panel, "date", &ts), vec!["store".to_string()]);
    }

    #[test]
    fn two_series_with_binary_columns_are_ambiguous() {
        // With two series, a region column that alternates per series also qualifies.
        let (panel, ts) = stacked(2, 5);
        assert_eq!(
            detect_series_id(&panel, "date", &ts),
            vec!["store".to_string(), "region".to_string()]
        );
    }

    #[test]
    fn columns_with_nulls_are_rejected() {
        let (mut panel, ts) = stacked(3, 4);
        let mut store = panel.numeric("store").unwrap().to_vec();
        store[5] = f64::NAN;
        panel.replace_column("store", Column::Numeric(store)).unwrap();
        assert!(!is_identifier(&panel, &ts, "store"));
        assert!(detect_series_id(&panel, "date", &ts).is_empty());
    }

    #[test]
    fn series_key_allows_short_series() {
        let (panel, ts) = stacked(3, 4);
        // store 3 only observed on the first two dates
        let short: Vec<usize> = (0..ts.len()).filter(|r| r % 3 != 2 || *r < 6).collect();
        let panel = panel.take(&short);
        let ts: Vec<_> = short.iter().map(|&r| ts[r]).collect();
        assert!(!is_identifier(&panel, &ts, "store"));
        assert!(is_series_key(&panel, &ts, "store"));
        assert!(!is_series_key(&panel, &ts, "sales"));
    }

    #[test]
    fn unknown_column_is_not_an_identifier() {
        let (panel, ts) = stacked(2, 3);
        assert!(!is_identifier(&panel, &ts, "missing"));
    }
}
