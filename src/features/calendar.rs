//! Calendar (date part) features.

use crate::core::{Column, NamedColumn};
use chrono::{DateTime, Datelike, Timelike, Utc};

/// Names of the calendar columns, in output order.
pub const CALENDAR_COLUMNS: [&str; 8] = [
    "year",
    "quarter",
    "month",
    "week",
    "day",
    "day_of_week",
    "day_of_year",
    "hour",
];

/// Date parts of every timestamp as base numeric columns.
///
/// `week` is the ISO week, `day_of_week` counts from Monday = 0.
pub fn calendar_features(timestamps: &[DateTime<Utc>]) -> Vec<NamedColumn> {
    let part = |f: fn(&DateTime<Utc>) -> u32| -> Vec<f64> {
        timestamps.iter().map(|t| f(t) as f64).collect()
    };
    let columns: [Vec<f64>; 8] = [
        timestamps.iter().map(|t| t.year() as f64).collect(),
        part(|t| (t.month() - 1) / 3 + 1),
        part(|t| t.month()),
        part(|t| t.iso_week().week()),
        part(|t| t.day()),
        part(|t| t.weekday().num_days_from_monday()),
        part(|t| t.ordinal()),
        part(|t| t.hour()),
    ];
    CALENDAR_COLUMNS
        .iter()
        .zip(columns)
        .map(|(name, values)| NamedColumn::base(*name, Column::Numeric(values)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn date_parts() {
        let ts = vec![
            Utc.with_ymd_and_hms(2010, 2, 5, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2012, 12, 31, 13, 0, 0).unwrap(),
        ];
        let columns = calendar_features(&ts);
        let value = |name: &str, row: usize| {
            columns
                .iter()
                .find(|c| c.name == name)
                .and_then(|c| c.values.as_numeric())
                .map(|v| v[row])
                .unwrap()
        };

        assert_eq!(columns.len(), CALENDAR_COLUMNS.len());
        assert_eq!(value("year", 0), 2010.0);
        assert_eq!(value("quarter", 0), 1.0);
        assert_eq!(value("month", 0), 2.0);
        assert_eq!(value("week", 0), 5.0);
        assert_eq!(value("day_of_week", 0), 4.0);
        assert_eq!(value("day_of_year", 0), 36.0);

        assert_eq!(value("quarter", 1), 4.0);
        // ISO week 1 of 2013.
        assert_eq!(value("week", 1), 1.0);
        assert_eq!(value("day_of_year", 1), 366.0);
        assert_eq!(value("hour", 1), 13.0);
        assert!(columns.iter().all(|c| c.source.is_none()));
    }
}
