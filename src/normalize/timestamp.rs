//! Timestamp coercion.

use crate::core::Column;
use crate::error::{PanelError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Date-time layouts tried, in order, when no explicit format is configured.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d-%m-%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

/// Date-only layouts. Day-first dashes come before month-first slashes.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%m/%d/%Y", "%Y/%m/%d", "%d.%m.%Y"];

/// Coerce a column to timestamps.
///
/// Timestamp columns are returned unchanged. Numeric columns are read as Unix
/// epoch seconds. Textual columns are parsed with `format` when given;
/// otherwise the first known layout that parses every value is used, so a
/// column is never parsed with mixed layouts.
pub fn coerce_timestamps(column: &Column, format: Option<&str>) -> Result<Column> {
    match column {
        Column::Timestamp(_) => Ok(column.clone()),
        Column::Numeric(values) => values
            .iter()
            .enumerate()
            .map(|(row, &secs)| from_epoch_seconds(secs).ok_or_else(|| invalid(row, &secs)))
            .collect::<Result<Vec<_>>>()
            .map(Column::Timestamp),
        Column::Categorical(values) => {
            let text = values
                .iter()
                .enumerate()
                .map(|(row, v)| {
                    v.as_deref().ok_or_else(|| {
                        PanelError::TimestampError(format!("missing timestamp at row {}", row))
                    })
                })
                .collect::<Result<Vec<&str>>>()?;

            if let Some(format) = format {
                return text
                    .iter()
                    .enumerate()
                    .map(|(row, v)| parse_with(v, format).ok_or_else(|| invalid(row, v)))
                    .collect::<Result<Vec<_>>>()
                    .map(Column::Timestamp);
            }

            if let Some(parsed) = parse_all(&text, parse_rfc3339) {
                return Ok(Column::Timestamp(parsed));
            }
            for format in DATETIME_FORMATS.iter().chain(DATE_FORMATS) {
                if let Some(parsed) = parse_all(&text, |v| parse_with(v, format)) {
                    return Ok(Column::Timestamp(parsed));
                }
            }
            Err(PanelError::TimestampError(format!(
                "no known timestamp layout parses every value (first value '{}')",
                text.first().copied().unwrap_or_default()
            )))
        }
    }
}

fn parse_all<F>(values: &[&str], parse: F) -> Option<Vec<DateTime<Utc>>>
where
    F: Fn(&str) -> Option<DateTime<Utc>>,
{
    values.iter().map(|v| parse(v.trim())).collect()
}

fn parse_rfc3339(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_with(value: &str, format: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
        return Some(Utc.from_utc_datetime(&dt));
    }
    NaiveDate::parse_from_str(value, format)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
}

fn from_epoch_seconds(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1e9).round() as u32;
    DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
}

fn invalid(row: usize, value: &dyn std::fmt::Display) -> PanelError {
    PanelError::TimestampError(format!("cannot parse '{}' at row {}", value, row))
}
