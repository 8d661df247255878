//! Panel normalization.
//!
//! Coerces the timestamp column, identifies the series, and sorts the panel
//! by (timestamp, series).
//!
//! # Example
//!
//! ```
//! use anofox_panel::config::PipelineConfig;
//! use anofox_panel::core::{Column, Panel};
//! use anofox_panel::normalize::normalize_panel;
//!
//! let raw = Panel::new(vec![
//!     ("date".to_string(), Column::Categorical(
//!         ["2024-01-02", "2024-01-01", "2024-01-01", "2024-01-02"]
//!             .iter().map(|s| Some(s.to_string())).collect(),
//!     )),
//!     ("store".to_string(), Column::Numeric(vec![2.0, 2.0, 1.0, 1.0])),
//!     ("sales".to_string(), Column::Numeric(vec![4.0, 3.0, 1.0, 2.0])),
//! ]).unwrap();
//!
//! let config = PipelineConfig::new("sales", "date");
//! let normalized = normalize_panel(raw, &config).unwrap();
//!
//! assert_eq!(normalized.panel.series_id(), Some("store"));
//! assert_eq!(normalized.panel.panel().numeric("sales").unwrap(), &[1.0, 3.0, 2.0, 4.0]);
//! ```

mod identifier;
mod timestamp;

pub use identifier::{
    detect_series_id, expected_series_count, has_duplicate_timestamps, is_identifier, is_series_key,
};
pub use timestamp::coerce_timestamps;

use crate::config::PipelineConfig;
use crate::core::{Column, NormalizedPanel, Panel, SeriesLayout};
use crate::error::{PanelError, Result};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Outcome of normalization.
#[derive(Debug, Clone)]
pub struct Normalization {
    pub panel: NormalizedPanel,
    /// Every column that passed the identifier checks, in column order.
    pub candidates: Vec<String>,
    /// Non-fatal findings, e.g. an ambiguous identifier.
    pub warnings: Vec<String>,
}

/// Check that the configured columns exist with usable types.
pub fn validate_schema(panel: &Panel, config: &PipelineConfig) -> Result<()> {
    panel.require(&config.timestamp_column)?;
    panel.numeric(&config.target)?;
    if let Some(id) = &config.series_id {
        panel.require(id)?;
    }
    if let Some(columns) = &config.feature_columns {
        for column in columns {
            panel.numeric(column)?;
        }
    }
    Ok(())
}

/// Normalize a raw panel.
///
/// Fails before any computation when configured columns are missing, when
/// timestamps cannot be coerced, or when a stacked panel has no identifier.
/// A panel whose timestamps are unique is treated as a single series.
pub fn normalize_panel(raw: Panel, config: &PipelineConfig) -> Result<Normalization> {
    config.validate()?;
    validate_schema(&raw, config)?;
    if raw.is_empty() {
        return Err(PanelError::EmptyData);
    }

    let mut panel = raw;
    let ts_column = config.timestamp_column.as_str();
    let coerced = coerce_timestamps(panel.require(ts_column)?, config.timestamp_format.as_deref())?;
    panel.replace_column(ts_column, coerced)?;
    let timestamps = panel
        .require(ts_column)?
        .as_timestamps()
        .map(<[_]>::to_vec)
        .unwrap_or_default();

    let stacked = has_duplicate_timestamps(&timestamps);
    let candidates = detect_series_id(&panel, ts_column, &timestamps);
    debug!(stacked, ?candidates, "identifier candidates");

    let mut warnings = Vec::new();
    let series_id = match &config.series_id {
        Some(column) => {
            if !is_series_key(&panel, &timestamps, column) {
                return Err(PanelError::IdentifierDetection(format!(
                    "configured column '{}' does not identify one series per timestamp",
                    column
                )));
            }
            Some(column.clone())
        }
        None if stacked => {
            let first = candidates.first().cloned().ok_or_else(|| {
                PanelError::IdentifierDetection(format!(
                    "no column separates the {} rows into {} series",
                    timestamps.len(),
                    expected_series_count(&timestamps)
                ))
            })?;
            if candidates.len() > 1 {
                let message = format!(
                    "ambiguous series identifier {:?}; using '{}'",
                    candidates, first
                );
                warn!("{}", message);
                warnings.push(message);
            }
            Some(first)
        }
        None => None,
    };

    let (keys, series_of_row) = match &series_id {
        Some(column) => series_ordinals(panel.require(column)?),
        None => (vec![String::new()], vec![0; panel.len()]),
    };

    let mut order: Vec<usize> = (0..panel.len()).collect();
    order.sort_by(|&a, &b| {
        timestamps[a]
            .cmp(&timestamps[b])
            .then(series_of_row[a].cmp(&series_of_row[b]))
    });
    let panel = panel.take(&order);
    let series_of_row: Vec<usize> = order.iter().map(|&r| series_of_row[r]).collect();

    let mut rows = vec![Vec::new(); keys.len()];
    for (row, &series) in series_of_row.iter().enumerate() {
        rows[series].push(row);
    }
    let layout = SeriesLayout::new(keys, rows);

    info!(
        rows = panel.len(),
        series = layout.series_count(),
        series_id = series_id.as_deref().unwrap_or("<none>"),
        rectangular = layout.is_rectangular(),
        "normalized panel"
    );

    let panel = NormalizedPanel::new(
        panel,
        config.timestamp_column.clone(),
        series_id,
        series_of_row,
        layout,
    )?;

    Ok(Normalization {
        panel,
        candidates,
        warnings,
    })
}

/// Number the distinct values of an identifier column in native order.
fn series_ordinals(column: &Column) -> (Vec<String>, Vec<usize>) {
    let mut rows: Vec<usize> = (0..column.len()).collect();
    rows.sort_by(|&a, &b| column.compare_rows(a, b));

    let mut keys: Vec<String> = Vec::new();
    let mut ordinal: HashMap<String, usize> = HashMap::new();
    for &row in &rows {
        let key = column.key(row).unwrap_or_default();
        if !ordinal.contains_key(&key) {
            ordinal.insert(key.clone(), keys.len());
            keys.push(key);
        }
    }

    let series_of_row = (0..column.len())
        .map(|row| ordinal[&column.key(row).unwrap_or_default()])
        .collect();
    (keys, series_of_row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn raw_panel(stores: &[f64], steps: usize) -> Panel {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut date = Vec::new();
        let mut store = Vec::new();
        let mut sales = Vec::new();
        // Emit rows newest first so sorting is exercised.
        for t in (0..steps).rev() {
            for &s in stores {
                date.push(Some(
                    (base + Duration::weeks(t as i64)).format("%Y-%m-%d").to_string(),
                ));
                store.push(s);
                sales.push(s * 100.0 + t as f64);
            }
        }
        Panel::new(vec![
            ("date".to_string(), Column::Categorical(date)),
            ("store".to_string(), Column::Numeric(store)),
            ("sales".to_string(), Column::Numeric(sales)),
        ])
        .unwrap()
    }

    #[test]
    fn sorts_by_timestamp_then_native_identifier_order() {
        let config = PipelineConfig::new("sales", "date");
        let out = normalize_panel(raw_panel(&[10.0, 2.0, 1.0], 4), &config).unwrap();
        let panel = &out.panel;

        assert_eq!(panel.series_id(), Some("store"));
        assert_eq!(panel.layout().keys(), &["1", "2", "10"]);
        assert_eq!(&panel.panel().numeric("store").unwrap()[..3], &[1.0, 2.0, 10.0]);

        let ts = panel.timestamps();
        let series = panel.series_of_row();
        for r in 1..panel.len() {
            assert!((ts[r - 1], series[r - 1]) < (ts[r], series[r]));
        }
        assert!(panel.layout().is_rectangular());
        assert_eq!(panel.series_values(2, "sales").unwrap(), vec![1000.0, 1001.0, 1002.0, 1003.0]);
    }

    #[test]
    fn single_series_has_no_identifier() {
        let config = PipelineConfig::new("sales", "date");
        let out = normalize_panel(raw_panel(&[1.0], 6), &config).unwrap();
        assert_eq!(out.panel.series_id(), None);
        assert_eq!(out.panel.series_count(), 1);
        assert_eq!(out.panel.layout().rows(0).len(), 6);
    }

    #[test]
    fn schema_mismatch_fails_first() {
        let config = PipelineConfig::new("revenue", "date");
        assert_eq!(
            normalize_panel(raw_panel(&[1.0, 2.0], 3), &config).unwrap_err(),
            PanelError::MissingColumn {
                column: "revenue".to_string()
            }
        );

        let config = PipelineConfig::new("sales", "when");
        assert!(matches!(
            normalize_panel(raw_panel(&[1.0, 2.0], 3), &config),
            Err(PanelError::MissingColumn { .. })
        ));
    }

    #[test]
    fn stacked_panel_without_identifier_is_fatal() {
        let mut raw = raw_panel(&[1.0, 2.0], 3);
        let mut store = raw.numeric("store").unwrap().to_vec();
        store[0] = f64::NAN;
        raw.replace_column("store", Column::Numeric(store)).unwrap();

        let config = PipelineConfig::new("sales", "date");
        assert!(matches!(
            normalize_panel(raw, &config),
            Err(PanelError::IdentifierDetection(_))
        ));
    }

    #[test]
    fn configured_identifier_must_qualify() {
        let config = PipelineConfig::new("sales", "date").with_series_id("sales");
        assert!(matches!(
            normalize_panel(raw_panel(&[1.0, 2.0], 3), &config),
            Err(PanelError::IdentifierDetection(_))
        ));

        let config = PipelineConfig::new("sales", "date").with_series_id("store");
        let out = normalize_panel(raw_panel(&[1.0, 2.0], 3), &config).unwrap();
        assert_eq!(out.panel.series_id(), Some("store"));
    }

    #[test]
    fn series_views_expose_numeric_history() {
        let config = PipelineConfig::new("sales", "date");
        let out = normalize_panel(raw_panel(&[1.0, 2.0], 3), &config).unwrap();
        let views = out.panel.series_views();
        assert_eq!(views.len(), 2);
        assert_eq!(views[1].key, "2");
        assert_eq!(views[1].timestamps.len(), 3);
        assert_eq!(views[1].columns.len(), 1);
        assert_eq!(views[1].columns[0].0, "sales");
        assert_eq!(views[1].columns[0].1, vec![200.0, 201.0, 202.0]);
    }
}
