//! Window and calendar features.
//!
//! Lag and rolling-statistic features are computed independently per
//! series and written into grid-ordered column buffers, so the output does
//! not depend on whether the series ran sequentially or on the rayon pool.
//!
//! # Example
//!
//! ```
//! use anofox_panel::features::lag::series_lags;
//!
//! let lags = series_lags(&[1.0, 2.0, 3.0], 2);
//! assert!(lags[0][0].is_nan());
//! assert_eq!(lags[0][1..], [1.0, 2.0]);
//! assert_eq!(lags[1][2], 1.0);
//! ```

pub mod calendar;
pub mod lag;
pub mod rolling;

pub use calendar::{calendar_features, CALENDAR_COLUMNS};
pub use lag::{lag_features, series_lags};
pub use rolling::{rolling_features, target_rolling_mean};

use crate::core::{NormalizedPanel, SeriesGrid};
use crate::error::Result;
use rayon::prelude::*;

/// Apply `compute` to every kept series of `column` and scatter the
/// `outputs` resulting columns into grid order.
///
/// The sequential path holds one series' output at a time.
pub(crate) fn per_series<F>(
    grid: &SeriesGrid,
    panel: &NormalizedPanel,
    column: &str,
    outputs: usize,
    parallel: bool,
    compute: F,
) -> Result<Vec<Vec<f64>>>
where
    F: Fn(&[f64]) -> Vec<Vec<f64>> + Sync,
{
    let mut buffers = vec![vec![f64::NAN; grid.len()]; outputs];

    if parallel {
        let per_slot: Vec<Vec<Vec<f64>>> = (0..grid.series_count())
            .into_par_iter()
            .map(|slot| grid.series_values(panel, column, slot).map(|v| compute(&v)))
            .collect::<Result<_>>()?;
        for (slot, columns) in per_slot.iter().enumerate() {
            for (buffer, values) in buffers.iter_mut().zip(columns) {
                grid.scatter(slot, values, buffer);
            }
        }
    } else {
        for slot in 0..grid.series_count() {
            let values = grid.series_values(panel, column, slot)?;
            for (buffer, out) in buffers.iter_mut().zip(compute(&values)) {
                grid.scatter(slot, &out, buffer);
            }
        }
    }
    Ok(buffers)
}

/// Numeric columns that receive lag and rolling features.
///
/// The configured list when present, otherwise every numeric column other
/// than the timestamp and the series identifier.
pub fn window_columns(panel: &NormalizedPanel, configured: Option<&[String]>) -> Result<Vec<String>> {
    if let Some(columns) = configured {
        for column in columns {
            panel.panel().numeric(column)?;
        }
        return Ok(columns.to_vec());
    }
    Ok(panel
        .panel()
        .columns()
        .filter(|(name, col)| {
            col.as_numeric().is_some()
                && *name != panel.timestamp_column()
                && Some(*name) != panel.series_id()
        })
        .map(|(name, _)| name.to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::core::{Column, Frame, Panel, PanelContext};
    use crate::detection::detect_frequency;
    use crate::normalize::normalize_panel;

    fn setup(parallel: bool) -> (SeriesGrid, NormalizedPanel, PanelContext) {
        let mut date = Vec::new();
        let mut store = Vec::new();
        let mut sales = Vec::new();
        let mut price = Vec::new();
        for day in 0..8 {
            for s in 0..3 {
                date.push(Some(format!("2024-01-{:02}", day + 1)));
                store.push(s as f64);
                sales.push((day * 10 + s) as f64);
                price.push(if day == 3 { f64::NAN } else { 1.0 + s as f64 });
            }
        }
        let raw = Panel::new(vec![
            ("date".to_string(), Column::Categorical(date)),
            ("store".to_string(), Column::Numeric(store)),
            ("sales".to_string(), Column::Numeric(sales)),
            ("price".to_string(), Column::Numeric(price)),
        ])
        .unwrap();
        let config = PipelineConfig::new("sales", "date")
            .with_window(2)
            .with_window_list(vec![2, 3, 2])
            .with_parallel(parallel);
        let panel = normalize_panel(raw, &config).unwrap().panel;
        let ctx = PanelContext::new(
            config,
            panel.series_id().map(String::from),
            panel.layout().keys().to_vec(),
            detect_frequency(panel.timestamps()).unwrap(),
        );
        let (grid, _) = SeriesGrid::build(&panel, 3).unwrap();
        (grid, panel, ctx)
    }

    fn same(a: &Frame, b: &Frame) -> bool {
        a.column_names() == b.column_names()
            && a.columns().iter().zip(b.columns()).all(|(x, y)| {
                let (x, y) = (x.values.as_numeric().unwrap(), y.values.as_numeric().unwrap());
                x.iter()
                    .zip(y)
                    .all(|(p, q)| (p.is_nan() && q.is_nan()) || p == q)
            })
    }

    #[test]
    fn default_window_columns_skip_identifier() {
        let (_, panel, _) = setup(false);
        assert_eq!(window_columns(&panel, None).unwrap(), vec!["sales", "price"]);

        let only = vec!["price".to_string()];
        assert_eq!(window_columns(&panel, Some(only.as_slice())).unwrap(), only);
        assert!(window_columns(&panel, Some(&["date".to_string()][..])).is_err());
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let columns = vec!["sales".to_string(), "price".to_string()];
        let (grid, panel, seq) = setup(false);
        let (_, _, par) = setup(true);

        let a = lag_features(&grid, &panel, &columns, &seq).unwrap();
        let b = lag_features(&grid, &panel, &columns, &par).unwrap();
        assert!(same(&a, &b));

        let a = rolling_features(&grid, &panel, &columns, &seq).unwrap();
        let b = rolling_features(&grid, &panel, &columns, &par).unwrap();
        assert!(same(&a, &b));
    }

    #[test]
    fn lags_never_cross_series() {
        let (grid, panel, ctx) = setup(false);
        let lags = lag_features(&grid, &panel, &["sales".to_string()], &ctx).unwrap();
        let lag1 = lags.numeric("sales_lag_1").unwrap();
        // row layout: position * 3 + slot
        assert!(lag1[..3].iter().all(|v| v.is_nan()));
        assert_eq!(lag1[3], 0.0);
        assert_eq!(lag1[4], 1.0);
        assert_eq!(lag1[5], 2.0);
        assert_eq!(lags.numeric("sales_lag_2").unwrap()[8], 2.0);
    }

    #[test]
    fn rolling_names_carry_window_in_units_and_dedupe() {
        let (grid, panel, ctx) = setup(false);
        let stats = rolling_features(&grid, &panel, &["sales".to_string()], &ctx).unwrap();
        // two distinct windows, five statistics each
        assert_eq!(stats.width(), 10);
        assert!(stats.column("sales_stat_mean_2_days").is_some());
        assert!(stats.column("sales_stat_median_3_days").is_some());

        let mean = stats.numeric("sales_stat_mean_2_days").unwrap();
        assert_eq!(mean[0], 0.0);
        assert_eq!(mean[3], 5.0);

        let (name, base) = target_rolling_mean(&grid, &panel, &stats, &ctx).unwrap();
        assert_eq!(name, "sales_stat_mean_2_days");
        assert_eq!(base, mean.to_vec());
    }

    #[test]
    fn rolling_statistics_skip_missing_values() {
        let (grid, panel, ctx) = setup(false);
        let stats = rolling_features(&grid, &panel, &["price".to_string()], &ctx).unwrap();
        let mean = stats.numeric("price_stat_mean_2_days").unwrap();
        // day 3 price is missing; the day 3 mean falls back to day 2
        assert_eq!(mean[3 * 3 + 1], 2.0);
    }
}
