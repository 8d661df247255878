//! End-to-end feature pipeline.
//!
//! [`FeaturePipeline::run`] takes a raw panel through normalization,
//! frequency and stationarity analysis, window features, the gated
//! difference and log transforms, assembly, the horizon split and finally
//! the train/test split and walk-forward folds.
//!
//! # Example
//!
//! ```
//! use anofox_panel::config::PipelineConfig;
//! use anofox_panel::core::{Column, Panel};
//! use anofox_panel::pipeline::FeaturePipeline;
//!
//! let days: Vec<Option<String>> = (1..=20)
//!     .flat_map(|d| {
//!         let day = format!("2024-01-{:02}", d);
//!         [Some(day.clone()), Some(day)]
//!     })
//!     .collect();
//! let store: Vec<f64> = (0..40).map(|r| (r % 2) as f64).collect();
//! let sales: Vec<f64> = (0..40).map(|r| ((r * 7) % 11) as f64).collect();
//! let raw = Panel::new(vec![
//!     ("date".to_string(), Column::Categorical(days)),
//!     ("store".to_string(), Column::Numeric(store)),
//!     ("sales".to_string(), Column::Numeric(sales)),
//! ]).unwrap();
//!
//! let config = PipelineConfig::new("sales", "date")
//!     .with_window(5)
//!     .with_window_list(vec![5])
//!     .with_horizon(2)
//!     .with_fold_number(2);
//! let output = FeaturePipeline::new(config).run(raw).unwrap();
//!
//! assert_eq!(output.x.len(), 26);
//! assert_eq!(output.y.column_names(), vec!["sales_t+1", "sales_t+2"]);
//! assert_eq!(output.folds.len(), 2);
//! ```

pub mod assemble;
pub mod horizon;

pub use assemble::{assemble, base_frame, left_join, trim_warmup};
pub use horizon::{horizon_split, HorizonSplit};

use crate::config::PipelineConfig;
use crate::core::{Frame, NormalizedPanel, Panel, PanelContext, SeriesGrid};
use crate::detection::detect_frequency;
use crate::error::Result;
use crate::features::{lag_features, rolling_features, target_rolling_mean, window_columns};
use crate::io::read_panel_csv;
use crate::normalize::{normalize_panel, Normalization};
use crate::transform::{difference_features, log_trend_removal};
use crate::utils::{train_test_split, walk_forward_folds, Fold, Split};
use crate::validation::{analyze_stationarity, StationarityReport};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// Everything the pipeline found out while building the tables.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub context: PanelContext,
    /// Columns that passed the identifier checks.
    pub identifier_candidates: Vec<String>,
    /// Series removed for insufficient history.
    pub dropped_series: Vec<String>,
    pub stationarity: StationarityReport,
    /// Difference features were added (KPSS non-stationary).
    pub differenced: bool,
    /// Target-derived columns were log transformed (ADF non-stationary).
    pub log_transformed: bool,
    /// Feature columns of `x`, in order.
    pub feature_columns: Vec<String>,
    pub warnings: Vec<String>,
}

/// Output of [`FeaturePipeline::run`].
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Feature matrix.
    pub x: Frame,
    /// Target matrix, one column per horizon step.
    pub y: Frame,
    /// Train/test boundary over the rows of `x` and `y`.
    pub split: Split,
    /// Walk-forward folds over the training rows.
    pub folds: Vec<Fold>,
    /// Normalized input, for plotting collaborators.
    pub panel: NormalizedPanel,
    pub report: PipelineReport,
}

impl PipelineOutput {
    /// Training block of `x` and `y`.
    pub fn train(&self) -> Result<(Frame, Frame)> {
        Ok((
            self.x.slice(self.split.train.clone())?,
            self.y.slice(self.split.train.clone())?,
        ))
    }

    /// Held-out block of `x` and `y`.
    pub fn test(&self) -> Result<(Frame, Frame)> {
        Ok((
            self.x.slice(self.split.test.clone())?,
            self.y.slice(self.split.test.clone())?,
        ))
    }
}

/// Builds leakage-safe supervised tables from a multi-series panel.
#[derive(Debug, Clone)]
pub struct FeaturePipeline {
    config: PipelineConfig,
}

impl FeaturePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Read a CSV panel and run the pipeline on it.
    pub fn run_csv(&self, path: impl AsRef<Path>) -> Result<PipelineOutput> {
        self.run(read_panel_csv(path)?)
    }

    /// Run every stage on `raw`.
    pub fn run(&self, raw: Panel) -> Result<PipelineOutput> {
        let config = &self.config;
        let Normalization {
            panel,
            candidates,
            mut warnings,
        } = normalize_panel(raw, config)?;

        let frequency = detect_frequency(panel.timestamps())?;
        info!(
            rows = panel.len(),
            series = panel.series_count(),
            unit = %frequency.unit,
            delta_seconds = frequency.delta_seconds,
            "normalized panel"
        );

        let ctx = PanelContext::new(
            config.clone(),
            panel.series_id().map(String::from),
            panel.layout().keys().to_vec(),
            frequency,
        );

        let (grid, dropped_series) = SeriesGrid::build(&panel, ctx.window() + ctx.horizon())?;
        for key in &dropped_series {
            warnings.push(format!(
                "series '{}' dropped: needs more than {} rows",
                key,
                ctx.window() + ctx.horizon()
            ));
        }
        let n = grid.series_count();

        let stationarity = self.stationarity(&grid, &panel)?;
        warnings.extend(stationarity.warnings.iter().cloned());
        info!(
            adf_stationary = stationarity.adf_stationary,
            kpss_stationary = stationarity.kpss_stationary,
            conclusion = stationarity.conclusion(),
            "stationarity analysis"
        );

        let mut columns = window_columns(&panel, config.feature_columns.as_deref())?;
        if !columns.iter().any(|c| c == ctx.target()) {
            columns.insert(0, ctx.target().to_string());
        }
        let lags = lag_features(&grid, &panel, &columns, &ctx)?;
        let stats = rolling_features(&grid, &panel, &columns, &ctx)?;
        info!(
            columns = columns.len(),
            lags = lags.width(),
            stats = stats.width(),
            "window features"
        );

        let differenced = !stationarity.kpss_stationary;
        let diffs = if differenced {
            let (mean_name, mean) = target_rolling_mean(&grid, &panel, &stats, &ctx)?;
            let values = panel.panel().numeric(ctx.target())?;
            let target: Vec<f64> = grid.panel_rows().iter().map(|&r| values[r]).collect();

            let mut frame = Frame::new(grid.index());
            for column in difference_features(&ctx, &target, (&mean_name, &mean), &[&lags, &stats])? {
                frame.push(column)?;
            }
            info!(columns = frame.width(), "difference features");
            Some(frame)
        } else {
            info!("target is trend stationary; skipping difference features");
            None
        };

        let base = base_frame(&grid, &panel, &ctx)?;
        let mut derived = vec![&lags, &stats];
        if let Some(frame) = &diffs {
            derived.push(frame);
        }
        let mut table = assemble(base, &derived, &ctx, n)?;

        let log_transformed = !stationarity.adf_stationary;
        if log_transformed {
            let renamed = log_trend_removal(&mut table, ctx.target())?;
            info!(columns = renamed.len(), "log trend removal");
        } else {
            info!("target has no unit root; skipping log trend removal");
        }

        let HorizonSplit { x, y } = horizon_split(&table, &ctx, n)?;
        let split = train_test_split(x.len(), n, config.test_fraction)?;
        let folds = walk_forward_folds(split.train.len(), n, config.fold_number)?;
        info!(
            rows = x.len(),
            features = x.width(),
            train = split.train.len(),
            test = split.test.len(),
            folds = folds.len(),
            "supervised tables ready"
        );

        let report = PipelineReport {
            feature_columns: x.column_names().iter().map(|c| c.to_string()).collect(),
            context: ctx,
            identifier_candidates: candidates,
            dropped_series,
            stationarity,
            differenced,
            log_transformed,
            warnings,
        };

        Ok(PipelineOutput {
            x,
            y,
            split,
            folds,
            panel,
            report,
        })
    }

    fn stationarity(&self, grid: &SeriesGrid, panel: &NormalizedPanel) -> Result<StationarityReport> {
        let target = self.config.target.as_str();
        let series = (0..grid.series_count())
            .map(|slot| Ok((grid.keys()[slot].clone(), grid.series_values(panel, target, slot)?)))
            .collect::<Result<Vec<_>>>()?;

        let report = analyze_stationarity(
            &series,
            self.config.adf_max_lags,
            self.config.kpss_lags,
            self.config.significance_level,
            self.config.stationarity_gate,
            self.config.parallel,
        );
        if !report.warnings.is_empty() {
            warn!(
                count = report.warnings.len(),
                gate = ?report.gate,
                "stationarity tests undefined on some inputs; undefined verdicts count as non-stationary"
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Column;
    use crate::error::PanelError;
    use chrono::{Duration, NaiveDate};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn panel(series: usize, steps: usize, value: impl Fn(usize, usize) -> f64) -> Panel {
        let mut dates = Vec::new();
        let mut ids = Vec::new();
        let mut y = Vec::new();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for p in 0..steps {
            for s in 0..series {
                dates.push(Some((start + Duration::days(p as i64)).to_string()));
                ids.push(s as f64);
                y.push(value(s, p));
            }
        }
        Panel::new(vec![
            ("date".to_string(), Column::Categorical(dates)),
            ("id".to_string(), Column::Numeric(ids)),
            ("y".to_string(), Column::Numeric(y)),
        ])
        .unwrap()
    }

    fn config() -> PipelineConfig {
        PipelineConfig::new("y", "date")
            .with_window(3)
            .with_window_list(vec![3])
            .with_horizon(1)
            .with_fold_number(2)
            .with_parallel(false)
    }

    #[test]
    fn feature_table_excludes_target_and_index_columns() {
        let out = FeaturePipeline::new(config())
            .run(panel(2, 12, |s, p| ((p * 5 + s * 3) % 7) as f64))
            .unwrap();

        let names = &out.report.feature_columns;
        assert!(!names.iter().any(|c| c == "y" || c == "date" || c == "id"));
        assert!(names.iter().any(|c| c.starts_with("y_lag_1")));
        assert_eq!(out.x.len(), (12 - 3 - 1) * 2);
        assert_eq!(out.x.index(), out.y.index());
        assert_eq!(out.report.context.series_id(), Some("id"));
    }

    #[test]
    fn trending_target_gets_log_and_difference_features() {
        let mut rng = StdRng::seed_from_u64(7);
        let noise: Vec<f64> = (0..80).map(|_| rng.gen::<f64>() - 0.5).collect();
        let out = FeaturePipeline::new(config().with_kpss_lags(2))
            .run(panel(2, 40, |s, p| 0.2 * (p * p) as f64 + noise[p * 2 + s]))
            .unwrap();

        assert!(out.report.log_transformed);
        assert!(out.report.differenced);
        let names = &out.report.feature_columns;
        assert!(names.iter().any(|c| c == "y_lag_1_log"));
        assert!(names.iter().any(|c| c.starts_with("y_diff_lag_1")));
        assert!(!names.iter().any(|c| c == "y_lag_1"));
    }

    #[test]
    fn short_series_are_reported() {
        let mut raw = panel(2, 10, |s, p| ((p * 3 + s) % 5) as f64);
        // third series with only two observations
        let mut dates = raw.column("date").unwrap().as_categorical().unwrap().to_vec();
        dates.extend([Some("2024-01-01".to_string()), Some("2024-01-02".to_string())]);
        let mut ids = raw.numeric("id").unwrap().to_vec();
        ids.extend([2.0, 2.0]);
        let mut y = raw.numeric("y").unwrap().to_vec();
        y.extend([0.0, 1.0]);
        raw = Panel::new(vec![
            ("date".to_string(), Column::Categorical(dates)),
            ("id".to_string(), Column::Numeric(ids)),
            ("y".to_string(), Column::Numeric(y)),
        ])
        .unwrap();

        let out = FeaturePipeline::new(config().with_series_id("id"))
            .run(raw)
            .unwrap();
        assert_eq!(out.report.dropped_series, vec!["2".to_string()]);
        assert!(out.x.index().iter().all(|k| k.series != 2));
        assert!(out.report.warnings.iter().any(|w| w.contains("'2'")));
    }

    #[test]
    fn missing_target_fails_before_computation() {
        let err = FeaturePipeline::new(PipelineConfig::new("sales", "date"))
            .run(panel(1, 10, |_, p| p as f64))
            .unwrap_err();
        assert_eq!(
            err,
            PanelError::MissingColumn {
                column: "sales".to_string()
            }
        );
    }
}
