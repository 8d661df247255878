//! Pipeline configuration.

use crate::error::{PanelError, Result};
use crate::validation::StationarityGate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration shared by every pipeline stage.
///
/// # Example
/// ```
/// use anofox_panel::config::PipelineConfig;
///
/// let config = PipelineConfig::new("Weekly_Sales", "Date")
///     .with_window(5)
///     .with_window_list(vec![5, 10])
///     .with_horizon(4)
///     .with_fold_number(3);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Column to forecast.
    pub target: String,
    /// Column holding the observation time.
    pub timestamp_column: String,
    /// Explicit series identifier; auto-detected when `None`.
    pub series_id: Option<String>,
    /// Lag depth and base rolling window, in rows.
    pub window: usize,
    /// Windows for rolling statistics, in rows.
    pub window_list: Vec<usize>,
    /// Number of steps ahead to predict.
    pub horizon: usize,
    /// Number of walk-forward folds.
    #[serde(alias = "fold_count")]
    pub fold_number: usize,
    /// Share of rows held out as the test set.
    pub test_fraction: f64,
    /// Significance level for the ADF and KPSS tests.
    pub significance_level: f64,
    /// Maximum ADF augmentation lags; `None` uses `12 * (nobs/100)^(1/4)`.
    pub adf_max_lags: Option<usize>,
    /// KPSS Bartlett lags; `None` uses `12 * (n/100)^(1/4)`.
    pub kpss_lags: Option<usize>,
    /// Whether the pooled target or every series decides the transforms.
    pub stationarity_gate: StationarityGate,
    /// Numeric columns to window; `None` windows every numeric column.
    pub feature_columns: Option<Vec<String>>,
    /// `chrono` format string for textual timestamps.
    pub timestamp_format: Option<String>,
    /// Append date-part columns derived from the timestamp.
    pub calendar_features: bool,
    /// Fan per-series work out over the rayon thread pool.
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            timestamp_column: String::new(),
            series_id: None,
            window: 5,
            window_list: vec![5],
            horizon: 1,
            fold_number: 3,
            test_fraction: 0.2,
            significance_level: 0.05,
            adf_max_lags: None,
            kpss_lags: None,
            stationarity_gate: StationarityGate::Pooled,
            feature_columns: None,
            timestamp_format: None,
            calendar_features: false,
            parallel: true,
        }
    }
}

impl PipelineConfig {
    /// Create a configuration for `target` indexed by `timestamp_column`.
    pub fn new(target: impl Into<String>, timestamp_column: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            timestamp_column: timestamp_column.into(),
            ..Self::default()
        }
    }

    pub fn with_series_id(mut self, column: impl Into<String>) -> Self {
        self.series_id = Some(column.into());
        self
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn with_window_list(mut self, windows: Vec<usize>) -> Self {
        self.window_list = windows;
        self
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_fold_number(mut self, folds: usize) -> Self {
        self.fold_number = folds;
        self
    }

    pub fn with_test_fraction(mut self, fraction: f64) -> Self {
        self.test_fraction = fraction;
        self
    }

    pub fn with_significance_level(mut self, level: f64) -> Self {
        self.significance_level = level;
        self
    }

    pub fn with_adf_max_lags(mut self, lags: usize) -> Self {
        self.adf_max_lags = Some(lags);
        self
    }

    pub fn with_kpss_lags(mut self, lags: usize) -> Self {
        self.kpss_lags = Some(lags);
        self
    }

    pub fn with_stationarity_gate(mut self, gate: StationarityGate) -> Self {
        self.stationarity_gate = gate;
        self
    }

    pub fn with_feature_columns(mut self, columns: Vec<String>) -> Self {
        self.feature_columns = Some(columns);
        self
    }

    pub fn with_timestamp_format(mut self, format: impl Into<String>) -> Self {
        self.timestamp_format = Some(format.into());
        self
    }

    pub fn with_calendar_features(mut self, enabled: bool) -> Self {
        self.calendar_features = enabled;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Parse a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.target.is_empty() {
            return Err(PanelError::Config("target column must be set".into()));
        }
        if self.timestamp_column.is_empty() {
            return Err(PanelError::Config("timestamp column must be set".into()));
        }
        if self.target == self.timestamp_column {
            return Err(PanelError::Config(
                "target and timestamp columns must differ".into(),
            ));
        }
        if self.window == 0 {
            return Err(PanelError::InvalidParameter(
                "window must be positive".into(),
            ));
        }
        if self.window_list.contains(&0) {
            return Err(PanelError::InvalidParameter(
                "window_list entries must be positive".into(),
            ));
        }
        if self.horizon == 0 {
            return Err(PanelError::InvalidParameter(
                "horizon must be positive".into(),
            ));
        }
        if self.fold_number == 0 {
            return Err(PanelError::InvalidParameter(
                "fold_number must be positive".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.test_fraction) {
            return Err(PanelError::InvalidParameter(format!(
                "test_fraction must be in [0, 1), got {}",
                self.test_fraction
            )));
        }
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(PanelError::InvalidParameter(format!(
                "significance_level must be in (0, 1), got {}",
                self.significance_level
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = PipelineConfig::new("y", "ts");
        assert_eq!(config.window, 5);
        assert_eq!(config.window_list, vec![5]);
        assert_eq!(config.horizon, 1);
        assert_eq!(config.fold_number, 3);
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.significance_level, 0.05);
        assert!(config.parallel);
        assert_eq!(config.stationarity_gate, StationarityGate::Pooled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_parameters() {
        let base = PipelineConfig::new("y", "ts");
        assert!(base.clone().with_window(0).validate().is_err());
        assert!(base.clone().with_window_list(vec![3, 0]).validate().is_err());
        assert!(base.clone().with_horizon(0).validate().is_err());
        assert!(base.clone().with_fold_number(0).validate().is_err());
        assert!(base.clone().with_test_fraction(1.0).validate().is_err());
        assert!(base.clone().with_test_fraction(-0.1).validate().is_err());
        assert!(base.clone().with_significance_level(0.0).validate().is_err());
        assert!(PipelineConfig::new("ts", "ts").validate().is_err());
        assert!(PipelineConfig::default().validate().is_err());
    }

    #[test]
    fn parses_json_with_defaults() {
        let json = r#"{
            "target": "Weekly_Sales",
            "timestamp_column": "Date",
            "window": 50,
            "window_list": [50, 25, 10],
            "horizon": 4,
            "fold_count": 3
        }"#;
        let config = PipelineConfig::from_json_str(json).unwrap();
        assert_eq!(config.window_list, vec![50, 25, 10]);
        assert_eq!(config.fold_number, 3);
        assert_eq!(config.test_fraction, 0.2);
        assert_eq!(config.series_id, None);
    }

    #[test]
    fn stationarity_gate_parses_from_json() {
        let json = r#"{"target": "y", "timestamp_column": "ts", "stationarity_gate": "per_series"}"#;
        let config = PipelineConfig::from_json_str(json).unwrap();
        assert_eq!(config.stationarity_gate, StationarityGate::PerSeries);
        let config = PipelineConfig::new("y", "ts").with_stationarity_gate(StationarityGate::PerSeries);
        assert_eq!(config.stationarity_gate, StationarityGate::PerSeries);
    }

    #[test]
    fn json_validation_errors_surface() {
        let json = r#"{"target": "y", "timestamp_column": "ts", "horizon": 0}"#;
        assert!(matches!(
            PipelineConfig::from_json_str(json),
            Err(PanelError::InvalidParameter(_))
        ));
        assert!(matches!(
            PipelineConfig::from_json_str("not json"),
            Err(PanelError::Config(_))
        ));
    }
}
