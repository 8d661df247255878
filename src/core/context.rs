//! Immutable run context shared by every pipeline stage.

use crate::config::PipelineConfig;
use crate::detection::Frequency;
use serde::Serialize;

/// Configuration plus the values detected from the panel at startup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelContext {
    config: PipelineConfig,
    series_id: Option<String>,
    series_keys: Vec<String>,
    frequency: Frequency,
}

impl PanelContext {
    pub fn new(
        config: PipelineConfig,
        series_id: Option<String>,
        series_keys: Vec<String>,
        frequency: Frequency,
    ) -> Self {
        Self {
            config,
            series_id,
            series_keys,
            frequency,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn target(&self) -> &str {
        &self.config.target
    }

    pub fn timestamp_column(&self) -> &str {
        &self.config.timestamp_column
    }

    pub fn window(&self) -> usize {
        self.config.window
    }

    pub fn window_list(&self) -> &[usize] {
        &self.config.window_list
    }

    pub fn horizon(&self) -> usize {
        self.config.horizon
    }

    /// Identifier column, `None` for a single-series panel.
    pub fn series_id(&self) -> Option<&str> {
        self.series_id.as_deref()
    }

    /// Identifier values in series-ordinal order.
    pub fn series_keys(&self) -> &[String] {
        &self.series_keys
    }

    pub fn series_count(&self) -> usize {
        self.series_keys.len()
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Name of the `step`-row lag of `column`.
    pub fn lag_name(&self, column: &str, step: usize) -> String {
        format!("{}_lag_{}", column, step)
    }

    /// Name of a rolling statistic, with the window expressed in detected units.
    pub fn stat_name(&self, column: &str, stat: &str, window: usize) -> String {
        format!(
            "{}_stat_{}_{}_{}",
            column,
            stat,
            self.frequency.rescale(window),
            self.frequency.unit
        )
    }

    /// Name of the `step`-ahead target column.
    pub fn horizon_name(&self, step: usize) -> String {
        format!("{}_t+{}", self.config.target, step)
    }
}
