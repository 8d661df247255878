//! Rectangular (timestamp × series) grid over the series kept for features.
//!
//! Row `position * n + slot` of every frame built on a grid holds the
//! `position`-th timestamp of the `slot`-th kept series, which is exactly the
//! (timestamp, series) sort order. Shifting a column by `k * n` rows
//! therefore moves it `k` steps in time within the same series.

use crate::core::frame::RowKey;
use crate::core::panel::NormalizedPanel;
use crate::error::{PanelError, Result};
use chrono::{DateTime, Utc};
use tracing::warn;

/// Kept series sharing one calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesGrid {
    /// Shared calendar, ascending.
    timestamps: Vec<DateTime<Utc>>,
    /// Series ordinals (in the normalized panel) of the kept series, ascending.
    series: Vec<usize>,
    /// Identifier values of the kept series.
    keys: Vec<String>,
    /// Normalized panel rows of every kept series, in time order.
    rows: Vec<Vec<usize>>,
}

impl SeriesGrid {
    /// Keep the series with more than `min_len` rows.
    ///
    /// Returns the grid and the keys of the dropped series. Fails with
    /// [`PanelError::InsufficientData`] when nothing survives and with
    /// [`PanelError::RaggedPanel`] when the kept series do not share
    /// identical timestamps.
    pub fn build(panel: &NormalizedPanel, min_len: usize) -> Result<(Self, Vec<String>)> {
        let layout = panel.layout();
        let ts = panel.timestamps();

        let mut kept = Vec::new();
        let mut dropped = Vec::new();
        for s in 0..layout.series_count() {
            if layout.rows(s).len() > min_len {
                kept.push(s);
            } else {
                let key = layout.keys()[s].clone();
                warn!(
                    series = %key,
                    rows = layout.rows(s).len(),
                    needed = min_len + 1,
                    "dropping series with insufficient history"
                );
                dropped.push(key);
            }
        }

        let Some(&first) = kept.first() else {
            let longest = layout.lengths().into_iter().max().unwrap_or(0);
            return Err(PanelError::InsufficientData {
                needed: min_len + 1,
                got: longest,
            });
        };

        let calendar: Vec<DateTime<Utc>> = layout.rows(first).iter().map(|&r| ts[r]).collect();
        for &s in &kept[1..] {
            let rows = layout.rows(s);
            let same = rows.len() == calendar.len()
                && rows.iter().zip(&calendar).all(|(&r, t)| ts[r] == *t);
            if !same {
                return Err(PanelError::RaggedPanel(format!(
                    "series '{}' has {} rows on a different calendar than series '{}' ({} rows)",
                    layout.keys()[s],
                    rows.len(),
                    layout.keys()[first],
                    calendar.len()
                )));
            }
        }

        let grid = Self {
            timestamps: calendar,
            keys: kept.iter().map(|&s| layout.keys()[s].clone()).collect(),
            rows: kept.iter().map(|&s| layout.rows(s).to_vec()).collect(),
            series: kept,
        };
        Ok((grid, dropped))
    }

    /// Number of rows, `steps * series_count`.
    pub fn len(&self) -> usize {
        self.timestamps.len() * self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of kept series.
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Number of timestamps per series.
    pub fn steps(&self) -> usize {
        self.timestamps.len()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Frame row of (`position`, `slot`).
    pub fn row(&self, position: usize, slot: usize) -> usize {
        position * self.series.len() + slot
    }

    /// Row index in (timestamp, series) order.
    pub fn index(&self) -> Vec<RowKey> {
        self.timestamps
            .iter()
            .flat_map(|&t| self.series.iter().map(move |&s| RowKey::new(t, s)))
            .collect()
    }

    /// Normalized panel rows in grid order.
    pub fn panel_rows(&self) -> Vec<usize> {
        (0..self.steps())
            .flat_map(|p| self.rows.iter().map(move |rows| rows[p]))
            .collect()
    }

    /// Values of a numeric column for the kept series in `slot`.
    pub fn series_values(&self, panel: &NormalizedPanel, column: &str, slot: usize) -> Result<Vec<f64>> {
        let values = panel.panel().numeric(column)?;
        Ok(self.rows[slot].iter().map(|&r| values[r]).collect())
    }

    /// Write one series' values into a grid-ordered buffer.
    pub fn scatter(&self, slot: usize, values: &[f64], out: &mut [f64]) {
        let n = self.series.len();
        for (p, &v) in values.iter().enumerate() {
            out[p * n + slot] = v;
        }
    }

    /// Read one series out of a grid-ordered buffer.
    pub fn gather(&self, slot: usize, column: &[f64]) -> Vec<f64> {
        column
            .iter()
            .skip(slot)
            .step_by(self.series.len())
            .copied()
            .collect()
    }
}
