//! Panel data structures: typed columns, raw panels, and normalized panels.

use crate::error::{PanelError, Result};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashSet;

/// A single typed column.
///
/// Missing numeric values are stored as `NaN`, missing categorical values as `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Temporal values.
    Timestamp(Vec<DateTime<Utc>>),
    /// Floating point values.
    Numeric(Vec<f64>),
    /// Textual values.
    Categorical(Vec<Option<String>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Timestamp(v) => v.len(),
            Column::Numeric(v) => v.len(),
            Column::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Human readable kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Column::Timestamp(_) => "timestamp",
            Column::Numeric(_) => "numeric",
            Column::Categorical(_) => "categorical",
        }
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Column::Numeric(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_timestamps(&self) -> Option<&[DateTime<Utc>]> {
        match self {
            Column::Timestamp(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_categorical(&self) -> Option<&[Option<String>]> {
        match self {
            Column::Categorical(v) => Some(v),
            _ => None,
        }
    }

    /// Whether the value at `row` is missing.
    pub fn is_null(&self, row: usize) -> bool {
        match self {
            Column::Timestamp(_) => false,
            Column::Numeric(v) => v[row].is_nan(),
            Column::Categorical(v) => v[row].is_none(),
        }
    }

    pub fn null_count(&self) -> usize {
        (0..self.len()).filter(|&i| self.is_null(i)).count()
    }

    /// String rendering of the value at `row`, `None` when missing.
    pub fn key(&self, row: usize) -> Option<String> {
        match self {
            Column::Timestamp(v) => Some(v[row].to_rfc3339()),
            Column::Numeric(v) => {
                let x = v[row];
                if x.is_nan() {
                    None
                } else {
                    Some(x.to_string())
                }
            }
            Column::Categorical(v) => v[row].clone(),
        }
    }

    /// Number of distinct values, missing values counted once.
    pub fn distinct_count(&self) -> usize {
        let mut seen: HashSet<Option<String>> = HashSet::new();
        for i in 0..self.len() {
            seen.insert(self.key(i));
        }
        seen.len()
    }

    /// Native ordering of two rows. Missing values sort last.
    pub fn compare_rows(&self, a: usize, b: usize) -> Ordering {
        match self {
            Column::Timestamp(v) => v[a].cmp(&v[b]),
            Column::Numeric(v) => match (v[a].is_nan(), v[b].is_nan()) {
                (true, true) => Ordering::Equal,
                (true, false) => Ordering::Greater,
                (false, true) => Ordering::Less,
                (false, false) => v[a].total_cmp(&v[b]),
            },
            Column::Categorical(v) => match (&v[a], &v[b]) {
                (Some(x), Some(y)) => x.cmp(y),
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
            },
        }
    }

    /// Gather rows in the given order.
    pub fn take(&self, rows: &[usize]) -> Column {
        match self {
            Column::Timestamp(v) => Column::Timestamp(rows.iter().map(|&i| v[i]).collect()),
            Column::Numeric(v) => Column::Numeric(rows.iter().map(|&i| v[i]).collect()),
            Column::Categorical(v) => {
                Column::Categorical(rows.iter().map(|&i| v[i].clone()).collect())
            }
        }
    }
}

/// An ordered collection of equally long, uniquely named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Panel {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Panel {
    /// Create a panel, validating lengths and name uniqueness.
    pub fn new(columns: Vec<(String, Column)>) -> Result<Self> {
        let mut panel = Panel::default();
        for (name, column) in columns {
            panel.push_column(name, column)?;
        }
        Ok(panel)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
    }

    /// Get a column, failing with [`PanelError::MissingColumn`].
    pub fn require(&self, name: &str) -> Result<&Column> {
        self.column(name).ok_or_else(|| PanelError::MissingColumn {
            column: name.to_string(),
        })
    }

    /// Get a numeric column's values.
    pub fn numeric(&self, name: &str) -> Result<&[f64]> {
        self.require(name)?
            .as_numeric()
            .ok_or_else(|| PanelError::ColumnType {
                column: name.to_string(),
                expected: "numeric",
            })
    }

    /// Append a column.
    pub fn push_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        if self.names.contains(&name) {
            return Err(PanelError::InvalidParameter(format!(
                "duplicate column name '{}'",
                name
            )));
        }
        if !self.columns.is_empty() && column.len() != self.len() {
            return Err(PanelError::DimensionMismatch {
                expected: self.len(),
                got: column.len(),
            });
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Replace an existing column in place.
    pub fn replace_column(&mut self, name: &str, column: Column) -> Result<()> {
        let idx = self
            .names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| PanelError::MissingColumn {
                column: name.to_string(),
            })?;
        if column.len() != self.len() {
            return Err(PanelError::DimensionMismatch {
                expected: self.len(),
                got: column.len(),
            });
        }
        self.columns[idx] = column;
        Ok(())
    }

    /// Gather rows in the given order.
    pub fn take(&self, rows: &[usize]) -> Panel {
        Panel {
            names: self.names.clone(),
            columns: self.columns.iter().map(|c| c.take(rows)).collect(),
        }
    }
}

/// Row positions of every series in a normalized panel.
///
/// Series are numbered by the native ordering of their identifier values;
/// each series' rows are ascending in time.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesLayout {
    keys: Vec<String>,
    rows: Vec<Vec<usize>>,
}

impl SeriesLayout {
    pub fn new(keys: Vec<String>, rows: Vec<Vec<usize>>) -> Self {
        Self { keys, rows }
    }

    pub fn series_count(&self) -> usize {
        self.keys.len()
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn rows(&self, series: usize) -> &[usize] {
        &self.rows[series]
    }

    pub fn lengths(&self) -> Vec<usize> {
        self.rows.iter().map(Vec::len).collect()
    }

    /// Every series has the same number of rows.
    pub fn is_rectangular(&self) -> bool {
        self.rows.windows(2).all(|w| w[0].len() == w[1].len())
    }
}

/// Numeric history of one series, for plotting collaborators.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesView {
    pub key: String,
    pub timestamps: Vec<DateTime<Utc>>,
    pub columns: Vec<(String, Vec<f64>)>,
}

/// A panel sorted by (timestamp, series) with its series identified.
#[derive(Debug, Clone)]
pub struct NormalizedPanel {
    panel: Panel,
    timestamp_column: String,
    series_id: Option<String>,
    series_of_row: Vec<usize>,
    layout: SeriesLayout,
}

impl NormalizedPanel {
    /// Assemble a normalized panel. `panel` must already be sorted by
    /// (timestamp, series) and carry a timestamp-typed `timestamp_column`.
    pub fn new(
        panel: Panel,
        timestamp_column: String,
        series_id: Option<String>,
        series_of_row: Vec<usize>,
        layout: SeriesLayout,
    ) -> Result<Self> {
        if series_of_row.len() != panel.len() {
            return Err(PanelError::DimensionMismatch {
                expected: panel.len(),
                got: series_of_row.len(),
            });
        }
        if panel.require(&timestamp_column)?.as_timestamps().is_none() {
            return Err(PanelError::ColumnType {
                column: timestamp_column,
                expected: "timestamp",
            });
        }
        Ok(Self {
            panel,
            timestamp_column,
            series_id,
            series_of_row,
            layout,
        })
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }

    pub fn len(&self) -> usize {
        self.panel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panel.is_empty()
    }

    pub fn timestamp_column(&self) -> &str {
        &self.timestamp_column
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        self.panel
            .column(&self.timestamp_column)
            .and_then(Column::as_timestamps)
            .unwrap_or(&[])
    }

    /// Identifier column, `None` for a single-series panel.
    pub fn series_id(&self) -> Option<&str> {
        self.series_id.as_deref()
    }

    pub fn series_count(&self) -> usize {
        self.layout.series_count()
    }

    pub fn series_of_row(&self) -> &[usize] {
        &self.series_of_row
    }

    pub fn layout(&self) -> &SeriesLayout {
        &self.layout
    }

    /// Values of `column` for one series, in time order.
    pub fn series_values(&self, series: usize, column: &str) -> Result<Vec<f64>> {
        let values = self.panel.numeric(column)?;
        Ok(self
            .layout
            .rows(series)
            .iter()
            .map(|&r| values[r])
            .collect())
    }

    /// Per-series numeric columns plus timestamps, for plotting.
    pub fn series_views(&self) -> Vec<SeriesView> {
        let numeric: Vec<(&str, &[f64])> = self
            .panel
            .columns()
            .filter(|(name, _)| Some(*name) != self.series_id())
            .filter_map(|(name, col)| col.as_numeric().map(|v| (name, v)))
            .collect();
        let ts = self.timestamps();

        (0..self.series_count())
            .map(|s| {
                let rows = self.layout.rows(s);
                SeriesView {
                    key: self.layout.keys()[s].clone(),
                    timestamps: rows.iter().map(|&r| ts[r]).collect(),
                    columns: numeric
                        .iter()
                        .map(|(name, v)| (name.to_string(), rows.iter().map(|&r| v[r]).collect()))
                        .collect(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Panel {
        Panel::new(vec![
            ("a".to_string(), Column::Numeric(vec![3.0, f64::NAN, 1.0])),
            (
                "b".to_string(),
                Column::Categorical(vec![Some("x".into()), None, Some("y".into())]),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn panel_validates_lengths_and_names() {
        let err = Panel::new(vec![
            ("a".to_string(), Column::Numeric(vec![1.0, 2.0])),
            ("b".to_string(), Column::Numeric(vec![1.0])),
        ])
        .unwrap_err();
        assert_eq!(err, PanelError::DimensionMismatch { expected: 2, got: 1 });

        let err = Panel::new(vec![
            ("a".to_string(), Column::Numeric(vec![1.0])),
            ("a".to_string(), Column::Numeric(vec![2.0])),
        ])
        .unwrap_err();
        assert!(matches!(err, PanelError::InvalidParameter(_)));
    }

    #[test]
    fn column_nulls_and_keys() {
        let panel = sample();
        let a = panel.column("a").unwrap();
        assert_eq!(a.null_count(), 1);
        assert_eq!(a.key(0).as_deref(), Some("3"));
        assert_eq!(a.key(1), None);

        let b = panel.column("b").unwrap();
        assert_eq!(b.null_count(), 1);
        assert_eq!(b.distinct_count(), 3);
    }

    #[test]
    fn numeric_lookup_reports_type_and_missing_columns() {
        let panel = sample();
        assert_eq!(panel.numeric("a").unwrap().len(), 3);
        assert_eq!(
            panel.numeric("b").unwrap_err(),
            PanelError::ColumnType {
                column: "b".to_string(),
                expected: "numeric"
            }
        );
        assert_eq!(
            panel.numeric("zzz").unwrap_err(),
            PanelError::MissingColumn {
                column: "zzz".to_string()
            }
        );
    }

    #[test]
    fn take_reorders_rows() {
        let panel = sample().take(&[2, 0]);
        assert_eq!(panel.numeric("a").unwrap(), &[1.0, 3.0]);
        assert_eq!(panel.len(), 2);
    }

    #[test]
    fn numeric_ordering_puts_missing_last() {
        let col = Column::Numeric(vec![2.0, f64::NAN, 10.0]);
        assert_eq!(col.compare_rows(0, 2), Ordering::Less);
        assert_eq!(col.compare_rows(1, 2), Ordering::Greater);
    }

    #[test]
    fn layout_reports_rectangularity() {
        let layout = SeriesLayout::new(
            vec!["1".into(), "2".into()],
            vec![vec![0, 2], vec![1, 3]],
        );
        assert!(layout.is_rectangular());
        assert_eq!(layout.lengths(), vec![2, 2]);

        let ragged = SeriesLayout::new(vec!["1".into(), "2".into()], vec![vec![0, 2], vec![1]]);
        assert!(!ragged.is_rectangular());
    }
}
