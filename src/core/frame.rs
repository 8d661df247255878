//! Frames indexed by (timestamp, series).
//!
//! Every derived table (lags, rolling statistics, differences) and the
//! assembled feature and target matrices are [`Frame`]s. Rows are kept in
//! ascending [`RowKey`] order, which is the canonical panel order.

use crate::core::panel::Column;
use crate::error::{PanelError, Result};
use chrono::{DateTime, Utc};
use std::ops::Range;

/// Row index of a frame: timestamp first, then series ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowKey {
    pub timestamp: DateTime<Utc>,
    pub series: usize,
}

impl RowKey {
    pub fn new(timestamp: DateTime<Utc>, series: usize) -> Self {
        Self { timestamp, series }
    }
}

/// A column together with the panel column it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedColumn {
    pub name: String,
    /// Source column for derived features, `None` for base panel columns.
    pub source: Option<String>,
    pub values: Column,
}

impl NamedColumn {
    pub fn base(name: impl Into<String>, values: Column) -> Self {
        Self {
            name: name.into(),
            source: None,
            values,
        }
    }

    pub fn derived(name: impl Into<String>, source: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            source: Some(source.into()),
            values: Column::Numeric(values),
        }
    }

    /// Whether this column is derived from `source`.
    pub fn is_derived_from(&self, source: &str) -> bool {
        self.source.as_deref() == Some(source)
    }
}

/// A table of named columns over a shared, sorted row index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    index: Vec<RowKey>,
    columns: Vec<NamedColumn>,
}

impl Frame {
    /// Create an empty frame over `index`.
    pub fn new(index: Vec<RowKey>) -> Self {
        Self {
            index,
            columns: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn index(&self) -> &[RowKey] {
        &self.index
    }

    pub fn columns(&self) -> &[NamedColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&NamedColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Numeric values of a column.
    pub fn numeric(&self, name: &str) -> Result<&[f64]> {
        let column = self.column(name).ok_or_else(|| PanelError::MissingColumn {
            column: name.to_string(),
        })?;
        column
            .values
            .as_numeric()
            .ok_or_else(|| PanelError::ColumnType {
                column: name.to_string(),
                expected: "numeric",
            })
    }

    /// Append a column of matching length and unique name.
    pub fn push(&mut self, column: NamedColumn) -> Result<()> {
        if column.values.len() != self.len() {
            return Err(PanelError::DimensionMismatch {
                expected: self.len(),
                got: column.values.len(),
            });
        }
        if self.column(&column.name).is_some() {
            return Err(PanelError::InvalidParameter(format!(
                "duplicate column name '{}'",
                column.name
            )));
        }
        self.columns.push(column);
        Ok(())
    }

    /// Remove a column by name.
    pub fn remove(&mut self, name: &str) -> Option<NamedColumn> {
        let idx = self.columns.iter().position(|c| c.name == name)?;
        Some(self.columns.remove(idx))
    }

    /// Mutable access to a column.
    pub fn column_mut(&mut self, name: &str) -> Option<&mut NamedColumn> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Position of `key` in the index.
    pub fn position(&self, key: &RowKey) -> Option<usize> {
        self.index.binary_search(key).ok()
    }

    /// Index is strictly ascending.
    pub fn is_sorted(&self) -> bool {
        self.index.windows(2).all(|w| w[0] < w[1])
    }

    /// Names of all columns derived from `source`, in column order.
    pub fn derived_from(&self, source: &str) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.is_derived_from(source))
            .map(|c| c.name.clone())
            .collect()
    }

    /// Copy a contiguous block of rows.
    pub fn slice(&self, range: Range<usize>) -> Result<Frame> {
        if range.start > range.end || range.end > self.len() {
            return Err(PanelError::IndexOutOfBounds {
                index: range.end,
                size: self.len(),
            });
        }
        let rows: Vec<usize> = range.collect();
        Ok(self.take(&rows))
    }

    /// Gather rows by position.
    pub fn take(&self, rows: &[usize]) -> Frame {
        Frame {
            index: rows.iter().map(|&r| self.index[r]).collect(),
            columns: self
                .columns
                .iter()
                .map(|c| NamedColumn {
                    name: c.name.clone(),
                    source: c.source.clone(),
                    values: c.values.take(rows),
                })
                .collect(),
        }
    }

    /// Numeric matrix in row-major order, skipping non-numeric columns.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        let numeric: Vec<&[f64]> = self
            .columns
            .iter()
            .filter_map(|c| c.values.as_numeric())
            .collect();
        (0..self.len())
            .map(|r| numeric.iter().map(|col| col[r]).collect())
            .collect()
    }
}
