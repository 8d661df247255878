//! Chronological train/test split and walk-forward folds.
//!
//! Rows are in (timestamp, series) order, so every boundary is kept at a
//! multiple of the series count: each block then holds whole timestamps and
//! no series is cut between two timestamps.

use crate::error::{PanelError, Result};
use serde::Serialize;
use std::ops::Range;
use tracing::debug;

/// Train/test boundary over the feature rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Split {
    pub train: Range<usize>,
    pub test: Range<usize>,
}

/// One walk-forward fold. Training always starts at row 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fold {
    /// 1-based fold number.
    pub number: usize,
    pub train: Range<usize>,
    pub validation: Range<usize>,
}

impl Fold {
    /// Training row positions.
    pub fn train_rows(&self) -> Vec<usize> {
        self.train.clone().collect()
    }

    /// Validation row positions.
    pub fn validation_rows(&self) -> Vec<usize> {
        self.validation.clone().collect()
    }
}

/// Split `rows` into a leading train block and a trailing test block.
///
/// The boundary is the largest multiple of `series` not above
/// `rows * (1 - test_fraction)`.
pub fn train_test_split(rows: usize, series: usize, test_fraction: f64) -> Result<Split> {
    if series == 0 {
        return Err(PanelError::InvalidParameter("series count must be positive".into()));
    }
    if !(0.0..1.0).contains(&test_fraction) {
        return Err(PanelError::InvalidParameter(format!(
            "test_fraction must be in [0, 1), got {}",
            test_fraction
        )));
    }

    let target = ((rows as f64) * (1.0 - test_fraction) + 1e-9).floor() as usize;
    let boundary = target.min(rows) / series * series;
    if boundary == 0 {
        return Err(PanelError::FoldBoundary {
            rows,
            series,
            parts: 2,
        });
    }

    debug!(rows, series, boundary, "train/test split");
    Ok(Split {
        train: 0..boundary,
        test: boundary..rows,
    })
}

/// Expanding-window folds over `rows`.
///
/// The rows are cut into `folds + 1` blocks whose size is the largest
/// multiple of `series` not above `rows / (folds + 1)`. Fold `i` trains on
/// the first `i` blocks and validates on block `i + 1`; the last fold's
/// validation also takes any remainder.
pub fn walk_forward_folds(rows: usize, series: usize, folds: usize) -> Result<Vec<Fold>> {
    if series == 0 || folds == 0 {
        return Err(PanelError::InvalidParameter(
            "series and fold counts must be positive".into(),
        ));
    }

    let parts = folds + 1;
    let mut block = rows / parts;
    while block > 0 && block % series != 0 {
        block -= 1;
    }
    if block == 0 {
        return Err(PanelError::FoldBoundary {
            rows,
            series,
            parts,
        });
    }

    debug!(rows, series, folds, block, "walk-forward folds");
    Ok((1..=folds)
        .map(|number| {
            let start = block * number;
            let end = if number == folds { rows } else { start + block };
            Fold {
                number,
                train: 0..start,
                validation: start..end,
            }
        })
        .collect())
}
