//! Sign-preserving logarithmic trend removal.
//!
//! `y = sign(x) * ln(1 + |x|)`, inverted by `x = sign(y) * (exp(|y|) - 1)`.

use crate::core::{Column, Frame};
use crate::error::{PanelError, Result};
use tracing::debug;

/// Suffix appended to transformed column names.
pub const LOG_SUFFIX: &str = "_log";

/// Result of the signed log transform.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedLogResult {
    /// Transformed data
    pub data: Vec<f64>,
    /// Rows whose original value was negative
    pub negative: Vec<bool>,
}

impl SignedLogResult {
    /// Inverse transform to recover original scale.
    pub fn inverse(&self) -> Vec<f64> {
        inv_signed_log1p(&self.data, &self.negative)
    }
}

/// Apply `ln(1 + |x|)` and restore the sign of negative inputs.
///
/// Missing values stay missing.
pub fn signed_log1p(series: &[f64]) -> SignedLogResult {
    let negative: Vec<bool> = series.iter().map(|&x| x < 0.0).collect();
    let data = series
        .iter()
        .zip(&negative)
        .map(|(&x, &neg)| {
            let y = x.abs().ln_1p();
            if neg {
                -y
            } else {
                y
            }
        })
        .collect();
    SignedLogResult { data, negative }
}

/// Inverse of [`signed_log1p`].
pub fn inv_signed_log1p(transformed: &[f64], negative: &[bool]) -> Vec<f64> {
    transformed
        .iter()
        .zip(negative)
        .map(|(&y, &neg)| {
            let x = y.abs().exp_m1();
            if neg {
                -x
            } else {
                x
            }
        })
        .collect()
}

/// Log-transform every column derived from `target` in place, renaming it
/// with [`LOG_SUFFIX`]. The target column itself is untouched.
///
/// Returns the new column names.
pub fn log_trend_removal(frame: &mut Frame, target: &str) -> Result<Vec<String>> {
    let columns = frame.derived_from(target);
    let mut renamed = Vec::with_capacity(columns.len());

    for name in columns {
        let new_name = format!("{}{}", name, LOG_SUFFIX);
        if frame.column(&new_name).is_some() {
            return Err(PanelError::InvalidParameter(format!(
                "column '{}' already exists",
                new_name
            )));
        }
        let transformed = signed_log1p(frame.numeric(&name)?).data;
        if let Some(column) = frame.column_mut(&name) {
            column.name = new_name.clone();
            column.values = Column::Numeric(transformed);
        }
        renamed.push(new_name);
    }

    debug!(columns = renamed.len(), "log trend removal");
    Ok(renamed)
}
