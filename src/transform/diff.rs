//! Difference features for a non-stationary target.
//!
//! For every lag and rolling-statistic column of the target two columns are
//! derived: the target minus the column (`{target}_diff_{suffix}`), and the
//! column minus the target's rolling mean at the base window
//! (`{column}_diff_{base_mean}`). The base mean itself is not differenced.

use crate::core::{Frame, NamedColumn, PanelContext};
use crate::error::{PanelError, Result};
use rayon::prelude::*;
use tracing::debug;

/// Derive difference features from the target's lag and statistic columns.
///
/// `target` and `base_mean` are grid-ordered like the frames in `inputs`.
pub fn difference_features(
    ctx: &PanelContext,
    target: &[f64],
    base_mean: (&str, &[f64]),
    inputs: &[&Frame],
) -> Result<Vec<NamedColumn>> {
    let (base_name, base_values) = base_mean;
    if base_values.len() != target.len() {
        return Err(PanelError::DimensionMismatch {
            expected: target.len(),
            got: base_values.len(),
        });
    }

    let prefix = format!("{}_", ctx.target());
    let mut candidates: Vec<(&str, &[f64])> = Vec::new();
    for frame in inputs {
        if frame.len() != target.len() {
            return Err(PanelError::DimensionMismatch {
                expected: target.len(),
                got: frame.len(),
            });
        }
        for column in frame.columns() {
            if !column.is_derived_from(ctx.target()) || column.name == base_name {
                continue;
            }
            if let Some(values) = column.values.as_numeric() {
                candidates.push((column.name.as_str(), values));
            }
        }
    }

    let derive = |&(name, values): &(&str, &[f64])| {
        let suffix = name.strip_prefix(prefix.as_str()).unwrap_or(name);
        let to_target: Vec<f64> = target.iter().zip(values).map(|(y, x)| y - x).collect();
        let to_mean: Vec<f64> = values.iter().zip(base_values).map(|(x, m)| x - m).collect();
        [
            NamedColumn::derived(
                format!("{}_diff_{}", ctx.target(), suffix),
                ctx.target(),
                to_target,
            ),
            NamedColumn::derived(format!("{}_diff_{}", name, base_name), ctx.target(), to_mean),
        ]
    };

    let columns: Vec<NamedColumn> = if ctx.config().parallel {
        candidates.par_iter().flat_map_iter(derive).collect()
    } else {
        candidates.iter().flat_map(derive).collect()
    };

    debug!(inputs = candidates.len(), columns = columns.len(), "difference features");
    Ok(columns)
}
