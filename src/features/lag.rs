//! Lag features.

use super::per_series;
use crate::core::{Frame, NamedColumn, NormalizedPanel, PanelContext, SeriesGrid};
use crate::error::Result;
use tracing::debug;

/// Lags `1..=depth` of one series. Entry `k - 1` holds lag `k`; the first
/// `k` values of lag `k` are `NaN`.
pub fn series_lags(values: &[f64], depth: usize) -> Vec<Vec<f64>> {
    (1..=depth)
        .map(|k| {
            (0..values.len())
                .map(|t| if t >= k { values[t - k] } else { f64::NAN })
                .collect()
        })
        .collect()
}

/// Lag features `{col}_lag_{k}` for `k` in `1..=window`, shifted within each
/// series only.
pub fn lag_features(
    grid: &SeriesGrid,
    panel: &NormalizedPanel,
    columns: &[String],
    ctx: &PanelContext,
) -> Result<Frame> {
    let depth = ctx.window();
    let mut frame = Frame::new(grid.index());

    for column in columns {
        let lags = per_series(grid, panel, column, depth, ctx.config().parallel, |v| {
            series_lags(v, depth)
        })?;
        for (k, values) in (1..=depth).zip(lags) {
            frame.push(NamedColumn::derived(ctx.lag_name(column, k), column.as_str(), values))?;
        }
    }

    debug!(columns = frame.width(), rows = frame.len(), "lag features");
    Ok(frame)
}
