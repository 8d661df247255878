//! Rolling-statistic features.
//!
//! For every window in the configured list and every [`RollingStat`], the
//! trailing statistic is computed per series. Column names carry the window
//! expressed in the detected time unit, e.g. `sales_stat_mean_5_weeks` for a
//! five-row window on weekly data.

use super::per_series;
use crate::core::{Frame, NamedColumn, NormalizedPanel, PanelContext, SeriesGrid};
use crate::error::Result;
use crate::transform::window::{rolling_statistic, rolling_statistics, RollingStat};
use tracing::debug;

/// Rolling-statistic features for `columns`.
///
/// Repeated windows in the list are computed once.
pub fn rolling_features(
    grid: &SeriesGrid,
    panel: &NormalizedPanel,
    columns: &[String],
    ctx: &PanelContext,
) -> Result<Frame> {
    let mut windows: Vec<usize> = Vec::with_capacity(ctx.window_list().len());
    for &w in ctx.window_list() {
        if !windows.contains(&w) {
            windows.push(w);
        }
    }

    let stats = RollingStat::ALL;
    let mut frame = Frame::new(grid.index());

    for column in columns {
        for &window in &windows {
            let outputs = per_series(grid, panel, column, stats.len(), ctx.config().parallel, |v| {
                rolling_statistics(v, window, &stats)
            })?;
            for (stat, values) in stats.iter().zip(outputs) {
                let name = ctx.stat_name(column, stat.name(), window);
                frame.push(NamedColumn::derived(name, column.as_str(), values))?;
            }
        }
    }

    debug!(
        columns = frame.width(),
        windows = ?windows,
        "rolling statistic features"
    );
    Ok(frame)
}

/// Rolling mean of the target at the base window, in grid order.
///
/// Reuses the column from `stats` when the base window is in the window list.
pub fn target_rolling_mean(
    grid: &SeriesGrid,
    panel: &NormalizedPanel,
    stats: &Frame,
    ctx: &PanelContext,
) -> Result<(String, Vec<f64>)> {
    let name = ctx.stat_name(ctx.target(), RollingStat::Mean.name(), ctx.window());
    if let Ok(values) = stats.numeric(&name) {
        return Ok((name, values.to_vec()));
    }
    let window = ctx.window();
    let mut out = per_series(grid, panel, ctx.target(), 1, ctx.config().parallel, |v| {
        vec![rolling_statistic(v, window, RollingStat::Mean)]
    })?;
    Ok((name, out.pop().unwrap_or_default()))
}
