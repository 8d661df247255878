//! Direct multi-step targets.
//!
//! Row `r` of the assembled table is paired with the target value `k`
//! timestamps later for every `k` in `1..=horizon`. Because rows are in
//! (timestamp, series) order, that value sits `k * series` rows below `r`
//! and belongs to the same series.

use crate::core::{Frame, NamedColumn, PanelContext};
use crate::error::{PanelError, Result};
use tracing::debug;

/// Feature matrix and aligned target matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct HorizonSplit {
    /// Every non-target column of the first `N - horizon * series` rows.
    pub x: Frame,
    /// One `{target}_t+{k}` column per step, indexed by the feature row.
    pub y: Frame,
}

/// Split the assembled table into features and `horizon` future targets.
pub fn horizon_split(table: &Frame, ctx: &PanelContext, series: usize) -> Result<HorizonSplit> {
    let horizon = ctx.horizon();
    let shift = horizon * series;
    if series == 0 || shift >= table.len() {
        return Err(PanelError::InsufficientData {
            needed: shift + 1,
            got: table.len(),
        });
    }

    let target = table.numeric(ctx.target())?;
    let rows = table.len() - shift;

    let mut y = Frame::new(table.index()[..rows].to_vec());
    for k in 1..=horizon {
        let offset = k * series;
        y.push(NamedColumn::derived(
            ctx.horizon_name(k),
            ctx.target(),
            target[offset..offset + rows].to_vec(),
        ))?;
    }

    let mut x = table.slice(0..rows)?;
    x.remove(ctx.target());

    debug!(rows, horizon, features = x.width(), "horizon split");
    Ok(HorizonSplit { x, y })
}
