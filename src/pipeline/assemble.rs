//! Panel assembly: base columns joined with derived frames, warm-up trimmed.

use crate::core::{Frame, NamedColumn, NormalizedPanel, PanelContext, SeriesGrid};
use crate::error::{PanelError, Result};
use crate::features::calendar_features;
use tracing::{debug, info};

/// Base panel columns of the kept series in grid order.
///
/// The timestamp and identifier are carried by the row index and are not
/// repeated as columns. Calendar columns are appended when configured.
pub fn base_frame(grid: &SeriesGrid, panel: &NormalizedPanel, ctx: &PanelContext) -> Result<Frame> {
    let rows = grid.panel_rows();
    let mut frame = Frame::new(grid.index());

    for (name, column) in panel.panel().columns() {
        if name == panel.timestamp_column() || Some(name) == panel.series_id() {
            continue;
        }
        frame.push(NamedColumn::base(name, column.take(&rows)))?;
    }

    if ctx.config().calendar_features {
        let timestamps: Vec<_> = frame.index().iter().map(|k| k.timestamp).collect();
        for column in calendar_features(&timestamps) {
            frame.push(column)?;
        }
    }
    Ok(frame)
}

/// Append the columns of `other` to `base`, matching rows by index.
///
/// Rows of `base` missing from `other` get `NaN`. The index of `other` must
/// be unique, so the join never fans out.
pub fn left_join(base: &mut Frame, other: &Frame) -> Result<()> {
    if !other.is_sorted() {
        return Err(PanelError::InvalidParameter(
            "joined frame index must be strictly ascending".into(),
        ));
    }

    if base.index() == other.index() {
        for column in other.columns() {
            base.push(column.clone())?;
        }
        return Ok(());
    }

    let positions: Vec<Option<usize>> = base.index().iter().map(|k| other.position(k)).collect();
    for column in other.columns() {
        let values = column.values.as_numeric().ok_or_else(|| PanelError::ColumnType {
            column: column.name.clone(),
            expected: "numeric",
        })?;
        let joined = positions
            .iter()
            .map(|p| p.map_or(f64::NAN, |i| values[i]))
            .collect();
        base.push(NamedColumn {
            name: column.name.clone(),
            source: column.source.clone(),
            values: crate::core::Column::Numeric(joined),
        })?;
    }
    Ok(())
}

/// Drop the first `window` timestamps of every series.
pub fn trim_warmup(frame: &Frame, window: usize, series: usize) -> Result<Frame> {
    let start = window * series;
    if start >= frame.len() {
        return Err(PanelError::InsufficientData {
            needed: start + 1,
            got: frame.len(),
        });
    }
    frame.slice(start..frame.len())
}

/// Join the derived frames onto the base frame and trim the warm-up rows.
pub fn assemble(mut base: Frame, derived: &[&Frame], ctx: &PanelContext, series: usize) -> Result<Frame> {
    for frame in derived {
        left_join(&mut base, frame)?;
    }
    debug!(rows = base.len(), columns = base.width(), "joined frames");

    let table = trim_warmup(&base, ctx.window(), series)?;
    info!(
        rows = table.len(),
        columns = table.width(),
        trimmed = base.len() - table.len(),
        "assembled feature table"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Column, RowKey};
    use chrono::{Duration, TimeZone, Utc};

    fn index(steps: usize, series: usize) -> Vec<RowKey> {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..steps)
            .flat_map(|p| (0..series).map(move |s| RowKey::new(base + Duration::days(p as i64), s)))
            .collect()
    }

    #[test]
    fn join_on_identical_index_appends() {
        let mut base = Frame::new(index(3, 2));
        base.push(NamedColumn::base("y", Column::Numeric((0..6).map(f64::from).collect())))
            .unwrap();
        let mut lags = Frame::new(index(3, 2));
        lags.push(NamedColumn::derived("y_lag_1", "y", vec![1.0; 6])).unwrap();

        left_join(&mut base, &lags).unwrap();
        assert_eq!(base.column_names(), vec!["y", "y_lag_1"]);
    }

    #[test]
    fn join_on_partial_index_fills_missing() {
        let mut base = Frame::new(index(3, 1));
        let mut other = Frame::new(index(3, 1)[1..].to_vec());
        other.push(NamedColumn::derived("x", "y", vec![5.0, 6.0])).unwrap();

        left_join(&mut base, &other).unwrap();
        let x = base.numeric("x").unwrap();
        assert!(x[0].is_nan());
        assert_eq!(x[1..], [5.0, 6.0]);
    }

    #[test]
    fn warmup_trim_is_uniform_across_series() {
        let mut frame = Frame::new(index(20, 2));
        frame
            .push(NamedColumn::base("y", Column::Numeric((0..40).map(f64::from).collect())))
            .unwrap();
        let trimmed = trim_warmup(&frame, 5, 2).unwrap();
        assert_eq!(trimmed.len(), 30);
        assert_eq!(trimmed.index()[0].series, 0);
        assert_eq!(trimmed.index()[1].series, 1);
        assert_eq!(trimmed.numeric("y").unwrap()[0], 10.0);

        assert!(trim_warmup(&frame, 20, 2).is_err());
    }
}
