//! CSV ingest of raw panels and CSV export of frames.

use crate::core::{Column, Frame, Panel, PanelContext};
use crate::error::{PanelError, Result};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use tracing::info;

/// Read a panel from a CSV file with a header row.
pub fn read_panel_csv(path: impl AsRef<Path>) -> Result<Panel> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| PanelError::Io(format!("failed to open '{}': {}", path.display(), e)))?;
    let panel = read_panel_csv_from_reader(BufReader::new(file))?;
    info!(
        path = %path.display(),
        rows = panel.len(),
        columns = panel.width(),
        "read panel"
    );
    Ok(panel)
}

/// Read a panel from any CSV source with a header row.
///
/// A column is numeric when every non-empty cell parses as `f64`; empty
/// cells become `NaN`. Other columns are categorical with empty cells
/// missing. Timestamps stay textual until normalization.
pub fn read_panel_csv_from_reader<R: Read>(reader: R) -> Result<Panel> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();
    if headers.is_empty() {
        return Err(PanelError::EmptyData);
    }

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for result in reader.records() {
        let record = result?;
        for (column, field) in cells.iter_mut().zip(record.iter()) {
            column.push(field.to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(cells)
        .map(|(name, values)| (name, infer_column(values)))
        .collect();
    Panel::new(columns)
}

fn infer_column(values: Vec<String>) -> Column {
    let parsed: Option<Vec<f64>> = values
        .iter()
        .map(|v| {
            if v.is_empty() {
                Some(f64::NAN)
            } else {
                v.parse::<f64>().ok()
            }
        })
        .collect();

    match parsed {
        Some(numbers) if values.iter().any(|v| !v.is_empty()) => Column::Numeric(numbers),
        _ => Column::Categorical(
            values
                .into_iter()
                .map(|v| if v.is_empty() { None } else { Some(v) })
                .collect(),
        ),
    }
}

/// Write a frame as CSV: timestamp, series identifier (for panels), then
/// every column. Missing values are written as empty cells.
pub fn write_frame_csv<W: Write>(frame: &Frame, ctx: &PanelContext, writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = vec![ctx.timestamp_column()];
    if let Some(id) = ctx.series_id() {
        header.push(id);
    }
    header.extend(frame.column_names());
    writer.write_record(&header)?;

    let mut record: Vec<String> = Vec::with_capacity(header.len());
    for (row, key) in frame.index().iter().enumerate() {
        record.clear();
        record.push(key.timestamp.format("%Y-%m-%d %H:%M:%S").to_string());
        if ctx.series_id().is_some() {
            let series = ctx.series_keys().get(key.series).cloned().unwrap_or_default();
            record.push(series);
        }
        for column in frame.columns() {
            record.push(column.values.key(row).unwrap_or_default());
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
