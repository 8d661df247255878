//! Core data structures: typed panels, derived frames, and the run context.

mod context;
mod frame;
mod grid;
mod panel;

pub use context::PanelContext;
pub use frame::{Frame, NamedColumn, RowKey};
pub use grid::SeriesGrid;
pub use panel::{Column, NormalizedPanel, Panel, SeriesLayout, SeriesView};
