//! # anofox-panel
//!
//! Leakage-safe supervised tables from multi-series time series panels.
//!
//! A panel stacks many series on a shared calendar. This crate normalizes
//! it, detects the sampling frequency, tests the target for stationarity,
//! builds per-series lag and rolling-statistic features, applies the
//! difference and log transforms the tests call for, and returns a feature
//! matrix, a multi-step target matrix, a chronological train/test split and
//! walk-forward folds. No feature row ever sees a value from its own future
//! or from another series.

// Index loops over aligned per-series buffers.
#![allow(clippy::needless_range_loop)]

pub mod config;
pub mod core;
pub mod detection;
pub mod error;
pub mod features;
pub mod io;
pub mod normalize;
pub mod pipeline;
pub mod transform;
pub mod utils;
pub mod validation;

pub use error::{PanelError, Result};

pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::core::{Column, Frame, Panel, PanelContext, RowKey};
    pub use crate::error::{PanelError, Result};
    pub use crate::io::{read_panel_csv, write_frame_csv};
    pub use crate::pipeline::{FeaturePipeline, PipelineOutput, PipelineReport};
    pub use crate::utils::{Fold, Split};
}
