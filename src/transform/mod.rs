//! Data transformations for panel features.
//!
//! Provides the incremental rolling window, difference features, and the
//! sign-preserving log trend removal.
//!
//! # Example
//!
//! ```
//! use anofox_panel::transform::{rolling_statistic, signed_log1p, RollingStat};
//!
//! let series = vec![1.0, -2.0, 3.0, 4.0, 5.0];
//!
//! // Trailing mean over three rows
//! let rm = rolling_statistic(&series, 3, RollingStat::Mean);
//! assert_eq!(rm[4], 4.0);
//!
//! // Log transform that keeps the sign and inverts exactly
//! let logged = signed_log1p(&series);
//! assert!(logged.data[1] < 0.0);
//! let back = logged.inverse();
//! assert!((back[1] + 2.0).abs() < 1e-12);
//! ```

pub mod diff;
pub mod log;
pub mod window;

pub use diff::difference_features;
pub use log::{inv_signed_log1p, log_trend_removal, signed_log1p, SignedLogResult, LOG_SUFFIX};
pub use window::{rolling_statistic, rolling_statistics, RollingStat, RollingWindow};
