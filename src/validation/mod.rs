//! Stationarity tests used to gate the difference and log transforms.
//!
//! # Example
//!
//! ```
//! use anofox_panel::validation::{adf_test, kpss_test};
//!
//! let series: Vec<f64> = (0..120).map(|i| ((i * 37 + 11) % 23) as f64 - 11.0).collect();
//! let adf = adf_test(&series, None, 0.05).unwrap();
//! let kpss = kpss_test(&series, Some(4), 0.05).unwrap();
//! println!("ADF p = {:.3}, KPSS p = {:.3}", adf.p_value, kpss.p_value);
//!
//! // A constant series makes both tests undefined.
//! assert!(adf_test(&[1.0; 30], None, 0.05).is_err());
//! ```

pub mod stationarity;

pub use stationarity::{
    adf_test, analyze_stationarity, kpss_test, pooled_column, CriticalValues, SeriesStationarity,
    StationarityGate, StationarityReport, StationarityResult,
};
