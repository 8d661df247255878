//! ADF and KPSS tests on stationary and non-stationary series.
//!
//! Run with: cargo run --example stationarity

use anofox_panel::validation::{adf_test, analyze_stationarity, kpss_test, StationarityGate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() {
    tracing_subscriber::fmt().init();

    let mut rng = StdRng::seed_from_u64(42);
    let n = 200;

    let noise: Vec<f64> = (0..n).map(|_| rng.gen::<f64>() - 0.5).collect();
    let mut level = 0.0;
    let walk: Vec<f64> = (0..n)
        .map(|_| {
            level += rng.gen::<f64>() - 0.5;
            level
        })
        .collect();
    let trend: Vec<f64> = noise.iter().enumerate().map(|(i, e)| 0.1 * i as f64 + e).collect();

    println!("{:<14} {:>10} {:>8} {:>6} {:>10} {:>8}", "series", "ADF", "p", "lags", "KPSS", "p");
    println!("{:-<62}", "");
    for (name, series) in [("white noise", &noise), ("random walk", &walk), ("linear trend", &trend)] {
        let adf = adf_test(series, None, 0.05).unwrap();
        let kpss = kpss_test(series, None, 0.05).unwrap();
        println!(
            "{:<14} {:>10.3} {:>8.3} {:>6} {:>10.3} {:>8.3}",
            name, adf.statistic, adf.p_value, adf.lags, kpss.statistic, kpss.p_value
        );
    }

    let panel = vec![
        ("noise".to_string(), noise),
        ("walk".to_string(), walk),
        ("flat".to_string(), vec![3.0; n]),
    ];
    let report = analyze_stationarity(&panel, None, None, 0.05, StationarityGate::Pooled, true);
    println!("\nPooled conclusion: {}", report.conclusion());
    let strict = analyze_stationarity(&panel, None, None, 0.05, StationarityGate::PerSeries, true);
    println!("Per-series conclusion: {}", strict.conclusion());
    for warning in &report.warnings {
        println!("warning: {}", warning);
    }
}
