//! Quickstart example: build a supervised table from an in-memory panel.
//!
//! Run with: cargo run --example quickstart

use anofox_panel::config::PipelineConfig;
use anofox_panel::core::{Column, Panel};
use anofox_panel::pipeline::FeaturePipeline;
use chrono::{Duration, NaiveDate};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== anofox-panel Quickstart ===\n");

    // 1. Three stores observed weekly for two years
    let start = NaiveDate::from_ymd_opt(2010, 2, 5).unwrap();
    let mut date = Vec::new();
    let mut store = Vec::new();
    let mut sales = Vec::new();
    for week in 0..104 {
        for s in 1..=3 {
            date.push(Some((start + Duration::weeks(week)).format("%d-%m-%Y").to_string()));
            store.push(s as f64);
            sales.push(
                10_000.0 * s as f64                                          // store level
                + 25.0 * week as f64                                        // growth
                + 800.0 * (week as f64 * std::f64::consts::TAU / 52.0).sin(), // yearly cycle
            );
        }
    }
    let raw = Panel::new(vec![
        ("Date".to_string(), Column::Categorical(date)),
        ("Store".to_string(), Column::Numeric(store)),
        ("Weekly_Sales".to_string(), Column::Numeric(sales)),
    ])
    .unwrap();
    println!("Raw panel: {} rows x {} columns", raw.len(), raw.width());

    // 2. Configure and run the pipeline
    let config = PipelineConfig::new("Weekly_Sales", "Date")
        .with_window(4)
        .with_window_list(vec![4, 13])
        .with_horizon(3)
        .with_fold_number(3)
        .with_calendar_features(true);
    let output = FeaturePipeline::new(config).run(raw).unwrap();
    let report = &output.report;

    // 3. What the pipeline found
    println!("\n--- Detected ---");
    println!("Series identifier: {:?}", report.context.series_id());
    println!("Series keys:       {:?}", report.context.series_keys());
    println!("Frequency:         {}", report.context.frequency().unit);
    println!("Stationarity:      {}", report.stationarity.conclusion());
    println!("Differenced:       {}", report.differenced);
    println!("Log transformed:   {}", report.log_transformed);

    // 4. The supervised tables
    println!("\n--- Tables ---");
    println!("X: {} rows x {} columns", output.x.len(), output.x.width());
    println!("Y: {} rows x {} columns", output.y.len(), output.y.width());
    for name in report.feature_columns.iter().take(8) {
        println!("  {}", name);
    }
    println!("  ...");

    // 5. Split and folds
    println!("\n--- Validation ---");
    println!("Train rows: {:?}", output.split.train);
    println!("Test rows:  {:?}", output.split.test);
    for fold in &output.folds {
        println!(
            "Fold {}: train {:?}, validation {:?}",
            fold.number, fold.train, fold.validation
        );
    }
}
