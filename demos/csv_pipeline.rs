//! Run the pipeline on a CSV file and write X and Y next to it.
//!
//! Run with: cargo run --example csv_pipeline -- <panel.csv> <target> <timestamp> [config.json]

use anofox_panel::config::PipelineConfig;
use anofox_panel::io::write_frame_csv;
use anofox_panel::pipeline::{FeaturePipeline, PipelineOutput};
use anofox_panel::Result;
use std::fs::File;
use std::path::Path;

fn main() {
    tracing_subscriber::fmt().init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!("usage: {} <panel.csv> <target> <timestamp> [config.json]", args[0]);
        std::process::exit(2);
    }

    let config = match args.get(4) {
        Some(path) => match PipelineConfig::from_json_file(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("config {} unreadable: {}", path, err);
                std::process::exit(2);
            }
        },
        None => PipelineConfig::new(args[2].as_str(), args[3].as_str()),
    };

    let output = match FeaturePipeline::new(config).run_csv(&args[1]) {
        Ok(output) => output,
        Err(err) => {
            eprintln!("pipeline failed: {}", err);
            std::process::exit(1);
        }
    };

    let dir = Path::new(&args[1]).parent().unwrap_or(Path::new("."));
    if let Err(err) = write_outputs(&output, dir) {
        eprintln!("writing results failed: {}", err);
        std::process::exit(1);
    }

    println!(
        "wrote {} feature rows x {} columns, {} folds, to {}",
        output.x.len(),
        output.x.width(),
        output.folds.len(),
        dir.display()
    );
    for warning in &output.report.warnings {
        println!("warning: {}", warning);
    }
}

fn write_outputs(output: &PipelineOutput, dir: &Path) -> Result<()> {
    let ctx = &output.report.context;
    write_frame_csv(&output.x, ctx, File::create(dir.join("features.csv"))?)?;
    write_frame_csv(&output.y, ctx, File::create(dir.join("targets.csv"))?)?;

    std::fs::write(dir.join("report.json"), serde_json::to_string_pretty(&output.report)?)?;
    std::fs::write(dir.join("folds.json"), serde_json::to_string_pretty(&output.folds)?)?;
    Ok(())
}
