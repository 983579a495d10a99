use clap::Parser;
use spdlog::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;

use oms_streams::evolution::{EvolutionChart, PARTIAL_YEAR, YEARS};
use oms_streams::export::write_json;

/// Write the inputs of the yearly HLT-rate evolution chart as JSON.
#[derive(Parser)]
struct Args {
    /// Appended to the output file name
    suffix: String,

    /// Directory the JSON file is written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let chart = match EvolutionChart::build(&YEARS, Some(PARTIAL_YEAR)) {
        Ok(chart) => chart,
        Err(e) => {
            error!("[Evolution] {}", e);
            return ExitCode::FAILURE;
        }
    };

    let path = args
        .out_dir
        .join(format!("hlt_rate_evolution_{}.json", args.suffix));
    if let Err(e) = write_json(&path, &chart) {
        error!("[Evolution] Failed to write {}: {}", path.display(), e);
        return ExitCode::FAILURE;
    }
    info!(
        "[Evolution] Wrote {} years, {} pads to {}",
        chart.bins.len(),
        chart.pads.len(),
        path.display()
    );
    ExitCode::SUCCESS
}
