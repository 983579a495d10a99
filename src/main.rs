use clap::Parser;
use spdlog::prelude::*;
use std::process::ExitCode;

use oms_streams::config::Args;
use oms_streams::export::write_export;
use oms_streams::oms::{AppSecret, OmsClient};
use oms_streams::runs::resolve_runs;
use oms_streams::{Result, StreamInfoCollector};

fn main() -> ExitCode {
    let args = Args::parse();
    spdlog::default_logger().set_level_filter(args.log_level.level_filter());

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            error!("[System] {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<ExitCode> {
    // Reject bad options before touching the network.
    let selection = args.selection()?;
    let options = args.collector_options()?;

    let secret = AppSecret::load(&args.secret_file)?;
    let mut client = OmsClient::new(args.client_options())?;
    client.authenticate(&secret, &args.token_url, &args.audience)?;

    let runs = resolve_runs(&mut client, selection)?;
    info!("[System] Processing {} run(s)", runs.len());

    let mut collector = StreamInfoCollector::new(client, options);
    let outcome = collector.collect(&runs);
    info!("[Latency/OMS] {}", collector.api().latency().format_stats());

    write_export(&args.output, &outcome.data)?;

    if outcome.all_failed() {
        error!(
            "[System] All {} run(s) failed; wrote an empty dataset",
            outcome.failures.len()
        );
        return Ok(ExitCode::FAILURE);
    }
    for failure in &outcome.failures {
        warn!("[System] Run {} skipped: {}", failure.run, failure.error);
    }
    Ok(ExitCode::SUCCESS)
}
