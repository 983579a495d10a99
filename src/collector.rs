use crate::error::{Error, Result};
use crate::fetch::{
    HLT_PATH, StreamFetchMode, fetch_deadtime, fetch_hlt_rates, fetch_lumisection_details,
    fetch_stream_rows,
};
use crate::join::{LumisectionData, RunStreams, StreamDataset, join_streams};
use crate::oms::OmsApi;
use crate::range::{LsRange, find_range};
use spdlog::{error, info};
use std::time::Instant;

pub struct CollectorOptions {
    /// Requested lumisection window, intersected with each run's own range.
    pub window: LsRange,
    pub hlt_path: String,
    pub stream_fetch: StreamFetchMode,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            window: LsRange::new(1, 9999),
            hlt_path: HLT_PATH.to_string(),
            stream_fetch: StreamFetchMode::default(),
        }
    }
}

#[derive(Debug)]
pub struct RunFailure {
    pub run: u32,
    pub error: Error,
}

/// Result of a multi-run batch: every run that completed, and the ones that
/// did not.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub data: StreamDataset,
    pub failures: Vec<RunFailure>,
}

impl BatchOutcome {
    pub fn all_failed(&self) -> bool {
        self.data.is_empty() && !self.failures.is_empty()
    }
}

/// Runs the range, fetch and join steps for each run in turn.
pub struct StreamInfoCollector<A: OmsApi> {
    api: A,
    options: CollectorOptions,
}

impl<A: OmsApi> StreamInfoCollector<A> {
    pub fn new(api: A, options: CollectorOptions) -> Self {
        Self { api, options }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn into_api(self) -> A {
        self.api
    }

    /// Builds the per-stream records of one run.
    pub fn collect_run(&mut self, run: u32) -> Result<RunStreams> {
        let range = find_range(&mut self.api, run)?.clamp(run, self.options.window)?;

        let details = fetch_lumisection_details(&mut self.api, run, range)?;
        let deadtime = fetch_deadtime(&mut self.api, run, range)?;
        let hlt_rates = fetch_hlt_rates(&mut self.api, run, range, &self.options.hlt_path)?;
        let rows = fetch_stream_rows(&mut self.api, run, range, self.options.stream_fetch)?;

        let lumi = LumisectionData {
            details: &details,
            deadtime: &deadtime,
            hlt_rates: &hlt_rates,
        };
        Ok(join_streams(rows, lumi, &self.options.hlt_path))
    }

    /// Processes `runs` in order. A failing run is logged and reported in
    /// the outcome; the runs around it are unaffected.
    pub fn collect(&mut self, runs: &[u32]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for &run in runs {
            info!("[Batch] Processing run: {}", run);
            let start = Instant::now();
            match self.collect_run(run) {
                Ok(streams) => {
                    info!(
                        "[Batch] Run {} done in {:?}: {} streams, {} records",
                        run,
                        start.elapsed(),
                        streams.len(),
                        streams.values().map(Vec::len).sum::<usize>()
                    );
                    outcome.data.insert(run, streams);
                }
                Err(error) => {
                    error!("[Batch] Run {} failed: {}", run, error);
                    outcome.failures.push(RunFailure { run, error });
                }
            }
        }
        outcome
    }
}
