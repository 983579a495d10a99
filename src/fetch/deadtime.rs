use super::DEADTIME_MAX_PAGES;
use crate::attr::{get_f64, get_u32};
use crate::error::Result;
use crate::oms::{OmsApi, Query, Record};
use crate::range::LsRange;
use fxhash::FxHashMap;
use spdlog::{debug, warn};

/// Fraction of delivered luminosity that was not recorded.
///
/// Zero when nothing was delivered. Not clamped: noise can push it below 0
/// or above 1.
pub fn deadtime(delivered: f64, recorded: f64) -> f64 {
    if delivered > 0.0 {
        1.0 - recorded / delivered
    } else {
        0.0
    }
}

pub fn fetch_deadtime(
    api: &mut impl OmsApi,
    run: u32,
    range: LsRange,
) -> Result<FxHashMap<u32, f64>> {
    let query = Query::new("lumisections")
        .fields(&[
            "delivered_lumi_per_lumisection",
            "recorded_lumi_per_lumisection",
            "lumisection_number",
        ])
        .filter_eq("run_number", run)
        .filter_range("lumisection_number", Some(range.min), Some(range.max))
        .max_pages(DEADTIME_MAX_PAGES);

    let records = api.fetch(&query)?;
    let deadtimes: FxHashMap<u32, f64> = records.into_iter().filter_map(deadtime_entry).collect();
    debug!("[Deadtime] Run {}: {} lumisections", run, deadtimes.len());
    Ok(deadtimes)
}

fn deadtime_entry(record: Record) -> Option<(u32, f64)> {
    let Some(attrs) = record.attributes else {
        warn!("[Deadtime] Missing attributes in lumisection record {:?}", record.id);
        return None;
    };
    let Some(ls) = get_u32(&attrs, "lumisection_number") else {
        warn!("[Deadtime] Missing lumisection_number in lumi data: {:?}", attrs);
        return None;
    };
    let delivered = get_f64(&attrs, "delivered_lumi_per_lumisection").unwrap_or(0.0);
    let recorded = get_f64(&attrs, "recorded_lumi_per_lumisection").unwrap_or(0.0);
    Some((ls, deadtime(delivered, recorded)))
}
