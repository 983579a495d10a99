use crate::attr::{get_f64, get_u32};
use crate::error::Result;
use crate::oms::{DEFAULT_PER_PAGE, OmsApi, PAGE_LIMIT, Query, Record};
use crate::range::LsRange;
use fxhash::FxHashMap;
use spdlog::{debug, warn};

/// Length of a lumisection in seconds: 2^18 orbits at 11245.5 Hz.
pub const LS_LENGTH: f64 = 262_144.0 / 11_245.5;

/// Trigger path whose rate goes into every joined record.
pub const HLT_PATH: &str = "Status_OnGPU";

/// Rate of `path` in Hz, keyed by the last lumisection of each counter bucket.
///
/// Buckets that end in the same lumisection overwrite each other in fetch
/// order.
pub fn fetch_hlt_rates(
    api: &mut impl OmsApi,
    run: u32,
    range: LsRange,
    path: &str,
) -> Result<FxHashMap<u32, f64>> {
    let query = Query::new("hltpathrates")
        .fields(&["counter", "last_lumisection_number"])
        .filter_eq("run_number", run)
        .filter_range("first_lumisection_number", Some(range.min), None)
        .filter_range("last_lumisection_number", None, Some(range.max))
        .filter_eq("path_name", path)
        .per_page(DEFAULT_PER_PAGE)
        .max_pages(PAGE_LIMIT);

    let records = api.fetch(&query)?;
    let mut rates = FxHashMap::default();
    for (ls, rate) in records.into_iter().filter_map(rate_entry) {
        rates.insert(ls, rate);
    }
    debug!("[HLT] Run {}: {} samples of {}", run, rates.len(), path);
    Ok(rates)
}

fn rate_entry(record: Record) -> Option<(u32, f64)> {
    let Some(attrs) = record.attributes else {
        warn!("[HLT] Missing attributes in path rate record {:?}", record.id);
        return None;
    };
    match (
        get_u32(&attrs, "last_lumisection_number"),
        get_f64(&attrs, "counter"),
    ) {
        (Some(ls), Some(counter)) => Some((ls, counter / LS_LENGTH)),
        _ => {
            warn!("[HLT] Incomplete path rate record: {:?}", attrs);
            None
        }
    }
}
