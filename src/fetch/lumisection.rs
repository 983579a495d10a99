use super::DETAIL_MAX_PAGES;
use crate::attr::{AttrValue, Attributes, get_u32};
use crate::error::{Error, Result};
use crate::oms::{OmsApi, Query};
use crate::range::LsRange;
use chrono::{NaiveDateTime, Timelike};
use fxhash::FxHashMap;
use spdlog::{debug, warn};

const START_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parses an OMS `start_time` (`YYYY-MM-DDTHH:MM:SSZ`, UTC) into Unix seconds.
///
/// Only that exact shape is accepted: no fractional seconds, no offsets, no
/// space separator.
pub fn parse_start_time(value: &str) -> Result<i64> {
    let malformed = || Error::Timestamp {
        value: value.to_string(),
    };

    let bytes = value.as_bytes();
    let shape_ok = bytes.len() == 20
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            10 => *b == b'T',
            13 | 16 => *b == b':',
            19 => *b == b'Z',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return Err(malformed());
    }

    let dt = NaiveDateTime::parse_from_str(value, START_TIME_FORMAT).map_err(|_| malformed())?;
    // chrono reads second 60 as a leap second folded onto :59.
    if dt.nanosecond() >= 1_000_000_000 {
        return Err(malformed());
    }
    Ok(dt.and_utc().timestamp())
}

/// Full attribute set of every lumisection in `range`, each with an added
/// `time` field holding the start time in Unix seconds.
pub fn fetch_lumisection_details(
    api: &mut impl OmsApi,
    run: u32,
    range: LsRange,
) -> Result<FxHashMap<u32, Attributes>> {
    let query = Query::new("lumisections")
        .fields(&[
            "delivered_lumi_per_lumisection",
            "run_number",
            "lumisection_number",
            "start_time",
            "pileup",
        ])
        .filter_eq("run_number", run)
        .filter_range("lumisection_number", Some(range.min), Some(range.max))
        .max_pages(DETAIL_MAX_PAGES);

    let mut details = FxHashMap::default();
    for record in api.fetch(&query)? {
        let Some(mut attrs) = record.attributes else {
            warn!("[Lumi] Missing attributes in lumisection record {:?}", record.id);
            continue;
        };
        let Some(ls) = get_u32(&attrs, "lumisection_number") else {
            warn!("[Lumi] Missing lumisection_number in lumisection data: {:?}", attrs);
            continue;
        };

        let time = match attrs.get("start_time") {
            Some(AttrValue::Text(start)) => parse_start_time(start)?,
            other => {
                return Err(Error::Timestamp {
                    value: format!("{:?}", other),
                });
            }
        };
        attrs.insert("time".to_string(), AttrValue::Int(time));
        details.insert(ls, attrs);
    }

    debug!("[Lumi] Run {}: {} lumisections", run, details.len());
    Ok(details)
}
