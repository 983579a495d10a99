use crate::attr::{AttrValue, Attributes};
use crate::fetch::StreamRow;
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `file_size` is reported in GB.
pub const GB_TO_BYTES: f64 = 1e9;
/// `bandwidth` is reported in MB/s.
pub const MBPS_TO_BITS: f64 = 1e6;

/// One joined row: stream numbers, lumisection details, deadtime and HLT rate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateRecord(pub Attributes);

impl AggregateRecord {
    pub fn ls(&self) -> Option<u32> {
        self.0.get("LS").and_then(AttrValue::as_u32)
    }

    pub fn get(&self, key: &str) -> Option<&AttrValue> {
        self.0.get(key)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(AttrValue::as_f64)
    }
}

/// Stream name to its records, ascending by lumisection.
pub type RunStreams = BTreeMap<String, Vec<AggregateRecord>>;
/// Run number to its streams.
pub type StreamDataset = BTreeMap<u32, RunStreams>;

/// Per-lumisection lookups of one run.
#[derive(Debug, Clone, Copy)]
pub struct LumisectionData<'a> {
    pub details: &'a FxHashMap<u32, Attributes>,
    pub deadtime: &'a FxHashMap<u32, f64>,
    pub hlt_rates: &'a FxHashMap<u32, f64>,
}

pub fn hlt_rate_key(path: &str) -> String {
    format!("hlt_rate_{}", path)
}

/// Joins `rows` with `lumi`, grouping by stream and keeping row order.
///
/// A lumisection missing from a mapping contributes no detail keys, and 0.0
/// for deadtime and rate.
pub fn join_streams(
    rows: impl IntoIterator<Item = StreamRow>,
    lumi: LumisectionData<'_>,
    hlt_path: &str,
) -> RunStreams {
    let hlt_key = hlt_rate_key(hlt_path);
    let mut streams = RunStreams::new();
    for row in rows {
        let stream_name = row.stream_name.clone();
        let record = aggregate(row, lumi, &hlt_key);
        streams.entry(stream_name).or_default().push(record);
    }
    streams
}

fn aggregate(row: StreamRow, lumi: LumisectionData<'_>, hlt_key: &str) -> AggregateRecord {
    let ls = row.ls;
    let mut attrs = Attributes::new();
    attrs.insert("LS".to_string(), AttrValue::from(ls));
    attrs.insert("rate".to_string(), row.rate);
    attrs.insert("size".to_string(), scale(&row.file_size, GB_TO_BYTES));
    attrs.insert("bandwidth".to_string(), scale(&row.bandwidth, MBPS_TO_BITS));

    // Detail attributes win over stream fields on a name clash.
    if let Some(details) = lumi.details.get(&ls) {
        attrs.extend(details.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    let deadtime = lumi.deadtime.get(&ls).copied().unwrap_or(0.0);
    let hlt_rate = lumi.hlt_rates.get(&ls).copied().unwrap_or(0.0);
    attrs.insert("deadtime".to_string(), AttrValue::Float(deadtime));
    attrs.insert(hlt_key.to_string(), AttrValue::Float(hlt_rate));
    AggregateRecord(attrs)
}

fn scale(value: &AttrValue, factor: f64) -> AttrValue {
    value
        .as_f64()
        .map(|v| AttrValue::Float(v * factor))
        .unwrap_or(AttrValue::Null)
}
