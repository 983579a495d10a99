use super::STREAM_PAGE_SIZE;
use crate::attr::{AttrValue, Attributes, get_u32};
use crate::error::Result;
use crate::oms::{DEFAULT_PER_PAGE, OmsApi, PAGE_LIMIT, Query, Record};
use crate::progress;
use crate::range::LsRange;
use crate::stage::Stage;
use spdlog::{debug, warn};

const STREAM_FIELDS: [&str; 5] = [
    "last_lumisection_number",
    "rate",
    "file_size",
    "bandwidth",
    "stream_name",
];

/// How stream rows are pulled for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StreamFetchMode {
    /// One single-page query per lumisection.
    #[default]
    PerLumisection,
    /// One paged query over the whole range, sorted by lumisection.
    Ranged,
}

/// One output stream's numbers in one lumisection, in OMS units.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamRow {
    pub stream_name: String,
    pub ls: u32,
    /// Hz
    pub rate: AttrValue,
    /// GB
    pub file_size: AttrValue,
    /// MB/s
    pub bandwidth: AttrValue,
}

impl StreamRow {
    pub fn from_attributes(attrs: &Attributes) -> Option<Self> {
        let stream_name = attrs.get("stream_name")?.as_str()?.to_string();
        let ls = get_u32(attrs, "last_lumisection_number")?;
        let field = |key: &str| attrs.get(key).cloned().unwrap_or(AttrValue::Null);
        Some(Self {
            stream_name,
            ls,
            rate: field("rate"),
            file_size: field("file_size"),
            bandwidth: field("bandwidth"),
        })
    }
}

/// Stream rows of `run` inside `range`, ascending by lumisection.
///
/// Lumisections without any stream row produce nothing.
pub fn fetch_stream_rows(
    api: &mut impl OmsApi,
    run: u32,
    range: LsRange,
    mode: StreamFetchMode,
) -> Result<Vec<StreamRow>> {
    let rows = match mode {
        StreamFetchMode::PerLumisection => fetch_per_lumisection(api, run, range)?,
        StreamFetchMode::Ranged => fetch_ranged(api, run, range)?,
    };
    debug!("[Streams] Run {}: {} stream rows", run, rows.len());
    Ok(rows)
}

fn fetch_per_lumisection(api: &mut impl OmsApi, run: u32, range: LsRange) -> Result<Vec<StreamRow>> {
    let mut progress = progress::<u32>(format!("Streams/{}", run), "LS", 100);
    let mut rows = Vec::new();

    for ls in range.iter() {
        progress.process(ls, &mut |_: u32| {});

        let records = api.fetch(&lumisection_query(run, ls))?;
        if records.len() >= STREAM_PAGE_SIZE {
            warn!(
                "[Streams] Run {} LS {}: page of {} rows is full, further streams are not fetched; use the ranged mode",
                run, ls, STREAM_PAGE_SIZE
            );
        }
        rows.extend(records.into_iter().filter_map(stream_row));
    }
    Ok(rows)
}

fn lumisection_query(run: u32, ls: u32) -> Query {
    Query::new("streams")
        .per_page(STREAM_PAGE_SIZE)
        .filter_eq("run_number", run)
        .filter_eq("last_lumisection_number", ls)
        .fields(&STREAM_FIELDS)
}

fn fetch_ranged(api: &mut impl OmsApi, run: u32, range: LsRange) -> Result<Vec<StreamRow>> {
    let query = Query::new("streams")
        .filter_eq("run_number", run)
        .filter_range("last_lumisection_number", Some(range.min), Some(range.max))
        .fields(&STREAM_FIELDS)
        .sort("last_lumisection_number")
        .per_page(DEFAULT_PER_PAGE)
        .max_pages(PAGE_LIMIT);

    let mut rows: Vec<StreamRow> = api.fetch(&query)?.into_iter().filter_map(stream_row).collect();
    rows.sort_by_key(|row| row.ls);
    Ok(rows)
}

fn stream_row(record: Record) -> Option<StreamRow> {
    let Some(attrs) = record.attributes else {
        warn!("[Streams] Missing attributes in stream record {:?}", record.id);
        return None;
    };
    let row = StreamRow::from_attributes(&attrs);
    if row.is_none() {
        warn!("[Streams] Missing stream_name or last_lumisection_number: {:?}", attrs);
    }
    row
}
