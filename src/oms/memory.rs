use super::{Filter, FilterOp, OmsApi, Query, Record, collect_pages};
use crate::attr::{AttrValue, Attributes};
use crate::error::Result;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// An [`OmsApi`] over a fixed set of records per resource.
///
/// Filters, field projection, sorting and paging behave like the upstream
/// API. Rows without an attribute object pass every filter untouched, so
/// malformed upstream rows can be replayed as they were received.
#[derive(Debug, Default)]
pub struct MemoryOms {
    resources: BTreeMap<String, Vec<Record>>,
    queries: Vec<Query>,
}

impl MemoryOms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, resource: &str, records: impl IntoIterator<Item = Record>) {
        self.resources
            .entry(resource.to_string())
            .or_default()
            .extend(records);
    }

    pub fn with(mut self, resource: &str, records: impl IntoIterator<Item = Record>) -> Self {
        self.insert(resource, records);
        self
    }

    /// Every query received so far, in order.
    pub fn queries(&self) -> &[Query] {
        &self.queries
    }

    /// Number of queries received for `resource`.
    pub fn queries_for(&self, resource: &str) -> usize {
        self.queries.iter().filter(|q| q.resource == resource).count()
    }

    fn select(&self, query: &Query) -> Vec<Record> {
        let mut rows: Vec<Record> = self
            .resources
            .get(&query.resource)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| matches_all(r, &query.filters))
                    .map(|r| project(r, &query.fields))
                    .collect()
            })
            .unwrap_or_default();

        if let Some(field) = &query.sort {
            rows.sort_by(|a, b| compare_by(a, b, field));
        }
        rows
    }
}

impl OmsApi for MemoryOms {
    fn fetch(&mut self, query: &Query) -> Result<Vec<Record>> {
        self.queries.push(query.clone());
        let rows = self.select(query);
        collect_pages(query, |offset| {
            Ok(rows
                .iter()
                .skip(offset)
                .take(query.per_page)
                .cloned()
                .collect())
        })
    }
}

fn matches_all(record: &Record, filters: &[Filter]) -> bool {
    let Some(attrs) = &record.attributes else {
        return true;
    };
    filters.iter().all(|f| matches(attrs, f))
}

fn matches(attrs: &Attributes, filter: &Filter) -> bool {
    let Some(value) = attrs.get(&filter.field) else {
        return false;
    };
    match (compare(value, &filter.value), filter.op) {
        (Some(Ordering::Equal), FilterOp::Eq) => true,
        (Some(Ordering::Greater | Ordering::Equal), FilterOp::Ge) => true,
        (Some(Ordering::Less | Ordering::Equal), FilterOp::Le) => true,
        _ => false,
    }
}

fn compare(a: &AttrValue, b: &AttrValue) -> Option<Ordering> {
    match (a, b) {
        (AttrValue::Text(a), AttrValue::Text(b)) => Some(a.cmp(b)),
        (AttrValue::Bool(a), AttrValue::Bool(b)) => Some(a.cmp(b)),
        _ => a.as_f64()?.partial_cmp(&b.as_f64()?),
    }
}

fn compare_by(a: &Record, b: &Record, field: &str) -> Ordering {
    let key = |r: &Record| r.attributes.as_ref().and_then(|attrs| attrs.get(field).cloned());
    match (key(a), key(b)) {
        (Some(x), Some(y)) => compare(&x, &y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn project(record: &Record, fields: &[String]) -> Record {
    if fields.is_empty() {
        return record.clone();
    }
    Record {
        id: record.id.clone(),
        attributes: record.attributes.as_ref().map(|attrs| {
            attrs
                .iter()
                .filter(|(k, _)| fields.contains(*k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        }),
    }
}
