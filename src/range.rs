use crate::attr::get_u32;
use crate::error::{Error, Result};
use crate::oms::{OmsApi, PAGE_LIMIT, Query};
use serde::Serialize;
use spdlog::info;
use std::ops::RangeInclusive;

/// Inclusive lumisection bounds of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LsRange {
    pub min: u32,
    pub max: u32,
}

impl LsRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn len(&self) -> usize {
        if self.max < self.min {
            0
        } else {
            (self.max - self.min) as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, ls: u32) -> bool {
        self.min <= ls && ls <= self.max
    }

    pub fn iter(&self) -> RangeInclusive<u32> {
        self.min..=self.max
    }

    /// Intersects the observed range of `run` with a requested window.
    pub fn clamp(&self, run: u32, window: LsRange) -> Result<LsRange> {
        let clamped = LsRange::new(self.min.max(window.min), self.max.min(window.max));
        if clamped.is_empty() {
            return Err(Error::EmptyWindow {
                run,
                min: window.min,
                max: window.max,
            });
        }
        Ok(clamped)
    }
}

/// Finds the smallest and largest recorded lumisection of `run`.
pub fn find_range(api: &mut impl OmsApi, run: u32) -> Result<LsRange> {
    let query = Query::new("lumisections")
        .filter_eq("run_number", run)
        .fields(&["lumisection_number"])
        .per_page(PAGE_LIMIT);

    let records = api.fetch(&query)?;
    let numbers = records
        .iter()
        .filter_map(|r| r.attributes.as_ref())
        .filter_map(|attrs| get_u32(attrs, "lumisection_number"));

    let (min, max) = numbers
        .fold(None, |acc: Option<(u32, u32)>, ls| match acc {
            None => Some((ls, ls)),
            Some((lo, hi)) => Some((lo.min(ls), hi.max(ls))),
        })
        .ok_or(Error::NoLumisections { run })?;

    info!("[Range] Run {} spans lumisections {}..={}", run, min, max);
    Ok(LsRange { min, max })
}
