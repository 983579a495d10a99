mod http;
mod memory;
mod paging;
mod secret;

use crate::attr::{AttrValue, Attributes};
use crate::error::Result;
use serde::{Deserialize, Serialize};

pub use http::{OmsClient, OmsClientOptions};
pub use memory::MemoryOms;
pub use paging::collect_pages;
pub use secret::AppSecret;

/// Largest single page the fetchers ask for.
pub const PAGE_LIMIT: usize = 10_000;
/// Page size of the multi-page fetchers.
pub const DEFAULT_PER_PAGE: usize = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ge,
    Le,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "EQ",
            FilterOp::Ge => "GE",
            FilterOp::Le => "LE",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: AttrValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub resource: String,
    pub filters: Vec<Filter>,
    pub fields: Vec<String>,
    pub sort: Option<String>,
    pub per_page: usize,
    pub max_pages: usize,
}

impl Query {
    /// A single-page query with the default page size.
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            filters: vec![],
            fields: vec![],
            sort: None,
            per_page: DEFAULT_PER_PAGE,
            max_pages: 1,
        }
    }

    pub fn filter(mut self, field: &str, op: FilterOp, value: impl Into<AttrValue>) -> Self {
        self.filters.push(Filter {
            field: field.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn filter_eq(self, field: &str, value: impl Into<AttrValue>) -> Self {
        self.filter(field, FilterOp::Eq, value)
    }

    /// Inclusive range. An open side adds no filter.
    pub fn filter_range(mut self, field: &str, min: Option<u32>, max: Option<u32>) -> Self {
        if let Some(min) = min {
            self = self.filter(field, FilterOp::Ge, min);
        }
        if let Some(max) = max {
            self = self.filter(field, FilterOp::Le, max);
        }
        self
    }

    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn sort(mut self, field: &str) -> Self {
        self.sort = Some(field.to_string());
        self
    }

    pub fn per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    pub fn max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// URL query parameters for the page starting at `offset`.
    pub fn page_params(&self, offset: usize) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|f| {
                (
                    format!("filter[{}][{}]", f.field, f.op.as_str()),
                    param_value(&f.value),
                )
            })
            .collect();
        if !self.fields.is_empty() {
            params.push((format!("fields[{}]", self.resource), self.fields.join(",")));
        }
        if let Some(sort) = &self.sort {
            params.push(("sort".to_string(), sort.clone()));
        }
        params.push(("page[offset]".to_string(), offset.to_string()));
        params.push(("page[limit]".to_string(), self.per_page.to_string()));
        params
    }
}

fn param_value(value: &AttrValue) -> String {
    match value {
        AttrValue::Null => "null".to_string(),
        AttrValue::Bool(v) => v.to_string(),
        AttrValue::Int(v) => v.to_string(),
        AttrValue::Float(v) => v.to_string(),
        AttrValue::Text(v) => v.clone(),
    }
}

/// One entry of a response's `data` array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AttrValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
}

impl Record {
    pub fn new(attributes: Attributes) -> Self {
        Self {
            id: None,
            attributes: Some(attributes),
        }
    }
}

/// Builds a record from `(field, value)` pairs.
#[macro_export]
macro_rules! record {
    ($($key:expr => $value:expr),* $(,)?) => {
        $crate::oms::Record::new(
            [$(($key.to_string(), $crate::attr::AttrValue::from($value))),*]
                .into_iter()
                .collect(),
        )
    };
}

pub trait OmsApi {
    /// Runs `query`, following pages up to its `max_pages` ceiling.
    fn fetch(&mut self, query: &Query) -> Result<Vec<Record>>;
}

impl<T: OmsApi + ?Sized> OmsApi for &mut T {
    fn fetch(&mut self, query: &Query) -> Result<Vec<Record>> {
        (**self).fetch(query)
    }
}
