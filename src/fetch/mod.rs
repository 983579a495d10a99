mod deadtime;
mod hlt_rate;
mod lumisection;
mod stream;

pub use deadtime::{deadtime, fetch_deadtime};
pub use hlt_rate::{HLT_PATH, LS_LENGTH, fetch_hlt_rates};
pub use lumisection::{fetch_lumisection_details, parse_start_time};
pub use stream::{StreamFetchMode, StreamRow, fetch_stream_rows};

/// Page ceiling of the deadtime fetcher.
pub const DEADTIME_MAX_PAGES: usize = 1_000;
/// Page ceiling of the lumisection detail fetcher.
pub const DETAIL_MAX_PAGES: usize = 5_000;
/// Page size of a single-lumisection stream query.
pub const STREAM_PAGE_SIZE: usize = 100;
