mod dedup_by;
mod filter;
mod inspect;
mod progress;

pub use dedup_by::dedup_by;
pub use filter::filter;
pub use inspect::inspect;
pub use progress::{Progress, progress};
