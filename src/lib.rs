pub mod attr;
pub mod collector;
pub mod config;
pub mod error;
pub mod evolution;
pub mod export;
pub mod fetch;
pub mod join;
pub mod measure;
pub mod oms;
mod pipe;
pub mod range;
pub mod runs;
mod stage;

pub use crate::collector::{BatchOutcome, CollectorOptions, StreamInfoCollector};
pub use crate::error::{Error, Result};
pub use crate::join::{AggregateRecord, StreamDataset};
pub use crate::oms::{MemoryOms, OmsApi, OmsClient, Query, Record};
pub use crate::pipe::*;
pub use crate::stage::{OutputCollector, Pipeline, Stage, StageExt};
