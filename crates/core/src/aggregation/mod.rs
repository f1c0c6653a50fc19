//! Per-account aggregation of deferred line amounts.
//!
//! The engine is a pure function from line records to account aggregates
//! plus grand totals. Bucket splits arrive precomputed from the data source;
//! the engine only sums them.

pub mod engine;
pub mod error;
pub mod types;


pub use engine::AggregationEngine;
pub use error::AggregationError;
pub use types::*;
