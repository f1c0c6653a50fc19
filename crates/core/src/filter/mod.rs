//! Report filter state.
//!
//! The filter state is an immutable snapshot of every user-selectable
//! criterion. Mutations build a new snapshot; the [`FilterStateManager`]
//! swaps it in atomically so readers never observe a half-applied change.

pub mod date_range;
pub mod error;
pub mod manager;
pub mod state;

#[cfg(test)]
mod tests;

pub use date_range::{DateBound, DateRange, ExplicitRange, PeriodToken};
pub use error::FilterError;
pub use manager::FilterStateManager;
pub use state::{FilterState, RecognitionMethod, ReportOption};
