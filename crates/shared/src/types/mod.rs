//! Common types used across the application.

pub mod id;
pub mod money;

pub use id::*;
pub use money::{CurrencyCode, DISPLAY_DECIMALS, format_amount, round_for_display};
