//! Aggregation error types.

use deferral_shared::types::{AccountId, CurrencyCode};
use thiserror::Error;

/// Data-source defects detected while aggregating.
///
/// None of these halt aggregation; they are reported alongside the result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregationError {
    /// Lines of one account disagree on currency.
    #[error("Inconsistent currency for account {account_id}: expected {expected}, found {found}")]
    InconsistentCurrency {
        /// Affected account.
        account_id: AccountId,
        /// First-seen currency, under which the account is reported.
        expected: CurrencyCode,
        /// Conflicting currency.
        found: CurrencyCode,
    },
}
