//! Aggregation engine.

use std::collections::HashMap;

use chrono::NaiveDate;
use deferral_shared::types::AccountId;
use tracing::warn;

use super::error::AggregationError;
use super::types::{AccountAggregate, AggregationResult, BucketTotals, GrandTotals, LineRecord};
use crate::calendar;

/// Turns line records into per-account sums and grand totals.
pub struct AggregationEngine;

impl AggregationEngine {
    /// Aggregates `lines` by account.
    ///
    /// 1. Lines are partitioned by account; accounts appear in first-seen order
    ///    and an account without lines is absent.
    /// 2. Each account sums its lines' buckets and keeps its first-seen
    ///    currency; a conflicting currency flags the account and yields an
    ///    [`AggregationError::InconsistentCurrency`] warning.
    /// 3. Grand totals are recomputed from the account sums.
    ///
    /// Sums are never rounded here.
    #[must_use]
    pub fn aggregate(lines: &[LineRecord], as_of: NaiveDate) -> AggregationResult {
        let mut accounts: Vec<AccountAggregate> = Vec::new();
        let mut index: HashMap<AccountId, usize> = HashMap::new();
        let mut warnings = Vec::new();

        for line in lines {
            let slot = *index.entry(line.account_id).or_insert_with(|| {
                accounts.push(AccountAggregate {
                    account_id: line.account_id,
                    account_name: line.account_name.clone(),
                    currency_id: line.currency_id.clone(),
                    totals: BucketTotals::default(),
                    lines: Vec::new(),
                    currency_conflict: false,
                });
                accounts.len() - 1
            });
            let account = &mut accounts[slot];

            if line.currency_id != account.currency_id {
                let conflict = AggregationError::InconsistentCurrency {
                    account_id: account.account_id,
                    expected: account.currency_id.clone(),
                    found: line.currency_id.clone(),
                };
                if !warnings.contains(&conflict) {
                    warn!(
                        account_id = %account.account_id,
                        expected = %account.currency_id,
                        found = %line.currency_id,
                        "Inconsistent currency within account"
                    );
                    warnings.push(conflict);
                }
                account.currency_conflict = true;
            }

            account.totals.add_line(line);
            account.lines.push(line.clone());
        }

        let grand_totals = GrandTotals::from_accounts(&accounts);

        AggregationResult {
            as_of,
            current_period: calendar::quarter_bounds(as_of),
            accounts,
            grand_totals,
            warnings,
        }
    }
}
