//! Aggregation data types.

use chrono::NaiveDate;
use deferral_shared::types::{AccountId, CurrencyCode, JournalId, MoveId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::AggregationError;
use crate::calendar::DateInterval;

/// Time window a deferred amount falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// Full deferred amount.
    Total,
    /// Recognition has not started yet.
    NotStarted,
    /// Recognizable before the current period.
    Before,
    /// Recognizable in the current period.
    Current,
    /// Recognizable after the current period.
    Later,
}

impl Bucket {
    /// Every bucket, in column order.
    pub const ALL: [Self; 5] = [
        Self::Total,
        Self::NotStarted,
        Self::Before,
        Self::Current,
        Self::Later,
    ];
}

/// Optional descriptive fields of a line, used by detail rows and exports.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LineDetail {
    /// Journal entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_id: Option<MoveId>,
    /// Journal entry reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_name: Option<String>,
    /// Line label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Accounting date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Partner display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_name: Option<String>,
    /// Journal of the entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub journal_id: Option<JournalId>,
    /// First day of recognition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deferred_start_date: Option<NaiveDate>,
    /// Last day of recognition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deferred_end_date: Option<NaiveDate>,
}

/// One deferred journal line as delivered by the data source.
///
/// The bucket amounts are already split; the engine never re-derives them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecord {
    /// Expense (or income) account.
    pub account_id: AccountId,
    /// Account display name.
    pub account_name: String,
    /// Currency of every amount on the line.
    pub currency_id: CurrencyCode,
    /// Full deferred amount.
    pub amount_total: Decimal,
    /// Share before the current period.
    pub amount_before: Decimal,
    /// Share in the current period.
    pub amount_current: Decimal,
    /// Share of lines whose recognition has not started.
    pub amount_not_started: Decimal,
    /// Share after the current period.
    pub amount_later: Decimal,
    /// Already expensed portion.
    #[serde(default)]
    pub amount_recognized: Decimal,
    /// Portion still to be expensed.
    #[serde(default)]
    pub amount_remaining: Decimal,
    /// Descriptive fields.
    #[serde(flatten)]
    pub detail: LineDetail,
}

impl LineRecord {
    /// Returns the line's amount for `bucket`.
    #[must_use]
    pub const fn amount(&self, bucket: Bucket) -> Decimal {
        match bucket {
            Bucket::Total => self.amount_total,
            Bucket::NotStarted => self.amount_not_started,
            Bucket::Before => self.amount_before,
            Bucket::Current => self.amount_current,
            Bucket::Later => self.amount_later,
        }
    }
}

/// Unrounded sums of every bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BucketTotals {
    /// Full deferred amount.
    pub total: Decimal,
    /// Not yet started.
    pub not_started: Decimal,
    /// Before the current period.
    pub before: Decimal,
    /// Current period.
    pub current: Decimal,
    /// After the current period.
    pub later: Decimal,
    /// Already recognized.
    pub recognized: Decimal,
    /// Still to recognize.
    pub remaining: Decimal,
}

impl BucketTotals {
    /// Adds one line's amounts.
    pub fn add_line(&mut self, line: &LineRecord) {
        self.total += line.amount_total;
        self.not_started += line.amount_not_started;
        self.before += line.amount_before;
        self.current += line.amount_current;
        self.later += line.amount_later;
        self.recognized += line.amount_recognized;
        self.remaining += line.amount_remaining;
    }

    /// Adds another set of totals.
    pub fn add(&mut self, other: &Self) {
        self.total += other.total;
        self.not_started += other.not_started;
        self.before += other.before;
        self.current += other.current;
        self.later += other.later;
        self.recognized += other.recognized;
        self.remaining += other.remaining;
    }

    /// Returns the sum for `bucket`.
    #[must_use]
    pub const fn get(&self, bucket: Bucket) -> Decimal {
        match bucket {
            Bucket::Total => self.total,
            Bucket::NotStarted => self.not_started,
            Bucket::Before => self.before,
            Bucket::Current => self.current,
            Bucket::Later => self.later,
        }
    }
}

/// Sums for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountAggregate {
    /// Account.
    pub account_id: AccountId,
    /// Account display name.
    pub account_name: String,
    /// First-seen currency of the account's lines.
    pub currency_id: CurrencyCode,
    /// Bucket sums.
    #[serde(flatten)]
    pub totals: BucketTotals,
    /// Contributing lines, in input order.
    pub lines: Vec<LineRecord>,
    /// Set when the account's lines disagree on currency.
    pub currency_conflict: bool,
}

/// Bucket sums across every account, recomputed on each aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GrandTotals {
    /// Report currency (first account's currency); `None` when empty.
    pub currency_id: Option<CurrencyCode>,
    /// Bucket sums.
    #[serde(flatten)]
    pub totals: BucketTotals,
}

impl GrandTotals {
    /// Computes grand totals from scratch.
    #[must_use]
    pub fn from_accounts(accounts: &[AccountAggregate]) -> Self {
        let mut totals = BucketTotals::default();
        for account in accounts {
            totals.add(&account.totals);
        }
        Self {
            currency_id: accounts.first().map(|a| a.currency_id.clone()),
            totals,
        }
    }
}

/// Output of one aggregation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregationResult {
    /// Reference date the buckets were split against.
    pub as_of: NaiveDate,
    /// Period treated as "current" (the quarter containing `as_of`).
    pub current_period: DateInterval,
    /// Accounts in first-seen order.
    pub accounts: Vec<AccountAggregate>,
    /// Grand totals.
    pub grand_totals: GrandTotals,
    /// Non-fatal data defects.
    #[serde(skip)]
    pub warnings: Vec<AggregationError>,
}

impl AggregationResult {
    /// Returns true if no account has lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Looks up one account.
    #[must_use]
    pub fn account(&self, account_id: AccountId) -> Option<&AccountAggregate> {
        self.accounts.iter().find(|a| a.account_id == account_id)
    }
}
