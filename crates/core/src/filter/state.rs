//! Filter state snapshot.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use deferral_shared::types::{AccountId, AnalyticAccountId, JournalId};
use serde::{Deserialize, Serialize};

use super::date_range::{DateBound, DateRange, PeriodToken};
use super::error::FilterError;

/// Presence flag that changes which lines the data source returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportOption {
    /// Include draft entries alongside posted ones.
    Draft,
}

impl ReportOption {
    /// Wire name of the flag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
        }
    }
}

impl std::str::FromStr for ReportOption {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "draft" => Ok(Self::Draft),
            other => Err(FilterError::unknown_option(other)),
        }
    }
}

/// Recognition method forwarded to the data source. Not toggled by the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionMethod {
    /// Accrual basis.
    pub accrual: bool,
}

impl Default for RecognitionMethod {
    fn default() -> Self {
        Self { accrual: true }
    }
}

/// Every user-selectable criterion of one report session.
///
/// Builder methods consume the snapshot and return the next one.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    /// Journals restricting the query; empty means all journals.
    pub selected_journal_ids: BTreeSet<JournalId>,
    /// Analytic accounts restricting the query; empty means no restriction.
    pub selected_analytic_ids: BTreeSet<AnalyticAccountId>,
    /// Period token or explicit bounds.
    pub date_range: DateRange,
    /// Flags, modeled by presence.
    #[serde(with = "presence_map")]
    pub options: BTreeSet<ReportOption>,
    /// Recognition method in effect.
    pub method: RecognitionMethod,
    /// Accounts whose detail rows are shown (UI only, never sent).
    #[serde(skip)]
    pub expanded_accounts: BTreeSet<AccountId>,
}

impl FilterState {
    /// Creates the default state used when a report opens.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of a journal.
    #[must_use]
    pub fn with_journal_toggled(mut self, id: JournalId) -> Self {
        toggle(&mut self.selected_journal_ids, id);
        self
    }

    /// Flips membership of an analytic account.
    #[must_use]
    pub fn with_analytic_toggled(mut self, id: AnalyticAccountId) -> Self {
        toggle(&mut self.selected_analytic_ids, id);
        self
    }

    /// Replaces the date range with a named period.
    #[must_use]
    pub fn with_date_range_token(mut self, token: PeriodToken) -> Self {
        self.date_range = DateRange::with_token(token);
        self
    }

    /// Sets one explicit bound from an already parsed date.
    #[must_use]
    pub fn with_date_bound(mut self, which: DateBound, date: NaiveDate) -> Self {
        self.date_range = self.date_range.with_bound(which, date);
        self
    }

    /// Parses and sets one explicit bound.
    pub fn try_with_date_bound(self, which: DateBound, value: &str) -> Result<Self, FilterError> {
        let date = which.parse_value(value)?;
        Ok(self.with_date_bound(which, date))
    }

    /// Adds the flag if absent, removes it if present.
    #[must_use]
    pub fn with_option_toggled(mut self, option: ReportOption) -> Self {
        toggle(&mut self.options, option);
        self
    }

    /// Flips expansion of one account's detail rows.
    #[must_use]
    pub fn with_expanded_toggled(mut self, account_id: AccountId) -> Self {
        toggle(&mut self.expanded_accounts, account_id);
        self
    }

    /// Collapses every account.
    #[must_use]
    pub fn with_expanded_cleared(mut self) -> Self {
        self.expanded_accounts.clear();
        self
    }

    /// Returns true if the flag is present.
    #[must_use]
    pub fn has_option(&self, option: ReportOption) -> bool {
        self.options.contains(&option)
    }

    /// Returns true if the account's detail rows are shown.
    #[must_use]
    pub fn is_expanded(&self, account_id: AccountId) -> bool {
        self.expanded_accounts.contains(&account_id)
    }
}

fn toggle<T: Ord>(set: &mut BTreeSet<T>, value: T) {
    if !set.remove(&value) {
        set.insert(value);
    }
}

/// Serializes a flag set as `{"name": true}`; absent keys and `false`
/// values both mean the flag is off.
pub(crate) mod presence_map {
    use std::collections::{BTreeMap, BTreeSet};

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::ReportOption;

    pub fn serialize<S: Serializer>(
        options: &BTreeSet<ReportOption>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let map: BTreeMap<ReportOption, bool> = options.iter().map(|o| (*o, true)).collect();
        map.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeSet<ReportOption>, D::Error> {
        let map = Option::<BTreeMap<ReportOption, bool>>::deserialize(deserializer)?;
        Ok(map
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(option, on)| on.then_some(option))
            .collect())
    }
}
