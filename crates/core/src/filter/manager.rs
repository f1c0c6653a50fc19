//! Holder of the current filter snapshot.

use std::sync::Arc;

use deferral_shared::types::{AccountId, AnalyticAccountId, JournalId};

use super::date_range::{DateBound, PeriodToken};
use super::error::FilterError;
use super::state::{FilterState, ReportOption};

/// Owns the current [`FilterState`] and replaces it wholesale on every change.
///
/// Snapshots handed out by [`snapshot`](Self::snapshot) are never mutated, so
/// a query built from one always sees a self-consistent state.
#[derive(Debug, Clone, Default)]
pub struct FilterStateManager {
    current: Arc<FilterState>,
}

impl FilterStateManager {
    /// Creates a manager holding the default state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager holding `state`.
    #[must_use]
    pub fn with_state(state: FilterState) -> Self {
        Self {
            current: Arc::new(state),
        }
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<FilterState> {
        Arc::clone(&self.current)
    }

    /// Borrows the current state.
    #[must_use]
    pub fn current(&self) -> &FilterState {
        &self.current
    }

    /// Applies several changes as one replacement.
    ///
    /// If `change` fails the current snapshot is left untouched.
    pub fn update<F>(&mut self, change: F) -> Result<(), FilterError>
    where
        F: FnOnce(FilterState) -> Result<FilterState, FilterError>,
    {
        let next = change((*self.current).clone())?;
        self.current = Arc::new(next);
        Ok(())
    }

    fn replace<F>(&mut self, change: F)
    where
        F: FnOnce(FilterState) -> FilterState,
    {
        self.current = Arc::new(change((*self.current).clone()));
    }

    /// Flips membership of a journal.
    pub fn toggle_journal(&mut self, id: JournalId) {
        self.replace(|state| state.with_journal_toggled(id));
    }

    /// Flips membership of an analytic account.
    pub fn toggle_analytic(&mut self, id: AnalyticAccountId) {
        self.replace(|state| state.with_analytic_toggled(id));
    }

    /// Replaces the date range with a named period.
    pub fn set_date_range_token(&mut self, token: PeriodToken) {
        self.replace(|state| state.with_date_range_token(token));
    }

    /// Parses `value` and merges it into the explicit range.
    pub fn set_date_bound(&mut self, which: DateBound, value: &str) -> Result<(), FilterError> {
        self.update(|state| state.try_with_date_bound(which, value))
    }

    /// Adds the flag if absent, removes it if present.
    pub fn toggle_option(&mut self, option: ReportOption) {
        self.replace(|state| state.with_option_toggled(option));
    }

    /// Flips expansion of one account.
    pub fn toggle_expanded(&mut self, account_id: AccountId) {
        self.replace(|state| state.with_expanded_toggled(account_id));
    }

    /// Collapses every account.
    pub fn clear_expanded(&mut self) {
        if !self.current.expanded_accounts.is_empty() {
            self.replace(FilterState::with_expanded_cleared);
        }
    }
}
