//! Tests for filter state.

use chrono::NaiveDate;
use deferral_shared::types::{AccountId, AnalyticAccountId, JournalId};
use proptest::prelude::*;
use rstest::rstest;

use super::*;
use crate::calendar::DateInterval;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

proptest! {
    /// Toggling the same journal twice restores the original membership.
    #[test]
    fn prop_double_toggle_journal_is_identity(
        initial in proptest::collection::btree_set(0i64..50, 0..10),
        id in 0i64..50,
    ) {
        let state = FilterState {
            selected_journal_ids: initial.iter().copied().map(JournalId::new).collect(),
            ..FilterState::default()
        };

        let once = state.clone().with_journal_toggled(JournalId::new(id));
        prop_assert_ne!(
            once.selected_journal_ids.contains(&JournalId::new(id)),
            state.selected_journal_ids.contains(&JournalId::new(id))
        );

        let twice = once.with_journal_toggled(JournalId::new(id));
        prop_assert_eq!(twice, state);
    }

    /// Analytic toggles never touch the journal selection.
    #[test]
    fn prop_analytic_toggle_independent_of_journals(
        journals in proptest::collection::btree_set(0i64..20, 0..5),
        ids in proptest::collection::vec(0i64..20, 0..12),
    ) {
        let mut manager = FilterStateManager::with_state(FilterState {
            selected_journal_ids: journals.iter().copied().map(JournalId::new).collect(),
            ..FilterState::default()
        });
        for id in &ids {
            manager.toggle_analytic(AnalyticAccountId::new(*id));
        }
        let expected: std::collections::BTreeSet<_> =
            journals.iter().copied().map(JournalId::new).collect();
        prop_assert_eq!(&manager.current().selected_journal_ids, &expected);
    }
}

#[test]
fn test_default_state() {
    let state = FilterState::new();
    assert!(state.selected_journal_ids.is_empty());
    assert!(state.selected_analytic_ids.is_empty());
    assert_eq!(state.date_range, DateRange::Unset);
    assert!(state.options.is_empty());
    assert!(state.method.accrual);
    assert!(state.expanded_accounts.is_empty());
}

#[test]
fn test_toggle_journal_on_then_off_leaves_empty_set() {
    let mut manager = FilterStateManager::new();
    manager.toggle_journal(JournalId::new(7));
    assert!(manager.current().selected_journal_ids.contains(&JournalId::new(7)));
    manager.toggle_journal(JournalId::new(7));
    assert!(manager.current().selected_journal_ids.is_empty());
}

#[test]
fn test_start_date_after_token_clears_token_and_leaves_end_unset() {
    let mut manager = FilterStateManager::new();
    manager.set_date_range_token(PeriodToken::Quarter);
    manager.set_date_bound(DateBound::Start, "2026-01-15").unwrap();

    let range = manager.current().date_range;
    assert_eq!(range.token(), None);
    assert_eq!(
        range.explicit(),
        Some(&ExplicitRange {
            start_date: Some(d(2026, 1, 15)),
            end_date: None,
        })
    );

    manager.set_date_bound(DateBound::End, "2026-03-31").unwrap();
    assert_eq!(
        manager.current().date_range,
        DateRange::Explicit(ExplicitRange::between(d(2026, 1, 15), d(2026, 3, 31)))
    );
}

#[test]
fn test_setting_token_drops_explicit_bounds() {
    let mut manager = FilterStateManager::new();
    manager.set_date_bound(DateBound::End, "2026-06-30").unwrap();
    manager.set_date_range_token(PeriodToken::LastYear);
    assert_eq!(
        manager.current().date_range,
        DateRange::Period(PeriodToken::LastYear)
    );
}

#[test]
fn test_setting_bound_preserves_other_bound() {
    let state = FilterState::new()
        .with_date_bound(DateBound::End, d(2026, 12, 31))
        .with_date_bound(DateBound::Start, d(2026, 1, 1));
    assert_eq!(
        state.date_range,
        DateRange::Explicit(ExplicitRange::between(d(2026, 1, 1), d(2026, 12, 31)))
    );
}

#[rstest]
#[case("")]
#[case("2026-13-01")]
#[case("15/01/2026")]
#[case("yesterday")]
fn test_unparseable_date_bound_is_invalid_input(#[case] value: &str) {
    let mut manager = FilterStateManager::new();
    manager.set_date_range_token(PeriodToken::Month);
    let before = manager.snapshot();

    let err = manager.set_date_bound(DateBound::Start, value).unwrap_err();
    assert!(matches!(err, FilterError::InvalidInput { field: "start_date", .. }));
    assert_eq!(*manager.snapshot(), *before);
}

#[test]
fn test_toggle_option_models_presence() {
    let mut manager = FilterStateManager::new();
    manager.toggle_option(ReportOption::Draft);
    assert!(manager.current().has_option(ReportOption::Draft));
    manager.toggle_option(ReportOption::Draft);
    assert!(!manager.current().has_option(ReportOption::Draft));
    assert!(manager.current().options.is_empty());
}

#[test]
fn test_failed_batch_leaves_snapshot_untouched() {
    let mut manager = FilterStateManager::new();
    manager.toggle_journal(JournalId::new(1));
    let before = manager.snapshot();

    let result = manager.update(|state| {
        state
            .with_journal_toggled(JournalId::new(2))
            .try_with_date_bound(DateBound::End, "not-a-date")
    });

    assert!(result.is_err());
    assert_eq!(*manager.snapshot(), *before);
}

#[test]
fn test_snapshots_are_not_mutated_by_later_changes() {
    let mut manager = FilterStateManager::new();
    let first = manager.snapshot();
    manager.toggle_journal(JournalId::new(3));
    assert!(first.selected_journal_ids.is_empty());
    assert_eq!(manager.current().selected_journal_ids.len(), 1);
}

#[test]
fn test_expanded_accounts_toggle_and_clear() {
    let mut manager = FilterStateManager::new();
    manager.toggle_expanded(AccountId::new(10));
    manager.toggle_expanded(AccountId::new(11));
    assert!(manager.current().is_expanded(AccountId::new(10)));
    manager.clear_expanded();
    assert!(manager.current().expanded_accounts.is_empty());
}

#[rstest]
#[case(PeriodToken::Month, d(2026, 10, 1), d(2026, 10, 18))]
#[case(PeriodToken::Quarter, d(2026, 10, 1), d(2026, 12, 31))]
#[case(PeriodToken::Year, d(2026, 1, 1), d(2026, 10, 18))]
#[case(PeriodToken::LastMonth, d(2026, 9, 1), d(2026, 9, 30))]
#[case(PeriodToken::LastQuarter, d(2026, 7, 1), d(2026, 9, 30))]
#[case(PeriodToken::LastYear, d(2025, 1, 1), d(2025, 12, 31))]
fn test_period_token_resolution(
    #[case] token: PeriodToken,
    #[case] start: NaiveDate,
    #[case] end: NaiveDate,
) {
    assert_eq!(token.resolve(d(2026, 10, 18)), DateInterval::new(start, end));
}

#[test]
fn test_last_month_in_january_wraps_year() {
    assert_eq!(
        PeriodToken::LastMonth.resolve(d(2026, 1, 10)),
        DateInterval::new(d(2025, 12, 1), d(2025, 12, 31))
    );
    assert_eq!(
        PeriodToken::LastQuarter.resolve(d(2026, 2, 10)),
        DateInterval::new(d(2025, 10, 1), d(2025, 12, 31))
    );
}

#[test]
fn test_period_token_parse() {
    assert_eq!("last-quarter".parse::<PeriodToken>().unwrap(), PeriodToken::LastQuarter);
    assert!("fortnight".parse::<PeriodToken>().is_err());
    for token in PeriodToken::ALL {
        assert_eq!(token.as_str().parse::<PeriodToken>().unwrap(), token);
    }
}

#[test]
fn test_wire_format_of_state() {
    let state = FilterState::new()
        .with_journal_toggled(JournalId::new(4))
        .with_option_toggled(ReportOption::Draft)
        .with_date_range_token(PeriodToken::LastMonth)
        .with_expanded_toggled(AccountId::new(1));

    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json["selected_journal_ids"], serde_json::json!([4]));
    assert_eq!(json["date_range"], serde_json::json!("last-month"));
    assert_eq!(json["options"], serde_json::json!({"draft": true}));
    assert_eq!(json["method"], serde_json::json!({"accrual": true}));
    assert!(json.get("expanded_accounts").is_none());
}

#[test]
fn test_date_range_wire_variants() {
    let unset: DateRange = serde_json::from_str("null").unwrap();
    assert_eq!(unset, DateRange::Unset);

    let partial: DateRange = serde_json::from_str(r#"{"end_date":"2026-03-31"}"#).unwrap();
    assert_eq!(
        partial,
        DateRange::Explicit(ExplicitRange {
            start_date: None,
            end_date: Some(d(2026, 3, 31)),
        })
    );
    assert_eq!(
        serde_json::to_string(&partial).unwrap(),
        r#"{"end_date":"2026-03-31"}"#
    );
}

#[test]
fn test_options_false_value_means_absent() {
    let state: FilterState = serde_json::from_str(r#"{"options":{"draft":false}}"#).unwrap();
    assert!(state.options.is_empty());
}
