//! Drill-down from an account row to its journal items.

use deferral_shared::types::AccountId;
use serde::Serialize;

use crate::domain::{Domain, DomainClause, DomainValue, Operator};
use crate::source::ReportKind;

/// Model of the journal item list view.
pub const JOURNAL_ITEM_MODEL: &str = "account.move.line";

/// View opened by an action: `(view id, view type)`; `None` serializes as
/// `false`, i.e. the default view of that type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewRef {
    /// Specific view, if any.
    pub id: Option<i64>,
    /// View type, e.g. `list`.
    pub kind: &'static str,
}

impl Serialize for ViewRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeTuple;

        let mut tuple = serializer.serialize_tuple(2)?;
        match self.id {
            Some(id) => tuple.serialize_element(&id)?,
            None => tuple.serialize_element(&false)?,
        }
        tuple.serialize_element(self.kind)?;
        tuple.end()
    }
}

/// Context flags of the journal items list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JournalItemsContext {
    /// Group rows by journal entry.
    pub search_default_group_by_move: bool,
    /// Expand the groups.
    pub expand: bool,
}

/// Window action opening the journal items of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalItemsAction {
    /// Action type.
    #[serde(rename = "type")]
    pub action_type: &'static str,
    /// Window title.
    pub name: &'static str,
    /// Listed model.
    pub res_model: &'static str,
    /// Views in order.
    pub views: Vec<ViewRef>,
    /// Lines shown.
    pub domain: Domain,
    /// List context.
    pub context: JournalItemsContext,
    /// Where the view opens.
    pub target: &'static str,
}

/// Builds the action listing the posted deferred lines of `account_id`.
#[must_use]
pub fn journal_items_action(kind: ReportKind, account_id: AccountId) -> JournalItemsAction {
    JournalItemsAction {
        action_type: "ir.actions.act_window",
        name: "Journal Items",
        res_model: JOURNAL_ITEM_MODEL,
        views: vec![
            ViewRef {
                id: None,
                kind: "list",
            },
            ViewRef {
                id: None,
                kind: "form",
            },
        ],
        domain: journal_items_domain(kind, account_id),
        context: JournalItemsContext {
            search_default_group_by_move: true,
            expand: true,
        },
        target: "current",
    }
}

/// Domain of [`journal_items_action`].
#[must_use]
pub fn journal_items_domain(kind: ReportKind, account_id: AccountId) -> Domain {
    vec![
        DomainClause::new("account_id", Operator::Eq, DomainValue::Int(account_id.into_inner())),
        DomainClause::is_set("deferred_start_date"),
        DomainClause::is_set("deferred_end_date"),
        DomainClause::new("parent_state", Operator::Eq, DomainValue::Text("posted".into())),
        DomainClause::new(
            "move_id.move_type",
            Operator::In,
            DomainValue::texts(kind.move_types()),
        ),
        DomainClause::new(
            "account_id.account_type",
            Operator::In,
            DomainValue::texts(kind.account_types()),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_expense_action_shape() {
        let action = journal_items_action(ReportKind::Expense, AccountId::new(42));

        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({
                "type": "ir.actions.act_window",
                "name": "Journal Items",
                "res_model": "account.move.line",
                "views": [[false, "list"], [false, "form"]],
                "domain": [
                    ["account_id", "=", 42],
                    ["deferred_start_date", "!=", false],
                    ["deferred_end_date", "!=", false],
                    ["parent_state", "=", "posted"],
                    ["move_id.move_type", "in", ["in_invoice", "in_refund"]],
                    [
                        "account_id.account_type",
                        "in",
                        ["expense", "expense_depreciation", "expense_direct_cost"]
                    ]
                ],
                "context": {"search_default_group_by_move": true, "expand": true},
                "target": "current"
            })
        );
    }

    #[test]
    fn test_revenue_domain_uses_customer_documents() {
        let domain = journal_items_domain(ReportKind::Revenue, AccountId::new(7));
        assert_eq!(
            serde_json::to_value(&domain[4..]).unwrap(),
            json!([
                ["move_id.move_type", "in", ["out_invoice", "out_refund"]],
                ["account_id.account_type", "in", ["income", "income_other"]]
            ])
        );
    }
}
