//! Search domains understood by the ledger's list views and query layer.
//!
//! A domain is a conjunction of `(field, operator, value)` clauses, each
//! serialized as a three-element JSON array. Field names and operators are a
//! compatibility contract with the consuming views.

use chrono::NaiveDate;
use serde::ser::SerializeTuple;
use serde::{Serialize, Serializer};

/// Comparison operator of a clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>=`
    Ge,
    /// `<=`
    Le,
    /// `in`
    In,
}

impl Operator {
    /// Wire symbol.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::In => "in",
        }
    }
}

/// Right-hand side of a clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DomainValue {
    /// Boolean literal (`false` doubles as "not set").
    Bool(bool),
    /// Integer id.
    Int(i64),
    /// String literal.
    Text(String),
    /// Calendar date, serialized `YYYY-MM-DD`.
    Date(NaiveDate),
    /// List of integer ids.
    Ints(Vec<i64>),
    /// List of string literals.
    Texts(Vec<String>),
}

impl DomainValue {
    /// Builds a string list from static names.
    #[must_use]
    pub fn texts(values: &[&str]) -> Self {
        Self::Texts(values.iter().map(|v| (*v).to_string()).collect())
    }
}

/// One `(field, operator, value)` condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainClause {
    /// Dotted field path.
    pub field: String,
    /// Operator.
    pub operator: Operator,
    /// Value compared against.
    pub value: DomainValue,
}

impl DomainClause {
    /// Creates a clause.
    #[must_use]
    pub fn new(field: impl Into<String>, operator: Operator, value: DomainValue) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// `field != false`, i.e. the field is set.
    #[must_use]
    pub fn is_set(field: impl Into<String>) -> Self {
        Self::new(field, Operator::Ne, DomainValue::Bool(false))
    }
}

impl Serialize for DomainClause {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(&self.field)?;
        tuple.serialize_element(self.operator.as_str())?;
        tuple.serialize_element(&self.value)?;
        tuple.end()
    }
}

/// Conjunction of clauses.
pub type Domain = Vec<DomainClause>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clause_serializes_as_triple() {
        let clause = DomainClause::new("account_id", Operator::Eq, DomainValue::Int(12));
        assert_eq!(serde_json::to_value(&clause).unwrap(), json!(["account_id", "=", 12]));
    }

    #[test]
    fn test_is_set_clause() {
        let clause = DomainClause::is_set("deferred_end_date");
        assert_eq!(
            serde_json::to_value(&clause).unwrap(),
            json!(["deferred_end_date", "!=", false])
        );
    }

    #[test]
    fn test_list_and_date_values() {
        let domain: Domain = vec![
            DomainClause::new(
                "move_id.move_type",
                Operator::In,
                DomainValue::texts(&["in_invoice"]),
            ),
            DomainClause::new(
                "date",
                Operator::Ge,
                DomainValue::Date(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()),
            ),
            DomainClause::new("journal_id", Operator::In, DomainValue::Ints(vec![1, 2])),
        ];
        assert_eq!(
            serde_json::to_value(&domain).unwrap(),
            json!([
                ["move_id.move_type", "in", ["in_invoice"]],
                ["date", ">=", "2026-01-01"],
                ["journal_id", "in", [1, 2]]
            ])
        );
    }
}
