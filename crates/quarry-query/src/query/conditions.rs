//! Condition clauses for the WHERE and HAVING sections.
//!
//! A [`Condition`] records whether it is OR-combined with the condition
//! before it and whether it is negated; both flags are captured from the
//! query's pending `or()`/`not()` state when the condition is added.

use super::Query;
use crate::value::{Operand, Value};

/// A single WHERE/HAVING predicate.
#[derive(Debug, Clone)]
pub struct Condition {
    /// Combine with the previous condition using `OR` instead of `AND`.
    pub is_or: bool,
    /// Negate this condition.
    pub is_not: bool,
    pub kind: ConditionKind,
}

/// The pattern shapes supported by string conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOperator {
    /// The value is used as the pattern as-is.
    Like,
    /// `value%`
    Starts,
    /// `%value`
    Ends,
    /// `%value%`
    Contains,
}

impl LikeOperator {
    /// Applies the operator's wildcards to `value`.
    pub fn pattern(self, value: &str) -> String {
        match self {
            Self::Like => value.to_string(),
            Self::Starts => format!("{value}%"),
            Self::Ends => format!("%{value}"),
            Self::Contains => format!("%{value}%"),
        }
    }
}

/// The predicate kinds.
#[derive(Debug, Clone)]
pub enum ConditionKind {
    /// `column op value`
    Basic {
        column: String,
        operator: String,
        value: Operand,
    },
    /// `column LIKE pattern`, optionally case-insensitive and with an escape
    /// character.
    String {
        column: String,
        operator: LikeOperator,
        value: Operand,
        case_sensitive: bool,
        escape: Option<char>,
    },
    /// `PART(column) op value`
    Date {
        column: String,
        operator: String,
        part: String,
        value: Operand,
    },
    /// `first op second`
    TwoColumns {
        first: String,
        operator: String,
        second: String,
    },
    /// `column op (sub-query)`
    Query {
        column: String,
        operator: String,
        query: Box<Query>,
    },
    /// `(sub-query) op value`
    SubQuery {
        query: Box<Query>,
        operator: String,
        value: Operand,
    },
    /// `column IN (values)`; values are distinct in first-seen order.
    In { column: String, values: Vec<Operand> },
    /// `column IN (sub-query)`
    InQuery { column: String, query: Box<Query> },
    /// `column BETWEEN lower AND higher`
    Between {
        column: String,
        lower: Operand,
        higher: Operand,
    },
    /// `column IS NULL`
    Null { column: String },
    /// `column = true`
    Boolean { column: String, value: bool },
    /// A parenthesized group of conditions held by an inner query.
    Nested { query: Box<Query> },
    /// `EXISTS (sub-query)`
    Exists { query: Box<Query> },
    /// Raw SQL with bindings.
    Raw { expression: String, bindings: Vec<Value> },
}

impl ConditionKind {
    pub(crate) const fn kind_name(&self) -> &'static str {
        match self {
            Self::Basic { .. } => "BasicCondition",
            Self::String { .. } => "BasicStringCondition",
            Self::Date { .. } => "BasicDateCondition",
            Self::TwoColumns { .. } => "TwoColumnsCondition",
            Self::Query { .. } => "QueryCondition",
            Self::SubQuery { .. } => "SubQueryCondition",
            Self::In { .. } => "InCondition",
            Self::InQuery { .. } => "InQueryCondition",
            Self::Between { .. } => "BetweenCondition",
            Self::Null { .. } => "NullCondition",
            Self::Boolean { .. } => "BooleanCondition",
            Self::Nested { .. } => "NestedCondition",
            Self::Exists { .. } => "ExistsCondition",
            Self::Raw { .. } => "RawCondition",
        }
    }
}

/// Removes duplicates from `values`, keeping the first occurrence of each.
pub(crate) fn distinct(values: impl IntoIterator<Item = Operand>) -> Vec<Operand> {
    let mut out: Vec<Operand> = Vec::new();
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}
