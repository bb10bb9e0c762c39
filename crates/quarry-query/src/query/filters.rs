//! WHERE and HAVING builder methods.
//!
//! Every condition captures the query's pending `or()`/`not()` flags at the
//! moment it is added and clears them, so a flag applies to exactly one
//! condition:
//!
//! ```
//! use quarry_query::query::Query;
//!
//! // a = 1 OR b = 2 AND c = 3
//! let query = Query::new("t")
//!     .where_eq("a", 1)
//!     .or()
//!     .where_eq("b", 2)
//!     .where_eq("c", 3);
//! # let _ = query;
//! ```

use quarry_core::{QuarryError, QuarryResult};

use super::clauses::{ClauseNode, Component};
use super::conditions::{distinct, Condition, ConditionKind, LikeOperator};
use super::Query;
use crate::value::{Operand, Value};

impl Query {
    fn add_condition(mut self, component: Component, kind: ConditionKind) -> Self {
        let is_or = self.take_or();
        let is_not = self.take_not();
        self.add_component(
            component,
            ClauseNode::Condition(Condition {
                is_or,
                is_not,
                kind,
            }),
        )
    }

    fn basic(mut self, component: Component, column: &str, op: &str, value: Operand) -> Self {
        // `col = NULL` and `col = true` are rewritten into their dedicated
        // predicates; any other operator negates them.
        match value {
            Operand::Value(Value::Null) => {
                if op != "=" {
                    self = self.not(true);
                }
                self.add_condition(
                    component,
                    ConditionKind::Null {
                        column: column.to_string(),
                    },
                )
            }
            Operand::Value(Value::Bool(flag)) => {
                if op != "=" {
                    self = self.not(true);
                }
                self.add_condition(
                    component,
                    ConditionKind::Boolean {
                        column: column.to_string(),
                        value: flag,
                    },
                )
            }
            value => self.add_condition(
                component,
                ConditionKind::Basic {
                    column: column.to_string(),
                    operator: op.to_string(),
                    value,
                },
            ),
        }
    }

    fn nested(mut self, component: Component, query: Self) -> Self {
        let has_conditions = query.clauses().any(|c| {
            matches!(c.component, Component::Where | Component::Having)
        });
        if !has_conditions {
            // An empty group renders nothing, so it is dropped along with
            // the pending flags.
            self.take_or();
            self.take_not();
            return self;
        }
        self.add_condition(
            component,
            ConditionKind::Nested {
                query: Box::new(query),
            },
        )
    }

    fn exists(self, component: Component, query: Self, operation: &str) -> QuarryResult<Self> {
        if !query.clauses().any(|c| c.component == Component::From) {
            return Err(QuarryError::MissingClause {
                clause: "FromClause".to_string(),
                operation: operation.to_string(),
            });
        }
        let query = self.adopt(query);
        Ok(self.add_condition(
            component,
            ConditionKind::Exists {
                query: Box::new(query),
            },
        ))
    }

    fn in_values<I, V>(self, component: Component, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Operand>,
    {
        self.add_condition(
            component,
            ConditionKind::In {
                column: column.to_string(),
                values: distinct(values.into_iter().map(Into::into)),
            },
        )
    }

    fn raw_condition(self, component: Component, expression: &str, bindings: Vec<Value>) -> Self {
        self.add_condition(
            component,
            ConditionKind::Raw {
                expression: expression.to_string(),
                bindings,
            },
        )
    }

    // ── WHERE: basic ─────────────────────────────────────────────────

    /// `column op value`.
    ///
    /// A null value becomes `IS NULL` (`IS NOT NULL` for any operator other
    /// than `=`); a boolean value becomes a boolean predicate.
    pub fn where_op(self, column: &str, op: &str, value: impl Into<Operand>) -> Self {
        self.basic(Component::Where, column, op, value.into())
    }

    /// `column = value`
    pub fn where_eq(self, column: &str, value: impl Into<Operand>) -> Self {
        self.where_op(column, "=", value)
    }

    /// `NOT (column op value)`
    pub fn where_not(self, column: &str, op: &str, value: impl Into<Operand>) -> Self {
        self.not(true).where_op(column, op, value)
    }

    /// `OR column op value`
    pub fn or_where(self, column: &str, op: &str, value: impl Into<Operand>) -> Self {
        self.or().where_op(column, op, value)
    }

    /// `column IS NULL`
    pub fn where_null(self, column: &str) -> Self {
        self.add_condition(
            Component::Where,
            ConditionKind::Null {
                column: column.to_string(),
            },
        )
    }

    /// `column IS NOT NULL`
    pub fn where_not_null(self, column: &str) -> Self {
        self.not(true).where_null(column)
    }

    /// `OR column IS NULL`
    pub fn or_where_null(self, column: &str) -> Self {
        self.or().where_null(column)
    }

    /// `column = <true literal>`
    pub fn where_true(self, column: &str) -> Self {
        self.add_condition(
            Component::Where,
            ConditionKind::Boolean {
                column: column.to_string(),
                value: true,
            },
        )
    }

    /// `column = <false literal>`
    pub fn where_false(self, column: &str) -> Self {
        self.add_condition(
            Component::Where,
            ConditionKind::Boolean {
                column: column.to_string(),
                value: false,
            },
        )
    }

    /// `first op second`, comparing two columns.
    pub fn where_columns(self, first: &str, op: &str, second: &str) -> Self {
        self.add_condition(
            Component::Where,
            ConditionKind::TwoColumns {
                first: first.to_string(),
                operator: op.to_string(),
                second: second.to_string(),
            },
        )
    }

    /// A raw predicate.
    pub fn where_raw(self, expression: &str, bindings: Vec<Value>) -> Self {
        self.raw_condition(Component::Where, expression, bindings)
    }

    /// `OR` a raw predicate.
    pub fn or_where_raw(self, expression: &str, bindings: Vec<Value>) -> Self {
        self.or().where_raw(expression, bindings)
    }

    // ── WHERE: strings ───────────────────────────────────────────────

    /// A `LIKE` predicate with the wildcards of `operator` applied to `value`.
    ///
    /// Case-insensitive matching lower-cases both sides unless the dialect
    /// has a native case-insensitive operator.
    pub fn where_string(
        self,
        column: &str,
        operator: LikeOperator,
        value: impl Into<Operand>,
        case_sensitive: bool,
        escape: Option<char>,
    ) -> Self {
        self.add_condition(
            Component::Where,
            ConditionKind::String {
                column: column.to_string(),
                operator,
                value: value.into(),
                case_sensitive,
                escape,
            },
        )
    }

    /// Case-insensitive `column LIKE value`.
    pub fn where_like(self, column: &str, value: impl Into<Operand>) -> Self {
        self.where_string(column, LikeOperator::Like, value, false, None)
    }

    /// Case-insensitive `column NOT LIKE value`.
    pub fn where_not_like(self, column: &str, value: impl Into<Operand>) -> Self {
        self.not(true).where_like(column, value)
    }

    /// Case-insensitive `column LIKE 'value%'`.
    pub fn where_starts(self, column: &str, value: impl Into<Operand>) -> Self {
        self.where_string(column, LikeOperator::Starts, value, false, None)
    }

    /// Case-insensitive `column LIKE '%value'`.
    pub fn where_ends(self, column: &str, value: impl Into<Operand>) -> Self {
        self.where_string(column, LikeOperator::Ends, value, false, None)
    }

    /// Case-insensitive `column LIKE '%value%'`.
    pub fn where_contains(self, column: &str, value: impl Into<Operand>) -> Self {
        self.where_string(column, LikeOperator::Contains, value, false, None)
    }

    // ── WHERE: ranges and sets ───────────────────────────────────────

    /// `column BETWEEN lower AND higher`
    pub fn where_between(
        self,
        column: &str,
        lower: impl Into<Operand>,
        higher: impl Into<Operand>,
    ) -> Self {
        self.add_condition(
            Component::Where,
            ConditionKind::Between {
                column: column.to_string(),
                lower: lower.into(),
                higher: higher.into(),
            },
        )
    }

    /// `column NOT BETWEEN lower AND higher`
    pub fn where_not_between(
        self,
        column: &str,
        lower: impl Into<Operand>,
        higher: impl Into<Operand>,
    ) -> Self {
        self.not(true).where_between(column, lower, higher)
    }

    /// `column IN (values)`; duplicate values are dropped.
    pub fn where_in<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Operand>,
    {
        self.in_values(Component::Where, column, values)
    }

    /// `column NOT IN (values)`
    pub fn where_not_in<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Operand>,
    {
        self.not(true).where_in(column, values)
    }

    /// `OR column IN (values)`
    pub fn or_where_in<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Operand>,
    {
        self.or().where_in(column, values)
    }

    /// `column IN (sub-query)`
    pub fn where_in_query(self, column: &str, query: Self) -> Self {
        let query = self.adopt(query);
        self.add_condition(
            Component::Where,
            ConditionKind::InQuery {
                column: column.to_string(),
                query: Box::new(query),
            },
        )
    }

    /// `column NOT IN (sub-query)`
    pub fn where_not_in_query(self, column: &str, query: Self) -> Self {
        self.not(true).where_in_query(column, query)
    }

    // ── WHERE: sub-queries and groups ────────────────────────────────

    /// `column op (sub-query)`
    pub fn where_query(self, column: &str, op: &str, query: Self) -> Self {
        let query = self.adopt(query);
        self.add_condition(
            Component::Where,
            ConditionKind::Query {
                column: column.to_string(),
                operator: op.to_string(),
                query: Box::new(query),
            },
        )
    }

    /// `(sub-query) op value`
    pub fn where_sub(self, query: Self, op: &str, value: impl Into<Operand>) -> Self {
        let query = self.adopt(query);
        self.add_condition(
            Component::Where,
            ConditionKind::SubQuery {
                query: Box::new(query),
                operator: op.to_string(),
                value: value.into(),
            },
        )
    }

    /// `EXISTS (sub-query)`; the sub-query must have a FROM clause.
    pub fn where_exists(self, query: Self) -> QuarryResult<Self> {
        self.exists(Component::Where, query, "WhereExists")
    }

    /// `NOT EXISTS (sub-query)`
    pub fn where_not_exists(self, query: Self) -> QuarryResult<Self> {
        self.not(true).where_exists(query)
    }

    /// A parenthesized group built by `build` on a child query.
    ///
    /// A group with no conditions is omitted.
    pub fn where_nested(self, build: impl FnOnce(Self) -> Self) -> Self {
        let child = build(self.new_child());
        self.where_group(child)
    }

    /// `OR (group)`
    pub fn or_where_nested(self, build: impl FnOnce(Self) -> Self) -> Self {
        self.or().where_nested(build)
    }

    /// A parenthesized group holding the WHERE conditions of `query`.
    pub fn where_group(self, query: Self) -> Self {
        self.nested(Component::Where, query)
    }

    // ── WHERE: dates ─────────────────────────────────────────────────

    /// `PART(column) op value`, e.g. `part = "year"`.
    pub fn where_date_part(
        self,
        part: &str,
        column: &str,
        op: &str,
        value: impl Into<Operand>,
    ) -> Self {
        self.add_condition(
            Component::Where,
            ConditionKind::Date {
                column: column.to_string(),
                operator: op.to_string(),
                part: part.to_lowercase(),
                value: value.into(),
            },
        )
    }

    /// Compares the date portion of `column`.
    pub fn where_date(self, column: &str, op: &str, value: impl Into<Operand>) -> Self {
        self.where_date_part("date", column, op, value)
    }

    /// Compares the time portion of `column`.
    pub fn where_time(self, column: &str, op: &str, value: impl Into<Operand>) -> Self {
        self.where_date_part("time", column, op, value)
    }

    // ── HAVING ───────────────────────────────────────────────────────

    /// `HAVING column op value`
    pub fn having(self, column: &str, op: &str, value: impl Into<Operand>) -> Self {
        self.basic(Component::Having, column, op, value.into())
    }

    /// `OR column op value` in the HAVING section.
    pub fn or_having(self, column: &str, op: &str, value: impl Into<Operand>) -> Self {
        self.or().having(column, op, value)
    }

    /// A raw HAVING predicate.
    pub fn having_raw(self, expression: &str, bindings: Vec<Value>) -> Self {
        self.raw_condition(Component::Having, expression, bindings)
    }

    /// `HAVING column IS NULL`
    pub fn having_null(self, column: &str) -> Self {
        self.add_condition(
            Component::Having,
            ConditionKind::Null {
                column: column.to_string(),
            },
        )
    }

    /// `HAVING column IN (values)`
    pub fn having_in<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Operand>,
    {
        self.in_values(Component::Having, column, values)
    }

    /// `HAVING column BETWEEN lower AND higher`
    pub fn having_between(
        self,
        column: &str,
        lower: impl Into<Operand>,
        higher: impl Into<Operand>,
    ) -> Self {
        self.add_condition(
            Component::Having,
            ConditionKind::Between {
                column: column.to_string(),
                lower: lower.into(),
                higher: higher.into(),
            },
        )
    }

    /// `HAVING first op second`
    pub fn having_columns(self, first: &str, op: &str, second: &str) -> Self {
        self.add_condition(
            Component::Having,
            ConditionKind::TwoColumns {
                first: first.to_string(),
                operator: op.to_string(),
                second: second.to_string(),
            },
        )
    }

    /// A parenthesized HAVING group built on a child query's HAVING section.
    pub fn having_nested(self, build: impl FnOnce(Self) -> Self) -> Self {
        let child = build(self.new_child());
        self.nested(Component::Having, child)
    }

    /// `HAVING EXISTS (sub-query)`; the sub-query must have a FROM clause.
    pub fn having_exists(self, query: Self) -> QuarryResult<Self> {
        self.exists(Component::Having, query, "HavingExists")
    }
}
