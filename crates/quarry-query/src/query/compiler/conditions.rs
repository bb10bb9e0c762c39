//! WHERE / HAVING / ON condition rendering.
//!
//! Conditions are joined with a single space; every condition after the
//! first is prefixed with `AND ` or `OR ` according to its own flag.
//! Negation wraps the condition in `NOT (...)`, except for the kinds that
//! have a native negated form (`IS NOT NULL`, `!=`, `NOT IN`,
//! `NOT BETWEEN`, `NOT EXISTS`).

use quarry_core::{QuarryError, QuarryResult};

use super::dialect::DatePredicate;
use super::writer::{ResolvedOperand, Writer};
use super::SqlCompiler;
use crate::query::builder::Query;
use crate::query::clauses::{ClauseNode, Component};
use crate::query::conditions::{Condition, ConditionKind, LikeOperator};
use crate::value::{Operand, Value};

impl SqlCompiler {
    /// The conditions of `component` on `query` for this compiler's engine.
    pub(crate) fn conditions_of<'q>(
        &self,
        query: &'q Query,
        component: Component,
    ) -> QuarryResult<Vec<&'q Condition>> {
        query
            .components(component, self.engine())
            .into_iter()
            .map(|clause| match &clause.node {
                ClauseNode::Condition(condition) => Ok(condition),
                other => Err(other.mismatch(component)),
            })
            .collect()
    }

    /// Renders a condition list. Conditions that render to nothing (empty
    /// nested groups) are skipped along with their `AND`/`OR` prefix.
    pub(crate) fn compile_conditions(
        &self,
        w: &mut Writer<'_>,
        scope: &Query,
        conditions: &[&Condition],
    ) -> QuarryResult<()> {
        let mut written = 0;
        for condition in conditions {
            let fragment = w.frame(|w| self.compile_condition(w, scope, condition))?;
            if fragment.is_empty() {
                continue;
            }
            if written > 0 {
                w.append(if condition.is_or { " OR " } else { " AND " });
            }
            w.splice(fragment);
            written += 1;
        }
        Ok(())
    }

    fn compile_condition(
        &self,
        w: &mut Writer<'_>,
        scope: &Query,
        condition: &Condition,
    ) -> QuarryResult<()> {
        let is_not = condition.is_not;
        match &condition.kind {
            ConditionKind::Basic {
                column,
                operator,
                value,
            } => {
                let operator = self.operators().check(operator)?;
                let value = self.resolve(w, scope, value)?;
                negated(w, is_not, |w| {
                    w.append_name(column);
                    w.append(" ");
                    w.append(operator);
                    w.append(" ");
                    w.append_operand(&value);
                    Ok(())
                })
            }
            ConditionKind::String {
                column,
                operator,
                value,
                case_sensitive,
                escape,
            } => self.compile_string_condition(
                w,
                scope,
                StringCondition {
                    column,
                    operator: *operator,
                    value,
                    case_sensitive: *case_sensitive,
                    escape: *escape,
                    is_not,
                },
            ),
            ConditionKind::Date {
                column,
                operator,
                part,
                value,
            } => {
                let operator = self.operators().check(operator)?;
                let value = self.resolve(w, scope, value)?;
                self.dialect.compile_date_condition(
                    w,
                    &DatePredicate {
                        part,
                        column,
                        operator,
                        value: &value,
                        is_not,
                    },
                )
            }
            ConditionKind::TwoColumns {
                first,
                operator,
                second,
            } => {
                let operator = self.operators().check(operator)?;
                if is_not {
                    w.append("NOT ");
                }
                w.append_name(first);
                w.append(" ");
                w.append(operator);
                w.append(" ");
                w.append_name(second);
                Ok(())
            }
            ConditionKind::Query {
                column,
                operator,
                query,
            } => {
                let operator = self.operators().check(operator)?;
                negated(w, is_not, |w| {
                    w.append_name(column);
                    w.append(" ");
                    w.append(operator);
                    w.append(" (");
                    self.compile_select(w, query)?;
                    w.append(")");
                    Ok(())
                })
            }
            ConditionKind::SubQuery {
                query,
                operator,
                value,
            } => {
                let operator = self.operators().check(operator)?;
                let value = self.resolve(w, scope, value)?;
                negated(w, is_not, |w| {
                    w.append("(");
                    self.compile_select(w, query)?;
                    w.append(") ");
                    w.append(operator);
                    w.append(" ");
                    w.append_operand(&value);
                    Ok(())
                })
            }
            ConditionKind::In { column, values } => {
                if values.is_empty() {
                    w.append(if is_not {
                        "1 = 1 /* NOT IN [empty list] */"
                    } else {
                        "1 = 0 /* IN [empty list] */"
                    });
                    return Ok(());
                }
                let values = values
                    .iter()
                    .map(|v| self.resolve(w, scope, v))
                    .collect::<QuarryResult<Vec<_>>>()?;
                w.append_name(column);
                w.append(if is_not { " NOT IN (" } else { " IN (" });
                w.list(", ", &values, |w, value| {
                    w.append_operand(value);
                    Ok(())
                })?;
                w.append(")");
                Ok(())
            }
            ConditionKind::InQuery { column, query } => {
                w.append_name(column);
                w.append(if is_not { " NOT IN (" } else { " IN (" });
                self.compile_select(w, query)?;
                w.append(")");
                Ok(())
            }
            ConditionKind::Between {
                column,
                lower,
                higher,
            } => {
                let lower = self.resolve(w, scope, lower)?;
                let higher = self.resolve(w, scope, higher)?;
                w.append_name(column);
                w.append(if is_not { " NOT BETWEEN " } else { " BETWEEN " });
                w.append_operand(&lower);
                w.append(" AND ");
                w.append_operand(&higher);
                Ok(())
            }
            ConditionKind::Null { column } => {
                w.append_name(column);
                w.append(if is_not { " IS NOT NULL" } else { " IS NULL" });
                Ok(())
            }
            ConditionKind::Boolean { column, value } => {
                w.append_name(column);
                w.append(if is_not { " != " } else { " = " });
                let config = self.config();
                w.append(if *value {
                    &config.true_literal
                } else {
                    &config.false_literal
                });
                Ok(())
            }
            ConditionKind::Nested { query } => {
                self.compile_nested_condition(w, scope, query, is_not)
            }
            ConditionKind::Exists { query } => {
                w.append(if is_not { "NOT EXISTS (" } else { "EXISTS (" });
                if self.config().omit_select_inside_exists {
                    let trimmed = Query::clone(query)
                        .clear_component(Component::Select)
                        .select_raw("1", Vec::new());
                    self.compile_select(w, &trimmed)?;
                } else {
                    self.compile_select(w, query)?;
                }
                w.append(")");
                Ok(())
            }
            ConditionKind::Raw {
                expression,
                bindings,
            } => negated(w, is_not, |w| w.append_raw(expression, bindings)),
        }
    }

    fn compile_nested_condition(
        &self,
        w: &mut Writer<'_>,
        scope: &Query,
        nested: &Query,
        is_not: bool,
    ) -> QuarryResult<()> {
        let engine = self.engine();
        let component = if nested.has_component(Component::Where, engine) {
            Component::Where
        } else if nested.has_component(Component::Having, engine) {
            Component::Having
        } else {
            return Ok(());
        };
        let conditions = self.conditions_of(nested, component)?;
        let inner = w.frame(|w| self.compile_conditions(w, scope, &conditions))?;
        if inner.is_empty() {
            return Ok(());
        }
        if is_not {
            w.append("NOT ");
        }
        w.append("(");
        w.splice(inner);
        w.append(")");
        Ok(())
    }

    fn compile_string_condition(
        &self,
        w: &mut Writer<'_>,
        scope: &Query,
        condition: StringCondition<'_>,
    ) -> QuarryResult<()> {
        let pattern = match self.resolve(w, scope, condition.value)? {
            ResolvedOperand::Literal(sql) => ResolvedOperand::Literal(sql),
            ResolvedOperand::Parameter(Value::String(text)) => {
                let pattern = condition.operator.pattern(&text);
                let pattern = if condition.case_sensitive || self.config().native_ilike {
                    pattern
                } else {
                    pattern.to_lowercase()
                };
                ResolvedOperand::Parameter(Value::String(pattern))
            }
            ResolvedOperand::Parameter(_) => {
                return Err(QuarryError::invalid_argument(
                    "Expecting a non nullable string",
                ));
            }
        };

        let lower_column = !condition.case_sensitive && !self.config().native_ilike;
        let keyword = if !condition.case_sensitive && self.config().native_ilike {
            "ILIKE"
        } else {
            "LIKE"
        };
        let keyword = self.operators().check(keyword)?;

        negated(w, condition.is_not, |w| {
            if lower_column {
                w.append("LOWER(");
                w.append_name(condition.column);
                w.append(")");
            } else {
                w.append_name(condition.column);
            }
            w.append(" ");
            w.append(keyword);
            w.append(" ");
            w.append_operand(&pattern);
            if let Some(escape) = condition.escape {
                w.append(" ESCAPE '");
                w.append(&escape.to_string().replace('\'', "''"));
                w.append("'");
            }
            Ok(())
        })
    }
}

/// The borrowed fields of a string condition.
#[derive(Debug, Clone, Copy)]
struct StringCondition<'a> {
    column: &'a str,
    operator: LikeOperator,
    value: &'a Operand,
    case_sensitive: bool,
    escape: Option<char>,
    is_not: bool,
}

/// Runs `body`, wrapped in `NOT (...)` when `is_not` is set.
fn negated(
    w: &mut Writer<'_>,
    is_not: bool,
    body: impl FnOnce(&mut Writer<'_>) -> QuarryResult<()>,
) -> QuarryResult<()> {
    if is_not {
        w.append("NOT (");
    }
    body(w)?;
    if is_not {
        w.append(")");
    }
    Ok(())
}
