//! INSERT, UPDATE and DELETE rendering.

use quarry_core::{QuarryError, QuarryResult};

use super::dialect::{count_value, InsertValues};
use super::writer::{Fragment, Writer};
use super::SqlCompiler;
use crate::query::builder::Query;
use crate::query::clauses::{ClauseNode, Component, FromClause, InsertClause, UpdateClause};

impl SqlCompiler {
    /// Writes the target table of a write statement and returns what was
    /// written.
    fn write_table(
        &self,
        w: &mut Writer<'_>,
        query: &Query,
        operation: &str,
    ) -> QuarryResult<Fragment> {
        let Some(clause) = query.one_component(Component::From, self.engine()) else {
            return Err(QuarryError::invalid_operation(format!(
                "No table set to {operation}"
            )));
        };
        let table = w.frame(|w| match &clause.node {
            ClauseNode::From(FromClause::Table { table }) => {
                w.append_table(table);
                Ok(())
            }
            ClauseNode::From(FromClause::Raw {
                expression,
                bindings,
                ..
            }) => w.append_raw(expression, bindings),
            _ => Err(QuarryError::invalid_operation("Invalid table expression")),
        })?;
        w.splice(table.clone());
        Ok(table)
    }

    fn write_insert_columns(w: &mut Writer<'_>, columns: &[String]) -> QuarryResult<()> {
        if columns.is_empty() {
            return Ok(());
        }
        w.append(" (");
        w.list(", ", columns, |w, column| {
            w.append_name(column);
            Ok(())
        })?;
        w.append(")");
        Ok(())
    }

    // ── Insert ───────────────────────────────────────────────────────

    pub(crate) fn compile_insert(&self, w: &mut Writer<'_>, query: &Query) -> QuarryResult<()> {
        let inserts = query
            .components(Component::Insert, self.engine())
            .into_iter()
            .map(|clause| match &clause.node {
                ClauseNode::Insert(insert) => Ok(insert),
                other => Err(other.mismatch(Component::Insert)),
            })
            .collect::<QuarryResult<Vec<_>>>()?;
        let Some(first) = inserts.first() else {
            return Err(QuarryError::invalid_operation("No values set to insert"));
        };

        let rows = inserts
            .iter()
            .filter_map(|insert| match insert {
                InsertClause::Values(row) => Some(row),
                InsertClause::Query { .. } => None,
            })
            .map(|row| {
                let values = row
                    .values
                    .iter()
                    .map(|value| self.resolve(w, query, value))
                    .collect::<QuarryResult<Vec<_>>>()?;
                Ok::<_, QuarryError>(InsertValues {
                    columns: &row.columns,
                    values,
                })
            })
            .collect::<QuarryResult<Vec<_>>>()?;
        let is_multi = rows.len() > 1;

        let config = self.config();
        w.append(if is_multi {
            &config.multi_insert_start
        } else {
            &config.insert_start
        });
        w.append(" ");
        let table = self.write_table(w, query, "insert")?;

        match first {
            InsertClause::Query { columns, query } => {
                Self::write_insert_columns(w, columns)?;
                w.append(" ");
                self.compile_select(w, query)
            }
            InsertClause::Values(row) => {
                let Some((head, tail)) = rows.split_first() else {
                    return Ok(());
                };
                Self::write_insert_columns(w, head.columns)?;
                w.append(" VALUES (");
                w.list(", ", &head.values, |w, value| {
                    w.append_operand(value);
                    Ok(())
                })?;
                w.append(")");

                if is_multi {
                    return self.dialect.compile_remaining_inserts(w, &table, tail);
                }
                if row.return_id && !config.last_id.is_empty() {
                    w.append(";");
                    w.append(&config.last_id);
                }
                Ok(())
            }
        }
    }

    // ── Update ───────────────────────────────────────────────────────

    /// # Panics
    ///
    /// Panics if the query has no update clause for this engine; the
    /// builder always adds one when it switches a query to update.
    pub(crate) fn compile_update(&self, w: &mut Writer<'_>, query: &Query) -> QuarryResult<()> {
        w.append("UPDATE ");
        self.write_table(w, query, "update")?;

        let update = match query
            .one_component(Component::Update, self.engine())
            .map(|c| &c.node)
        {
            Some(ClauseNode::Update(update)) => update,
            other => panic!("update query without an update clause: {other:?}"),
        };

        w.append(" SET ");
        match update {
            UpdateClause::Increment { column, amount } => {
                w.append_name(column);
                w.append(" = ");
                w.append_name(column);
                w.append(if *amount >= 0 { " + " } else { " - " });
                w.append_parameter(count_value(amount.unsigned_abs()));
            }
            UpdateClause::Set { columns, values } => {
                let values = values
                    .iter()
                    .map(|value| self.resolve(w, query, value))
                    .collect::<QuarryResult<Vec<_>>>()?;
                w.list(", ", columns.iter().zip(&values), |w, (column, value)| {
                    w.append_name(column);
                    w.append(" = ");
                    w.append_operand(value);
                    Ok(())
                })?;
            }
        }
        w.phase(|w| self.compile_wheres(w, query))
    }

    // ── Delete ───────────────────────────────────────────────────────

    pub(crate) fn compile_delete(&self, w: &mut Writer<'_>, query: &Query) -> QuarryResult<()> {
        let engine = self.engine();
        if !query.has_component(Component::Join, engine) {
            w.append("DELETE FROM ");
            self.write_table(w, query, "delete")?;
            return w.phase(|w| self.compile_wheres(w, query));
        }

        let alias = match query.one_component(Component::From, engine).map(|c| &c.node) {
            Some(ClauseNode::From(from @ FromClause::Table { .. })) => {
                from.alias().unwrap_or_default().to_string()
            }
            Some(other) => return Err(other.mismatch(Component::From)),
            None => return Err(QuarryError::invalid_operation("No table set to delete")),
        };
        w.append("DELETE ");
        w.append_name(&alias);
        w.append(" FROM ");
        self.write_table(w, query, "delete")?;
        w.phase(|w| self.compile_joins(w, query))?;
        w.phase(|w| self.compile_wheres(w, query))
    }
}
