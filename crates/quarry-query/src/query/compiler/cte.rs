//! Common table expressions.
//!
//! Every CTE reachable from a statement is rendered once, in a single
//! `WITH` prefix. CTEs defined on a CTE's own query come before it, and an
//! alias that was already seen is skipped.

use std::collections::HashSet;

use quarry_core::{QuarryError, QuarryResult};

use super::writer::Writer;
use super::SqlCompiler;
use crate::query::builder::Query;
use crate::query::clauses::{ClauseNode, Component, FromClause};

impl SqlCompiler {
    /// Writes `WITH a AS (...),\nb AS (...)\n` when the query has CTEs.
    pub(crate) fn compile_ctes(&self, w: &mut Writer<'_>, query: &Query) -> QuarryResult<()> {
        if !query.has_component(Component::Cte, self.engine()) {
            return Ok(());
        }
        let ctes = self.find_ctes(query)?;
        tracing::trace!(count = ctes.len(), "rendering common table expressions");

        w.append("WITH ");
        w.list(",\n", ctes, |w, cte| self.compile_cte(w, cte))?;
        w.append("\n");
        Ok(())
    }

    /// Collects the CTEs of `query` and, depth first, of the queries they
    /// reference, deduplicated by alias.
    pub(crate) fn find_ctes<'q>(&self, query: &'q Query) -> QuarryResult<Vec<&'q FromClause>> {
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        self.collect_ctes(query, &mut seen, &mut found)?;
        Ok(found)
    }

    fn collect_ctes<'q>(
        &self,
        query: &'q Query,
        seen: &mut HashSet<String>,
        found: &mut Vec<&'q FromClause>,
    ) -> QuarryResult<()> {
        for clause in query.components(Component::Cte, self.engine()) {
            let ClauseNode::From(cte) = &clause.node else {
                return Err(clause.node.mismatch(Component::Cte));
            };
            let alias = cte.alias().unwrap_or_default();
            if !seen.insert(alias.to_string()) {
                continue;
            }
            if let FromClause::Query { query: inner } = cte {
                self.collect_ctes(inner, seen, found)?;
            }
            found.push(cte);
        }
        Ok(())
    }

    fn compile_cte(&self, w: &mut Writer<'_>, cte: &FromClause) -> QuarryResult<()> {
        let alias = cte.alias().unwrap_or_default();
        match cte {
            FromClause::Raw {
                expression,
                bindings,
                ..
            } => {
                w.append_value(alias);
                w.append(" AS (");
                w.append_raw(expression, bindings)?;
                w.append(")");
            }
            FromClause::Query { query } => {
                w.append_value(alias);
                w.append(" AS (");
                self.compile_select(w, query)?;
                w.append(")");
            }
            FromClause::AdHoc { columns, rows, .. } => {
                let dummy = self.config().dummy_table.as_deref();
                w.append_value(alias);
                w.append(" AS (");
                w.list(" UNION ALL ", rows, |w, row| {
                    w.append("SELECT ");
                    w.list(", ", row.iter().zip(columns), |w, (value, column)| {
                        w.append_parameter(value.clone());
                        w.append(" AS ");
                        w.append_name(column);
                        Ok(())
                    })?;
                    if let Some(dummy) = dummy {
                        w.append(" FROM ");
                        w.append(dummy);
                    }
                    Ok(())
                })?;
                w.append(")");
            }
            FromClause::Table { .. } => {
                return Err(QuarryError::invalid_clause(cte.kind_name(), "cte"));
            }
        }
        Ok(())
    }
}
