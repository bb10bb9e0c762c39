//! SELECT rendering.
//!
//! A select is rendered as a fixed sequence of whitespace-separated phases:
//! columns, from, joins, where, group, having, order, limit and set
//! operations. A phase whose component is absent contributes nothing.

use quarry_core::{QuarryError, QuarryResult};

use super::dialect::Pagination;
use super::pagination::apply_legacy_limit;
use super::writer::Writer;
use super::SqlCompiler;
use crate::query::builder::Query;
use crate::query::clauses::{
    Clause, ClauseNode, ColumnClause, CombineClause, Component, FromClause, GroupClause, Join,
    OrderClause,
};

impl SqlCompiler {
    /// Renders a select, applying the ROWNUM wrapper when the dialect uses
    /// legacy pagination.
    ///
    /// Variables of `query` stay visible to the sub-queries it contains.
    pub(crate) fn compile_select(&self, w: &mut Writer<'_>, query: &Query) -> QuarryResult<()> {
        let page = self.pagination(query);
        w.scoped(query.visible_variables(), |w| {
            if self.config().legacy_pagination && (page.limit > 0 || page.offset > 0) {
                let inner = w.frame(|w| self.compile_select_phases(w, query, false))?;
                tracing::trace!(
                    limit = page.limit,
                    offset = page.offset,
                    "applying legacy pagination"
                );
                apply_legacy_limit(w, inner, page);
                return Ok(());
            }
            self.compile_select_phases(w, query, true)
        })
    }

    fn compile_select_phases(
        &self,
        w: &mut Writer<'_>,
        query: &Query,
        with_limit: bool,
    ) -> QuarryResult<()> {
        self.compile_columns(w, query)?;
        w.phase(|w| self.compile_from(w, query))?;
        w.phase(|w| self.compile_joins(w, query))?;
        w.phase(|w| self.compile_wheres(w, query))?;
        w.phase(|w| self.compile_groups(w, query))?;
        w.phase(|w| self.compile_having(w, query))?;
        w.phase(|w| self.compile_orders(w, query))?;
        if with_limit {
            w.phase(|w| self.compile_limit(w, query))?;
        }
        w.phase(|w| self.compile_combines(w, query))
    }

    /// The effective paging of `query` for this compiler's engine.
    pub(crate) fn pagination(&self, query: &Query) -> Pagination {
        let engine = self.engine();
        Pagination {
            limit: query.get_limit(engine),
            offset: query.get_offset(engine),
            has_order: query.has_component(Component::Order, engine),
        }
    }

    // ── Columns ──────────────────────────────────────────────────────

    fn compile_columns(&self, w: &mut Writer<'_>, query: &Query) -> QuarryResult<()> {
        let engine = self.engine();
        w.append("SELECT ");

        if let Some(clause) = query.one_component(Component::Aggregate, engine) {
            let ClauseNode::Aggregate(aggregate) = &clause.node else {
                return Err(clause.node.mismatch(Component::Aggregate));
            };
            if let [column] = aggregate.columns.as_slice() {
                w.append_keyword(&aggregate.function);
                w.append("(");
                if query.is_distinct() {
                    w.append("DISTINCT ");
                }
                w.append_name(column);
                w.append(")");
                w.append_as_alias(&aggregate.function);
            } else {
                // Multi-column aggregates are wrapped by the aggregate
                // rewrite; the inner query only needs to produce rows.
                w.append("1");
            }
            return Ok(());
        }

        if query.is_distinct() {
            w.append("DISTINCT ");
        }
        let columns = query.components(Component::Select, engine);
        if columns.is_empty() {
            w.append("*");
            return Ok(());
        }
        w.list(", ", columns, |w, clause| self.compile_column(w, query, clause))
    }

    fn compile_column(
        &self,
        w: &mut Writer<'_>,
        scope: &Query,
        clause: &Clause,
    ) -> QuarryResult<()> {
        let ClauseNode::Column(column) = &clause.node else {
            return Err(clause.node.mismatch(Component::Select));
        };
        match column {
            ColumnClause::Column { name } => {
                w.append_name(name);
                Ok(())
            }
            ColumnClause::Raw {
                expression,
                bindings,
            } => w.append_raw(expression, bindings),
            ColumnClause::Query { query } => {
                w.append("(");
                self.compile_select(w, query)?;
                w.append(")");
                if let Some(alias) = query.alias().filter(|a| !a.is_empty()) {
                    w.append_as_alias(alias);
                }
                Ok(())
            }
            ColumnClause::Aggregated {
                aggregate,
                column,
                filter,
            } => self.compile_aggregated_column(w, scope, aggregate, column, filter.as_deref()),
        }
    }

    /// `AGG(col) [FILTER (WHERE ...)] AS alias`, or the `CASE WHEN` form on
    /// dialects without `FILTER`.
    fn compile_aggregated_column(
        &self,
        w: &mut Writer<'_>,
        scope: &Query,
        aggregate: &str,
        column: &str,
        filter: Option<&Query>,
    ) -> QuarryResult<()> {
        let wrapped = w.escaper().wrap(column);
        let (column, alias) = w.escaper().split_alias(&wrapped);
        let conditions = match filter {
            Some(filter) => self.conditions_of(filter, Component::Where)?,
            None => Vec::new(),
        };
        let filter = w.frame(|w| self.compile_conditions(w, scope, &conditions))?;

        w.append_keyword(aggregate);
        if filter.is_empty() {
            w.append("(");
            w.append(&column);
            w.append(")");
        } else if self.config().supports_filter_clause {
            w.append("(");
            w.append(&column);
            w.append(") FILTER (WHERE ");
            w.splice(filter);
            w.append(")");
        } else {
            w.append("(CASE WHEN ");
            w.splice(filter);
            w.append(" THEN ");
            w.append(&column);
            w.append(" END)");
        }
        if let Some(alias) = alias {
            w.append(&alias);
        }
        Ok(())
    }

    // ── From / joins ─────────────────────────────────────────────────

    fn compile_from(&self, w: &mut Writer<'_>, query: &Query) -> QuarryResult<()> {
        let Some(clause) = query.one_component(Component::From, self.engine()) else {
            return Ok(());
        };
        let ClauseNode::From(from) = &clause.node else {
            return Err(clause.node.mismatch(Component::From));
        };
        w.append("FROM ");
        self.compile_table_expression(w, from)
    }

    /// Renders a table, a parenthesized sub-query with its alias, or raw SQL.
    pub(crate) fn compile_table_expression(
        &self,
        w: &mut Writer<'_>,
        from: &FromClause,
    ) -> QuarryResult<()> {
        match from {
            FromClause::Table { table } => {
                w.append_table(table);
                Ok(())
            }
            FromClause::Query { query } => {
                w.append("(");
                self.compile_select(w, query)?;
                w.append(")");
                if let Some(alias) = query.alias().filter(|a| !a.is_empty()) {
                    w.append_table_alias(alias);
                }
                Ok(())
            }
            FromClause::Raw {
                expression,
                bindings,
                ..
            } => w.append_raw(expression, bindings),
            FromClause::AdHoc { .. } => Err(QuarryError::invalid_clause(
                from.kind_name(),
                "TableExpression",
            )),
        }
    }

    pub(crate) fn compile_joins(&self, w: &mut Writer<'_>, query: &Query) -> QuarryResult<()> {
        let joins = query.components(Component::Join, self.engine());
        if joins.is_empty() {
            return Ok(());
        }
        w.whitespace();
        w.append("\n");
        w.list("\n", joins, |w, clause| match &clause.node {
            ClauseNode::Join(join) => self.compile_join(w, query, join),
            other => Err(other.mismatch(Component::Join)),
        })
    }

    fn compile_join(&self, w: &mut Writer<'_>, scope: &Query, join: &Join) -> QuarryResult<()> {
        let inner = join.inner();
        let from = match inner.one_component(Component::From, self.engine()).map(|c| &c.node) {
            Some(ClauseNode::From(from)) => from,
            Some(other) => return Err(other.mismatch(Component::Join)),
            None => return Err(QuarryError::invalid_operation("No table set to join")),
        };
        let conditions = self.conditions_of(inner, Component::Where)?;

        w.append_keyword(&join.join_type);
        w.append(" ");
        self.compile_table_expression(w, from)?;

        let on = w.frame(|w| self.compile_conditions(w, scope, &conditions))?;
        if !on.is_empty() {
            w.append(" ON ");
            w.splice(on);
        }
        Ok(())
    }

    // ── Where / group / having ───────────────────────────────────────

    pub(crate) fn compile_wheres(&self, w: &mut Writer<'_>, query: &Query) -> QuarryResult<()> {
        self.compile_condition_section(w, query, Component::Where, "WHERE ")
    }

    fn compile_having(&self, w: &mut Writer<'_>, query: &Query) -> QuarryResult<()> {
        self.compile_condition_section(w, query, Component::Having, "HAVING ")
    }

    fn compile_condition_section(
        &self,
        w: &mut Writer<'_>,
        query: &Query,
        component: Component,
        keyword: &str,
    ) -> QuarryResult<()> {
        let conditions = self.conditions_of(query, component)?;
        if conditions.is_empty() {
            return Ok(());
        }
        let body = w.frame(|w| self.compile_conditions(w, query, &conditions))?;
        if !body.is_empty() {
            w.append(keyword);
            w.splice(body);
        }
        Ok(())
    }

    fn compile_groups(&self, w: &mut Writer<'_>, query: &Query) -> QuarryResult<()> {
        let groups = query.components(Component::Group, self.engine());
        if groups.is_empty() {
            return Ok(());
        }
        w.append("GROUP BY ");
        w.list(", ", groups, |w, clause| match &clause.node {
            ClauseNode::Group(GroupClause::Column { column }) => {
                w.append_name(column);
                Ok(())
            }
            ClauseNode::Group(GroupClause::Raw {
                expression,
                bindings,
            }) => w.append_raw(expression, bindings),
            other => Err(other.mismatch(Component::Group)),
        })
    }

    // ── Order / limit / combine ──────────────────────────────────────

    fn compile_orders(&self, w: &mut Writer<'_>, query: &Query) -> QuarryResult<()> {
        let orders = query.components(Component::Order, self.engine());
        if orders.is_empty() {
            return Ok(());
        }
        w.append("ORDER BY ");
        w.list(", ", orders, |w, clause| match &clause.node {
            ClauseNode::Order(OrderClause::Column { column, ascending }) => {
                w.append_name(column);
                if !ascending {
                    w.append(" DESC");
                }
                Ok(())
            }
            ClauseNode::Order(OrderClause::Raw {
                expression,
                bindings,
            }) => w.append_raw(expression, bindings),
            ClauseNode::Order(OrderClause::Random { .. }) => {
                w.append(&self.config().random_function);
                Ok(())
            }
            other => Err(other.mismatch(Component::Order)),
        })
    }

    fn compile_limit(&self, w: &mut Writer<'_>, query: &Query) -> QuarryResult<()> {
        let page = self.pagination(query);
        if page.limit == 0 && page.offset == 0 {
            return Ok(());
        }
        self.dialect.compile_limit(w, page)
    }

    fn compile_combines(&self, w: &mut Writer<'_>, query: &Query) -> QuarryResult<()> {
        let combines = query.components(Component::Combine, self.engine());
        w.list(" ", combines, |w, clause| match &clause.node {
            ClauseNode::Combine(CombineClause::Query {
                operation,
                all,
                query,
            }) => {
                w.append_keyword(operation);
                w.append(" ");
                if *all {
                    w.append("ALL ");
                }
                self.compile_select(w, query)
            }
            ClauseNode::Combine(CombineClause::Raw {
                expression,
                bindings,
            }) => w.append_raw(expression, bindings),
            other => Err(other.mismatch(Component::Combine)),
        })
    }

    // ── Aggregate rewrite ────────────────────────────────────────────

    /// Prepares an aggregate query for rendering.
    ///
    /// Limit, order and group clauses are dropped. A single-column,
    /// non-distinct aggregate is rendered flat; otherwise the query is
    /// wrapped as `SELECT AGG(*) FROM (inner) AS aggQuery`, where the inner
    /// query selects the distinct columns or filters out their NULLs.
    pub(crate) fn rewrite_aggregate(&self, query: &Query) -> Query {
        let query = query
            .clone()
            .clear_component(Component::Limit)
            .clear_component(Component::Order)
            .clear_component(Component::Group);

        let aggregate = match query
            .one_component(Component::Aggregate, self.engine())
            .map(|c| &c.node)
        {
            Some(ClauseNode::Aggregate(aggregate)) => aggregate.clone(),
            _ => return query,
        };
        if aggregate.columns.len() == 1 && !query.is_distinct() {
            return query;
        }

        let columns: Vec<&str> = aggregate.columns.iter().map(String::as_str).collect();
        let inner = if query.is_distinct() {
            query
                .clear_component(Component::Aggregate)
                .clear_component(Component::Select)
                .select(&columns)
        } else {
            columns
                .iter()
                .fold(query, |inner, column| inner.where_not_null(column))
        };
        tracing::trace!(
            function = %aggregate.function,
            columns = columns.len(),
            "wrapping aggregate query"
        );
        Query::default()
            .as_aggregate(&aggregate.function, &["*"])
            .from_query_as(inner, &format!("{}Query", aggregate.function))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::compiler::dialect::{Dialect, DialectConfig};
    use crate::query::clauses::Engine;
    use crate::value::Value;

    #[derive(Debug)]
    struct Plain;

    impl Dialect for Plain {
        fn engine(&self) -> Engine {
            Engine::Generic
        }

        fn config(&self) -> DialectConfig {
            DialectConfig::default()
        }
    }

    fn raw(query: &Query) -> (String, Vec<Value>) {
        let compiled = SqlCompiler::new(Plain).compile(query).unwrap();
        (compiled.raw_sql().to_string(), compiled.bindings().to_vec())
    }

    #[test]
    fn test_select_star() {
        assert_eq!(raw(&Query::new("users")).0, "SELECT * FROM \"users\"");
    }

    #[test]
    fn test_select_without_from() {
        assert_eq!(raw(&Query::default().select_raw("1", Vec::new())).0, "SELECT 1");
    }

    #[test]
    fn test_phase_order() {
        let query = Query::new("orders")
            .select(&["customer_id"])
            .select_count("id as total")
            .where_op("amount", ">", 10)
            .group_by(&["customer_id"])
            .having("total", ">", 2)
            .order_by_desc(&["total"])
            .limit(5);
        let (sql, bindings) = raw(&query);
        assert_eq!(
            sql,
            "SELECT \"customer_id\", COUNT(\"id\") AS \"total\" FROM \"orders\" \
             WHERE \"amount\" > ? GROUP BY \"customer_id\" HAVING \"total\" > ? \
             ORDER BY \"total\" DESC LIMIT ?"
        );
        assert_eq!(bindings, vec![Value::Int(10), Value::Int(2), Value::Int(5)]);
    }

    #[test]
    fn test_filtered_aggregate_uses_case_when_without_filter_support() {
        let query = Query::new("t").select_aggregate(
            "sum",
            "amount as paid",
            Some(Query::default().where_eq("status", "paid")),
        );
        assert_eq!(
            raw(&query).0,
            "SELECT SUM(CASE WHEN \"status\" = ? THEN \"amount\" END) AS \"paid\" FROM \"t\""
        );
    }

    #[test]
    fn test_aggregated_column_with_non_ascii_alias() {
        let query = Query::new("t").select_aggregate("sum", "İİ as é", None);
        assert_eq!(raw(&query).0, "SELECT SUM(\"İİ\") AS \"é\" FROM \"t\"");
    }

    #[test]
    fn test_query_column_and_from_query() {
        let sub = Query::new("orders").select_count("*");
        let query = Query::default()
            .select_query(sub, "n")
            .from_query_as(Query::new("users").where_eq("id", 3), "u");
        assert_eq!(
            raw(&query).0,
            "SELECT (SELECT COUNT(*) FROM \"orders\") AS \"n\" \
             FROM (SELECT * FROM \"users\" WHERE \"id\" = ?) AS \"u\""
        );
    }

    #[test]
    fn test_random_order_uses_dialect_function() {
        let query = Query::new("t").order_by_random(None);
        assert_eq!(raw(&query).0, "SELECT * FROM \"t\" ORDER BY RANDOM()");
    }

    #[test]
    fn test_union_is_rendered_last() {
        let query = Query::new("a")
            .union_all(Query::new("b").where_eq("x", 1))
            .unwrap()
            .where_eq("y", 2);
        let (sql, bindings) = raw(&query);
        assert_eq!(
            sql,
            "SELECT * FROM \"a\" WHERE \"y\" = ? UNION ALL SELECT * FROM \"b\" WHERE \"x\" = ?"
        );
        assert_eq!(bindings, vec![Value::Int(2), Value::Int(1)]);
    }

    #[test]
    fn test_flat_aggregate() {
        let query = Query::new("t").order_by(&["a"]).limit(3).as_min("a");
        let (sql, bindings) = raw(&query);
        assert_eq!(sql, "SELECT MIN(\"a\") AS \"min\" FROM \"t\"");
        assert!(bindings.is_empty());
    }

    #[test]
    fn test_multi_column_count_is_wrapped() {
        let query = Query::new("t").as_count(&["a", "b"]);
        assert_eq!(
            raw(&query).0,
            "SELECT COUNT(*) AS \"count\" FROM (SELECT 1 FROM \"t\" \
             WHERE \"a\" IS NOT NULL AND \"b\" IS NOT NULL) AS \"countQuery\""
        );
    }

    #[test]
    fn test_distinct_count_selects_columns_inside() {
        let query = Query::new("t").distinct().as_count(&["a"]);
        assert_eq!(
            raw(&query).0,
            "SELECT COUNT(*) AS \"count\" FROM (SELECT DISTINCT \"a\" FROM \"t\") AS \"countQuery\""
        );
    }

    #[test]
    fn test_ad_hoc_table_is_rejected_as_from() {
        let from = FromClause::AdHoc {
            alias: "v".into(),
            columns: vec!["a".into()],
            rows: vec![vec![Value::Int(1)]],
        };
        let query = Query::default().add_component(Component::From, ClauseNode::From(from));
        let err = SqlCompiler::new(Plain).compile(&query).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid type \"AdHocTableFromClause\" provided for the \"TableExpression\" clause."
        );
    }
}
