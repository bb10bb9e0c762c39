//! The query container and its fluent builder.
//!
//! A [`Query`] is a mutable, ordered list of clauses plus a handful of flags
//! (method, distinct, alias), a variable map, and an optional parent used
//! only for variable lookup. Builder methods take `self` by value and return
//! the updated query so calls chain:
//!
//! ```
//! use quarry_query::query::Query;
//!
//! let query = Query::new("users")
//!     .select(&["id", "name"])
//!     .where_eq("active", true)
//!     .order_by_desc(&["created_at"])
//!     .limit(10);
//! assert!(query.has_clauses());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use quarry_core::{QuarryError, QuarryResult};

use super::clauses::{
    AggregateClause, Clause, ClauseNode, ColumnClause, CombineClause, Component, Engine,
    FromClause, GroupClause, InsertClause, InsertRow, Join, OrderClause, UpdateClause,
};
use crate::value::{Operand, Value};

/// What a query compiles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Select,
    Aggregate,
    Insert,
    Update,
    Delete,
}

/// A SQL query under construction.
#[derive(Debug, Default)]
pub struct Query {
    clauses: Vec<Arc<Clause>>,
    method: Method,
    distinct: bool,
    alias: Option<String>,
    variables: HashMap<String, Value>,
    parent: Option<Arc<Query>>,
    engine_scope: Option<Engine>,
    or_flag: bool,
    not_flag: bool,
}

/// Copies the clause list, parent, alias, distinct flag, method and
/// variables. Clause nodes are shared, and pending `or()`/`not()` flags and
/// the engine scope are not carried over.
impl Clone for Query {
    fn clone(&self) -> Self {
        Self {
            clauses: self.clauses.clone(),
            method: self.method,
            distinct: self.distinct,
            alias: self.alias.clone(),
            variables: self.variables.clone(),
            parent: self.parent.clone(),
            engine_scope: None,
            or_flag: false,
            not_flag: false,
        }
    }
}

impl Query {
    /// Creates a select query over `table`.
    pub fn new(table: &str) -> Self {
        Self::default().from(table)
    }

    // ── Container accessors ──────────────────────────────────────────

    /// All clauses, in insertion order.
    pub fn clauses(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter().map(AsRef::as_ref)
    }

    /// Returns `true` if any clause has been added.
    pub fn has_clauses(&self) -> bool {
        !self.clauses.is_empty()
    }

    /// The clauses of `component` that apply to `engine`, in insertion order.
    pub fn components(&self, component: Component, engine: Engine) -> Vec<&Clause> {
        self.clauses()
            .filter(|c| c.component == component && c.applies_to(engine))
            .collect()
    }

    /// The single clause of `component` for `engine`.
    ///
    /// A clause tagged with exactly `engine` wins over an untagged one.
    pub fn one_component(&self, component: Component, engine: Engine) -> Option<&Clause> {
        let mut fallback = None;
        for clause in self.clauses().filter(|c| c.component == component) {
            match clause.engine {
                Some(e) if e == engine => return Some(clause),
                None if fallback.is_none() => fallback = Some(clause),
                _ => {}
            }
        }
        fallback
    }

    /// Returns `true` if a clause of `component` applies to `engine`.
    pub fn has_component(&self, component: Component, engine: Engine) -> bool {
        self.clauses()
            .any(|c| c.component == component && c.applies_to(engine))
    }

    /// Appends a clause, tagged with the current engine scope.
    pub fn add_component(mut self, component: Component, node: ClauseNode) -> Self {
        self.push(component, node);
        self
    }

    /// Replaces the clauses of `component` in the current engine scope.
    pub fn add_or_replace_component(mut self, component: Component, node: ClauseNode) -> Self {
        let scope = self.engine_scope;
        self.clauses
            .retain(|c| !(c.component == component && c.engine == scope));
        self.push(component, node);
        self
    }

    /// Removes every clause of `component`, whatever its engine.
    pub fn clear_component(mut self, component: Component) -> Self {
        self.clauses.retain(|c| c.component != component);
        self
    }

    fn push(&mut self, component: Component, node: ClauseNode) {
        self.clauses.push(Arc::new(Clause {
            component,
            engine: self.engine_scope,
            node,
        }));
    }

    /// What this query compiles to.
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Returns `true` for `SELECT DISTINCT`.
    pub const fn is_distinct(&self) -> bool {
        self.distinct
    }

    /// The alias used when this query is nested (as a table, column or CTE).
    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The parent used as a variable-lookup fallback.
    pub fn parent(&self) -> Option<&Query> {
        self.parent.as_deref()
    }

    /// The effective `LIMIT` for `engine`, `0` meaning none.
    pub fn get_limit(&self, engine: Engine) -> u64 {
        match self.one_component(Component::Limit, engine).map(|c| &c.node) {
            Some(ClauseNode::Limit(n)) => *n,
            _ => 0,
        }
    }

    /// The effective `OFFSET` for `engine`, `0` meaning none.
    pub fn get_offset(&self, engine: Engine) -> u64 {
        match self.one_component(Component::Offset, engine).map(|c| &c.node) {
            Some(ClauseNode::Offset(n)) => *n,
            _ => 0,
        }
    }

    /// Looks up a variable on this query, then on each parent in turn.
    pub fn find_variable(&self, name: &str) -> QuarryResult<&Value> {
        let mut current = Some(self);
        while let Some(query) = current {
            if let Some(value) = query.variables.get(name) {
                return Ok(value);
            }
            current = query.parent();
        }
        Err(QuarryError::VariableNotFound(name.to_string()))
    }

    /// Every variable visible from this query. Definitions nearer to this
    /// query shadow those of its parents.
    pub(crate) fn visible_variables(&self) -> HashMap<String, Value> {
        let mut chain = Vec::new();
        let mut current = Some(self);
        while let Some(query) = current {
            chain.push(query);
            current = query.parent();
        }
        chain
            .into_iter()
            .rev()
            .flat_map(|query| query.variables.iter())
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }

    /// Defines a variable that [`Operand::Variable`] references resolve to.
    pub fn define(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.variables.insert(name.to_string(), value.into());
        self
    }

    /// Creates an empty query whose parent is this query.
    pub fn new_child(&self) -> Self {
        Self {
            parent: Some(Arc::new(self.clone())),
            engine_scope: self.engine_scope,
            ..Self::default()
        }
    }

    /// Gives a sub-query this query as its parent unless it already has one.
    pub(crate) fn adopt(&self, mut query: Self) -> Self {
        if query.parent.is_none() {
            query.parent = Some(Arc::new(self.clone()));
        }
        query
    }

    // ── Pending flags ────────────────────────────────────────────────

    /// Makes the next condition `OR`-combined.
    pub fn or(mut self) -> Self {
        self.or_flag = true;
        self
    }

    /// Makes the next condition `AND`-combined.
    pub fn and(mut self) -> Self {
        self.or_flag = false;
        self
    }

    /// Sets whether the next condition is negated.
    pub fn not(mut self, flag: bool) -> Self {
        self.not_flag = flag;
        self
    }

    /// Reads and clears the pending `or()` flag.
    pub(crate) fn take_or(&mut self) -> bool {
        std::mem::take(&mut self.or_flag)
    }

    /// Reads and clears the pending `not()` flag.
    pub(crate) fn take_not(&mut self) -> bool {
        std::mem::take(&mut self.not_flag)
    }

    /// Adds clauses that only apply when compiling for `engine`.
    pub fn for_engine(mut self, engine: Engine, build: impl FnOnce(Self) -> Self) -> Self {
        let previous = self.engine_scope.replace(engine);
        let mut query = build(self);
        query.engine_scope = previous;
        query
    }

    /// Applies `build` only when `condition` holds.
    pub fn when(self, condition: bool, build: impl FnOnce(Self) -> Self) -> Self {
        if condition {
            build(self)
        } else {
            self
        }
    }

    // ── Select ───────────────────────────────────────────────────────

    /// Sets the alias used when this query is nested.
    pub fn as_alias(mut self, alias: &str) -> Self {
        self.alias = Some(alias.to_string());
        self
    }

    /// Selects the given columns. Names may be dotted and `"col as alias"`.
    pub fn select(mut self, columns: &[&str]) -> Self {
        self.method = Method::Select;
        for column in columns {
            self.push(
                Component::Select,
                ClauseNode::Column(ColumnClause::Column {
                    name: (*column).to_string(),
                }),
            );
        }
        self
    }

    /// Selects a raw expression.
    pub fn select_raw(mut self, expression: &str, bindings: Vec<Value>) -> Self {
        self.method = Method::Select;
        self.add_component(
            Component::Select,
            ClauseNode::Column(ColumnClause::Raw {
                expression: expression.to_string(),
                bindings,
            }),
        )
    }

    /// Selects a sub-query as a column named `alias`.
    pub fn select_query(mut self, query: Self, alias: &str) -> Self {
        self.method = Method::Select;
        let query = self.adopt(query).as_alias(alias);
        self.add_component(
            Component::Select,
            ClauseNode::Column(ColumnClause::Query {
                query: Box::new(query),
            }),
        )
    }

    /// Selects `AGGREGATE(column)`, optionally filtered by the WHERE
    /// conditions of `filter`.
    pub fn select_aggregate(mut self, aggregate: &str, column: &str, filter: Option<Self>) -> Self {
        self.method = Method::Select;
        let filter = filter.map(|f| Box::new(self.adopt(f)));
        self.add_component(
            Component::Select,
            ClauseNode::Column(ColumnClause::Aggregated {
                aggregate: aggregate.to_string(),
                column: column.to_string(),
                filter,
            }),
        )
    }

    /// Selects `COUNT(column)`.
    pub fn select_count(self, column: &str) -> Self {
        self.select_aggregate("count", column, None)
    }

    /// Selects `SUM(column)`.
    pub fn select_sum(self, column: &str) -> Self {
        self.select_aggregate("sum", column, None)
    }

    /// Selects `AVG(column)`.
    pub fn select_avg(self, column: &str) -> Self {
        self.select_aggregate("avg", column, None)
    }

    /// Selects `MIN(column)`.
    pub fn select_min(self, column: &str) -> Self {
        self.select_aggregate("min", column, None)
    }

    /// Selects `MAX(column)`.
    pub fn select_max(self, column: &str) -> Self {
        self.select_aggregate("max", column, None)
    }

    /// Makes this a `SELECT DISTINCT`.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    // ── From ─────────────────────────────────────────────────────────

    /// Sets the table to select from; `"table as alias"` is accepted.
    pub fn from(self, table: &str) -> Self {
        self.add_or_replace_component(
            Component::From,
            ClauseNode::From(FromClause::Table {
                table: table.to_string(),
            }),
        )
    }

    /// Selects from a sub-query, aliased by the sub-query's own alias.
    pub fn from_query(self, query: Self) -> Self {
        let query = self.adopt(query);
        self.add_or_replace_component(
            Component::From,
            ClauseNode::From(FromClause::Query {
                query: Box::new(query),
            }),
        )
    }

    /// Selects from a sub-query under `alias`.
    pub fn from_query_as(self, query: Self, alias: &str) -> Self {
        self.from_query(query.as_alias(alias))
    }

    /// Selects from a raw table expression.
    pub fn from_raw(self, expression: &str, bindings: Vec<Value>) -> Self {
        self.add_or_replace_component(
            Component::From,
            ClauseNode::From(FromClause::Raw {
                expression: expression.to_string(),
                bindings,
                alias: None,
            }),
        )
    }

    // ── Joins ────────────────────────────────────────────────────────

    /// Adds a prepared [`Join`].
    pub fn join_with(self, join: Join) -> Self {
        let join = Join {
            query: self.adopt(join.query),
            ..join
        };
        self.add_component(Component::Join, ClauseNode::Join(join))
    }

    /// `INNER JOIN table ON first = second`.
    pub fn join(self, table: &str, first: &str, second: &str) -> Self {
        self.join_with(Join::new(table).on(first, second, "="))
    }

    /// `LEFT JOIN table ON first = second`.
    pub fn left_join(self, table: &str, first: &str, second: &str) -> Self {
        self.join_with(Join::new(table).as_left().on(first, second, "="))
    }

    /// `RIGHT JOIN table ON first = second`.
    pub fn right_join(self, table: &str, first: &str, second: &str) -> Self {
        self.join_with(Join::new(table).as_right().on(first, second, "="))
    }

    /// `CROSS JOIN table`.
    pub fn cross_join(self, table: &str) -> Self {
        self.join_with(Join::new(table).as_cross())
    }

    /// Joins a sub-query; `on` builds the join's conditions, which are
    /// rendered as one parenthesized group.
    pub fn join_query(self, query: Self, on: impl FnOnce(Self) -> Self) -> Self {
        let join = Join::query(query);
        let conditions = join.query.new_child();
        self.join_with(join.on_where(|inner| inner.where_group(on(conditions))))
    }

    // ── Ordering / grouping ──────────────────────────────────────────

    /// Orders ascending by the given columns.
    pub fn order_by(mut self, columns: &[&str]) -> Self {
        for column in columns {
            self.push(
                Component::Order,
                ClauseNode::Order(OrderClause::Column {
                    column: (*column).to_string(),
                    ascending: true,
                }),
            );
        }
        self
    }

    /// Orders descending by the given columns.
    pub fn order_by_desc(mut self, columns: &[&str]) -> Self {
        for column in columns {
            self.push(
                Component::Order,
                ClauseNode::Order(OrderClause::Column {
                    column: (*column).to_string(),
                    ascending: false,
                }),
            );
        }
        self
    }

    /// Orders by a raw expression.
    pub fn order_by_raw(self, expression: &str, bindings: Vec<Value>) -> Self {
        self.add_component(
            Component::Order,
            ClauseNode::Order(OrderClause::Raw {
                expression: expression.to_string(),
                bindings,
            }),
        )
    }

    /// Orders randomly using the dialect's random function.
    pub fn order_by_random(self, seed: Option<&str>) -> Self {
        self.add_component(
            Component::Order,
            ClauseNode::Order(OrderClause::Random {
                seed: seed.map(ToString::to_string),
            }),
        )
    }

    /// Groups by the given columns.
    pub fn group_by(mut self, columns: &[&str]) -> Self {
        for column in columns {
            self.push(
                Component::Group,
                ClauseNode::Group(GroupClause::Column {
                    column: (*column).to_string(),
                }),
            );
        }
        self
    }

    /// Groups by a raw expression.
    pub fn group_by_raw(self, expression: &str, bindings: Vec<Value>) -> Self {
        self.add_component(
            Component::Group,
            ClauseNode::Group(GroupClause::Raw {
                expression: expression.to_string(),
                bindings,
            }),
        )
    }

    // ── Paging ───────────────────────────────────────────────────────

    /// Sets the row limit; negative values mean no limit.
    pub fn limit(self, value: i64) -> Self {
        let value = u64::try_from(value).unwrap_or(0);
        self.add_or_replace_component(Component::Limit, ClauseNode::Limit(value))
    }

    /// Sets the row offset; negative values mean no offset.
    pub fn offset(self, value: i64) -> Self {
        let value = u64::try_from(value).unwrap_or(0);
        self.add_or_replace_component(Component::Offset, ClauseNode::Offset(value))
    }

    /// Alias for [`Query::limit`].
    pub fn take(self, value: i64) -> Self {
        self.limit(value)
    }

    /// Alias for [`Query::offset`].
    pub fn skip(self, value: i64) -> Self {
        self.offset(value)
    }

    /// Selects page `page` (1-based) of `per_page` rows.
    pub fn for_page(self, page: i64, per_page: i64) -> Self {
        self.limit(per_page)
            .offset((page.max(1) - 1).saturating_mul(per_page))
    }

    // ── Common table expressions ─────────────────────────────────────

    /// Defines `alias AS (query)`.
    pub fn with(self, alias: &str, query: Self) -> Self {
        let query = self.adopt(query).as_alias(alias);
        self.add_component(
            Component::Cte,
            ClauseNode::From(FromClause::Query {
                query: Box::new(query),
            }),
        )
    }

    /// Defines a CTE from a query that already carries an alias.
    pub fn with_query(self, query: Self) -> QuarryResult<Self> {
        let alias = query
            .alias()
            .filter(|a| !a.is_empty())
            .map(ToString::to_string)
            .ok_or_else(|| {
                QuarryError::invalid_argument("No Alias found for the CTE query")
            })?;
        Ok(self.with(&alias, query))
    }

    /// Defines `alias AS (raw sql)`.
    pub fn with_raw(self, alias: &str, expression: &str, bindings: Vec<Value>) -> Self {
        self.add_component(
            Component::Cte,
            ClauseNode::From(FromClause::Raw {
                expression: expression.to_string(),
                bindings,
                alias: Some(alias.to_string()),
            }),
        )
    }

    /// Defines a CTE from literal rows:
    /// `alias AS (SELECT ? AS c1, ... UNION ALL SELECT ...)`.
    pub fn with_values(
        self,
        alias: &str,
        columns: &[&str],
        rows: Vec<Vec<Value>>,
    ) -> QuarryResult<Self> {
        if columns.is_empty() {
            return Err(QuarryError::invalid_argument(
                "Columns cannot be empty for an ad-hoc table",
            ));
        }
        if rows.is_empty() {
            return Err(QuarryError::invalid_argument(
                "Values cannot be empty for an ad-hoc table",
            ));
        }
        if rows.iter().any(|row| row.len() != columns.len()) {
            return Err(QuarryError::invalid_argument(
                "Columns count should be equal to each Values count",
            ));
        }
        Ok(self.add_component(
            Component::Cte,
            ClauseNode::From(FromClause::AdHoc {
                alias: alias.to_string(),
                columns: columns.iter().map(ToString::to_string).collect(),
                rows,
            }),
        ))
    }

    // ── Set operations ───────────────────────────────────────────────

    /// Appends `OPERATION [ALL] query`; both queries must be selects.
    pub fn combine(self, operation: &str, all: bool, query: Self) -> QuarryResult<Self> {
        if self.method != Method::Select || query.method != Method::Select {
            return Err(QuarryError::invalid_operation(
                "Only select queries can be combined.",
            ));
        }
        let query = self.adopt(query);
        Ok(self.add_component(
            Component::Combine,
            ClauseNode::Combine(CombineClause::Query {
                operation: operation.to_lowercase(),
                all,
                query: Box::new(query),
            }),
        ))
    }

    /// `UNION query`
    pub fn union(self, query: Self) -> QuarryResult<Self> {
        self.combine("union", false, query)
    }

    /// `UNION ALL query`
    pub fn union_all(self, query: Self) -> QuarryResult<Self> {
        self.combine("union", true, query)
    }

    /// `EXCEPT query`
    pub fn except(self, query: Self) -> QuarryResult<Self> {
        self.combine("except", false, query)
    }

    /// `EXCEPT ALL query`
    pub fn except_all(self, query: Self) -> QuarryResult<Self> {
        self.combine("except", true, query)
    }

    /// `INTERSECT query`
    pub fn intersect(self, query: Self) -> QuarryResult<Self> {
        self.combine("intersect", false, query)
    }

    /// `INTERSECT ALL query`
    pub fn intersect_all(self, query: Self) -> QuarryResult<Self> {
        self.combine("intersect", true, query)
    }

    /// Appends a raw set-operation expression, e.g. `UNION SELECT 1`.
    pub fn combine_raw(self, expression: &str, bindings: Vec<Value>) -> QuarryResult<Self> {
        if self.method != Method::Select {
            return Err(QuarryError::invalid_operation(
                "Only select queries can be combined.",
            ));
        }
        Ok(self.add_component(
            Component::Combine,
            ClauseNode::Combine(CombineClause::Raw {
                expression: expression.to_string(),
                bindings,
            }),
        ))
    }

    // ── Aggregates ───────────────────────────────────────────────────

    /// Turns this query into an aggregate over `columns`.
    pub fn as_aggregate(mut self, function: &str, columns: &[&str]) -> Self {
        self.method = Method::Aggregate;
        self.add_or_replace_component(
            Component::Aggregate,
            ClauseNode::Aggregate(AggregateClause {
                function: function.to_lowercase(),
                columns: columns.iter().map(ToString::to_string).collect(),
            }),
        )
    }

    /// `COUNT(*)`, or a count over the given columns.
    pub fn as_count(self, columns: &[&str]) -> Self {
        if columns.is_empty() {
            self.as_aggregate("count", &["*"])
        } else {
            self.as_aggregate("count", columns)
        }
    }

    /// `AVG(column)`
    pub fn as_avg(self, column: &str) -> Self {
        self.as_aggregate("avg", &[column])
    }

    /// `SUM(column)`
    pub fn as_sum(self, column: &str) -> Self {
        self.as_aggregate("sum", &[column])
    }

    /// `MIN(column)`
    pub fn as_min(self, column: &str) -> Self {
        self.as_aggregate("min", &[column])
    }

    /// `MAX(column)`
    pub fn as_max(self, column: &str) -> Self {
        self.as_aggregate("max", &[column])
    }

    // ── Insert / update / delete ─────────────────────────────────────

    /// Turns this query into a single-row insert.
    pub fn as_insert<K, V>(
        mut self,
        data: impl IntoIterator<Item = (K, V)>,
        return_id: bool,
    ) -> QuarryResult<Self>
    where
        K: Into<String>,
        V: Into<Operand>,
    {
        let (columns, values): (Vec<String>, Vec<Operand>) =
            data.into_iter().map(|(k, v)| (k.into(), v.into())).unzip();
        if columns.is_empty() {
            return Err(QuarryError::invalid_argument(
                "columns and values cannot be null or empty",
            ));
        }
        self.method = Method::Insert;
        let row = InsertRow {
            columns,
            values,
            return_id,
        };
        Ok(self
            .clear_component(Component::Insert)
            .add_component(Component::Insert, ClauseNode::Insert(InsertClause::Values(row))))
    }

    /// Turns this query into a multi-row insert.
    pub fn as_insert_many(
        mut self,
        columns: &[&str],
        rows: Vec<Vec<Operand>>,
    ) -> QuarryResult<Self> {
        if columns.is_empty() || rows.is_empty() {
            return Err(QuarryError::invalid_argument(
                "columns and values cannot be null or empty",
            ));
        }
        if rows.iter().any(|row| row.len() != columns.len()) {
            return Err(QuarryError::invalid_argument(
                "columns count should be equal to each Values count",
            ));
        }
        self.method = Method::Insert;
        let mut query = self.clear_component(Component::Insert);
        for values in rows {
            query = query.add_component(
                Component::Insert,
                ClauseNode::Insert(InsertClause::Values(InsertRow {
                    columns: columns.iter().map(ToString::to_string).collect(),
                    values,
                    return_id: false,
                })),
            );
        }
        Ok(query)
    }

    /// Turns this query into `INSERT INTO table (columns) <select>`.
    pub fn as_insert_query(mut self, columns: &[&str], query: Self) -> Self {
        self.method = Method::Insert;
        let query = self.adopt(query);
        self.add_or_replace_component(
            Component::Insert,
            ClauseNode::Insert(InsertClause::Query {
                columns: columns.iter().map(ToString::to_string).collect(),
                query: Box::new(query),
            }),
        )
    }

    /// Turns this query into an update of the given columns.
    pub fn as_update<K, V>(mut self, data: impl IntoIterator<Item = (K, V)>) -> QuarryResult<Self>
    where
        K: Into<String>,
        V: Into<Operand>,
    {
        let (columns, values): (Vec<String>, Vec<Operand>) =
            data.into_iter().map(|(k, v)| (k.into(), v.into())).unzip();
        if columns.is_empty() {
            return Err(QuarryError::invalid_argument(
                "columns and values cannot be null or empty",
            ));
        }
        self.method = Method::Update;
        Ok(self.add_or_replace_component(
            Component::Update,
            ClauseNode::Update(UpdateClause::Set { columns, values }),
        ))
    }

    /// Turns this query into `UPDATE ... SET column = column + amount`.
    pub fn as_increment(mut self, column: &str, amount: i64) -> Self {
        self.method = Method::Update;
        self.add_or_replace_component(
            Component::Update,
            ClauseNode::Update(UpdateClause::Increment {
                column: column.to_string(),
                amount,
            }),
        )
    }

    /// Turns this query into `UPDATE ... SET column = column - amount`.
    pub fn as_decrement(self, column: &str, amount: i64) -> Self {
        self.as_increment(column, amount.saturating_neg())
    }

    /// Turns this query into a delete.
    pub fn as_delete(mut self) -> Self {
        self.method = Method::Delete;
        self
    }
}
