//! The clause data model.
//!
//! A [`Query`] is an ordered list of [`Clause`]s. Every clause carries the
//! [`Component`] it belongs to (the SQL section it renders into) and an
//! optional [`Engine`] tag; a tagged clause only applies when compiling for
//! that engine. The clause payload is a [`ClauseNode`], a closed set of
//! families that each SQL section knows how to render.
//!
//! Clauses are immutable once built and shared between clones of a query
//! through [`Arc`](std::sync::Arc).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use quarry_core::QuarryError;

use super::conditions::Condition;
use super::Query;
use crate::value::Value;

/// A database engine code.
///
/// Clauses can be scoped to one engine; each compiler reports the engine it
/// targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// Dialect-neutral SQL with double-quoted identifiers.
    Generic,
    /// Microsoft SQL Server.
    SqlServer,
    /// PostgreSQL.
    Postgres,
    /// MySQL / MariaDB.
    MySql,
    /// SQLite.
    Sqlite,
    /// Oracle.
    Oracle,
}

impl Engine {
    /// All known engines.
    pub const ALL: [Self; 6] = [
        Self::Generic,
        Self::SqlServer,
        Self::Postgres,
        Self::MySql,
        Self::Sqlite,
        Self::Oracle,
    ];

    /// The engine code, e.g. `"sqlserver"`.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::SqlServer => "sqlserver",
            Self::Postgres => "postgres",
            Self::MySql => "mysql",
            Self::Sqlite => "sqlite",
            Self::Oracle => "oracle",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Engine {
    type Err = QuarryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|engine| engine.code() == code)
            .ok_or_else(|| QuarryError::ConfigurationError(format!("Unknown engine code '{s}'")))
    }
}

/// The SQL section a clause renders into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Select,
    Aggregate,
    From,
    Join,
    Where,
    Group,
    Having,
    Order,
    Limit,
    Offset,
    Combine,
    Cte,
    Insert,
    Update,
}

impl Component {
    /// The lowercase section name used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Aggregate => "aggregate",
            Self::From => "from",
            Self::Join => "join",
            Self::Where => "where",
            Self::Group => "group",
            Self::Having => "having",
            Self::Order => "order",
            Self::Limit => "limit",
            Self::Offset => "offset",
            Self::Combine => "combine",
            Self::Cte => "cte",
            Self::Insert => "insert",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One entry in a query's clause list.
#[derive(Debug, Clone)]
pub struct Clause {
    /// The section this clause belongs to.
    pub component: Component,
    /// `None` applies to every engine.
    pub engine: Option<Engine>,
    /// The clause payload.
    pub node: ClauseNode,
}

impl Clause {
    /// Returns `true` if this clause applies when compiling for `engine`.
    pub fn applies_to(&self, engine: Engine) -> bool {
        self.engine.map_or(true, |e| e == engine)
    }
}

/// The payload of a clause.
#[derive(Debug, Clone)]
pub enum ClauseNode {
    Column(ColumnClause),
    From(FromClause),
    Join(Join),
    Condition(Condition),
    Order(OrderClause),
    Group(GroupClause),
    Limit(u64),
    Offset(u64),
    Combine(CombineClause),
    Aggregate(AggregateClause),
    Insert(InsertClause),
    Update(UpdateClause),
}

impl ClauseNode {
    /// The clause kind name, used when a section meets a clause it cannot render.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Column(c) => c.kind_name(),
            Self::From(f) => f.kind_name(),
            Self::Join(_) => "BaseJoin",
            Self::Condition(c) => c.kind.kind_name(),
            Self::Order(OrderClause::Column { .. }) => "OrderBy",
            Self::Order(OrderClause::Raw { .. }) => "RawOrderBy",
            Self::Order(OrderClause::Random { .. }) => "OrderByRandom",
            Self::Group(_) => "GroupBy",
            Self::Limit(_) => "LimitClause",
            Self::Offset(_) => "OffsetClause",
            Self::Combine(CombineClause::Query { .. }) => "Combine",
            Self::Combine(CombineClause::Raw { .. }) => "RawCombine",
            Self::Aggregate(_) => "AggregateClause",
            Self::Insert(InsertClause::Values(_)) => "InsertClause",
            Self::Insert(InsertClause::Query { .. }) => "InsertQueryClause",
            Self::Update(UpdateClause::Set { .. }) => "UpdateClause",
            Self::Update(UpdateClause::Increment { .. }) => "IncrementClause",
        }
    }

    pub(crate) fn mismatch(&self, component: Component) -> QuarryError {
        QuarryError::invalid_clause(self.kind_name(), component.name())
    }
}

// ── Columns ────────────────────────────────────────────────────────────

/// An entry in the select list.
#[derive(Debug, Clone)]
pub enum ColumnClause {
    /// A (possibly dotted, possibly aliased) column name.
    Column { name: String },
    /// Raw SQL with bindings.
    Raw { expression: String, bindings: Vec<Value> },
    /// A sub-query rendered as `(sub) AS alias`.
    Query { query: Box<Query> },
    /// `AGG(col)` with an optional `FILTER (WHERE ...)` condition list.
    Aggregated {
        aggregate: String,
        column: String,
        filter: Option<Box<Query>>,
    },
}

impl ColumnClause {
    const fn kind_name(&self) -> &'static str {
        match self {
            Self::Column { .. } => "Column",
            Self::Raw { .. } => "RawColumn",
            Self::Query { .. } => "QueryColumn",
            Self::Aggregated { .. } => "AggregatedColumn",
        }
    }
}

// ── From / CTE ─────────────────────────────────────────────────────────

/// A table expression, used by both the FROM section and CTE definitions.
#[derive(Debug, Clone)]
pub enum FromClause {
    /// A table name, optionally `"table as alias"`.
    Table { table: String },
    /// A sub-query; its alias is the sub-query's own alias.
    Query { query: Box<Query> },
    /// Raw SQL with bindings, named by `alias` when used as a CTE.
    Raw {
        expression: String,
        bindings: Vec<Value>,
        alias: Option<String>,
    },
    /// An inline table built from literal rows (CTE only).
    AdHoc {
        alias: String,
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
}

impl FromClause {
    pub(crate) const fn kind_name(&self) -> &'static str {
        match self {
            Self::Table { .. } => "FromClause",
            Self::Query { .. } => "QueryFromClause",
            Self::Raw { .. } => "RawFromClause",
            Self::AdHoc { .. } => "AdHocTableFromClause",
        }
    }

    /// The name this table expression is referred to by.
    ///
    /// For `"Users as u"` this is `u`; for a bare table it is the table
    /// name itself.
    pub fn alias(&self) -> Option<&str> {
        match self {
            Self::Table { table } => Some(split_as(table).map_or(table.as_str(), |(_, a)| a)),
            Self::Query { query } => query.alias(),
            Self::Raw { alias, .. } => alias.as_deref(),
            Self::AdHoc { alias, .. } => Some(alias),
        }
    }
}

/// Splits `"name as alias"` (case-insensitive `as`) at its last occurrence.
pub(crate) fn split_as(s: &str) -> Option<(&str, &str)> {
    let lower = s.to_ascii_lowercase();
    let index = lower.rfind(" as ")?;
    Some((s[..index].trim(), s[index + 4..].trim()))
}

// ── Joins ──────────────────────────────────────────────────────────────

/// A join: the joined table plus its `ON` conditions, both held by an
/// inner query (its FROM and WHERE sections).
#[derive(Debug, Clone)]
pub struct Join {
    pub(crate) join_type: String,
    pub(crate) query: Query,
}

impl Join {
    /// Starts an `INNER JOIN` against `table`.
    pub fn new(table: &str) -> Self {
        Self {
            join_type: "inner join".to_string(),
            query: Query::new(table),
        }
    }

    /// Starts an `INNER JOIN` against a sub-query.
    pub fn query(query: Query) -> Self {
        Self {
            join_type: "inner join".to_string(),
            query: Query::default().from_query(query),
        }
    }

    /// Sets the join type, e.g. `"left join"`.
    pub fn join_type(mut self, join_type: &str) -> Self {
        self.join_type = join_type.to_lowercase();
        self
    }

    /// Makes this an `INNER JOIN`.
    pub fn as_inner(self) -> Self {
        self.join_type("inner join")
    }

    /// Makes this a `LEFT JOIN`.
    pub fn as_left(self) -> Self {
        self.join_type("left join")
    }

    /// Makes this a `RIGHT JOIN`.
    pub fn as_right(self) -> Self {
        self.join_type("right join")
    }

    /// Makes this a `CROSS JOIN`.
    pub fn as_cross(self) -> Self {
        self.join_type("cross join")
    }

    /// Adds an `ON first op second` condition (AND-combined).
    pub fn on(mut self, first: &str, second: &str, op: &str) -> Self {
        self.query = self.query.where_columns(first, op, second);
        self
    }

    /// Adds an `OR first op second` condition.
    pub fn or_on(mut self, first: &str, second: &str, op: &str) -> Self {
        self.query = self.query.or().where_columns(first, op, second);
        self
    }

    /// Adds arbitrary conditions through the inner query's `WHERE` builder.
    pub fn on_where(mut self, build: impl FnOnce(Query) -> Query) -> Self {
        self.query = build(self.query);
        self
    }

    /// The upper-cased join keyword, e.g. `INNER JOIN`.
    pub fn keyword(&self) -> String {
        self.join_type.to_uppercase()
    }

    /// The inner query holding the joined table and the `ON` conditions.
    pub const fn inner(&self) -> &Query {
        &self.query
    }
}

// ── Ordering / grouping ────────────────────────────────────────────────

/// An entry in the ORDER BY list.
#[derive(Debug, Clone)]
pub enum OrderClause {
    Column { column: String, ascending: bool },
    Raw { expression: String, bindings: Vec<Value> },
    Random { seed: Option<String> },
}

/// An entry in the GROUP BY list.
#[derive(Debug, Clone)]
pub enum GroupClause {
    Column { column: String },
    Raw { expression: String, bindings: Vec<Value> },
}

// ── Set operations ─────────────────────────────────────────────────────

/// A `UNION` / `EXCEPT` / `INTERSECT` entry.
#[derive(Debug, Clone)]
pub enum CombineClause {
    Query {
        operation: String,
        all: bool,
        query: Box<Query>,
    },
    Raw { expression: String, bindings: Vec<Value> },
}

// ── Aggregates ─────────────────────────────────────────────────────────

/// The aggregate a query compiles to when its method is aggregate.
#[derive(Debug, Clone)]
pub struct AggregateClause {
    /// Lowercase function name, e.g. `count`.
    pub function: String,
    pub columns: Vec<String>,
}

// ── Insert / update ────────────────────────────────────────────────────

/// One row of an `INSERT ... VALUES` statement.
#[derive(Debug, Clone)]
pub struct InsertRow {
    pub columns: Vec<String>,
    pub values: Vec<crate::value::Operand>,
    pub return_id: bool,
}

/// The payload of an insert query.
#[derive(Debug, Clone)]
pub enum InsertClause {
    Values(InsertRow),
    Query { columns: Vec<String>, query: Box<Query> },
}

/// The payload of an update query.
#[derive(Debug, Clone)]
pub enum UpdateClause {
    Set {
        columns: Vec<String>,
        values: Vec<crate::value::Operand>,
    },
    /// `SET col = col + |amount|` (or `-` for negative amounts).
    Increment { column: String, amount: i64 },
}
