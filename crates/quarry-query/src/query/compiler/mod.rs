//! SQL compilation.
//!
//! [`SqlCompiler`] turns a [`Query`] into a [`CompiledQuery`]: SQL text with
//! generic `?` placeholders, the same text with the dialect's named
//! parameters substituted, and the ordered bindings. Compiling never mutates
//! the query, so compiling twice (or compiling a clone) gives identical
//! output.
//!
//! Dialect differences live behind the [`Dialect`] trait; the compiler owns
//! everything engines agree on.

pub mod conditions;
pub mod cte;
pub mod dialect;
pub mod escaper;
pub mod operators;
pub mod pagination;
pub mod select;
pub mod statements;
pub mod writer;

use std::fmt;

use quarry_core::logging::compile_span;
use quarry_core::QuarryResult;

pub use dialect::{DatePredicate, Dialect, DialectConfig, InsertValues, Pagination};
pub use escaper::Escaper;
pub use operators::OperatorWhitelist;
pub use writer::{Fragment, ResolvedOperand, Writer};

use super::builder::{Method, Query};
use super::clauses::Engine;
use crate::value::{Operand, Value};

/// The output of a compile call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    raw_sql: String,
    sql: String,
    bindings: Vec<Value>,
    parameter_names: Vec<String>,
}

impl CompiledQuery {
    fn new(raw_sql: String, bindings: Vec<Value>, config: &DialectConfig) -> Self {
        let parameter_names: Vec<String> = (0..bindings.len())
            .map(|i| format!("{}{}", config.parameter_prefix, i + config.parameter_index_base))
            .collect();
        let sql = substitute_placeholders(&raw_sql, |i| parameter_names.get(i).cloned());
        Self {
            raw_sql,
            sql,
            bindings,
            parameter_names,
        }
    }

    /// SQL with generic `?` placeholders.
    pub fn raw_sql(&self) -> &str {
        &self.raw_sql
    }

    /// SQL with the dialect's named parameters, e.g. `@p0`.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bindings in placeholder order.
    pub fn bindings(&self) -> &[Value] {
        &self.bindings
    }

    /// The parameter name for each binding position.
    pub fn parameter_names(&self) -> &[String] {
        &self.parameter_names
    }

    /// `(name, value)` pairs in placeholder order.
    pub fn named_bindings(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.parameter_names
            .iter()
            .map(String::as_str)
            .zip(self.bindings.iter())
    }
}

/// Renders the SQL with every binding inlined as a literal.
///
/// For logging and tests only; never execute this text.
impl fmt::Display for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inlined = substitute_placeholders(&self.raw_sql, |i| {
            self.bindings.get(i).map(Value::to_sql_literal)
        });
        f.write_str(&inlined)
    }
}

/// Replaces the i-th `?` with `replacement(i)`; placeholders without a
/// replacement are left as `?`.
fn substitute_placeholders(sql: &str, replacement: impl Fn(usize) -> Option<String>) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut index = 0;
    for c in sql.chars() {
        if c == '?' {
            match replacement(index) {
                Some(text) => out.push_str(&text),
                None => out.push('?'),
            }
            index += 1;
        } else {
            out.push(c);
        }
    }
    out
}

/// Compiles queries for one dialect.
///
/// # Examples
///
/// ```
/// use quarry_query::query::{Query, SqlCompiler};
/// use quarry_query::query::compiler::dialect::{Dialect, DialectConfig};
/// use quarry_query::query::Engine;
///
/// #[derive(Debug)]
/// struct Generic;
///
/// impl Dialect for Generic {
///     fn engine(&self) -> Engine {
///         Engine::Generic
///     }
///     fn config(&self) -> DialectConfig {
///         DialectConfig::default()
///     }
/// }
///
/// let compiler = SqlCompiler::new(Generic);
/// let compiled = compiler.compile(&Query::new("users").where_eq("id", 1)).unwrap();
/// assert_eq!(compiled.sql(), "SELECT * FROM \"users\" WHERE \"id\" = @p0");
/// ```
#[derive(Debug)]
pub struct SqlCompiler {
    dialect: Box<dyn Dialect>,
    config: DialectConfig,
    escaper: Escaper,
    operators: OperatorWhitelist,
}

impl SqlCompiler {
    /// Creates a compiler using the dialect's default configuration.
    pub fn new(dialect: impl Dialect + 'static) -> Self {
        let config = dialect.config();
        Self::with_config(Box::new(dialect), config)
    }

    /// Creates a compiler with an explicit configuration.
    pub fn with_config(dialect: Box<dyn Dialect>, config: DialectConfig) -> Self {
        let mut escaper = Escaper::new(
            &config.open_quote,
            &config.close_quote,
            &config.column_as_keyword,
        )
        .with_table_as_keyword(&config.table_as_keyword);
        if let Some(words) = &config.reserved_words {
            escaper = escaper.with_reserved_words(words);
        }
        Self {
            dialect,
            config,
            escaper,
            operators: OperatorWhitelist::default(),
        }
    }

    /// Whitelists additional operators.
    #[must_use]
    pub fn with_operators<I, S>(mut self, operators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.operators.extend(operators);
        self
    }

    /// The engine this compiler targets.
    pub fn engine(&self) -> Engine {
        self.dialect.engine()
    }

    pub const fn config(&self) -> &DialectConfig {
        &self.config
    }

    pub const fn escaper(&self) -> &Escaper {
        &self.escaper
    }

    pub const fn operators(&self) -> &OperatorWhitelist {
        &self.operators
    }

    /// Compiles one query.
    pub fn compile(&self, query: &Query) -> QuarryResult<CompiledQuery> {
        let span = compile_span(self.engine().code());
        let _guard = span.enter();

        let mut w = Writer::new(&self.escaper);
        self.compile_statement(&mut w, query)?;
        let fragment = w.into_fragment();
        let compiled = CompiledQuery::new(fragment.sql, fragment.bindings, &self.config);
        tracing::debug!(
            method = ?query.method(),
            sql_len = compiled.sql.len(),
            bindings = compiled.bindings.len(),
            "compiled query"
        );
        Ok(compiled)
    }

    /// Compiles several queries into one batch separated by `;\n`.
    ///
    /// Parameter names are numbered across the whole batch.
    pub fn compile_many(&self, queries: &[Query]) -> QuarryResult<CompiledQuery> {
        let span = compile_span(self.engine().code());
        let _guard = span.enter();

        let mut w = Writer::new(&self.escaper);
        w.list(";\n", queries, |w, query| self.compile_statement(w, query))?;
        let fragment = w.into_fragment();
        tracing::debug!(queries = queries.len(), "compiled batch");
        Ok(CompiledQuery::new(fragment.sql, fragment.bindings, &self.config))
    }

    /// Renders a complete statement: CTE prefix, then the method's body.
    pub(crate) fn compile_statement(&self, w: &mut Writer<'_>, query: &Query) -> QuarryResult<()> {
        w.scoped(query.visible_variables(), |w| {
            self.compile_ctes(w, query)?;
            match query.method() {
                Method::Select => self.compile_select(w, query),
                Method::Aggregate => {
                    let rewritten = self.rewrite_aggregate(query);
                    self.compile_select(w, &rewritten)
                }
                Method::Insert => self.compile_insert(w, query),
                Method::Update => self.compile_update(w, query),
                Method::Delete => self.compile_delete(w, query),
            }
        })
    }

    /// Resolves an operand against `scope`: variables are looked up through
    /// the query's parent chain, then through the queries enclosing it in
    /// the statement being compiled. Literals pass through.
    pub(crate) fn resolve(
        &self,
        w: &Writer<'_>,
        scope: &Query,
        operand: &Operand,
    ) -> QuarryResult<ResolvedOperand> {
        match operand {
            Operand::Value(value) => Ok(ResolvedOperand::Parameter(value.clone())),
            Operand::Variable(name) => match scope.find_variable(name) {
                Ok(value) => Ok(ResolvedOperand::Parameter(value.clone())),
                Err(err) => w
                    .enclosing_variable(name)
                    .map(|value| ResolvedOperand::Parameter(value.clone()))
                    .ok_or(err),
            },
            Operand::Literal(sql) => Ok(ResolvedOperand::Literal(sql.clone())),
        }
    }
}
