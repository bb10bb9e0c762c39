//! The extension points a SQL dialect provides.
//!
//! A dialect is a [`DialectConfig`] (quoting, keywords, literals, feature
//! flags) plus a few rendering hooks for the parts of SQL where engines
//! genuinely disagree: date-part predicates, `LIMIT`/`OFFSET`, and the
//! rows after the first in a multi-row insert. Every hook has a default
//! that produces the generic form.

use std::fmt;

use quarry_core::QuarryResult;

use super::writer::{Fragment, ResolvedOperand, Writer};
use crate::query::clauses::Engine;
use crate::value::Value;

/// Static configuration of a dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialectConfig {
    /// Opening identifier quote, e.g. `"` or `[`.
    pub open_quote: String,
    /// Closing identifier quote, e.g. `"` or `]`.
    pub close_quote: String,
    /// Keyword before column aliases, including its trailing space.
    pub column_as_keyword: String,
    /// Keyword before table aliases, including its trailing space.
    pub table_as_keyword: String,
    /// Prefix of named parameters, e.g. `@p`.
    pub parameter_prefix: String,
    /// Index of the first named parameter (`0` for `@p0`, `1` for `$1`).
    pub parameter_index_base: usize,
    /// Statement appended after a single-row insert that asked for its id.
    pub last_id: String,
    /// Keyword starting a single-row insert.
    pub insert_start: String,
    /// Keyword starting a multi-row insert.
    pub multi_insert_start: String,
    /// Literal for boolean true.
    pub true_literal: String,
    /// Literal for boolean false.
    pub false_literal: String,
    /// Aggregates support `FILTER (WHERE ...)`.
    pub supports_filter_clause: bool,
    /// Case-insensitive `LIKE` uses a native `ILIKE` instead of `LOWER()`.
    pub native_ilike: bool,
    /// Replace the select list inside `EXISTS` with `SELECT 1`.
    pub omit_select_inside_exists: bool,
    /// Table used for `SELECT` without a real table (e.g. `DUAL`).
    pub dummy_table: Option<String>,
    /// Paginate with the ROWNUM wrapper instead of the limit hook.
    pub legacy_pagination: bool,
    /// When set, only identifiers in this list are quoted.
    pub reserved_words: Option<Vec<String>>,
    /// Expression used by random ordering.
    pub random_function: String,
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self {
            open_quote: "\"".to_string(),
            close_quote: "\"".to_string(),
            column_as_keyword: "AS ".to_string(),
            table_as_keyword: "AS ".to_string(),
            parameter_prefix: "@p".to_string(),
            parameter_index_base: 0,
            last_id: String::new(),
            insert_start: "INSERT INTO".to_string(),
            multi_insert_start: "INSERT INTO".to_string(),
            true_literal: "true".to_string(),
            false_literal: "false".to_string(),
            supports_filter_clause: false,
            native_ilike: false,
            omit_select_inside_exists: true,
            dummy_table: None,
            legacy_pagination: false,
            reserved_words: None,
            random_function: "RANDOM()".to_string(),
        }
    }
}

/// A date-part predicate, ready to render.
#[derive(Debug, Clone, Copy)]
pub struct DatePredicate<'a> {
    /// Lowercase part name, e.g. `year` or `date`.
    pub part: &'a str,
    pub column: &'a str,
    /// Whitelist-checked operator.
    pub operator: &'a str,
    pub value: &'a ResolvedOperand,
    pub is_not: bool,
}

/// The effective paging of a select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// `0` means no limit.
    pub limit: u64,
    /// `0` means no offset.
    pub offset: u64,
    /// The select already has an ORDER BY.
    pub has_order: bool,
}

/// One resolved insert row.
#[derive(Debug, Clone)]
pub struct InsertValues<'a> {
    pub columns: &'a [String],
    pub values: Vec<ResolvedOperand>,
}

/// A SQL dialect.
pub trait Dialect: fmt::Debug + Send + Sync {
    /// The engine this dialect targets; engine-scoped clauses match on it.
    fn engine(&self) -> Engine;

    /// The dialect's default configuration.
    fn config(&self) -> DialectConfig;

    /// Renders a date-part predicate.
    fn compile_date_condition(
        &self,
        w: &mut Writer<'_>,
        date: &DatePredicate<'_>,
    ) -> QuarryResult<()> {
        compile_default_date_condition(w, date);
        Ok(())
    }

    /// Renders `LIMIT`/`OFFSET`; only called when one of them is non-zero.
    fn compile_limit(&self, w: &mut Writer<'_>, page: Pagination) -> QuarryResult<()> {
        compile_default_limit(w, page);
        Ok(())
    }

    /// Renders the rows after the first of a multi-row insert.
    ///
    /// `table` is the rendered target table.
    fn compile_remaining_inserts(
        &self,
        w: &mut Writer<'_>,
        table: &Fragment,
        rows: &[InsertValues<'_>],
    ) -> QuarryResult<()> {
        let _ = table;
        for row in rows {
            w.append(", (");
            w.list(", ", &row.values, |w, value| {
                w.append_operand(value);
                Ok(())
            })?;
            w.append(")");
        }
        Ok(())
    }
}

/// `[NOT (]PART(column) op value[)]`
pub fn compile_default_date_condition(w: &mut Writer<'_>, date: &DatePredicate<'_>) {
    if date.is_not {
        w.append("NOT (");
    }
    w.append_keyword(date.part);
    w.append("(");
    w.append_name(date.column);
    w.append(") ");
    w.append(date.operator);
    w.append(" ");
    w.append_operand(date.value);
    if date.is_not {
        w.append(")");
    }
}

/// `LIMIT ? OFFSET ?`, each part only when non-zero.
pub fn compile_default_limit(w: &mut Writer<'_>, page: Pagination) {
    if page.limit > 0 {
        w.append("LIMIT ");
        w.append_parameter(count_value(page.limit));
    }
    if page.offset > 0 {
        w.whitespace();
        w.append("OFFSET ");
        w.append_parameter(count_value(page.offset));
    }
}

/// `[ORDER BY (SELECT 0)] OFFSET ? ROWS [FETCH NEXT ? ROWS ONLY]`
///
/// `safe_order` is written first when the select has no ORDER BY, since
/// `OFFSET ... FETCH` requires one.
pub fn compile_offset_fetch(w: &mut Writer<'_>, page: Pagination, safe_order: &str) {
    if !page.has_order {
        w.append(safe_order);
        w.append(" ");
    }
    w.append("OFFSET ");
    w.append_parameter(count_value(page.offset));
    w.append(" ROWS");
    if page.limit > 0 {
        w.append(" FETCH NEXT ");
        w.append_parameter(count_value(page.limit));
        w.append(" ROWS ONLY");
    }
}

/// Converts a row count into a binding.
pub fn count_value(count: u64) -> Value {
    Value::Int(i64::try_from(count).unwrap_or(i64::MAX))
}
