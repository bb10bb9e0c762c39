//! The SQL text accumulator.
//!
//! A [`Writer`] appends SQL text and records one binding per generic `?`
//! placeholder, so the placeholder count always equals the binding count.
//! Nested SQL (sub-queries, condition groups) is rendered into a
//! [`Fragment`] with [`Writer::frame`] and spliced back in by the caller.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use quarry_core::{QuarryError, QuarryResult};

use super::escaper::Escaper;
use crate::value::Value;

static RAW_IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\d+)\}").expect("valid regex"));

/// An operand after variable resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedOperand {
    /// Bound as a `?` parameter.
    Parameter(Value),
    /// Written verbatim.
    Literal(String),
}

/// Rendered SQL text with its bindings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub sql: String,
    pub bindings: Vec<Value>,
}

impl Fragment {
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

/// Accumulates SQL text and bindings for one compile call.
#[derive(Debug)]
pub struct Writer<'a> {
    escaper: &'a Escaper,
    sql: String,
    bindings: Vec<Value>,
    scopes: Vec<HashMap<String, Value>>,
}

impl<'a> Writer<'a> {
    pub fn new(escaper: &'a Escaper) -> Self {
        Self {
            escaper,
            sql: String::new(),
            bindings: Vec::new(),
            scopes: Vec::new(),
        }
    }

    /// The escaper used for identifiers.
    pub const fn escaper(&self) -> &'a Escaper {
        self.escaper
    }

    /// The text written so far.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The bindings recorded so far.
    pub fn bindings(&self) -> &[Value] {
        &self.bindings
    }

    /// Consumes the writer, returning the text and the bindings.
    pub fn into_fragment(self) -> Fragment {
        Fragment {
            sql: self.sql,
            bindings: self.bindings,
        }
    }

    pub fn append(&mut self, text: &str) {
        self.sql.push_str(text);
    }

    /// Appends a keyword, upper-cased.
    pub fn append_keyword(&mut self, keyword: &str) {
        self.sql.push_str(&keyword.to_uppercase());
    }

    /// Appends a quoted, possibly dotted and aliased, column name.
    pub fn append_name(&mut self, name: &str) {
        let wrapped = self.escaper.wrap(name);
        self.sql.push_str(&wrapped);
    }

    /// Appends a quoted table name, aliased with the table alias keyword.
    pub fn append_table(&mut self, table: &str) {
        let wrapped = self.escaper.wrap_table(table);
        self.sql.push_str(&wrapped);
    }

    /// Appends a single quoted identifier segment.
    pub fn append_value(&mut self, identifier: &str) {
        let wrapped = self.escaper.wrap_value(identifier);
        self.sql.push_str(&wrapped);
    }

    /// Appends ` AS alias` using the column alias keyword.
    pub fn append_as_alias(&mut self, alias: &str) {
        let wrapped = self.escaper.wrap_value(alias);
        self.sql.push(' ');
        self.sql.push_str(self.escaper.column_as_keyword());
        self.sql.push_str(&wrapped);
    }

    /// Appends ` AS alias` using the table alias keyword.
    pub fn append_table_alias(&mut self, alias: &str) {
        let wrapped = self.escaper.wrap_value(alias);
        self.sql.push(' ');
        self.sql.push_str(self.escaper.table_as_keyword());
        self.sql.push_str(&wrapped);
    }

    /// Appends a `?` placeholder bound to `value`.
    pub fn append_parameter(&mut self, value: Value) {
        self.sql.push('?');
        self.bindings.push(value);
    }

    pub fn append_operand(&mut self, operand: &ResolvedOperand) {
        match operand {
            ResolvedOperand::Parameter(value) => self.append_parameter(value.clone()),
            ResolvedOperand::Literal(sql) => self.sql.push_str(sql),
        }
    }

    /// Appends raw SQL.
    ///
    /// Each `{N}` token is replaced by the N-th (zero-based) binding quoted
    /// as an identifier; the remaining bindings are recorded, in order, for
    /// the expression's own `?` placeholders.
    pub fn append_raw(&mut self, expression: &str, bindings: &[Value]) -> QuarryResult<()> {
        let mut used = vec![false; bindings.len()];
        let mut last = 0;
        for captures in RAW_IDENTIFIER.captures_iter(expression) {
            let (Some(token), Some(digits)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            let index: usize = digits.as_str().parse().map_err(|_| {
                QuarryError::invalid_argument(format!(
                    "Invalid identifier reference '{}' in raw expression",
                    token.as_str()
                ))
            })?;
            let name = bindings
                .get(index)
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    QuarryError::invalid_argument(format!(
                        "Identifier reference '{}' needs a string binding at position {index}",
                        token.as_str()
                    ))
                })?;
            self.sql.push_str(&expression[last..token.start()]);
            self.append_name(name);
            used[index] = true;
            last = token.end();
        }
        self.sql.push_str(&expression[last..]);
        self.bindings.extend(
            bindings
                .iter()
                .zip(used)
                .filter(|(_, used)| !used)
                .map(|(value, _)| value.clone()),
        );
        Ok(())
    }

    /// Appends a space unless the text is empty or already ends in whitespace.
    pub fn whitespace(&mut self) {
        if self
            .sql
            .chars()
            .last()
            .is_some_and(|c| !c.is_whitespace())
        {
            self.sql.push(' ');
        }
    }

    /// Runs one whitespace-separated section of a statement.
    ///
    /// A separating space is written before the section and removed again
    /// if the section wrote nothing.
    pub fn phase(
        &mut self,
        section: impl FnOnce(&mut Self) -> QuarryResult<()>,
    ) -> QuarryResult<()> {
        let mark = self.sql.len();
        self.whitespace();
        let start = self.sql.len();
        section(self)?;
        if self.sql.len() == start {
            self.sql.truncate(mark);
        }
        Ok(())
    }

    /// Renders `items` separated by `separator`.
    pub fn list<T>(
        &mut self,
        separator: &str,
        items: impl IntoIterator<Item = T>,
        mut render: impl FnMut(&mut Self, T) -> QuarryResult<()>,
    ) -> QuarryResult<()> {
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                self.sql.push_str(separator);
            }
            render(self, item)?;
        }
        Ok(())
    }

    /// Renders into a fresh buffer and returns what was written.
    ///
    /// The outer text and bindings are untouched until the caller splices
    /// the fragment back in.
    pub fn frame(
        &mut self,
        render: impl FnOnce(&mut Self) -> QuarryResult<()>,
    ) -> QuarryResult<Fragment> {
        let outer_sql = std::mem::take(&mut self.sql);
        let outer_bindings = std::mem::take(&mut self.bindings);
        let result = render(self);
        let fragment = Fragment {
            sql: std::mem::replace(&mut self.sql, outer_sql),
            bindings: std::mem::replace(&mut self.bindings, outer_bindings),
        };
        result.map(|()| fragment)
    }

    /// Runs `render` with `variables` pushed as the innermost enclosing
    /// scope.
    pub(crate) fn scoped<T>(
        &mut self,
        variables: HashMap<String, Value>,
        render: impl FnOnce(&mut Self) -> QuarryResult<T>,
    ) -> QuarryResult<T> {
        self.scopes.push(variables);
        let result = render(self);
        self.scopes.pop();
        result
    }

    /// Looks a variable up in the enclosing scopes, innermost first.
    pub fn enclosing_variable(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    /// Appends a fragment's text and bindings.
    pub fn splice(&mut self, fragment: Fragment) {
        self.sql.push_str(&fragment.sql);
        self.bindings.extend(fragment.bindings);
    }
}
