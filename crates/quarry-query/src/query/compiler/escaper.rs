//! Identifier quoting.
//!
//! The [`Escaper`] turns column and table names into quoted identifiers for
//! one dialect: `users.name as n` becomes `"users"."name" AS "n"` with
//! double quotes, or `[users].[name] AS [n]` with brackets.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

static AS_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+as\s+").expect("valid regex"));

/// Quotes identifiers for one dialect.
#[derive(Debug, Clone)]
pub struct Escaper {
    open: String,
    close: String,
    column_as_keyword: String,
    table_as_keyword: String,
    reserved_words: Option<HashSet<String>>,
}

impl Escaper {
    /// Creates an escaper quoting with `open`/`close` and writing column
    /// aliases with `column_as_keyword` (e.g. `"AS "`).
    pub fn new(open: &str, close: &str, column_as_keyword: &str) -> Self {
        Self {
            open: open.to_string(),
            close: close.to_string(),
            column_as_keyword: column_as_keyword.to_string(),
            table_as_keyword: column_as_keyword.to_string(),
            reserved_words: None,
        }
    }

    /// Uses a different keyword before table aliases (empty on Oracle).
    #[must_use]
    pub fn with_table_as_keyword(mut self, keyword: &str) -> Self {
        self.table_as_keyword = keyword.to_string();
        self
    }

    /// Only quote identifiers that case-insensitively match one of `words`.
    #[must_use]
    pub fn with_reserved_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.reserved_words = Some(
            words
                .into_iter()
                .map(|w| w.as_ref().to_uppercase())
                .collect(),
        );
        self
    }

    /// The keyword written before column aliases.
    pub fn column_as_keyword(&self) -> &str {
        &self.column_as_keyword
    }

    /// The keyword written before table aliases.
    pub fn table_as_keyword(&self) -> &str {
        &self.table_as_keyword
    }

    /// Quotes a possibly dotted, possibly aliased name.
    ///
    /// `a.b as c` becomes `"a"."b" AS "c"`; `*` is left alone.
    pub fn wrap(&self, name: &str) -> String {
        self.wrap_with(name, &self.column_as_keyword)
    }

    /// Like [`Escaper::wrap`], but aliases use the table alias keyword.
    pub fn wrap_table(&self, name: &str) -> String {
        self.wrap_with(name, &self.table_as_keyword)
    }

    fn wrap_with(&self, name: &str, keyword: &str) -> String {
        if let Some(m) = AS_PATTERN.find(name) {
            let before = &name[..m.start()];
            let after = &name[m.end()..];
            return format!("{} {keyword}{}", self.wrap(before), self.wrap_value(after));
        }
        if name.contains('.') {
            return name
                .split('.')
                .map(|segment| self.wrap_value(segment))
                .collect::<Vec<_>>()
                .join(".");
        }
        self.wrap_value(name)
    }

    /// Quotes a single identifier segment, doubling embedded close quotes.
    pub fn wrap_value(&self, value: &str) -> String {
        if value == "*" {
            return value.to_string();
        }
        if let Some(words) = &self.reserved_words {
            if !words.contains(&value.to_uppercase()) {
                return value.to_string();
            }
        }
        if self.open.is_empty() && self.close.is_empty() {
            return value.to_string();
        }
        let doubled = format!("{}{}", self.close, self.close);
        format!("{}{}{}", self.open, value.replace(&self.close, &doubled), self.close)
    }

    /// Splits an already wrapped `expr AS alias` into the expression and
    /// the alias suffix (` AS alias`, leading space included).
    pub fn split_alias(&self, wrapped: &str) -> (String, Option<String>) {
        let lower = wrapped.to_ascii_lowercase();
        match lower.rfind(" as ") {
            Some(index) if index > 0 => {
                let before = wrapped[..index].to_string();
                let after = &wrapped[index + 4..];
                (before, Some(format!(" {}{after}", self.column_as_keyword)))
            }
            _ => (wrapped.to_string(), None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quotes() -> Escaper {
        Escaper::new("\"", "\"", "AS ")
    }

    fn brackets() -> Escaper {
        Escaper::new("[", "]", "AS ")
    }

    #[test]
    fn test_wrap_simple() {
        assert_eq!(quotes().wrap("name"), "\"name\"");
        assert_eq!(brackets().wrap("name"), "[name]");
    }

    #[test]
    fn test_wrap_dotted() {
        assert_eq!(quotes().wrap("users.name"), "\"users\".\"name\"");
        assert_eq!(quotes().wrap("users.*"), "\"users\".*");
    }

    #[test]
    fn test_wrap_alias_is_case_insensitive() {
        assert_eq!(quotes().wrap("users.name As n"), "\"users\".\"name\" AS \"n\"");
        assert_eq!(brackets().wrap("Users as u"), "[Users] AS [u]");
    }

    #[test]
    fn test_wrap_star() {
        assert_eq!(quotes().wrap("*"), "*");
    }

    #[test]
    fn test_wrap_value_doubles_close_quote() {
        assert_eq!(quotes().wrap_value("a\"b"), "\"a\"\"b\"");
        assert_eq!(brackets().wrap_value("a]b"), "[a]]b]");
    }

    #[test]
    fn test_wrap_table_uses_table_keyword() {
        let oracle = quotes().with_table_as_keyword("");
        assert_eq!(oracle.wrap_table("Users as u"), "\"Users\" \"u\"");
        assert_eq!(oracle.wrap("a as b"), "\"a\" AS \"b\"");
    }

    #[test]
    fn test_reserved_word_quoting() {
        let sqlite = quotes().with_reserved_words(["order", "group"]);
        assert_eq!(sqlite.wrap("order"), "\"order\"");
        assert_eq!(sqlite.wrap("Group"), "\"Group\"");
        assert_eq!(sqlite.wrap("users.name"), "users.name");
    }

    #[test]
    fn test_split_alias() {
        let escaper = quotes();
        let wrapped = escaper.wrap("s.a as q");
        assert_eq!(
            escaper.split_alias(&wrapped),
            ("\"s\".\"a\"".to_string(), Some(" AS \"q\"".to_string()))
        );
        assert_eq!(escaper.split_alias("\"a\""), ("\"a\"".to_string(), None));
    }

    #[test]
    fn test_split_alias_with_non_ascii_names() {
        let escaper = quotes();
        let wrapped = escaper.wrap("İİ as é");
        assert_eq!(wrapped, "\"İİ\" AS \"é\"");
        assert_eq!(
            escaper.split_alias(&wrapped),
            ("\"İİ\"".to_string(), Some(" AS \"é\"".to_string()))
        );
        assert_eq!(
            escaper.split_alias("\"\u{212A}x\" AS \"total\""),
            (
                "\"\u{212A}x\"".to_string(),
                Some(" AS \"total\"".to_string())
            )
        );
    }
}
