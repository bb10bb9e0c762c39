//! SQLite dialect.
//!
//! Identifiers are double-quoted. Booleans are `1`/`0`, aggregates support
//! `FILTER`, and date-part predicates go through `strftime`, compared as
//! text.

use quarry_core::QuarryResult;
use quarry_query::query::compiler::dialect::{
    compile_default_date_condition, compile_default_limit, count_value,
};
use quarry_query::query::compiler::{DatePredicate, Dialect, DialectConfig, Pagination, Writer};
use quarry_query::Engine;

use crate::base::negated;

/// Words that must be quoted when only reserved words are quoted.
pub const SQLITE_KEYWORDS: &[&str] = &[
    "ABORT", "ACTION", "ADD", "AFTER", "ALL", "ALTER", "ALWAYS", "ANALYZE", "AND", "AS",
    "ASC", "ATTACH", "AUTOINCREMENT", "BEFORE", "BEGIN", "BETWEEN", "BY", "CASCADE",
    "CASE", "CAST", "CHECK", "COLLATE", "COLUMN", "COMMIT", "CONFLICT", "CONSTRAINT",
    "CREATE", "CROSS", "CURRENT", "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP",
    "DATABASE", "DEFAULT", "DEFERRABLE", "DEFERRED", "DELETE", "DESC", "DETACH",
    "DISTINCT", "DO", "DROP", "EACH", "ELSE", "END", "ESCAPE", "EXCEPT", "EXCLUDE",
    "EXCLUSIVE", "EXISTS", "EXPLAIN", "FAIL", "FILTER", "FIRST", "FOLLOWING", "FOR",
    "FOREIGN", "FROM", "FULL", "GENERATED", "GLOB", "GROUP", "GROUPS", "HAVING", "IF",
    "IGNORE", "IMMEDIATE", "IN", "INDEX", "INDEXED", "INITIALLY", "INNER", "INSERT",
    "INSTEAD", "INTERSECT", "INTO", "IS", "ISNULL", "JOIN", "KEY", "LAST", "LEFT", "LIKE",
    "LIMIT", "MATCH", "MATERIALIZED", "NATURAL", "NO", "NOT", "NOTHING", "NOTNULL", "NULL",
    "NULLS", "OF", "OFFSET", "ON", "OR", "ORDER", "OTHERS", "OUTER", "OVER", "PARTITION",
    "PLAN", "PRAGMA", "PRECEDING", "PRIMARY", "QUERY", "RAISE", "RANGE", "RECURSIVE",
    "REFERENCES", "REGEXP", "REINDEX", "RELEASE", "RENAME", "REPLACE", "RESTRICT",
    "RETURNING", "RIGHT", "ROLLBACK", "ROW", "ROWS", "SAVEPOINT", "SELECT", "SET", "TABLE",
    "TEMP", "TEMPORARY", "THEN", "TIES", "TO", "TRANSACTION", "TRIGGER", "UNBOUNDED",
    "UNION", "UNIQUE", "UPDATE", "USING", "VACUUM", "VALUES", "VIEW", "VIRTUAL", "WHEN",
    "WHERE", "WINDOW", "WITH", "WITHOUT",
];

/// The SQLite dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

/// The `strftime` format for a date part, if SQLite has one.
fn strftime_format(part: &str) -> Option<&'static str> {
    match part {
        "date" => Some("%Y-%m-%d"),
        "time" => Some("%H:%M:%S"),
        "year" => Some("%Y"),
        "month" => Some("%m"),
        "day" => Some("%d"),
        "hour" => Some("%H"),
        "minute" => Some("%M"),
        _ => None,
    }
}

impl Dialect for SqliteDialect {
    fn engine(&self) -> Engine {
        Engine::Sqlite
    }

    fn config(&self) -> DialectConfig {
        DialectConfig {
            last_id: "select last_insert_rowid() as id".to_string(),
            true_literal: "1".to_string(),
            false_literal: "0".to_string(),
            supports_filter_clause: true,
            ..DialectConfig::default()
        }
    }

    fn compile_date_condition(
        &self,
        w: &mut Writer<'_>,
        date: &DatePredicate<'_>,
    ) -> QuarryResult<()> {
        let Some(format) = strftime_format(date.part) else {
            compile_default_date_condition(w, date);
            return Ok(());
        };
        negated(w, date.is_not, |w| {
            w.append("strftime('");
            w.append(format);
            w.append("', ");
            w.append_name(date.column);
            w.append(") ");
            w.append(date.operator);
            w.append(" cast(");
            w.append_operand(date.value);
            w.append(" as text)");
        });
        Ok(())
    }

    fn compile_limit(&self, w: &mut Writer<'_>, page: Pagination) -> QuarryResult<()> {
        if page.limit == 0 && page.offset > 0 {
            w.append("LIMIT -1 OFFSET ");
            w.append_parameter(count_value(page.offset));
            return Ok(());
        }
        compile_default_limit(w, page);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_query::{Query, SqlCompiler};

    fn compile(query: &Query) -> String {
        SqlCompiler::new(SqliteDialect)
            .compile(query)
            .unwrap()
            .raw_sql()
            .to_string()
    }

    #[test]
    fn test_offset_without_limit() {
        let query = Query::new("t").offset(5);
        assert_eq!(compile(&query), "SELECT * FROM \"t\" LIMIT -1 OFFSET ?");
    }

    #[test]
    fn test_limit_and_offset() {
        let query = Query::new("t").limit(3).offset(5);
        assert_eq!(compile(&query), "SELECT * FROM \"t\" LIMIT ? OFFSET ?");
    }

    #[test]
    fn test_known_date_part_uses_strftime() {
        let query = Query::new("t").where_date_part("year", "created", "=", "2020");
        assert_eq!(
            compile(&query),
            "SELECT * FROM \"t\" WHERE strftime('%Y', \"created\") = cast(? as text)"
        );
    }

    #[test]
    fn test_negated_date() {
        let query = Query::new("t").not(true).where_date("created", "=", "2020-01-01");
        assert_eq!(
            compile(&query),
            "SELECT * FROM \"t\" WHERE NOT (strftime('%Y-%m-%d', \"created\") = cast(? as text))"
        );
    }

    #[test]
    fn test_unknown_date_part_uses_default_shape() {
        let query = Query::new("t").where_date_part("week", "created", "=", 3);
        assert_eq!(compile(&query), "SELECT * FROM \"t\" WHERE WEEK(\"created\") = ?");

        let query = Query::new("t")
            .not(true)
            .where_date_part("second", "created", ">", 10);
        assert_eq!(
            compile(&query),
            "SELECT * FROM \"t\" WHERE NOT (SECOND(\"created\") > ?)"
        );
    }

    #[test]
    fn test_boolean_literals() {
        let query = Query::new("t").where_true("active");
        assert_eq!(compile(&query), "SELECT * FROM \"t\" WHERE \"active\" = 1");
    }

    #[test]
    fn test_keywords_are_upper_case() {
        assert!(SQLITE_KEYWORDS.contains(&"GROUP"));
        assert!(SQLITE_KEYWORDS
            .iter()
            .all(|word| word.chars().all(|c| c.is_ascii_uppercase() || c == '_')));
    }
}
