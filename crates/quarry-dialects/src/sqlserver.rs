//! Microsoft SQL Server dialect.
//!
//! Identifiers use brackets, paging uses `OFFSET ... ROWS FETCH NEXT ...`
//! (which needs an ORDER BY, so a neutral one is added when missing), and
//! date parts go through `DATEPART` or a `CAST`.

use quarry_core::QuarryResult;
use quarry_query::query::compiler::dialect::compile_offset_fetch;
use quarry_query::query::compiler::{DatePredicate, Dialect, DialectConfig, Pagination, Writer};
use quarry_query::Engine;

use crate::base::negated;

/// The SQL Server dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlServerDialect;

impl Dialect for SqlServerDialect {
    fn engine(&self) -> Engine {
        Engine::SqlServer
    }

    fn config(&self) -> DialectConfig {
        DialectConfig {
            open_quote: "[".to_string(),
            close_quote: "]".to_string(),
            last_id: "SELECT scope_identity() as Id".to_string(),
            true_literal: "cast(1 as bit)".to_string(),
            false_literal: "cast(0 as bit)".to_string(),
            random_function: "NEWID()".to_string(),
            ..DialectConfig::default()
        }
    }

    fn compile_date_condition(
        &self,
        w: &mut Writer<'_>,
        date: &DatePredicate<'_>,
    ) -> QuarryResult<()> {
        negated(w, date.is_not, |w| {
            match date.part {
                "date" | "time" => {
                    w.append("CAST(");
                    w.append_name(date.column);
                    w.append(" AS ");
                    w.append_keyword(date.part);
                    w.append(")");
                }
                part => {
                    w.append("DATEPART(");
                    w.append_keyword(part);
                    w.append(", ");
                    w.append_name(date.column);
                    w.append(")");
                }
            }
            w.append(" ");
            w.append(date.operator);
            w.append(" ");
            w.append_operand(date.value);
        });
        Ok(())
    }

    fn compile_limit(&self, w: &mut Writer<'_>, page: Pagination) -> QuarryResult<()> {
        compile_offset_fetch(w, page, "ORDER BY (SELECT 0)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_query::value::Value;
    use quarry_query::{Query, SqlCompiler};

    fn compile(query: &Query) -> (String, Vec<Value>) {
        let compiled = SqlCompiler::new(SqlServerDialect).compile(query).unwrap();
        (compiled.raw_sql().to_string(), compiled.bindings().to_vec())
    }

    #[test]
    fn test_limit_without_order_adds_safe_order() {
        let (sql, bindings) = compile(&Query::new("t").limit(10));
        assert_eq!(
            sql,
            "SELECT * FROM [t] ORDER BY (SELECT 0) OFFSET ? ROWS FETCH NEXT ? ROWS ONLY"
        );
        assert_eq!(bindings, vec![Value::Int(0), Value::Int(10)]);
    }

    #[test]
    fn test_offset_with_order() {
        let (sql, bindings) = compile(&Query::new("t").order_by(&["id"]).offset(20));
        assert_eq!(sql, "SELECT * FROM [t] ORDER BY [id] OFFSET ? ROWS");
        assert_eq!(bindings, vec![Value::Int(20)]);
    }

    #[test]
    fn test_date_parts() {
        let (sql, _) = compile(&Query::new("t").where_date("created", "=", "2020-01-01"));
        assert_eq!(sql, "SELECT * FROM [t] WHERE CAST([created] AS DATE) = ?");

        let (sql, _) = compile(&Query::new("t").where_date_part("year", "created", ">", 2000));
        assert_eq!(sql, "SELECT * FROM [t] WHERE DATEPART(YEAR, [created]) > ?");
    }

    #[test]
    fn test_boolean_and_random() {
        let (sql, _) = compile(&Query::new("t").where_false("deleted").order_by_random(None));
        assert_eq!(
            sql,
            "SELECT * FROM [t] WHERE [deleted] = cast(0 as bit) ORDER BY NEWID()"
        );
    }
}
