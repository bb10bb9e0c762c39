//! PostgreSQL dialect.
//!
//! Parameters are numbered `$1, $2, ...`, case-insensitive `LIKE` uses
//! `ILIKE`, and aggregates support `FILTER (WHERE ...)`.

use quarry_core::QuarryResult;
use quarry_query::query::compiler::{DatePredicate, Dialect, DialectConfig, Writer};
use quarry_query::Engine;

use crate::base::negated;

/// The PostgreSQL dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn engine(&self) -> Engine {
        Engine::Postgres
    }

    fn config(&self) -> DialectConfig {
        DialectConfig {
            parameter_prefix: "$".to_string(),
            parameter_index_base: 1,
            last_id: "SELECT lastval() AS id".to_string(),
            supports_filter_clause: true,
            native_ilike: true,
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
                    w.append_name(date.column);
                    w.append("::");
                    w.append(date.part);
                }
                part => {
                    w.append("DATE_PART('");
                    w.append_keyword(part);
                    w.append("', ");
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
}
