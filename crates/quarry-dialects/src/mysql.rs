//! MySQL / MariaDB dialect.

use quarry_core::QuarryResult;
use quarry_query::query::compiler::dialect::{compile_default_limit, count_value};
use quarry_query::query::compiler::{Dialect, DialectConfig, Pagination, Writer};
use quarry_query::Engine;

/// MySQL has no `OFFSET` without `LIMIT`; this is the documented "all rows".
const MAX_ROWS: &str = "18446744073709551615";

/// The MySQL dialect: backtick identifiers, default date parts.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

impl Dialect for MySqlDialect {
    fn engine(&self) -> Engine {
        Engine::MySql
    }

    fn config(&self) -> DialectConfig {
        DialectConfig {
            open_quote: "`".to_string(),
            close_quote: "`".to_string(),
            last_id: "SELECT last_insert_id() as Id".to_string(),
            random_function: "RAND()".to_string(),
            ..DialectConfig::default()
        }
    }

    fn compile_limit(&self, w: &mut Writer<'_>, page: Pagination) -> QuarryResult<()> {
        if page.limit == 0 && page.offset > 0 {
            w.append("LIMIT ");
            w.append(MAX_ROWS);
            w.append(" OFFSET ");
            w.append_parameter(count_value(page.offset));
            return Ok(());
        }
        compile_default_limit(w, page);
        Ok(())
    }
}
