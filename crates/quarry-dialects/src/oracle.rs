//! Oracle dialect.
//!
//! Oracle has no table alias keyword, selects ad-hoc CTE rows `FROM DUAL`
//! and writes multi-row inserts as `INSERT ALL INTO ... SELECT 1 FROM
//! DUAL`. Paging uses `OFFSET ... FETCH`, or the ROWNUM wrapper when legacy
//! pagination is configured.

use quarry_core::QuarryResult;
use quarry_query::query::compiler::dialect::{compile_default_date_condition, compile_offset_fetch};
use quarry_query::query::compiler::{
    DatePredicate, Dialect, DialectConfig, Fragment, InsertValues, Pagination, ResolvedOperand,
    Writer,
};
use quarry_query::value::Value;
use quarry_query::Engine;

use crate::base::negated;

/// The Oracle dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleDialect;

/// Values that already carry a date, so `TO_CHAR` formats them directly.
fn is_temporal(value: &ResolvedOperand) -> bool {
    matches!(
        value,
        ResolvedOperand::Parameter(
            Value::Date(_) | Value::DateTime(_) | Value::DateTimeTz(_) | Value::Time(_)
        )
    )
}

/// `TO_CHAR(col, fmt) op TO_CHAR(?, fmt)`, or `TO_DATE(?, fmt)` for text.
fn write_formatted(w: &mut Writer<'_>, date: &DatePredicate<'_>, format: &str) {
    w.append("TO_CHAR(");
    w.append_name(date.column);
    w.append(", '");
    w.append(format);
    w.append("') ");
    w.append(date.operator);
    w.append(if is_temporal(date.value) {
        " TO_CHAR("
    } else {
        " TO_DATE("
    });
    w.append_operand(date.value);
    w.append(", '");
    w.append(format);
    w.append("')");
}

impl Dialect for OracleDialect {
    fn engine(&self) -> Engine {
        Engine::Oracle
    }

    fn config(&self) -> DialectConfig {
        DialectConfig {
            table_as_keyword: String::new(),
            parameter_prefix: ":p".to_string(),
            multi_insert_start: "INSERT ALL INTO".to_string(),
            true_literal: "1".to_string(),
            false_literal: "0".to_string(),
            dummy_table: Some("DUAL".to_string()),
            random_function: "DBMS_RANDOM.VALUE".to_string(),
            ..DialectConfig::default()
        }
    }

    fn compile_date_condition(
        &self,
        w: &mut Writer<'_>,
        date: &DatePredicate<'_>,
    ) -> QuarryResult<()> {
        match date.part {
            "date" => negated(w, date.is_not, |w| write_formatted(w, date, "YY-MM-DD")),
            "time" => negated(w, date.is_not, |w| write_formatted(w, date, "HH24:MI:SS")),
            "year" | "month" | "day" | "hour" | "minute" | "second" => {
                negated(w, date.is_not, |w| {
                    w.append("EXTRACT(");
                    w.append_keyword(date.part);
                    w.append(" FROM ");
                    w.append_name(date.column);
                    w.append(") ");
                    w.append(date.operator);
                    w.append(" ");
                    w.append_operand(date.value);
                });
            }
            _ => compile_default_date_condition(w, date),
        }
        Ok(())
    }

    fn compile_limit(&self, w: &mut Writer<'_>, page: Pagination) -> QuarryResult<()> {
        compile_offset_fetch(w, page, "ORDER BY (SELECT 0 FROM DUAL)");
        Ok(())
    }

    fn compile_remaining_inserts(
        &self,
        w: &mut Writer<'_>,
        table: &Fragment,
        rows: &[InsertValues<'_>],
    ) -> QuarryResult<()> {
        for row in rows {
            w.append(" INTO ");
            w.splice(table.clone());
            if !row.columns.is_empty() {
                w.append(" (");
                w.list(", ", row.columns, |w, column| {
                    w.append_name(column);
                    Ok(())
                })?;
                w.append(")");
            }
            w.append(" VALUES (");
            w.list(", ", &row.values, |w, value| {
                w.append_operand(value);
                Ok(())
            })?;
            w.append(")");
        }
        w.append(" SELECT 1 FROM DUAL");
        Ok(())
    }
}
