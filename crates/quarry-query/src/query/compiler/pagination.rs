//! ROWNUM-based pagination for engines without `LIMIT`/`OFFSET`.

use super::dialect::{count_value, Pagination};
use super::writer::{Fragment, Writer};

const WRAPPER: &str = "results_wrapper";
const ROW_NUMBER: &str = "row_num";

/// Wraps an already rendered select in the ROWNUM paging shell.
///
/// | limit | offset | output |
/// |---|---|---|
/// | 0 | 0 | the select, unchanged |
/// | n | 0 | `SELECT * FROM (inner) WHERE ROWNUM <= ?` |
/// | 0 | m | `... WHERE row_num > ?` around a numbered wrapper |
/// | n | m | numbered wrapper limited to `ROWNUM <= ?`, then `row_num > ?` |
///
/// With both set the bindings are `limit + offset`, then `offset`.
pub fn apply_legacy_limit(w: &mut Writer<'_>, inner: Fragment, page: Pagination) {
    match (page.limit, page.offset) {
        (0, 0) => w.splice(inner),
        (limit, 0) => {
            w.append("SELECT * FROM (");
            w.splice(inner);
            w.append(") WHERE ROWNUM <= ");
            w.append_parameter(count_value(limit));
        }
        (limit, offset) => {
            w.append("SELECT * FROM (SELECT ");
            w.append_value(WRAPPER);
            w.append(".*, ROWNUM ");
            w.append_value(ROW_NUMBER);
            w.append(" FROM (");
            w.splice(inner);
            w.append(") ");
            w.append_value(WRAPPER);
            if limit > 0 {
                w.append(" WHERE ROWNUM <= ");
                w.append_parameter(count_value(limit.saturating_add(offset)));
            }
            w.append(") WHERE ");
            w.append_value(ROW_NUMBER);
            w.append(" > ");
            w.append_parameter(count_value(offset));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::compiler::escaper::Escaper;
    use crate::value::Value;

    const PLACEHOLDER: &str = "GENERATED_SQL";

    fn wrap(limit: u64, offset: u64) -> (String, Vec<Value>) {
        let escaper = Escaper::new("\"", "\"", "AS ");
        let mut w = Writer::new(&escaper);
        let inner = Fragment {
            sql: PLACEHOLDER.to_string(),
            bindings: Vec::new(),
        };
        apply_legacy_limit(
            &mut w,
            inner,
            Pagination {
                limit,
                offset,
                has_order: false,
            },
        );
        let fragment = w.into_fragment();
        (fragment.sql, fragment.bindings)
    }

    #[test]
    fn test_no_limit_nor_offset_is_passthrough() {
        assert_eq!(wrap(0, 0), (PLACEHOLDER.to_string(), Vec::new()));
    }

    #[test]
    fn test_limit_only() {
        let (sql, bindings) = wrap(10, 0);
        assert_eq!(sql, "SELECT * FROM (GENERATED_SQL) WHERE ROWNUM <= ?");
        assert_eq!(bindings, vec![Value::Int(10)]);
    }

    #[test]
    fn test_offset_only() {
        let (sql, bindings) = wrap(0, 20);
        assert_eq!(
            sql,
            "SELECT * FROM (SELECT \"results_wrapper\".*, ROWNUM \"row_num\" \
             FROM (GENERATED_SQL) \"results_wrapper\") WHERE \"row_num\" > ?"
        );
        assert_eq!(bindings, vec![Value::Int(20)]);
    }

    #[test]
    fn test_limit_and_offset() {
        let (sql, bindings) = wrap(5, 20);
        assert_eq!(
            sql,
            "SELECT * FROM (SELECT \"results_wrapper\".*, ROWNUM \"row_num\" \
             FROM (GENERATED_SQL) \"results_wrapper\" WHERE ROWNUM <= ?) WHERE \"row_num\" > ?"
        );
        assert_eq!(bindings, vec![Value::Int(25), Value::Int(20)]);
    }

    #[test]
    fn test_inner_bindings_come_first() {
        let escaper = Escaper::new("\"", "\"", "AS ");
        let mut w = Writer::new(&escaper);
        let inner = Fragment {
            sql: "SELECT * FROM \"t\" WHERE \"a\" = ?".to_string(),
            bindings: vec![Value::from("x")],
        };
        apply_legacy_limit(
            &mut w,
            inner,
            Pagination {
                limit: 3,
                offset: 0,
                has_order: false,
            },
        );
        assert_eq!(w.bindings(), &[Value::from("x"), Value::Int(3)]);
    }
}
