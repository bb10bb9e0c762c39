//! End-to-end compilation tests.
//!
//! Every test builds a complete query, compiles it through a concrete
//! dialect and checks the exact SQL, the literal-inlined rendering and the
//! binding list:
//! - Select phases, sub-queries, joins and CTEs
//! - Conditions (IN, LIKE, dates, nesting, EXISTS, negation, OR flags)
//! - Pagination per dialect, including the ROWNUM wrapper
//! - Insert / update / delete
//! - Aggregates
//! - Settings-driven compilers and error reporting

use quarry_core::settings_loader;
use quarry_core::{QuarryError, Settings};
use quarry_dialects::{
    compiler_for, compiler_from_settings, OracleDialect, PostgresDialect, SqlServerDialect,
    SqliteDialect,
};
use quarry_query::query::LikeOperator;
use quarry_query::{Engine, Operand, Query, SqlCompiler, Value};

// ═══════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════

fn sqlserver() -> SqlCompiler {
    SqlCompiler::new(SqlServerDialect)
}

/// The SQL Server rendering with every binding inlined.
fn inlined(query: &Query) -> String {
    sqlserver().compile(query).unwrap().to_string()
}

// ═══════════════════════════════════════════════════════════════════════
// SELECT STRUCTURE
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_cte_with_raw_body() {
    let query = Query::new("prodCTE").with_raw("prodCTE", "SELECT * FROM B", Vec::new());
    let compiled = sqlserver().compile(&query).unwrap();
    assert_eq!(
        compiled.sql(),
        "WITH [prodCTE] AS (SELECT * FROM B)\nSELECT * FROM [prodCTE]"
    );
    assert!(compiled.bindings().is_empty());
}

#[test]
fn test_cte_with_query_body_and_bindings() {
    let query = Query::new("recent")
        .with(
            "recent",
            Query::new("orders").where_op("total", ">", 100),
        )
        .where_eq("status", "open");
    let compiled = sqlserver().compile(&query).unwrap();
    assert_eq!(
        compiled.sql(),
        "WITH [recent] AS (SELECT * FROM [orders] WHERE [total] > @p0)\n\
         SELECT * FROM [recent] WHERE [status] = @p1"
    );
    assert_eq!(
        compiled.bindings(),
        &[Value::Int(100), Value::from("open")]
    );
}

#[test]
fn test_from_sub_query() {
    let query = Query::default().from_query(Query::new("S").where_eq("c", 1));
    assert_eq!(inlined(&query), "SELECT * FROM (SELECT * FROM [S] WHERE [c] = 1)");
}

#[test]
fn test_join_sub_query() {
    let query = Query::new("L").join_query(Query::new("R").where_eq("c", 1), |on| {
        on.where_columns("a", "=", "b")
    });
    assert_eq!(
        inlined(&query),
        "SELECT * FROM [L] \nINNER JOIN (SELECT * FROM [R] WHERE [c] = 1) ON ([a] = [b])"
    );
}

#[test]
fn test_join_sub_query_bindings_precede_outer_where() {
    let query = Query::new("L")
        .join_query(Query::new("R").where_eq("c", 1), |on| {
            on.where_columns("a", "=", "b")
        })
        .where_eq("d", 2)
        .where_eq("e", 3);
    let compiled = sqlserver().compile(&query).unwrap();
    assert_eq!(
        compiled.raw_sql(),
        "SELECT * FROM [L] \nINNER JOIN (SELECT * FROM [R] WHERE [c] = ?) ON ([a] = [b]) \
         WHERE [d] = ? AND [e] = ?"
    );
    assert_eq!(
        compiled.bindings(),
        &[Value::Int(1), Value::Int(2), Value::Int(3)]
    );
}

#[test]
fn test_simple_joins() {
    let query = Query::new("users as u")
        .join("orders as o", "o.user_id", "u.id")
        .left_join("notes", "notes.user_id", "u.id")
        .select(&["u.name", "o.total"]);
    assert_eq!(
        inlined(&query),
        "SELECT [u].[name], [o].[total] FROM [users] AS [u] \n\
         INNER JOIN [orders] AS [o] ON [o].[user_id] = [u].[id]\n\
         LEFT JOIN [notes] ON [notes].[user_id] = [u].[id]"
    );
}

#[test]
fn test_union_and_group() {
    let query = Query::new("a")
        .select(&["x"])
        .group_by(&["x"])
        .union(Query::new("b").select(&["x"]))
        .unwrap();
    assert_eq!(
        inlined(&query),
        "SELECT [x] FROM [a] GROUP BY [x] UNION SELECT [x] FROM [b]"
    );
}

#[test]
fn test_engine_scoped_clauses() {
    let query = Query::new("t")
        .where_eq("shared", 1)
        .for_engine(Engine::Postgres, |q| q.where_eq("pg_only", 2));
    assert_eq!(inlined(&query), "SELECT * FROM [t] WHERE [shared] = 1");

    let compiled = SqlCompiler::new(PostgresDialect).compile(&query).unwrap();
    assert_eq!(
        compiled.sql(),
        "SELECT * FROM \"t\" WHERE \"shared\" = $1 AND \"pg_only\" = $2"
    );
}

#[test]
fn test_compile_many_joins_statements() {
    let compiled = sqlserver()
        .compile_many(&[Query::new("A").where_eq("x", 1), Query::new("B").where_eq("y", 2)])
        .unwrap();
    assert_eq!(
        compiled.sql(),
        "SELECT * FROM [A] WHERE [x] = @p0;\nSELECT * FROM [B] WHERE [y] = @p1"
    );
    assert_eq!(compiled.bindings(), &[Value::Int(1), Value::Int(2)]);
}

// ═══════════════════════════════════════════════════════════════════════
// CONDITIONS
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_where_in() {
    let query = Query::new("L").where_in("a", [1, 2]);
    let compiled = sqlserver().compile(&query).unwrap();
    assert_eq!(compiled.sql(), "SELECT * FROM [L] WHERE [a] IN (@p0, @p1)");
    assert_eq!(compiled.to_string(), "SELECT * FROM [L] WHERE [a] IN (1, 2)");
    assert_eq!(compiled.bindings(), &[Value::Int(1), Value::Int(2)]);
}

#[test]
fn test_where_in_empty_list() {
    let query = Query::new("L").where_in("a", Vec::<i64>::new());
    assert_eq!(inlined(&query), "SELECT * FROM [L] WHERE 1 = 0 /* IN [empty list] */");

    let query = Query::new("L").where_not_in("a", Vec::<i64>::new());
    assert_eq!(inlined(&query), "SELECT * FROM [L] WHERE 1 = 1 /* NOT IN [empty list] */");
}

#[test]
fn test_where_not_in() {
    let query = Query::new("L").where_not_in("a", ["blah"]);
    assert_eq!(inlined(&query), "SELECT * FROM [L] WHERE [a] NOT IN ('blah')");
}

#[test]
fn test_date_part_with_variable() {
    let query = Query::new("Orders")
        .define("@year", 1996)
        .where_date_part("blah", "RequiredDate", "=", Operand::variable("@year"));
    assert_eq!(
        inlined(&query),
        "SELECT * FROM [Orders] WHERE DATEPART(BLAH, [RequiredDate]) = 1996"
    );
}

#[test]
fn test_variable_in_sub_query_resolves_through_parent() {
    let query = Query::new("users")
        .define("min_total", 50)
        .where_in_query(
            "id",
            Query::new("orders")
                .select(&["user_id"])
                .where_op("total", ">=", Operand::variable("min_total")),
        );
    assert_eq!(
        inlined(&query),
        "SELECT * FROM [users] WHERE [id] IN (SELECT [user_id] FROM [orders] WHERE [total] >= 50)"
    );
}

#[test]
fn test_variable_defined_after_sub_query_is_visible() {
    let query = Query::new("users")
        .where_in_query(
            "id",
            Query::new("orders")
                .select(&["user_id"])
                .where_op("total", ">=", Operand::variable("min_total")),
        )
        .define("min_total", 50);
    let compiled = sqlserver().compile(&query).unwrap();
    assert_eq!(
        compiled.to_string(),
        "SELECT * FROM [users] WHERE [id] IN (SELECT [user_id] FROM [orders] WHERE [total] >= 50)"
    );
    assert_eq!(compiled.bindings(), &[Value::Int(50)]);
}

#[test]
fn test_sub_query_variable_shadows_outer_definition() {
    let query = Query::new("users")
        .where_exists(
            Query::new("orders")
                .define("status", "open")
                .where_eq("status", Operand::variable("status")),
        )
        .unwrap()
        .define("status", "closed")
        .where_eq("state", Operand::variable("status"));
    let compiled = sqlserver().compile(&query).unwrap();
    assert_eq!(
        compiled.bindings(),
        &[Value::from("open"), Value::from("closed")]
    );
}

#[test]
fn test_undefined_variable_fails() {
    let query = Query::new("t").where_eq("a", Operand::variable("missing"));
    let err = sqlserver().compile(&query).unwrap_err();
    assert!(matches!(err, QuarryError::VariableNotFound(ref name) if name == "missing"));
}

#[test]
fn test_or_flag_applies_to_one_condition() {
    let query = Query::new("t")
        .where_eq("a", 1)
        .or()
        .where_eq("b", 2)
        .where_eq("c", 3);
    assert_eq!(
        inlined(&query),
        "SELECT * FROM [t] WHERE [a] = 1 OR [b] = 2 AND [c] = 3"
    );
}

#[test]
fn test_negated_basic_condition() {
    let query = Query::new("t").not(true).where_eq("a", 1).where_eq("b", 2);
    assert_eq!(inlined(&query), "SELECT * FROM [t] WHERE NOT ([a] = 1) AND [b] = 2");
}

#[test]
fn test_nested_groups() {
    let query = Query::new("t")
        .where_eq("x", 1)
        .where_nested(|q| q.where_eq("a", 1).or().where_null("b"));
    assert_eq!(
        inlined(&query),
        "SELECT * FROM [t] WHERE [x] = 1 AND ([a] = 1 OR [b] IS NULL)"
    );
}

#[test]
fn test_empty_nested_group_is_skipped() {
    let query = Query::new("t").where_nested(|q| q).where_eq("x", 1);
    assert_eq!(inlined(&query), "SELECT * FROM [t] WHERE [x] = 1");
}

#[test]
fn test_exists_replaces_select_list() {
    let query = Query::new("users as u")
        .where_exists(
            Query::new("orders as o")
                .select(&["o.id"])
                .where_columns("o.user_id", "=", "u.id"),
        )
        .unwrap();
    assert_eq!(
        inlined(&query),
        "SELECT * FROM [users] AS [u] WHERE EXISTS \
         (SELECT 1 FROM [orders] AS [o] WHERE [o].[user_id] = [u].[id])"
    );
}

#[test]
fn test_between_and_booleans() {
    let query = Query::new("t")
        .where_between("age", 18, 65)
        .where_true("active");
    let compiled = sqlserver().compile(&query).unwrap();
    assert_eq!(
        compiled.sql(),
        "SELECT * FROM [t] WHERE [age] BETWEEN @p0 AND @p1 AND [active] = cast(1 as bit)"
    );
}

#[test]
fn test_case_insensitive_like_lowers_column_and_value() {
    let query = Query::new("t").where_starts("name", "Ann");
    let compiled = sqlserver().compile(&query).unwrap();
    assert_eq!(compiled.sql(), "SELECT * FROM [t] WHERE LOWER([name]) LIKE @p0");
    assert_eq!(compiled.bindings(), &[Value::from("ann%")]);
}

#[test]
fn test_case_sensitive_like_keeps_value() {
    let query = Query::new("t").where_string("name", LikeOperator::Ends, "Ann", true, Some('!'));
    let compiled = sqlserver().compile(&query).unwrap();
    assert_eq!(compiled.sql(), "SELECT * FROM [t] WHERE [name] LIKE @p0 ESCAPE '!'");
    assert_eq!(compiled.bindings(), &[Value::from("%Ann")]);
}

#[test]
fn test_like_escape_quote_is_doubled() {
    let query = Query::new("t").where_string("name", LikeOperator::Like, "a'%", true, Some('\''));
    let compiled = sqlserver().compile(&query).unwrap();
    assert_eq!(compiled.sql(), "SELECT * FROM [t] WHERE [name] LIKE @p0 ESCAPE ''''");
    assert_eq!(compiled.bindings(), &[Value::from("a'%")]);
}

#[test]
fn test_like_rejects_non_string_values() {
    for value in [Value::Null, Value::Int(123)] {
        let query = Query::new("t").where_like("name", value);
        let err = sqlserver().compile(&query).unwrap_err();
        assert_eq!(err.to_string(), "Expecting a non nullable string");
    }
}

#[test]
fn test_unknown_operator_is_rejected() {
    let query = Query::new("t").where_op("a", "~~>", 1);
    let err = sqlserver().compile(&query).unwrap_err();
    assert!(matches!(err, QuarryError::InvalidOperator(ref op) if op == "~~>"));

    let compiled = sqlserver()
        .with_operators(["~~>"])
        .compile(&query)
        .unwrap();
    assert_eq!(compiled.sql(), "SELECT * FROM [t] WHERE [a] ~~> @p0");
}

// ═══════════════════════════════════════════════════════════════════════
// PAGINATION
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_sqlite_order_and_limit() {
    let query = Query::new("employees")
        .order_by_desc(&["first_name"])
        .limit(3);
    let compiled = SqlCompiler::new(SqliteDialect).compile(&query).unwrap();
    assert_eq!(
        compiled.sql(),
        "SELECT * FROM \"employees\" ORDER BY \"first_name\" DESC LIMIT @p0"
    );
    assert_eq!(compiled.bindings(), &[Value::Int(3)]);
}

#[test]
fn test_for_page() {
    let query = Query::new("t").order_by(&["id"]).for_page(3, 10);
    let compiled = compiler_for(Engine::Postgres).compile(&query).unwrap();
    assert_eq!(
        compiled.sql(),
        "SELECT * FROM \"t\" ORDER BY \"id\" LIMIT $1 OFFSET $2"
    );
    assert_eq!(compiled.bindings(), &[Value::Int(10), Value::Int(20)]);
}

#[test]
fn test_oracle_legacy_pagination() {
    let settings = Settings {
        engine: "oracle".to_string(),
        legacy_pagination: true,
        ..Settings::default()
    };
    let compiler = compiler_from_settings(&settings).unwrap();
    let query = Query::new("t").limit(5).offset(20);
    let compiled = compiler.compile(&query).unwrap();
    assert_eq!(
        compiled.sql(),
        "SELECT * FROM (SELECT \"results_wrapper\".*, ROWNUM \"row_num\" \
         FROM (SELECT * FROM \"t\") \"results_wrapper\" WHERE ROWNUM <= :p0) \
         WHERE \"row_num\" > :p1"
    );
    assert_eq!(compiled.bindings(), &[Value::Int(25), Value::Int(20)]);
}

#[test]
fn test_oracle_default_pagination() {
    let query = Query::new("t").order_by(&["id"]).limit(5).offset(20);
    let compiled = SqlCompiler::new(OracleDialect).compile(&query).unwrap();
    assert_eq!(
        compiled.sql(),
        "SELECT * FROM \"t\" ORDER BY \"id\" OFFSET :p0 ROWS FETCH NEXT :p1 ROWS ONLY"
    );
    assert_eq!(compiled.bindings(), &[Value::Int(20), Value::Int(5)]);
}

// ═══════════════════════════════════════════════════════════════════════
// WRITE STATEMENTS
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_sqlserver_insert_with_identity() {
    let query = Query::new("users")
        .as_insert([("name", "ann")], true)
        .unwrap();
    assert_eq!(
        inlined(&query),
        "INSERT INTO [users] ([name]) VALUES ('ann');SELECT scope_identity() as Id"
    );
}

#[test]
fn test_multi_row_insert() {
    let query = Query::new("t")
        .as_insert_many(
            &["a", "b"],
            vec![
                vec![Operand::from(1), Operand::from("x")],
                vec![Operand::from(2), Operand::from("y")],
            ],
        )
        .unwrap();
    let compiled = compiler_for(Engine::MySql).compile(&query).unwrap();
    assert_eq!(
        compiled.to_string(),
        "INSERT INTO `t` (`a`, `b`) VALUES (1, 'x'), (2, 'y')"
    );
}

#[test]
fn test_update_and_increment() {
    let query = Query::new("users")
        .where_eq("id", 7)
        .as_update([("name", "bob")])
        .unwrap();
    assert_eq!(inlined(&query), "UPDATE [users] SET [name] = 'bob' WHERE [id] = 7");

    let query = Query::new("stock").where_eq("sku", "a1").as_increment("count", 3);
    assert_eq!(
        inlined(&query),
        "UPDATE [stock] SET [count] = [count] + 3 WHERE [sku] = 'a1'"
    );
}

#[test]
fn test_delete() {
    let query = Query::new("sessions").where_op("expires", "<", 100).as_delete();
    assert_eq!(inlined(&query), "DELETE FROM [sessions] WHERE [expires] < 100");
}

// ═══════════════════════════════════════════════════════════════════════
// AGGREGATES
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_count_drops_order_and_limit() {
    let query = Query::new("t").where_eq("a", 1).order_by(&["b"]).limit(10).as_count(&["*"]);
    let compiled = sqlserver().compile(&query).unwrap();
    assert_eq!(
        compiled.sql(),
        "SELECT COUNT(*) AS [count] FROM [t] WHERE [a] = @p0"
    );
    assert_eq!(compiled.bindings(), &[Value::Int(1)]);
}

#[test]
fn test_postgres_filter_clause() {
    let query = Query::new("t").select_aggregate(
        "count",
        "id as n",
        Some(Query::default().where_eq("status", "x")),
    );
    let compiled = SqlCompiler::new(PostgresDialect).compile(&query).unwrap();
    assert_eq!(
        compiled.sql(),
        "SELECT COUNT(\"id\") FILTER (WHERE \"status\" = $1) AS \"n\" FROM \"t\""
    );
}

// ═══════════════════════════════════════════════════════════════════════
// COMPILED RESULT
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_compiling_is_repeatable() {
    let query = Query::new("t")
        .where_in("a", [1, 2, 3])
        .where_nested(|q| q.where_eq("b", "x").or().where_eq("c", "y"))
        .limit(4);
    let compiler = sqlserver();
    let first = compiler.compile(&query).unwrap();
    let second = compiler.compile(&query).unwrap();
    let cloned = compiler.compile(&query.clone()).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, cloned);
}

#[test]
fn test_placeholders_match_bindings() {
    let query = Query::new("users as u")
        .with("active", Query::new("users").where_true("active").where_op("age", ">", 18))
        .join_query(Query::new("orders").where_op("total", ">", 5), |on| {
            on.where_columns("orders.user_id", "=", "u.id")
        })
        .where_in("u.role", ["admin", "owner"])
        .where_between("u.created", 1, 2)
        .order_by(&["u.id"])
        .limit(10)
        .offset(5);
    let compiled = sqlserver().compile(&query).unwrap();
    assert_eq!(
        compiled.raw_sql().matches('?').count(),
        compiled.bindings().len()
    );
    assert_eq!(compiled.parameter_names().len(), compiled.bindings().len());
    assert_eq!(
        compiled.bindings(),
        &[
            Value::Int(18),
            Value::Int(5),
            Value::from("admin"),
            Value::from("owner"),
            Value::Int(1),
            Value::Int(2),
            Value::Int(5),
            Value::Int(10),
        ]
    );
}

#[test]
fn test_named_bindings_follow_dialect() {
    let query = Query::new("t").where_eq("a", 1).where_eq("b", 2);
    let compiled = SqlCompiler::new(PostgresDialect).compile(&query).unwrap();
    let names: Vec<&str> = compiled.named_bindings().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["$1", "$2"]);
}

// ═══════════════════════════════════════════════════════════════════════
// SETTINGS
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_compiler_from_toml_settings() {
    let settings = settings_loader::from_toml_str(
        "engine = \"mysql\"\nparameter_prefix = \":x\"\nextra_operators = [\"sounds like\"]\n",
    )
    .unwrap();
    let compiler = compiler_from_settings(&settings).unwrap();
    let query = Query::new("t").where_op("name", "sounds like", "jon");
    assert_eq!(
        compiler.compile(&query).unwrap().sql(),
        "SELECT * FROM `t` WHERE `name` sounds like :x0"
    );
}

#[test]
fn test_unknown_engine_in_settings() {
    let settings = Settings {
        engine: "access".to_string(),
        ..Settings::default()
    };
    let err = compiler_from_settings(&settings).unwrap_err();
    assert_eq!(err.to_string(), "Configuration error: Unknown engine code 'access'");
}
