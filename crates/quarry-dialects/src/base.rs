//! Dialect lookup and settings-driven compiler construction.
//!
//! [`compiler_for`] returns a compiler with a dialect's defaults;
//! [`compiler_from_settings`] additionally applies the pagination, quoting,
//! parameter and operator options of a [`Settings`] value.

use quarry_core::{QuarryResult, Settings};
use quarry_query::query::compiler::writer::Writer;
use quarry_query::{Dialect, Engine, SqlCompiler};

use crate::generic::GenericDialect;
use crate::mysql::MySqlDialect;
use crate::oracle::OracleDialect;
use crate::postgresql::PostgresDialect;
use crate::sqlite::{SqliteDialect, SQLITE_KEYWORDS};
use crate::sqlserver::SqlServerDialect;

/// Returns the dialect for `engine`.
pub fn dialect_for(engine: Engine) -> Box<dyn Dialect> {
    match engine {
        Engine::Generic => Box::new(GenericDialect),
        Engine::SqlServer => Box::new(SqlServerDialect),
        Engine::Postgres => Box::new(PostgresDialect),
        Engine::MySql => Box::new(MySqlDialect),
        Engine::Sqlite => Box::new(SqliteDialect),
        Engine::Oracle => Box::new(OracleDialect),
    }
}

/// Returns a compiler for `engine` with the dialect's default configuration.
///
/// # Examples
///
/// ```
/// use quarry_dialects::compiler_for;
/// use quarry_query::{Engine, Query};
///
/// let compiler = compiler_for(Engine::SqlServer);
/// let compiled = compiler.compile(&Query::new("users").where_eq("id", 1)).unwrap();
/// assert_eq!(compiled.sql(), "SELECT * FROM [users] WHERE [id] = @p0");
/// ```
pub fn compiler_for(engine: Engine) -> SqlCompiler {
    let dialect = dialect_for(engine);
    let config = dialect.config();
    SqlCompiler::with_config(dialect, config)
}

/// Builds a compiler from settings.
///
/// Fails with a configuration error when `settings.engine` is not a known
/// engine code. Options that only one engine supports are ignored, with a
/// warning, for the others.
pub fn compiler_from_settings(settings: &Settings) -> QuarryResult<SqlCompiler> {
    let engine: Engine = settings.engine.parse()?;
    let dialect = dialect_for(engine);
    let mut config = dialect.config();

    config.omit_select_inside_exists = settings.omit_select_inside_exists;

    if settings.legacy_pagination {
        if engine == Engine::Oracle {
            config.legacy_pagination = true;
        } else {
            tracing::warn!(engine = %engine, "legacy pagination is only supported on oracle");
        }
    }

    if settings.quote_reserved_words_only {
        if engine == Engine::Sqlite {
            config.reserved_words = Some(SQLITE_KEYWORDS.iter().map(ToString::to_string).collect());
        } else {
            tracing::warn!(engine = %engine, "reserved-word quoting is only supported on sqlite");
        }
    }

    if let Some(prefix) = &settings.parameter_prefix {
        config.parameter_prefix.clone_from(prefix);
    }

    tracing::debug!(
        engine = %engine,
        legacy_pagination = config.legacy_pagination,
        extra_operators = settings.extra_operators.len(),
        "configured compiler"
    );
    Ok(SqlCompiler::with_config(dialect, config).with_operators(&settings.extra_operators))
}

/// Runs `body`, wrapped in `NOT (...)` when `is_not` is set.
pub(crate) fn negated(w: &mut Writer<'_>, is_not: bool, body: impl FnOnce(&mut Writer<'_>)) {
    if is_not {
        w.append("NOT (");
    }
    body(w);
    if is_not {
        w.append(")");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_core::QuarryError;
    use quarry_query::Query;

    #[test]
    fn test_dialect_for_reports_engine() {
        for engine in Engine::ALL {
            assert_eq!(dialect_for(engine).engine(), engine);
            assert_eq!(compiler_for(engine).engine(), engine);
        }
    }

    #[test]
    fn test_unknown_engine_is_a_configuration_error() {
        let settings = Settings {
            engine: "db2".to_string(),
            ..Settings::default()
        };
        let err = compiler_from_settings(&settings).unwrap_err();
        assert!(matches!(err, QuarryError::ConfigurationError(_)));
    }

    #[test]
    fn test_settings_override_parameter_prefix() {
        let settings = Settings {
            engine: "sqlserver".to_string(),
            parameter_prefix: Some(":v".to_string()),
            ..Settings::default()
        };
        let compiler = compiler_from_settings(&settings).unwrap();
        let compiled = compiler.compile(&Query::new("t").where_eq("a", 1)).unwrap();
        assert_eq!(compiled.sql(), "SELECT * FROM [t] WHERE [a] = :v0");
    }

    #[test]
    fn test_settings_enable_legacy_pagination_on_oracle_only() {
        let settings = Settings {
            engine: "oracle".to_string(),
            legacy_pagination: true,
            ..Settings::default()
        };
        assert!(compiler_from_settings(&settings).unwrap().config().legacy_pagination);

        let settings = Settings {
            engine: "mysql".to_string(),
            legacy_pagination: true,
            ..Settings::default()
        };
        assert!(!compiler_from_settings(&settings).unwrap().config().legacy_pagination);
    }

    #[test]
    fn test_settings_extra_operators() {
        let settings = Settings {
            engine: "postgres".to_string(),
            extra_operators: vec!["@>".to_string()],
            ..Settings::default()
        };
        let compiler = compiler_from_settings(&settings).unwrap();
        let query = Query::new("docs").where_op("tags", "@>", "{a}");
        assert_eq!(
            compiler.compile(&query).unwrap().sql(),
            "SELECT * FROM \"docs\" WHERE \"tags\" @> $1"
        );
        assert!(compiler_for(Engine::Postgres).compile(&query).is_err());
    }

    #[test]
    fn test_settings_reserved_word_quoting_on_sqlite() {
        let settings = Settings {
            engine: "sqlite".to_string(),
            quote_reserved_words_only: true,
            ..Settings::default()
        };
        let compiler = compiler_from_settings(&settings).unwrap();
        let query = Query::new("orders").select(&["id", "group"]);
        assert_eq!(
            compiler.compile(&query).unwrap().sql(),
            "SELECT id, \"group\" FROM orders"
        );
    }
}
