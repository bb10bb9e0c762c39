//! # quarry
//!
//! A fluent SQL query builder and multi-dialect compiler.
//!
//! This is the meta-crate that re-exports all sub-crates for convenient access.
//! You can depend on `quarry` to get everything, or depend on individual
//! crates for finer-grained control.
//!
//! ```
//! use quarry::dialects::compiler_for;
//! use quarry::query::{Engine, Query};
//!
//! let query = Query::new("users").where_eq("active", true).limit(10);
//! let compiled = compiler_for(Engine::Postgres).compile(&query).unwrap();
//! assert_eq!(
//!     compiled.sql(),
//!     "SELECT * FROM \"users\" WHERE \"active\" = $1 LIMIT $2"
//! );
//! ```

/// Error types, settings, settings loading and logging setup.
pub use quarry_core as core;

/// Query model, fluent builder and the dialect-independent compiler.
pub use quarry_query as query;

/// SQL Server, PostgreSQL, MySQL, SQLite and Oracle dialects.
pub use quarry_dialects as dialects;

/// Commonly used items.
pub mod prelude {
    pub use quarry_core::{QuarryError, QuarryResult, Settings};
    pub use quarry_dialects::{compiler_for, compiler_from_settings};
    pub use quarry_query::query::LikeOperator;
    pub use quarry_query::{CompiledQuery, Engine, Operand, Query, SqlCompiler, Value};
}

// Third-party re-exports
pub use chrono;
pub use serde_json;
pub use tracing;
pub use tracing_subscriber;
