//! # quarry-dialects
//!
//! Concrete SQL dialects for the quarry compiler.
//!
//! Supported engines:
//! - Generic (standard SQL, double-quoted identifiers)
//! - `SQL Server`
//! - `PostgreSQL`
//! - `MySQL`
//! - `SQLite`
//! - `Oracle`
//!
//! Use [`compiler_for`] for a dialect's defaults or [`compiler_from_settings`]
//! to build one from [`Settings`](quarry_core::Settings).

// Dialect hooks share a signature; several don't use every argument.
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_const_for_fn)]

pub mod base;
pub mod generic;
pub mod mysql;
pub mod oracle;
pub mod postgresql;
pub mod sqlite;
pub mod sqlserver;

pub use base::{compiler_for, compiler_from_settings, dialect_for};
pub use generic::GenericDialect;
pub use mysql::MySqlDialect;
pub use oracle::OracleDialect;
pub use postgresql::PostgresDialect;
pub use sqlite::SqliteDialect;
pub use sqlserver::SqlServerDialect;
