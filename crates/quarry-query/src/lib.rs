//! # quarry-query
//!
//! The query model and the SQL compiler of quarry. A [`Query`](query::Query)
//! is an ordered list of clauses built through a fluent API; a
//! [`SqlCompiler`](query::SqlCompiler) renders it for one
//! [`Dialect`](query::Dialect) into SQL text plus ordered bindings.
//!
//! ## Architecture
//!
//! Building and compiling are separate steps. Builder methods only record
//! clauses; nothing is rendered until [`SqlCompiler::compile`](query::SqlCompiler::compile)
//! walks the clause list. Compilation never mutates the query, so the same
//! query can be compiled for several dialects.
//!
//! ## Module Overview
//!
//! - [`value`] - The [`Value`](value::Value) enum and [`Operand`](value::Operand)
//! - [`query`] - Query building, clauses, conditions, and compilation

// These clippy lints are intentionally allowed for the query crate:
// - too_many_lines: the condition and select renderers are large match blocks
// - doc_markdown: backtick requirements for SQL keywords in docs are too strict
// - needless_pass_by_value: builder methods take owned queries to nest them
// - return_self_not_must_use: builder pattern methods are self-documenting
// - match_same_arms: clause kinds with identical rendering stay separate arms
#![allow(clippy::too_many_lines)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::use_self)]

pub mod query;
pub mod value;

pub use query::{CompiledQuery, Dialect, DialectConfig, Engine, Query, SqlCompiler};
pub use value::{Operand, Value};
