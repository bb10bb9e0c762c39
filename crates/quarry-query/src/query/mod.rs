//! Query building and compilation.
//!
//! - [`builder`] - The [`Query`] container and its fluent select/insert/update API
//! - [`filters`] - WHERE and HAVING builder methods
//! - [`clauses`] - The clause data model and engine codes
//! - [`conditions`] - Condition clauses
//! - [`compiler`] - The SQL compiler and the [`Dialect`](compiler::Dialect) trait

pub mod builder;
pub mod clauses;
pub mod compiler;
pub mod conditions;
pub mod filters;

pub use builder::{Method, Query};
pub use clauses::{Clause, ClauseNode, Component, Engine, Join};
pub use compiler::{CompiledQuery, Dialect, DialectConfig, SqlCompiler};
pub use conditions::{Condition, ConditionKind, LikeOperator};
