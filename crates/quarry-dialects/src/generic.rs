//! The dialect-neutral default.

use quarry_query::{Dialect, DialectConfig, Engine};

/// Standard SQL with double-quoted identifiers and `@p` parameters.
///
/// Every hook uses the default rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericDialect;

impl Dialect for GenericDialect {
    fn engine(&self) -> Engine {
        Engine::Generic
    }

    fn config(&self) -> DialectConfig {
        DialectConfig::default()
    }
}
