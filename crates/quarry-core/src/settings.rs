//! Compiler settings.
//!
//! [`Settings`] captures everything needed to pick and configure a SQL
//! compiler without touching code: the target engine, the pagination style,
//! parameter naming and extra whitelisted operators. Settings are plain
//! serde structs so they can be loaded from TOML or JSON through
//! [`settings_loader`](crate::settings_loader).

use serde::{Deserialize, Serialize};

/// The complete set of quarry settings.
///
/// # Examples
///
/// ```
/// use quarry_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert_eq!(settings.engine, "generic");
/// assert!(!settings.legacy_pagination);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    // ── Logging ──────────────────────────────────────────────────────

    /// Whether debug mode is enabled (pretty log output).
    pub debug: bool,
    /// The tracing filter directive, e.g. `"info"` or `"quarry_query=trace"`.
    pub log_level: String,

    // ── Compiler ─────────────────────────────────────────────────────

    /// Engine code of the target dialect (`generic`, `sqlserver`, `postgres`,
    /// `mysql`, `sqlite`, `oracle`).
    pub engine: String,
    /// Use ROWNUM-based pagination instead of `OFFSET ... FETCH` (Oracle only).
    pub legacy_pagination: bool,
    /// Replace the select list of an `EXISTS` sub-query with `SELECT 1`.
    pub omit_select_inside_exists: bool,
    /// Only quote identifiers that are reserved words (SQLite only).
    pub quote_reserved_words_only: bool,
    /// Overrides the dialect's named-parameter prefix (e.g. `@p`, `:p`).
    pub parameter_prefix: Option<String>,
    /// Operators to whitelist on top of the built-in set.
    pub extra_operators: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            log_level: "info".to_string(),
            engine: "generic".to_string(),
            legacy_pagination: false,
            omit_select_inside_exists: true,
            quote_reserved_words_only: false,
            parameter_prefix: None,
            extra_operators: Vec::new(),
        }
    }
}
