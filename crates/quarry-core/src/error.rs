//! Core error types for quarry.
//!
//! Every failure the builder or a compiler can raise is a variant of
//! [`QuarryError`]. The variants are grouped by the kind of mistake they
//! report: a bad argument handed to a builder method, an operation the query
//! cannot support, an unresolvable variable, or a clause that ended up in a
//! section that cannot render it.

use thiserror::Error;

/// The primary error type for quarry.
#[derive(Error, Debug)]
pub enum QuarryError {
    // ── Argument errors ──────────────────────────────────────────────

    /// An operator outside the compiler's whitelist was used.
    #[error("The operator '{0}' cannot be used. Please consider white listing it before using it")]
    InvalidOperator(String),

    /// An argument had the wrong shape or type.
    ///
    /// The display text is the message itself, with no prefix.
    #[error("{0}")]
    InvalidArgument(String),

    /// A sub-query lacked a clause the surrounding condition requires.
    #[error("'{clause}' cannot be empty if used inside a '{operation}' condition")]
    MissingClause {
        /// The missing clause, e.g. `FromClause`.
        clause: String,
        /// The condition that needed it, e.g. `WhereExists`.
        operation: String,
    },

    // ── Operation errors ─────────────────────────────────────────────

    /// The query cannot be compiled in its current state.
    #[error("{0}")]
    InvalidOperation(String),

    /// A variable placeholder could not be found in the query or its parents.
    #[error("Variable '{0}' not found")]
    VariableNotFound(String),

    /// A clause of an unexpected kind was found while compiling a section.
    #[error("Invalid type \"{found}\" provided for the \"{section}\" clause.")]
    InvalidClause {
        /// The kind of clause that was found.
        found: String,
        /// The section being compiled, e.g. `from` or `where`.
        section: String,
    },

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl QuarryError {
    /// Shorthand for [`QuarryError::InvalidArgument`].
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Shorthand for [`QuarryError::InvalidOperation`].
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    /// Builds an [`QuarryError::InvalidClause`] for the given section.
    pub fn invalid_clause(found: impl Into<String>, section: impl Into<String>) -> Self {
        Self::InvalidClause {
            found: found.into(),
            section: section.into(),
        }
    }

    /// Returns `true` for errors caused by a bad argument to a builder or
    /// compiler method.
    pub const fn is_argument_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidOperator(_) | Self::InvalidArgument(_) | Self::MissingClause { .. }
        )
    }
}

/// A convenience type alias for `Result<T, QuarryError>`.
pub type QuarryResult<T> = Result<T, QuarryError>;
