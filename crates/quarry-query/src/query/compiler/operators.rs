//! The comparison-operator whitelist.

use std::collections::HashSet;

use quarry_core::{QuarryError, QuarryResult};

/// Operators accepted out of the box.
pub const DEFAULT_OPERATORS: &[&str] = &[
    "=", "<", ">", "<=", ">=", "<>", "!=", "<=>",
    "like", "not like", "ilike", "not ilike",
    "like binary", "not like binary",
    "rlike", "not rlike",
    "regexp", "not regexp",
    "similar to", "not similar to",
    "&", "|", "^", "<<", ">>",
    "~", "~*", "!~", "!~*",
];

/// The set of operators a compiler accepts; lookups are case-insensitive.
#[derive(Debug, Clone)]
pub struct OperatorWhitelist {
    operators: HashSet<String>,
}

impl Default for OperatorWhitelist {
    fn default() -> Self {
        Self {
            operators: DEFAULT_OPERATORS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl OperatorWhitelist {
    /// Adds operators to the whitelist.
    pub fn extend<I, S>(&mut self, operators: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.operators
            .extend(operators.into_iter().map(|op| op.as_ref().trim().to_lowercase()));
    }

    /// Returns `true` if `op` is whitelisted.
    pub fn contains(&self, op: &str) -> bool {
        self.operators.contains(&op.trim().to_lowercase())
    }

    /// Returns `op` unchanged if it is whitelisted.
    pub fn check<'o>(&self, op: &'o str) -> QuarryResult<&'o str> {
        if self.contains(op) {
            Ok(op)
        } else {
            Err(QuarryError::InvalidOperator(op.to_string()))
        }
    }
}
