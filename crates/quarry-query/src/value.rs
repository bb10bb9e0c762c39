//! Value types for query parameters.
//!
//! The [`Value`] enum represents every literal a query can carry as a bound
//! parameter. [`Operand`] is what the builder accepts in value positions: a
//! plain value, a named [variable](Operand::Variable) resolved against the
//! query at compile time, or an [unsafe literal](Operand::Literal) that is
//! written into the SQL text verbatim.

use std::fmt;

/// A backend-agnostic representation of a database value.
///
/// # Examples
///
/// ```
/// use quarry_query::value::Value;
///
/// let v = Value::from(42_i64);
/// assert_eq!(v, Value::Int(42));
///
/// let v = Value::from("hello");
/// assert_eq!(v, Value::String("hello".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// A UTF-8 string.
    String(String),
    /// Raw binary data.
    Bytes(Vec<u8>),
    /// A date without time.
    Date(chrono::NaiveDate),
    /// A date and time without timezone.
    DateTime(chrono::NaiveDateTime),
    /// A date and time with UTC timezone.
    DateTimeTz(chrono::DateTime<chrono::Utc>),
    /// A time without date.
    Time(chrono::NaiveTime),
    /// A duration / interval.
    Duration(chrono::Duration),
    /// A UUID value.
    Uuid(uuid::Uuid),
    /// A JSON value.
    Json(serde_json::Value),
    /// A list of values.
    List(Vec<Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Self::Date(d) => write!(f, "{d}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
            Self::DateTimeTz(dt) => write!(f, "{dt}"),
            Self::Time(t) => write!(f, "{t}"),
            Self::Duration(d) => write!(f, "{d}"),
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Json(j) => write!(f, "{j}"),
            Self::List(vals) => {
                write!(f, "[")?;
                for (i, v) in vals.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

// ── From implementations ───────────────────────────────────────────────

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<chrono::NaiveDate> for Value {
    fn from(v: chrono::NaiveDate) -> Self {
        Self::Date(v)
    }
}

impl From<chrono::NaiveDateTime> for Value {
    fn from(v: chrono::NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl From<chrono::DateTime<chrono::Utc>> for Value {
    fn from(v: chrono::DateTime<chrono::Utc>) -> Self {
        Self::DateTimeTz(v)
    }
}

impl From<chrono::NaiveTime> for Value {
    fn from(v: chrono::NaiveTime) -> Self {
        Self::Time(v)
    }
}

impl From<chrono::Duration> for Value {
    fn from(v: chrono::Duration) -> Self {
        Self::Duration(v)
    }
}

impl From<uuid::Uuid> for Value {
    fn from(v: uuid::Uuid) -> Self {
        Self::Uuid(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Self::Json(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Self::Null,
        }
    }
}

impl Value {
    /// Returns `true` if this value is `Null`.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Attempts to extract a boolean value.
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Attempts to extract an integer value.
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The name of this value's variant, used in error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Bool(_) => "Bool",
            Self::Int(_) => "Int",
            Self::Float(_) => "Float",
            Self::String(_) => "String",
            Self::Bytes(_) => "Bytes",
            Self::Date(_) => "Date",
            Self::DateTime(_) => "DateTime",
            Self::DateTimeTz(_) => "DateTimeTz",
            Self::Time(_) => "Time",
            Self::Duration(_) => "Duration",
            Self::Uuid(_) => "Uuid",
            Self::Json(_) => "Json",
            Self::List(_) => "List",
        }
    }

    /// Renders this value as an inline SQL literal.
    ///
    /// Used for debug rendering of compiled queries only; compiled SQL always
    /// carries values as bound parameters.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(v) => v.to_string(),
            Self::String(s) => quote(s),
            Self::Bytes(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("X'{hex}'")
            }
            Self::Date(d) => quote(&d.format("%Y-%m-%d").to_string()),
            Self::DateTime(dt) => quote(&dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            Self::DateTimeTz(dt) => quote(&dt.format("%Y-%m-%d %H:%M:%S").to_string()),
            Self::Time(t) => quote(&t.format("%H:%M:%S").to_string()),
            Self::Duration(d) => quote(&d.to_string()),
            Self::Uuid(u) => quote(&u.to_string()),
            Self::Json(j) => quote(&j.to_string()),
            Self::List(vals) => vals
                .iter()
                .map(Self::to_sql_literal)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// A value position in a query.
///
/// # Examples
///
/// ```
/// use quarry_query::value::{Operand, Value};
///
/// assert_eq!(Operand::from(1), Operand::Value(Value::Int(1)));
/// assert_eq!(Operand::variable("id"), Operand::Variable("id".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A value bound as a parameter.
    Value(Value),
    /// A variable resolved through [`Query::define`](crate::query::Query::define)
    /// on the query or one of its parents.
    Variable(String),
    /// SQL text written verbatim. Never pass user input here.
    Literal(String),
}

impl Operand {
    /// Creates a variable reference.
    pub fn variable(name: impl Into<String>) -> Self {
        Self::Variable(name.into())
    }

    /// Creates an unsafe literal that is emitted without escaping.
    pub fn unsafe_literal(sql: impl Into<String>) -> Self {
        Self::Literal(sql.into())
    }

    /// Returns the wrapped value, if this operand is a plain value.
    pub const fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! operand_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Operand {
                fn from(v: $ty) -> Self {
                    Self::Value(Value::from(v))
                }
            }
        )*
    };
}

operand_from!(
    bool,
    i16,
    i32,
    i64,
    u32,
    f32,
    f64,
    String,
    &str,
    Vec<u8>,
    chrono::NaiveDate,
    chrono::NaiveDateTime,
    chrono::DateTime<chrono::Utc>,
    chrono::NaiveTime,
    chrono::Duration,
    uuid::Uuid,
    serde_json::Value,
);

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Self::Value(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Operand {
    fn from(v: Option<T>) -> Self {
        Self::Value(Value::from(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_primitives() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(7_i32), Value::Int(7));
        assert_eq!(Value::from(1.5_f64), Value::Float(1.5));
        assert_eq!(Value::from("x"), Value::String("x".into()));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(3_i64)), Value::Int(3));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::Int(2)]).to_string(),
            "[1, 2]"
        );
    }

    #[test]
    fn test_sql_literal_strings_are_escaped() {
        assert_eq!(Value::from("it's").to_sql_literal(), "'it''s'");
        assert_eq!(Value::Null.to_sql_literal(), "NULL");
        assert_eq!(Value::Bool(false).to_sql_literal(), "false");
        assert_eq!(Value::Int(-4).to_sql_literal(), "-4");
    }

    #[test]
    fn test_sql_literal_dates() {
        let date = chrono::NaiveDate::from_ymd_opt(1996, 7, 4).unwrap();
        assert_eq!(Value::Date(date).to_sql_literal(), "'1996-07-04'");
        let dt = date.and_hms_opt(8, 30, 0).unwrap();
        assert_eq!(Value::DateTime(dt).to_sql_literal(), "'1996-07-04 08:30:00'");
    }

    #[test]
    fn test_sql_literal_bytes_and_list() {
        assert_eq!(Value::Bytes(vec![0xAB, 0x01]).to_sql_literal(), "X'AB01'");
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::from("a")]).to_sql_literal(),
            "1, 'a'"
        );
    }

    #[test]
    fn test_operand_conversions() {
        assert_eq!(Operand::from("a"), Operand::Value(Value::from("a")));
        assert_eq!(Operand::from(Value::Null), Operand::Value(Value::Null));
        assert_eq!(Operand::from(None::<i32>), Operand::Value(Value::Null));
        assert_eq!(
            Operand::unsafe_literal("NOW()"),
            Operand::Literal("NOW()".into())
        );
        assert!(Operand::variable("x").as_value().is_none());
    }

    #[test]
    fn test_type_name() {
        assert_eq!(Value::Int(1).type_name(), "Int");
        assert_eq!(Value::Null.type_name(), "Null");
    }
}
