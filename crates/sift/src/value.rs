//! Runtime values for request parameters.
//!
//! The [`Param`] enum represents a single parameter value as it arrives from
//! the caller, typically decoded from a query string or a JSON body. Values
//! are dynamic: the searcher decides how to read them.

use std::collections::BTreeMap;

/// Dynamic parameter value.
///
/// `String` and `Symbol` carry the same text; `Symbol` is the atom form some
/// callers use for identifiers. Boolean coercion reads both the same way,
/// except that only the empty string is false.
///
/// # Example
///
/// ```
/// use sift::{Param, Number};
///
/// assert_eq!(Param::from("off"), Param::String("off".into()));
/// assert_eq!(Param::from(3), Param::Number(Number::I64(3)));
/// assert_eq!(Param::symbol("off").as_str(), Some("off"));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Param {
    /// Absent or null value.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(Number),
    /// String value.
    String(String),
    /// Symbol (atom) value.
    Symbol(String),
    /// Ordered list of values.
    List(Vec<Param>),
    /// Nested map of values.
    Map(BTreeMap<String, Param>),
}

impl Param {
    /// Creates a symbol value.
    pub fn symbol(name: impl Into<String>) -> Self {
        Param::Symbol(name.into())
    }

    /// Returns `true` if this is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Param::Null)
    }

    /// Returns `true` if this is a `Bool` value.
    pub fn is_bool(&self) -> bool {
        matches!(self, Param::Bool(_))
    }

    /// Returns `true` if this is exactly `Bool(true)`.
    pub fn is_true(&self) -> bool {
        matches!(self, Param::Bool(true))
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Param::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extracts the number value, if present.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Param::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the number as `i64` when it is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_number().and_then(Number::as_i64)
    }

    /// Extracts the text of a `String` or `Symbol` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Param::String(s) | Param::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the list items, if present.
    pub fn as_list(&self) -> Option<&[Param]> {
        match self {
            Param::List(items) => Some(items),
            _ => None,
        }
    }

    /// Extracts the nested map, if present.
    pub fn as_map(&self) -> Option<&BTreeMap<String, Param>> {
        match self {
            Param::Map(map) => Some(map),
            _ => None,
        }
    }
}

/// A numeric parameter.
///
/// Integers and floats stay apart because boolean coercion treats integer
/// zero as false but `0.0` as true. Unsigned values get their own variant so
/// JSON numbers above `i64::MAX` survive decoding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Returns the value as `i64` for integer variants that fit.
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Number::I64(n) => Some(n),
            Number::U64(n) => i64::try_from(n).ok(),
            Number::F64(_) => None,
        }
    }

    /// Returns `true` for integer zero. Floating-point zero is not included.
    pub fn is_integer_zero(self) -> bool {
        matches!(self, Number::I64(0) | Number::U64(0))
    }
}

macro_rules! number_from {
    ($variant:ident, $target:ty, $($source:ty),+) => {
        $(
            impl From<$source> for Number {
                fn from(n: $source) -> Self {
                    Number::$variant(n as $target)
                }
            }

            impl From<$source> for Param {
                fn from(n: $source) -> Self {
                    Param::Number(Number::from(n))
                }
            }
        )+
    };
}

number_from!(I64, i64, i8, i16, i32, i64, isize);
number_from!(U64, u64, u8, u16, u32, u64, usize);
number_from!(F64, f64, f32, f64);

impl From<Number> for Param {
    fn from(n: Number) -> Self {
        Param::Number(n)
    }
}

impl From<bool> for Param {
    fn from(b: bool) -> Self {
        Param::Bool(b)
    }
}

impl From<&str> for Param {
    fn from(s: &str) -> Self {
        Param::String(s.to_string())
    }
}

impl From<String> for Param {
    fn from(s: String) -> Self {
        Param::String(s)
    }
}

impl<T: Into<Param>> From<Option<T>> for Param {
    fn from(value: Option<T>) -> Self {
        value.map_or(Param::Null, Into::into)
    }
}

impl<T: Into<Param>> From<Vec<T>> for Param {
    fn from(items: Vec<T>) -> Self {
        Param::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Param {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match value {
            Json::Null => Param::Null,
            Json::Bool(b) => Param::Bool(b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Param::Number(Number::I64(i))
                } else if let Some(u) = n.as_u64() {
                    Param::Number(Number::U64(u))
                } else {
                    // serde_json numbers are always representable as f64
                    Param::Number(Number::F64(n.as_f64().unwrap_or(f64::NAN)))
                }
            }
            Json::String(s) => Param::String(s),
            Json::Array(items) => Param::List(items.into_iter().map(Param::from).collect()),
            Json::Object(map) => Param::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}
