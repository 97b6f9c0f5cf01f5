//! Boolean coercion for loosely typed parameters.
//!
//! Values arriving from query strings are usually text. Only an explicit set
//! of tokens reads as false; everything else, including unrecognized input,
//! reads as true.
//!
//! | Input | Result |
//! |-------|--------|
//! | `Null`, `Bool(false)`, integer `0` | `false` |
//! | `"0"`, `"f"`, `"F"`, `"false"`, `"FALSE"`, `"off"`, `"OFF"` (string or symbol) | `false` |
//! | `""` as a string | `false` |
//! | `""` as a symbol | `true` |
//! | anything else | `true` |
//!
//! Matching is case-sensitive: `"False"` and `"Off"` are true.

use crate::value::Param;

const FALSE_TOKENS: [&str; 8] = ["", "0", "f", "F", "false", "FALSE", "off", "OFF"];

/// Coerces a parameter value to a strict boolean.
///
/// # Example
///
/// ```
/// use sift::{boolean, Param};
///
/// assert!(!boolean::cast(&Param::from("off")));
/// assert!(!boolean::cast(&Param::symbol("F")));
/// assert!(boolean::cast(&Param::from(" ")));
/// assert!(boolean::cast(&Param::from("SOMETHING RANDOM")));
/// ```
pub fn cast(value: &Param) -> bool {
    match value {
        Param::Null => false,
        Param::Bool(b) => *b,
        Param::Number(n) => !n.is_integer_zero(),
        Param::String(s) => !is_false_token(s),
        Param::Symbol(s) => s.is_empty() || !is_false_token(s),
        Param::List(_) | Param::Map(_) => true,
    }
}

/// Coerces an optional value. A missing value is `false`.
pub fn cast_opt(value: Option<&Param>) -> bool {
    value.is_some_and(cast)
}

/// Returns `true` if `token` is one of the recognized false spellings.
pub fn is_false_token(token: &str) -> bool {
    FALSE_TOKENS.contains(&token)
}
