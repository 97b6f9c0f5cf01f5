//! The per-call parameter map.

use std::collections::btree_map::{self, BTreeMap};

use crate::boolean;
use crate::value::Param;

/// Parameters supplied to a single `search` call.
///
/// Keys are plain strings. The map is owned by the caller; searches only
/// ever read it and build a normalized copy.
///
/// # Example
///
/// ```
/// use sift::{Param, Params};
///
/// let params = Params::new()
///     .with("status", "open")
///     .with("archived", false);
///
/// assert_eq!(params.get("status"), Some(&Param::from("open")));
/// assert!(!params.flag("archived"));
/// assert!(!params.flag("missing"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: BTreeMap<String, Param>,
}

impl Params {
    /// Creates an empty parameter map.
    pub fn new() -> Self {
        Params::default()
    }

    /// Adds a parameter, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Param>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts a parameter, returning the previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Param>) -> Option<Param> {
        self.entries.insert(key.into(), value.into())
    }

    /// Returns the value for a key.
    pub fn get(&self, key: &str) -> Option<&Param> {
        self.entries.get(key)
    }

    /// Returns `true` if the key is present, even with a `Null` value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns `true` if the key holds exactly `Bool(true)`.
    pub fn is_true(&self, key: &str) -> bool {
        self.get(key).is_some_and(Param::is_true)
    }

    /// Reads a key through boolean coercion. Missing keys are `false`.
    pub fn flag(&self, key: &str) -> bool {
        boolean::cast_opt(self.get(key))
    }

    /// Returns the text of a `String` or `Symbol` parameter.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Param::as_str)
    }

    /// Returns an integer parameter.
    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Param::as_i64)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the parameters in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Param> {
        self.entries.iter()
    }

    /// Iterates over the keys in order.
    pub fn keys(&self) -> btree_map::Keys<'_, String, Param> {
        self.entries.keys()
    }

    /// Builds a new map with the same keys, transforming each value.
    pub fn map_values<F>(&self, mut f: F) -> Params
    where
        F: FnMut(&str, &Param) -> Param,
    {
        self.entries
            .iter()
            .map(|(key, value)| (key.clone(), f(key.as_str(), value)))
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<Param>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Params {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K, V> Extend<(K, V)> for Params
where
    K: Into<String>,
    V: Into<Param>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = (&'a String, &'a Param);
    type IntoIter = btree_map::Iter<'a, String, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Params {
    type Item = (String, Param);
    type IntoIter = btree_map::IntoIter<String, Param>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl From<BTreeMap<String, Param>> for Params {
    fn from(entries: BTreeMap<String, Param>) -> Self {
        Params { entries }
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Params {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        map.into_iter().collect()
    }
}

impl From<serde_json::Value> for Params {
    /// Objects become one parameter per field. Any other JSON value yields
    /// an empty map.
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => map.into(),
            _ => Params::new(),
        }
    }
}
