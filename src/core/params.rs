//! Parameter store holding the named conditions read by guards.
//!
//! The store is a plain table: the environment writes it once per tick,
//! guards read it during evaluation. Reads never fail; an unset name
//! yields the default value (`false` / `0`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Typed value of a single condition.
///
/// # Example
///
/// ```rust
/// use hsm_runtime::core::Value;
///
/// assert!(Value::from(true).as_bool());
/// assert_eq!(Value::from(3).as_number(), 3.0);
/// assert_eq!(Value::from(true).as_number(), 1.0);
/// assert!(!Value::from(0.0).as_bool());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Bool(bool),
    Number(f64),
}

impl Value {
    /// Truthiness of the value. Numbers are true when non-zero.
    pub fn as_bool(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0,
        }
    }

    /// Numeric view of the value. `true` reads as `1.0`.
    pub fn as_number(&self) -> f64 {
        match self {
            Self::Bool(true) => 1.0,
            Self::Bool(false) => 0.0,
            Self::Number(n) => *n,
        }
    }

    /// Default value of the same type (`false` or `0`).
    pub fn default_like(&self) -> Self {
        match self {
            Self::Bool(_) => Self::Bool(false),
            Self::Number(_) => Self::Number(0.0),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::Bool(false)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

/// Mapping from condition name to value.
///
/// Unknown names are permitted everywhere; guards may reference names that
/// were never written and read the default.
///
/// # Example
///
/// ```rust
/// use hsm_runtime::core::{ParameterStore, Value};
///
/// let mut store = ParameterStore::new();
/// store.set("EnableFire", true);
/// store.set("MoveTo", 2);
///
/// assert!(store.get_bool("EnableFire"));
/// assert_eq!(store.get_number("MoveTo"), 2.0);
/// assert_eq!(store.get("NeverSet"), Value::Bool(false));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterStore {
    values: HashMap<String, Value>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a parameter. Always succeeds.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Read a parameter, returning `Value::Bool(false)` when unset.
    pub fn get(&self, name: &str) -> Value {
        self.values.get(name).copied().unwrap_or_default()
    }

    /// Read a parameter if it has been written.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.values.get(name).copied()
    }

    pub fn get_bool(&self, name: &str) -> bool {
        self.get(name).as_bool()
    }

    pub fn get_number(&self, name: &str) -> f64 {
        self.get(name).as_number()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Remove a parameter so that it reads the default again.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

impl<N: Into<String>, V: Into<Value>> FromIterator<(N, V)> for ParameterStore {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut store = Self::new();
        for (name, value) in iter {
            store.set(name, value);
        }
        store
    }
}
