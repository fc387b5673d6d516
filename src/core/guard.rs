//! Guard expressions for controlling state transitions.
//!
//! Guards are a small closed expression tree over named parameters. They
//! are evaluated by a simple interpreter, which keeps evaluation total,
//! free of side effects, and serializable alongside the state tree.

use super::params::{ParameterStore, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Relational operator used by [`Guard::Compare`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    fn apply(self, actual: Value, expected: Value) -> bool {
        if let (Value::Bool(a), Value::Bool(b)) = (actual, expected) {
            match self {
                Self::Eq => return a == b,
                Self::Ne => return a != b,
                _ => {}
            }
        }

        let (a, b) = (actual.as_number(), expected.as_number());
        match self {
            Self::Eq => a == b,
            Self::Ne => a != b,
            Self::Gt => a > b,
            Self::Ge => a >= b,
            Self::Lt => a < b,
            Self::Le => a <= b,
        }
    }
}

/// Boolean expression over a [`ParameterStore`] that gates a transition.
///
/// # Example
///
/// ```rust
/// use hsm_runtime::core::{Guard, ParameterStore};
///
/// let guard = Guard::eq("ready", true).and(Guard::not(Guard::flag("override")));
///
/// let mut params = ParameterStore::new();
/// assert!(!guard.evaluate(&params));
///
/// params.set("ready", true);
/// assert!(guard.evaluate(&params));
///
/// params.set("override", true);
/// assert!(!guard.evaluate(&params));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Guard {
    /// Always enabled.
    #[default]
    Always,

    /// Enabled when the named parameter is truthy.
    Flag(String),

    /// Enabled when `param op value` holds.
    Compare {
        param: String,
        op: CompareOp,
        value: Value,
    },

    Not(Box<Guard>),

    /// Enabled when every sub-guard holds. Empty is true.
    All(Vec<Guard>),

    /// Enabled when any sub-guard holds. Empty is false.
    Any(Vec<Guard>),
}

impl Guard {
    pub fn always() -> Self {
        Self::Always
    }

    pub fn flag(name: impl Into<String>) -> Self {
        Self::Flag(name.into())
    }

    pub fn compare(name: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self::Compare {
            param: name.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(name, CompareOp::Eq, value)
    }

    pub fn not(guard: Guard) -> Self {
        Self::Not(Box::new(guard))
    }

    pub fn all(guards: impl IntoIterator<Item = Guard>) -> Self {
        Self::All(guards.into_iter().collect())
    }

    pub fn any(guards: impl IntoIterator<Item = Guard>) -> Self {
        Self::Any(guards.into_iter().collect())
    }

    /// Conjunction with another guard, flattening nested `All`.
    pub fn and(self, other: Guard) -> Self {
        match self {
            Self::All(mut guards) => {
                guards.push(other);
                Self::All(guards)
            }
            guard => Self::All(vec![guard, other]),
        }
    }

    /// Disjunction with another guard, flattening nested `Any`.
    pub fn or(self, other: Guard) -> Self {
        match self {
            Self::Any(mut guards) => {
                guards.push(other);
                Self::Any(guards)
            }
            guard => Self::Any(vec![guard, other]),
        }
    }

    /// Evaluate against the store.
    ///
    /// Unset parameters read the default of the compared literal's type,
    /// so evaluation never fails.
    pub fn evaluate(&self, params: &ParameterStore) -> bool {
        match self {
            Self::Always => true,
            Self::Flag(name) => params.get_bool(name),
            Self::Compare { param, op, value } => {
                let actual = params
                    .lookup(param)
                    .unwrap_or_else(|| value.default_like());
                op.apply(actual, *value)
            }
            Self::Not(inner) => !inner.evaluate(params),
            Self::All(guards) => guards.iter().all(|g| g.evaluate(params)),
            Self::Any(guards) => guards.iter().any(|g| g.evaluate(params)),
        }
    }

    /// Names of every parameter this guard reads.
    pub fn referenced_parameters(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_parameters(&mut names);
        names
    }

    fn collect_parameters<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            Self::Always => {}
            Self::Flag(name) => {
                names.insert(name.as_str());
            }
            Self::Compare { param, .. } => {
                names.insert(param.as_str());
            }
            Self::Not(inner) => inner.collect_parameters(names),
            Self::All(guards) | Self::Any(guards) => {
                for guard in guards {
                    guard.collect_parameters(names);
                }
            }
        }
    }
}
