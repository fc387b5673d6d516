//! Runtime configuration.
//!
//! Configuration is loaded once and then treated as immutable. It is passed
//! explicitly to the [`DefinitionLoader`](crate::definition::DefinitionLoader)
//! and to every [`Session`](crate::runtime::Session); there is no global
//! instance.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration could not be parsed: {0}")]
    Parse(String),

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Settings shared by the loader and the runtime.
///
/// # Example
///
/// ```rust
/// use hsm_runtime::config::HsmConfig;
///
/// let config = HsmConfig::from_json(r#"{"auto_transition": false}"#).unwrap();
/// assert!(!config.auto_transition);
/// assert_eq!(config.history_limit, HsmConfig::default().history_limit);
///
/// let config = HsmConfig::default().with_inherit_transitions(true);
/// assert!(config.inherit_transitions);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HsmConfig {
    /// Whether guard evaluation alone may change the active state.
    pub auto_transition: bool,

    /// Whether transitions declared on ancestors of the active state are
    /// also candidates during evaluation.
    pub inherit_transitions: bool,

    /// Maximum number of transition records a session keeps.
    pub history_limit: usize,

    /// Deepest allowed nesting below the root. Unlimited when `None`.
    pub max_depth: Option<usize>,
}

impl Default for HsmConfig {
    fn default() -> Self {
        Self {
            auto_transition: true,
            inherit_transitions: false,
            history_limit: 64,
            max_depth: None,
        }
    }
}

impl HsmConfig {
    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()
    }

    pub fn with_auto_transition(mut self, enabled: bool) -> Self {
        self.auto_transition = enabled;
        self
    }

    pub fn with_inherit_transitions(mut self, enabled: bool) -> Self {
        self.inherit_transitions = enabled;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Limit nesting depth. Fails for zero, like [`from_json`](Self::from_json).
    pub fn with_max_depth(mut self, depth: usize) -> Result<Self, ConfigError> {
        self.max_depth = Some(depth);
        self.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.max_depth == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "max_depth",
                reason: "must allow at least one level below the root".to_string(),
            });
        }
        Ok(self)
    }
}
