//! HSM Runtime: a condition-driven hierarchical state machine runtime
//!
//! A state tree is loaded once from a JSON or binary definition, validated
//! as a whole, and then shared by any number of sessions. Each session owns
//! a parameter store of named conditions and evaluates guarded transitions
//! against it, one tick at a time. Entering a state dispatches an entry
//! action to a host-supplied sink.
//!
//! # Core Concepts
//!
//! - **Parameters**: Named boolean and numeric conditions set by the host
//! - **Guards**: Declarative predicates over parameters, stored in definitions
//! - **State tree**: Validated, immutable hierarchy of states and transitions
//! - **Session**: Active state plus parameters, stepped by `execute`
//! - **Manual mode**: Automatic transitions off, states chosen by the host
//! - **Request tracking**: One pending asynchronous request per key
//!
//! # Example
//!
//! ```rust
//! use hsm_runtime::config::HsmConfig;
//! use hsm_runtime::core::{Guard, ParameterStore, StateId};
//! use hsm_runtime::definition::DefinitionLoader;
//! use hsm_runtime::runtime::{FnSink, Session};
//! use serde::{Deserialize, Serialize};
//! use std::sync::Arc;
//!
//! #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
//! enum Activity {
//!     Rest,
//!     Play,
//! }
//!
//! let config = HsmConfig::default();
//! let tree = DefinitionLoader::new(&config)
//!     .parse::<Activity>(
//!         r#"{
//!             "states": [
//!                 { "id": 0, "name": "Day" },
//!                 { "id": 1, "name": "Rest", "parent": 0, "tag": "Rest" },
//!                 { "id": 2, "name": "Play", "parent": 0, "tag": "Play" }
//!             ],
//!             "transitions": [
//!                 { "from": 0, "to": 1 },
//!                 { "from": 1, "to": 2, "guard": { "flag": "FullEnergy" } }
//!             ]
//!         }"#,
//!     )
//!     .unwrap();
//!
//! let mut entered = Vec::new();
//! let sink = FnSink::new(|_: StateId, tag: Option<&Activity>| entered.extend(tag.cloned()));
//! let mut session = Session::new(Arc::new(tree), ParameterStore::new(), sink, &config);
//!
//! session.execute();
//! session.set_parameter("FullEnergy", true);
//! session.execute();
//! assert_eq!(session.active_state(), StateId(2));
//!
//! drop(session);
//! assert_eq!(entered, vec![Activity::Rest, Activity::Play]);
//! ```

pub mod config;
pub mod core;
pub mod definition;
pub mod runtime;
pub mod tracker;

// Re-export commonly used types
pub use config::HsmConfig;
pub use core::{Guard, ParameterStore, State, StateId, StateTree, Value};
pub use definition::{DefinitionError, DefinitionLoader};
pub use runtime::{ActionSink, RuntimeError, Session, StepOutcome};
pub use tracker::RequestTracker;
