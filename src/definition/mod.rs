//! Definition loading for state trees.
//!
//! This module turns a serialized description into a validated
//! [`StateTree`]. Loading is all-or-nothing: either every structural check
//! passes and a tree is returned, or the caller gets every violation that
//! was found and no tree at all.
//!
//! # Formats
//!
//! - JSON text via [`DefinitionLoader::parse`]
//! - bincode bytes via [`DefinitionLoader::parse_bytes`]
//! - in-memory definitions via [`DefinitionLoader::load`], usually produced
//!   by [`DefinitionBuilder`]
//!
//! Hosts with several machines load them together into a [`TreeCatalog`]
//! and look trees up by name.
//!
//! # Example
//!
//! ```rust
//! use hsm_runtime::config::HsmConfig;
//! use hsm_runtime::core::StateId;
//! use hsm_runtime::definition::DefinitionLoader;
//!
//! let loader = DefinitionLoader::new(&HsmConfig::default());
//! let tree = loader
//!     .parse::<String>(
//!         r#"{
//!             "states": [
//!                 { "id": 0, "name": "Root" },
//!                 { "id": 1, "name": "Walk", "parent": 0, "tag": "walk" }
//!             ],
//!             "transitions": [
//!                 { "from": 0, "to": 1, "guard": { "flag": "FullEnergy" } }
//!             ]
//!         }"#,
//!     )
//!     .unwrap();
//!
//! assert_eq!(tree.root(), StateId(0));
//! assert_eq!(tree.outgoing(StateId(0)).count(), 1);
//! ```

mod builder;
mod catalog;
mod document;
mod error;
mod validate;

pub use builder::DefinitionBuilder;
pub use catalog::{CatalogDefinition, NamedTree, TreeCatalog};
pub use document::{StateDef, TransitionDef, TreeDefinition};
pub use error::{DefinitionError, Violation};

use crate::config::HsmConfig;
use crate::core::{EntryTag, State, StateId, StateTree, Transition};
use std::collections::HashMap;
use std::sync::Arc;
use stillwater::validation::Validation;

/// Parses and validates definitions into state trees.
#[derive(Clone, Debug)]
pub struct DefinitionLoader {
    max_depth: Option<usize>,
}

impl DefinitionLoader {
    pub fn new(config: &HsmConfig) -> Self {
        Self {
            max_depth: config.max_depth,
        }
    }

    /// Parse a JSON definition.
    pub fn parse<T: EntryTag>(&self, text: &str) -> Result<StateTree<T>, DefinitionError> {
        let definition: TreeDefinition<T> =
            serde_json::from_str(text).map_err(|e| DefinitionError::Malformed(e.to_string()))?;
        self.load(definition)
    }

    /// Parse a bincode definition produced by [`TreeDefinition::to_bytes`].
    pub fn parse_bytes<T: EntryTag>(&self, bytes: &[u8]) -> Result<StateTree<T>, DefinitionError> {
        let definition: TreeDefinition<T> =
            bincode::deserialize(bytes).map_err(|e| DefinitionError::Malformed(e.to_string()))?;
        self.load(definition)
    }

    /// Validate an in-memory definition and build the tree.
    pub fn load<T: EntryTag>(
        &self,
        definition: TreeDefinition<T>,
    ) -> Result<StateTree<T>, DefinitionError> {
        if let Validation::Failure(errors) = validate::validate(&definition, self.max_depth) {
            let violations: Vec<Violation> = errors.iter().cloned().collect();
            tracing::warn!(
                violations = violations.len(),
                first = ?violations.first(),
                "rejected state tree definition"
            );
            return Err(DefinitionError::Invalid(violations));
        }

        let tree = build(definition)?;
        tracing::info!(
            states = tree.len(),
            transitions = tree.transitions().len(),
            root = %tree.root(),
            initial = %tree.initial(),
            "state tree loaded"
        );
        Ok(tree)
    }

    /// Parse a JSON catalog of named definitions.
    pub fn parse_catalog<T: EntryTag>(
        &self,
        text: &str,
    ) -> Result<TreeCatalog<T>, DefinitionError> {
        let catalog: CatalogDefinition<T> =
            serde_json::from_str(text).map_err(|e| DefinitionError::Malformed(e.to_string()))?;
        self.load_catalog(catalog)
    }

    /// Parse a bincode catalog produced by [`CatalogDefinition::to_bytes`].
    pub fn parse_catalog_bytes<T: EntryTag>(
        &self,
        bytes: &[u8],
    ) -> Result<TreeCatalog<T>, DefinitionError> {
        let catalog: CatalogDefinition<T> =
            bincode::deserialize(bytes).map_err(|e| DefinitionError::Malformed(e.to_string()))?;
        self.load_catalog(catalog)
    }

    /// Load every named definition. A duplicate name or a single invalid
    /// tree fails the whole catalog.
    pub fn load_catalog<T: EntryTag>(
        &self,
        catalog: CatalogDefinition<T>,
    ) -> Result<TreeCatalog<T>, DefinitionError> {
        let mut trees = HashMap::with_capacity(catalog.trees.len());
        for NamedTree { name, tree } in catalog.trees {
            if trees.contains_key(&name) {
                tracing::warn!(tree = %name, "duplicate tree name in catalog");
                return Err(DefinitionError::DuplicateTree(name));
            }
            let loaded = self.load(tree).map_err(|e| DefinitionError::InvalidTree {
                name: name.clone(),
                source: Box::new(e),
            })?;
            trees.insert(name, Arc::new(loaded));
        }

        tracing::info!(trees = trees.len(), "tree catalog loaded");
        Ok(TreeCatalog { trees })
    }
}

impl Default for DefinitionLoader {
    fn default() -> Self {
        Self::new(&HsmConfig::default())
    }
}

/// Assemble a tree from a definition that passed validation.
fn build<T: EntryTag>(definition: TreeDefinition<T>) -> Result<StateTree<T>, DefinitionError> {
    let TreeDefinition {
        initial,
        states: declared,
        transitions: declared_transitions,
    } = definition;

    let index: HashMap<StateId, usize> = declared
        .iter()
        .enumerate()
        .map(|(i, s)| (s.id, i))
        .collect();

    let mut states: Vec<State<T>> = declared
        .into_iter()
        .map(|s| State {
            id: s.id,
            name: s.name,
            parent: s.parent,
            children: Vec::new(),
            outgoing: Vec::new(),
            tag: s.tag,
            capabilities: s.capabilities,
        })
        .collect();

    let links: Vec<(StateId, StateId)> = states
        .iter()
        .filter_map(|s| s.parent.map(|p| (p, s.id)))
        .collect();
    for (parent, child) in links {
        if let Some(&slot) = index.get(&parent) {
            states[slot].children.push(child);
        }
    }

    let mut transitions = Vec::with_capacity(declared_transitions.len());
    for (order, t) in declared_transitions.into_iter().enumerate() {
        if let Some(&slot) = index.get(&t.from) {
            states[slot].outgoing.push(order);
        }
        transitions.push(Transition {
            from: t.from,
            to: t.to,
            guard: t.guard,
            priority: t.priority,
            order,
        });
    }

    let root = states
        .iter()
        .find(|s| s.parent.is_none())
        .map(|s| s.id)
        .ok_or_else(|| DefinitionError::Invalid(vec![Violation::MissingRoot]))?;

    Ok(StateTree {
        states,
        transitions,
        index,
        root,
        initial: initial.unwrap_or(root),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Capability, Guard};
    use serde::{Deserialize, Serialize};

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum Phase {
        Standby,
        Charge,
        Release,
    }

    const ABILITY: &str = r#"{
        "initial": 1,
        "states": [
            { "id": 0, "name": "Ability" },
            { "id": 1, "name": "Standby", "parent": 0, "tag": "Standby" },
            { "id": 2, "name": "Charge", "parent": 0, "tag": "Charge",
              "capabilities": ["issues_requests"] },
            { "id": 3, "name": "Release", "parent": 0, "tag": "Release",
              "capabilities": ["issues_requests", "consumes_environment"] }
        ],
        "transitions": [
            { "from": 1, "to": 2, "guard": { "all": [
                { "flag": "EnableFire" },
                { "compare": { "param": "EnergyEnougth", "op": "eq", "value": { "bool": true } } }
            ] } },
            { "from": 2, "to": 3, "priority": 1, "guard": { "flag": "FocoFull" } },
            { "from": 3, "to": 1 }
        ]
    }"#;

    fn loader() -> DefinitionLoader {
        DefinitionLoader::default()
    }

    #[test]
    fn parses_json_definition() {
        let tree: StateTree<Phase> = loader().parse(ABILITY).unwrap();

        assert_eq!(tree.len(), 4);
        assert_eq!(tree.root(), StateId(0));
        assert_eq!(tree.initial(), StateId(1));
        assert_eq!(tree.get(StateId(2)).and_then(State::tag), Some(&Phase::Charge));
        assert_eq!(
            tree.children(StateId(0)).map(State::id).collect::<Vec<_>>(),
            vec![StateId(1), StateId(2), StateId(3)]
        );
        assert_eq!(tree.states_with(Capability::IssuesRequests).count(), 2);
        assert_eq!(tree.transitions()[2].guard, Guard::Always);
        assert_eq!(tree.transitions()[1].priority, 1);
        assert_eq!(tree.transitions()[1].order, 1);
    }

    #[test]
    fn malformed_json_is_rejected() {
        let result = loader().parse::<Phase>("{ \"states\": [ { \"id\": \"zero\" } ] }");
        assert!(matches!(result, Err(DefinitionError::Malformed(_))));
        assert!(result.unwrap_err().violations().is_empty());
    }

    #[test]
    fn invalid_definition_reports_offending_ids() {
        let text = r#"{
            "states": [
                { "id": 0, "name": "R" },
                { "id": 1, "name": "A", "parent": 0 },
                { "id": 1, "name": "B", "parent": 0 }
            ],
            "transitions": [ { "from": 1, "to": 8 } ]
        }"#;

        let err = loader().parse::<()>(text).unwrap_err();

        let violations = err.violations();
        assert_eq!(violations.len(), 2);
        assert!(violations.contains(&Violation::DuplicateStateId { id: StateId(1) }));
        assert!(violations.contains(&Violation::UnknownTransitionTarget {
            index: 0,
            to: StateId(8)
        }));
        let message = err.to_string();
        assert!(message.contains("State #1 is declared more than once"));
        assert!(message.contains("Transition 0 targets unknown state #8"));
    }

    #[test]
    fn binary_definition_matches_json() {
        let tree: StateTree<Phase> = loader().parse(ABILITY).unwrap();
        let bytes = tree.to_definition().to_bytes().unwrap();

        let reloaded: StateTree<Phase> = loader().parse_bytes(&bytes).unwrap();

        assert_eq!(reloaded.to_definition(), tree.to_definition());
        assert_eq!(reloaded.initial(), StateId(1));
    }

    #[test]
    fn truncated_bytes_are_malformed() {
        let tree: StateTree<Phase> = loader().parse(ABILITY).unwrap();
        let bytes = tree.to_definition().to_bytes().unwrap();

        let result = loader().parse_bytes::<Phase>(&bytes[..bytes.len() / 2]);
        assert!(matches!(result, Err(DefinitionError::Malformed(_))));
    }

    #[test]
    fn to_definition_omits_initial_equal_to_root() {
        let text = r#"{ "states": [ { "id": 4, "name": "Only" } ] }"#;
        let tree: StateTree<()> = loader().parse(text).unwrap();

        let definition = tree.to_definition();
        assert!(definition.initial.is_none());
        assert!(tree.get(StateId(4)).is_some_and(State::is_leaf));
    }

    #[test]
    fn json_round_trip_through_definition() {
        let tree: StateTree<Phase> = loader().parse(ABILITY).unwrap();
        let json = tree.to_definition().to_json().unwrap();

        let reloaded: StateTree<Phase> = loader().parse(&json).unwrap();
        assert_eq!(reloaded.states(), tree.states());
        assert_eq!(reloaded.transitions(), tree.transitions());
    }

    #[test]
    fn depth_limit_comes_from_config() {
        let text = r#"{ "states": [
            { "id": 0, "name": "R" },
            { "id": 1, "name": "A", "parent": 0 },
            { "id": 2, "name": "B", "parent": 1 }
        ] }"#;

        let shallow = DefinitionLoader::new(&HsmConfig::default().with_max_depth(1).unwrap());
        let err = shallow.parse::<()>(text).unwrap_err();
        assert!(matches!(
            err.violations(),
            [Violation::TooDeep { depth: 2, .. }]
        ));
        assert!(loader().parse::<()>(text).is_ok());
    }

    #[test]
    fn default_loader_accepts_deep_chains() {
        let chain = (1..=65).map(|id| StateDef::new(id, format!("Level{id}")).parent(id - 1));
        let definition = DefinitionBuilder::<()>::new()
            .state(StateDef::root(0, "Root"))
            .states(chain)
            .build();

        let tree = loader().load(definition).unwrap();

        assert_eq!(tree.len(), 66);
        assert_eq!(tree.depth(StateId(65)), Some(65));
    }
}
