//! Named collection of loaded state trees.
//!
//! A host loads every tree it needs once, at startup, and then hands out
//! shared references by name. The catalog is immutable after loading.

use super::document::TreeDefinition;
use super::error::DefinitionError;
use crate::core::{EntryTag, StateTree};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// One named entry of a [`CatalogDefinition`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct NamedTree<T: EntryTag> {
    pub name: String,
    pub tree: TreeDefinition<T>,
}

/// Unvalidated list of named tree definitions.
///
/// ```json
/// {
///   "trees": [
///     { "name": "Human", "tree": { "states": [ { "id": 0, "name": "Day" } ] } }
///   ]
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct CatalogDefinition<T: EntryTag> {
    #[serde(default)]
    pub trees: Vec<NamedTree<T>>,
}

impl<T: EntryTag> CatalogDefinition<T> {
    pub fn new() -> Self {
        Self { trees: Vec::new() }
    }

    /// Add a named definition. Names are checked for uniqueness at load.
    pub fn tree(mut self, name: impl Into<String>, tree: TreeDefinition<T>) -> Self {
        self.trees.push(NamedTree {
            name: name.into(),
            tree,
        });
        self
    }

    pub fn to_json(&self) -> Result<String, DefinitionError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| DefinitionError::SerializationFailed(e.to_string()))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DefinitionError> {
        bincode::serialize(self).map_err(|e| DefinitionError::SerializationFailed(e.to_string()))
    }
}

impl<T: EntryTag> Default for CatalogDefinition<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Loaded trees keyed by name.
///
/// Built by [`DefinitionLoader::load_catalog`](super::DefinitionLoader::load_catalog)
/// and friends. Either every tree loads or the catalog is not built.
///
/// # Example
///
/// ```rust
/// use hsm_runtime::definition::{
///     CatalogDefinition, DefinitionBuilder, DefinitionLoader, StateDef,
/// };
///
/// let catalog = DefinitionLoader::default()
///     .load_catalog(
///         CatalogDefinition::<()>::new()
///             .tree("Human", DefinitionBuilder::new().state(StateDef::root(0, "Day")).build()),
///     )
///     .unwrap();
///
/// let tree = catalog.get("Human").unwrap();
/// assert_eq!(tree.len(), 1);
/// assert!(catalog.get("Robot").is_err());
/// ```
#[derive(Clone, Debug)]
pub struct TreeCatalog<T: EntryTag> {
    pub(crate) trees: HashMap<String, Arc<StateTree<T>>>,
}

impl<T: EntryTag> TreeCatalog<T> {
    /// Shared handle to the tree registered under `name`.
    pub fn get(&self, name: &str) -> Result<Arc<StateTree<T>>, DefinitionError> {
        self.trees
            .get(name)
            .cloned()
            .ok_or_else(|| DefinitionError::UnknownTree(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.trees.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.trees.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<StateTree<T>>)> {
        self.trees.iter().map(|(name, tree)| (name.as_str(), tree))
    }
}
