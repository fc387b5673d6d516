//! Structural validation of definitions.
//!
//! Uses Stillwater's `Validation` to accumulate every violation instead of
//! stopping at the first one, so a broken definition is reported in full.

use super::document::TreeDefinition;
use super::error::Violation;
use crate::core::{EntryTag, StateId};
use std::collections::{HashMap, HashSet};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<Violation>>;

fn require(ok: bool, violation: impl FnOnce() -> Violation) -> Check {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(violation())
    }
}

/// Validate a definition, accumulating ALL violations.
pub(crate) fn validate<T: EntryTag>(
    definition: &TreeDefinition<T>,
    max_depth: Option<usize>,
) -> Check {
    if definition.states.is_empty() {
        return Validation::fail(Violation::EmptyDefinition);
    }

    let mut checks: Vec<Check> = Vec::new();

    // First declaration wins for duplicated ids.
    let mut parents: HashMap<StateId, Option<StateId>> = HashMap::new();
    for state in &definition.states {
        let fresh = !parents.contains_key(&state.id);
        checks.push(require(fresh, || Violation::DuplicateStateId { id: state.id }));
        if fresh {
            parents.insert(state.id, state.parent);
        }
    }

    let roots: Vec<StateId> = definition
        .states
        .iter()
        .filter(|s| s.parent.is_none())
        .map(|s| s.id)
        .collect();
    match roots.len() {
        0 => checks.push(Validation::fail(Violation::MissingRoot)),
        1 => {}
        _ => checks.push(Validation::fail(Violation::MultipleRoots { ids: roots })),
    }

    for state in &definition.states {
        if let Some(parent) = state.parent {
            checks.push(require(parents.contains_key(&parent), || {
                Violation::UnknownParent {
                    state: state.id,
                    parent,
                }
            }));
        }
    }

    let mut walked: HashSet<StateId> = HashSet::new();
    for state in &definition.states {
        if !walked.insert(state.id) {
            continue;
        }
        checks.push(check_ancestry(state.id, &parents, max_depth));
    }

    let known = |id: StateId| parents.contains_key(&id);
    for (index, transition) in definition.transitions.iter().enumerate() {
        checks.push(require(known(transition.from), || {
            Violation::UnknownTransitionSource {
                index,
                from: transition.from,
            }
        }));
        checks.push(require(known(transition.to), || {
            Violation::UnknownTransitionTarget {
                index,
                to: transition.to,
            }
        }));
    }

    if let Some(initial) = definition.initial {
        checks.push(require(known(initial), || Violation::UnknownInitialState {
            id: initial,
        }));
    }

    Validation::all_vec(checks).map(|_| ())
}

/// Walk the parent chain of `id`.
///
/// Reports a cycle only for states that lie on it; states leading into a
/// cycle are left to the cycle members' reports. Unknown parents end the
/// walk silently since they are reported separately. Depth is only checked
/// when a limit is configured.
fn check_ancestry(
    id: StateId,
    parents: &HashMap<StateId, Option<StateId>>,
    max_depth: Option<usize>,
) -> Check {
    let mut visited: HashSet<StateId> = HashSet::from([id]);
    let mut current = id;
    let mut depth = 0;

    while let Some(Some(parent)) = parents.get(&current) {
        if *parent == id {
            return Validation::fail(Violation::Cycle { state: id });
        }
        if !visited.insert(*parent) {
            return Validation::success(());
        }
        depth += 1;
        current = *parent;
    }

    match max_depth {
        Some(max) => require(depth <= max, || Violation::TooDeep {
            state: id,
            depth,
            max,
        }),
        None => Validation::success(()),
    }
}
