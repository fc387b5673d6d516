//! Runtime session driving one state tree.

use super::error::RuntimeError;
use super::sink::ActionSink;
use crate::config::HsmConfig;
use crate::core::{
    EntryTag, ParameterStore, State, StateId, StateTree, Transition, TransitionCause,
    TransitionHistory, TransitionRecord, Value,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Result of a single evaluation tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// An enabled transition fired and the target was entered
    Transitioned { from: StateId, to: StateId },

    /// No enabled transition, or the selected one targets the active state
    Stayed,

    /// Automatic transitions are disabled for this session
    Manual,
}

/// A running instance of a state tree.
///
/// The session owns its parameter store and action sink and is driven by a
/// single caller, one [`execute`](Session::execute) per tick. All mutation
/// goes through `&mut self`; hosts that share a session across threads must
/// serialize access themselves.
///
/// # Example
///
/// ```rust
/// use hsm_runtime::config::HsmConfig;
/// use hsm_runtime::core::{Guard, ParameterStore, StateId};
/// use hsm_runtime::definition::{DefinitionBuilder, DefinitionLoader, StateDef, TransitionDef};
/// use hsm_runtime::runtime::{NoopSink, Session, StepOutcome};
/// use std::sync::Arc;
///
/// let config = HsmConfig::default();
/// let definition = DefinitionBuilder::<()>::new()
///     .state(StateDef::root(0, "Idle"))
///     .state(StateDef::new(1, "Busy").parent(0))
///     .transition(TransitionDef::new(0, 1).when(Guard::flag("work")))
///     .build();
/// let tree = Arc::new(DefinitionLoader::new(&config).load(definition).unwrap());
///
/// let mut session = Session::new(tree, ParameterStore::new(), NoopSink, &config);
/// assert_eq!(session.execute(), StepOutcome::Stayed);
///
/// session.set_parameter("work", true);
/// assert_eq!(
///     session.execute(),
///     StepOutcome::Transitioned { from: StateId(0), to: StateId(1) }
/// );
/// ```
pub struct Session<T: EntryTag, A: ActionSink<T>> {
    id: Uuid,
    tree: Arc<StateTree<T>>,
    parameters: ParameterStore,
    sink: A,
    active: StateId,
    auto_transition: bool,
    inherit_transitions: bool,
    history: TransitionHistory,
}

impl<T: EntryTag, A: ActionSink<T>> Session<T, A> {
    /// Bind a tree to a parameter store and an action sink.
    ///
    /// The session starts in the tree's initial state. No entry action is
    /// dispatched for it.
    pub fn new(
        tree: Arc<StateTree<T>>,
        parameters: ParameterStore,
        sink: A,
        config: &HsmConfig,
    ) -> Self {
        let active = tree.initial();
        let id = Uuid::new_v4();
        tracing::debug!(
            session = %id,
            initial = %active,
            auto_transition = config.auto_transition,
            "session created"
        );
        Self {
            id,
            tree,
            parameters,
            sink,
            active,
            auto_transition: config.auto_transition,
            inherit_transitions: config.inherit_transitions,
            history: TransitionHistory::with_limit(config.history_limit),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn tree(&self) -> &Arc<StateTree<T>> {
        &self.tree
    }

    pub fn active_state(&self) -> StateId {
        self.active
    }

    /// The active state itself.
    pub fn active(&self) -> Option<&State<T>> {
        self.tree.get(self.active)
    }

    pub fn auto_transition(&self) -> bool {
        self.auto_transition
    }

    /// Switch between guard-driven and purely forced transitions.
    pub fn set_auto_transition(&mut self, enabled: bool) {
        self.auto_transition = enabled;
    }

    pub fn parameters(&self) -> &ParameterStore {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut ParameterStore {
        &mut self.parameters
    }

    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.parameters.set(name, value);
    }

    pub fn sink(&self) -> &A {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut A {
        &mut self.sink
    }

    pub fn history(&self) -> &TransitionHistory {
        &self.history
    }

    pub fn get_state(&self, id: StateId) -> Result<&State<T>, RuntimeError> {
        self.tree.get(id).ok_or(RuntimeError::NotFound(id))
    }

    /// Every state of the tree in declaration order.
    pub fn list_states(&self) -> &[State<T>] {
        self.tree.states()
    }

    /// Enabled transitions out of the active state, best first.
    ///
    /// Ranked by priority, then by how far up the hierarchy the transition
    /// was declared (own transitions first), then by declaration order.
    pub fn enabled_transitions(&self) -> Vec<&Transition> {
        let mut enabled: Vec<(usize, &Transition)> = self
            .candidates()
            .filter(|(_, t)| t.guard.evaluate(&self.parameters))
            .collect();
        enabled.sort_by_key(|(depth, t)| t.rank(*depth));
        enabled.into_iter().map(|(_, t)| t).collect()
    }

    /// Run one evaluation tick.
    pub fn execute(&mut self) -> StepOutcome {
        if !self.auto_transition {
            return StepOutcome::Manual;
        }

        let selected = self
            .candidates()
            .filter(|(_, t)| t.guard.evaluate(&self.parameters))
            .min_by_key(|(depth, t)| t.rank(*depth))
            .map(|(_, t)| (t.to, t.order));

        let Some((to, order)) = selected else {
            tracing::trace!(session = %self.id, state = %self.active, "no enabled transition");
            return StepOutcome::Stayed;
        };
        if to == self.active {
            return StepOutcome::Stayed;
        }

        let from = self.active;
        self.enter(to, TransitionCause::Guard { transition: order });
        StepOutcome::Transitioned { from, to }
    }

    /// Move to `target` regardless of guards and dispatch its entry action.
    ///
    /// Guards are not re-evaluated until the next [`execute`](Self::execute).
    /// An unknown target leaves the active state unchanged.
    pub fn force_transition(&mut self, target: StateId) -> Result<(), RuntimeError> {
        if !self.tree.contains(target) {
            tracing::warn!(
                session = %self.id,
                target = %target,
                "forced transition to unknown state"
            );
            return Err(RuntimeError::NotFound(target));
        }
        self.enter(target, TransitionCause::Forced);
        Ok(())
    }

    fn candidates(&self) -> impl Iterator<Item = (usize, &Transition)> + '_ {
        let own = self.tree.outgoing(self.active).map(|t| (0, t));
        let inherited = self
            .inherit_transitions
            .then(|| self.tree.ancestors(self.active))
            .into_iter()
            .flatten()
            .enumerate()
            .flat_map(move |(i, ancestor)| {
                self.tree.outgoing(ancestor.id()).map(move |t| (i + 1, t))
            });
        own.chain(inherited)
    }

    fn enter(&mut self, to: StateId, cause: TransitionCause) {
        let from = std::mem::replace(&mut self.active, to);
        self.history.record(TransitionRecord {
            from,
            to,
            cause,
            timestamp: Utc::now(),
        });
        tracing::debug!(session = %self.id, from = %from, to = %to, ?cause, "entered state");

        let tag = self.tree.get(to).and_then(State::tag);
        self.sink.on_enter(to, tag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Guard, TransitionCause};
    use crate::definition::{DefinitionBuilder, DefinitionLoader, StateDef, TransitionDef};

    #[derive(Default)]
    struct Recorder {
        entered: Vec<(StateId, Option<String>)>,
    }

    impl ActionSink<String> for Recorder {
        fn on_enter(&mut self, state: StateId, tag: Option<&String>) {
            self.entered.push((state, tag.cloned()));
        }
    }

    //        0:Root
    //       /      \
    //   1:Standby  2:Fire
    //              /    \
    //          3:Shot  4:Reload
    fn tree(config: &HsmConfig) -> Arc<StateTree<String>> {
        let definition = DefinitionBuilder::new()
            .state(StateDef::root(0, "Root"))
            .state(StateDef::new(1, "Standby").parent(0).tag("standby".to_string()))
            .state(StateDef::new(2, "Fire").parent(0).tag("fire".to_string()))
            .state(StateDef::new(3, "Shot").parent(2).tag("shot".to_string()))
            .state(StateDef::new(4, "Reload").parent(2))
            .transition(TransitionDef::new(0, 1))
            .transition(TransitionDef::new(1, 3).when(Guard::flag("EnableFire")))
            .transition(TransitionDef::new(3, 4).when(Guard::flag("Empty")))
            .transition(TransitionDef::new(2, 1).when(Guard::flag("Cancel")))
            .build();
        Arc::new(DefinitionLoader::new(config).load(definition).unwrap())
    }

    fn session(config: HsmConfig) -> Session<String, Recorder> {
        Session::new(tree(&config), ParameterStore::new(), Recorder::default(), &config)
    }

    #[test]
    fn starts_in_initial_state_without_dispatch() {
        let session = session(HsmConfig::default());

        assert_eq!(session.active_state(), StateId(0));
        assert_eq!(session.active().map(State::name), Some("Root"));
        assert!(session.sink().entered.is_empty());
        assert!(session.history().transitions().is_empty());
    }

    #[test]
    fn execute_follows_enabled_transitions() {
        let mut session = session(HsmConfig::default());

        assert_eq!(
            session.execute(),
            StepOutcome::Transitioned {
                from: StateId(0),
                to: StateId(1)
            }
        );
        assert_eq!(session.execute(), StepOutcome::Stayed);

        session.set_parameter("EnableFire", true);
        assert_eq!(
            session.execute(),
            StepOutcome::Transitioned {
                from: StateId(1),
                to: StateId(3)
            }
        );
        assert_eq!(
            session.sink().entered,
            vec![
                (StateId(1), Some("standby".to_string())),
                (StateId(3), Some("shot".to_string())),
            ]
        );
    }

    #[test]
    fn manual_mode_never_moves() {
        let mut session = session(HsmConfig::default().with_auto_transition(false));
        session.set_parameter("EnableFire", true);

        for _ in 0..3 {
            assert_eq!(session.execute(), StepOutcome::Manual);
        }
        assert_eq!(session.active_state(), StateId(0));
        assert!(session.sink().entered.is_empty());

        session.force_transition(StateId(4)).unwrap();
        assert_eq!(session.active_state(), StateId(4));
        assert_eq!(session.sink().entered, vec![(StateId(4), None)]);
    }

    #[test]
    fn auto_transition_can_be_toggled() {
        let mut session = session(HsmConfig::default());
        session.set_auto_transition(false);
        assert!(!session.auto_transition());
        assert_eq!(session.execute(), StepOutcome::Manual);

        session.set_auto_transition(true);
        assert!(matches!(session.execute(), StepOutcome::Transitioned { .. }));
    }

    #[test]
    fn force_transition_to_unknown_state_is_reported() {
        let mut session = session(HsmConfig::default());

        assert_eq!(
            session.force_transition(StateId(99)),
            Err(RuntimeError::NotFound(StateId(99)))
        );
        assert_eq!(session.active_state(), StateId(0));
        assert!(session.sink().entered.is_empty());
    }

    #[test]
    fn force_transition_waits_for_next_tick() {
        let mut session = session(HsmConfig::default());
        session.set_parameter("EnableFire", true);

        session.force_transition(StateId(1)).unwrap();
        assert_eq!(session.active_state(), StateId(1));
        assert_eq!(session.sink().entered.len(), 1);

        assert_eq!(
            session.execute(),
            StepOutcome::Transitioned {
                from: StateId(1),
                to: StateId(3)
            }
        );
    }

    #[test]
    fn force_transition_to_active_state_dispatches_again() {
        let mut session = session(HsmConfig::default());
        session.force_transition(StateId(1)).unwrap();
        session.force_transition(StateId(1)).unwrap();

        assert_eq!(session.sink().entered.len(), 2);
    }

    #[test]
    fn ancestor_transitions_ignored_by_default() {
        let mut session = session(HsmConfig::default());
        session.force_transition(StateId(3)).unwrap();
        session.set_parameter("Cancel", true);

        assert_eq!(session.execute(), StepOutcome::Stayed);
        assert!(session.enabled_transitions().is_empty());
    }

    #[test]
    fn inherited_transitions_rank_after_own() {
        let mut session = session(HsmConfig::default().with_inherit_transitions(true));
        session.force_transition(StateId(3)).unwrap();
        session.set_parameter("Cancel", true);
        session.set_parameter("Empty", true);

        let targets: Vec<StateId> = session
            .enabled_transitions()
            .iter()
            .map(|t| t.to)
            .collect();
        assert_eq!(targets, vec![StateId(4), StateId(1), StateId(1)]);

        session.set_parameter("Empty", false);
        assert_eq!(
            session.execute(),
            StepOutcome::Transitioned {
                from: StateId(3),
                to: StateId(1)
            }
        );
    }

    #[test]
    fn history_records_causes() {
        let mut session = session(HsmConfig::default());
        session.execute();
        session.force_transition(StateId(2)).unwrap();

        let causes: Vec<TransitionCause> = session
            .history()
            .transitions()
            .iter()
            .map(|r| r.cause)
            .collect();
        assert_eq!(
            causes,
            vec![TransitionCause::Guard { transition: 0 }, TransitionCause::Forced]
        );
        assert_eq!(
            session.history().get_path(),
            vec![StateId(0), StateId(1), StateId(2)]
        );
    }

    #[test]
    fn structural_queries() {
        let session = session(HsmConfig::default());

        assert_eq!(session.list_states().len(), 5);
        assert_eq!(session.get_state(StateId(2)).map(State::name), Ok("Fire"));
        assert_eq!(
            session.get_state(StateId(7)).map(State::name),
            Err(RuntimeError::NotFound(StateId(7)))
        );
    }

    #[test]
    fn sessions_share_one_tree() {
        let config = HsmConfig::default();
        let tree = tree(&config);
        let mut first = Session::new(
            Arc::clone(&tree),
            ParameterStore::new(),
            Recorder::default(),
            &config,
        );
        let second = Session::new(
            Arc::clone(&tree),
            ParameterStore::new(),
            Recorder::default(),
            &config,
        );

        first.execute();
        assert_eq!(first.active_state(), StateId(1));
        assert_eq!(second.active_state(), StateId(0));
        assert_ne!(first.id(), second.id());
        assert_eq!(Arc::strong_count(&tree), 3);
    }
}
