//! Ability Phase Coordinator
//!
//! This example drives a state tree in manual mode. The tree is a catalog
//! of ability phases; a coordinator decides the phase every tick from its
//! own parameters and forces the matching state.
//!
//! Key concepts:
//! - Skill trees loaded once into a catalog and fetched by name
//! - Automatic transitions disabled
//! - Phase lookup by entry tag
//! - Request tracking suppresses duplicate in-flight requests
//! - Responses clear pending requests, duplicates are harmless
//!
//! Run with: cargo run --example ability_phases

use hsm_runtime::config::HsmConfig;
use hsm_runtime::core::{Capability, ParameterStore, State, StateId, StateTree};
use hsm_runtime::definition::DefinitionLoader;
use hsm_runtime::runtime::{ActionSink, Session};
use hsm_runtime::tracker::RequestTracker;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
enum Phase {
    Standby,
    Charge,
    Release,
    Hold,
}

const SKILLS: &str = r#"{
    "trees": [
        {
            "name": "Blaster",
            "tree": {
                "initial": 1,
                "states": [
                    { "id": 0, "name": "Ability" },
                    { "id": 1, "name": "Standby", "parent": 0, "tag": "Standby" },
                    { "id": 2, "name": "Charge", "parent": 0, "tag": "Charge",
                      "capabilities": ["issues_requests"] },
                    { "id": 3, "name": "Release", "parent": 0, "tag": "Release",
                      "capabilities": ["issues_requests", "consumes_environment"] },
                    { "id": 4, "name": "Hold", "parent": 0, "tag": "Hold" }
                ]
            }
        },
        {
            "name": "Dash",
            "tree": {
                "initial": 1,
                "states": [
                    { "id": 0, "name": "Ability" },
                    { "id": 1, "name": "Standby", "parent": 0, "tag": "Standby" },
                    { "id": 2, "name": "Release", "parent": 0, "tag": "Release",
                      "capabilities": ["issues_requests"] }
                ]
            }
        }
    ]
}"#;

/// Sends a request to the simulated ability system on every phase entry.
#[derive(Default)]
struct Outbox {
    sent: Vec<Phase>,
}

impl ActionSink<Phase> for Outbox {
    fn on_enter(&mut self, state: StateId, tag: Option<&Phase>) {
        if let Some(phase) = tag {
            println!("  -> entered {state} ({phase:?}), request sent");
            self.sent.push(*phase);
        }
    }
}

/// Owns the session and decides the phase from coordinator parameters.
struct Coordinator {
    tree: Arc<StateTree<Phase>>,
    session: Session<Phase, Outbox>,
    requests: RequestTracker<Phase>,
}

impl Coordinator {
    fn new(tree: Arc<StateTree<Phase>>, config: &HsmConfig) -> Self {
        let session = Session::new(
            Arc::clone(&tree),
            ParameterStore::new(),
            Outbox::default(),
            config,
        );
        Self {
            tree,
            session,
            requests: RequestTracker::new(),
        }
    }

    fn desired_phase(&self) -> Phase {
        let params = self.session.parameters();
        let ready = params.get_bool("EnableFire") && params.get_bool("EnergyEnough");
        match (ready, params.get_bool("FocusFull"), params.get_bool("PhaseOrHold")) {
            (false, _, _) => Phase::Standby,
            (true, _, false) => Phase::Hold,
            (true, false, true) => Phase::Charge,
            (true, true, true) => Phase::Release,
        }
    }

    fn tick(&mut self) {
        self.session.execute();

        let wanted = self.desired_phase();
        let Some(target) = self.tree.find_by_tag(|p| *p == wanted).map(State::id) else {
            return;
        };
        if target == self.session.active_state() {
            return;
        }

        let issues = self
            .tree
            .get(target)
            .is_some_and(|s| s.has_capability(Capability::IssuesRequests));
        if issues && !self.requests.add_if_absent(wanted) {
            println!("  .. {wanted:?} already pending, skipped");
            return;
        }
        if let Err(err) = self.session.force_transition(target) {
            eprintln!("  !! {err}");
        }
    }

    fn receive(&mut self, phase: Phase) {
        match self.requests.remove_request(&phase) {
            Some(request) => println!("  <- response for {phase:?} ({})", request.id),
            None => println!("  <- late response for {phase:?} ignored"),
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "hsm_runtime=info".to_string()),
        )
        .init();

    println!("=== Ability Phase Coordinator ===\n");

    let config = HsmConfig::default().with_auto_transition(false);
    let skills = match DefinitionLoader::new(&config).parse_catalog::<Phase>(SKILLS) {
        Ok(skills) => skills,
        Err(err) => {
            eprintln!("Failed to load skill catalog: {err}");
            return;
        }
    };
    println!("Loaded skills: {:?}\n", skills.names());

    let tree = match skills.get("Blaster") {
        Ok(tree) => tree,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };
    let mut coordinator = Coordinator::new(tree, &config);

    let script: [(&str, &[(&str, bool)]); 6] = [
        (
            "fire pressed",
            &[("EnableFire", true), ("EnergyEnough", true), ("PhaseOrHold", true)],
        ),
        ("holding", &[]),
        ("focus full", &[("FocusFull", true)]),
        ("fire released", &[("EnableFire", false)]),
        ("fire pressed again", &[("EnableFire", true), ("FocusFull", false)]),
        ("hold", &[("PhaseOrHold", false)]),
    ];

    for (tick, (label, inputs)) in script.iter().enumerate() {
        println!("Tick {tick}: {label}");
        for (name, value) in inputs.iter() {
            coordinator.session.set_parameter(*name, *value);
        }
        coordinator.tick();

        if tick == 2 {
            coordinator.receive(Phase::Charge);
            coordinator.receive(Phase::Charge);
        }
    }

    println!("\nRequests sent: {:?}", coordinator.session.sink().sent);
    println!("Still pending: {}", coordinator.requests.len());
    println!("Path: {:?}", coordinator.session.history().get_path());

    println!("\n=== Example Complete ===");
}
