//! Daily Routine
//!
//! This example runs a state tree in automatic mode. A simulated person
//! alternates between resting and two outdoor activities; the transitions
//! are driven purely by the energy parameters the person publishes.
//!
//! Key concepts:
//! - Character tree fetched from a catalog by name
//! - Guarded transitions selected every tick
//! - Boolean and numeric parameters
//! - Nested states under a shared parent
//! - Capability lookup for states that act on the environment
//!
//! Run with: cargo run --example daily_routine

use hsm_runtime::config::HsmConfig;
use hsm_runtime::core::{Capability, Guard, ParameterStore, State, StateId, StateTree};
use hsm_runtime::definition::{
    CatalogDefinition, DefinitionBuilder, DefinitionLoader, StateDef, TransitionDef,
};
use hsm_runtime::runtime::{FnSink, Session, StepOutcome};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
enum Activity {
    Rest,
    Basketball,
    Park,
}

impl Activity {
    /// Location number published through the `MoveTo` parameter.
    fn location(self) -> u32 {
        match self {
            Self::Basketball => 1,
            Self::Park => 2,
            Self::Rest => 3,
        }
    }
}

fn routine() -> DefinitionBuilder<Activity> {
    let tired = Guard::not(Guard::flag("FullEnergy"));
    DefinitionBuilder::new()
        .initial(1)
        .state(StateDef::root(0, "Day"))
        .state(
            StateDef::new(1, "Rest")
                .parent(0)
                .tag(Activity::Rest)
                .capability(Capability::ConsumesEnvironment),
        )
        .state(StateDef::new(2, "Outside").parent(0))
        .state(
            StateDef::new(3, "Basketball")
                .parent(2)
                .tag(Activity::Basketball)
                .capability(Capability::ConsumesEnvironment),
        )
        .state(
            StateDef::new(4, "Park")
                .parent(2)
                .tag(Activity::Park)
                .capability(Capability::ConsumesEnvironment),
        )
        .transition(
            TransitionDef::new(1, 3)
                .when(Guard::flag("FullEnergy").and(Guard::flag("PlayBasketBall"))),
        )
        .transition(
            TransitionDef::new(1, 4)
                .when(Guard::flag("FullEnergy").and(Guard::flag("StrollPark")))
                .priority(1),
        )
        .transition(TransitionDef::new(3, 1).when(tired.clone()))
        .transition(TransitionDef::new(4, 1).when(tired))
}

/// The person the tree controls.
struct Person {
    energy: f64,
    location: u32,
    outings: u32,
}

impl Person {
    /// Act for one tick in the given activity and publish the results.
    fn act(&mut self, activity: Activity, params: &mut ParameterStore) {
        let destination = activity.location();
        if self.location != destination {
            self.location = destination;
            params.set("MoveTo", destination);
            return;
        }

        match activity {
            Activity::Rest => self.energy = (self.energy + 30.0).min(100.0),
            Activity::Basketball | Activity::Park => self.energy -= 25.0,
        }

        if self.energy >= 100.0 {
            self.outings += 1;
            let basketball = self.outings % 2 == 1;
            params.set("FullEnergy", true);
            params.set("PlayBasketBall", basketball);
            params.set("StrollPark", !basketball);
        } else if self.energy <= 20.0 {
            params.set("FullEnergy", false);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "hsm_runtime=debug".to_string()),
        )
        .init();

    println!("=== Daily Routine ===\n");

    let config = HsmConfig::default();
    let characters = CatalogDefinition::new().tree("Human", routine().build());
    let tree: Arc<StateTree<Activity>> = match DefinitionLoader::new(&config)
        .load_catalog(characters)
        .and_then(|catalog| catalog.get("Human"))
    {
        Ok(tree) => tree,
        Err(err) => {
            eprintln!("Failed to load routine: {err}");
            return;
        }
    };

    let consumers: Vec<&str> = tree
        .states_with(Capability::ConsumesEnvironment)
        .map(State::name)
        .collect();
    println!("States acting on the person: {consumers:?}\n");

    let sink = FnSink::new(|state: StateId, tag: Option<&Activity>| {
        println!("  -> now in {state} {tag:?}");
    });
    let mut session = Session::new(Arc::clone(&tree), ParameterStore::new(), sink, &config);
    let mut person = Person {
        energy: 100.0,
        location: Activity::Rest.location(),
        outings: 0,
    };
    person.act(Activity::Rest, session.parameters_mut());

    for tick in 0..16 {
        if let StepOutcome::Transitioned { from, to } = session.execute() {
            println!("Tick {tick}: {from} -> {to}");
        }

        let activity = session.active().and_then(State::tag).copied();
        if let Some(activity) = activity {
            person.act(activity, session.parameters_mut());
        }
        println!(
            "Tick {tick}: energy {:>5.1}, at location {}",
            person.energy,
            session.parameters().get_number("MoveTo")
        );
    }

    println!("\nPath: {:?}", session.history().get_path());
    println!("\n=== Example Complete ===");
}
