pub mod builder;
pub mod engine;
pub mod state;

pub use builder::SimulationBuilder;
pub use engine::SimulationEngine;
pub use state::{FailureStage, SignalKey, SimulationOutcome, SimulationResult};
