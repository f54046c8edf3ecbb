//! Signal simulation pipeline for an end-to-end optical fiber link.
//!
//! Bits are mapped to a Gray-coded constellation, pulse shaped, impressed on
//! a laser carrier, sent through fiber and an optional amplifier, detected,
//! and scored against the known transmission. Configure a run with
//! [`SimulationBuilder`] and execute it with [`SimulationEngine::run`].

pub mod analysis;
pub mod devices;
pub mod dsp;
pub mod error;
pub mod logger;
pub mod simulation;
pub mod units;

pub use error::LightpathError;
pub use simulation::{SimulationBuilder, SimulationEngine, SimulationOutcome, SimulationResult};
