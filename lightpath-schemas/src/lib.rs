//! Typed configuration records for the lightpath optical link simulator.
//!
//! Every stage of the link (source, modulator, channel, amplifier, receiver)
//! has its own record. Stages that can be bypassed carry a [`StageModel`]
//! selecting between the ideal element and a physical model.

pub mod amplifier;
pub mod channel;
pub mod file_formats;
pub mod general;
pub mod modulator;
pub mod receiver;
pub mod source;
pub mod stage;

pub use stage::StageModel;
