//! Optical and opto-electronic device models, one per pipeline stage.

pub mod amplifier;
pub mod fiber;
pub mod laser;
pub mod modulator;
pub mod receiver;

pub use amplifier::{BelowFloor, OpticalAmplifier};
pub use fiber::FiberChannel;
pub use laser::LaserSource;
pub use modulator::Modulator;
pub use receiver::Receiver;
