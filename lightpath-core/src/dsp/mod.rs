//! Signal processing primitives shared by the pipeline stages.

pub mod bits;
pub mod filter;
pub mod mapping;
pub mod noise;
pub mod pulse;
pub mod spectrum;
