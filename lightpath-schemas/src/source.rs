use crate::stage::StageModel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaserNoise {
    pub linewidth_hz: f64,
    pub rin_variance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceParameters {
    pub power_dbm: f64,
    #[serde(default = "default_frequency_thz")]
    pub frequency_thz: f64,
    #[serde(default)]
    pub noise: StageModel<LaserNoise>,
}

impl SourceParameters {
    pub fn frequency_hz(&self) -> f64 {
        self.frequency_thz * 1e12
    }
}

fn default_frequency_thz() -> f64 {
    193.1
}
