use crate::stage::StageModel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiverKind {
    /// Square-law direct detection.
    Photodiode,
    /// Field detection against an ideal local oscillator.
    Coherent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermalNoise {
    pub temperature_k: f64,
    pub load_resistance_ohm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiverResponse {
    pub bandwidth_hz: f64,
    #[serde(default)]
    pub thermal_noise: Option<ThermalNoise>,
    #[serde(default)]
    pub shot_noise: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiverParameters {
    pub kind: ReceiverKind,
    #[serde(default = "default_responsivity")]
    pub responsivity_a_per_w: f64,
    #[serde(default)]
    pub sensitivity_dbm: Option<f64>,
    #[serde(default)]
    pub response: StageModel<ReceiverResponse>,
}

fn default_responsivity() -> f64 {
    1.0
}
