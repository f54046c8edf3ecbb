use crate::stage::StageModel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmplifierPosition {
    /// Booster right after the modulator.
    Start,
    /// In-line, halfway along the fiber.
    Middle,
    /// Pre-amplifier right before the receiver.
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AseNoise {
    pub noise_figure_db: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmplifierParameters {
    pub position: AmplifierPosition,
    pub gain_db: f64,
    #[serde(default)]
    pub detection_floor_dbm: Option<f64>,
    #[serde(default)]
    pub noise: StageModel<AseNoise>,
}
