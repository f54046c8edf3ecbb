use serde::{Deserialize, Serialize};

/// Selects whether a stage is bypassed as an ideal element or driven by a
/// physical model with its own parameter record.
///
/// In YAML this is written with a `model` key next to the parameters:
///
/// ```yaml
/// model: modeled
/// linewidth_hz: 1000.0
/// rin_variance: 1.0e-20
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum StageModel<P> {
    Ideal,
    Modeled(P),
}

impl<P> StageModel<P> {
    pub fn is_ideal(&self) -> bool {
        matches!(self, StageModel::Ideal)
    }

    pub fn modeled(&self) -> Option<&P> {
        match self {
            StageModel::Ideal => None,
            StageModel::Modeled(params) => Some(params),
        }
    }
}

impl<P> Default for StageModel<P> {
    fn default() -> Self {
        StageModel::Ideal
    }
}
