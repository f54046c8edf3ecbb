use crate::stage::StageModel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiberParameters {
    pub length_km: f64,
    pub attenuation_db_per_km: f64,
    pub dispersion_ps_per_nm_km: f64,
}

impl FiberParameters {
    pub fn total_loss_db(&self) -> f64 {
        self.attenuation_db_per_km * self.length_km
    }

    /// The same fiber cut to a fraction of its length.
    pub fn section(&self, fraction: f64) -> FiberParameters {
        FiberParameters {
            length_km: self.length_km * fraction,
            ..self.clone()
        }
    }
}

pub type ChannelParameters = StageModel<FiberParameters>;
