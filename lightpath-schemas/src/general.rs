use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModulationFormat {
    Ook,
    Pam,
    Psk,
    Qam,
}

impl ModulationFormat {
    pub fn name(&self) -> &'static str {
        match self {
            ModulationFormat::Ook => "OOK",
            ModulationFormat::Pam => "PAM",
            ModulationFormat::Psk => "PSK",
            ModulationFormat::Qam => "QAM",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum PulseShape {
    /// Rectangular pulse spanning one symbol period.
    Nrz,
    /// Root-raised-cosine pulse.
    Rrc { rolloff: f64, span_symbols: usize },
}

impl Default for PulseShape {
    fn default() -> Self {
        PulseShape::Nrz
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralParameters {
    pub samples_per_symbol: usize,
    /// Symbols per second.
    pub symbol_rate: f64,
    pub modulation_format: ModulationFormat,
    pub modulation_order: usize,
    pub bit_count: usize,
    #[serde(default)]
    pub pulse: PulseShape,
    #[serde(default)]
    pub seed: Option<u64>,
}

impl GeneralParameters {
    /// Samples per second of the simulation grid.
    pub fn sample_rate(&self) -> f64 {
        self.samples_per_symbol as f64 * self.symbol_rate
    }

    pub fn sample_period(&self) -> f64 {
        1.0 / self.sample_rate()
    }

    pub fn symbol_period(&self) -> f64 {
        1.0 / self.symbol_rate
    }

    pub fn bits_per_symbol(&self) -> usize {
        self.modulation_order.max(1).trailing_zeros() as usize
    }

    /// Information bit rate in bits per second.
    pub fn bit_rate(&self) -> f64 {
        self.symbol_rate * self.bits_per_symbol() as f64
    }
}
