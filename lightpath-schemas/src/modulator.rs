use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModulatorParameters {
    /// Phase modulator.
    Pm { v_pi: f64 },
    /// Single-drive Mach-Zehnder modulator.
    Mzm { v_pi: f64, bias: f64 },
    /// Nested (in-phase/quadrature) Mach-Zehnder modulator.
    Iqm { v_pi: f64, bias_i: f64, bias_q: f64 },
}

impl ModulatorParameters {
    pub fn v_pi(&self) -> f64 {
        match self {
            ModulatorParameters::Pm { v_pi }
            | ModulatorParameters::Mzm { v_pi, .. }
            | ModulatorParameters::Iqm { v_pi, .. } => *v_pi,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModulatorParameters::Pm { .. } => "PM",
            ModulatorParameters::Mzm { .. } => "MZM",
            ModulatorParameters::Iqm { .. } => "IQM",
        }
    }

    /// Whether the device accepts a complex (two-dimensional) drive signal.
    pub fn accepts_complex_drive(&self) -> bool {
        matches!(self, ModulatorParameters::Iqm { .. })
    }
}
