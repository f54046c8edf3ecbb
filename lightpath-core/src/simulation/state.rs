use crate::{analysis::LinkMetrics, dsp::spectrum::PowerSpectrum};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Named signals recorded along the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKey {
    /// Pulse-shaped drive waveform.
    ElectricalTx,
    /// Unmodulated laser output.
    OpticalCarrier,
    OpticalTx,
    /// Field at the receiver input.
    OpticalRx,
    ElectricalRx,
    /// Transmitted constellation symbols, one sample per symbol.
    TxSymbols,
    /// Receiver output sampled at symbol centres.
    RxSymbols,
}

impl SignalKey {
    pub const ALL: [SignalKey; 7] = [
        SignalKey::ElectricalTx,
        SignalKey::OpticalCarrier,
        SignalKey::OpticalTx,
        SignalKey::OpticalRx,
        SignalKey::ElectricalRx,
        SignalKey::TxSymbols,
        SignalKey::RxSymbols,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKey::ElectricalTx => "electrical_tx",
            SignalKey::OpticalCarrier => "optical_carrier",
            SignalKey::OpticalTx => "optical_tx",
            SignalKey::OpticalRx => "optical_rx",
            SignalKey::ElectricalRx => "electrical_rx",
            SignalKey::TxSymbols => "tx_symbols",
            SignalKey::RxSymbols => "rx_symbols",
        }
    }

    /// Symbol-rate signals carry one sample per symbol instead of `sps`.
    pub fn is_symbol_rate(&self) -> bool {
        matches!(self, SignalKey::TxSymbols | SignalKey::RxSymbols)
    }
}

impl fmt::Display for SignalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignalKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SignalKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("unknown signal '{}'", s))
    }
}

/// Stage at which the signal fell below a power floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Amplifier,
    Receiver,
}

/// Output of a completed run. Created fresh per run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub sample_rate: f64,
    pub samples_per_symbol: usize,
    pub symbol_rate: f64,
    pub signals: BTreeMap<SignalKey, Vec<Complex64>>,
    pub spectra: BTreeMap<SignalKey, PowerSpectrum>,
    /// Transmitted and decided symbol indices.
    pub tx_indices: Vec<usize>,
    pub rx_indices: Vec<usize>,
    /// Expected noiseless receiver output per symbol index.
    pub reference: Vec<Complex64>,
    pub metrics: LinkMetrics,
}

impl SimulationResult {
    pub fn signal(&self, key: SignalKey) -> Option<&[Complex64]> {
        self.signals.get(&key).map(Vec::as_slice)
    }

    /// Sample rate of the given signal.
    pub fn rate_of(&self, key: SignalKey) -> f64 {
        if key.is_symbol_rate() {
            self.symbol_rate
        } else {
            self.sample_rate
        }
    }
}

/// What a run produced: a full result, or the explicit detection-failure
/// state in which no receiver output exists.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationOutcome {
    Completed(Box<SimulationResult>),
    DetectionFailure {
        stage: FailureStage,
        power_dbm: f64,
        floor_dbm: f64,
    },
}

impl SimulationOutcome {
    pub fn result(&self) -> Option<&SimulationResult> {
        match self {
            SimulationOutcome::Completed(result) => Some(result.as_ref()),
            SimulationOutcome::DetectionFailure { .. } => None,
        }
    }

    pub fn is_detection_failure(&self) -> bool {
        matches!(self, SimulationOutcome::DetectionFailure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_key_names_round_trip() {
        for key in SignalKey::ALL {
            assert_eq!(key.as_str().parse::<SignalKey>(), Ok(key));
        }
        assert!("receiver_signal".parse::<SignalKey>().is_err());
    }
}
