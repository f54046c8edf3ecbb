use crate::{
    dsp::{bits::count_bit_errors, mapping::nearest, mapping::ModulationScheme},
    error::LightpathError,
};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of a waveform log as written by `WaveformLogger`.
#[derive(Debug, Deserialize)]
pub struct LogEntry {
    pub signal: String,
    pub sample: usize,
    pub time_s: f64,
    pub re: f64,
    pub im: f64,
}

/// A single named signal read back from a waveform log.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LoggedTrace {
    pub time_s: Vec<f64>,
    pub samples: Vec<Complex64>,
}

impl LoggedTrace {
    /// Sample rate implied by the first two timestamps.
    pub fn sample_rate(&self) -> Option<f64> {
        match self.time_s.as_slice() {
            [t0, t1, ..] if t1 > t0 => Some(1.0 / (t1 - t0)),
            _ => None,
        }
    }
}

/// Symbol-level outcome of one run.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolMetrics {
    pub symbol_count: usize,
    pub bit_count: usize,
    pub symbol_errors: usize,
    pub bit_errors: usize,
    pub ser: f64,
    pub ber: f64,
    /// Data-aided error-vector SNR; `+inf` when the error vector is zero.
    pub snr_db: f64,
}

/// Everything reported to the caller for a completed run.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkMetrics {
    pub ber: f64,
    pub ser: f64,
    pub snr_db: f64,
    pub bit_errors: usize,
    pub symbol_errors: usize,
    pub bit_count: usize,
    pub symbol_count: usize,
    pub bit_rate: f64,
    pub tx_power_w: f64,
    pub tx_power_dbm: f64,
    pub rx_power_w: f64,
    pub rx_power_dbm: f64,
}

/// Symbol recovery and error counting against the known transmission.
///
/// Decisions are nearest-point against `reference`, the constellation as it
/// is expected to appear at the receiver output. `reference[i]` corresponds to
/// symbol index `i` of the scheme.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsEngine {
    scheme: ModulationScheme,
    reference: Vec<Complex64>,
    samples_per_symbol: usize,
}

impl MetricsEngine {
    /// Fails with `IndistinguishableConstellation` when two reference points
    /// coincide, since no decision rule could separate them.
    pub fn new(
        scheme: ModulationScheme,
        reference: Vec<Complex64>,
        samples_per_symbol: usize,
    ) -> Result<Self, LightpathError> {
        if reference.len() != scheme.order() {
            return Err(LightpathError::LengthMismatch {
                stage: "metrics",
                expected: scheme.order(),
                actual: reference.len(),
            });
        }
        if samples_per_symbol == 0 {
            return Err(LightpathError::invalid("metrics", "samples per symbol must be positive"));
        }

        let scale = reference.iter().map(|p| p.norm()).fold(0.0, f64::max);
        let tolerance = 1e-9 * scale.max(f64::MIN_POSITIVE);
        for i in 0..reference.len() {
            for j in i + 1..reference.len() {
                if (reference[i] - reference[j]).norm() <= tolerance {
                    return Err(LightpathError::IndistinguishableConstellation { first: i, second: j });
                }
            }
        }

        Ok(Self {
            scheme,
            reference,
            samples_per_symbol,
        })
    }

    pub fn scheme(&self) -> &ModulationScheme {
        &self.scheme
    }

    pub fn reference(&self) -> &[Complex64] {
        &self.reference
    }

    /// Samples `k * sps` for every whole symbol period in `signal`.
    pub fn sample_symbol_centres(&self, signal: &[Complex64]) -> Vec<Complex64> {
        signal
            .iter()
            .step_by(self.samples_per_symbol)
            .take(signal.len() / self.samples_per_symbol)
            .copied()
            .collect()
    }

    pub fn decide(&self, samples: &[Complex64]) -> Vec<usize> {
        samples.iter().map(|s| nearest(*s, &self.reference)).collect()
    }

    /// Compares received symbol samples with the transmitted indices.
    /// Only the common prefix of the two sequences is scored.
    pub fn evaluate(&self, tx_indices: &[usize], rx_samples: &[Complex64]) -> SymbolMetrics {
        let n = tx_indices.len().min(rx_samples.len());
        let tx_indices = &tx_indices[..n];
        let rx_samples = &rx_samples[..n];
        let decisions = self.decide(rx_samples);

        let symbol_errors = tx_indices
            .iter()
            .zip(&decisions)
            .filter(|(a, b)| a != b)
            .count();
        let tx_bits = self.scheme.indices_to_bits(tx_indices);
        let rx_bits = self.scheme.indices_to_bits(&decisions);
        let bit_errors = count_bit_errors(&tx_bits, &rx_bits);

        let mut signal_power = 0.0;
        let mut error_power = 0.0;
        for (&index, sample) in tx_indices.iter().zip(rx_samples) {
            let expected = self.reference[index];
            signal_power += expected.norm_sqr();
            error_power += (sample - expected).norm_sqr();
        }
        let snr_db = if error_power == 0.0 {
            f64::INFINITY
        } else {
            10.0 * (signal_power / error_power).log10()
        };

        SymbolMetrics {
            symbol_count: n,
            bit_count: tx_bits.len(),
            symbol_errors,
            bit_errors,
            ser: ratio(symbol_errors, n),
            ber: ratio(bit_errors, tx_bits.len()),
            snr_db,
        }
    }
}

fn ratio(errors: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        errors as f64 / total as f64
    }
}

/// Cuts `signal` into overlapping two-symbol windows for an eye diagram.
///
/// Each trace starts half a symbol before a symbol centre and spans
/// `2 * sps + 1` samples, so the eye opening sits in the middle of the trace.
pub fn eye_traces(signal: &[Complex64], samples_per_symbol: usize, max_traces: usize) -> Vec<Vec<Complex64>> {
    if samples_per_symbol == 0 {
        return Vec::new();
    }
    let half = samples_per_symbol / 2;
    let span = 2 * samples_per_symbol + 1;

    (1..)
        .map(|k| k * samples_per_symbol - half)
        .take_while(|start| start + span <= signal.len())
        .take(max_traces)
        .map(|start| signal[start..start + span].to_vec())
        .collect()
}

/// Reads a waveform CSV back into per-signal traces keyed by signal name.
pub fn read_waveform_log(log_path: &str) -> Result<BTreeMap<String, LoggedTrace>, LightpathError> {
    let mut reader = csv::Reader::from_path(log_path)
        .map_err(|e| LightpathError::CsvError(log_path.to_string(), e))?;
    let mut traces: BTreeMap<String, LoggedTrace> = BTreeMap::new();

    for result in reader.deserialize() {
        let record: LogEntry = result.map_err(|e| LightpathError::CsvError(log_path.to_string(), e))?;
        let trace = traces.entry(record.signal).or_default();
        if record.sample != trace.samples.len() {
            return Err(LightpathError::LengthMismatch {
                stage: "waveform log",
                expected: trace.samples.len(),
                actual: record.sample,
            });
        }
        trace.time_s.push(record.time_s);
        trace.samples.push(Complex64::new(record.re, record.im));
    }

    Ok(traces)
}
