use super::state::{FailureStage, SignalKey, SimulationOutcome, SimulationResult};
use crate::{
    analysis::{LinkMetrics, MetricsEngine},
    devices::{FiberChannel, LaserSource, Modulator, OpticalAmplifier, Receiver},
    dsp::{bits::BitSource, mapping::ModulationScheme, pulse::PulseShaper, spectrum::welch_psd},
    error::LightpathError,
    logger::WaveformLogger,
    units::{average_power, watts_to_dbm},
};
use lightpath_schemas::general::GeneralParameters;
use num_complex::Complex64;
use rand::rngs::StdRng;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Welch segment length for the reported spectra.
const PSD_SEGMENT_LEN: usize = 1024;

pub struct SimulationEngine {
    pub(super) general: GeneralParameters,
    pub(super) scheme: ModulationScheme,
    pub(super) bits: BitSource,
    pub(super) shaper: PulseShaper,
    pub(super) laser: LaserSource,
    pub(super) modulator: Modulator,
    pub(super) pre_amplifier_span: FiberChannel,
    pub(super) amplifier: Option<OpticalAmplifier>,
    pub(super) post_amplifier_span: FiberChannel,
    pub(super) receiver: Receiver,
    pub(super) metrics: MetricsEngine,
    pub(super) rng: StdRng,
    pub(super) logger: Option<WaveformLogger>,
}

impl SimulationEngine {
    pub fn general(&self) -> &GeneralParameters {
        &self.general
    }

    pub fn scheme(&self) -> &ModulationScheme {
        &self.scheme
    }

    /// Noiseless receiver output expected for each symbol index.
    pub fn reference(&self) -> &[Complex64] {
        self.metrics.reference()
    }

    /// Runs the link once. Every call draws fresh bits and noise from the
    /// engine's generator.
    pub fn run(&mut self) -> Result<SimulationOutcome, LightpathError> {
        info!(
            format = self.scheme.format().name(),
            order = self.scheme.order(),
            bits = self.bits.count(),
            symbol_rate = self.general.symbol_rate,
            "starting simulation run"
        );

        let bits = self.bits.generate(&mut self.rng);
        let mapped = self.scheme.map_bits(&bits);
        let electrical_tx = self.shaper.shape(&mapped.symbols);
        if electrical_tx.is_empty() {
            return Err(LightpathError::EmptySignal("pulse shaper"));
        }
        debug!(stage = "pulse shaper", symbols = mapped.symbols.len(), samples = electrical_tx.len());

        let carrier = self.laser.emit(electrical_tx.len(), &mut self.rng);
        debug!(stage = "laser", power_dbm = watts_to_dbm(average_power(&carrier)), ideal = self.laser.is_ideal());

        let optical_tx = self.modulator.modulate(&carrier, &electrical_tx)?;
        let tx_power_w = average_power(&optical_tx);
        debug!(stage = "modulator", device = self.modulator.name(), power_dbm = watts_to_dbm(tx_power_w));

        let mut optical = self.pre_amplifier_span.propagate(&optical_tx);
        if let Some(amplifier) = &self.amplifier {
            optical = amplifier.amplify(&optical, &mut self.rng);
            let power_dbm = watts_to_dbm(average_power(&optical));
            debug!(stage = "amplifier", position = ?amplifier.position(), power_dbm);
            if let Some(hit) = amplifier.check_floor(&optical) {
                warn!(power_dbm = hit.power_dbm, floor_dbm = hit.floor_dbm, "amplifier output below detection floor");
                return Ok(SimulationOutcome::DetectionFailure {
                    stage: FailureStage::Amplifier,
                    power_dbm: hit.power_dbm,
                    floor_dbm: hit.floor_dbm,
                });
            }
        }
        let optical_rx = self.post_amplifier_span.propagate(&optical);

        let rx_power_w = average_power(&optical_rx);
        let rx_power_dbm = watts_to_dbm(rx_power_w);
        debug!(stage = "channel", power_dbm = rx_power_dbm);
        if let Some(floor_dbm) = self.receiver.sensitivity_dbm() {
            if rx_power_dbm < floor_dbm {
                warn!(power_dbm = rx_power_dbm, floor_dbm, "received power below receiver sensitivity");
                return Ok(SimulationOutcome::DetectionFailure {
                    stage: FailureStage::Receiver,
                    power_dbm: rx_power_dbm,
                    floor_dbm,
                });
            }
        }

        let electrical_rx = self.receiver.detect(&optical_rx, &mut self.rng);
        debug!(stage = "receiver", kind = ?self.receiver.kind(), samples = electrical_rx.len());

        let rx_symbols = self.metrics.sample_symbol_centres(&electrical_rx);
        let rx_indices = self.metrics.decide(&rx_symbols);
        let symbol_metrics = self.metrics.evaluate(&mapped.indices, &rx_symbols);

        let metrics = LinkMetrics {
            ber: symbol_metrics.ber,
            ser: symbol_metrics.ser,
            snr_db: symbol_metrics.snr_db,
            bit_errors: symbol_metrics.bit_errors,
            symbol_errors: symbol_metrics.symbol_errors,
            bit_count: symbol_metrics.bit_count,
            symbol_count: symbol_metrics.symbol_count,
            bit_rate: self.general.bit_rate(),
            tx_power_w,
            tx_power_dbm: watts_to_dbm(tx_power_w),
            rx_power_w,
            rx_power_dbm,
        };
        info!(
            ber = metrics.ber,
            ser = metrics.ser,
            snr_db = metrics.snr_db,
            "simulation run complete"
        );

        let sample_rate = self.general.sample_rate();
        let mut spectra = BTreeMap::new();
        for (key, signal) in [
            (SignalKey::OpticalCarrier, &carrier),
            (SignalKey::OpticalTx, &optical_tx),
            (SignalKey::OpticalRx, &optical_rx),
        ] {
            spectra.insert(key, welch_psd(signal, sample_rate, PSD_SEGMENT_LEN));
        }

        let mut signals = BTreeMap::new();
        signals.insert(SignalKey::ElectricalTx, electrical_tx);
        signals.insert(SignalKey::OpticalCarrier, carrier);
        signals.insert(SignalKey::OpticalTx, optical_tx);
        signals.insert(SignalKey::OpticalRx, optical_rx);
        signals.insert(SignalKey::ElectricalRx, electrical_rx);
        signals.insert(SignalKey::TxSymbols, mapped.symbols);
        signals.insert(SignalKey::RxSymbols, rx_symbols);

        let result = SimulationResult {
            sample_rate,
            samples_per_symbol: self.general.samples_per_symbol,
            symbol_rate: self.general.symbol_rate,
            signals,
            spectra,
            tx_indices: mapped.indices,
            rx_indices,
            reference: self.metrics.reference().to_vec(),
            metrics,
        };

        if let Some(logger) = &mut self.logger {
            logger.log_result(&result)?;
            debug!(path = logger.path(), "waveforms written");
        }

        Ok(SimulationOutcome::Completed(Box::new(result)))
    }
}
