use crate::{
    analysis::MetricsEngine,
    devices::{FiberChannel, LaserSource, Modulator, OpticalAmplifier, Receiver},
    dsp::{bits::BitSource, mapping::ModulationScheme, pulse::PulseShaper},
    error::LightpathError,
    logger::WaveformLogger,
    simulation::engine::SimulationEngine,
};
use lightpath_schemas::{
    amplifier::{AmplifierParameters, AmplifierPosition},
    channel::ChannelParameters,
    file_formats::ScenarioFile,
    general::{GeneralParameters, ModulationFormat},
    modulator::ModulatorParameters,
    receiver::ReceiverParameters,
    source::SourceParameters,
};
use num_complex::Complex64;
use rand::{rngs::StdRng, SeedableRng};

pub const MIN_SYMBOL_RATE: f64 = 1e6;
pub const MAX_SYMBOL_RATE: f64 = 1e12;
pub const MAX_OOK_SYMBOL_RATE: f64 = 1e11;

/// A fluent builder for constructing a `SimulationEngine`.
///
/// Every parameter is validated in `build()`, before any samples are
/// generated. The engine receives the validated devices by value.
#[derive(Default)]
pub struct SimulationBuilder {
    general: Option<GeneralParameters>,
    source: Option<SourceParameters>,
    modulator: Option<ModulatorParameters>,
    channel: ChannelParameters,
    amplifier: Option<AmplifierParameters>,
    receiver: Option<ReceiverParameters>,
    seed: Option<u64>,
    log_path: Option<String>,
}

impl SimulationBuilder {
    /// Creates a new, empty `SimulationBuilder` with an ideal channel and no amplifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Populates every stage from a parsed scenario file.
    pub fn from_scenario(scenario: ScenarioFile) -> Self {
        Self {
            general: Some(scenario.general),
            source: Some(scenario.source),
            modulator: Some(scenario.modulator),
            channel: scenario.channel,
            amplifier: scenario.amplifier,
            receiver: Some(scenario.receiver),
            ..Self::default()
        }
    }

    pub fn with_general(mut self, general: GeneralParameters) -> Self {
        self.general = Some(general);
        self
    }

    pub fn with_source(mut self, source: SourceParameters) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_modulator(mut self, modulator: ModulatorParameters) -> Self {
        self.modulator = Some(modulator);
        self
    }

    pub fn with_channel(mut self, channel: ChannelParameters) -> Self {
        self.channel = channel;
        self
    }

    /// Inserts an optical amplifier. Omitting this call leaves the link unamplified.
    pub fn with_amplifier(mut self, amplifier: AmplifierParameters) -> Self {
        self.amplifier = Some(amplifier);
        self
    }

    pub fn with_receiver(mut self, receiver: ReceiverParameters) -> Self {
        self.receiver = Some(receiver);
        self
    }

    /// Seeds the run generator. Takes precedence over `GeneralParameters::seed`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Configures the engine to write every signal of each completed run to
    /// the specified CSV file.
    pub fn with_waveform_logging_to_file(mut self, path: &str) -> Self {
        self.log_path = Some(path.to_string());
        self
    }

    /// Consumes the builder and returns a fully configured `SimulationEngine`.
    ///
    /// # Errors
    ///
    /// Returns a configuration-family `LightpathError` if a stage is missing,
    /// a parameter is out of range, or two stages cannot work together.
    pub fn build(self) -> Result<SimulationEngine, LightpathError> {
        let general = self.general.ok_or(LightpathError::MissingStage("general"))?;
        let source = self.source.ok_or(LightpathError::MissingStage("source"))?;
        let modulator = self.modulator.ok_or(LightpathError::MissingStage("modulator"))?;
        let receiver = self.receiver.ok_or(LightpathError::MissingStage("receiver"))?;

        validate_general(&general)?;
        let scheme = ModulationScheme::new(general.modulation_format, general.modulation_order)?;
        let bits_per_symbol = scheme.bits_per_symbol();
        if general.bit_count % bits_per_symbol != 0 {
            return Err(LightpathError::BitCountNotDivisible {
                bits: general.bit_count,
                bits_per_symbol,
            });
        }

        let sps = general.samples_per_symbol;
        let sample_rate = general.sample_rate();
        let shaper = PulseShaper::new(general.pulse, sps)?;
        let laser = LaserSource::new(&source, general.symbol_rate)?;
        let modulator = Modulator::new(modulator)?;
        if !scheme.is_real() && !modulator.parameters().accepts_complex_drive() {
            return Err(LightpathError::IncompatibleStages(format!(
                "{}-{} has a complex constellation but the {} is a single-drive modulator; use an IQ modulator",
                scheme.format().name(),
                scheme.order(),
                modulator.name()
            )));
        }

        let channel = FiberChannel::new(&self.channel, laser.frequency_hz(), sample_rate)?;
        let amplifier = self
            .amplifier
            .as_ref()
            .map(|params| OpticalAmplifier::new(params, laser.frequency_hz(), sample_rate))
            .transpose()?;
        let (pre_amplifier_span, post_amplifier_span) =
            split_at_amplifier(&channel, amplifier.as_ref().map(OpticalAmplifier::position));
        let receiver = Receiver::new(&receiver, sample_rate, sps)?;

        let reference = expected_constellation(
            &scheme,
            &laser,
            &modulator,
            &pre_amplifier_span,
            amplifier.as_ref(),
            &post_amplifier_span,
            &receiver,
        );
        let metrics = MetricsEngine::new(scheme.clone(), reference, sps)?;

        let rng = match self.seed.or(general.seed) {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let logger = match self.log_path {
            Some(path) => Some(WaveformLogger::new(&path).map_err(|e| LightpathError::FileIO(path.clone(), e))?),
            None => None,
        };

        Ok(SimulationEngine {
            bits: BitSource::new(general.bit_count),
            general,
            scheme,
            shaper,
            laser,
            modulator,
            pre_amplifier_span,
            amplifier,
            post_amplifier_span,
            receiver,
            metrics,
            rng,
            logger,
        })
    }
}

fn validate_general(general: &GeneralParameters) -> Result<(), LightpathError> {
    if general.samples_per_symbol < 2 {
        return Err(LightpathError::invalid("general", "samples per symbol must be at least 2"));
    }
    if general.bit_count == 0 {
        return Err(LightpathError::invalid("general", "bit count must be positive"));
    }

    // PAM-2 is the same on-off keyed signal as OOK.
    let max = match (general.modulation_format, general.modulation_order) {
        (ModulationFormat::Ook, _) | (ModulationFormat::Pam, 2) => MAX_OOK_SYMBOL_RATE,
        _ => MAX_SYMBOL_RATE,
    };
    let rate = general.symbol_rate;
    if !(rate.is_finite() && rate >= MIN_SYMBOL_RATE && rate < max) {
        return Err(LightpathError::SymbolRateOutOfRange {
            format: general.modulation_format,
            rate,
            min: MIN_SYMBOL_RATE,
            max,
        });
    }
    Ok(())
}

/// Fiber before and after the amplifier. Without an amplifier the whole
/// span comes first and the second half is a zero-length section.
fn split_at_amplifier(channel: &FiberChannel, position: Option<AmplifierPosition>) -> (FiberChannel, FiberChannel) {
    match position {
        Some(AmplifierPosition::Start) => (channel.section(0.0), channel.clone()),
        Some(AmplifierPosition::Middle) => (channel.section(0.5), channel.section(0.5)),
        Some(AmplifierPosition::End) | None => (channel.clone(), channel.section(0.0)),
    }
}

/// Receiver output expected for each constellation point with every noise
/// source switched off. Dispersion and receiver filtering are left out.
fn expected_constellation(
    scheme: &ModulationScheme,
    laser: &LaserSource,
    modulator: &Modulator,
    pre_amplifier_span: &FiberChannel,
    amplifier: Option<&OpticalAmplifier>,
    post_amplifier_span: &FiberChannel,
    receiver: &Receiver,
) -> Vec<Complex64> {
    let post_scale = post_amplifier_span.amplitude_scale();
    let (gain, ase_power) = amplifier.map_or((1.0, 0.0), |amp| (amp.gain().sqrt(), amp.ase_power()));
    let field_gain = laser.amplitude() * pre_amplifier_span.amplitude_scale() * gain * post_scale;
    let noise_at_receiver = ase_power * post_scale * post_scale;

    scheme
        .constellation()
        .iter()
        .map(|&symbol| receiver.mean_response(modulator.transfer(symbol) * field_gain, noise_at_receiver))
        .collect()
}
