use crate::{
    amplifier::AmplifierParameters, channel::ChannelParameters, general::GeneralParameters,
    modulator::ModulatorParameters, receiver::ReceiverParameters, source::SourceParameters,
};
use serde::{Deserialize, Serialize};

/// One complete link description, as stored in a scenario YAML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioFile {
    pub schema_version: String,
    #[serde(default)]
    pub name: Option<String>,
    pub general: GeneralParameters,
    pub source: SourceParameters,
    pub modulator: ModulatorParameters,
    #[serde(default)]
    pub channel: ChannelParameters,
    #[serde(default)]
    pub amplifier: Option<AmplifierParameters>,
    pub receiver: ReceiverParameters,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        amplifier::AmplifierPosition, general::ModulationFormat, general::PulseShape,
        receiver::ReceiverKind, stage::StageModel,
    };

    const SCENARIO: &str = r#"
schema_version: "1"
name: qpsk-metro
general:
  samples_per_symbol: 8
  symbol_rate: 1.0e9
  modulation_format: psk
  modulation_order: 4
  bit_count: 2000
  pulse:
    shape: rrc
    rolloff: 0.1
    span_symbols: 16
source:
  power_dbm: 10.0
  noise:
    model: modeled
    linewidth_hz: 1000.0
    rin_variance: 1.0e-20
modulator:
  type: iqm
  v_pi: 2.0
  bias_i: -2.0
  bias_q: -2.0
channel:
  model: modeled
  length_km: 40.0
  attenuation_db_per_km: 0.2
  dispersion_ps_per_nm_km: 16.0
amplifier:
  position: end
  gain_db: 8.0
  detection_floor_dbm: -30.0
  noise:
    model: modeled
    noise_figure_db: 4.5
receiver:
  kind: coherent
  response:
    model: modeled
    bandwidth_hz: 2.0e9
"#;

    #[test]
    fn parses_full_scenario() {
        let scenario: ScenarioFile = serde_yaml::from_str(SCENARIO).unwrap();

        assert_eq!(scenario.general.modulation_format, ModulationFormat::Psk);
        assert_eq!(scenario.general.bits_per_symbol(), 2);
        assert_eq!(
            scenario.general.pulse,
            PulseShape::Rrc { rolloff: 0.1, span_symbols: 16 }
        );
        assert_eq!(scenario.source.frequency_thz, 193.1);
        assert_eq!(scenario.source.noise.modeled().unwrap().linewidth_hz, 1000.0);
        assert!((scenario.channel.modeled().unwrap().total_loss_db() - 8.0).abs() < 1e-12);

        let amplifier = scenario.amplifier.unwrap();
        assert_eq!(amplifier.position, AmplifierPosition::End);
        assert!(!amplifier.noise.is_ideal());

        assert_eq!(scenario.receiver.kind, ReceiverKind::Coherent);
        assert_eq!(scenario.receiver.responsivity_a_per_w, 1.0);
        assert!(scenario.receiver.response.modeled().unwrap().thermal_noise.is_none());
    }

    #[test]
    fn omitted_stages_default_to_ideal() {
        let yaml = r#"
schema_version: "1"
general:
  samples_per_symbol: 8
  symbol_rate: 1.0e6
  modulation_format: ook
  modulation_order: 2
  bit_count: 1000
source:
  power_dbm: 10.0
modulator:
  type: mzm
  v_pi: 2.0
  bias: -1.0
receiver:
  kind: photodiode
"#;
        let scenario: ScenarioFile = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(scenario.general.pulse, PulseShape::Nrz);
        assert!(scenario.source.noise.is_ideal());
        assert_eq!(scenario.channel, StageModel::Ideal);
        assert!(scenario.amplifier.is_none());
        assert!(scenario.receiver.response.is_ideal());
        assert_eq!(scenario.general.sample_rate(), 8.0e6);
    }
}
