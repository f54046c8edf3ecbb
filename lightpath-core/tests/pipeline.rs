//! End-to-end scenarios driven through the public builder API.

use lightpath_core::{
    analysis::read_waveform_log,
    simulation::{FailureStage, SignalKey, SimulationBuilder, SimulationOutcome, SimulationResult},
    units::average_power,
    LightpathError,
};
use lightpath_schemas::{
    amplifier::{AmplifierParameters, AmplifierPosition, AseNoise},
    channel::FiberParameters,
    general::{GeneralParameters, ModulationFormat, PulseShape},
    modulator::ModulatorParameters,
    receiver::{ReceiverKind, ReceiverParameters},
    source::{LaserNoise, SourceParameters},
    StageModel,
};

fn general(format: ModulationFormat, order: usize, bit_count: usize, symbol_rate: f64) -> GeneralParameters {
    GeneralParameters {
        samples_per_symbol: 8,
        symbol_rate,
        modulation_format: format,
        modulation_order: order,
        bit_count,
        pulse: PulseShape::Nrz,
        seed: None,
    }
}

fn ideal_source() -> SourceParameters {
    SourceParameters {
        power_dbm: 10.0,
        frequency_thz: 193.1,
        noise: StageModel::Ideal,
    }
}

fn noisy_source(linewidth_hz: f64, rin_variance: f64) -> SourceParameters {
    SourceParameters {
        noise: StageModel::Modeled(LaserNoise {
            linewidth_hz,
            rin_variance,
        }),
        ..ideal_source()
    }
}

fn mzm() -> ModulatorParameters {
    ModulatorParameters::Mzm { v_pi: 2.0, bias: -1.0 }
}

fn iqm() -> ModulatorParameters {
    ModulatorParameters::Iqm {
        v_pi: 2.0,
        bias_i: -2.0,
        bias_q: -2.0,
    }
}

fn ideal_receiver(kind: ReceiverKind) -> ReceiverParameters {
    ReceiverParameters {
        kind,
        responsivity_a_per_w: 1.0,
        sensitivity_dbm: None,
        response: StageModel::Ideal,
    }
}

fn ook_builder() -> SimulationBuilder {
    SimulationBuilder::new()
        .with_general(general(ModulationFormat::Ook, 2, 1000, 1e9))
        .with_source(ideal_source())
        .with_modulator(mzm())
        .with_channel(StageModel::Ideal)
        .with_receiver(ideal_receiver(ReceiverKind::Photodiode))
        .with_seed(7)
}

fn completed(outcome: SimulationOutcome) -> SimulationResult {
    match outcome {
        SimulationOutcome::Completed(result) => *result,
        SimulationOutcome::DetectionFailure { stage, power_dbm, floor_dbm } => {
            panic!("unexpected detection failure at {:?}: {} dBm < {} dBm", stage, power_dbm, floor_dbm)
        }
    }
}

fn qpsk_ber(linewidth_hz: f64, rin_variance: f64, seed: u64) -> f64 {
    let mut engine = SimulationBuilder::new()
        .with_general(general(ModulationFormat::Psk, 4, 20_000, 1e6))
        .with_source(noisy_source(linewidth_hz, rin_variance))
        .with_modulator(iqm())
        .with_receiver(ideal_receiver(ReceiverKind::Coherent))
        .with_seed(seed)
        .build()
        .unwrap();
    let result = completed(engine.run().unwrap());
    assert_eq!(result.metrics.symbol_count, 10_000);
    result.metrics.ber
}

#[test]
fn test_ook_round_trip_is_error_free() {
    let result = completed(ook_builder().build().unwrap().run().unwrap());
    let metrics = &result.metrics;

    assert_eq!(metrics.bit_count, 1000);
    assert_eq!(metrics.bit_errors, 0);
    assert_eq!(metrics.symbol_errors, 0);
    assert_eq!(metrics.ber, 0.0);
    assert_eq!(metrics.ser, 0.0);
    assert!((metrics.tx_power_w - metrics.rx_power_w).abs() < 1e-15);
    assert_eq!(result.tx_indices, result.rx_indices);
    assert!((metrics.bit_rate - 1e9).abs() < 1e-3);
}

#[test]
fn test_ideal_stages_are_identity() {
    let result = completed(ook_builder().build().unwrap().run().unwrap());
    assert_eq!(result.signal(SignalKey::OpticalTx), result.signal(SignalKey::OpticalRx));

    let carrier = result.signal(SignalKey::OpticalCarrier).unwrap();
    assert!(carrier.iter().all(|s| *s == carrier[0]));
    assert_eq!(carrier[0].im, 0.0);
}

#[test]
fn test_ideal_amplifier_is_pure_gain() {
    let result = completed(
        ook_builder()
            .with_amplifier(AmplifierParameters {
                position: AmplifierPosition::End,
                gain_db: 10.0,
                detection_floor_dbm: None,
                noise: StageModel::Ideal,
            })
            .build()
            .unwrap()
            .run()
            .unwrap(),
    );
    let tx = result.signal(SignalKey::OpticalTx).unwrap();
    let rx = result.signal(SignalKey::OpticalRx).unwrap();
    let gain = 10f64.sqrt();
    for (a, b) in tx.iter().zip(rx) {
        assert!((a * gain - b).norm() < 1e-15);
    }
    assert_eq!(result.metrics.bit_errors, 0);
}

#[test]
fn test_every_scheme_round_trips_without_noise() {
    let cases = [
        (ModulationFormat::Pam, 2, mzm(), ReceiverKind::Photodiode),
        (ModulationFormat::Pam, 4, mzm(), ReceiverKind::Photodiode),
        (ModulationFormat::Psk, 2, mzm(), ReceiverKind::Coherent),
        (ModulationFormat::Psk, 2, ModulatorParameters::Pm { v_pi: 2.0 }, ReceiverKind::Coherent),
        (ModulationFormat::Psk, 8, iqm(), ReceiverKind::Coherent),
        (ModulationFormat::Psk, 16, iqm(), ReceiverKind::Coherent),
        (ModulationFormat::Qam, 16, iqm(), ReceiverKind::Coherent),
        (ModulationFormat::Qam, 64, iqm(), ReceiverKind::Coherent),
        (ModulationFormat::Qam, 256, iqm(), ReceiverKind::Coherent),
    ];
    for (format, order, modulator, kind) in cases {
        let mut engine = SimulationBuilder::new()
            .with_general(general(format, order, 2400, 1e9))
            .with_source(ideal_source())
            .with_modulator(modulator)
            .with_receiver(ideal_receiver(kind))
            .with_seed(3)
            .build()
            .unwrap();
        let result = completed(engine.run().unwrap());
        assert_eq!(result.metrics.bit_errors, 0, "{:?}-{}", format, order);

        let tx_symbols = result.signal(SignalKey::TxSymbols).unwrap();
        assert_eq!(tx_symbols.len(), 2400 / order.trailing_zeros() as usize);
    }
}

#[test]
fn test_detection_floor_yields_failure_outcome() {
    let mut engine = ook_builder()
        .with_channel(StageModel::Modeled(FiberParameters {
            length_km: 100.0,
            attenuation_db_per_km: 0.2,
            dispersion_ps_per_nm_km: 17.0,
        }))
        .with_amplifier(AmplifierParameters {
            position: AmplifierPosition::End,
            gain_db: 5.0,
            detection_floor_dbm: Some(0.0),
            noise: StageModel::Ideal,
        })
        .build()
        .unwrap();

    let outcome = engine.run().unwrap();
    assert!(outcome.is_detection_failure());
    assert!(outcome.result().is_none());
    match outcome {
        SimulationOutcome::DetectionFailure { stage, power_dbm, floor_dbm } => {
            assert_eq!(stage, FailureStage::Amplifier);
            assert_eq!(floor_dbm, 0.0);
            // About 7 dBm of OOK light, -20 dB fiber, +5 dB gain.
            assert!(power_dbm < -5.0 && power_dbm > -11.0, "power {}", power_dbm);
        }
        SimulationOutcome::Completed(_) => unreachable!(),
    }
}

#[test]
fn test_receiver_sensitivity_yields_failure_outcome() {
    let mut receiver = ideal_receiver(ReceiverKind::Photodiode);
    receiver.sensitivity_dbm = Some(-10.0);
    let mut engine = ook_builder()
        .with_channel(StageModel::Modeled(FiberParameters {
            length_km: 100.0,
            attenuation_db_per_km: 0.2,
            dispersion_ps_per_nm_km: 0.0,
        }))
        .with_receiver(receiver)
        .build()
        .unwrap();

    let outcome = engine.run().unwrap();
    assert!(matches!(
        outcome,
        SimulationOutcome::DetectionFailure {
            stage: FailureStage::Receiver,
            ..
        }
    ));
}

#[test]
fn test_amplified_span_with_ase_stays_error_free() {
    let mut engine = SimulationBuilder::new()
        .with_general(general(ModulationFormat::Ook, 2, 4000, 10e9))
        .with_source(ideal_source())
        .with_modulator(mzm())
        .with_channel(StageModel::Modeled(FiberParameters {
            length_km: 80.0,
            attenuation_db_per_km: 0.2,
            dispersion_ps_per_nm_km: 0.0,
        }))
        .with_amplifier(AmplifierParameters {
            position: AmplifierPosition::Middle,
            gain_db: 16.0,
            detection_floor_dbm: Some(-20.0),
            noise: StageModel::Modeled(AseNoise { noise_figure_db: 5.0 }),
        })
        .with_receiver(ideal_receiver(ReceiverKind::Photodiode))
        .with_seed(11)
        .build()
        .unwrap();

    let result = completed(engine.run().unwrap());
    assert_eq!(result.metrics.bit_errors, 0);
    assert!(result.metrics.snr_db.is_finite());
    assert!(result.metrics.snr_db > 20.0, "snr {}", result.metrics.snr_db);
    // Net link gain is 0 dB, plus a little ASE.
    let excess = result.metrics.rx_power_dbm - result.metrics.tx_power_dbm;
    assert!(excess.abs() < 0.1, "excess {}", excess);
}

// At the lowest allowed rate of 1 MBd a 1 kHz linewidth gives
// sigma_phi = sqrt(2*pi*1e3/1e6) ~ 0.079 rad, far inside the pi/4 QPSK
// decision margin, so errors are practically never drawn.
#[test]
fn test_qpsk_with_narrow_linewidth_stays_below_one_percent() {
    let ber = qpsk_ber(1e3, 1e-20, 21);
    assert!(ber < 1e-2, "ber {}", ber);
}

#[test]
fn test_qpsk_ber_grows_with_linewidth() {
    let bers: Vec<f64> = [20e3, 40e3, 80e3].iter().map(|&lw| qpsk_ber(lw, 1e-20, 5)).collect();
    assert!(bers[0] > 0.0, "bers {:?}", bers);
    assert!(bers[0] < bers[1] && bers[1] < bers[2], "bers {:?}", bers);
}

#[test]
fn test_qpsk_ber_grows_with_rin() {
    let bers: Vec<f64> = [1e-3, 2e-3, 4e-3].iter().map(|&rin| qpsk_ber(1e3, rin, 5)).collect();
    assert!(bers[0] > 0.0, "bers {:?}", bers);
    assert!(bers[0] < bers[1] && bers[1] < bers[2], "bers {:?}", bers);
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let run = || {
        let mut engine = SimulationBuilder::new()
            .with_general(general(ModulationFormat::Psk, 4, 2000, 1e6))
            .with_source(noisy_source(50e3, 1e-6))
            .with_modulator(iqm())
            .with_receiver(ideal_receiver(ReceiverKind::Coherent))
            .with_seed(99)
            .build()
            .unwrap();
        completed(engine.run().unwrap())
    };
    let a = run();
    let b = run();
    assert_eq!(a.metrics, b.metrics);
    assert_eq!(a.signal(SignalKey::ElectricalRx), b.signal(SignalKey::ElectricalRx));
}

#[test]
fn test_rrc_pulse_link_round_trips() {
    let mut params = general(ModulationFormat::Pam, 2, 2000, 1e9);
    params.pulse = PulseShape::Rrc {
        rolloff: 0.35,
        span_symbols: 8,
    };
    let mut engine = SimulationBuilder::new()
        .with_general(params)
        .with_source(ideal_source())
        .with_modulator(mzm())
        .with_receiver(ideal_receiver(ReceiverKind::Coherent))
        .with_seed(4)
        .build()
        .unwrap();
    let result = completed(engine.run().unwrap());
    assert_eq!(result.signal(SignalKey::ElectricalTx).unwrap().len(), 1000 * 8);
    assert!(result.spectra.contains_key(&SignalKey::OpticalTx));
}

#[test]
fn test_waveform_log_round_trip() {
    let path = std::env::temp_dir().join(format!("lightpath-waveforms-{}.csv", std::process::id()));
    let path_str = path.to_string_lossy().to_string();

    let mut engine = ook_builder().with_waveform_logging_to_file(&path_str).build().unwrap();
    let result = completed(engine.run().unwrap());

    let traces = read_waveform_log(&path_str).unwrap();
    assert_eq!(traces.len(), SignalKey::ALL.len());

    let logged = &traces[SignalKey::ElectricalTx.as_str()];
    let original = result.signal(SignalKey::ElectricalTx).unwrap();
    assert_eq!(logged.samples.len(), original.len());
    for (a, b) in logged.samples.iter().zip(original) {
        assert!((a - b).norm() < 1e-12);
    }
    let rate = logged.sample_rate().unwrap();
    assert!((rate - 8e9).abs() / 8e9 < 1e-6);

    let symbols = &traces[SignalKey::RxSymbols.as_str()];
    assert!((symbols.sample_rate().unwrap() - 1e9).abs() / 1e9 < 1e-6);
    assert!(average_power(&symbols.samples) > 0.0);

    let _ = std::fs::remove_file(path);
}

#[test]
fn test_configuration_errors_are_reported_before_running() {
    let err = ook_builder()
        .with_general(general(ModulationFormat::Ook, 2, 1000, 1e3))
        .build()
        .err()
        .unwrap();
    assert!(err.is_configuration_error());
    assert!(matches!(err, LightpathError::SymbolRateOutOfRange { .. }));
}
