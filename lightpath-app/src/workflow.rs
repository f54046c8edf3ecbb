use crate::config;
use crate::plotting::{self, PlotData};
use anyhow::{bail, Context, Result};
use lightpath_core::{
    analysis::{self, LinkMetrics},
    dsp::spectrum::welch_psd,
    simulation::{FailureStage, SignalKey, SimulationBuilder, SimulationOutcome, SimulationResult},
};
use lightpath_schemas::{file_formats::ScenarioFile, StageModel};
use serde::Serialize;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};

const SCENARIO_COPY: &str = "scenario.yaml";
const WAVEFORM_LOG: &str = "waveforms.csv";
const RUN_RECORD: &str = "run.json";

/// Segment length used when spectra are recomputed from a waveform log.
const REPLOT_PSD_SEGMENT_LEN: usize = 1024;

pub struct RunOptions {
    pub output_dir: PathBuf,
    pub seed: Option<u64>,
    pub plots: bool,
}

/// Machine-readable summary of one run, written next to the waveforms.
#[derive(Debug, Serialize)]
struct RunRecord<'a> {
    scenario: &'a str,
    seed: Option<u64>,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<&'a LinkMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure_stage: Option<FailureStage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure_power_dbm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure_floor_dbm: Option<f64>,
}

/// Simulates one scenario and writes everything into a timestamped folder.
pub fn run_scenario(scenario_path: &Path, options: &RunOptions) -> Result<()> {
    let scenario = config::load_scenario(scenario_path)?;
    let label = config::scenario_label(&scenario, scenario_path);

    let run_dir = options
        .output_dir
        .join(format!("{}_{}", label, chrono::Utc::now().format("%Y%m%d_%H%M%S")));
    fs::create_dir_all(&run_dir)
        .with_context(|| format!("Failed to create output directory: {}", run_dir.display()))?;

    // Copy the scenario into the run folder for traceability and replotting
    fs::copy(scenario_path, run_dir.join(SCENARIO_COPY))
        .with_context(|| format!("Failed to copy scenario into {}", run_dir.display()))?;

    println!("\n--- [Workflow] Simulating '{}' ---", label);
    print_link_description(&scenario);

    let log_path = run_dir.join(WAVEFORM_LOG);
    let mut builder = SimulationBuilder::from_scenario(scenario.clone())
        .with_waveform_logging_to_file(&log_path.to_string_lossy());
    if let Some(seed) = options.seed {
        builder = builder.with_seed(seed);
    }
    let mut engine = builder.build().context("Scenario failed validation")?;
    let outcome = engine.run().context("Simulation run failed")?;
    let seed = options.seed.or(scenario.general.seed);

    match &outcome {
        SimulationOutcome::Completed(result) => {
            write_run_record(
                &run_dir,
                &RunRecord {
                    scenario: &label,
                    seed,
                    outcome: "completed",
                    metrics: Some(&result.metrics),
                    failure_stage: None,
                    failure_power_dbm: None,
                    failure_floor_dbm: None,
                },
            )?;
            if options.plots {
                plotting::generate_all_plots(&run_dir, &PlotData::from_result(result))?;
            }
            print_summary_report(&label, &scenario, result);
        }
        SimulationOutcome::DetectionFailure {
            stage,
            power_dbm,
            floor_dbm,
        } => {
            write_run_record(
                &run_dir,
                &RunRecord {
                    scenario: &label,
                    seed,
                    outcome: "detection_failure",
                    metrics: None,
                    failure_stage: Some(*stage),
                    failure_power_dbm: Some(*power_dbm),
                    failure_floor_dbm: Some(*floor_dbm),
                },
            )?;
            print_failure_report(*stage, *power_dbm, *floor_dbm);
        }
    }

    println!("\nResults are in '{}'", run_dir.display());
    Ok(())
}

/// Loads a scenario and runs every build-time check without simulating.
pub fn check_scenario(scenario_path: &Path) -> Result<()> {
    let scenario = config::load_scenario(scenario_path)?;
    print_link_description(&scenario);

    let engine = SimulationBuilder::from_scenario(scenario)
        .build()
        .context("Scenario failed validation")?;
    println!("\nScenario is valid. Expected receiver constellation:");
    for (index, point) in engine.reference().iter().enumerate() {
        println!("  - symbol {:>3}: {:+.4e} {:+.4e}j", index, point.re, point.im);
    }
    Ok(())
}

/// Rebuilds the plots of a finished run from its waveform log.
pub fn replot(run_dir: &Path) -> Result<()> {
    let scenario_path = run_dir.join(SCENARIO_COPY);
    let log_path = run_dir.join(WAVEFORM_LOG);
    if !log_path.is_file() {
        bail!("No waveform log found at {}", log_path.display());
    }

    let scenario = config::load_scenario(&scenario_path)?;
    let engine = SimulationBuilder::from_scenario(scenario.clone())
        .build()
        .context("Saved scenario failed validation")?;

    println!("\n--- [Workflow] Replotting '{}' ---", run_dir.display());
    let traces = analysis::read_waveform_log(&log_path.to_string_lossy())
        .with_context(|| format!("Failed to read waveform log {}", log_path.display()))?;

    let mut signals = BTreeMap::new();
    for (name, trace) in traces {
        match name.parse::<SignalKey>() {
            Ok(key) => {
                signals.insert(key, trace.samples);
            }
            Err(reason) => debug!(%reason, "skipping logged signal"),
        }
    }

    let sample_rate = scenario.general.sample_rate();
    let spectra = [SignalKey::OpticalCarrier, SignalKey::OpticalTx, SignalKey::OpticalRx]
        .into_iter()
        .filter_map(|key| {
            signals
                .get(&key)
                .map(|s| (key, welch_psd(s, sample_rate, REPLOT_PSD_SEGMENT_LEN)))
        })
        .collect();

    let data = PlotData {
        sample_rate,
        samples_per_symbol: scenario.general.samples_per_symbol,
        signals,
        spectra,
        reference: engine.reference().to_vec(),
    };
    plotting::generate_all_plots(run_dir, &data)?;
    Ok(())
}

fn write_run_record(run_dir: &Path, record: &RunRecord) -> Result<()> {
    let path = run_dir.join(RUN_RECORD);
    let json = serde_json::to_string_pretty(record).context("Failed to serialize run record")?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "run record written");
    Ok(())
}

fn print_link_description(scenario: &ScenarioFile) {
    let general = &scenario.general;
    println!("Link Configuration:");
    println!(
        "  - Modulation:  {}-{} at {:.3} GBd, {} samples/symbol, {} bits",
        general.modulation_format.name(),
        general.modulation_order,
        general.symbol_rate / 1e9,
        general.samples_per_symbol,
        general.bit_count
    );
    println!(
        "  - Source:      {:.2} dBm at {:.2} THz ({})",
        scenario.source.power_dbm,
        scenario.source.frequency_thz,
        if scenario.source.noise.is_ideal() { "ideal" } else { "noisy" }
    );
    println!("  - Modulator:   {}", scenario.modulator.name());
    match &scenario.channel {
        StageModel::Ideal => println!("  - Channel:     ideal"),
        StageModel::Modeled(fiber) => println!(
            "  - Channel:     {:.1} km, {:.2} dB/km, {:.1} ps/(nm km)",
            fiber.length_km, fiber.attenuation_db_per_km, fiber.dispersion_ps_per_nm_km
        ),
    }
    match &scenario.amplifier {
        None => println!("  - Amplifier:   none"),
        Some(amp) => println!(
            "  - Amplifier:   {:.1} dB at {:?} ({})",
            amp.gain_db,
            amp.position,
            if amp.noise.is_ideal() { "ideal" } else { "with ASE" }
        ),
    }
    println!(
        "  - Receiver:    {:?}, {:.2} A/W ({})",
        scenario.receiver.kind,
        scenario.receiver.responsivity_a_per_w,
        if scenario.receiver.response.is_ideal() { "ideal" } else { "band-limited" }
    );
}

fn print_summary_report(label: &str, scenario: &ScenarioFile, result: &SimulationResult) {
    let m = &result.metrics;

    println!("\n\n--- [Link Summary Report] ---");
    println!("========================================");
    println!("Scenario: {}", label);
    println!(
        "Modulation: {}-{}",
        scenario.general.modulation_format.name(),
        scenario.general.modulation_order
    );
    println!("Transmission Speed: {:.3} Gb/s", m.bit_rate / 1e9);
    println!("----------------------------------------");

    println!("\nOptical Power:");
    println!("  - Transmitted:  {:.4e} W ({:>8.3} dBm)", m.tx_power_w, m.tx_power_dbm);
    println!("  - Received:     {:.4e} W ({:>8.3} dBm)", m.rx_power_w, m.rx_power_dbm);

    println!("\nPerformance:");
    if m.snr_db.is_finite() {
        println!("  - SNR:          {:.2} dB", m.snr_db);
    } else {
        println!("  - SNR:          inf (noiseless)");
    }
    println!("  - BER:          {:.3e} ({} / {} bits)", m.ber, m.bit_errors, m.bit_count);
    println!("  - SER:          {:.3e} ({} / {} symbols)", m.ser, m.symbol_errors, m.symbol_count);
    println!("========================================");
}

fn print_failure_report(stage: FailureStage, power_dbm: f64, floor_dbm: f64) {
    println!("\n\n--- [Link Summary Report] ---");
    println!("========================================");
    println!("DETECTION FAILURE at {:?}", stage);
    println!("  - Signal power: {:>8.3} dBm", power_dbm);
    println!("  - Floor:        {:>8.3} dBm", floor_dbm);
    println!("No receiver output was produced; BER/SER are undefined.");
    println!("========================================");
}
