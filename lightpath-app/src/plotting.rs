//! This module is responsible for generating all visualizations of a link run.

use anyhow::Result;
use lightpath_core::{
    analysis::eye_traces,
    dsp::spectrum::PowerSpectrum,
    simulation::{SignalKey, SimulationResult},
};
use num_complex::Complex64;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::collections::BTreeMap;
use std::ops::Range;
use std::path::Path;

/// Number of symbol periods shown in time-domain plots.
const PREVIEW_SYMBOLS: usize = 32;
const MAX_EYE_TRACES: usize = 200;
const MAX_SCATTER_POINTS: usize = 5000;
/// Spectra are clipped this far below their peak.
const SPECTRUM_DYNAMIC_RANGE_DB: f64 = 100.0;

/// Everything the plots need, taken either from a live result or a waveform log.
#[derive(Debug, Clone)]
pub struct PlotData {
    pub sample_rate: f64,
    pub samples_per_symbol: usize,
    pub signals: BTreeMap<SignalKey, Vec<Complex64>>,
    pub spectra: BTreeMap<SignalKey, PowerSpectrum>,
    pub reference: Vec<Complex64>,
}

impl PlotData {
    pub fn from_result(result: &SimulationResult) -> Self {
        Self {
            sample_rate: result.sample_rate,
            samples_per_symbol: result.samples_per_symbol,
            signals: result.signals.clone(),
            spectra: result.spectra.clone(),
            reference: result.reference.clone(),
        }
    }

    fn signal(&self, key: SignalKey) -> &[Complex64] {
        self.signals.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }
}

struct Series {
    label: String,
    points: Vec<(f64, f64)>,
    color: RGBColor,
}

type Panel<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// The main function to generate and save all plots for a run.
pub fn generate_all_plots(output_dir: &Path, data: &PlotData) -> Result<()> {
    println!("[Plotting] Generating graphs from simulation data...");

    if data.signals.is_empty() {
        println!("[Plotting] Warning: No data to plot.");
        return Ok(());
    }

    plot_electrical_signals(output_dir, data)?;
    plot_optical_power(output_dir, data)?;
    plot_spectra(output_dir, data)?;
    plot_constellations(output_dir, data)?;
    plot_eye_diagrams(output_dir, data)?;

    println!("[Plotting] Graphs have been saved to '{}'.", output_dir.display());
    Ok(())
}

/// Drive waveform and detector output over the first few symbols.
fn plot_electrical_signals(output_dir: &Path, data: &PlotData) -> Result<()> {
    let path = output_dir.join("1_electrical_signals.png");
    let root = BitMapBackend::new(&path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((2, 1));

    for (panel, key, caption) in [
        (&panels[0], SignalKey::ElectricalTx, "Electrical Tx (drive)"),
        (&panels[1], SignalKey::ElectricalRx, "Electrical Rx (detector output)"),
    ] {
        let preview = preview(data.signal(key), data.samples_per_symbol);
        let mut series = vec![Series {
            label: "in-phase".to_string(),
            points: time_points(preview, data.sample_rate, |s| s.re),
            color: BLUE,
        }];
        if preview.iter().any(|s| s.im.abs() > 0.0) {
            series.push(Series {
                label: "quadrature".to_string(),
                points: time_points(preview, data.sample_rate, |s| s.im),
                color: RED,
            });
        }
        draw_lines(panel, caption, "Time (ns)", "Amplitude", &series)?;
    }

    root.present()?;
    Ok(())
}

/// Instantaneous optical power at the transmitter and receiver.
fn plot_optical_power(output_dir: &Path, data: &PlotData) -> Result<()> {
    let path = output_dir.join("2_optical_power.png");
    let root = BitMapBackend::new(&path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((2, 1));

    for (panel, key, caption, color) in [
        (&panels[0], SignalKey::OpticalTx, "Optical Tx", BLUE),
        (&panels[1], SignalKey::OpticalRx, "Optical Rx", GREEN),
    ] {
        let preview = preview(data.signal(key), data.samples_per_symbol);
        let series = [Series {
            label: "|E|²".to_string(),
            points: time_points(preview, data.sample_rate, |s| s.norm_sqr() * 1e3),
            color,
        }];
        draw_lines(panel, caption, "Time (ns)", "Power (mW)", &series)?;
    }

    root.present()?;
    Ok(())
}

/// Welch power spectral densities of the optical fields.
fn plot_spectra(output_dir: &Path, data: &PlotData) -> Result<()> {
    let path = output_dir.join("3_optical_spectra.png");
    let root = BitMapBackend::new(&path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let colors = [BLACK, BLUE, GREEN];
    let series: Vec<Series> = data
        .spectra
        .iter()
        .zip(colors.iter().cycle())
        .map(|((key, spectrum), color)| Series {
            label: key.to_string(),
            points: spectrum
                .frequencies_hz
                .iter()
                .zip(spectrum.density_db())
                .map(|(f, d)| (f / 1e9, d))
                .collect(),
            color: *color,
        })
        .collect();

    let peak = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.1))
        .fold(f64::NEG_INFINITY, f64::max);
    let clipped: Vec<Series> = series
        .into_iter()
        .map(|s| Series {
            points: s
                .points
                .into_iter()
                .map(|(f, d)| (f, d.max(peak - SPECTRUM_DYNAMIC_RANGE_DB)))
                .collect(),
            ..s
        })
        .collect();

    draw_lines(&root, "Optical Power Spectral Density", "Frequency (GHz)", "PSD (dB W/Hz)", &clipped)?;
    root.present()?;
    Ok(())
}

/// Transmitted symbols next to the received symbol-centre samples.
fn plot_constellations(output_dir: &Path, data: &PlotData) -> Result<()> {
    let path = output_dir.join("4_constellation.png");
    let root = BitMapBackend::new(&path, (1280, 640)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((1, 2));

    draw_scatter(&panels[0], "Tx Constellation", data.signal(SignalKey::TxSymbols), &[])?;
    draw_scatter(
        &panels[1],
        "Rx Symbol Samples",
        data.signal(SignalKey::RxSymbols),
        &data.reference,
    )?;

    root.present()?;
    Ok(())
}

/// Two-symbol eye diagrams of the drive and the detector output.
fn plot_eye_diagrams(output_dir: &Path, data: &PlotData) -> Result<()> {
    let path = output_dir.join("5_eye_diagram.png");
    let root = BitMapBackend::new(&path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((2, 1));

    let sps = data.samples_per_symbol;
    let half = sps / 2;
    for (panel, key, caption) in [
        (&panels[0], SignalKey::ElectricalTx, "Eye Diagram, Electrical Tx"),
        (&panels[1], SignalKey::ElectricalRx, "Eye Diagram, Electrical Rx"),
    ] {
        let traces = eye_traces(data.signal(key), sps, MAX_EYE_TRACES);
        if traces.is_empty() {
            continue;
        }
        let y_range = value_range(traces.iter().flatten().map(|s| s.re));
        let mut chart = ChartBuilder::on(panel)
            .caption(caption, ("sans-serif", 28).into_font())
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..1.5f64, y_range)?;
        chart.configure_mesh().x_desc("Time (symbols)").y_desc("Amplitude").draw()?;

        for trace in &traces {
            chart.draw_series(LineSeries::new(
                trace
                    .iter()
                    .enumerate()
                    .map(|(i, s)| ((i as f64 - half as f64) / sps as f64, s.re)),
                BLUE.mix(0.2),
            ))?;
        }
    }

    root.present()?;
    Ok(())
}

fn draw_lines(area: &Panel, caption: &str, x_desc: &str, y_desc: &str, series: &[Series]) -> Result<()> {
    let points = || series.iter().flat_map(|s| s.points.iter());
    if points().next().is_none() {
        return Ok(());
    }
    let x_range = value_range(points().map(|p| p.0));
    let y_range = value_range(points().map(|p| p.1));

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 28).into_font())
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;

    chart.configure_mesh().x_desc(x_desc).y_desc(y_desc).draw()?;

    for s in series {
        let color = s.color;
        chart
            .draw_series(LineSeries::new(s.points.iter().copied(), color.stroke_width(2)))?
            .label(s.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    Ok(())
}

fn draw_scatter(area: &Panel, caption: &str, samples: &[Complex64], reference: &[Complex64]) -> Result<()> {
    let extent = samples
        .iter()
        .chain(reference)
        .map(|s| s.re.abs().max(s.im.abs()))
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max);
    let limit = if extent > 0.0 { extent * 1.2 } else { 1.0 };

    let mut chart = ChartBuilder::on(area)
        .caption(caption, ("sans-serif", 28).into_font())
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(-limit..limit, -limit..limit)?;
    chart.configure_mesh().x_desc("In-phase").y_desc("Quadrature").draw()?;

    chart.draw_series(
        samples
            .iter()
            .take(MAX_SCATTER_POINTS)
            .map(|s| Circle::new((s.re, s.im), 2, BLUE.mix(0.4).filled())),
    )?;
    if !reference.is_empty() {
        chart
            .draw_series(reference.iter().map(|s| Cross::new((s.re, s.im), 6, RED.stroke_width(2))))?
            .label("decision reference")
            .legend(|(x, y)| Cross::new((x + 10, y), 6, RED.stroke_width(2)));
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }
    Ok(())
}

fn preview(signal: &[Complex64], samples_per_symbol: usize) -> &[Complex64] {
    let n = (PREVIEW_SYMBOLS * samples_per_symbol).min(signal.len());
    &signal[..n]
}

fn time_points(samples: &[Complex64], sample_rate: f64, value: impl Fn(&Complex64) -> f64) -> Vec<(f64, f64)> {
    samples
        .iter()
        .enumerate()
        .map(|(i, s)| (i as f64 / sample_rate * 1e9, value(s)))
        .collect()
}

/// Data extent with a 10 % margin; never empty.
fn value_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return -1.0..1.0;
    }
    let span = hi - lo;
    let pad = if span > 0.0 { span * 0.1 } else { hi.abs().max(1e-12) * 0.1 };
    (lo - pad)..(hi + pad)
}
