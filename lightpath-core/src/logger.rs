use crate::{
    error::LightpathError,
    simulation::state::SimulationResult,
};
use csv::Writer;
use serde::Serialize;
use std::fs;
use std::io;

#[derive(Debug, Serialize)]
struct LogEntry<'a> {
    signal: &'a str,
    sample: usize,
    time_s: f64,
    re: f64,
    im: f64,
}

/// Long-format CSV writer for the signals of a completed run.
pub struct WaveformLogger {
    path: String,
    writer: Writer<fs::File>,
}

impl WaveformLogger {
    pub fn new(path: &str) -> Result<Self, io::Error> {
        let writer = Writer::from_path(path)?;
        Ok(Self {
            path: path.to_string(),
            writer,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn log_result(&mut self, result: &SimulationResult) -> Result<(), LightpathError> {
        for (key, samples) in &result.signals {
            let period = 1.0 / result.rate_of(*key);
            for (sample, value) in samples.iter().enumerate() {
                let entry = LogEntry {
                    signal: key.as_str(),
                    sample,
                    time_s: sample as f64 * period,
                    re: value.re,
                    im: value.im,
                };
                self.writer
                    .serialize(entry)
                    .map_err(|e| LightpathError::CsvError(self.path.clone(), e))?;
            }
        }
        self.writer
            .flush()
            .map_err(|e| LightpathError::FileIO(self.path.clone(), e))?;
        Ok(())
    }
}
