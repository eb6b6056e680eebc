use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::Sample;

/// Receives one labeled series per file load.
pub trait ChartSink {
    fn update(&mut self, labels: &[String], values: &[f64]);
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// Keeps the most recent series in memory.
#[derive(Clone, Debug, Default)]
pub struct SeriesRecorder {
    pub series: Series,
    pub updates: usize,
}

impl SeriesRecorder {
    pub fn new(name: &str) -> Self {
        Self {
            series: Series {
                name: name.to_string(),
                ..Series::default()
            },
            updates: 0,
        }
    }
}

impl ChartSink for SeriesRecorder {
    fn update(&mut self, labels: &[String], values: &[f64]) {
        self.series.labels = labels.to_vec();
        self.series.values = values.to_vec();
        self.updates += 1;
    }
}

/// Writes each update to a JSON file, replacing the previous contents.
pub struct JsonSeriesSink {
    name: String,
    path: PathBuf,
}

impl JsonSeriesSink {
    pub fn new(name: &str, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            path: path.into(),
        }
    }
}

impl ChartSink for JsonSeriesSink {
    fn update(&mut self, labels: &[String], values: &[f64]) {
        let series = Series {
            name: self.name.clone(),
            labels: labels.to_vec(),
            values: values.to_vec(),
        };
        let result = serde_json::to_string_pretty(&series)
            .map_err(|e| e.to_string())
            .and_then(|json| fs::write(&self.path, json).map_err(|e| e.to_string()));
        match result {
            Ok(()) => log::info!(
                "[CHART] {} points of {} written to {}",
                values.len(),
                self.name,
                self.path.display()
            ),
            Err(e) => log::error!("[CHART] failed to write {}: {}", self.path.display(), e),
        }
    }
}

/// Time labels plus both derived series.
pub fn derived_series(samples: &[Sample]) -> (Vec<String>, Vec<f64>, Vec<f64>) {
    let labels = samples.iter().map(|s| s.time.clone()).collect();
    let accel = samples.iter().map(|s| s.acceleration_magnitude).collect();
    let gyro = samples.iter().map(|s| s.angular_velocity_magnitude).collect();
    (labels, accel, gyro)
}
