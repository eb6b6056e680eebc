use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One parsed CSV row with its derived magnitudes.
///
/// `time` is kept as the raw text token; duration math parses it on demand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: String,
    pub acceleration_magnitude: f64,
    pub angular_velocity_magnitude: f64,
}

impl Sample {
    pub fn new(time: impl Into<String>, acceleration_magnitude: f64, angular_velocity_magnitude: f64) -> Self {
        Self {
            time: time.into(),
            acceleration_magnitude,
            angular_velocity_magnitude,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityKind {
    Walking,
    Fall,
}

impl ActivityKind {
    pub fn is_fall(self) -> bool {
        self == ActivityKind::Fall
    }

    pub fn label(self) -> &'static str {
        match self {
            ActivityKind::Walking => "Walking",
            ActivityKind::Fall => "Fall detected",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A maximal run of consecutive samples sharing one classification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivityInterval {
    pub kind: ActivityKind,
    pub start_time: String,
    pub end_time: String,
    /// Index of the first sample in the run
    pub first_sample: usize,
    /// Samples covered by the run (0 only for the seeded interval when the
    /// very first sample already changes state)
    pub sample_count: usize,
}

impl ActivityInterval {
    pub fn open(kind: ActivityKind, time: &str, first_sample: usize) -> Self {
        Self {
            kind,
            start_time: time.to_string(),
            end_time: time.to_string(),
            first_sample,
            sample_count: 0,
        }
    }
}

/// Emitted once per transition into the Fall state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FallEntry {
    pub sample_index: usize,
    pub time: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

impl Location {
    pub fn map_link(&self) -> String {
        format!(
            "https://maps.google.com/?q={},{}",
            self.latitude, self.longitude
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    pub name: String,
    pub phone: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FallRecord {
    pub detected_at: DateTime<Utc>,
    pub location: Option<Location>,
}
