// Fall Tracker
// Turns an accelerometer/gyroscope CSV log into an activity timeline,
// a step count and emergency notifications.

pub mod chart;
pub mod config;
pub mod contacts;
pub mod duration;
pub mod error;
pub mod export;
pub mod health;
pub mod incident;
pub mod pipeline;
pub mod segmentation;
pub mod sensors;
pub mod types;

pub use config::DetectionConfig;
pub use duration::format_duration;
pub use error::{TrackerError, TrackerResult};
pub use pipeline::{process_text, ProcessOutcome, Processed, Tracker};
pub use segmentation::{segment, Segmentation};
pub use sensors::parse_csv;
pub use types::{ActivityInterval, ActivityKind, EmergencyContact, FallEntry, Location, Sample};
