use serde::{Deserialize, Serialize};

use crate::config::DetectionConfig;
use crate::types::{FallRecord, Sample};

pub const RECOMMEND_MORE_ACTIVITY: &str = "Increase daily physical activity";
pub const RECOMMEND_BALANCE_TRAINING: &str = "Consider balance training";

/// Accumulated per-load health state. Reset on every new file load.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub steps: u64,
    pub fall_history: Vec<FallRecord>,
}

impl HealthSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.steps = 0;
        self.fall_history.clear();
    }

    pub fn record_fall(&mut self, record: FallRecord) {
        self.fall_history.push(record);
    }
}

/// True when the acceleration magnitude lies strictly inside the gait band.
pub fn in_gait_band(sample: &Sample, config: &DetectionConfig) -> bool {
    sample.acceleration_magnitude > config.gait_band_low
        && sample.acceleration_magnitude < config.gait_band_high
}

/// Crude step proxy: one step per sample inside the gait band.
pub fn count_steps(samples: &[Sample], config: &DetectionConfig) -> u64 {
    samples.iter().filter(|s| in_gait_band(s, config)).count() as u64
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub period: String,
    pub total_steps: u64,
    pub avg_steps_per_day: u64,
    pub fall_count: usize,
    pub recommendations: Vec<String>,
}

pub fn generate_report(summary: &HealthSummary, config: &DetectionConfig) -> HealthReport {
    let days = config.report_period_days.max(1);
    let avg_steps_per_day = (summary.steps as f64 / days as f64).round() as u64;
    let fall_count = summary.fall_history.len();

    let mut recommendations = Vec::new();
    if avg_steps_per_day < config.daily_step_goal {
        recommendations.push(RECOMMEND_MORE_ACTIVITY.to_string());
    }
    if fall_count > 0 {
        recommendations.push(RECOMMEND_BALANCE_TRAINING.to_string());
    }

    HealthReport {
        period: format!("last {} days", days),
        total_steps: summary.steps,
        avg_steps_per_day,
        fall_count,
        recommendations,
    }
}
