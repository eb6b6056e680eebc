use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{TrackerError, TrackerResult};
use crate::types::ActivityKind;

pub const DEFAULT_ACCELERATION_THRESHOLD: f64 = 8.0;
pub const DEFAULT_ANGULAR_VELOCITY_THRESHOLD: f64 = 3.5;
pub const DEFAULT_GAIT_BAND_LOW: f64 = 1.2;
pub const DEFAULT_GAIT_BAND_HIGH: f64 = 1.8;
pub const DEFAULT_REPORT_PERIOD_DAYS: u32 = 30;
pub const DEFAULT_DAILY_STEP_GOAL: u64 = 5000;

/// Thresholds and report parameters for one processing pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Acceleration magnitude must be strictly above this to count as a fall
    pub acceleration_threshold: f64,

    /// Angular velocity magnitude must be strictly above this as well
    pub angular_velocity_threshold: f64,

    /// Gait band (exclusive on both ends) used as a per-sample step proxy
    pub gait_band_low: f64,
    pub gait_band_high: f64,

    /// Kind of the interval opened on the first sample before it is classified
    pub initial_kind: ActivityKind,

    pub report_period_days: u32,
    pub daily_step_goal: u64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            acceleration_threshold: DEFAULT_ACCELERATION_THRESHOLD,
            angular_velocity_threshold: DEFAULT_ANGULAR_VELOCITY_THRESHOLD,
            gait_band_low: DEFAULT_GAIT_BAND_LOW,
            gait_band_high: DEFAULT_GAIT_BAND_HIGH,
            initial_kind: ActivityKind::Walking,
            report_period_days: DEFAULT_REPORT_PERIOD_DAYS,
            daily_step_goal: DEFAULT_DAILY_STEP_GOAL,
        }
    }
}

impl DetectionConfig {
    /// Load overrides from a JSON file; missing keys keep their defaults.
    pub fn load(path: &Path) -> TrackerResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            TrackerError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config: DetectionConfig = serde_json::from_str(&contents).map_err(|e| {
            TrackerError::Config(format!("failed to parse {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> TrackerResult<()> {
        let finite = [
            self.acceleration_threshold,
            self.angular_velocity_threshold,
            self.gait_band_low,
            self.gait_band_high,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(TrackerError::Config(
                "thresholds must be finite numbers".to_string(),
            ));
        }
        if self.gait_band_low >= self.gait_band_high {
            return Err(TrackerError::Config(format!(
                "gait band is empty ({} >= {})",
                self.gait_band_low, self.gait_band_high
            )));
        }
        if self.report_period_days == 0 {
            return Err(TrackerError::Config(
                "report period must be at least one day".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_defaults() {
        let config = DetectionConfig::default();
        assert_eq!(config.acceleration_threshold, 8.0);
        assert_eq!(config.angular_velocity_threshold, 3.5);
        assert_eq!(config.gait_band_low, 1.2);
        assert_eq!(config.gait_band_high, 1.8);
        assert_eq!(config.initial_kind, ActivityKind::Walking);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let path = env::temp_dir().join("fall_tracker_partial_config.json");
        fs::write(&path, r#"{ "acceleration_threshold": 10.5 }"#).unwrap();

        let config = DetectionConfig::load(&path).unwrap();
        assert_eq!(config.acceleration_threshold, 10.5);
        assert_eq!(config.angular_velocity_threshold, 3.5);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_empty_gait_band_rejected() {
        let config = DetectionConfig {
            gait_band_low: 2.0,
            gait_band_high: 1.0,
            ..DetectionConfig::default()
        };
        assert!(matches!(config.validate(), Err(TrackerError::Config(_))));
    }

    #[test]
    fn test_missing_file() {
        let path = env::temp_dir().join("fall_tracker_does_not_exist.json");
        assert!(DetectionConfig::load(&path).is_err());
    }
}
