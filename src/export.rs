use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::duration::format_duration;
use crate::error::TrackerResult;
use crate::health::{HealthReport, HealthSummary};
use crate::incident::NotificationOutcome;
use crate::pipeline::ProcessOutcome;
use crate::sensors::ParseStats;
use crate::types::{ActivityInterval, ActivityKind};

/// One display row of the activity timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub kind: ActivityKind,
    pub start_time: String,
    pub end_time: String,
    pub duration: String,
}

impl TimelineEntry {
    pub fn describe(&self) -> String {
        let marker = if self.kind.is_fall() { "⚠ " } else { "" };
        format!(
            "{}{} - from {} to {} (duration: {})",
            marker, self.kind, self.start_time, self.end_time, self.duration
        )
    }
}

pub fn timeline(intervals: &[ActivityInterval]) -> Vec<TimelineEntry> {
    intervals
        .iter()
        .map(|i| TimelineEntry {
            kind: i.kind,
            start_time: i.start_time.clone(),
            end_time: i.end_time.clone(),
            duration: format_duration(&i.start_time, &i.end_time),
        })
        .collect()
}

/// Complete record of one processed file (JSON-serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionExport {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub parse_stats: ParseStats,
    pub timeline: Vec<TimelineEntry>,
    pub notifications: Vec<NotificationOutcome>,
    pub summary: HealthSummary,
    pub report: HealthReport,
}

impl SessionExport {
    pub fn new(
        source: &str,
        outcome: &ProcessOutcome,
        summary: HealthSummary,
        report: HealthReport,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            source: source.to_string(),
            parse_stats: outcome.processed.parse_stats,
            timeline: timeline(&outcome.processed.segmentation.intervals),
            notifications: outcome.notifications.clone(),
            summary,
            report,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write `session_<timestamp>.json` into `dir` and return its path.
    pub fn save(&self, dir: &Path) -> TrackerResult<PathBuf> {
        fs::create_dir_all(dir)?;
        let filename = dir.join(format!(
            "session_{}.json",
            self.generated_at.format("%Y%m%d_%H%M%S")
        ));
        fs::write(&filename, self.to_json()?)?;
        Ok(filename)
    }
}
