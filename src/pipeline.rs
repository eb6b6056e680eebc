//! File-load pipeline: parse, segment, count steps, then dispatch
//! notifications and feed the chart sinks.
//!
//! `process_text` is pure. `Tracker` owns the per-load state (health summary,
//! collaborators) and serializes loads: a load that starts while another one
//! is still in flight is rejected with `LoadInProgress`.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::chart::{derived_series, ChartSink};
use crate::config::DetectionConfig;
use crate::contacts::save_contact;
use crate::error::{TrackerError, TrackerResult};
use crate::health::{self, HealthReport, HealthSummary};
use crate::incident::{FallNotifier, NotificationOutcome};
use crate::segmentation::{segment, Segmentation};
use crate::sensors::{decode_input, parse_csv_with_stats, ParseStats};
use crate::types::{EmergencyContact, Sample};

/// Result of the pure part of the pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Processed {
    pub samples: Vec<Sample>,
    pub parse_stats: ParseStats,
    pub segmentation: Segmentation,
    pub steps: u64,
}

pub fn process_text(text: &str, config: &DetectionConfig) -> Processed {
    let (samples, parse_stats) = parse_csv_with_stats(text);
    let segmentation = segment(&samples, config);
    let steps = health::count_steps(&samples, config);

    Processed {
        samples,
        parse_stats,
        segmentation,
        steps,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProcessOutcome {
    pub processed: Processed,
    /// One outcome per fall entry, in order
    pub notifications: Vec<NotificationOutcome>,
}

struct TrackerState {
    summary: HealthSummary,
    notifier: FallNotifier,
    acceleration_chart: Box<dyn ChartSink + Send>,
    angular_velocity_chart: Box<dyn ChartSink + Send>,
}

pub struct Tracker {
    config: DetectionConfig,
    load_lock: tokio::sync::Mutex<()>,
    state: Mutex<TrackerState>,
}

impl Tracker {
    pub fn new(
        config: DetectionConfig,
        notifier: FallNotifier,
        acceleration_chart: Box<dyn ChartSink + Send>,
        angular_velocity_chart: Box<dyn ChartSink + Send>,
    ) -> Self {
        Self {
            config,
            load_lock: tokio::sync::Mutex::new(()),
            state: Mutex::new(TrackerState {
                summary: HealthSummary::new(),
                notifier,
                acceleration_chart,
                angular_velocity_chart,
            }),
        }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    fn lock_state(&self) -> TrackerResult<MutexGuard<'_, TrackerState>> {
        self.state
            .lock()
            .map_err(|_| TrackerError::Internal("Failed to acquire tracker state lock".to_string()))
    }

    /// Claim the loader. Fails immediately if another load holds it.
    pub fn begin_load(&self) -> TrackerResult<tokio::sync::MutexGuard<'_, ()>> {
        self.load_lock.try_lock().map_err(|_| {
            log::warn!("rejecting load: a file is already being processed");
            TrackerError::LoadInProgress
        })
    }

    /// Read and process one CSV file (plain or `.gz`).
    pub async fn process_file(&self, path: &Path) -> TrackerResult<ProcessOutcome> {
        if path.as_os_str().is_empty() {
            return Err(TrackerError::MissingFile);
        }
        let _guard = self.begin_load()?;

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::error!("input file {} not found", path.display());
                return Err(TrackerError::MissingFile);
            }
            Err(e) => return Err(e.into()),
        };
        let text = decode_input(path, &bytes)?;
        log::info!("loaded {} ({} bytes)", path.display(), bytes.len());

        self.apply(&text)
    }

    /// Process CSV text that is already in memory.
    pub fn process_text(&self, text: &str) -> TrackerResult<ProcessOutcome> {
        let _guard = self.begin_load()?;
        self.apply(text)
    }

    fn apply(&self, text: &str) -> TrackerResult<ProcessOutcome> {
        let processed = process_text(text, &self.config);
        let mut guard = self.lock_state()?;
        let state = &mut *guard;

        state.summary.reset();
        state.summary.steps = processed.steps;

        let (labels, accel, gyro) = derived_series(&processed.samples);
        state.acceleration_chart.update(&labels, &accel);
        state.angular_velocity_chart.update(&labels, &gyro);

        let notifications = state
            .notifier
            .dispatch(&processed.segmentation.fall_entries, &mut state.summary);

        log::info!(
            "processed {} samples ({} skipped): {} intervals, {} falls, {} steps",
            processed.parse_stats.accepted,
            processed.parse_stats.skipped,
            processed.segmentation.intervals.len(),
            processed.segmentation.fall_entries.len(),
            processed.steps
        );

        Ok(ProcessOutcome {
            processed,
            notifications,
        })
    }

    pub fn summary(&self) -> TrackerResult<HealthSummary> {
        Ok(self.lock_state()?.summary.clone())
    }

    pub fn generate_report(&self) -> TrackerResult<HealthReport> {
        let state = self.lock_state()?;
        Ok(health::generate_report(&state.summary, &self.config))
    }

    pub fn save_contact(&self, name: &str, phone: &str) -> TrackerResult<EmergencyContact> {
        let mut state = self.lock_state()?;
        save_contact(state.notifier.contacts_mut(), name, phone)
    }

    pub fn contact(&self) -> TrackerResult<Option<EmergencyContact>> {
        self.lock_state()?.notifier.contacts().get()
    }

    pub fn emergency_call(&self) -> TrackerResult<EmergencyContact> {
        self.lock_state()?.notifier.emergency_call()
    }
}
