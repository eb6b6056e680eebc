//! Activity segmentation: per-sample fall classification merged into runs.
//!
//! Run-length encoding over a two-state classifier. The first interval is
//! seeded with `DetectionConfig::initial_kind` before the first sample is
//! classified, so a fall on the very first sample produces a leading
//! zero-sample interval of the seed kind.

use serde::{Deserialize, Serialize};

use crate::config::DetectionConfig;
use crate::types::{ActivityInterval, ActivityKind, FallEntry, Sample};

/// Output of one segmentation pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Segmentation {
    pub intervals: Vec<ActivityInterval>,
    /// One entry per transition into Fall, in sample order
    pub fall_entries: Vec<FallEntry>,
}

impl Segmentation {
    pub fn fall_count(&self) -> usize {
        self.intervals.iter().filter(|i| i.kind.is_fall()).count()
    }
}

/// Both magnitudes must exceed their thresholds; a hard landing without
/// rotation is not a fall.
pub fn is_fall(sample: &Sample, config: &DetectionConfig) -> bool {
    sample.acceleration_magnitude > config.acceleration_threshold
        && sample.angular_velocity_magnitude > config.angular_velocity_threshold
}

pub fn classify(sample: &Sample, config: &DetectionConfig) -> ActivityKind {
    if is_fall(sample, config) {
        ActivityKind::Fall
    } else {
        ActivityKind::Walking
    }
}

/// Segment samples into alternating Walking/Fall intervals.
pub fn segment(samples: &[Sample], config: &DetectionConfig) -> Segmentation {
    let mut result = Segmentation::default();

    let Some(first) = samples.first() else {
        return result;
    };

    let mut current_kind = config.initial_kind;
    let mut current = ActivityInterval::open(current_kind, &first.time, 0);

    for (index, sample) in samples.iter().enumerate() {
        let kind = classify(sample, config);

        if kind != current_kind {
            current.end_time = sample.time.clone();
            let closed = std::mem::replace(
                &mut current,
                ActivityInterval::open(kind, &sample.time, index),
            );
            result.intervals.push(closed);
            current.sample_count = 1;
            current_kind = kind;

            if kind.is_fall() {
                log::info!("fall entry at sample {} (t={})", index, sample.time);
                result.fall_entries.push(FallEntry {
                    sample_index: index,
                    time: sample.time.clone(),
                });
            }
        } else {
            current.end_time = sample.time.clone();
            current.sample_count += 1;
        }
    }

    result.intervals.push(current);

    log::debug!(
        "segmented {} samples into {} intervals ({} falls)",
        samples.len(),
        result.intervals.len(),
        result.fall_entries.len()
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(time: &str) -> Sample {
        Sample::new(time, 1.0, 0.0)
    }

    fn fall(time: &str) -> Sample {
        Sample::new(time, 9.0, 4.0)
    }

    fn assert_invariants(samples: &[Sample], seg: &Segmentation) {
        // Coverage: runs are contiguous and cover every sample once
        let mut next = 0;
        for interval in &seg.intervals {
            assert_eq!(interval.first_sample, next);
            next += interval.sample_count;
        }
        assert_eq!(next, samples.len());

        // Adjacent intervals never share a kind
        for pair in seg.intervals.windows(2) {
            assert_ne!(pair[0].kind, pair[1].kind);
        }
    }

    #[test]
    fn test_single_walking_interval() {
        let samples = vec![walk("0"), walk("1")];
        let seg = segment(&samples, &DetectionConfig::default());

        assert_eq!(seg.intervals.len(), 1);
        assert_eq!(seg.intervals[0].kind, ActivityKind::Walking);
        assert_eq!(seg.intervals[0].start_time, "0");
        assert_eq!(seg.intervals[0].end_time, "1");
        assert!(seg.fall_entries.is_empty());
        assert_invariants(&samples, &seg);
    }

    #[test]
    fn test_fall_between_walking() {
        let samples = vec![walk("0"), walk("1"), fall("2"), walk("3"), walk("4")];
        let seg = segment(&samples, &DetectionConfig::default());

        let kinds: Vec<ActivityKind> = seg.intervals.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![ActivityKind::Walking, ActivityKind::Fall, ActivityKind::Walking]
        );
        assert_eq!(seg.fall_entries.len(), 1);
        assert_eq!(seg.fall_entries[0].sample_index, 2);
        assert_eq!(seg.fall_entries[0].time, "2");

        // Closing an interval shares the boundary token with the next one
        assert_eq!(seg.intervals[0].end_time, "2");
        assert_eq!(seg.intervals[1].start_time, "2");
        assert_eq!(seg.intervals[1].end_time, "3");
        assert_eq!(seg.intervals[2].start_time, "3");
        assert_eq!(seg.intervals[2].end_time, "4");
        assert_invariants(&samples, &seg);
    }

    #[test]
    fn test_requires_both_thresholds() {
        let config = DetectionConfig::default();
        assert!(!is_fall(&Sample::new("0", 12.0, 1.0), &config));
        assert!(!is_fall(&Sample::new("0", 2.0, 6.0), &config));
        // Strictly greater than
        assert!(!is_fall(&Sample::new("0", 8.0, 3.5), &config));
        assert!(is_fall(&Sample::new("0", 8.01, 3.51), &config));
    }

    #[test]
    fn test_empty_input() {
        let seg = segment(&[], &DetectionConfig::default());
        assert!(seg.intervals.is_empty());
        assert!(seg.fall_entries.is_empty());
    }

    #[test]
    fn test_first_sample_fall_keeps_seed_interval() {
        let samples = vec![fall("0"), fall("1"), walk("2")];
        let seg = segment(&samples, &DetectionConfig::default());

        assert_eq!(seg.intervals.len(), 3);
        let seed = &seg.intervals[0];
        assert_eq!(seed.kind, ActivityKind::Walking);
        assert_eq!(seed.start_time, "0");
        assert_eq!(seed.end_time, "0");
        assert_eq!(seed.sample_count, 0);
        assert_eq!(seg.intervals[1].kind, ActivityKind::Fall);
        assert_eq!(seg.intervals[1].sample_count, 2);
        assert_eq!(seg.fall_entries.len(), 1);
        assert_invariants(&samples, &seg);
    }

    #[test]
    fn test_fall_seed_skips_leading_interval() {
        let config = DetectionConfig {
            initial_kind: ActivityKind::Fall,
            ..DetectionConfig::default()
        };
        let samples = vec![fall("0"), walk("1")];
        let seg = segment(&samples, &config);

        assert_eq!(seg.intervals.len(), 2);
        assert_eq!(seg.intervals[0].kind, ActivityKind::Fall);
        assert_eq!(seg.intervals[0].sample_count, 1);
        // Seeded state is not a transition, so nothing to notify
        assert!(seg.fall_entries.is_empty());
        assert_invariants(&samples, &seg);
    }

    #[test]
    fn test_trailing_single_sample_interval() {
        let samples = vec![walk("0"), walk("1"), fall("2")];
        let seg = segment(&samples, &DetectionConfig::default());

        let last = seg.intervals.last().unwrap();
        assert_eq!(last.kind, ActivityKind::Fall);
        assert_eq!(last.start_time, "2");
        assert_eq!(last.end_time, "2");
        assert_eq!(last.sample_count, 1);
        assert_invariants(&samples, &seg);
    }

    #[test]
    fn test_invariants_over_all_short_patterns() {
        let config = DetectionConfig::default();
        // Every fall/walk pattern up to 6 samples
        for len in 1..=6usize {
            for mask in 0u32..(1 << len) {
                let samples: Vec<Sample> = (0..len)
                    .map(|i| {
                        let t = i.to_string();
                        if mask & (1 << i) != 0 {
                            fall(&t)
                        } else {
                            walk(&t)
                        }
                    })
                    .collect();
                let seg = segment(&samples, &config);
                assert_invariants(&samples, &seg);

                let entries = (0..len)
                    .filter(|&i| {
                        let prev_fall = i > 0 && mask & (1 << (i - 1)) != 0;
                        mask & (1 << i) != 0 && !prev_fall
                    })
                    .count();
                assert_eq!(seg.fall_entries.len(), entries);
            }
        }
    }

    #[test]
    fn test_repeated_falls_and_idempotence() {
        let samples = vec![
            walk("0"),
            fall("1"),
            fall("2"),
            walk("3"),
            fall("4"),
            walk("5"),
            fall("6"),
        ];
        let config = DetectionConfig::default();
        let first = segment(&samples, &config);
        let second = segment(&samples, &config);

        assert_eq!(first, second);
        assert_eq!(first.fall_entries.len(), 3);
        assert_eq!(first.fall_count(), 3);
        assert_invariants(&samples, &first);
    }
}
