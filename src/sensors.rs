use std::fs;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use serde::{Deserialize, Serialize};

use crate::error::TrackerResult;
use crate::types::Sample;

/// Minimum fields per row: time plus three accel and three gyro axes.
pub const MIN_FIELDS: usize = 7;

/// Row accounting for one parse pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    pub total_rows: usize,
    pub accepted: usize,
    pub skipped: usize,
}

/// Euclidean norm of a 3-vector.
pub fn vector_magnitude(x: f64, y: f64, z: f64) -> f64 {
    (x * x + y * y + z * z).sqrt()
}

/// Parse CSV text into samples, skipping the header and any malformed row.
pub fn parse_csv(text: &str) -> Vec<Sample> {
    parse_csv_with_stats(text).0
}

pub fn parse_csv_with_stats(text: &str) -> (Vec<Sample>, ParseStats) {
    let mut samples = Vec::new();
    let mut stats = ParseStats::default();

    for (line_no, line) in text.split('\n').enumerate().skip(1) {
        stats.total_rows += 1;
        match parse_row(line) {
            Some(sample) => {
                samples.push(sample);
                stats.accepted += 1;
            }
            None => {
                log::debug!("skipping malformed row {}: {:?}", line_no, line);
                stats.skipped += 1;
            }
        }
    }

    log::debug!(
        "parsed {} samples ({} rows, {} skipped)",
        stats.accepted,
        stats.total_rows,
        stats.skipped
    );
    (samples, stats)
}

/// Parse one `time, ax, ay, az, wx, wy, wz[, ...]` row.
///
/// Returns `None` for rows with fewer than seven fields or with any
/// non-numeric or non-finite sensor value. Extra trailing fields are ignored.
pub fn parse_row(line: &str) -> Option<Sample> {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < MIN_FIELDS {
        return None;
    }

    let mut values = [0.0f64; 6];
    for (slot, field) in values.iter_mut().zip(&fields[1..MIN_FIELDS]) {
        let value: f64 = field.trim().parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        *slot = value;
    }

    let [ax, ay, az, wx, wy, wz] = values;
    Some(Sample {
        time: fields[0].trim().to_string(),
        acceleration_magnitude: vector_magnitude(ax, ay, az),
        angular_velocity_magnitude: vector_magnitude(wx, wy, wz),
    })
}

/// Decode raw file bytes, gunzipping when the path ends in `.gz`.
pub fn decode_input(path: &Path, bytes: &[u8]) -> TrackerResult<String> {
    if path.extension().map(|e| e == "gz").unwrap_or(false) {
        let mut text = String::new();
        GzDecoder::new(bytes).read_to_string(&mut text)?;
        Ok(text)
    } else {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
    }
}

/// Read a CSV log (plain or gzipped) from disk.
pub fn load_csv(path: &Path) -> TrackerResult<String> {
    let bytes = fs::read(path)?;
    decode_input(path, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::env;
    use std::io::Write;

    #[test]
    fn test_magnitude() {
        assert_eq!(vector_magnitude(3.0, 4.0, 0.0), 5.0);
        assert_eq!(vector_magnitude(0.0, 0.0, 0.0), 0.0);
        assert_eq!(vector_magnitude(-3.0, -4.0, 0.0), 5.0);
    }

    #[test]
    fn test_two_valid_rows() {
        let csv = "t,ax,ay,az,wx,wy,wz\n0,0,0,1,0,0,0\n1,0,0,1,0,0,0";
        let samples = parse_csv(csv);

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].time, "0");
        assert_eq!(samples[1].time, "1");
        for s in &samples {
            assert_eq!(s.acceleration_magnitude, 1.0);
            assert_eq!(s.angular_velocity_magnitude, 0.0);
        }
    }

    #[test]
    fn test_short_row_skipped() {
        let csv = "t,ax,ay,az,wx,wy,wz\n0,0,0,1,0,0,0\n0.5,1,2,3\n1,0,0,1,0,0,0\n";
        let (samples, stats) = parse_csv_with_stats(csv);

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[1].time, "1");
        // Trailing newline yields an empty last line, which is also skipped
        assert_eq!(stats.total_rows, 4);
        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.skipped, 2);
    }

    #[test]
    fn test_non_numeric_and_non_finite_rows_skipped() {
        let csv = "h\n0,a,0,1,0,0,0\n1,NaN,0,1,0,0,0\n2,inf,0,1,0,0,0\n3,0,0,1,0,0,0";
        let samples = parse_csv(csv);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].time, "3");
    }

    #[test]
    fn test_trimming_and_extra_fields() {
        let csv = "h\r\n 0.25 , 3 , 4 , 0 , 0 , 0 , 2 ,extra,more\r\n";
        let samples = parse_csv(csv);

        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].time, "0.25");
        assert_relative_eq!(samples[0].acceleration_magnitude, 5.0);
        assert_relative_eq!(samples[0].angular_velocity_magnitude, 2.0);
    }

    #[test]
    fn test_empty_and_header_only() {
        assert!(parse_csv("").is_empty());
        assert!(parse_csv("t,ax,ay,az,wx,wy,wz").is_empty());
        assert!(parse_csv("t,ax,ay,az,wx,wy,wz\n").is_empty());
    }

    #[test]
    fn test_magnitudes_non_negative() {
        let csv = "h\n0,-9,-1,-2,-3,-0.5,-7\n1,1e3,-1e3,0,0,-4,3";
        for s in parse_csv(csv) {
            assert!(s.acceleration_magnitude >= 0.0);
            assert!(s.angular_velocity_magnitude >= 0.0);
        }
    }

    #[test]
    fn test_load_gzipped_csv() {
        let path = env::temp_dir().join("fall_tracker_load_test.csv.gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(b"t,ax,ay,az,wx,wy,wz\n0,0,0,1,0,0,0\n")
            .unwrap();
        fs::write(&path, encoder.finish().unwrap()).unwrap();

        let text = load_csv(&path).unwrap();
        assert_eq!(parse_csv(&text).len(), 1);

        fs::remove_file(&path).unwrap();
    }
}
