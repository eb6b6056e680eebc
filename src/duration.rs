use thiserror::Error;

/// Shown in place of a duration when either time token is not a number.
pub const DURATION_ERROR: &str = "computation error";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DurationError {
    #[error("time token {0:?} is not a number of seconds")]
    InvalidTime(String),
}

fn parse_seconds(token: &str) -> Result<f64, DurationError> {
    token
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DurationError::InvalidTime(token.to_string()))
}

/// Milliseconds between two fractional-second tokens, rounded to the
/// nearest millisecond. An end before the start clamps to zero.
pub fn duration_millis(start: &str, end: &str) -> Result<u64, DurationError> {
    let start = parse_seconds(start)?;
    let end = parse_seconds(end)?;
    let diff = ((end - start) * 1000.0).round();
    if diff < 0.0 {
        log::debug!("end precedes start by {}ms, clamping to zero", -diff);
        return Ok(0);
    }
    Ok(diff as u64)
}

pub fn format_millis(diff: u64) -> String {
    if diff < 1000 {
        return format!("{} milliseconds", diff);
    }

    let total_seconds = diff / 1000;
    let millis = diff % 1000;
    if total_seconds < 60 {
        return format!("{}s{}ms", total_seconds, millis);
    }

    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{}m{}s{}ms", minutes, seconds, millis)
}

/// Human-readable duration between two time tokens, or [`DURATION_ERROR`].
pub fn format_duration(start: &str, end: &str) -> String {
    match duration_millis(start, end) {
        Ok(diff) => format_millis(diff),
        Err(e) => {
            log::warn!("duration computation failed: {}", e);
            DURATION_ERROR.to_string()
        }
    }
}
