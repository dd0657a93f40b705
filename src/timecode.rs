use anyhow::{Result, anyhow, Context};

use crate::errors::TimecodeError;

/// SRT timecode formatting
///
/// Converts floating-point second offsets into the fixed `HH:MM:SS,mmm`
/// form used by subtitle timing lines. The total offset is rounded to whole
/// milliseconds before being decomposed, so the milliseconds component can
/// never reach 1000.
/// Format a non-negative seconds offset as an SRT timecode
pub fn format_timecode(seconds: f64) -> Result<String, TimecodeError> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(TimecodeError::Negative(seconds));
    }

    let total_ms = (seconds * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1_000;
    let millis = total_ms % 1_000;

    // {:02} widens past two digits on its own once hours exceed 99
    Ok(format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis))
}

/// Parse an SRT timecode back to seconds - used by tests
#[allow(dead_code)]
pub fn parse_timecode(timecode: &str) -> Result<f64> {
    let parts: Vec<&str> = timecode.split(&[':', ','][..]).collect();

    if parts.len() != 4 {
        return Err(anyhow!("Invalid timecode format: {}", timecode));
    }

    let hours: u64 = parts[0].parse().context("Failed to parse hours")?;
    let minutes: u64 = parts[1].parse().context("Failed to parse minutes")?;
    let seconds: u64 = parts[2].parse().context("Failed to parse seconds")?;
    let millis: u64 = parts[3].parse().context("Failed to parse milliseconds")?;

    if minutes >= 60 || seconds >= 60 || millis >= 1000 {
        return Err(anyhow!("Invalid time components in timecode: {}", timecode));
    }

    let total_ms = hours * 3_600_000 + minutes * 60_000 + seconds * 1_000 + millis;
    Ok(total_ms as f64 / 1000.0)
}
