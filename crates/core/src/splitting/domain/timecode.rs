use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum TimecodeError {
    #[error("invalid timecode format: {0:?}")]
    Format(String),
}

/// Parse `MM:SS` or `HH:MM:SS` (seconds may carry a fraction) into
/// seconds.
pub fn parse_timecode(text: &str) -> Result<f64, TimecodeError> {
    let trimmed = text.trim();
    let parts: Vec<&str> = trimmed.split(':').collect();

    let err = || TimecodeError::Format(trimmed.to_string());
    match parts.as_slice() {
        [minutes, seconds] => {
            let m: u32 = minutes.parse().map_err(|_| err())?;
            let s: f64 = seconds.parse().map_err(|_| err())?;
            Ok(f64::from(m) * 60.0 + s)
        }
        [hours, minutes, seconds] => {
            let h: u32 = hours.parse().map_err(|_| err())?;
            let m: u32 = minutes.parse().map_err(|_| err())?;
            let s: f64 = seconds.parse().map_err(|_| err())?;
            Ok(f64::from(h) * 3600.0 + f64::from(m) * 60.0 + s)
        }
        _ => Err(err()),
    }
}

/// Format whole seconds as `MM:SS`, or `HH:MM:SS` past the first hour.
pub fn format_timecode(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes:02}:{secs:02}")
    }
}
