// src/clock_time.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    #[error("Clock time '{0}' is not in HH:MM format")]
    Malformed(String),

    #[error("Clock time '{0}' is out of range")]
    OutOfRange(String),
}

/// Turns an `HH:MM` string into `HH * 100 + MM`.
///
/// The result only orders clock times within a day. It is not minutes since
/// midnight, so never subtract two of these to get a duration.
pub fn clock_key(value: &str) -> Result<u32, TimeParseError> {
    let (hours, minutes) = value
        .trim()
        .split_once(':')
        .ok_or_else(|| TimeParseError::Malformed(value.to_string()))?;

    if hours.is_empty()
        || minutes.len() != 2
        || !hours.chars().all(|c| c.is_ascii_digit())
        || !minutes.chars().all(|c| c.is_ascii_digit())
    {
        return Err(TimeParseError::Malformed(value.to_string()));
    }

    let hours: u32 = hours
        .parse()
        .map_err(|_| TimeParseError::Malformed(value.to_string()))?;
    let minutes: u32 = minutes
        .parse()
        .map_err(|_| TimeParseError::Malformed(value.to_string()))?;

    if hours > 23 || minutes > 59 {
        return Err(TimeParseError::OutOfRange(value.to_string()));
    }

    Ok(hours * 100 + minutes)
}
