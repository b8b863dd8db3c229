use std::fmt;
use thiserror::Error;

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 3600;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    #[error("segment {segment:?} of {input:?} is not a non-negative integer")]
    NotNumeric { input: String, segment: String },
    #[error("{0:?} has more than three colon-separated segments")]
    TooManySegments(String),
    #[error("{0:?} does not fit in a seconds counter")]
    Overflow(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    #[error("invalid start time: {0}")]
    Start(TimeParseError),
    #[error("invalid end time: {0}")]
    End(TimeParseError),
    #[error("start ({start}s) must be before end ({end}s)")]
    NotIncreasing { start: u64, end: u64 },
}

/// A validated `[start, end)` window in whole seconds. `end > start` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeRange {
    start: u64,
    end: u64,
}

impl TimeRange {
    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn duration(&self) -> u64 {
        self.end - self.start
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", format_timestamp(self.start), format_timestamp(self.end))
    }
}

/// Parses `SS`, `MM:SS` or `HH:MM:SS` into seconds.
///
/// Sub-unit values are not bounds-checked, so `"1:70"` is 130 seconds.
pub fn parse_timestamp(text: &str) -> Result<u64, TimeParseError> {
    let segments: Vec<&str> = text.split(':').collect();
    if segments.len() > 3 {
        return Err(TimeParseError::TooManySegments(text.to_string()));
    }

    let mut values = Vec::with_capacity(segments.len());
    for segment in &segments {
        values.push(parse_segment(text, segment)?);
    }

    let overflow = || TimeParseError::Overflow(text.to_string());
    match values.as_slice() {
        [h, m, s] => h
            .checked_mul(SECS_PER_HOUR)
            .and_then(|h| m.checked_mul(SECS_PER_MINUTE).and_then(|m| h.checked_add(m)))
            .and_then(|hm| hm.checked_add(*s))
            .ok_or_else(overflow),
        [m, s] => m
            .checked_mul(SECS_PER_MINUTE)
            .and_then(|m| m.checked_add(*s))
            .ok_or_else(overflow),
        [s] => Ok(*s),
        // split always yields at least one segment
        _ => Err(TimeParseError::NotNumeric { input: text.to_string(), segment: String::new() }),
    }
}

fn parse_segment(input: &str, segment: &str) -> Result<u64, TimeParseError> {
    let trimmed = segment.trim();
    let not_numeric = || TimeParseError::NotNumeric {
        input: input.to_string(),
        segment: segment.to_string(),
    };

    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(not_numeric());
    }
    trimmed.parse::<u64>().map_err(|_| TimeParseError::Overflow(input.to_string()))
}

/// Parses both ends and checks that the range is strictly increasing.
/// Called on every submission; nothing is cached between calls.
pub fn validate_range(start_text: &str, end_text: &str) -> Result<TimeRange, RangeError> {
    let start = parse_timestamp(start_text).map_err(RangeError::Start)?;
    let end = parse_timestamp(end_text).map_err(RangeError::End)?;

    if start >= end {
        return Err(RangeError::NotIncreasing { start, end });
    }
    Ok(TimeRange { start, end })
}

/// Renders seconds as `HH:MM:SS`. Hours are not wrapped.
pub fn format_timestamp(seconds: u64) -> String {
    let h = seconds / SECS_PER_HOUR;
    let m = (seconds % SECS_PER_HOUR) / SECS_PER_MINUTE;
    let s = seconds % SECS_PER_MINUTE;
    format!("{:02}:{:02}:{:02}", h, m, s)
}
