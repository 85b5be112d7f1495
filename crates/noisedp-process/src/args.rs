//! String argument parsing shared by stage constructors.
//!
//! Pipeline configuration passes every stage argument as a string. These
//! helpers turn them into typed values and attach the stage name to any
//! error.

use chrono::{NaiveDateTime, Weekday};
use noisedp_core::{Error, Resolution, Result, parse_timestamp};

/// Check the argument count lies in `min..=max`.
pub fn expect_count(stage: &str, args: &[String], min: usize, max: usize) -> Result<()> {
    if (min..=max).contains(&args.len()) {
        return Ok(());
    }
    let expected = if min == max {
        min.to_string()
    } else if max == usize::MAX {
        format!("at least {min}")
    } else {
        format!("{min}-{max}")
    };
    Err(Error::ArgumentCount {
        stage: stage.to_string(),
        expected,
        actual: args.len(),
    })
}

/// Parse `true`/`false` (case-insensitive).
pub fn parse_bool(stage: &str, s: &str) -> Result<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(Error::invalid_argument(stage, s, "expected true or false")),
    }
}

/// Parse a resolution, attaching the stage name on failure.
pub fn parse_resolution(stage: &str, s: &str) -> Result<Resolution> {
    s.parse()
        .map_err(|_| Error::invalid_argument(stage, s, "expected minutes or <n>{s,T,min,H,D}"))
}

/// Parse a non-negative count.
pub fn parse_count(stage: &str, s: &str) -> Result<usize> {
    s.trim()
        .parse()
        .map_err(|_| Error::invalid_argument(stage, s, "expected a non-negative integer"))
}

/// Parse a timestamp, attaching the stage name on failure.
pub fn parse_time(stage: &str, s: &str) -> Result<NaiveDateTime> {
    parse_timestamp(s)
        .map_err(|_| Error::invalid_argument(stage, s, "expected dd/mm/yy HH:MM or ISO 8601"))
}

/// Parse a weekday recurrence: `false` for none, or comma-separated
/// indices where 0 is Monday.
///
/// Brackets and spaces are ignored, so `[5, 6]` and `5,6` are equivalent.
pub fn parse_recurrence(s: &str) -> Result<Option<Vec<Weekday>>> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("false") {
        return Ok(None);
    }

    let inner = trimmed.trim_start_matches('[').trim_end_matches(']');
    let mut days = Vec::new();
    for part in inner.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let idx: u8 = part
            .parse()
            .map_err(|_| Error::InvalidRecurrence(s.to_string()))?;
        let day = Weekday::try_from(idx).map_err(|_| Error::InvalidRecurrence(s.to_string()))?;
        if !days.contains(&day) {
            days.push(day);
        }
    }
    if days.is_empty() {
        return Err(Error::InvalidRecurrence(s.to_string()));
    }
    Ok(Some(days))
}

/// Parse a percentile list such as `10,90` or `[10.0, 90.0]`.
pub fn parse_percentiles(stage: &str, s: &str) -> Result<Vec<u32>> {
    let inner = s.trim().trim_start_matches('[').trim_end_matches(']');
    inner
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| {
            p.parse::<f64>()
                .ok()
                .filter(|v| v.fract() == 0.0 && (0.0..=100.0).contains(v))
                .map(|v| v as u32)
                .ok_or_else(|| Error::invalid_argument(stage, p, "expected a percentile 0-100"))
        })
        .collect()
}

/// Parse a single-letter frequency weighting.
pub fn parse_weighting(stage: &str, s: &str) -> Result<char> {
    let mut chars = s.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Ok(c),
        _ => Err(Error::invalid_argument(stage, s, "expected a weighting letter")),
    }
}
