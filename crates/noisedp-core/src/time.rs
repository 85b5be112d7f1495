//! Sampling resolution and timestamp parsing.
//!
//! [`Resolution`] wraps a positive [`Duration`] and provides the two grid
//! operations the pipeline needs:
//!
//! - [`Resolution::round`] - snap a timestamp to the nearest epoch-aligned
//!   multiple (ties to even), used when regularising raw logger output
//! - [`Resolution::bin_start`] - floor a timestamp into a bin anchored at an
//!   origin (midnight of the first sample's day), used when resampling
//!
//! Resolutions parse from integer minutes (`"5"`) or a count plus unit
//! (`"30s"`, `"15T"`, `"15min"`, `"1H"`, `"1D"`).

use chrono::{Duration, NaiveDateTime, NaiveTime};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A positive sampling interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Resolution(Duration);

impl Resolution {
    /// Create a resolution from a duration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidResolution`] if the duration is not positive or
    /// does not fit in microseconds.
    pub fn new(duration: Duration) -> Result<Self> {
        match duration.num_microseconds() {
            Some(us) if us > 0 => Ok(Self(duration)),
            _ => Err(Error::InvalidResolution(format!("{duration}"))),
        }
    }

    /// Resolution of `n` seconds.
    ///
    /// # Panics
    ///
    /// Panics if `n` is not positive or out of range.
    pub fn seconds(n: i64) -> Self {
        assert!(n > 0, "resolution must be positive");
        Self(Duration::seconds(n))
    }

    /// Resolution of `n` minutes.
    ///
    /// # Panics
    ///
    /// Panics if `n` is not positive or out of range.
    pub fn minutes(n: i64) -> Self {
        assert!(n > 0, "resolution must be positive");
        Self(Duration::minutes(n))
    }

    /// Resolution of `n` hours.
    ///
    /// # Panics
    ///
    /// Panics if `n` is not positive or out of range.
    pub fn hours(n: i64) -> Self {
        assert!(n > 0, "resolution must be positive");
        Self(Duration::hours(n))
    }

    /// Resolution of `n` days.
    ///
    /// # Panics
    ///
    /// Panics if `n` is not positive or out of range.
    pub fn days(n: i64) -> Self {
        assert!(n > 0, "resolution must be positive");
        Self(Duration::days(n))
    }

    /// The underlying duration.
    pub fn as_duration(self) -> Duration {
        self.0
    }

    fn micros(self) -> i64 {
        // Constructors guarantee this fits.
        self.0.num_microseconds().unwrap_or(i64::MAX)
    }

    /// Round a timestamp to the nearest epoch-aligned multiple of this
    /// resolution. Exact halves round to the even multiple.
    pub fn round(self, t: NaiveDateTime) -> NaiveDateTime {
        let ts = t.and_utc().timestamp_micros();
        let step = self.micros();
        let q = ts.div_euclid(step);
        let rem = ts.rem_euclid(step);
        let q = match (2 * rem).cmp(&step) {
            Ordering::Less => q,
            Ordering::Greater => q + 1,
            Ordering::Equal if q % 2 == 0 => q,
            Ordering::Equal => q + 1,
        };
        t + Duration::microseconds(q * step - ts)
    }

    /// Start of the bin containing `t`, for bins of this width laid end to
    /// end from `origin`.
    pub fn bin_start(self, origin: NaiveDateTime, t: NaiveDateTime) -> NaiveDateTime {
        let offset = (t - origin).num_microseconds().unwrap_or(0);
        let k = offset.div_euclid(self.micros());
        origin + Duration::microseconds(k * self.micros())
    }

    /// How many samples at `finer` fit into one interval of `self`.
    pub fn ratio(self, finer: Resolution) -> f64 {
        self.micros() as f64 / finer.micros() as f64
    }

    /// Smallest positive gap between consecutive timestamps, if any.
    pub fn infer(index: &[NaiveDateTime]) -> Option<Self> {
        index
            .windows(2)
            .map(|w| w[1] - w[0])
            .filter(|d| *d > Duration::zero())
            .min()
            .and_then(|d| Self::new(d).ok())
    }
}

impl FromStr for Resolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || Error::InvalidResolution(s.to_string());

        // Bare integers are minutes
        if let Ok(n) = s.parse::<i64>() {
            let duration = Duration::try_minutes(n).ok_or_else(invalid)?;
            return Self::new(duration).map_err(|_| invalid());
        }

        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (count, unit) = s.split_at(split);
        let count: i64 = if count.is_empty() {
            1
        } else {
            count.parse().map_err(|_| invalid())?
        };

        let duration = match unit.trim() {
            "us" => Some(Duration::microseconds(count)),
            "s" | "S" | "sec" => Duration::try_seconds(count),
            "T" | "min" => Duration::try_minutes(count),
            "H" | "h" => Duration::try_hours(count),
            "D" | "d" => Duration::try_days(count),
            _ => return Err(invalid()),
        }
        .ok_or_else(invalid)?;
        Self::new(duration).map_err(|_| invalid())
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let us = self.micros();
        const SECOND: i64 = 1_000_000;
        const MINUTE: i64 = 60 * SECOND;
        const HOUR: i64 = 60 * MINUTE;
        const DAY: i64 = 24 * HOUR;

        if us % DAY == 0 {
            write!(f, "{}D", us / DAY)
        } else if us % HOUR == 0 {
            write!(f, "{}H", us / HOUR)
        } else if us % MINUTE == 0 {
            write!(f, "{}min", us / MINUTE)
        } else if us % SECOND == 0 {
            write!(f, "{}s", us / SECOND)
        } else {
            write!(f, "{us}us")
        }
    }
}

const TIMESTAMP_FORMATS: &[&str] = &[
    "%d/%m/%y %H:%M",
    "%d/%m/%y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Parse a timestamp in any of the accepted layouts.
///
/// Day-first layouts (`18/07/19 23:00`) are tried before ISO layouts
/// (`2019-07-18 23:00:00`).
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| Error::InvalidTimestamp(s.to_string()))
}

/// Format a time of day as `HH:MM`.
pub fn format_time_of_day(t: NaiveTime) -> String {
    t.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn parse_resolutions() {
        assert_eq!("5".parse::<Resolution>().unwrap(), Resolution::minutes(5));
        assert_eq!("15T".parse::<Resolution>().unwrap(), Resolution::minutes(15));
        assert_eq!("15min".parse::<Resolution>().unwrap(), Resolution::minutes(15));
        assert_eq!("30s".parse::<Resolution>().unwrap(), Resolution::seconds(30));
        assert_eq!("1H".parse::<Resolution>().unwrap(), Resolution::hours(1));
        assert_eq!("1D".parse::<Resolution>().unwrap(), Resolution::days(1));
        assert_eq!("D".parse::<Resolution>().unwrap(), Resolution::days(1));
    }

    #[test]
    fn reject_bad_resolutions() {
        assert!("0".parse::<Resolution>().is_err());
        assert!("-5".parse::<Resolution>().is_err());
        assert!("5 fortnights".parse::<Resolution>().is_err());
        assert!("".parse::<Resolution>().is_err());
    }

    #[test]
    fn oversized_resolutions_are_errors() {
        for s in ["99999999999999D", "99999999999999999min", "9999999999999999", "99999999D"] {
            assert!(
                matches!(s.parse::<Resolution>(), Err(Error::InvalidResolution(_))),
                "{s} should be rejected"
            );
        }
    }

    #[test]
    fn display_roundtrip() {
        for s in ["1D", "2H", "5min", "30s"] {
            let r: Resolution = s.parse().unwrap();
            assert_eq!(r.to_string(), s);
        }
    }

    #[test]
    fn round_to_nearest() {
        let r = Resolution::minutes(1);
        assert_eq!(r.round(at(10, 0, 29)), at(10, 0, 0));
        assert_eq!(r.round(at(10, 0, 31)), at(10, 1, 0));
        // Ties go to the even multiple
        assert_eq!(r.round(at(10, 0, 30)), at(10, 0, 0));
        assert_eq!(r.round(at(10, 1, 30)), at(10, 2, 0));
    }

    #[test]
    fn bin_start_from_origin() {
        let r = Resolution::minutes(15);
        let origin = at(0, 0, 0);
        assert_eq!(r.bin_start(origin, at(10, 14, 59)), at(10, 0, 0));
        assert_eq!(r.bin_start(origin, at(10, 15, 0)), at(10, 15, 0));
    }

    #[test]
    fn ratio_and_infer() {
        assert_eq!(Resolution::hours(1).ratio(Resolution::minutes(5)), 12.0);
        let index = vec![at(0, 0, 0), at(0, 5, 0), at(0, 15, 0)];
        assert_eq!(Resolution::infer(&index), Some(Resolution::minutes(5)));
        assert_eq!(Resolution::infer(&index[..1]), None);
    }

    #[test]
    fn parse_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2019, 7, 18)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap();
        assert_eq!(parse_timestamp("18/07/19 23:00").unwrap(), expected);
        assert_eq!(parse_timestamp("18/07/2019 23:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2019-07-18 23:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2019-07-18T23:00").unwrap(), expected);
        assert!(parse_timestamp("yesterday").is_err());
    }
}
