//! Survey metadata.

use crate::error::{Error, Result};

/// Facts about a survey that stages need but that are not per-sample data.
///
/// The frequency weighting letter selects column names (`LAeq_Main` for
/// `'A'`); the percentile list decides which `L##` columns are treated as
/// percentile metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    frequency_weighting: char,
    percentiles: Vec<u32>,
    extra: Vec<(String, String)>,
}

impl Metadata {
    /// Create metadata for the given weighting and percentile list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWeighting`] unless the weighting is a single
    /// ASCII letter.
    pub fn new(frequency_weighting: char, percentiles: Vec<u32>) -> Result<Self> {
        if !frequency_weighting.is_ascii_alphabetic() {
            return Err(Error::InvalidWeighting(frequency_weighting.to_string()));
        }
        Ok(Self {
            frequency_weighting,
            percentiles,
            extra: Vec::new(),
        })
    }

    /// Parse the weighting from a string such as `"A"`.
    pub fn from_weighting_str(weighting: &str, percentiles: Vec<u32>) -> Result<Self> {
        let mut chars = weighting.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::new(c, percentiles),
            _ => Err(Error::InvalidWeighting(weighting.to_string())),
        }
    }

    /// Attach a free-form key/value pair (logger serial, site, etc).
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    /// Frequency weighting letter.
    pub fn frequency_weighting(&self) -> char {
        self.frequency_weighting
    }

    /// Percentile numbers in survey order.
    pub fn percentiles(&self) -> &[u32] {
        &self.percentiles
    }

    /// All metadata as ordered key/value pairs: `Frequency Weighting`,
    /// `Percentile 1..N`, then any extra entries.
    pub fn entries(&self) -> Vec<(String, String)> {
        let mut out = vec![(
            "Frequency Weighting".to_string(),
            self.frequency_weighting.to_string(),
        )];
        for (i, p) in self.percentiles.iter().enumerate() {
            out.push((format!("Percentile {}", i + 1), p.to_string()));
        }
        out.extend(self.extra.iter().cloned());
        out
    }
}
