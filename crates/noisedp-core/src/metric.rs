//! Metric column classification.
//!
//! Survey columns encode their meaning in their name:
//!
//! ```text
//! L{weighting}{kind}[_band_Hz | _Main]
//!
//! LAeq_Main        broadband A-weighted Leq
//! LAmax_125_Hz     A-weighted Lmax, 125 Hz band
//! LA90_Main        A-weighted L90 (when 90 is a survey percentile)
//! LAE_Main         A-weighted sound exposure level
//! ```
//!
//! Names are parsed once into a [`ColumnDescriptor`]. Stages then dispatch on
//! [`MetricKind`] instead of re-matching strings.

use std::fmt;

/// Prefix of period flag columns.
pub const FLAG_PREFIX: &str = "Flag_";

/// Column holding the end timestamp of each sample.
pub const END_TIME: &str = "End_Time";

/// Column holding the sample duration.
pub const DURATION: &str = "Duration";

/// Column added by the resampler with the per-bin missing sample count.
pub const MISSING_SAMPLES: &str = "Missing Samples";

/// Column holding the sequential row number of each sample.
pub const ADDRESS: &str = "Address";

/// Whether a column records bookkeeping about a sample rather than a
/// measurement: flags, row numbers, end times, durations and missing counts.
pub fn is_bookkeeping(column: &str) -> bool {
    column.starts_with(FLAG_PREFIX)
        || matches!(column, ADDRESS | END_TIME | DURATION | MISSING_SAMPLES)
}

/// Aggregation-relevant kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    /// Equivalent continuous level, `L{w}eq`.
    Leq,
    /// Maximum level, `L{w}max`.
    Lmax,
    /// Minimum level, `L{w}min`.
    Lmin,
    /// Statistical level `L{w}##` for a survey percentile.
    Percentile(u32),
    /// Sound exposure level, `L{w}E`.
    Exposure,
    /// Sample end timestamp.
    EndTime,
    /// Sample duration.
    Duration,
    /// Period flag column.
    Flag,
    /// Anything else (counters, addresses, other weightings).
    Other,
}

impl MetricKind {
    /// Column stem for this kind under weighting `w`, e.g. `LAeq` or `LA90`.
    ///
    /// Non-level kinds have no stem.
    pub fn stem(self, weighting: char) -> Option<String> {
        match self {
            MetricKind::Leq => Some(format!("L{weighting}eq")),
            MetricKind::Lmax => Some(format!("L{weighting}max")),
            MetricKind::Lmin => Some(format!("L{weighting}min")),
            MetricKind::Percentile(p) => Some(format!("L{weighting}{p:02}")),
            MetricKind::Exposure => Some(format!("L{weighting}E")),
            _ => None,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Leq => write!(f, "Leq"),
            MetricKind::Lmax => write!(f, "Lmax"),
            MetricKind::Lmin => write!(f, "Lmin"),
            MetricKind::Percentile(p) => write!(f, "L{p:02}"),
            MetricKind::Exposure => write!(f, "LE"),
            MetricKind::EndTime => write!(f, "End_Time"),
            MetricKind::Duration => write!(f, "Duration"),
            MetricKind::Flag => write!(f, "Flag"),
            MetricKind::Other => write!(f, "other"),
        }
    }
}

/// Broadband column name, e.g. `LAeq_Main`.
pub fn main_column_name(kind: MetricKind, weighting: char) -> String {
    let stem = kind.stem(weighting).unwrap_or_else(|| kind.to_string());
    format!("{stem}_Main")
}

/// Flag column name for a window, e.g. `Flag_Daytime`.
pub fn flag_column_name(window: &str) -> String {
    format!("{FLAG_PREFIX}{window}")
}

/// Window name from a flag column name, if it is one.
pub fn window_name(column: &str) -> Option<&str> {
    column.strip_prefix(FLAG_PREFIX)
}

/// Parsed meaning of one column name.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    /// Column name as it appears in the series.
    pub name: String,
    /// Weighting letter for level columns.
    pub weighting: Option<char>,
    /// Aggregation kind.
    pub kind: MetricKind,
    /// Band centre frequency for spectral columns.
    pub band_hz: Option<f64>,
}

impl ColumnDescriptor {
    /// Classify a column name.
    ///
    /// Level columns are recognised only for `weighting`; `L##` columns only
    /// when `##` is in `percentiles`. Everything unrecognised is
    /// [`MetricKind::Other`].
    pub fn classify(name: &str, weighting: char, percentiles: &[u32]) -> Self {
        let kind = classify_kind(name, weighting, percentiles);
        let is_level = !matches!(
            kind,
            MetricKind::EndTime | MetricKind::Duration | MetricKind::Flag | MetricKind::Other
        );
        Self {
            name: name.to_string(),
            weighting: is_level.then_some(weighting),
            kind,
            band_hz: if is_level { band_frequency(name) } else { None },
        }
    }

    /// Classify a column name against its own weighting letter, accepting
    /// any `L{w}##` statistical level.
    ///
    /// For stages that have no survey metadata to classify against.
    pub fn infer(name: &str) -> Self {
        let head = name.split('_').next().unwrap_or(name);
        let weighting = head
            .strip_prefix('L')
            .and_then(|rest| rest.chars().next())
            .unwrap_or('Z');
        let percentile = head.get(2..).and_then(|d| d.parse::<u32>().ok());
        Self::classify(name, weighting, percentile.as_slice())
    }

    /// Whether this is the broadband `_Main` column.
    pub fn is_main(&self) -> bool {
        self.name.ends_with("_Main")
    }

    /// Level stem of the column (`LAeq_125_Hz` -> `LAeq`).
    pub fn stem(&self) -> &str {
        self.name.split('_').next().unwrap_or(&self.name)
    }
}

fn classify_kind(name: &str, weighting: char, percentiles: &[u32]) -> MetricKind {
    if name == END_TIME {
        return MetricKind::EndTime;
    }
    if name == DURATION {
        return MetricKind::Duration;
    }
    if name.starts_with(FLAG_PREFIX) {
        return MetricKind::Flag;
    }

    let head = name.split('_').next().unwrap_or(name);
    let Some(rest) = head.strip_prefix('L') else {
        return MetricKind::Other;
    };
    let Some(rest) = rest.strip_prefix(weighting) else {
        return MetricKind::Other;
    };

    match rest {
        "eq" => MetricKind::Leq,
        "max" => MetricKind::Lmax,
        "min" => MetricKind::Lmin,
        "E" => MetricKind::Exposure,
        digits if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) => {
            match digits.parse::<u32>() {
                Ok(p) if percentiles.contains(&p) => MetricKind::Percentile(p),
                _ => MetricKind::Other,
            }
        }
        _ => MetricKind::Other,
    }
}

/// Band frequency from names like `LAeq_31.5_Hz`, `LAeq_2_kHz` or
/// `LAeq_125Hz`, regardless of weighting.
pub fn band_frequency(name: &str) -> Option<f64> {
    let parts: Vec<&str> = name.split('_').collect();
    for (i, part) in parts.iter().enumerate().skip(1) {
        let (value, scale) = match *part {
            "Hz" if i >= 2 => (parts[i - 1], 1.0),
            "kHz" if i >= 2 => (parts[i - 1], 1000.0),
            p if p.ends_with("kHz") => (&p[..p.len() - 3], 1000.0),
            p if p.ends_with("Hz") => (&p[..p.len() - 2], 1.0),
            _ => continue,
        };
        if let Ok(f) = value.parse::<f64>() {
            return Some(f * scale);
        }
    }
    None
}

/// Classified view over all columns of a series.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSchema {
    weighting: char,
    columns: Vec<ColumnDescriptor>,
}

impl MetricSchema {
    /// Classify every column name, preserving order.
    pub fn classify<'a>(
        names: impl IntoIterator<Item = &'a str>,
        weighting: char,
        percentiles: &[u32],
    ) -> Self {
        Self {
            weighting,
            columns: names
                .into_iter()
                .map(|n| ColumnDescriptor::classify(n, weighting, percentiles))
                .collect(),
        }
    }

    /// Weighting the schema was classified against.
    pub fn weighting(&self) -> char {
        self.weighting
    }

    /// All descriptors in column order.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Descriptor for a column name.
    pub fn get(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Descriptors of one kind, in column order.
    pub fn of_kind(&self, kind: MetricKind) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(move |c| c.kind == kind)
    }

    /// The `_Main` column of a kind, if present.
    pub fn main_column(&self, kind: MetricKind) -> Option<&ColumnDescriptor> {
        self.of_kind(kind).find(|c| c.is_main())
    }

    /// Band columns of a kind, sorted by ascending frequency.
    pub fn band_set(&self, kind: MetricKind) -> Vec<&ColumnDescriptor> {
        let mut bands: Vec<_> = self.of_kind(kind).filter(|c| c.band_hz.is_some()).collect();
        bands.sort_by(|a, b| {
            a.band_hz
                .unwrap_or_default()
                .total_cmp(&b.band_hz.unwrap_or_default())
        });
        bands
    }

    /// Band columns sharing the stem of `main`, in column order.
    pub fn bands_of(&self, main: &ColumnDescriptor) -> Vec<&ColumnDescriptor> {
        let stem = main.stem();
        self.columns
            .iter()
            .filter(|c| c.band_hz.is_some() && c.stem() == stem)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(name: &str) -> MetricKind {
        ColumnDescriptor::classify(name, 'A', &[10, 90]).kind
    }

    #[test]
    fn classifies_level_kinds() {
        assert_eq!(kind("LAeq_Main"), MetricKind::Leq);
        assert_eq!(kind("LAmax_Main"), MetricKind::Lmax);
        assert_eq!(kind("LAmin_Main"), MetricKind::Lmin);
        assert_eq!(kind("LA90_Main"), MetricKind::Percentile(90));
        assert_eq!(kind("LAE_Main"), MetricKind::Exposure);
    }

    #[test]
    fn unknown_percentile_and_weighting_are_other() {
        assert_eq!(kind("LA50_Main"), MetricKind::Other);
        assert_eq!(kind("LCeq_Main"), MetricKind::Other);
        assert_eq!(kind("Overload"), MetricKind::Other);
        assert_eq!(kind("Address"), MetricKind::Other);
    }

    #[test]
    fn classifies_bookkeeping_columns() {
        assert_eq!(kind("End_Time"), MetricKind::EndTime);
        assert_eq!(kind("Duration"), MetricKind::Duration);
        assert_eq!(kind("Flag_Night"), MetricKind::Flag);

        for name in ["Flag_Night", "Address", "End_Time", "Duration", "Missing Samples"] {
            assert!(is_bookkeeping(name), "{name}");
        }
        assert!(!is_bookkeeping("LAeq_Main"));
        assert!(!is_bookkeeping("Overload"));
    }

    #[test]
    fn infers_weighting_from_name() {
        let d = ColumnDescriptor::infer("LZeq_125_Hz");
        assert_eq!((d.kind, d.weighting, d.band_hz), (MetricKind::Leq, Some('Z'), Some(125.0)));
        assert_eq!(ColumnDescriptor::infer("LC50_Main").kind, MetricKind::Percentile(50));
        assert_eq!(ColumnDescriptor::infer("Overload_Main").weighting, None);
    }

    #[test]
    fn parses_bands() {
        let d = ColumnDescriptor::classify("LAeq_31.5_Hz", 'A', &[]);
        assert_eq!(d.band_hz, Some(31.5));
        assert!(!d.is_main());
        assert_eq!(d.stem(), "LAeq");

        let d = ColumnDescriptor::classify("LAmax_2_kHz", 'A', &[]);
        assert_eq!(d.band_hz, Some(2000.0));

        let d = ColumnDescriptor::classify("LAeq_Main", 'A', &[]);
        assert_eq!(d.band_hz, None);
        assert!(d.is_main());
    }

    #[test]
    fn band_set_sorted_by_frequency() {
        let schema = MetricSchema::classify(
            ["LAeq_Main", "LAeq_1000_Hz", "LAeq_125_Hz", "LAmax_63_Hz"],
            'A',
            &[],
        );
        let bands: Vec<_> = schema
            .band_set(MetricKind::Leq)
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        assert_eq!(bands, ["LAeq_125_Hz", "LAeq_1000_Hz"]);
        assert_eq!(
            schema.main_column(MetricKind::Leq).map(|d| d.name.as_str()),
            Some("LAeq_Main")
        );
    }

    #[test]
    fn names() {
        assert_eq!(main_column_name(MetricKind::Percentile(5), 'A'), "LA05_Main");
        assert_eq!(flag_column_name("Night"), "Flag_Night");
        assert_eq!(window_name("Flag_Night"), Some("Night"));
        assert_eq!(window_name("LAeq_Main"), None);
    }
}
