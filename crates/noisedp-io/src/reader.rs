//! Generic CSV survey reader.
//!
//! The file must have a header row and one time index column. Numeric cells
//! become numbers, empty cells nulls, timestamps times and anything else
//! text. `Address` (row number) and `Duration` (gap to the next sample) are
//! added when the file has none.

use std::collections::BTreeMap;
use std::fs::File;
use std::io;
use std::path::Path;

use chrono::Duration;
use noisedp_core::{Column, DURATION, TimeSeries, Value, parse_timestamp};
use tracing::{debug, info};

use crate::{Error, Result};

/// Name of the time index column.
pub const TIME: &str = "Time";

pub use noisedp_core::ADDRESS;

/// Read a CSV survey file.
///
/// `columns` maps output names to input headers. [`TIME`] selects the
/// index column (default `"Time"`). When any other column is mapped, only
/// mapped columns are read; otherwise every column is kept under its own
/// header.
pub fn read_csv(path: impl AsRef<Path>, columns: &BTreeMap<String, String>) -> Result<TimeSeries> {
    let path = path.as_ref();
    let file = File::open(path)?;
    debug!(path = %path.display(), "reading CSV survey");
    read_csv_from(file, columns)
}

/// Read a CSV survey from any reader. See [`read_csv`].
pub fn read_csv_from<R: io::Read>(
    reader: R,
    columns: &BTreeMap<String, String>,
) -> Result<TimeSeries> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(String::from).collect();

    let time_header = columns.get(TIME).map_or(TIME, String::as_str);
    let time_idx = headers
        .iter()
        .position(|h| h == time_header)
        .ok_or_else(|| Error::MissingTimeColumn(time_header.to_string()))?;

    let renames: BTreeMap<&str, &str> = columns
        .iter()
        .filter(|(name, _)| name.as_str() != TIME)
        .map(|(name, header)| (header.as_str(), name.as_str()))
        .collect();
    let selected: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != time_idx)
        .filter_map(|(i, h)| match renames.get(h.as_str()) {
            Some(name) => Some((i, name.to_string())),
            None if renames.is_empty() => Some((i, h.clone())),
            None => None,
        })
        .collect();

    let mut index = Vec::new();
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); selected.len()];
    for (row, record) in rdr.records().enumerate() {
        let record = record?;
        let stamp = record.get(time_idx).unwrap_or_default();
        let t = parse_timestamp(stamp).map_err(|source| Error::Timestamp {
            row: row + 1,
            source,
        })?;
        index.push(t);
        for (col, &(i, _)) in cells.iter_mut().zip(&selected) {
            col.push(record.get(i).unwrap_or_default().to_string());
        }
    }

    let mut series = TimeSeries::new(index);
    for ((_, name), raw) in selected.into_iter().zip(cells) {
        let values = if name == DURATION {
            raw.iter().map(|s| parse_span(s)).collect()
        } else {
            raw.iter().map(|s| parse_cell(s)).collect()
        };
        series.push_column(Column::new(name, values))?;
    }

    if !series.has_column(ADDRESS) {
        let address = (0..series.len()).map(|i| Value::Number(i as f64)).collect();
        series.push_column(Column::new(ADDRESS, address))?;
    }
    if !series.has_column(DURATION) {
        let durations = next_sample_gaps(series.index());
        series.push_column(Column::new(DURATION, durations))?;
    }

    info!(
        rows = series.len(),
        columns = series.columns().len(),
        "read CSV survey"
    );
    Ok(series)
}

fn parse_cell(s: &str) -> Value {
    if s.is_empty() {
        return Value::Null;
    }
    if let Ok(v) = s.parse::<f64>() {
        return Value::number(v);
    }
    match parse_timestamp(s) {
        Ok(t) => Value::Time(t),
        Err(_) => Value::Text(s.to_string()),
    }
}

/// `HH:MM:SS` or a number of seconds.
fn parse_span(s: &str) -> Value {
    if s.is_empty() {
        return Value::Null;
    }
    if let Ok(secs) = s.parse::<f64>() {
        return Value::Span(Duration::milliseconds((secs * 1000.0).round() as i64));
    }
    let parts: Option<Vec<i64>> = s.split(':').map(|p| p.parse().ok()).collect();
    match parts.as_deref() {
        Some(&[h, m, sec]) => Value::Span(Duration::seconds(h * 3600 + m * 60 + sec)),
        _ => Value::Text(s.to_string()),
    }
}

/// Gap from each timestamp to the next; null for the last.
fn next_sample_gaps(index: &[chrono::NaiveDateTime]) -> Vec<Value> {
    let mut gaps: Vec<Value> = index
        .windows(2)
        .map(|w| Value::Span(w[1] - w[0]))
        .collect();
    if !index.is_empty() {
        gaps.push(Value::Null);
    }
    gaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn cells_parse_by_content() {
        assert_eq!(parse_cell(""), Value::Null);
        assert_eq!(parse_cell("54.2"), Value::Number(54.2));
        assert_eq!(parse_cell("NaN"), Value::Null);
        assert_eq!(parse_cell("Site A"), Value::Text("Site A".into()));
        let t = NaiveDate::from_ymd_opt(2019, 7, 18)
            .unwrap()
            .and_hms_opt(23, 0, 0)
            .unwrap();
        assert_eq!(parse_cell("18/07/19 23:00"), Value::Time(t));
    }

    #[test]
    fn spans_parse() {
        assert_eq!(parse_span("00:15:00"), Value::Span(Duration::minutes(15)));
        assert_eq!(parse_span("900"), Value::Span(Duration::minutes(15)));
        assert_eq!(parse_span(""), Value::Null);
    }

    #[test]
    fn gaps_end_with_null() {
        let t0 = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let gaps = next_sample_gaps(&[t0, t0 + Duration::minutes(5), t0 + Duration::minutes(15)]);
        assert_eq!(
            gaps,
            [
                Value::Span(Duration::minutes(5)),
                Value::Span(Duration::minutes(10)),
                Value::Null
            ]
        );
        assert!(next_sample_gaps(&[]).is_empty());
    }
}
