//! CSV and JSON export of a processed survey.
//!
//! [`export`] writes into one output directory:
//!
//! | File | Content |
//! |------|---------|
//! | `full_data.csv` | processed series, flags as booleans |
//! | `summary.csv` | dataset facts, window names, metadata |
//! | `<table>.csv` | one file per summary table |
//! | `config.json` | the run configuration |

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use noisedp_analysis::{SummaryTable, SurveyTables};
use noisedp_config::SurveyConfig;
use noisedp_core::{DURATION, Metadata, TimeSeries, Value, format_time_of_day, window_name};
use tracing::{debug, info};

use crate::reader::{ADDRESS, TIME};
use crate::Result;

/// File name of the processed series.
pub const FULL_DATA_FILE: &str = "full_data.csv";

/// File name of the survey summary.
pub const SUMMARY_FILE: &str = "summary.csv";

const CONFIG_FILE: &str = "config.json";

/// Write every output file into `dir`, creating it if needed.
///
/// Returns the written paths in write order.
pub fn export(
    dir: impl AsRef<Path>,
    series: &TimeSeries,
    metadata: &Metadata,
    tables: &SurveyTables,
    config: &SurveyConfig,
) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let path = dir.join(FULL_DATA_FILE);
    write_full_data(series, File::create(&path)?)?;
    written.push(path);

    let path = dir.join(SUMMARY_FILE);
    let mut summary = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(&path)?;
    for (key, value) in summary_entries(series, metadata) {
        summary.write_record([key, value])?;
    }
    summary.flush()?;
    written.push(path);

    for (name, table) in tables.named() {
        let path = dir.join(format!("{name}.csv"));
        write_table(table, File::create(&path)?)?;
        debug!(table = name, rows = table.len(), "wrote table");
        written.push(path);
    }

    let path = dir.join(CONFIG_FILE);
    fs::write(&path, serde_json::to_string_pretty(config)?)?;
    written.push(path);

    info!(dir = %dir.display(), files = written.len(), "export complete");
    Ok(written)
}

/// Column order of `full_data.csv`: `Address`, `Duration`, broadband
/// `_Main` columns, band columns, flags, then everything else.
pub fn full_data_columns(series: &TimeSeries) -> Vec<&str> {
    let flags = series.flag_columns();
    let rank = |name: &str| -> u8 {
        match name {
            ADDRESS => 0,
            DURATION => 1,
            n if n.ends_with("_Main") => 2,
            n if n.ends_with("Hz") => 3,
            n if flags.iter().any(|f| *f == n) => 4,
            _ => 5,
        }
    };
    let mut names = series.column_names();
    names.sort_by_key(|n| rank(n));
    names
}

/// Write the processed series with flags as `true`/`false`.
pub fn write_full_data<W: io::Write>(series: &TimeSeries, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let columns = full_data_columns(series);
    let flags = series.flag_columns();

    let mut header = vec![TIME];
    header.extend(&columns);
    wtr.write_record(&header)?;

    for (row, t) in series.index().iter().enumerate() {
        let mut record = vec![Value::Time(*t).to_string()];
        for &name in &columns {
            let value = series.value(row, name).cloned().unwrap_or_default();
            record.push(if flags.contains(&name) {
                (!value.is_null()).to_string()
            } else {
                value.to_string()
            });
        }
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Key/value lines of `summary.csv`.
pub fn summary_entries(series: &TimeSeries, metadata: &Metadata) -> Vec<(String, String)> {
    let flags = series.flag_columns();
    let mut out = vec![
        ("Number of Time Samples".to_string(), series.len().to_string()),
        (
            "Number of Recorded Metrics".to_string(),
            (series.columns().len() - flags.len()).to_string(),
        ),
        (
            "Number of User-defined Time Periods".to_string(),
            flags.len().to_string(),
        ),
    ];
    for (i, &flag) in flags.iter().enumerate() {
        let name = window_name(flag).unwrap_or(flag);
        out.push((format!("Time Period {}", i + 1), name.to_string()));
    }
    out.push((String::new(), String::new()));
    out.push(("Monitor Metadata:".to_string(), String::new()));
    out.extend(metadata.entries());
    out
}

/// Write one summary table.
///
/// Columns are `Date`, `Day`, `Period`, `Start_Time`, `End_Time` followed
/// by the table's metric columns.
pub fn write_table<W: io::Write>(table: &SummaryTable, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec!["Date", "Day", "Period", "Start_Time", "End_Time"];
    header.extend(table.columns.iter().map(String::as_str));
    wtr.write_record(&header)?;

    for row in &table.rows {
        let mut record = vec![
            row.date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            row.label.clone(),
            row.window.clone(),
            row.start.map(format_time_of_day).unwrap_or_default(),
            row.end.map(format_time_of_day).unwrap_or_default(),
        ];
        record.extend(row.values.iter().map(Value::to_string));
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}
