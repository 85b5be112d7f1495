//! Fold third-octave band columns into octave bands.
//!
//! Each octave spans three adjacent third-octave bands, with the octave
//! centre frequency equal to the middle band's. The octave level is the
//! energy sum of the three:
//!
//! ```text
//! L_oct = 10·log10(10^(L1/10) + 10^(L2/10) + 10^(L3/10))
//! ```
//!
//! For a metric `LAeq` with `LAeq_Main` and bands
//! `12.5, 16, 20, 25, 31.5, 40 Hz`, the output keeps `LAeq_16_Hz` and
//! `LAeq_31.5_Hz` (now holding octave levels) and drops the other four.

use std::collections::HashSet;

use noisedp_core::{
    Column, ColumnDescriptor, Error, OctaveProvenance, Result, Stage, StageOutput, StageReport,
    TimeSeries, Value, log_sum,
};
use tracing::debug;

/// Convert to octaves stage. Takes no arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OctaveReducer;

impl OctaveReducer {
    /// Stage name used in pipeline configuration.
    pub const NAME: &'static str = "Convert to octaves";

    /// Create the stage.
    pub fn new() -> Self {
        Self
    }

    /// Build from arguments; any arguments are ignored.
    pub fn from_args(_args: &[String]) -> Result<Self> {
        Ok(Self)
    }
}

/// Band columns of `stem` in column order.
fn bands_of<'a>(columns: &'a [ColumnDescriptor], stem: &str) -> Vec<&'a ColumnDescriptor> {
    columns
        .iter()
        .filter(|d| d.band_hz.is_some() && d.stem() == stem)
        .collect()
}

impl Stage for OctaveReducer {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn apply(&self, series: &TimeSeries) -> Result<StageOutput> {
        let columns: Vec<ColumnDescriptor> = series
            .column_names()
            .into_iter()
            .map(ColumnDescriptor::infer)
            .collect();
        let stems: Vec<&str> = columns
            .iter()
            .filter(|d| d.is_main() && d.weighting.is_some())
            .map(ColumnDescriptor::stem)
            .collect();

        let mut provenance = Vec::new();
        let mut dropped: HashSet<&str> = HashSet::new();
        let mut out = series.clone();

        for stem in stems {
            let bands = bands_of(&columns, stem);
            if bands.len() % 3 != 0 {
                return Err(Error::shape(
                    Self::NAME,
                    stem,
                    format!("has {} band columns, expected a multiple of 3", bands.len()),
                ));
            }

            let freqs: Vec<f64> = bands.iter().filter_map(|d| d.band_hz).collect();
            if freqs.windows(2).any(|w| w[1] <= w[0]) {
                return Err(Error::shape(
                    Self::NAME,
                    stem,
                    "band columns are not in ascending frequency order",
                ));
            }

            for group in bands.chunks_exact(3) {
                let [lo, mid, hi] = [&group[0].name, &group[1].name, &group[2].name];
                let cols: Vec<&Column> = group
                    .iter()
                    .filter_map(|d| series.column(&d.name))
                    .collect();

                let values = (0..series.len())
                    .map(|row| {
                        let levels: Option<Vec<f64>> =
                            cols.iter().map(|c| c.values[row].as_f64()).collect();
                        levels.and_then(|l| log_sum(&l)).map_or(Value::Null, Value::number)
                    })
                    .collect();
                out.push_column(Column::new(mid.as_str(), values))?;

                dropped.insert(lo.as_str());
                dropped.insert(hi.as_str());
                provenance.push(OctaveProvenance {
                    metric: stem.to_string(),
                    output_band: mid.clone(),
                    inputs: [lo.clone(), mid.clone(), hi.clone()],
                });
            }
            debug!(metric = stem, octaves = bands.len() / 3, "folded third-octave bands");
        }

        for name in dropped {
            out.remove_column(name);
        }

        Ok(StageOutput::new(out).with_report(StageReport::Octaves(provenance)))
    }
}
