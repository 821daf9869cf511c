use serde::{Deserialize, Serialize};

use super::context::{BinPass, BinningContext};
use crate::models::aggregators::AggregatedPoints;
use crate::models::point::Point;
use crate::models::spectrum::Spectrum;

/// Builds the spectrum of one bin for one scan.
///
/// Every m/z run becomes a single row with the run intensity. The
/// mobility kept for the row is the one of the first sample of the
/// run, which is the lowest one since points are binned in mobility
/// order and the m/z sort is stable.
pub fn synthesize_spectrum(rt: f64, ms_level: u8, aggregated: &AggregatedPoints) -> Spectrum {
    let mut out = Spectrum::with_capacity(rt, ms_level, aggregated.runs.len());
    for head in aggregated.run_heads() {
        out.push(head.mz, head.intensity, head.mobility);
    }
    out
}

/// All the data one pass assigned to a single mobility interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub pass: BinPass,
    pub index: usize,
    pub mobility_range: (f64, f64),
    pub points: Vec<Point>,
    pub spectra: Vec<Spectrum>,
}

impl Bin {
    pub fn new(context: &BinningContext, pass: BinPass, index: usize) -> Self {
        Self {
            pass,
            index,
            mobility_range: context.bin_range(pass, index),
            points: Vec::new(),
            spectra: Vec::new(),
        }
    }

    /// Appends the aggregated points of one scan and the spectrum
    /// synthesized from them. Scans must be added in acquisition order.
    pub fn add_scan(&mut self, rt: f64, ms_level: u8, aggregated: AggregatedPoints) {
        if aggregated.is_empty() {
            return;
        }
        let spectrum = synthesize_spectrum(rt, ms_level, &aggregated);
        self.points.extend(aggregated.points);
        self.spectra.push(spectrum);
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn num_spectra(&self) -> usize {
        self.spectra.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spectra.is_empty()
    }
}
