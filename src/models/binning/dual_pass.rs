use std::fmt::Display;

use super::bin::Bin;
use super::context::{BinPass, BinningContext};
use crate::errors::Result;
use crate::models::aggregators::{AggregatedPoints, MzGrouping, MzIntensityAggregator};
use crate::models::point::Point;
use crate::models::spectrum::Spectrum;
use crate::traits::aggregator::Aggregator;
use crate::utils::sorting::argsort_by;

/// The aggregated content of a single scan, split over the bins of
/// both passes. Bins that received no point hold an empty aggregation.
#[derive(Debug, Clone)]
pub struct ScanBins {
    pub rt: f64,
    pub ms_level: u8,
    pub primary: Vec<AggregatedPoints>,
    pub offset: Vec<AggregatedPoints>,
}

/// Assigns every point of the scan to one bin of each pass.
///
/// Points are visited in ascending (stable) mobility order. Each pass
/// receives its own copy of every point.
pub fn split_points(
    context: &BinningContext,
    points: &[Point],
    grouping: MzGrouping,
) -> (Vec<MzIntensityAggregator>, Vec<MzIntensityAggregator>) {
    let mut primary = vec![MzIntensityAggregator::new(grouping); context.num_bins_in(BinPass::Primary)];
    let mut offset = vec![MzIntensityAggregator::new(grouping); context.num_bins_in(BinPass::Offset)];

    for i in argsort_by(points, |x| x.mobility) {
        let point = points[i];
        primary[context.primary_bin_index(point.mobility)].add(point);
        offset[context.offset_bin_index(point.mobility)].add(point);
    }

    (primary, offset)
}

/// Bins and aggregates a single MS1 scan.
///
/// Fails with a data integrity error if the mobility channel does not
/// match the peaks.
pub fn bin_scan(
    context: &BinningContext,
    spectrum: &Spectrum,
    grouping: MzGrouping,
) -> Result<ScanBins> {
    let points = spectrum.points()?;
    let (primary, offset) = split_points(context, &points, grouping);
    Ok(ScanBins {
        rt: spectrum.rt,
        ms_level: spectrum.ms_level,
        primary: primary.into_iter().map(|x| x.finalize()).collect(),
        offset: offset.into_iter().map(|x| x.finalize()).collect(),
    })
}

/// Accumulates the bins of both passes over a whole run.
#[derive(Debug, Clone)]
pub struct BinnedExperiment {
    pub context: BinningContext,
    pub grouping: MzGrouping,
    pub primary: Vec<Bin>,
    pub offset: Vec<Bin>,
    pub num_scans: usize,
}

impl BinnedExperiment {
    pub fn new(context: BinningContext, grouping: MzGrouping) -> Self {
        let primary = (0..context.num_bins_in(BinPass::Primary))
            .map(|i| Bin::new(&context, BinPass::Primary, i))
            .collect();
        let offset = (0..context.num_bins_in(BinPass::Offset))
            .map(|i| Bin::new(&context, BinPass::Offset, i))
            .collect();
        Self {
            context,
            grouping,
            primary,
            offset,
            num_scans: 0,
        }
    }

    /// Bins a spectrum and adds it. Spectra that are not MS1 are skipped.
    pub fn add_spectrum(&mut self, spectrum: &Spectrum) -> Result<()> {
        if !spectrum.is_ms1() {
            return Ok(());
        }
        let scan_bins = bin_scan(&self.context, spectrum, self.grouping)?;
        self.add_scan_bins(scan_bins);
        Ok(())
    }

    /// Adds a scan that was already binned (possibly on another thread).
    pub fn add_scan_bins(&mut self, scan_bins: ScanBins) {
        let ScanBins {
            rt,
            ms_level,
            primary,
            offset,
        } = scan_bins;
        debug_assert_eq!(primary.len(), self.primary.len());
        debug_assert_eq!(offset.len(), self.offset.len());

        for (bin, agg) in self.primary.iter_mut().zip(primary) {
            bin.add_scan(rt, ms_level, agg);
        }
        for (bin, agg) in self.offset.iter_mut().zip(offset) {
            bin.add_scan(rt, ms_level, agg);
        }
        self.num_scans += 1;
    }

    pub fn bins(&self, pass: BinPass) -> &[Bin] {
        match pass {
            BinPass::Primary => &self.primary,
            BinPass::Offset => &self.offset,
        }
    }

    pub fn num_points(&self, pass: BinPass) -> usize {
        self.bins(pass).iter().map(|x| x.num_points()).sum()
    }
}

impl Display for BinnedExperiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "BinnedExperiment ({} scans)", self.num_scans)?;
        writeln!(f, "{}", self.context)?;
        for pass in [BinPass::Primary, BinPass::Offset] {
            writeln!(f, " pass {}:", pass.number())?;
            for bin in self.bins(pass) {
                writeln!(
                    f,
                    "  - bin {} [{:.4}, {:.4}): {} points in {} spectra",
                    bin.index,
                    bin.mobility_range.0,
                    bin.mobility_range.1,
                    bin.num_points(),
                    bin.num_spectra()
                )?;
            }
        }
        Ok(())
    }
}
