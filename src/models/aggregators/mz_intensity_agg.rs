use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::models::point::Point;
use crate::traits::aggregator::Aggregator;
use crate::utils::sorting::argsort_by;
use crate::utils::tolerance_ranges::ppm_tol_range;

/// How two neighbouring (m/z sorted) points are decided to belong to
/// the same m/z run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum MzGrouping {
    /// Exact floating point equality.
    #[default]
    Exact,
    /// Within a ppm tolerance of the first point of the run.
    Ppm(f64),
}

impl MzGrouping {
    pub fn from_tolerance(tol_ppm: Option<f64>) -> Self {
        match tol_ppm {
            Some(tol) => MzGrouping::Ppm(tol),
            None => MzGrouping::Exact,
        }
    }

    fn same_run(&self, run_mz: f64, mz: f64) -> bool {
        match self {
            MzGrouping::Exact => run_mz == mz,
            MzGrouping::Ppm(tol_ppm) => ppm_tol_range(run_mz, *tol_ppm).contains(&mz),
        }
    }
}

/// Sums the intensity of points that share an m/z within a single
/// bin of a single scan.
#[derive(Debug, Clone, Default)]
pub struct MzIntensityAggregator {
    grouping: MzGrouping,
    points: Vec<Point>,
}

/// Output of [`MzIntensityAggregator`].
///
/// `points` keeps one entry per original sample, sorted by m/z, with
/// the intensity replaced by the total of its run. `runs` holds the
/// index range of every run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedPoints {
    pub points: Vec<Point>,
    pub runs: Vec<Range<usize>>,
}

impl AggregatedPoints {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total intensity counting every run once.
    pub fn total_intensity(&self) -> f64 {
        self.runs
            .iter()
            .map(|run| self.points[run.start].intensity)
            .sum()
    }

    /// One representative point per run.
    pub fn run_heads(&self) -> impl Iterator<Item = &Point> + '_ {
        self.runs.iter().map(|run| &self.points[run.start])
    }
}

impl MzIntensityAggregator {
    pub fn new(grouping: MzGrouping) -> Self {
        Self {
            grouping,
            points: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Aggregator for MzIntensityAggregator {
    type Item = Point;
    type Output = AggregatedPoints;

    fn add(&mut self, point: impl Into<Point>) {
        self.points.push(point.into());
    }

    fn fold(&mut self, other: Self) {
        self.points.extend(other.points);
    }

    fn finalize(self) -> AggregatedPoints {
        let order = argsort_by(&self.points, |x| x.mz);
        let mut points: Vec<Point> = order.into_iter().map(|i| self.points[i]).collect();

        let mut runs = Vec::new();
        let mut run_start = 0;
        while run_start < points.len() {
            let run_mz = points[run_start].mz;
            let mut run_end = run_start + 1;
            while run_end < points.len() && self.grouping.same_run(run_mz, points[run_end].mz) {
                run_end += 1;
            }

            let run_intensity: f64 = points[run_start..run_end]
                .iter()
                .map(|x| x.intensity)
                .sum();
            points[run_start..run_end]
                .iter_mut()
                .for_each(|x| x.intensity = run_intensity);

            runs.push(run_start..run_end);
            run_start = run_end;
        }

        AggregatedPoints { points, runs }
    }
}
