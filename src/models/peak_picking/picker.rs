use rayon::prelude::*;
use std::ops::RangeInclusive;
use tracing::{debug, instrument};

use super::config::PeakPickerConfig;
use super::walk::{walk, WalkDirection};
use crate::errors::Result;
use crate::models::point::Peak;
use crate::models::spectrum::Spectrum;
use crate::utils::sorting::argsort_by;

/// Order in which samples are tried as seeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitOrder {
    /// Ascending position.
    Sequential,
    /// Descending intensity, ties broken by the higher position index.
    DescendingIntensity,
}

impl VisitOrder {
    /// Seed indices into position sorted samples.
    pub fn indices(&self, intensities: &[f64]) -> Vec<usize> {
        match self {
            VisitOrder::Sequential => (0..intensities.len()).collect(),
            VisitOrder::DescendingIntensity => {
                let mut out: Vec<usize> = (0..intensities.len()).collect();
                out.sort_by(|a, b| intensities[*b].total_cmp(&intensities[*a]).then(b.cmp(a)));
                out
            }
        }
    }
}

/// Intensity weighted mean of `values` over `span`.
///
/// Falls back to the plain mean when the span carries no intensity.
fn weighted_mean(values: &[f64], intensities: &[f64], span: &RangeInclusive<usize>) -> f64 {
    let total: f64 = intensities[span.clone()].iter().sum();
    if total > 0.0 {
        span.clone()
            .map(|i| values[i] * (intensities[i] / total))
            .sum()
    } else {
        let n = span.clone().count() as f64;
        values[span.clone()].iter().sum::<f64>() / n
    }
}

/// Collapses clusters of satellite samples around local maxima into
/// single composite peaks.
#[derive(Debug, Clone, Copy)]
pub struct AdaptivePeakPicker {
    config: PeakPickerConfig,
}

impl AdaptivePeakPicker {
    pub fn new(config: PeakPickerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PeakPickerConfig {
        &self.config
    }

    /// Finds the index spans of every composite peak.
    ///
    /// `positions` must be sorted ascending. Spans are disjoint and
    /// returned in ascending position order.
    pub fn pick_spans(&self, positions: &[f64], intensities: &[f64]) -> Vec<RangeInclusive<usize>> {
        debug_assert_eq!(positions.len(), intensities.len());
        debug_assert!(positions.windows(2).all(|x| x[0] <= x[1]));

        let mut picked = vec![false; intensities.len()];
        let mut spans = Vec::new();

        for seed in self.config.visit_order().indices(intensities) {
            if picked[seed] {
                continue;
            }

            let left = walk(
                positions,
                intensities,
                &picked,
                seed,
                WalkDirection::Left,
                &self.config,
            );
            if !left.is_satisfied() {
                continue;
            }
            let right = walk(
                positions,
                intensities,
                &picked,
                seed,
                WalkDirection::Right,
                &self.config,
            );
            if !right.is_satisfied() {
                continue;
            }

            picked[left.bound..=right.bound]
                .iter_mut()
                .for_each(|x| *x = true);
            spans.push(left.bound..=right.bound);
        }

        spans.sort_by_key(|x| *x.start());
        spans
    }

    /// Picks a list of peaks, sorting them by m/z first.
    pub fn pick_peaks(&self, peaks: &[Peak]) -> Vec<Peak> {
        let order = argsort_by(peaks, |x| x.mz);
        let mzs: Vec<f64> = order.iter().map(|&i| peaks[i].mz).collect();
        let intensities: Vec<f64> = order.iter().map(|&i| peaks[i].intensity).collect();

        self.pick_spans(&mzs, &intensities)
            .into_iter()
            .map(|span| {
                let intensity = intensities[span.clone()].iter().sum();
                Peak::new(weighted_mean(&mzs, &intensities, &span), intensity)
            })
            .collect()
    }

    /// Picks a single spectrum regardless of its MS level.
    ///
    /// Composite rows carry an intensity weighted mobility. An empty
    /// spectrum gives an empty spectrum back.
    pub fn pick_spectrum(&self, spectrum: &Spectrum) -> Result<Spectrum> {
        spectrum.validate()?;
        let mut sorted = spectrum.clone();
        sorted.sort_by_mz();

        let spans = self.pick_spans(&sorted.mz, &sorted.intensity);
        let mut out = Spectrum::with_capacity(sorted.rt, sorted.ms_level, spans.len());
        for span in spans {
            let intensity = sorted.intensity[span.clone()].iter().sum();
            out.push(
                weighted_mean(&sorted.mz, &sorted.intensity, &span),
                intensity,
                weighted_mean(&sorted.mobility, &sorted.intensity, &span),
            );
        }
        Ok(out)
    }

    /// Picks every MS1 spectrum, in parallel. Other MS levels are dropped.
    #[instrument(skip_all, level = "debug")]
    pub fn pick_spectra(&self, spectra: &[Spectrum]) -> Result<Vec<Spectrum>> {
        let out = spectra
            .par_iter()
            .filter(|x| x.is_ms1())
            .map(|x| self.pick_spectrum(x))
            .collect::<Result<Vec<_>>>()?;

        let num_in: usize = spectra.iter().map(|x| x.len()).sum();
        let num_out: usize = out.iter().map(|x| x.len()).sum();
        debug!(
            "Peak picked {} spectra, {} -> {} peaks",
            out.len(),
            num_in,
            num_out
        );
        Ok(out)
    }
}
