use nohash_hasher::IntSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::errors::Result;
use crate::models::aggregators::RunningStatsCalculator;
use crate::models::feature::{ConvexHull, Feature, HullPoint};
use crate::models::spectrum::Spectrum;
use crate::traits::feature_finder::{FeatureFinder, FeatureFinderParams};
use crate::utils::sorting::argsort_by;
use crate::utils::tolerance_ranges::{ppm_tol_range, sorted_slice_range};

fn peak_key(spectrum_idx: usize, peak_idx: usize) -> u64 {
    ((spectrum_idx as u64) << 32) | (peak_idx as u64)
}

/// A spectrum index paired with a peak index inside it.
type TracePeak = (usize, usize);

/// Follows single m/z traces through consecutive spectra.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MassTraceFeatureFinder {
    pub mz_tolerance_ppm: f64,
}

impl Default for MassTraceFeatureFinder {
    fn default() -> Self {
        Self {
            mz_tolerance_ppm: 20.0,
        }
    }
}

struct TraceSearch<'a> {
    spectra: Vec<Spectrum>,
    used: IntSet<u64>,
    params: &'a FeatureFinderParams,
    tol_ppm: f64,
}

impl<'a> TraceSearch<'a> {
    /// Most intense unused peak of a spectrum within tolerance of `mz`.
    fn best_match(&self, spectrum_idx: usize, mz: f64) -> Option<usize> {
        let spec = &self.spectra[spectrum_idx];
        let range = sorted_slice_range(&spec.mz, &ppm_tol_range(mz, self.tol_ppm));
        range
            .filter(|i| !self.used.contains(&peak_key(spectrum_idx, *i)))
            .fold(None, |best: Option<usize>, i| match best {
                Some(b) if spec.intensity[b] >= spec.intensity[i] => Some(b),
                _ => Some(i),
            })
    }

    fn seed_score(&self, seed: TracePeak) -> f64 {
        let (spectrum_idx, peak_idx) = seed;
        let mz = self.spectra[spectrum_idx].mz[peak_idx];
        let neighbors: Vec<usize> = [spectrum_idx.checked_sub(1), Some(spectrum_idx + 1)]
            .into_iter()
            .flatten()
            .filter(|x| *x < self.spectra.len())
            .collect();
        if neighbors.is_empty() {
            return 0.0;
        }
        let hits = neighbors
            .iter()
            .filter(|x| self.best_match(**x, mz).is_some())
            .count();
        hits as f64 / neighbors.len() as f64
    }

    fn extend(
        &self,
        trace: &mut Vec<TracePeak>,
        stats: &mut RunningStatsCalculator,
        indices: impl Iterator<Item = usize>,
    ) {
        let mut misses = 0;
        for spectrum_idx in indices {
            let center = stats.mean().unwrap_or(f64::NAN);
            match self.best_match(spectrum_idx, center) {
                Some(peak_idx) => {
                    let spec = &self.spectra[spectrum_idx];
                    stats.add(spec.mz[peak_idx], spec.intensity[peak_idx]);
                    trace.push((spectrum_idx, peak_idx));
                    misses = 0;
                }
                None => {
                    misses += 1;
                    if misses > self.params.max_missing {
                        break;
                    }
                }
            }
        }
    }

    fn trace_from(&self, seed: TracePeak) -> Vec<TracePeak> {
        let (spectrum_idx, peak_idx) = seed;
        let spec = &self.spectra[spectrum_idx];
        let mut stats = RunningStatsCalculator::new(spec.intensity[peak_idx], spec.mz[peak_idx]);
        let mut trace = vec![seed];

        self.extend(&mut trace, &mut stats, (spectrum_idx + 1)..self.spectra.len());
        self.extend(&mut trace, &mut stats, (0..spectrum_idx).rev());
        trace.sort_unstable();
        trace!(
            "Trace of {} peaks, m/z {:.5} +- {:.5}, total intensity {}",
            trace.len(),
            stats.mean().unwrap_or(f64::NAN),
            stats.standard_deviation().unwrap_or(f64::NAN),
            stats.weight()
        );
        trace
    }

    fn build_feature(&self, trace: &[TracePeak], score: f64) -> Feature {
        let mut intensity = 0.0;
        let mut mz_sum = 0.0;
        let mut mobility_sum = 0.0;
        let mut apex = (f64::NEG_INFINITY, 0.0);
        let mut hull_points = Vec::with_capacity(trace.len());

        for &(s, p) in trace {
            let spec = &self.spectra[s];
            let (mz, int, mob) = (spec.mz[p], spec.intensity[p], spec.mobility[p]);
            intensity += int;
            mz_sum += mz * int;
            mobility_sum += mob * int;
            if int > apex.0 {
                apex = (int, spec.rt);
            }
            hull_points.push(HullPoint::new(spec.rt, mz));
        }

        let (mz, mobility) = if intensity > 0.0 {
            (mz_sum / intensity, mobility_sum / intensity)
        } else {
            let n = trace.len() as f64;
            let mzs: f64 = trace.iter().map(|&(s, p)| self.spectra[s].mz[p]).sum();
            let mobs: f64 = trace.iter().map(|&(s, p)| self.spectra[s].mobility[p]).sum();
            (mzs / n, mobs / n)
        };

        let convex_hull = ConvexHull::from_points(&hull_points);
        let (rt_range, mz_range) = convex_hull
            .bounding_box()
            .unwrap_or(((apex.1, apex.1), (mz, mz)));

        Feature {
            rt: apex.1,
            mz,
            mobility,
            intensity,
            score,
            rt_range,
            mz_range,
            convex_hull,
            num_supporting_peaks: trace.len(),
        }
    }
}

impl FeatureFinder for MassTraceFeatureFinder {
    fn find_features(&self, spectra: &[Spectrum], params: &FeatureFinderParams) -> Result<Vec<Feature>> {
        let mut sorted = Vec::with_capacity(spectra.len());
        for spec in spectra {
            spec.validate()?;
            let mut spec = spec.clone();
            spec.sort_by_mz();
            sorted.push(spec);
        }

        let mut seeds: Vec<TracePeak> = Vec::new();
        let mut seed_intensities: Vec<f64> = Vec::new();
        for (s, spec) in sorted.iter().enumerate() {
            for (p, int) in spec.intensity.iter().enumerate() {
                seeds.push((s, p));
                seed_intensities.push(-int);
            }
        }
        let seed_order = argsort_by(&seed_intensities, |x| *x);

        let mut search = TraceSearch {
            spectra: sorted,
            used: IntSet::default(),
            params,
            tol_ppm: self.mz_tolerance_ppm,
        };

        let mut features = Vec::new();
        let mut num_rejected = 0usize;
        for seed in seed_order.into_iter().map(|i| seeds[i]) {
            if search.used.contains(&peak_key(seed.0, seed.1)) {
                continue;
            }
            if search.seed_score(seed) < params.seed_min_score {
                continue;
            }

            let trace = search.trace_from(seed);
            if trace.len() < params.min_spectra {
                num_rejected += 1;
                continue;
            }
            let spanned = trace[trace.len() - 1].0 - trace[0].0 + 1;
            let score = trace.len() as f64 / spanned as f64;
            if score < params.feature_min_score {
                num_rejected += 1;
                continue;
            }

            trace!("Accepted trace of {} peaks, score {}", trace.len(), score);
            for &(s, p) in trace.iter() {
                search.used.insert(peak_key(s, p));
            }
            features.push(search.build_feature(&trace, score));
        }

        debug!(
            "Found {} features in {} spectra ({} traces rejected)",
            features.len(),
            spectra.len(),
            num_rejected
        );
        Ok(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spectrum(rt: f64, peaks: &[(f64, f64)]) -> Spectrum {
        let mut out = Spectrum::new(rt, 1);
        for (mz, int) in peaks {
            out.push(*mz, *int, 0.8 + rt / 100.0);
        }
        out
    }

    fn elution(n: usize, mz: f64) -> Vec<Spectrum> {
        (0..n)
            .map(|i| {
                let x = i as f64 - (n as f64 / 2.0);
                let int = 1000.0 * (-x * x / 8.0).exp();
                // m/z jitters a bit under 2 ppm.
                let jitter = mz * 1e-6 * if i % 2 == 0 { 1.0 } else { -1.0 };
                spectrum(i as f64, &[(mz + jitter, int), (mz + 50.0, 1.0)])
            })
            .collect()
    }

    #[test]
    fn test_single_trace() {
        let spectra = elution(10, 500.0);
        let finder = MassTraceFeatureFinder::default();
        let features = finder
            .find_features(&spectra, &FeatureFinderParams::default())
            .unwrap();

        // The 550.0 line is flat but also a valid trace.
        assert_eq!(features.len(), 2);
        let main = &features[0];
        assert!((main.mz - 500.0).abs() < 0.001);
        assert_eq!(main.num_supporting_peaks, 10);
        assert_eq!(main.score, 1.0);
        assert_eq!(main.rt, 5.0);
        assert_eq!(main.rt_range, (0.0, 9.0));
        assert!(main.mz_range.0 < main.mz_range.1);
        assert!(main.convex_hull.area() > 0.0);
        assert!(main.mobility > 0.8 && main.mobility < 0.9);
    }

    #[test]
    fn test_short_trace_is_rejected() {
        let spectra = elution(4, 500.0);
        let features = MassTraceFeatureFinder::default()
            .find_features(&spectra, &FeatureFinderParams::default())
            .unwrap();
        assert!(features.is_empty());
    }

    #[test]
    fn test_gaps() {
        let mut spectra = elution(10, 500.0);
        // One missing spectrum is bridged.
        spectra[3] = spectrum(3.0, &[(550.0, 1.0)]);
        let features = MassTraceFeatureFinder::default()
            .find_features(&spectra, &FeatureFinderParams::default())
            .unwrap();
        let main = features
            .iter()
            .find(|x| (x.mz - 500.0).abs() < 0.01)
            .unwrap();
        assert_eq!(main.num_supporting_peaks, 9);
        assert!((main.score - 0.9).abs() < 1e-12);

        // Three in a row split it in two traces too short to keep.
        let mut spectra = elution(10, 500.0);
        for i in 4..7 {
            spectra[i] = spectrum(i as f64, &[(550.0, 1.0)]);
        }
        let features = MassTraceFeatureFinder::default()
            .find_features(&spectra, &FeatureFinderParams::default())
            .unwrap();
        assert!(features.iter().all(|x| (x.mz - 500.0).abs() > 0.01));
    }

    #[test]
    fn test_isolated_seed_is_skipped() {
        let spectra = vec![spectrum(0.0, &[(300.0, 10.0)])];
        let features = MassTraceFeatureFinder::default()
            .find_features(
                &spectra,
                &FeatureFinderParams {
                    min_spectra: 1,
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(features.is_empty());
    }
}
