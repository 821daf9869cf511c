use serde::{Deserialize, Serialize};

use super::point::Point;
use crate::errors::{DataIntegrityError, Result};
use crate::sort_by_indices_multi;
use crate::utils::sorting::argsort_by;

/// A single scan stored as parallel arrays.
///
/// `mz`, `intensity` and `mobility` correspond index for index, the
/// mobility array being the ion mobility side channel of each peak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    pub rt: f64,
    pub ms_level: u8,
    pub mz: Vec<f64>,
    pub intensity: Vec<f64>,
    pub mobility: Vec<f64>,
}

impl Spectrum {
    pub fn new(rt: f64, ms_level: u8) -> Self {
        Self {
            rt,
            ms_level,
            mz: Vec::new(),
            intensity: Vec::new(),
            mobility: Vec::new(),
        }
    }

    pub fn with_capacity(rt: f64, ms_level: u8, capacity: usize) -> Self {
        Self {
            rt,
            ms_level,
            mz: Vec::with_capacity(capacity),
            intensity: Vec::with_capacity(capacity),
            mobility: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, mz: f64, intensity: f64, mobility: f64) {
        self.mz.push(mz);
        self.intensity.push(intensity);
        self.mobility.push(mobility);
    }

    pub fn len(&self) -> usize {
        self.mz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mz.is_empty()
    }

    pub fn is_ms1(&self) -> bool {
        self.ms_level == 1
    }

    pub fn total_intensity(&self) -> f64 {
        self.intensity.iter().sum()
    }

    /// Checks that the three parallel arrays have the same length and
    /// hold only finite values.
    pub fn validate(&self) -> Result<()> {
        if self.mz.len() != self.intensity.len() {
            return Err(DataIntegrityError::PeakArrayLengthMismatch {
                rt: self.rt,
                mzs: self.mz.len(),
                intensities: self.intensity.len(),
            }
            .into());
        }
        if self.mz.len() != self.mobility.len() {
            return Err(DataIntegrityError::MobilityLengthMismatch {
                rt: self.rt,
                peaks: self.mz.len(),
                mobilities: self.mobility.len(),
            }
            .into());
        }
        let bad = (0..self.mz.len()).find(|&i| {
            !(self.mz[i].is_finite() && self.intensity[i].is_finite() && self.mobility[i].is_finite())
        });
        if let Some(index) = bad {
            return Err(DataIntegrityError::NonFiniteValue { rt: self.rt, index }.into());
        }
        Ok(())
    }

    /// Flattens the spectrum into points, checking the side channel first.
    pub fn points(&self) -> Result<Vec<Point>> {
        self.validate()?;
        let out = self
            .mz
            .iter()
            .zip(self.intensity.iter())
            .zip(self.mobility.iter())
            .map(|((mz, intensity), mobility)| Point::new(self.rt, *mz, *intensity, *mobility))
            .collect();
        Ok(out)
    }

    pub fn is_sorted_by_mz(&self) -> bool {
        self.mz.windows(2).all(|x| x[0] <= x[1])
    }

    /// Stable sort of all three arrays by m/z.
    pub fn sort_by_mz(&mut self) {
        if self.is_sorted_by_mz() {
            return;
        }
        let indices = argsort_by(&self.mz, |x| *x);
        sort_by_indices_multi!(
            &indices,
            &mut self.mz,
            &mut self.intensity,
            &mut self.mobility
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ImBinningError;

    #[test]
    fn test_points_flatten_side_channel() {
        let spec = Spectrum {
            rt: 12.5,
            ms_level: 1,
            mz: vec![100.0, 200.0],
            intensity: vec![5.0, 7.0],
            mobility: vec![0.9, 1.1],
        };
        let points = spec.points().unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[1], Point::new(12.5, 200.0, 7.0, 1.1));
    }

    #[test]
    fn test_mismatched_side_channel_is_rejected() {
        let spec = Spectrum {
            rt: 1.0,
            ms_level: 1,
            mz: vec![100.0, 200.0],
            intensity: vec![5.0, 7.0],
            mobility: vec![0.9],
        };
        match spec.points() {
            Err(ImBinningError::DataIntegrityError(
                DataIntegrityError::MobilityLengthMismatch {
                    peaks, mobilities, ..
                },
            )) => {
                assert_eq!(peaks, 2);
                assert_eq!(mobilities, 1);
            }
            other => panic!("Expected a mobility mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        let mut spec = Spectrum::new(3.0, 1);
        spec.push(100.0, 5.0, 0.9);
        spec.push(200.0, 7.0, f64::INFINITY);
        match spec.points() {
            Err(ImBinningError::DataIntegrityError(DataIntegrityError::NonFiniteValue {
                index, ..
            })) => assert_eq!(index, 1),
            other => panic!("Expected a non finite value error, got {:?}", other),
        }

        spec.mobility[1] = 1.1;
        spec.mz[0] = f64::NAN;
        assert!(spec.validate().is_err());
        spec.mz[0] = 100.0;
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_sort_by_mz_keeps_arrays_aligned() {
        let mut spec = Spectrum {
            rt: 1.0,
            ms_level: 1,
            mz: vec![300.0, 100.0, 200.0, 100.0],
            intensity: vec![3.0, 1.0, 2.0, 4.0],
            mobility: vec![0.3, 0.1, 0.2, 0.4],
        };
        spec.sort_by_mz();
        assert_eq!(spec.mz, vec![100.0, 100.0, 200.0, 300.0]);
        // Ties keep their original order.
        assert_eq!(spec.intensity, vec![1.0, 4.0, 2.0, 3.0]);
        assert_eq!(spec.mobility, vec![0.1, 0.4, 0.2, 0.3]);
    }
}
