use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::models::feature::Feature;
use crate::models::spectrum::Spectrum;

/// Parameters handed to every feature finder run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFinderParams {
    /// Minimum number of spectra supporting a feature.
    pub min_spectra: usize,
    /// Consecutive spectra a trace may skip before it ends.
    pub max_missing: usize,
    pub seed_min_score: f64,
    pub feature_min_score: f64,
}

impl Default for FeatureFinderParams {
    fn default() -> Self {
        Self {
            min_spectra: 5,
            max_missing: 2,
            seed_min_score: 0.5,
            feature_min_score: 0.5,
        }
    }
}

/// Detects features in a retention time ordered collection of spectra,
/// usually the synthesized spectra of one bin.
pub trait FeatureFinder: Send + Sync {
    fn find_features(&self, spectra: &[Spectrum], params: &FeatureFinderParams) -> Result<Vec<Feature>>;
}
