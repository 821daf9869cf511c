// Re-export main structures
pub use crate::models::binning::{BinPass, BinnedExperiment, BinningContext};
pub use crate::models::feature::Feature;
pub use crate::models::peak_picking::{AdaptivePeakPicker, PeakPickerConfig};
pub use crate::models::point::{Peak, Point};
pub use crate::models::spectrum::Spectrum;
pub use crate::pipeline::{BinningConfig, BinningPipeline, PassOutput};

// Re-export traits
pub use crate::traits::aggregator::Aggregator;
pub use crate::traits::feature_finder::{FeatureFinder, FeatureFinderParams};

// Declare modules
pub mod compare;
pub mod errors;
pub mod io;
pub mod models;
pub mod pipeline;
pub mod traits;
pub mod utils;
