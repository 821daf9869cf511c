pub mod aggregators;
pub mod binning;
pub mod feature;
pub mod feature_finding;
pub mod peak_picking;
pub mod point;
pub mod spectrum;
