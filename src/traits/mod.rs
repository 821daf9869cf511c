pub mod aggregator;
pub mod feature_finder;
