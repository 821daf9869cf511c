pub mod mz_intensity_agg;
pub mod streaming_aggregator;

pub use mz_intensity_agg::{AggregatedPoints, MzGrouping, MzIntensityAggregator};
pub use streaming_aggregator::RunningStatsCalculator;
