pub mod bin;
pub mod context;
pub mod dual_pass;

pub use bin::{synthesize_spectrum, Bin};
pub use context::{mobility_extent, BinPass, BinningContext};
pub use dual_pass::{bin_scan, BinnedExperiment, ScanBins};
