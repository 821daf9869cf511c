pub mod compress_explode;
pub mod display;
pub mod sorting;
pub mod tolerance_ranges;
