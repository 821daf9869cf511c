pub mod mass_trace;

pub use mass_trace::MassTraceFeatureFinder;
