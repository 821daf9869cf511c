pub mod config;
pub mod picker;
pub mod walk;

pub use config::PeakPickerConfig;
pub use picker::{AdaptivePeakPicker, VisitOrder};
pub use walk::{WalkDirection, WalkOutcome, WalkState};
