pub mod sample;
pub mod summary;

pub use sample::{Sample, Telemetry};
pub use summary::{DailySummary, DayDetail, LiveStatus};
