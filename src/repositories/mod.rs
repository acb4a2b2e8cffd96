pub mod samples;
pub mod settings;

pub use samples::SampleStore;
pub use settings::RateSettings;
