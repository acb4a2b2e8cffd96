use serde::{Deserialize, Serialize};

/// Instantaneous readings reported by the outlet, already scaled to
/// physical units by the producer (current stays in milliamps).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    pub current_ma: f64,
    pub power_w: f64,
    pub voltage_v: f64,
    /// Cumulative energy counter maintained by the device itself, distinct
    /// from anything we integrate.
    pub total_kwh: f64,
    pub is_on: bool,
}

/// One persisted telemetry observation. Immutable once appended to the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: String,
    pub data: Telemetry,
}

impl Sample {
    pub fn new(timestamp: String, data: Telemetry) -> Self {
        Self { timestamp, data }
    }
}
