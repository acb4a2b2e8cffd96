use serde::{Deserialize, Serialize};

/// Per-day energy/cost/power roll-up. Never persisted; recomputed from the
/// sample log on every query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: String,
    pub total_kwh: f64,
    pub cost: f64,
    pub avg_w: f64,
    pub max_w: f64,
    pub min_w: f64,
}

/// Raw series plus totals for a single calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayDetail {
    pub timestamps: Vec<String>,
    pub power: Vec<f64>,
    pub voltage: Vec<f64>,
    /// Amps, converted from the stored milliamp readings.
    pub current: Vec<f64>,
    pub total_kwh: f64,
    pub cost: f64,
}

/// Latest sample enriched with instantaneous cost figures at the current
/// rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveStatus {
    pub is_on: bool,
    pub power_w: f64,
    pub voltage_v: f64,
    pub current_ma: f64,
    pub total_kwh: f64,
    pub cost_per_kwh: f64,
    pub cost_per_hour: f64,
    pub cost_per_min: f64,
    pub est_daily_cost: f64,
}
