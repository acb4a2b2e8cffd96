use chrono::NaiveDateTime;

use crate::timeparse::parse_timestamp;

/// Assumed observation window when only one sample exists, and the fallback
/// inter-sample gap when no positive delta is available.
const DEFAULT_GAP_SECS: f64 = 60.0;

/// A (timestamp, power) pair fed to the integrator.
#[derive(Debug, Clone)]
pub struct PowerSample {
    pub timestamp: String,
    pub power_w: f64,
}

impl PowerSample {
    pub fn new(timestamp: impl Into<String>, power_w: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            power_w,
        }
    }
}

/// Total energy in kWh covered by an unordered bag of power samples, via
/// trapezoidal integration over the parsed timestamps.
///
/// Samples with unparseable timestamps are skipped. Negative deltas (minor
/// out-of-order arrival) contribute nothing rather than subtracting energy.
/// The interval after the final sample is unknowable, so it is extended by
/// the median positive inter-sample gap, which a single missed poll tick or
/// retry burst cannot distort.
pub fn integrate_kwh(samples: &[PowerSample]) -> f64 {
    let mut pts: Vec<(NaiveDateTime, f64)> = samples
        .iter()
        .filter_map(|s| parse_timestamp(&s.timestamp).ok().map(|t| (t, s.power_w)))
        .collect();

    if pts.is_empty() {
        return 0.0;
    }

    pts.sort_by_key(|&(t, _)| t);

    if pts.len() == 1 {
        let watt_seconds = pts[0].1 * DEFAULT_GAP_SECS;
        return round_to(watt_seconds / 3600.0 / 1000.0, 6);
    }

    let mut watt_seconds = 0.0;
    let mut gaps: Vec<f64> = Vec::with_capacity(pts.len() - 1);
    for pair in pts.windows(2) {
        let (t0, p0) = pair[0];
        let (t1, p1) = pair[1];
        let delta = (t1 - t0).num_milliseconds() as f64 / 1000.0;
        if delta < 0.0 {
            continue;
        }
        watt_seconds += (p0 + p1) / 2.0 * delta;
        if delta > 0.0 {
            gaps.push(delta);
        }
    }

    // Hold the last reading for the median gap.
    let median_gap = if gaps.is_empty() {
        DEFAULT_GAP_SECS
    } else {
        gaps.sort_by(|a, b| a.total_cmp(b));
        gaps[gaps.len() / 2]
    };
    watt_seconds += pts[pts.len() - 1].1 * median_gap;

    round_to(watt_seconds / 3600.0 / 1000.0, 6)
}

pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}
