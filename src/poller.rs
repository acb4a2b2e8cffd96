use std::collections::HashMap;
use std::time::Duration;

use chrono::NaiveDateTime;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::{Sample, Telemetry};
use crate::repositories::SampleStore;
use crate::timeparse;

/// Flat mapping of device data-point IDs to raw values, as delivered by the
/// outlet on each status poll.
pub type DpMap = HashMap<String, Value>;

/// On/off relay flag.
pub const DP_SWITCH: &str = "1";
/// Cumulative energy counter, milli-kWh.
pub const DP_TOTAL_ENERGY: &str = "17";
/// Current draw, milliamps.
pub const DP_CURRENT: &str = "18";
/// Active power, deciwatts.
pub const DP_POWER: &str = "19";
/// Line voltage, decivolts.
pub const DP_VOLTAGE: &str = "20";

/// Anything that can deliver one status snapshot from the monitored outlet.
pub trait TelemetrySource: Send {
    fn poll(&mut self) -> impl std::future::Future<Output = anyhow::Result<DpMap>> + Send;
}

/// Scale raw data-point values to the units the log stores: power and
/// voltage arrive in tenths, the energy counter in milli-kWh. Current stays
/// in milliamps. Missing points read as zero/off.
pub fn sample_from_status(dps: &DpMap, captured_at: NaiveDateTime) -> Sample {
    let num = |id: &str| dps.get(id).and_then(Value::as_f64).unwrap_or(0.0);

    Sample::new(
        timeparse::format_timestamp(captured_at),
        Telemetry {
            current_ma: num(DP_CURRENT),
            power_w: num(DP_POWER) / 10.0,
            voltage_v: num(DP_VOLTAGE) / 10.0,
            total_kwh: num(DP_TOTAL_ENERGY) / 1000.0,
            is_on: dps
                .get(DP_SWITCH)
                .and_then(Value::as_bool)
                .unwrap_or(false),
        },
    )
}

/// One producer tick: poll, convert, persist. Every failure is logged and
/// absorbed; a dropped sample is preferable to a dead poll loop.
pub async fn poll_once<S: TelemetrySource>(source: &mut S, store: &SampleStore) {
    match source.poll().await {
        Ok(dps) => {
            let sample = sample_from_status(&dps, timeparse::now());
            match store.append(sample) {
                Ok(()) => debug!("sample persisted"),
                Err(e) => warn!(error = %e, "failed to persist sample; dropping it"),
            }
        }
        Err(e) => warn!(error = %e, "device poll failed"),
    }
}

/// Fixed-interval producer loop. Runs until the process shuts down.
pub async fn run<S: TelemetrySource>(mut source: S, store: SampleStore, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        poll_once(&mut source, &store).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct StaticSource(DpMap);

    impl TelemetrySource for StaticSource {
        async fn poll(&mut self) -> anyhow::Result<DpMap> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    impl TelemetrySource for FailingSource {
        async fn poll(&mut self) -> anyhow::Result<DpMap> {
            anyhow::bail!("device unreachable")
        }
    }

    fn status() -> DpMap {
        let mut dps = DpMap::new();
        dps.insert(DP_SWITCH.to_string(), json!(true));
        dps.insert(DP_TOTAL_ENERGY.to_string(), json!(1234));
        dps.insert(DP_CURRENT.to_string(), json!(420));
        dps.insert(DP_POWER.to_string(), json!(955));
        dps.insert(DP_VOLTAGE.to_string(), json!(2312));
        dps
    }

    #[test]
    fn applies_documented_scale_factors() {
        let sample = sample_from_status(&status(), timeparse::now());
        assert_eq!(sample.data.current_ma, 420.0);
        assert_eq!(sample.data.power_w, 95.5);
        assert_eq!(sample.data.voltage_v, 231.2);
        assert_eq!(sample.data.total_kwh, 1.234);
        assert!(sample.data.is_on);
    }

    #[test]
    fn missing_points_read_as_zero_and_off() {
        let sample = sample_from_status(&DpMap::new(), timeparse::now());
        assert_eq!(sample.data.power_w, 0.0);
        assert!(!sample.data.is_on);
    }

    #[tokio::test]
    async fn poll_once_appends_a_sample() {
        let dir = tempfile::tempdir().unwrap();
        let store = SampleStore::new(dir.path().join("data.json"));
        let mut source = StaticSource(status());

        poll_once(&mut source, &store).await;

        let all = store.read_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].data.power_w, 95.5);
    }

    #[tokio::test]
    async fn poll_once_absorbs_source_failures() {
        let dir = tempfile::tempdir().unwrap();
        let store = SampleStore::new(dir.path().join("data.json"));
        let mut source = FailingSource;

        poll_once(&mut source, &store).await;

        assert!(store.read_all().unwrap().is_empty());
    }
}
