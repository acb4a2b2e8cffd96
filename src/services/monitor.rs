use std::collections::BTreeMap;

use tracing::warn;

use crate::error::{AppError, Result};
use crate::models::{DailySummary, DayDetail, LiveStatus, Sample};
use crate::repositories::{RateSettings, SampleStore};
use crate::services::energy::{integrate_kwh, round_to, PowerSample};
use crate::timeparse::{date_key, parse_timestamp};

/// Query facade over the sample log and the rate setting. All results are
/// derived on demand; nothing here caches, so a rate change is visible on
/// the very next query.
#[derive(Clone)]
pub struct MonitorService {
    store: SampleStore,
    settings: RateSettings,
}

impl MonitorService {
    pub fn new(store: SampleStore, settings: RateSettings) -> Self {
        Self { store, settings }
    }

    /// Most recent stored sample.
    pub fn latest(&self) -> Result<Sample> {
        self.read_degraded()
            .into_iter()
            .last()
            .ok_or(AppError::NotAvailable)
    }

    /// Latest sample plus instantaneous cost figures at the current rate.
    pub fn live_status(&self) -> Result<LiveStatus> {
        let sample = self.latest()?;
        let rate = self.settings.get();

        let kw = sample.data.power_w / 1000.0;
        let cost_per_hour = round_to(kw * rate, 6);

        Ok(LiveStatus {
            is_on: sample.data.is_on,
            power_w: sample.data.power_w,
            voltage_v: sample.data.voltage_v,
            current_ma: sample.data.current_ma,
            total_kwh: sample.data.total_kwh,
            cost_per_kwh: rate,
            cost_per_hour,
            cost_per_min: round_to(cost_per_hour / 60.0, 6),
            est_daily_cost: round_to(cost_per_hour * 24.0, 4),
        })
    }

    /// Raw series and totals for one calendar day (`YYYY-MM-DD`, local time).
    pub fn day_detail(&self, date: &str) -> Result<DayDetail> {
        let matching = self
            .store
            .read_range(|ts| date_key(ts) == date)
            .unwrap_or_else(|e| {
                warn!(error = %e, "reading sample log failed");
                Vec::new()
            });

        if matching.is_empty() {
            return Err(AppError::NoDataForDate(date.to_string()));
        }

        let power_samples: Vec<PowerSample> = matching
            .iter()
            .map(|s| PowerSample::new(s.timestamp.clone(), s.data.power_w))
            .collect();
        let total_kwh = integrate_kwh(&power_samples);
        let cost = round_to(total_kwh * self.settings.get(), 4);

        Ok(DayDetail {
            timestamps: matching.iter().map(|s| s.timestamp.clone()).collect(),
            power: matching.iter().map(|s| s.data.power_w).collect(),
            voltage: matching.iter().map(|s| s.data.voltage_v).collect(),
            current: matching
                .iter()
                .map(|s| round_to(s.data.current_ma / 1000.0, 3))
                .collect(),
            total_kwh,
            cost,
        })
    }

    /// Per-day summaries for the most recent `days_back` distinct dates,
    /// ordered ascending by date (charting wants chronological order even
    /// though selection is by recency).
    pub fn daily_summary(&self, days_back: usize) -> Vec<DailySummary> {
        let samples = self.read_degraded();

        let mut by_date: BTreeMap<String, Vec<PowerSample>> = BTreeMap::new();
        for sample in &samples {
            let Ok(ts) = parse_timestamp(&sample.timestamp) else {
                continue;
            };
            by_date
                .entry(date_key(ts))
                .or_default()
                .push(PowerSample::new(sample.timestamp.clone(), sample.data.power_w));
        }

        let rate = self.settings.get();

        let selected: Vec<_> = by_date.iter().rev().take(days_back).collect();
        selected
            .into_iter()
            .rev()
            .map(|(date, day_samples)| {
                let total_kwh = integrate_kwh(day_samples);
                let powers: Vec<f64> = day_samples.iter().map(|s| s.power_w).collect();
                let (avg_w, max_w, min_w) = power_stats(&powers);
                DailySummary {
                    date: date.clone(),
                    total_kwh,
                    cost: round_to(total_kwh * rate, 4),
                    avg_w,
                    max_w,
                    min_w,
                }
            })
            .collect()
    }

    /// Sorted distinct dates with at least one sample.
    pub fn available_dates(&self) -> Vec<String> {
        let mut dates: Vec<String> = self
            .read_degraded()
            .iter()
            .filter_map(|s| parse_timestamp(&s.timestamp).ok())
            .map(date_key)
            .collect();
        dates.sort();
        dates.dedup();
        dates
    }

    pub fn rate(&self) -> f64 {
        self.settings.get()
    }

    /// Persist a new cost-per-kWh rate. Rejected before any write when
    /// negative.
    pub fn set_rate(&self, rate: f64) -> Result<f64> {
        if rate < 0.0 {
            return Err(AppError::InvalidRate(rate));
        }
        self.settings.set(rate)?;
        Ok(rate)
    }

    // The dashboard must stay visible when history is briefly unreadable, so
    // query-side read failures degrade to an empty collection.
    fn read_degraded(&self) -> Vec<Sample> {
        self.store.read_all().unwrap_or_else(|e| {
            warn!(error = %e, "reading sample log failed");
            Vec::new()
        })
    }
}

fn power_stats(powers: &[f64]) -> (f64, f64, f64) {
    if powers.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let sum: f64 = powers.iter().sum();
    let max = powers.iter().cloned().fold(f64::MIN, f64::max);
    let min = powers.iter().cloned().fold(f64::MAX, f64::min);
    (
        round_to(sum / powers.len() as f64, 2),
        round_to(max, 2),
        round_to(min, 2),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Telemetry;
    use crate::repositories::settings::DEFAULT_COST_PER_KWH;
    use pretty_assertions::assert_eq;

    fn service(dir: &tempfile::TempDir) -> (MonitorService, SampleStore) {
        let store = SampleStore::new(dir.path().join("data.json"));
        let settings = RateSettings::new(dir.path().join("settings.json"));
        (MonitorService::new(store.clone(), settings), store)
    }

    fn sample(timestamp: &str, power_w: f64) -> Sample {
        Sample::new(
            timestamp.to_string(),
            Telemetry {
                current_ma: 500.0,
                power_w,
                voltage_v: 231.4,
                total_kwh: 3.2,
                is_on: true,
            },
        )
    }

    fn seed(store: &SampleStore, entries: &[(&str, f64)]) {
        for (ts, p) in entries {
            store.append(sample(ts, *p)).unwrap();
        }
    }

    #[test]
    fn latest_fails_when_store_empty() {
        let dir = tempfile::tempdir().unwrap();
        let (svc, _) = service(&dir);
        assert!(matches!(svc.latest(), Err(AppError::NotAvailable)));
    }

    #[test]
    fn latest_returns_most_recent_append() {
        let dir = tempfile::tempdir().unwrap();
        let (svc, store) = service(&dir);
        let first = sample(&crate::timeparse::format_timestamp(crate::timeparse::now()), 10.0);
        let second = sample(&crate::timeparse::format_timestamp(crate::timeparse::now()), 20.0);
        store.append(first).unwrap();
        store.append(second.clone()).unwrap();
        assert_eq!(svc.latest().unwrap(), second);
    }

    #[test]
    fn day_detail_for_unknown_date_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let (svc, _) = service(&dir);
        let err = svc.day_detail("2024-01-01").unwrap_err();
        assert!(matches!(err, AppError::NoDataForDate(_)));
    }

    #[test]
    fn day_detail_converts_current_and_prices_energy() {
        let dir = tempfile::tempdir().unwrap();
        let (svc, store) = service(&dir);
        let now = crate::timeparse::now();
        let date = date_key(now);
        let ts = crate::timeparse::format_timestamp(now);
        seed(&store, &[(ts.as_str(), 1000.0)]);

        let detail = svc.day_detail(&date).unwrap();
        assert_eq!(detail.power, vec![1000.0]);
        assert_eq!(detail.current, vec![0.5]);
        // Single sample: 1000 W over the assumed 60 s window.
        let expected_kwh = round_to(1000.0 * 60.0 / 3600.0 / 1000.0, 6);
        assert_eq!(detail.total_kwh, expected_kwh);
        assert_eq!(detail.cost, round_to(expected_kwh * DEFAULT_COST_PER_KWH, 4));
    }

    // Retention pruning runs on every append, so seeded history has to stay
    // inside the 30-day window.
    fn days_ago(days: i64) -> String {
        crate::timeparse::format_timestamp(crate::timeparse::now() - chrono::Duration::days(days))
    }

    #[test]
    fn daily_summary_caps_at_days_back_ascending() {
        let dir = tempfile::tempdir().unwrap();
        let (svc, store) = service(&dir);
        let (d3, d2, d1) = (days_ago(3), days_ago(2), days_ago(1));
        seed(
            &store,
            &[(d3.as_str(), 100.0), (d2.as_str(), 200.0), (d1.as_str(), 300.0)],
        );

        let summary = svc.daily_summary(2);
        let dates: Vec<&str> = summary.iter().map(|s| s.date.as_str()).collect();
        assert_eq!(dates, vec![&d2[..10], &d1[..10]]);
    }

    #[test]
    fn daily_summary_power_stats() {
        let dir = tempfile::tempdir().unwrap();
        let (svc, store) = service(&dir);
        // Anchor mid-day so the one-minute offset stays on the same date.
        let anchor = (crate::timeparse::now() - chrono::Duration::days(1))
            .date()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let day = crate::timeparse::format_timestamp(anchor);
        let later = crate::timeparse::format_timestamp(anchor + chrono::Duration::minutes(1));
        seed(&store, &[(day.as_str(), 100.0), (later.as_str(), 300.0)]);

        let summary = svc.daily_summary(30);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].avg_w, 200.0);
        assert_eq!(summary[0].max_w, 300.0);
        assert_eq!(summary[0].min_w, 100.0);
    }

    #[test]
    fn set_rate_rejects_negative_and_keeps_prior_value() {
        let dir = tempfile::tempdir().unwrap();
        let (svc, _) = service(&dir);

        svc.set_rate(4.5).unwrap();
        let err = svc.set_rate(-1.0).unwrap_err();
        assert!(matches!(err, AppError::InvalidRate(_)));
        assert_eq!(svc.rate(), 4.5);
    }

    #[test]
    fn rate_defaults_until_first_set() {
        let dir = tempfile::tempdir().unwrap();
        let (svc, _) = service(&dir);
        assert_eq!(svc.rate(), DEFAULT_COST_PER_KWH);
    }

    #[test]
    fn available_dates_sorted_and_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let (svc, store) = service(&dir);
        let (d2, d1) = (days_ago(2), days_ago(1));
        seed(&store, &[(d1.as_str(), 1.0), (d2.as_str(), 1.0), (d1.as_str(), 1.0)]);
        assert_eq!(svc.available_dates(), vec![&d2[..10], &d1[..10]]);
    }
}
