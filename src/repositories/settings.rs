use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

pub const DEFAULT_COST_PER_KWH: f64 = 10.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Settings {
    cost_per_kwh: f64,
}

/// File-backed cost-per-kWh setting, replaced wholesale on every update.
/// Reads never fail: missing or corrupt storage yields the default rate so
/// the dashboard stays up even when the settings file is briefly unreadable.
#[derive(Clone)]
pub struct RateSettings {
    inner: Arc<Inner>,
}

struct Inner {
    path: PathBuf,
    lock: Mutex<()>,
}

impl RateSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Inner {
                path: path.into(),
                lock: Mutex::new(()),
            }),
        }
    }

    pub fn get(&self) -> f64 {
        let _guard = self.inner.lock.lock().unwrap();
        match fs::read_to_string(&self.inner.path) {
            Ok(raw) => match serde_json::from_str::<Settings>(&raw) {
                Ok(settings) => settings.cost_per_kwh,
                Err(e) => {
                    warn!(path = %self.inner.path.display(), error = %e, "settings file corrupt; using default rate");
                    DEFAULT_COST_PER_KWH
                }
            },
            Err(_) => DEFAULT_COST_PER_KWH,
        }
    }

    pub fn set(&self, cost_per_kwh: f64) -> Result<()> {
        let _guard = self.inner.lock.lock().unwrap();
        let tmp = self.inner.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(&Settings { cost_per_kwh })?)?;
        fs::rename(&tmp, &self.inner.path)?;
        Ok(())
    }
}
