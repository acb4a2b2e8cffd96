use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDateTime};

use crate::error::Result;
use crate::models::Sample;
use crate::timeparse::{self, parse_timestamp};

/// Samples older than this are pruned from the log on every append.
const RETENTION_DAYS: i64 = 30;

/// File-backed, append-only sample log. The whole collection is replaced on
/// every mutation; one lock serializes every read and write so readers only
/// ever observe the pre- or post-write state.
#[derive(Clone)]
pub struct SampleStore {
    inner: Arc<Inner>,
}

struct Inner {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SampleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(Inner {
                path: path.into(),
                lock: Mutex::new(()),
            }),
        }
    }

    /// Append one sample and prune everything past the retention window.
    /// Entries whose timestamp no longer parses are kept: malformed
    /// timestamps drop a sample from integration, never from storage.
    pub fn append(&self, sample: Sample) -> Result<()> {
        let _guard = self.inner.lock.lock().unwrap();

        let mut samples = load(&self.inner.path)?;
        samples.push(sample);

        let cutoff = timeparse::now() - Duration::days(RETENTION_DAYS);
        samples.retain(|s| match parse_timestamp(&s.timestamp) {
            Ok(ts) => ts > cutoff,
            Err(_) => true,
        });

        store(&self.inner.path, &samples)
    }

    /// Full in-window collection in insertion order. No reordering: the
    /// producer may have delivered slightly out-of-order samples and the log
    /// records what it was given.
    pub fn read_all(&self) -> Result<Vec<Sample>> {
        let _guard = self.inner.lock.lock().unwrap();
        load(&self.inner.path)
    }

    /// Samples whose parsed timestamp satisfies `pred`. Entries that fail to
    /// parse are skipped.
    pub fn read_range<F>(&self, pred: F) -> Result<Vec<Sample>>
    where
        F: Fn(NaiveDateTime) -> bool,
    {
        let _guard = self.inner.lock.lock().unwrap();
        let samples = load(&self.inner.path)?;
        Ok(samples
            .into_iter()
            .filter(|s| matches!(parse_timestamp(&s.timestamp), Ok(ts) if pred(ts)))
            .collect())
    }
}

fn load(path: &Path) -> Result<Vec<Sample>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn store(path: &Path, samples: &[Sample]) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec(samples)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
