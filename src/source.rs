use serde::Deserialize;

use crate::poller::{DpMap, TelemetrySource};

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(default)]
    dps: DpMap,
}

/// Telemetry source polling a local JSON status endpoint of shape
/// `{"dps": {"1": true, "19": 955, ...}}`, as exposed by the device bridge.
pub struct HttpStatusSource {
    client: reqwest::Client,
    url: String,
}

impl HttpStatusSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

impl TelemetrySource for HttpStatusSource {
    async fn poll(&mut self) -> anyhow::Result<DpMap> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?;
        let status: StatusResponse = response.json().await?;
        Ok(status.dps)
    }
}
