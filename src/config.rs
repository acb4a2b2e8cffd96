use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub storage: StorageConfig,
    pub device: DeviceConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_file: PathBuf,
    pub settings_file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// JSON status endpoint polled by the producer loop. When unset the
    /// server runs query-side only.
    pub status_url: Option<String>,
    pub poll_interval_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let data_file = env::var("DATA_FILE")
            .unwrap_or_else(|_| "data.json".to_string())
            .into();

        let settings_file = env::var("SETTINGS_FILE")
            .unwrap_or_else(|_| "settings.json".to_string())
            .into();

        let status_url = env::var("DEVICE_STATUS_URL").ok().filter(|s| !s.is_empty());

        let poll_interval_secs = match env::var("POLL_INTERVAL_SECS") {
            Ok(s) => s
                .parse()
                .map_err(|_| anyhow::anyhow!("POLL_INTERVAL_SECS must be an integer: {}", s))?,
            Err(_) => 8,
        };

        let host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("SERVER_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);

        Ok(Config {
            storage: StorageConfig {
                data_file,
                settings_file,
            },
            device: DeviceConfig {
                status_url,
                poll_interval_secs,
            },
            server: ServerConfig { host, port },
        })
    }
}
