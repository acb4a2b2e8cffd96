use std::net::SocketAddr;
use std::time::Duration;

use outlet_monitor::repositories::{RateSettings, SampleStore};
use outlet_monitor::services::MonitorService;
use outlet_monitor::source::HttpStatusSource;
use outlet_monitor::{poller, routes, Config};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;
    info!("Configuration loaded");

    let store = SampleStore::new(&config.storage.data_file);
    let settings = RateSettings::new(&config.storage.settings_file);
    let service = MonitorService::new(store.clone(), settings);

    match &config.device.status_url {
        Some(url) => {
            let interval = Duration::from_secs(config.device.poll_interval_secs);
            info!(url = %url, interval_secs = config.device.poll_interval_secs, "starting poll loop");
            tokio::spawn(poller::run(
                HttpStatusSource::new(url.clone()),
                store.clone(),
                interval,
            ));
        }
        None => warn!("DEVICE_STATUS_URL not set; running query-side only"),
    }

    let app = routes::create_router(service);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
