use heat_trail::config::AppConfig;
use heat_trail::db::{self, PointStore};
use heat_trail::device::{ConfiguredPermission, ReplaySource};
use heat_trail::models::StatusEvent;
use heat_trail::render::GeoJsonRenderer;
use heat_trail::tracking::{SamplingPolicy, Tracker};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config = AppConfig::load()?;

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(&config.log_level)
        .init();

    info!("Starting heat-trail location tracker...");

    // Init DB
    let pool = db::init_pool(&config.database_url).await?;
    info!("Opened database {}", config.database_url);

    // Status updates go to the log
    let (status_tx, mut status_rx) = mpsc::unbounded_channel::<StatusEvent>();
    let status_task = tokio::spawn(async move {
        while let Some(event) = status_rx.recv().await {
            if event.is_error() {
                warn!("{}", event);
            } else {
                info!("{}", event);
            }
        }
    });

    let mut tracker = Tracker::new(PointStore::new(pool), SamplingPolicy::default(), status_tx);
    let mut permission = ConfiguredPermission(config.permission());

    let started = tracker
        .start(
            &mut permission,
            ReplaySource::new(&config.location_feed),
            GeoJsonRenderer::new(&config.heatmap_output),
        )
        .await;

    if let Err(e) = started {
        error!("Tracking not started: {}", e);
        drop(tracker);
        status_task.await?;
        return Err(e.into());
    }

    tokio::signal::ctrl_c().await?;
    info!("Shutdown requested");

    tracker.stop().await;
    match tracker.store().count().await {
        Ok(count) => info!("{} points stored", count),
        Err(e) => warn!("Could not count stored points: {}", e),
    }

    drop(tracker);
    status_task.await?;

    Ok(())
}
