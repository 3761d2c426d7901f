//! Daemon command: the scheduler loop plus the control API.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use miette::Result;
use tracing::info;

use drumbeat_publish::PublishClient;
use drumbeat_scheduler::{MetricsRecorder, Scheduler, SchedulerConfig};
use drumbeat_store::PostStore;
use drumbeat_web::create_router;

/// How far in the past an enqueued post's scheduled time may lie.
const ENQUEUE_GRACE_MINUTES: i64 = 5;

/// Configuration for the daemon.
pub struct DaemonConfig {
    pub api_url: String,
    pub access_token: String,
    pub state_path: PathBuf,
    pub metrics_path: PathBuf,
    pub tick_interval: u64,
    pub retry_delay: u64,
    pub reminder_window: u64,
    pub port: u16,
}

pub async fn run(config: DaemonConfig) -> Result<()> {
    let store = PostStore::open(&config.state_path, Duration::minutes(ENQUEUE_GRACE_MINUTES))
        .map_err(|e| miette::miette!("{}", e))?;

    let client = Arc::new(PublishClient::new(&config.api_url, &config.access_token));

    let scheduler_config = SchedulerConfig {
        tick_interval: StdDuration::from_secs(config.tick_interval),
        retry_delay: Duration::minutes(config.retry_delay as i64),
        reminder_window: Duration::minutes(config.reminder_window as i64),
        ..SchedulerConfig::default()
    };

    let scheduler = Arc::new(
        Scheduler::new(Arc::new(store), client.into_publisher(), scheduler_config)
            .with_metrics(MetricsRecorder::new(&config.metrics_path)),
    );

    scheduler.start().await.map_err(|e| miette::miette!("{}", e))?;
    info!(
        state_path = %config.state_path.display(),
        tick_secs = config.tick_interval,
        "scheduler started"
    );

    let router = create_router(Arc::clone(&scheduler));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .map_err(|e| miette::miette!("{}", e))?;

    info!("control API listening on http://0.0.0.0:{}", config.port);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("received shutdown signal");
        })
        .await
        .map_err(|e| miette::miette!("{}", e))?;

    // Stop the loop last so its final snapshot captures everything
    scheduler.stop().await;
    info!("daemon stopped");

    Ok(())
}
