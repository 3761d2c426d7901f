//! The scheduler loop and its control surface.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use drumbeat_publish::Publisher;
use drumbeat_store::{NewPost, PostStore, ScheduledPost, StatusCounts};
use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::dispatcher::dispatch_due;
use crate::reminder::emit_reminders;
use crate::{MetricsRecorder, SchedulerConfig, SchedulerError, TickReport};

/// Summary of the next post eligible for dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct NextDue {
    pub id: String,
    pub platform: String,
    pub scheduled_time: DateTime<Utc>,
}

/// Point-in-time view of the scheduler, for the status surface.
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
    pub running: bool,
    pub counts: StatusCounts,
    pub next_due: Option<NextDue>,
}

/// Owns the periodic loop that reminds, dispatches, and snapshots.
///
/// There is exactly one loop task per scheduler; `start` on a running
/// scheduler fails rather than spawning a second writer. All post
/// mutation happens on the loop task (or through [`Scheduler::run_tick`]
/// in tests); enqueue is the one concurrent write path, and it goes
/// straight to the store.
pub struct Scheduler {
    store: Arc<PostStore>,
    publisher: Publisher,
    config: SchedulerConfig,
    metrics: Option<MetricsRecorder>,
    running: AtomicBool,
    shutdown: Mutex<Option<(watch::Sender<bool>, JoinHandle<()>)>>,
}

impl Scheduler {
    pub fn new(store: Arc<PostStore>, publisher: Publisher, config: SchedulerConfig) -> Self {
        Self {
            store,
            publisher,
            config,
            metrics: None,
            running: AtomicBool::new(false),
            shutdown: Mutex::new(None),
        }
    }

    /// Attach a metrics recorder; successful publishes get a baseline row.
    pub fn with_metrics(mut self, metrics: MetricsRecorder) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// The store backing this scheduler.
    pub fn store(&self) -> &Arc<PostStore> {
        &self.store
    }

    /// Validate and enqueue a new post, persisting a snapshot so it
    /// survives a crash before the next tick.
    pub async fn enqueue(&self, new: NewPost) -> Result<String, SchedulerError> {
        let id = self.store.enqueue(new).await?;
        self.store.snapshot().await?;
        Ok(id)
    }

    /// Point-in-time status: run state, counts, and the next due post.
    pub async fn status(&self) -> SchedulerStatus {
        let next_due = self.store.next_due().await.map(|p| NextDue {
            id: p.id,
            platform: p.platform,
            scheduled_time: p.scheduled_time,
        });
        SchedulerStatus {
            running: self.running.load(Ordering::SeqCst),
            counts: self.store.counts(Utc::now()).await,
            next_due,
        }
    }

    /// Fetch a post by id.
    pub async fn get_post(&self, id: &str) -> Option<ScheduledPost> {
        self.store.get(id).await
    }

    /// Run one tick at `now`: reminders, then dispatch, then a snapshot.
    ///
    /// The loop calls this with the wall clock; tests call it directly
    /// with synthetic clocks to drive the state machine deterministically.
    pub async fn run_tick(&self, now: DateTime<Utc>) -> Result<TickReport, SchedulerError> {
        let mut report = TickReport::default();
        report.reminded = emit_reminders(&self.store, self.config.reminder_window, now).await?;
        dispatch_due(
            &self.store,
            &self.publisher,
            &self.config,
            self.metrics.as_ref(),
            now,
            &mut report,
        )
        .await?;
        self.store.snapshot().await?;
        Ok(report)
    }

    /// Start the periodic loop.
    ///
    /// Fails with [`SchedulerError::AlreadyRunning`] if the loop is live.
    pub async fn start(self: &Arc<Self>) -> Result<(), SchedulerError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(SchedulerError::AlreadyRunning);
        }

        let (tx, mut rx) = watch::channel(false);
        let scheduler = Arc::clone(self);

        let handle = tokio::spawn(async move {
            info!(
                tick_secs = scheduler.config.tick_interval.as_secs(),
                "scheduler loop started"
            );
            let mut interval = tokio::time::interval(scheduler.config.tick_interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;

                    _ = rx.changed() => {
                        if *rx.borrow() {
                            break;
                        }
                    }

                    _ = interval.tick() => {
                        match scheduler.run_tick(Utc::now()).await {
                            Ok(report) => {
                                if report != TickReport::default() {
                                    info!(
                                        published = report.published,
                                        retried = report.retried,
                                        failed = report.failed,
                                        deferred = report.deferred,
                                        reminded = report.reminded,
                                        "tick complete"
                                    );
                                } else {
                                    debug!("tick complete, nothing to do");
                                }
                            }
                            Err(e) => {
                                error!(error = %e, "tick failed, backing off");
                                tokio::time::sleep(scheduler.config.error_backoff).await;
                            }
                        }
                    }
                }
            }

            // Final snapshot so shutdown loses nothing
            if let Err(e) = scheduler.store.snapshot().await {
                error!(error = %e, "failed to write shutdown snapshot");
            }
            scheduler.running.store(false, Ordering::SeqCst);
            info!("scheduler loop stopped");
        });

        *self.shutdown.lock().await = Some((tx, handle));
        Ok(())
    }

    /// Signal the loop to stop and wait for it to finish its final snapshot.
    pub async fn stop(&self) {
        let Some((tx, handle)) = self.shutdown.lock().await.take() else {
            return;
        };
        let _ = tx.send(true);
        if let Err(e) = handle.await {
            error!(error = %e, "scheduler loop task panicked");
            self.running.store(false, Ordering::SeqCst);
        }
    }

    /// Whether the loop task is currently live.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}
