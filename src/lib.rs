pub mod db;
pub mod escalation;
pub mod ingest;
pub mod motion;
pub mod notify;
pub mod reminders;
pub mod scheduler;
pub mod settings;
pub mod social;
mod utils;
pub mod vitals;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use db::Database;
use ingest::IngestState;
use motion::MotionTracker;
use scheduler::Scheduler;
use settings::{MonitorConfig, VitalsSourceKind};
use vitals::{IngestFeed, SimulatedVitals, VitalsClassifier, VitalsSampler};

/// Opens the store, loads the classifier and runs the monitor loop until
/// `cancel_token` fires. Startup failures are returned before the first tick.
pub async fn run(config: MonitorConfig, cancel_token: CancellationToken) -> Result<()> {
    config.validate()?;

    let database = Database::new(config.db_path.clone())?;
    log::info!(
        "Event store at {}: {} health log(s), {} alert(s) on record",
        database.path().display(),
        database.count_health_logs().await?,
        database.count_alerts().await?
    );

    let classifier = VitalsClassifier::load(&config.model_path)
        .context("cannot start without the vitals classifier")?;

    let tracker = MotionTracker::new();
    let notifier = notify::from_settings(&config.notifier);

    let feed = IngestFeed::new();
    let sampler: Box<dyn VitalsSampler> = match config.vitals_source {
        VitalsSourceKind::Simulated => Box::new(SimulatedVitals::new()),
        VitalsSourceKind::Ingest => Box::new(feed.subscribe()),
    };

    // Seeding and client setup must succeed before the ingest server listens.
    let scheduler = Scheduler::new(
        &config,
        database,
        tracker.clone(),
        sampler,
        classifier,
        notifier,
    )
    .await?;

    let ingest_task = if config.ingest.enabled {
        let listener = ingest::bind(&config.ingest.bind_addr).await?;
        let state = IngestState { feed, tracker };
        Some(tokio::spawn(ingest::serve(
            listener,
            state,
            cancel_token.child_token(),
        )))
    } else {
        if config.vitals_source == VitalsSourceKind::Ingest {
            log::warn!("Vitals source is 'ingest' but the ingest server is disabled; no vitals will arrive");
        }
        None
    };

    scheduler.run(cancel_token.clone()).await;

    if let Some(task) = ingest_task {
        cancel_token.cancel();
        match task.await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => log::error!("Ingest server stopped with error: {err:#}"),
            Err(err) => log::error!("Ingest server task failed: {err}"),
        }
    }

    log::info!("CareWatch stopped");
    Ok(())
}
