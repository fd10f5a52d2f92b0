use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{
    db::Database,
    escalation::{AdvisoryClient, EscalationContext, EscalationOutcome, EscalationPipeline},
    motion::{MotionSource, MotionTracker},
    notify::Notifier,
    reminders::ReminderSource,
    settings::MonitorConfig,
    social::{SocialPrompt, SocialSource},
    vitals::{VitalsClassifier, VitalsReading, VitalsSampler, VitalsSource},
};

// Set to false to silence per-tick logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// What one tick did. Used for logging and by tests.
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub reminders_dispatched: usize,
    pub inactivity: bool,
    pub vitals: Option<VitalsReading>,
    pub social_prompt: Option<SocialPrompt>,
    pub escalations: Vec<EscalationOutcome>,
    /// Steps that failed and were skipped for this tick.
    pub failures: usize,
}

pub struct Scheduler {
    db: Database,
    reminders: ReminderSource,
    motion: MotionSource,
    vitals: VitalsSource,
    social: SocialSource,
    escalation: EscalationPipeline,
    notifier: Arc<dyn Notifier>,
    tick_period: Duration,
    ticks: u64,
}

impl Scheduler {
    /// Seeds the configured reminders and wires every signal source.
    pub async fn new(
        config: &MonitorConfig,
        db: Database,
        tracker: MotionTracker,
        sampler: Box<dyn VitalsSampler>,
        classifier: VitalsClassifier,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        config.validate()?;

        let added = db
            .seed_reminders(config.reminders.clone())
            .await
            .context("failed to seed reminders")?;
        log::info!(
            "Seeded {added} new reminder(s) from {} configured",
            config.reminders.len()
        );

        let advisor = AdvisoryClient::new(&config.advisory)?;
        let escalation = EscalationPipeline::new(
            db.clone(),
            advisor,
            notifier.clone(),
            config.advisory.language.clone(),
            config.realert_cooldown(),
        );

        Ok(Self {
            reminders: ReminderSource::new(),
            motion: MotionSource::new(tracker, config.inactivity_threshold()),
            vitals: VitalsSource::new(sampler, classifier),
            social: SocialSource::new(
                &config.supported_languages,
                config.social.prompt_probability,
            ),
            escalation,
            notifier,
            tick_period: config.tick_period(),
            ticks: 0,
            db,
        })
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Ticks until `cancel_token` fires. Cancellation is only observed
    /// between ticks; an in-flight tick always completes.
    pub async fn run(mut self, cancel_token: CancellationToken) {
        let mut ticker = tokio::time::interval(self.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        log_info!(
            "Monitor loop started (tick every {}s)",
            self.tick_period.as_secs()
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel_token.cancelled() => {
                    log_info!("Monitor loop shutting down after {} ticks", self.ticks);
                    break;
                }
                _ = ticker.tick() => {
                    let started = Instant::now();
                    let report = self.tick().await;
                    let elapsed = started.elapsed();

                    if elapsed > self.tick_period {
                        log_warn!(
                            "Tick {} overran its period: {}ms > {}ms",
                            self.ticks,
                            elapsed.as_millis(),
                            self.tick_period.as_millis()
                        );
                    }
                    log::debug!("Tick {} finished in {}ms: {:?}", self.ticks, elapsed.as_millis(), report);
                }
            }
        }
    }

    pub async fn tick(&mut self) -> TickReport {
        self.tick_at(Local::now()).await
    }

    /// One detection cycle in fixed order: schedule, motion, vitals, social.
    pub async fn tick_at(&mut self, now: DateTime<Local>) -> TickReport {
        let now_utc: DateTime<Utc> = now.with_timezone(&Utc);
        let mut report = TickReport::default();
        self.ticks += 1;

        match self.reminders.due(&self.db, now).await {
            Ok(due) => {
                for reminder in &due {
                    log_info!("Reminder ({}): {}", reminder.language, reminder.message);
                    self.notifier.speak(&reminder.message, &reminder.language);
                }
                report.reminders_dispatched = due.len();
            }
            Err(err) => {
                log_error!("Reminder lookup failed: {err:#}");
                report.failures += 1;
            }
        }

        if let Some(event) = self.motion.poll(now_utc) {
            report.inactivity = true;
            log_warn!(
                "No movement for {}s (threshold {}s)",
                event.idle_for.as_secs(),
                event.threshold.as_secs()
            );
            self.escalate(EscalationContext::Inactivity(event), now_utc, &mut report)
                .await;
        }

        match self.vitals.poll(&self.db, now_utc).await {
            Ok(Some(reading)) => {
                if reading.is_critical {
                    self.escalate(
                        EscalationContext::CriticalVitals(reading.sample),
                        now_utc,
                        &mut report,
                    )
                    .await;
                }
                report.vitals = Some(reading);
            }
            Ok(None) => {}
            Err(err) => {
                // History was not written, so this tick does not escalate vitals.
                log_error!("Skipping vitals escalation: {err:#}");
                report.failures += 1;
            }
        }

        if let Some(prompt) = self.social.poll() {
            log_info!("Social ({}): {}", prompt.language, prompt.message);
            self.notifier.speak(prompt.message, &prompt.language);
            report.social_prompt = Some(prompt);
        }

        report
    }

    async fn escalate(
        &mut self,
        context: EscalationContext,
        now: DateTime<Utc>,
        report: &mut TickReport,
    ) {
        match self.escalation.escalate(context, now).await {
            Ok(outcome) => report.escalations.push(outcome),
            Err(err) => {
                log_error!("Escalation skipped: {err:#}");
                report.failures += 1;
            }
        }
    }
}
