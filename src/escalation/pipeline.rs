use std::{collections::HashMap, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::{
    db::{AlertKind, AlertRecord, Database, NewAlert},
    motion::InactivityEvent,
    notify::Notifier,
    vitals::VitalsSample,
};

use super::advisory::{Advice, AdvisoryClient};

pub const CRITICAL_VITALS_MESSAGE: &str = "Critical health condition detected!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationContext {
    Inactivity(InactivityEvent),
    CriticalVitals(VitalsSample),
}

impl EscalationContext {
    pub fn kind(&self) -> AlertKind {
        match self {
            EscalationContext::Inactivity(_) => AlertKind::Inactivity,
            EscalationContext::CriticalVitals(_) => AlertKind::CriticalVitals,
        }
    }

    /// Caregiver-facing alert text, stored verbatim in the alert log.
    pub fn alert_message(&self) -> String {
        match self {
            EscalationContext::Inactivity(event) => {
                format!("Inactivity detected for {}!", describe(event.threshold))
            }
            EscalationContext::CriticalVitals(_) => CRITICAL_VITALS_MESSAGE.to_string(),
        }
    }

    pub fn advisory_prompt(&self) -> String {
        match self {
            EscalationContext::Inactivity(event) => format!(
                "Patient inactive for {}. Advice?",
                describe(event.idle_for)
            ),
            EscalationContext::CriticalVitals(sample) => format!(
                "Critical vitals detected: heart rate {} bpm, blood pressure {}/{} mmHg, SpO2 {}%. What to do?",
                sample.heart_rate, sample.systolic, sample.diastolic, sample.spo2
            ),
        }
    }
}

fn describe(duration: Duration) -> String {
    let secs = duration.as_secs();
    match (secs / 60, secs % 60) {
        (1, 0) => "1 minute".to_string(),
        (minutes, 0) if minutes > 0 => format!("{minutes} minutes"),
        (0, seconds) => format!("{seconds} seconds"),
        (minutes, seconds) => format!("{minutes} minutes {seconds} seconds"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EscalationOutcome {
    Escalated { alert: AlertRecord, advice: Advice },
    /// Same kind escalated within the re-alert cooldown.
    Suppressed,
}

/// Two-tier escalation: a durable alert row, then best-effort advisory
/// guidance spoken to the caregiver.
pub struct EscalationPipeline {
    db: Database,
    advisor: AdvisoryClient,
    notifier: Arc<dyn Notifier>,
    language: String,
    cooldown: Option<Duration>,
    last_escalated: HashMap<AlertKind, DateTime<Utc>>,
}

impl EscalationPipeline {
    pub fn new(
        db: Database,
        advisor: AdvisoryClient,
        notifier: Arc<dyn Notifier>,
        language: String,
        cooldown: Option<Duration>,
    ) -> Self {
        Self {
            db,
            advisor,
            notifier,
            language,
            cooldown,
            last_escalated: HashMap::new(),
        }
    }

    /// Errors only when the alert row could not be written; the advisory
    /// step is skipped in that case.
    pub async fn escalate(
        &mut self,
        context: EscalationContext,
        now: DateTime<Utc>,
    ) -> Result<EscalationOutcome> {
        let kind = context.kind();

        if self.in_cooldown(kind, now) {
            log::info!("Suppressing repeat {} escalation within cooldown", kind.as_str());
            return Ok(EscalationOutcome::Suppressed);
        }

        let message = context.alert_message();
        log::warn!("Family alert: {message}");

        let alert = self
            .db
            .append_alert(NewAlert {
                timestamp: now,
                message,
                kind,
            })
            .await
            .with_context(|| format!("failed to record {} alert", kind.as_str()))?;
        self.last_escalated.insert(kind, now);

        let advice = self.advisor.consult(&context.advisory_prompt()).await;
        self.notifier.speak(&advice.text, &self.language);

        Ok(EscalationOutcome::Escalated { alert, advice })
    }

    fn in_cooldown(&self, kind: AlertKind, now: DateTime<Utc>) -> bool {
        let (Some(cooldown), Some(last)) = (self.cooldown, self.last_escalated.get(&kind)) else {
            return false;
        };
        // A negative elapsed time (clock stepped back) ends the cooldown.
        (now - *last)
            .to_std()
            .map(|elapsed| elapsed < cooldown)
            .unwrap_or(false)
    }
}
