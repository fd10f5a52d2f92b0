use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::db::{Database, HealthLogEntry, NewHealthLog};

use super::{classifier::VitalsClassifier, sampler::VitalsSampler, VitalsSample};

#[derive(Debug, Clone)]
pub struct VitalsReading {
    pub sample: VitalsSample,
    pub is_critical: bool,
    pub log: HealthLogEntry,
}

/// Samples, classifies and records vitals. History is written for every
/// sample; escalation is left to the caller.
pub struct VitalsSource {
    sampler: Box<dyn VitalsSampler>,
    classifier: VitalsClassifier,
}

impl VitalsSource {
    pub fn new(sampler: Box<dyn VitalsSampler>, classifier: VitalsClassifier) -> Self {
        Self {
            sampler,
            classifier,
        }
    }

    /// `Ok(None)` when the sampler had nothing this tick. An error means the
    /// history row was not written.
    pub async fn poll(&mut self, db: &Database, now: DateTime<Utc>) -> Result<Option<VitalsReading>> {
        let Some(sample) = self.sampler.sample(now) else {
            log::debug!("No vitals sample available this tick");
            return Ok(None);
        };

        let is_critical = self.classifier.classify(
            sample.heart_rate,
            sample.systolic,
            sample.diastolic,
            sample.spo2,
        );

        let log = db
            .append_health_log(NewHealthLog {
                timestamp: sample.timestamp,
                heart_rate: sample.heart_rate,
                systolic: sample.systolic,
                diastolic: sample.diastolic,
                is_critical,
            })
            .await
            .with_context(|| {
                format!(
                    "failed to record vitals HR={} BP={}/{} SpO2={}",
                    sample.heart_rate, sample.systolic, sample.diastolic, sample.spo2
                )
            })?;

        log::info!(
            "Health: HR={}, BP={}/{}, SpO2={}, critical={}",
            sample.heart_rate,
            sample.systolic,
            sample.diastolic,
            sample.spo2,
            is_critical
        );

        Ok(Some(VitalsReading {
            sample,
            is_critical,
            log,
        }))
    }
}
