use chrono::{DateTime, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// SpO2 assumed when an ingestion producer does not report it.
pub const DEFAULT_SPO2: i64 = 98;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VitalsSample {
    pub timestamp: DateTime<Utc>,
    pub heart_rate: i64,
    pub systolic: i64,
    pub diastolic: i64,
    pub spo2: i64,
}

/// Produces at most one vitals sample per tick.
pub trait VitalsSampler: Send {
    fn sample(&mut self, now: DateTime<Utc>) -> Option<VitalsSample>;
}

/// Uniformly random vitals in a plausible resting range.
pub struct SimulatedVitals {
    rng: StdRng,
}

impl SimulatedVitals {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SimulatedVitals {
    fn default() -> Self {
        Self::new()
    }
}

impl VitalsSampler for SimulatedVitals {
    fn sample(&mut self, now: DateTime<Utc>) -> Option<VitalsSample> {
        Some(VitalsSample {
            timestamp: now,
            heart_rate: self.rng.gen_range(65..=110),
            systolic: self.rng.gen_range(110..=160),
            diastolic: self.rng.gen_range(70..=100),
            spo2: self.rng.gen_range(90..=100),
        })
    }
}

/// Body accepted by the ingestion endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestedReading {
    pub heart_rate: i64,
    pub bp_systolic: i64,
    pub bp_diastolic: i64,
    #[serde(default)]
    pub spo2: Option<i64>,
}

/// Publishing side of the ingestion feed. Only the latest reading is kept.
#[derive(Clone)]
pub struct IngestFeed {
    tx: watch::Sender<Option<IngestedReading>>,
}

impl IngestFeed {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    pub fn publish(&self, reading: IngestedReading) {
        self.tx.send_replace(Some(reading));
    }

    pub fn subscribe(&self) -> IngestedVitals {
        IngestedVitals {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for IngestFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// Samples the most recent ingested reading, once per new reading.
pub struct IngestedVitals {
    rx: watch::Receiver<Option<IngestedReading>>,
}

impl VitalsSampler for IngestedVitals {
    fn sample(&mut self, now: DateTime<Utc>) -> Option<VitalsSample> {
        if !self.rx.has_changed().unwrap_or(false) {
            return None;
        }

        let reading = (*self.rx.borrow_and_update())?;
        Some(VitalsSample {
            timestamp: now,
            heart_rate: reading.heart_rate,
            systolic: reading.bp_systolic,
            diastolic: reading.bp_diastolic,
            spo2: reading.spo2.unwrap_or(DEFAULT_SPO2),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_samples_stay_in_range() {
        let mut sampler = SimulatedVitals::with_seed(7);
        let now = Utc::now();
        for _ in 0..200 {
            let sample = sampler.sample(now).unwrap();
            assert!((65..=110).contains(&sample.heart_rate));
            assert!((110..=160).contains(&sample.systolic));
            assert!((70..=100).contains(&sample.diastolic));
            assert!((90..=100).contains(&sample.spo2));
        }
    }

    #[test]
    fn ingested_reading_is_sampled_once() {
        let feed = IngestFeed::new();
        let mut sampler = feed.subscribe();
        let now = Utc::now();

        assert_eq!(sampler.sample(now), None);

        feed.publish(IngestedReading {
            heart_rate: 88,
            bp_systolic: 130,
            bp_diastolic: 85,
            spo2: None,
        });

        let sample = sampler.sample(now).unwrap();
        assert_eq!(sample.heart_rate, 88);
        assert_eq!(sample.spo2, DEFAULT_SPO2);
        assert_eq!(sampler.sample(now), None);
    }
}
