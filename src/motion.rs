//! Inactivity detection.
//!
//! `MotionTracker` holds the last time movement was observed. It is shared
//! between the tick loop and whatever reports movement (the ingest server),
//! so it is a single atomic word rather than a locked struct. It is not
//! persisted: a restart starts the inactivity clock from zero.

use std::{
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
    time::Duration,
};

use chrono::{DateTime, TimeZone, Utc};

#[derive(Clone)]
pub struct MotionTracker {
    last_movement_ms: Arc<AtomicI64>,
}

impl MotionTracker {
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    pub fn starting_at(at: DateTime<Utc>) -> Self {
        Self {
            last_movement_ms: Arc::new(AtomicI64::new(at.timestamp_millis())),
        }
    }

    /// Live movement. Overwrites rather than maxes, so a wall clock that
    /// stepped backwards cannot leave the last movement stuck in the future.
    pub fn notify_movement(&self) {
        self.last_movement_ms
            .store(Utc::now().timestamp_millis(), Ordering::Release);
    }

    /// Never moves the clock backwards, so a late-delivered event cannot
    /// make the subject look idle.
    pub fn notify_movement_at(&self, at: DateTime<Utc>) {
        self.last_movement_ms
            .fetch_max(at.timestamp_millis(), Ordering::AcqRel);
    }

    pub fn last_movement(&self) -> DateTime<Utc> {
        let ms = self.last_movement_ms.load(Ordering::Acquire);
        Utc.timestamp_millis_opt(ms)
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl Default for MotionTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InactivityEvent {
    pub idle_for: Duration,
    pub threshold: Duration,
}

/// Stateless threshold check: once idle time passes the threshold, every tick
/// reports inactivity until movement is seen again.
pub struct MotionSource {
    tracker: MotionTracker,
    threshold: Duration,
}

impl MotionSource {
    pub fn new(tracker: MotionTracker, threshold: Duration) -> Self {
        Self { tracker, threshold }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn poll(&self, now: DateTime<Utc>) -> Option<InactivityEvent> {
        let idle_for = (now - self.tracker.last_movement())
            .to_std()
            .unwrap_or(Duration::ZERO);

        (idle_for > self.threshold).then_some(InactivityEvent {
            idle_for,
            threshold: self.threshold,
        })
    }

    pub fn check_inactivity(&self, now: DateTime<Utc>) -> bool {
        self.poll(now).is_some()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;

    use super::*;

    const THRESHOLD: Duration = Duration::from_secs(300);

    #[test]
    fn fires_only_past_the_threshold() {
        let now = Utc::now();

        let idle = MotionSource::new(
            MotionTracker::starting_at(now - ChronoDuration::seconds(301)),
            THRESHOLD,
        );
        assert!(idle.check_inactivity(now));

        let recent = MotionSource::new(
            MotionTracker::starting_at(now - ChronoDuration::seconds(299)),
            THRESHOLD,
        );
        assert!(!recent.check_inactivity(now));

        let exact = MotionSource::new(
            MotionTracker::starting_at(now - ChronoDuration::seconds(300)),
            THRESHOLD,
        );
        assert!(!exact.check_inactivity(now));
    }

    #[test]
    fn keeps_firing_until_movement() {
        let start = Utc::now();
        let tracker = MotionTracker::starting_at(start);
        let source = MotionSource::new(tracker.clone(), THRESHOLD);

        let later = start + ChronoDuration::seconds(400);
        assert!(source.check_inactivity(later));
        assert!(source.check_inactivity(later + ChronoDuration::seconds(60)));

        tracker.notify_movement_at(later + ChronoDuration::seconds(61));
        assert!(!source.check_inactivity(later + ChronoDuration::seconds(120)));
    }

    #[test]
    fn stale_movement_does_not_rewind() {
        let now = Utc::now();
        let tracker = MotionTracker::starting_at(now);
        tracker.notify_movement_at(now - ChronoDuration::seconds(600));
        assert_eq!(tracker.last_movement().timestamp_millis(), now.timestamp_millis());
    }

    #[test]
    fn live_movement_recovers_from_future_timestamp() {
        let tracker = MotionTracker::starting_at(Utc::now() + ChronoDuration::hours(1));
        let source = MotionSource::new(tracker.clone(), THRESHOLD);

        tracker.notify_movement();
        assert!(tracker.last_movement() <= Utc::now());
        assert!(source.check_inactivity(Utc::now() + ChronoDuration::seconds(301)));
    }

    #[test]
    fn movement_from_another_thread_is_seen() {
        let start = Utc::now() - ChronoDuration::seconds(1_000);
        let tracker = MotionTracker::starting_at(start);
        let source = MotionSource::new(tracker.clone(), THRESHOLD);

        std::thread::spawn(move || tracker.notify_movement())
            .join()
            .unwrap();

        assert!(!source.check_inactivity(Utc::now()));
    }
}
