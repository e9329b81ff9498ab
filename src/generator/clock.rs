//! Batch timestamp sources

use std::fmt;
use std::sync::atomic::{AtomicI32, Ordering};

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

/// Source of the batch start timestamp.
///
/// The generator reads the clock once per batch; every statement of that
/// batch carries the same instant. A split run reads it once per range.
pub trait Clock: fmt::Debug + Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }

    /// Interpret a naive timestamp as UTC
    pub fn at(timestamp: NaiveDateTime) -> Self {
        Self::new(timestamp.and_utc())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}

/// Advances by a fixed step on every read, starting at `start`
#[derive(Debug)]
pub struct IncrementalClock {
    start: DateTime<Utc>,
    step: Duration,
    reads: AtomicI32,
}

impl IncrementalClock {
    pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            start,
            step,
            reads: AtomicI32::new(0),
        }
    }

    /// Interpret a naive timestamp as UTC
    pub fn at(start: NaiveDateTime, step: Duration) -> Self {
        Self::new(start.and_utc(), step)
    }
}

impl Clock for IncrementalClock {
    fn now(&self) -> DateTime<Utc> {
        let n = self.reads.fetch_add(1, Ordering::Relaxed);
        self.start + self.step * n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_fixed_clock() {
        let ts = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let clock = FixedClock::at(ts);
        assert_eq!(clock.now().naive_utc(), ts);
        assert_eq!(clock.now(), clock.now());
    }

    #[test]
    fn test_incremental_clock() {
        let ts = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let clock = IncrementalClock::at(ts, Duration::seconds(1));
        assert_eq!(clock.now().naive_utc(), ts);
        assert_eq!(clock.now().naive_utc(), ts + Duration::seconds(1));
        assert_eq!(clock.now().naive_utc(), ts + Duration::seconds(2));
    }
}
