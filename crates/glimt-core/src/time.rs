//! Clock abstraction for event timestamping.
//!
//! The facade stamps every envelope through an injected [`Clock`] so tests
//! can control time deterministically. Production code uses [`SystemClock`].

use std::sync::{
    atomic::{AtomicI64, Ordering},
    Arc,
};

use chrono::{DateTime, Duration, TimeZone, Utc};

/// Source of wall-clock timestamps.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Returns the current wall-clock time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Creates a new system clock.
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Test clock with controllable time progression.
///
/// Stores time as nanoseconds since the epoch so clones share one
/// underlying instant and advancing is race-free.
#[derive(Debug, Clone)]
pub struct TestClock {
    nanos: Arc<AtomicI64>,
}

impl TestClock {
    /// Creates a test clock starting at the current system time.
    pub fn new() -> Self {
        Self::starting_at(Utc::now())
    }

    /// Creates a test clock starting at a specific time.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self { nanos: Arc::new(AtomicI64::new(start.timestamp_nanos_opt().unwrap_or(0))) }
    }

    /// Advances the clock by the given duration.
    pub fn advance(&self, by: Duration) {
        self.nanos.fetch_add(by.num_nanoseconds().unwrap_or(0), Ordering::AcqRel);
    }

    /// Jumps the clock to a specific time.
    pub fn set(&self, to: DateTime<Utc>) {
        self.nanos.store(to.timestamp_nanos_opt().unwrap_or(0), Ordering::Release);
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TestClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_nanos(self.nanos.load(Ordering::Acquire))
    }
}
