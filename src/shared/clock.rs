//! Time source used to evaluate booking rules.
//!
//! Production code uses [`SystemClock`]; tests pin time with [`FixedClock`].

use std::sync::RwLock;

use chrono::{DateTime, Duration, DurationRound, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a settable instant.
#[derive(Debug)]
pub struct FixedClock {
    time: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(time: DateTime<Utc>) -> Self {
        Self {
            time: RwLock::new(time),
        }
    }

    pub fn set(&self, time: DateTime<Utc>) {
        if let Ok(mut t) = self.time.write() {
            *t = time;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut t) = self.time.write() {
            *t += by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.time.read() {
            Ok(t) => *t,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Drop seconds and sub-second precision.
pub fn truncate_to_minute(time: DateTime<Utc>) -> DateTime<Utc> {
    time.duration_trunc(Duration::minutes(1)).unwrap_or(time)
}
