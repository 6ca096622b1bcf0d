use crate::UtcDateTime;

/// Source of "now" for a refresh run.
pub trait Clock: Send + Sync {
    fn now(&self) -> UtcDateTime;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> UtcDateTime {
        UtcDateTime::now()
    }
}

/// Clock frozen at a single instant, for reproducible runs and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(UtcDateTime);

impl FixedClock {
    pub const fn new(at: UtcDateTime) -> Self {
        Self(at)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> UtcDateTime {
        self.0
    }
}
