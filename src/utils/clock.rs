use chrono::{DateTime, Local, NaiveDate};

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Current instant in the process's local timezone
    fn now(&self) -> DateTime<Local>;

    /// Local civil date of `now()`
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock frozen at a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}
