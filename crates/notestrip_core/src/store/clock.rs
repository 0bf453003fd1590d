use std::time::{SystemTime, UNIX_EPOCH};

/// Source of creation timestamps, in Unix epoch milliseconds.
pub trait Clock: Send {
    fn now_epoch_ms(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }
}

impl<F> Clock for F
where
    F: Fn() -> i64 + Send,
{
    fn now_epoch_ms(&self) -> i64 {
        self()
    }
}
