use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Millisecond wall clock. Injected so timing can be driven by tests.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: AtomicI64::new(start_ms),
        }
    }

    pub fn advance(&self, ms: i64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: i64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// A single cancellable delayed value.
///
/// `schedule` replaces whatever was pending; `poll` hands the value back once
/// `delay_ms` has passed since it was scheduled.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay_ms: i64,
    pending: Option<(T, i64)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay_ms: i64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub fn schedule(&mut self, value: T, now_ms: i64) {
        self.pending = Some((value, now_ms + self.delay_ms));
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|(value, _)| value)
    }

    pub fn poll(&mut self, now_ms: i64) -> Option<T> {
        match self.pending {
            Some((_, due)) if now_ms >= due => self.cancel(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_quiet_window() {
        let mut d = Debouncer::new(300);
        d.schedule("a", 0);
        assert_eq!(d.poll(299), None);
        assert_eq!(d.poll(300), Some("a"));
        assert!(!d.is_pending());
        assert_eq!(d.poll(1000), None);
    }

    #[test]
    fn test_later_schedule_cancels_earlier() {
        let mut d = Debouncer::new(300);
        d.schedule("a", 0);
        d.schedule("ab", 200);
        assert_eq!(d.poll(300), None);
        assert_eq!(d.pending(), Some(&"ab"));
        assert_eq!(d.poll(500), Some("ab"));
    }

    #[test]
    fn test_cancel() {
        let mut d = Debouncer::new(300);
        d.schedule(1, 0);
        assert_eq!(d.cancel(), Some(1));
        assert_eq!(d.poll(10_000), None);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(100);
        clock.advance(50);
        assert_eq!(clock.now_ms(), 150);
        clock.set(7);
        assert_eq!(clock.now_ms(), 7);
    }
}
