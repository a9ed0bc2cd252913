use std::time::{Duration, Instant};

pub const DEFAULT_QUIET: Duration = Duration::from_millis(300);

/// A cancelable deferred value. Every [`Debouncer::arm`] replaces the pending
/// value and pushes the deadline out again; [`Debouncer::fire`] hands the
/// value back once, after the input has been quiet for the whole interval.
#[derive(Debug)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    pub fn arm(&mut self, value: T, now: Instant) {
        self.pending = Some((now + self.quiet, value));
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, value)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    pub fn fire(&mut self, now: Instant) -> Option<T> {
        match self.pending.as_ref() {
            Some((deadline, _)) if now >= *deadline => self.cancel(),
            _ => None,
        }
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET)
    }
}
