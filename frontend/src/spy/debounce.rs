//! Timestamp-driven debounce.
//!
//! The host owns the actual timer: after every [`Debounced::push`] it should
//! (re)schedule a wake-up at [`Debounced::deadline`] and call
//! [`Debounced::poll`] when it fires. Timestamps are milliseconds on any
//! monotonic clock (`performance.now()` in the browser).

/// Holds a value back until it has been stable for a quiet period
#[derive(Debug, Clone)]
pub struct Debounced<T> {
    quiet_ms: f64,
    pending: Option<(T, f64)>,
    settled: Option<T>,
}

impl<T: Clone + PartialEq> Debounced<T> {
    pub fn new(quiet_ms: u32) -> Self {
        Self {
            quiet_ms: f64::from(quiet_ms),
            pending: None,
            settled: None,
        }
    }

    /// Record a new value, replacing any pending one and restarting the
    /// quiet period. Returns the new deadline.
    pub fn push(&mut self, value: T, now: f64) -> f64 {
        let deadline = now + self.quiet_ms;
        self.pending = Some((value, deadline));
        deadline
    }

    /// Commit the pending value if its quiet period has elapsed.
    /// Returns the newly settled value, if any.
    pub fn poll(&mut self, now: f64) -> Option<&T> {
        match &self.pending {
            Some((_, deadline)) if now >= *deadline => {}
            _ => return None,
        }
        let (value, _) = self.pending.take()?;
        if self.settled.as_ref() == Some(&value) {
            return None;
        }
        self.settled = Some(value);
        self.settled.as_ref()
    }

    pub fn deadline(&self) -> Option<f64> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn settled(&self) -> Option<&T> {
        self.settled.as_ref()
    }

    /// Drop the pending value without committing it
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
