use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// Stop request shared by the Ctrl+C handler, the keyboard monitor and the
/// capture loop.
///
/// The capture loop polls [`ShutdownSignal::as_atomic`] between frames;
/// other waits use [`ShutdownSignal::wait`] so they end as soon as a stop is
/// requested.
pub struct ShutdownSignal {
    requested: AtomicBool,
    condvar: Condvar,
    mutex: Mutex<()>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self {
            requested: AtomicBool::new(false),
            condvar: Condvar::new(),
            mutex: Mutex::new(()),
        }
    }

    pub fn trigger(&self) {
        self.requested.store(true, Ordering::SeqCst);
        self.condvar.notify_all();
    }

    pub fn is_shutdown(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Sleep for `duration` unless a stop is requested first.
    ///
    /// Returns `true` if the wait ended because of a stop request.
    pub fn wait(&self, duration: Duration) -> bool {
        if self.is_shutdown() {
            return true;
        }

        let Ok(guard) = self.mutex.lock() else {
            return true;
        };
        match self
            .condvar
            .wait_timeout_while(guard, duration, |_| !self.is_shutdown())
        {
            Ok((_, timeout)) => !timeout.timed_out(),
            // Poisoned
            Err(_) => true,
        }
    }

    /// The flag the capture scheduler checks.
    pub fn as_atomic(&self) -> &AtomicBool {
        &self.requested
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
