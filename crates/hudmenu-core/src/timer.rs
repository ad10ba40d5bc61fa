#![forbid(unsafe_code)]

//! Cancellable handles for scheduled callbacks.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

static NEXT_TIMER_ID: AtomicU64 = AtomicU64::new(1);

/// Shared cancellation flag for one scheduled callback.
///
/// Clones observe the same flag. Cancelling wakes any thread parked in
/// [`TimerHandle::wait_cancelled`], which is how thread-backed schedulers
/// sleep until their deadline.
#[derive(Clone)]
pub struct TimerHandle {
    id: u64,
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl TimerHandle {
    /// A fresh, armed handle with a process-unique id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_TIMER_ID.fetch_add(1, Ordering::Relaxed),
            inner: Arc::new((Mutex::new(false), Condvar::new())),
        }
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Cancel the callback. Idempotent.
    pub fn cancel(&self) {
        let (lock, cvar) = &*self.inner;
        let mut cancelled = lock.lock();
        if !*cancelled {
            *cancelled = true;
            tracing::trace!(timer = self.id, "timer cancelled");
        }
        cvar.notify_all();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock()
    }

    /// Block for up to `timeout`, returning `true` if cancelled meanwhile.
    pub fn wait_cancelled(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let deadline = Instant::now() + timeout;
        let mut cancelled = lock.lock();
        while !*cancelled {
            if cvar.wait_until(&mut cancelled, deadline).timed_out() {
                break;
            }
        }
        *cancelled
    }
}

impl Default for TimerHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerHandle")
            .field("id", &self.id)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

impl PartialEq for TimerHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TimerHandle {}
