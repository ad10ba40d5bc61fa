#![forbid(unsafe_code)]

//! Delayed and repeating callbacks.
//!
//! [`ThreadScheduler`] parks one thread per timer on the timer's
//! [`TimerHandle`], so cancelling wakes it immediately. [`ManualScheduler`]
//! keeps a virtual clock that tests move forward explicitly.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use hudmenu_core::TimerHandle;
use parking_lot::Mutex;

/// One-shot callback.
pub type Callback = Box<dyn FnOnce() + Send + 'static>;
/// Callback fired on every period of a repeating timer.
pub type RepeatCallback = Arc<dyn Fn() + Send + Sync + 'static>;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Source of timers for auto-close and the render loop.
pub trait Scheduler: Send + Sync {
    /// Run `callback` once after `delay` unless `handle` is cancelled first.
    fn schedule(&self, handle: TimerHandle, delay: Duration, callback: Callback);

    /// Run `callback` every `interval` until the returned handle is cancelled.
    fn every(&self, interval: Duration, callback: RepeatCallback) -> TimerHandle;

    /// [`Scheduler::schedule`] with a fresh handle.
    fn after(&self, delay: Duration, callback: Callback) -> TimerHandle {
        let handle = TimerHandle::new();
        self.schedule(handle.clone(), delay, callback);
        handle
    }
}

/// Scheduler backed by OS threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadScheduler;

impl ThreadScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Scheduler for ThreadScheduler {
    fn schedule(&self, handle: TimerHandle, delay: Duration, callback: Callback) {
        let timer = handle.clone();
        let spawned = thread::Builder::new()
            .name("hudmenu-timer".into())
            .spawn(move || {
                if !timer.wait_cancelled(delay) {
                    callback();
                }
            });
        if let Err(err) = spawned {
            tracing::error!(timer = handle.id(), error = %err, "failed to spawn timer thread");
            handle.cancel();
        }
    }

    fn every(&self, interval: Duration, callback: RepeatCallback) -> TimerHandle {
        let handle = TimerHandle::new();
        let timer = handle.clone();
        let interval = interval.max(MIN_INTERVAL);
        let spawned = thread::Builder::new()
            .name("hudmenu-every".into())
            .spawn(move || {
                let mut ticks: u64 = 0;
                tracing::debug!(timer = timer.id(), ?interval, "repeating timer started");
                while !timer.wait_cancelled(interval) {
                    ticks += 1;
                    callback();
                }
                tracing::debug!(timer = timer.id(), ticks, "repeating timer stopped");
            });
        if let Err(err) = spawned {
            tracing::error!(timer = handle.id(), error = %err, "failed to spawn repeating timer");
            handle.cancel();
        }
        handle
    }
}

enum Job {
    Once(Callback),
    Repeat {
        interval: Duration,
        callback: RepeatCallback,
    },
}

struct Pending {
    due: Duration,
    seq: u64,
    handle: TimerHandle,
    job: Job,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    seq: u64,
    pending: Vec<Pending>,
}

/// Deterministic scheduler driven by [`ManualScheduler::advance`].
///
/// Callbacks run on the thread calling `advance`, in due order (ties in
/// scheduling order), without any internal lock held, so they may
/// schedule further timers.
#[derive(Default)]
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time since creation.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.state.lock().now
    }

    /// Timers that are armed and not yet fired.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.state
            .lock()
            .pending
            .iter()
            .filter(|p| !p.handle.is_cancelled())
            .count()
    }

    /// Move the clock forward by `by`, firing everything that falls due.
    /// Returns how many callbacks ran.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.state.lock().now + by;
        let mut fired = 0;
        loop {
            let next = {
                let mut state = self.state.lock();
                state.pending.retain(|p| !p.handle.is_cancelled());
                let earliest = state
                    .pending
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| p.due <= target)
                    .min_by_key(|(_, p)| (p.due, p.seq))
                    .map(|(i, _)| i);
                match earliest {
                    Some(index) => {
                        let pending = state.pending.swap_remove(index);
                        state.now = state.now.max(pending.due);
                        Some(pending)
                    }
                    None => {
                        state.now = target;
                        None
                    }
                }
            };
            let Some(pending) = next else {
                break;
            };
            fired += 1;
            match pending.job {
                Job::Once(callback) => callback(),
                Job::Repeat { interval, callback } => {
                    callback();
                    let mut state = self.state.lock();
                    let seq = state.seq;
                    state.seq += 1;
                    state.pending.push(Pending {
                        due: pending.due + interval,
                        seq,
                        handle: pending.handle,
                        job: Job::Repeat { interval, callback },
                    });
                }
            }
        }
        fired
    }

    fn push(&self, handle: TimerHandle, delay: Duration, job: Job) {
        let mut state = self.state.lock();
        let seq = state.seq;
        state.seq += 1;
        let due = state.now + delay;
        state.pending.push(Pending {
            due,
            seq,
            handle,
            job,
        });
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, handle: TimerHandle, delay: Duration, callback: Callback) {
        self.push(handle, delay, Job::Once(callback));
    }

    fn every(&self, interval: Duration, callback: RepeatCallback) -> TimerHandle {
        let handle = TimerHandle::new();
        let interval = interval.max(MIN_INTERVAL);
        self.push(handle.clone(), interval, Job::Repeat { interval, callback });
        handle
    }
}
