#![forbid(unsafe_code)]

//! Fixed-rate render pass.

use std::sync::Arc;
use std::time::Duration;

use hudmenu_core::TimerHandle;

use crate::scheduler::{RepeatCallback, Scheduler};

/// Period for `rate_hz` frames per second; zero is treated as one.
#[must_use]
pub fn frame_interval(rate_hz: u32) -> Duration {
    Duration::from_secs(1) / rate_hz.max(1)
}

/// A running render loop. Stops when dropped.
#[derive(Debug)]
pub struct RenderLoop {
    handle: TimerHandle,
    interval: Duration,
}

impl RenderLoop {
    /// Start calling `frame` at `rate_hz` on `scheduler`.
    pub fn start(scheduler: &dyn Scheduler, rate_hz: u32, frame: RepeatCallback) -> Self {
        let interval = frame_interval(rate_hz);
        let handle = scheduler.every(interval, frame);
        tracing::debug!(timer = handle.id(), ?interval, "render loop started");
        Self { handle, interval }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.handle.is_cancelled()
    }

    pub fn stop(&self) {
        if self.is_running() {
            self.handle.cancel();
            tracing::debug!(timer = self.handle.id(), "render loop stopped");
        }
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Adapt a plain closure into a [`RepeatCallback`].
pub fn frame_callback(f: impl Fn() + Send + Sync + 'static) -> RepeatCallback {
    Arc::new(f)
}
