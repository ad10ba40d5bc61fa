#![forbid(unsafe_code)]

//! Off-thread execution of async button handlers.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::{Arc, Weak};
use std::thread;

use hudmenu_widgets::{AsyncJob, Menu};

/// A handler panicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFault {
    pub message: String,
}

impl TaskFault {
    fn from_panic(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_owned()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_owned()
        };
        Self { message }
    }
}

impl fmt::Display for TaskFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "async handler panicked: {}", self.message)
    }
}

impl std::error::Error for TaskFault {}

/// Posted back to the navigator when a handler returns or panics.
pub struct TaskCompletion {
    pub menu: Weak<Menu>,
    pub job: AsyncJob,
    pub outcome: Result<(), TaskFault>,
}

impl fmt::Debug for TaskCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskCompletion")
            .field("job", &self.job)
            .field("outcome", &self.outcome)
            .finish_non_exhaustive()
    }
}

/// Run `job` on its own thread and report through `sender`.
///
/// The loading flag is cleared here when nobody is left to receive the
/// completion, and also when the thread cannot be spawned.
pub(crate) fn spawn(job: AsyncJob, menu: &Arc<Menu>, sender: mpsc::Sender<TaskCompletion>) {
    let menu = Arc::downgrade(menu);
    let player = job.player();
    let option = job.option().id();
    tracing::debug!(%player, %option, "async task spawned");

    let (tx, rx) = mpsc::sync_channel::<AsyncJob>(1);
    let spawned = thread::Builder::new()
        .name("hudmenu-task".into())
        .spawn(move || {
            let Ok(job) = rx.recv() else {
                return;
            };
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| job.run()))
                .map_err(|payload| TaskFault::from_panic(payload.as_ref()));
            if let Err(fault) = &outcome {
                tracing::error!(%player, %option, fault = %fault.message, "async task panicked");
            }
            let completion = TaskCompletion { menu, job, outcome };
            if let Err(mpsc::SendError(orphan)) = sender.send(completion) {
                orphan.job.finish();
            }
        });

    match spawned {
        Ok(_) => {
            if let Err(mpsc::SendError(job)) = tx.send(job) {
                job.finish();
            }
        }
        Err(err) => {
            tracing::error!(%player, %option, error = %err, "failed to spawn async task");
            job.finish();
        }
    }
}
