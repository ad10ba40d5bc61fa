#![forbid(unsafe_code)]

//! Runtime for hudmenu: timers, the render loop, async option tasks and
//! the [`MenuNavigator`] that ties menus to players.
//!
//! Two execution contexts touch menus:
//! - the host's tick ([`MenuNavigator::handle_key`], [`MenuNavigator::tick`]),
//!   which applies input and flushes cached markup to the display sink
//! - the fixed-rate render loop ([`MenuNavigator::start_render_loop`]),
//!   which recomputes markup and advances scrolling labels
//!
//! Async button handlers run on their own threads and report back through
//! a channel drained on the next tick.

pub mod navigator;
pub mod render_loop;
pub mod scheduler;
pub mod task;

pub use navigator::{MenuNavigator, NavigatorHook};
pub use render_loop::{RenderLoop, frame_interval};
pub use scheduler::{Callback, ManualScheduler, RepeatCallback, Scheduler, ThreadScheduler};
pub use task::{TaskCompletion, TaskFault};
