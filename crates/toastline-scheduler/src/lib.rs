//! Toast scheduler runtime entry point and public API surface.
//!
//! This crate owns the scheduler lifecycle: it queues toast requests, shows
//! them one at a time once the shared blocker registry allows it, dismisses
//! them on timeout, swipe or action tap, and keeps the toast blocker through
//! the exit animation before moving on.

mod app;
mod callbacks;
pub mod config;
mod queue;
mod runtime;
mod scheduler;
mod state;

pub use crate::runtime::{SchedulerError, run, spawn, spawn_with_timer};
