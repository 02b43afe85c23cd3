// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

#![allow(clippy::multiple_crate_versions)]

//! Schedulers for efflux reactive streams.
//!
//! A scheduler decides where and when a unit of work runs. The library
//! itself never spawns threads outside a scheduler; time- and
//! concurrency-aware operators (`observe_on`, `subscribe_on`, `sample`,
//! time-based `buffer`) take a [`SchedulerRef`] argument.
//!
//! ## Factories
//!
//! - [`immediate()`]: caller thread, synchronous.
//! - [`trampoline()`]: caller thread, queued to avoid reentrancy.
//! - [`new_thread()`]: one OS thread per unit of work.
//! - [`computation()`]: process-wide fixed pool, one worker per core.
//! - [`io()`]: process-wide cached unbounded pool.
//! - [`test()`]: virtual clock advanced manually.

mod immediate;
mod io_pool;
mod logging;
mod new_thread;
mod scheduler;
mod test_scheduler;
mod thread_pool;
mod trampoline;

pub use immediate::ImmediateScheduler;
pub use io_pool::IoScheduler;
pub use new_thread::NewThreadScheduler;
pub use scheduler::{schedule_periodic, Job, Scheduler, SchedulerRef};
pub use test_scheduler::TestScheduler;
pub use thread_pool::ThreadPoolScheduler;
pub use trampoline::TrampolineScheduler;

use std::sync::{Arc, OnceLock};

/// Caller-thread scheduler that runs work synchronously.
#[must_use]
pub fn immediate() -> SchedulerRef {
    Arc::new(ImmediateScheduler::new())
}

/// Caller-thread scheduler that trampolines recursive scheduling.
#[must_use]
pub fn trampoline() -> SchedulerRef {
    Arc::new(TrampolineScheduler::new())
}

/// One dedicated OS thread per unit of work.
#[must_use]
pub fn new_thread() -> SchedulerRef {
    Arc::new(NewThreadScheduler::new())
}

/// The process-wide fixed pool, sized by CPU count.
#[must_use]
pub fn computation() -> SchedulerRef {
    static POOL: OnceLock<SchedulerRef> = OnceLock::new();
    POOL.get_or_init(|| Arc::new(ThreadPoolScheduler::new()))
        .clone()
}

/// The process-wide cached unbounded pool for io-bound work.
#[must_use]
pub fn io() -> SchedulerRef {
    static POOL: OnceLock<SchedulerRef> = OnceLock::new();
    POOL.get_or_init(|| Arc::new(IoScheduler::new())).clone()
}

/// A fresh virtual-time scheduler for deterministic tests.
#[must_use]
pub fn test() -> TestScheduler {
    TestScheduler::new()
}
