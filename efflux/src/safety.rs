// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! The safety wrapper enforcing the emission grammar.
//!
//! Every public subscribe wraps the user observer in a [`SafeObserver`]
//! bound to the execution's subscription. Whatever the raw producer does,
//! the wrapped observer sees `on_next* (on_completed | on_error)?` and
//! nothing after unsubscription:
//!
//! - values after a terminal event or cancellation are dropped;
//! - a consumer fault in `on_next` becomes `on_error` on the same observer;
//! - a second terminal error is routed to the process-wide error hook;
//! - a missing error handler, or a handler that itself fails, is reported
//!   to the hook and then propagated out of the emitting thread as a
//!   panic, which is how a thrown-through error surfaces in Rust.

use crate::logging::error;
use efflux_core::hooks::hooks;
use efflux_core::{EffluxError, Observer, ObserverRef, Result, Subscription, SubscriptionRef};
use std::sync::atomic::{AtomicBool, Ordering};

/// Grammar-enforcing wrapper bound to one subscription.
pub struct SafeObserver<T> {
    actual: ObserverRef<T>,
    subscription: SubscriptionRef,
    terminated: AtomicBool,
}

impl<T> SafeObserver<T> {
    /// Wrap an observer, tying terminal events to the given subscription.
    #[must_use]
    pub fn new(actual: ObserverRef<T>, subscription: SubscriptionRef) -> Self {
        Self {
            actual,
            subscription,
            terminated: AtomicBool::new(false),
        }
    }

    fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    // Returns true exactly once.
    fn try_terminate(&self) -> bool {
        !self.terminated.swap(true, Ordering::AcqRel)
    }
}

impl<T: Send + Sync> Observer<T> for SafeObserver<T> {
    fn on_next(&self, value: T) -> Result<()> {
        if self.is_terminated() || self.subscription.is_unsubscribed() {
            return Ok(());
        }
        if let Err(fault) = self.actual.on_next(value) {
            // Consumer fault: terminate the sequence with it.
            return self.on_error(fault);
        }
        Ok(())
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        if !self.try_terminate() {
            hooks().handle_error(&err);
            return Ok(());
        }
        // Upstream is disposed before the handler runs, so a handler that
        // blocks cannot keep the producer alive.
        self.subscription.unsubscribe();
        // The handler gets the original; the clone is only for the
        // secondary-fault report.
        let retained = err.clone();
        if let Err(secondary) = self.actual.on_error(err) {
            if secondary.is_unhandled() {
                hooks().handle_error(&secondary);
                panic!("{secondary}");
            }
            let combined = EffluxError::composite(vec![retained, secondary]);
            hooks().handle_error(&combined);
            panic!("error handler failed: {combined}");
        }
        Ok(())
    }

    fn on_completed(&self) -> Result<()> {
        if !self.try_terminate() {
            return Ok(());
        }
        self.subscription.unsubscribe();
        if let Err(fault) = self.actual.on_completed() {
            error!("completion handler failed: {fault}");
            hooks().handle_error(&fault);
        }
        Ok(())
    }

    fn is_safe(&self) -> bool {
        true
    }
}
