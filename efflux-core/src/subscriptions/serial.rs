// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::subscriptions::{Subscription, SubscriptionRef};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Default)]
struct SerialState {
    unsubscribed: bool,
    current: Option<SubscriptionRef>,
}

/// A subscription holding at most one child at a time.
///
/// Replacing the child disposes the previous one; setting a child on an
/// already-unsubscribed serial disposes the new child instead. Used by
/// operators that re-subscribe over time (`switch_on_next`, periodic
/// scheduling, `on_error_resume_next`).
#[derive(Clone, Default)]
pub struct SerialSubscription {
    state: Arc<Mutex<SerialState>>,
}

impl SerialSubscription {
    /// A live serial subscription holding no child.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current child.
    pub fn set(&self, subscription: SubscriptionRef) {
        let to_dispose = {
            let mut state = self.state.lock();
            if state.unsubscribed {
                Some(subscription)
            } else {
                state.current.replace(subscription)
            }
        };
        if let Some(previous) = to_dispose {
            previous.unsubscribe();
        }
    }

    /// Type-erased shared handle to this serial.
    #[must_use]
    pub fn handle(&self) -> SubscriptionRef {
        Arc::new(self.clone())
    }
}

impl Subscription for SerialSubscription {
    fn unsubscribe(&self) {
        let current = {
            let mut state = self.state.lock();
            state.unsubscribed = true;
            state.current.take()
        };
        if let Some(current) = current {
            current.unsubscribe();
        }
    }

    fn is_unsubscribed(&self) -> bool {
        self.state.lock().unsubscribed
    }
}
