// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::subscriptions::Subscription;
use std::sync::atomic::{AtomicBool, Ordering};

/// The simplest subscription: an atomic flag.
///
/// Producers typically hold one of these and check
/// [`is_unsubscribed`](Subscription::is_unsubscribed) between emissions to
/// stop early once the consumer has cancelled.
#[derive(Debug, Default)]
pub struct BooleanSubscription {
    unsubscribed: AtomicBool,
}

impl BooleanSubscription {
    /// A subscription that is still live.
    #[must_use]
    pub fn new() -> Self {
        Self {
            unsubscribed: AtomicBool::new(false),
        }
    }
}

impl Subscription for BooleanSubscription {
    fn unsubscribe(&self) {
        self.unsubscribed.store(true, Ordering::Release);
    }

    fn is_unsubscribed(&self) -> bool {
        self.unsubscribed.load(Ordering::Acquire)
    }
}
