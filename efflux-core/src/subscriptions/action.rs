// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::subscriptions::Subscription;
use parking_lot::Mutex;

type Action = Box<dyn FnOnce() + Send>;

/// A subscription that runs a cleanup action exactly once.
///
/// The action is taken out under the lock and invoked after the lock is
/// released, so a cleanup that re-enters subscription machinery cannot
/// deadlock.
pub struct ActionSubscription {
    action: Mutex<Option<Action>>,
}

impl ActionSubscription {
    /// Wrap the cleanup to run on unsubscribe.
    pub fn new<F>(action: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            action: Mutex::new(Some(Box::new(action))),
        }
    }
}

impl Subscription for ActionSubscription {
    fn unsubscribe(&self) {
        let action = self.action.lock().take();
        if let Some(action) = action {
            action();
        }
    }

    fn is_unsubscribed(&self) -> bool {
        self.action.lock().is_none()
    }
}
