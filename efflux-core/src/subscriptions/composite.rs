// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::subscriptions::{Subscription, SubscriptionRef};
use parking_lot::Mutex;
use std::sync::Arc;

// None = the composite itself has been unsubscribed.
type Children = Option<Vec<SubscriptionRef>>;

/// A subscription aggregating child subscriptions.
///
/// Cloning is cheap and every clone shares the same child registry, which
/// is how an operator chain links each stage's upstream subscription into
/// the one handle returned to the caller of `subscribe`.
///
/// Adding a child to an already-unsubscribed composite disposes the child
/// immediately. Children are always disposed from a drained snapshot, with
/// the registry lock released.
#[derive(Clone)]
pub struct CompositeSubscription {
    children: Arc<Mutex<Children>>,
}

impl CompositeSubscription {
    /// An empty, live composite.
    #[must_use]
    pub fn new() -> Self {
        Self {
            children: Arc::new(Mutex::new(Some(Vec::new()))),
        }
    }

    /// Add a child, disposing it immediately if the composite is already
    /// unsubscribed.
    pub fn add(&self, subscription: SubscriptionRef) {
        {
            let mut children = self.children.lock();
            if let Some(children) = children.as_mut() {
                children.push(subscription);
                return;
            }
        }
        subscription.unsubscribe();
    }

    /// Detach one child and dispose it.
    ///
    /// Children are identified by handle identity; removing a handle that
    /// was never added is a no-op.
    pub fn remove(&self, subscription: &SubscriptionRef) {
        let removed = {
            let mut children = self.children.lock();
            match children.as_mut() {
                Some(children) => {
                    let before = children.len();
                    children.retain(|c| !Arc::ptr_eq(c, subscription));
                    before != children.len()
                }
                None => false,
            }
        };
        if removed {
            subscription.unsubscribe();
        }
    }

    /// Number of currently registered children; zero once unsubscribed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.lock().as_ref().map_or(0, Vec::len)
    }

    /// Whether no children are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Type-erased shared handle to this composite.
    #[must_use]
    pub fn handle(&self) -> SubscriptionRef {
        Arc::new(self.clone())
    }
}

impl Subscription for CompositeSubscription {
    fn unsubscribe(&self) {
        let drained = self.children.lock().take();
        if let Some(children) = drained {
            for child in children {
                child.unsubscribe();
            }
        }
    }

    fn is_unsubscribed(&self) -> bool {
        self.children.lock().is_none()
    }
}
