// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Subscription handles: the live connection between an observer and a
//! stream execution.
//!
//! Disposing a subscription cancels the connection. All implementations
//! are idempotent and thread-safe, and none holds its internal lock while
//! running cleanup actions or disposing children.
//!
//! ## Implementations
//!
//! - [`BooleanSubscription`]: flips an atomic flag.
//! - [`ActionSubscription`]: runs a cleanup closure exactly once.
//! - [`CompositeSubscription`]: aggregates children, disposes all at once.
//! - [`SerialSubscription`]: holds one child at a time, disposing the
//!   previous on replacement.

mod action;
mod boolean;
mod composite;
mod serial;

pub use action::ActionSubscription;
pub use boolean::BooleanSubscription;
pub use composite::CompositeSubscription;
pub use serial::SerialSubscription;

use std::sync::Arc;

/// A handle representing a live connection; disposing it cancels.
pub trait Subscription: Send + Sync {
    /// Cancel the connection. Idempotent.
    fn unsubscribe(&self);

    /// Whether the connection has been cancelled.
    fn is_unsubscribed(&self) -> bool;
}

/// Shared handle to a type-erased subscription.
pub type SubscriptionRef = Arc<dyn Subscription>;

/// A fresh no-op subscription whose only state is its own flag.
#[must_use]
pub fn empty() -> SubscriptionRef {
    Arc::new(BooleanSubscription::new())
}

/// A subscription that is already unsubscribed.
#[must_use]
pub fn unsubscribed() -> SubscriptionRef {
    let sub = BooleanSubscription::new();
    sub.unsubscribe();
    Arc::new(sub)
}

/// A subscription running the given cleanup exactly once.
#[must_use]
pub fn from_action<F>(action: F) -> SubscriptionRef
where
    F: FnOnce() + Send + 'static,
{
    Arc::new(ActionSubscription::new(action))
}
