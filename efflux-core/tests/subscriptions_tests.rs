// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use efflux_core::{
    empty, from_action, unsubscribed, ActionSubscription, BooleanSubscription,
    CompositeSubscription, SerialSubscription, Subscription, SubscriptionRef,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_boolean_subscription_flips_once() {
    // Arrange
    let subscription = BooleanSubscription::new();
    assert!(!subscription.is_unsubscribed());

    // Act
    subscription.unsubscribe();
    subscription.unsubscribe();

    // Assert
    assert!(subscription.is_unsubscribed());
}

#[test]
fn test_action_subscription_runs_exactly_once() {
    // Arrange
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();
    let subscription = ActionSubscription::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    // Act
    subscription.unsubscribe();
    subscription.unsubscribe();

    // Assert
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert!(subscription.is_unsubscribed());
}

#[test]
fn test_composite_disposes_all_children() {
    // Arrange
    let composite = CompositeSubscription::new();
    let first = empty();
    let second = empty();
    composite.add(first.clone());
    composite.add(second.clone());

    // Act
    composite.unsubscribe();

    // Assert
    assert!(composite.is_unsubscribed());
    assert!(first.is_unsubscribed());
    assert!(second.is_unsubscribed());
    assert_eq!(composite.len(), 0);
}

#[test]
fn test_composite_add_after_unsubscribe_disposes_child_immediately() {
    // Arrange
    let composite = CompositeSubscription::new();
    composite.unsubscribe();
    let late = empty();

    // Act
    composite.add(late.clone());

    // Assert
    assert!(late.is_unsubscribed());
}

#[test]
fn test_composite_remove_disposes_only_that_child() {
    // Arrange
    let composite = CompositeSubscription::new();
    let kept = empty();
    let removed = empty();
    composite.add(kept.clone());
    composite.add(removed.clone());

    // Act
    composite.remove(&removed);

    // Assert
    assert!(removed.is_unsubscribed());
    assert!(!kept.is_unsubscribed());
    assert_eq!(composite.len(), 1);
}

#[test]
fn test_composite_clones_share_state() {
    // Arrange
    let composite = CompositeSubscription::new();
    let clone = composite.clone();
    let child = empty();
    clone.add(child.clone());

    // Act
    composite.unsubscribe();

    // Assert
    assert!(clone.is_unsubscribed());
    assert!(child.is_unsubscribed());
}

#[test]
fn test_serial_replacement_disposes_previous() {
    // Arrange
    let serial = SerialSubscription::new();
    let first = empty();
    let second = empty();

    // Act
    serial.set(first.clone());
    serial.set(second.clone());

    // Assert
    assert!(first.is_unsubscribed());
    assert!(!second.is_unsubscribed());
}

#[test]
fn test_serial_set_after_unsubscribe_disposes_new_child() {
    // Arrange
    let serial = SerialSubscription::new();
    serial.unsubscribe();
    let late = empty();

    // Act
    serial.set(late.clone());

    // Assert
    assert!(serial.is_unsubscribed());
    assert!(late.is_unsubscribed());
}

#[test]
fn test_helper_constructors() {
    // Arrange / Act
    let live: SubscriptionRef = empty();
    let dead: SubscriptionRef = unsubscribed();
    let ran = Arc::new(AtomicUsize::new(0));
    let counter = ran.clone();
    let action = from_action(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    // Assert
    assert!(!live.is_unsubscribed());
    assert!(dead.is_unsubscribed());
    action.unsubscribe();
    assert_eq!(ran.load(Ordering::SeqCst), 1);
}
