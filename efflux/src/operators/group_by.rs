// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::observable::Observable;
use crate::subjects::{ReplaySubject, Subject};
use crate::subscriber::Subscriber;
use efflux_core::{EffluxError, Observer, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// One group produced by `group_by`: a key plus the observable of the
/// values that mapped to it.
pub struct GroupedObservable<K, T> {
    key: K,
    observable: Observable<T>,
}

impl<K, T> GroupedObservable<K, T> {
    /// The group's key.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// The group's value stream. Values are buffered, so the group can be
    /// subscribed after later upstream values have already arrived.
    pub fn observable(&self) -> Observable<T> {
        self.observable.clone()
    }
}

type KeySelector<T, K> = Arc<dyn Fn(&T) -> Result<K> + Send + Sync>;

struct GroupByStage<K, T>
where
    K: Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    child: Subscriber<GroupedObservable<K, T>>,
    selector: KeySelector<T, K>,
    groups: Mutex<HashMap<K, ReplaySubject<T>>>,
}

impl<K, T> GroupByStage<K, T>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn terminate_groups<F>(&self, deliver: F)
    where
        F: Fn(&ReplaySubject<T>) -> Result<()>,
    {
        let groups: Vec<ReplaySubject<T>> =
            self.groups.lock().drain().map(|(_, subject)| subject).collect();
        for subject in groups {
            let _ = deliver(&subject);
        }
    }
}

impl<K, T> Observer<T> for GroupByStage<K, T>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn on_next(&self, value: T) -> Result<()> {
        let key = match (self.selector)(&value) {
            Ok(key) => key,
            Err(err) => {
                self.terminate_groups(|subject| subject.on_error(err.clone()));
                return self.child.on_error(err);
            }
        };

        let (subject, opened) = {
            let mut groups = self.groups.lock();
            match groups.get(&key) {
                Some(subject) => (subject.clone(), false),
                None => {
                    let subject = ReplaySubject::unbounded();
                    groups.insert(key.clone(), subject.clone());
                    (subject, true)
                }
            }
        };

        if opened {
            self.child.on_next(GroupedObservable {
                key,
                observable: subject.observable(),
            })?;
        }
        subject.on_next(value)
    }

    fn on_error(&self, err: EffluxError) -> Result<()> {
        self.terminate_groups(|subject| subject.on_error(err.clone()));
        self.child.on_error(err)
    }

    fn on_completed(&self) -> Result<()> {
        self.terminate_groups(|subject| subject.on_completed());
        self.child.on_completed()
    }

    fn is_safe(&self) -> bool {
        true
    }
}

pub(crate) fn group_by<T, K, F>(
    source: &Observable<T>,
    key_selector: F,
) -> Observable<GroupedObservable<K, T>>
where
    T: Clone + Send + Sync + 'static,
    K: Clone + Eq + Hash + Send + Sync + 'static,
    F: Fn(&T) -> Result<K> + Send + Sync + 'static,
{
    let source = source.clone();
    let selector: KeySelector<T, K> = Arc::new(key_selector);
    Observable::new(move |child: &Subscriber<GroupedObservable<K, T>>| {
        let stage = Arc::new(GroupByStage {
            child: child.clone(),
            selector: selector.clone(),
            groups: Mutex::new(HashMap::new()),
        });
        let parent = Subscriber::with_shared(stage, child.composite().clone());
        source.unsafe_subscribe(&parent)
    })
}
