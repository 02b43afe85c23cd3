// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::observable::Observable;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A value tagged with the wall-clock instant it passed the
/// `timestamp` stage, as a duration since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamped<T> {
    /// When the value passed through.
    pub timestamp: Duration,
    /// The value itself.
    pub value: T,
}

impl<T> Timestamped<T> {
    /// Tag a value with an explicit timestamp.
    pub const fn new(timestamp: Duration, value: T) -> Self {
        Self { timestamp, value }
    }

    /// Discard the timestamp.
    pub fn into_value(self) -> T {
        self.value
    }
}

pub(crate) fn timestamp<T>(source: &Observable<T>) -> Observable<Timestamped<T>>
where
    T: Send + Sync + 'static,
{
    source.map(|value| {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Ok(Timestamped::new(now, value))
    })
}
