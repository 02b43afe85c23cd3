// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::observable::Observable;
use crate::serialized::SerializedObserver;
use crate::subscriber::Subscriber;
use efflux_core::ObserverRef;
use std::sync::Arc;

// Serializes delivery so concurrent producers cannot interleave events
// to the downstream observer. The heavy lifting is the queue-drain
// emitter in `SerializedObserver`.
pub(crate) fn synchronize<T>(source: &Observable<T>) -> Observable<T>
where
    T: Send + Sync + 'static,
{
    let source = source.clone();
    Observable::new(move |child: &Subscriber<T>| {
        let serialized = Arc::new(SerializedObserver::new(
            Arc::new(child.clone()) as ObserverRef<T>
        ));
        let parent = Subscriber::with_shared(serialized, child.composite().clone());
        source.unsafe_subscribe(&parent)
    })
}
