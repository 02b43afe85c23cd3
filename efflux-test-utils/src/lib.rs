// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Shared helpers for the efflux test suites.

mod recording;
mod test_error;

pub use recording::RecordingObserver;
pub use test_error::TestError;
