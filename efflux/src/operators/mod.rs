// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Operator implementations, one module per operator.
//!
//! Each operator builds a new [`Observable`](crate::Observable) whose
//! producer installs a stage observer between upstream and downstream.
//! Stages share the downstream subscriber's composite subscription, so a
//! single outer unsubscribe tears down the whole chain, and they convert
//! user-callback failures into downstream `on_error`.

pub(crate) mod all;
pub(crate) mod buffer;
pub(crate) mod combine_latest;
pub(crate) mod concat;
pub(crate) mod filter;
pub(crate) mod finally;
pub(crate) mod group_by;
pub(crate) mod map;
pub(crate) mod materialize;
pub(crate) mod merge;
pub(crate) mod observe_on;
pub(crate) mod on_error;
pub(crate) mod sample;
pub(crate) mod scan;
pub(crate) mod skip;
pub(crate) mod start_with;
pub(crate) mod subscribe_on;
pub(crate) mod switch;
pub(crate) mod synchronize;
pub(crate) mod take;
pub(crate) mod take_last;
pub(crate) mod take_until;
pub(crate) mod take_while;
pub(crate) mod timestamp;
pub(crate) mod to_list;
pub(crate) mod zip;
