// Copyright (c) Merkle KV Store Contributors
// SPDX-License-Identifier: Apache-2.0

//! Process-wide counters for the clone/update fast-path split (spec.md
//! §4.5). Incremented by `tree.rs`; read-only elsewhere.

use std::sync::atomic::{AtomicU64, Ordering};

static TREES_CLONED: AtomicU64 = AtomicU64::new(0);
static TREES_UPDATED_WITHOUT_CLONE: AtomicU64 = AtomicU64::new(0);

pub fn record_clone() {
    TREES_CLONED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_update_without_clone() {
    TREES_UPDATED_WITHOUT_CLONE.fetch_add(1, Ordering::Relaxed);
}

pub fn trees_cloned() -> u64 {
    TREES_CLONED.load(Ordering::Relaxed)
}

pub fn trees_updated_without_clone() -> u64 {
    TREES_UPDATED_WITHOUT_CLONE.load(Ordering::Relaxed)
}
