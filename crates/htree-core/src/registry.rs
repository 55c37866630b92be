// Copyright (c) Merkle KV Store Contributors
// SPDX-License-Identifier: Apache-2.0

//! The process-wide open-tree registry (spec.md §4.6). Simplified per the
//! source's re-architecture notes in §9: rather than a map of weak
//! references to live instances, this tracks only the set of keys
//! currently open. `close()` is the sole path that deregisters a key, so
//! as long as every `Tree` reliably closes (Rust's `Drop` makes this
//! automatic, unlike the source's shutdown-hook pattern), no weak
//! references are needed.
//!
//! Keyed by each tree's resolved on-disk path rather than its bare logical
//! name: two `Config`s with different `path_prefix`s are free to reuse the
//! same name for unrelated stores, but two stores backed by the same
//! directory must never both be open.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashSet;

static OPEN_PATHS: Lazy<Mutex<HashSet<String>>> = Lazy::new(|| Mutex::new(HashSet::new()));

pub fn register(key: &str) -> Result<()> {
    let mut keys = OPEN_PATHS.lock();
    if !keys.insert(key.to_string()) {
        return Err(Error::Conflict(format!("tree at '{key}' is already open")));
    }
    Ok(())
}

pub fn deregister(key: &str) {
    OPEN_PATHS.lock().remove(key);
}
