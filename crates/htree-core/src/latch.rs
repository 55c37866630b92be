// Copyright (c) Merkle KV Store Contributors
// SPDX-License-Identifier: Apache-2.0

//! A level-triggered latch that lets `root_hash`/`flush`/`revert` block
//! until the commit worker has drained the pending queue. The state
//! (`pending_empty`) lives inside the same mutex the condvar guards, so a
//! caller's check-then-wait is atomic with respect to the worker's
//! mark-then-notify — there is no window in which a drain signal fired
//! between the check and the wait can be lost.

use crate::error::{Error, Result};
use parking_lot::{Condvar, Mutex};

struct State {
    pending_empty: bool,
    closed: bool,
}

pub struct PendingLatch {
    state: Mutex<State>,
    condvar: Condvar,
}

impl PendingLatch {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State { pending_empty: true, closed: false }),
            condvar: Condvar::new(),
        }
    }

    /// Called whenever a write is enqueued; the queue is no longer drained.
    pub fn mark_dirty(&self) {
        self.state.lock().pending_empty = false;
    }

    /// Called by the commit worker once it has emptied the pending queue.
    pub fn mark_drained(&self) {
        let mut state = self.state.lock();
        state.pending_empty = true;
        self.condvar.notify_all();
    }

    /// Blocks until the pending queue is drained or the latch is closed.
    pub fn wait_drained(&self) -> Result<()> {
        let mut state = self.state.lock();
        while !state.pending_empty && !state.closed {
            self.condvar.wait(&mut state);
        }
        if state.closed && !state.pending_empty {
            return Err(Error::Interrupted);
        }
        Ok(())
    }

    /// Wakes every waiter without requiring drain, used on `close()` so a
    /// concurrent `root_hash()` call does not block forever.
    pub fn close(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        self.condvar.notify_all();
    }
}
