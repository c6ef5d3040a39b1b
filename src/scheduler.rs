// Coalesces view-change notifications into at most one pending layout pass
// and keeps passes from nesting.

use std::cell::Cell;
use std::rc::Rc;

use tracing::debug;

#[derive(Debug, Default)]
struct TriggerState {
    pending: Cell<bool>,
    in_pass: Cell<bool>,
    suppressed: Cell<u64>,
}

/// Cloneable handle handed to whatever emits view changes (viewer
/// subscriptions, resize handlers). All clones share one pending flag.
#[derive(Debug, Clone, Default)]
pub struct LayoutTrigger {
    state: Rc<TriggerState>,
}

impl LayoutTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a pass for the next frame. Returns `true` only when this
    /// call scheduled it; repeated requests before the frame are absorbed.
    /// Requests raised while a pass is running are dropped.
    pub fn request(&self) -> bool {
        if self.state.in_pass.get() {
            self.state.suppressed.set(self.state.suppressed.get() + 1);
            debug!("layout request during a running pass suppressed");
            return false;
        }
        !self.state.pending.replace(true)
    }

    pub fn is_pending(&self) -> bool {
        self.state.pending.get()
    }

    pub fn in_pass(&self) -> bool {
        self.state.in_pass.get()
    }

    /// Number of requests dropped because a pass was running.
    pub fn suppressed(&self) -> u64 {
        self.state.suppressed.get()
    }

    /// Consumes the pending request, if any.
    pub(crate) fn take(&self) -> bool {
        self.state.pending.replace(false)
    }

    /// Marks a pass as running until the guard drops. `None` if one already is.
    pub(crate) fn begin_pass(&self) -> Option<PassGuard> {
        if self.state.in_pass.replace(true) {
            return None;
        }
        Some(PassGuard {
            state: Rc::clone(&self.state),
        })
    }
}

#[derive(Debug)]
pub(crate) struct PassGuard {
    state: Rc<TriggerState>,
}

impl Drop for PassGuard {
    fn drop(&mut self) {
        self.state.in_pass.set(false);
    }
}
