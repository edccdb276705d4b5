//! The Idle/Saving gate that keeps at most one write in flight per storage.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Where a storage's save cycle currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SaveState {
    Idle,
    Saving,
}

/// Two-state machine. `Idle -> Saving` only through [`SaveGate::try_begin`];
/// `Saving -> Idle` only when the returned [`SaveTicket`] is dropped. A begin
/// request while `Saving` is refused, not queued.
#[derive(Debug, Default)]
pub(crate) struct SaveGate {
    saving: AtomicBool,
}

impl SaveGate {
    pub(crate) fn state(&self) -> SaveState {
        if self.saving.load(Ordering::Acquire) {
            SaveState::Saving
        } else {
            SaveState::Idle
        }
    }

    /// Move to `Saving` if currently `Idle`. `None` means a save is already
    /// in flight and the caller should do nothing.
    pub(crate) fn try_begin(self: &Arc<Self>) -> Option<SaveTicket> {
        self.saving
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SaveTicket {
                gate: Arc::clone(self),
            })
    }
}

/// Proof that the holder owns the in-flight save. Dropping it returns the
/// gate to `Idle`, whether the write succeeded, failed, or never ran.
#[derive(Debug)]
pub(crate) struct SaveTicket {
    gate: Arc<SaveGate>,
}

impl Drop for SaveTicket {
    fn drop(&mut self) {
        self.gate.saving.store(false, Ordering::Release);
    }
}
