//! Debounced draft autosave.
//!
//! [`Autosaver`] runs a background task that flushes the latest draft
//! snapshot to a [`DraftStore`] after a quiet period. Every edit resets
//! the debounce window; at most one flush is in flight; an edit arriving
//! mid-flush leaves a fresh snapshot behind, so the next flush always
//! carries the latest state, never a stale one. Cancelling (on builder
//! unmount) stops the pending timer and abandons any in-flight flush.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use canvass_core::StudyDraft;

use crate::source::DraftStore;

/// Quiet period after the last edit before a flush fires.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1500);

/// Autosave tuning knobs.
#[derive(Debug, Clone)]
pub struct AutosaveConfig {
    pub debounce: Duration,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

// ---------------------------------------------------------------------------
// Autosaver
// ---------------------------------------------------------------------------

/// Handle to the background autosave task.
#[derive(Debug)]
pub struct Autosaver {
    latest: Arc<Mutex<Option<StudyDraft>>>,
    edits_tx: watch::Sender<u64>,
    cancel: CancellationToken,
}

impl Autosaver {
    /// Spawn the background flush task against the given store.
    pub fn spawn(store: Arc<dyn DraftStore>, config: AutosaveConfig) -> Self {
        let latest: Arc<Mutex<Option<StudyDraft>>> = Arc::new(Mutex::new(None));
        let (edits_tx, edits_rx) = watch::channel(0u64);
        let cancel = CancellationToken::new();

        tokio::spawn(run_flush_loop(
            store,
            Arc::clone(&latest),
            edits_rx,
            cancel.clone(),
            config.debounce,
        ));

        Self {
            latest,
            edits_tx,
            cancel,
        }
    }

    /// Record an edit: replace the pending snapshot and restart the
    /// debounce window.
    pub fn schedule(&self, draft: &StudyDraft) {
        if self.cancel.is_cancelled() {
            return;
        }
        *self.latest.lock().expect("autosave snapshot lock") = Some(draft.clone());
        self.edits_tx.send_modify(|edits| *edits += 1);
    }

    /// Whether a snapshot is waiting to be flushed.
    pub fn has_pending(&self) -> bool {
        self.latest
            .lock()
            .expect("autosave snapshot lock")
            .is_some()
    }

    /// Stop the autosaver: the pending timer is dropped and an in-flight
    /// flush is abandoned. Used when the builder unmounts.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for Autosaver {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// ---------------------------------------------------------------------------
// Flush loop
// ---------------------------------------------------------------------------

async fn run_flush_loop(
    store: Arc<dyn DraftStore>,
    latest: Arc<Mutex<Option<StudyDraft>>>,
    mut edits_rx: watch::Receiver<u64>,
    cancel: CancellationToken,
    debounce: Duration,
) {
    loop {
        // Wait for the first edit since the last flush.
        tokio::select! {
            _ = cancel.cancelled() => return,
            changed = edits_rx.changed() => {
                if changed.is_err() {
                    return;
                }
            }
        }

        // Debounce: every further edit restarts the quiet period.
        loop {
            tokio::select! {
                _ = cancel.cancelled() => return,
                changed = edits_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                _ = tokio::time::sleep(debounce) => break,
            }
        }

        // Take the snapshot; edits landing from here on refill it and
        // re-signal the watch channel, so they roll into the next flush.
        let snapshot = latest.lock().expect("autosave snapshot lock").take();
        let Some(draft) = snapshot else { continue };

        tokio::select! {
            _ = cancel.cancelled() => return,
            result = store.save_draft(&draft) => {
                match result {
                    Ok(()) => tracing::debug!("autosaved draft"),
                    Err(error) => tracing::warn!(%error, "autosave flush failed"),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
