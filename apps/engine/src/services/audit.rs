//! Decoupled audit-log writer.
//!
//! Handlers emit records from inside the room critical section; the actual
//! store write happens on a worker thread so persistence latency (or an
//! outage) never extends the lock hold. Failed writes are retained in memory
//! and retried ahead of the next record, preserving per-room order.

use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::sync::Arc;
use std::thread::JoinHandle;

use tracing::warn;

use crate::store::{ActionRecord, EngineStore};

enum AuditMsg {
    Record(ActionRecord),
    Flush(SyncSender<()>),
}

pub struct AuditWriter {
    tx: Option<Sender<AuditMsg>>,
    handle: Option<JoinHandle<()>>,
}

impl AuditWriter {
    pub fn spawn(store: Arc<dyn EngineStore>) -> Self {
        let (tx, rx) = mpsc::channel();
        let handle = std::thread::Builder::new()
            .name("audit-writer".into())
            .spawn(move || worker(store, rx))
            .expect("spawning the audit worker thread");
        Self {
            tx: Some(tx),
            handle: Some(handle),
        }
    }

    /// Queue one record. Best-effort: a dead worker only costs the audit
    /// trail, never the action.
    pub fn emit(&self, record: ActionRecord) {
        if let Some(tx) = &self.tx {
            if tx.send(AuditMsg::Record(record)).is_err() {
                warn!("audit worker is gone; dropping audit record");
            }
        }
    }

    /// Barrier: returns once every record emitted before the call has been
    /// attempted against the store.
    pub fn flush(&self) {
        let Some(tx) = &self.tx else { return };
        let (ack_tx, ack_rx) = mpsc::sync_channel(1);
        if tx.send(AuditMsg::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }
}

impl Drop for AuditWriter {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain and exit.
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn worker(store: Arc<dyn EngineStore>, rx: Receiver<AuditMsg>) {
    let mut pending: Vec<ActionRecord> = Vec::new();
    while let Ok(msg) = rx.recv() {
        match msg {
            AuditMsg::Record(record) => {
                pending.push(record);
                drain(&store, &mut pending);
            }
            AuditMsg::Flush(ack) => {
                drain(&store, &mut pending);
                let _ = ack.send(());
            }
        }
    }
    // Channel closed: one last attempt.
    drain(&store, &mut pending);
    if !pending.is_empty() {
        warn!(
            retained = pending.len(),
            "audit writer shutting down with unpersisted records"
        );
    }
}

/// Write queued records in order; stop at the first failure and keep the
/// rest for the next attempt.
fn drain(store: &Arc<dyn EngineStore>, pending: &mut Vec<ActionRecord>) {
    while let Some(record) = pending.first() {
        match store.record_action(record) {
            Ok(()) => {
                pending.remove(0);
            }
            Err(err) => {
                warn!(
                    room_id = %record.room_id,
                    action = record.action_type.as_str(),
                    error = %err,
                    retained = pending.len(),
                    "audit write failed; retaining records in memory"
                );
                break;
            }
        }
    }
}
