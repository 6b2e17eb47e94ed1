//! Decode diagnostics
//!
//! The scanner and decoder report progress through a [`DecodeObserver`]
//! instead of writing to a shared output stream. The caller picks the sink:
//! [`NoopObserver`] by default, [`TracingObserver`] in services, and
//! [`RecordingObserver`] in tests.

use std::sync::Mutex;

use crate::entry::EntryKind;

/// Diagnostic event emitted while decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// The buffer was empty; nothing to decode
    EmptyInput,

    /// A record was recovered at `[offset, offset + length)`
    RecordDecoded {
        offset: usize,
        length: usize,
        kind: EntryKind,
    },

    /// No candidate length at `offset` decoded; `remaining` bytes were dropped
    BoundaryNotFound { offset: usize, remaining: usize },

    /// A function signature was projected from the record at `offset`
    SignatureExtracted { offset: usize, name: String },
}

/// Sink for [`ScanEvent`]s
pub trait DecodeObserver: Send + Sync {
    fn on_event(&self, event: &ScanEvent);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl DecodeObserver for NoopObserver {
    fn on_event(&self, _event: &ScanEvent) {}
}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl DecodeObserver for TracingObserver {
    fn on_event(&self, event: &ScanEvent) {
        match event {
            ScanEvent::EmptyInput => {
                tracing::debug!("Contract spec buffer is empty");
            }
            ScanEvent::RecordDecoded {
                offset,
                length,
                kind,
            } => {
                tracing::trace!(
                    "Decoded {:?} spec entry at offset {} ({} bytes)",
                    kind,
                    offset,
                    length
                );
            }
            ScanEvent::BoundaryNotFound { offset, remaining } => {
                tracing::warn!(
                    offset = *offset,
                    remaining = *remaining,
                    "Contract spec truncated: no valid entry boundary after offset {}",
                    offset
                );
            }
            ScanEvent::SignatureExtracted { offset, name } => {
                tracing::debug!("Extracted function '{}' from offset {}", name, offset);
            }
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ScanEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events seen so far
    pub fn events(&self) -> Vec<ScanEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl DecodeObserver for RecordingObserver {
    fn on_event(&self, event: &ScanEvent) {
        let mut events = match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.push(event.clone());
    }
}

impl<T: DecodeObserver + ?Sized> DecodeObserver for std::sync::Arc<T> {
    fn on_event(&self, event: &ScanEvent) {
        (**self).on_event(event)
    }
}
