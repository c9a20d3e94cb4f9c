//! Diagnostic channel for skipped lines and fatal errors.
//!
//! Diagnostics are human-readable, one line each, and end up on stderr.
//! While the terminal chart owns the screen they are held back in a
//! [`DeferredDiagnostics`] queue and flushed once the terminal is restored.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Sink for one-line diagnostics.
pub trait Diagnostics {
    fn report(&mut self, message: &str);
}

impl<D: Diagnostics + ?Sized> Diagnostics for &mut D {
    fn report(&mut self, message: &str) {
        (**self).report(message)
    }
}

/// Writes every diagnostic to stderr as it arrives.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrDiagnostics;

impl Diagnostics for StderrDiagnostics {
    fn report(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

/// Messages kept by a [`DeferredDiagnostics`] queue before the oldest are dropped
pub const DEFERRED_CAPACITY: usize = 1000;

/// Queues diagnostics until [`DeferredDiagnostics::flush`].
///
/// Only the newest `capacity` messages are kept; older ones are counted and
/// summarized on flush. Clones share one queue, so the interrupt handler can
/// flush what the ingest loop collected.
#[derive(Debug, Clone)]
pub struct DeferredDiagnostics {
    queue: Arc<Mutex<Queue>>,
    capacity: usize,
}

#[derive(Debug, Default)]
struct Queue {
    pending: VecDeque<String>,
    dropped: usize,
}

impl Default for DeferredDiagnostics {
    fn default() -> Self {
        Self::with_capacity(DEFERRED_CAPACITY)
    }
}

impl DeferredDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: Arc::new(Mutex::new(Queue::default())),
            capacity: capacity.max(1),
        }
    }

    /// Queued messages, oldest first.
    pub fn pending(&self) -> Vec<String> {
        self.queue
            .lock()
            .map(|queue| queue.pending.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Messages dropped since the last flush.
    pub fn dropped(&self) -> usize {
        self.queue.lock().map(|queue| queue.dropped).unwrap_or(0)
    }

    /// Drain the queue into `out`, one message per line.
    pub fn flush_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let drained = match self.queue.lock() {
            Ok(mut queue) => std::mem::take(&mut *queue),
            Err(_) => return Ok(()),
        };
        if drained.dropped > 0 {
            writeln!(
                out,
                "... {} earlier diagnostic{} omitted",
                drained.dropped,
                if drained.dropped == 1 { "" } else { "s" }
            )?;
        }
        for message in drained.pending {
            writeln!(out, "{message}")?;
        }
        out.flush()
    }

    /// Drain the queue to stderr.
    pub fn flush(&self) {
        let _ = self.flush_to(&mut std::io::stderr().lock());
    }
}

impl Diagnostics for DeferredDiagnostics {
    fn report(&mut self, message: &str) {
        if let Ok(mut queue) = self.queue.lock() {
            if queue.pending.len() >= self.capacity {
                queue.pending.pop_front();
                queue.dropped += 1;
            }
            queue.pending.push_back(message.to_string());
        }
    }
}
