//! Single-fire reply handle for deferred handlers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use vidwire_core::codec::check_depth;
use vidwire_core::protocol::envelope::{encode_reply, ErrorEnvelope, Reply};
use vidwire_core::schema::IntoValue;

/// The channel's own reply mechanism for one call.
pub type ReplySink = Box<dyn FnOnce(Bytes) + Send>;

/// Reply handle for one dispatched call.
///
/// Clones share one gate: the first `complete` sends the reply, later ones are
/// logged and ignored. May be completed from any thread. If the last clone is
/// dropped without a reply, the caller gets an `UNKNOWN` error reply instead.
///
/// A result nested deeper than the decoder accepts is replaced by an
/// `UNKNOWN` error reply.
#[derive(Clone)]
pub struct Completion {
    gate: Arc<Gate>,
}

struct Gate {
    method: String,
    delivered: AtomicBool,
    sink: Mutex<Option<ReplySink>>,
}

impl Completion {
    pub fn new(method: impl Into<String>, sink: ReplySink) -> Self {
        Self {
            gate: Arc::new(Gate {
                method: method.into(),
                delivered: AtomicBool::new(false),
                sink: Mutex::new(Some(sink)),
            }),
        }
    }

    pub fn method(&self) -> &str {
        &self.gate.method
    }

    pub fn is_delivered(&self) -> bool {
        self.gate.delivered.load(Ordering::Acquire)
    }

    pub fn success(&self, value: impl IntoValue) -> bool {
        self.complete(Ok(value.into_value()))
    }

    pub fn error(&self, err: ErrorEnvelope) -> bool {
        self.complete(Err(err))
    }

    /// Send the reply. Returns `false` if this call was already completed.
    pub fn complete(&self, reply: Reply) -> bool {
        if self.gate.delivered.swap(true, Ordering::AcqRel) {
            tracing::warn!(method = %self.gate.method, "completion fired more than once; ignoring");
            return false;
        }

        // Poisoned lock means a sink panicked earlier; the slot is still usable.
        let sink = match self.gate.sink.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        match &reply {
            Ok(_) => tracing::debug!(method = %self.gate.method, "call completed"),
            Err(e) => tracing::debug!(method = %self.gate.method, code = %e.code, "call failed"),
        }

        if let Some(sink) = sink {
            sink(encode_reply(&fit_for_wire(&self.gate.method, reply)));
        }
        true
    }
}

fn fit_for_wire(method: &str, reply: Reply) -> Reply {
    let nested = match &reply {
        Ok(value) => Some(value),
        Err(e) => e.details.as_ref(),
    };
    match nested.map(check_depth) {
        Some(Err(e)) => {
            tracing::warn!(%method, error = %e, "reply too deeply nested; replacing");
            Err(ErrorEnvelope::unknown("reply value nested too deeply"))
        }
        _ => reply,
    }
}

impl Drop for Gate {
    fn drop(&mut self) {
        if *self.delivered.get_mut() {
            return;
        }
        tracing::warn!(method = %self.method, "completion dropped without a reply");
        let sink = match self.sink.get_mut() {
            Ok(slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(sink) = sink {
            let err = ErrorEnvelope::unknown("completion dropped without a reply");
            sink(encode_reply(&Err(err)));
        }
    }
}
