use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashMap;
use tokio::sync::oneshot;

use vidwire_core::error::{Result, VidwireError};
use vidwire_core::protocol::envelope::{decode_call, encode_reply, ErrorEnvelope};
use vidwire_core::schema::SchemaTable;

use super::completion::Completion;
use super::handler::MethodHandler;

/// Registry of method handlers and the channel's single entry point.
///
/// The registry is the only shared mutable state. Lookups take a shard read
/// lock; register/unregister take the shard write lock. A dispatched call
/// holds its own `Arc` to the handler, so replacing or removing the handler
/// later does not affect calls already in flight.
pub struct Dispatcher {
    handlers: DashMap<String, Arc<dyn MethodHandler>>,
    schemas: &'static SchemaTable,
}

impl Dispatcher {
    pub fn new(schemas: &'static SchemaTable) -> Self {
        Self {
            handlers: DashMap::new(),
            schemas,
        }
    }

    pub fn schemas(&self) -> &'static SchemaTable {
        self.schemas
    }

    /// Install or replace the handler for `method`; `None` removes it.
    pub fn register(&self, method: impl Into<String>, handler: Option<Arc<dyn MethodHandler>>) {
        let method = method.into();
        match handler {
            Some(h) => {
                tracing::debug!(%method, "handler registered");
                self.handlers.insert(method, h);
            }
            None => {
                if self.handlers.remove(&method).is_some() {
                    tracing::debug!(%method, "handler removed");
                }
            }
        }
    }

    pub fn is_registered(&self, method: &str) -> bool {
        self.handlers.contains_key(method)
    }

    /// Registered method names, sorted.
    pub fn registered_methods(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Decode one METHOD_CALL, run its handler, and hand the reply envelope to
    /// `reply` exactly once.
    ///
    /// Failures before the handler runs (`DECODE_ERROR`, `UNIMPLEMENTED`,
    /// `ARGUMENT_ERROR`) are replied to before this returns. Synchronous
    /// handlers also reply before return; deferred handlers reply whenever
    /// their completion fires. A handler that panics while running here gets
    /// an `UNKNOWN` error reply; the panic does not leave `dispatch`.
    pub fn dispatch<F>(&self, message: Bytes, reply: F)
    where
        F: FnOnce(Bytes) + Send + 'static,
    {
        let (method, argument) = match decode_call(&message, self.schemas) {
            Ok(call) => call,
            Err(e) => {
                tracing::warn!(len = message.len(), error = %e, "rejecting undecodable call");
                reply(encode_reply(&Err(ErrorEnvelope::from(&e))));
                return;
            }
        };

        // clone out of the shard guard before running anything
        let handler = self.handlers.get(&method).map(|h| Arc::clone(h.value()));
        let Some(handler) = handler else {
            tracing::warn!(%method, "no handler registered");
            let err = VidwireError::Unimplemented(method);
            reply(encode_reply(&Err(ErrorEnvelope::from(&err))));
            return;
        };

        let call = match handler.bind(argument) {
            Ok(call) => call,
            Err(e) => {
                tracing::warn!(%method, error = %e, "rejecting call argument");
                reply(encode_reply(&Err(ErrorEnvelope::from(&e))));
                return;
            }
        };

        tracing::debug!(%method, "dispatching");
        let completion = Completion::new(method, Box::new(reply));
        let guard = completion.clone();
        if let Err(payload) = catch_unwind(AssertUnwindSafe(move || call.invoke(completion))) {
            let cause = panic_message(payload.as_ref());
            tracing::error!(method = %guard.method(), %cause, "handler panicked");
            guard.error(ErrorEnvelope::unknown(format!("handler panicked: {cause}")));
        }
    }

    /// Dispatch and wait for the reply envelope.
    ///
    /// Resolves to `VidwireError::Channel` only if the reply sink is dropped
    /// without being called; a dropped completion still sends an error reply.
    pub async fn dispatch_await(&self, message: Bytes) -> Result<Bytes> {
        let (tx, rx) = oneshot::channel();
        self.dispatch(message, move |reply| {
            let _ = tx.send(reply);
        });
        rx.await
            .map_err(|_| VidwireError::Channel("completion dropped without a reply".into()))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
