//! Handler abstraction stored in the dispatcher registry.
//!
//! A handler first binds the raw argument value to its expected type (the
//! schema-specific decode step), then runs with a `Completion`. Synchronous
//! handlers complete before returning; deferred handlers may complete later
//! from any thread.

use std::marker::PhantomData;
use std::sync::Arc;

use vidwire_core::codec::Value;
use vidwire_core::error::Result;
use vidwire_core::protocol::ErrorEnvelope;
use vidwire_core::schema::{FromValue, IntoValue};

use super::completion::Completion;

/// Outcome of a synchronous handler.
pub type HandlerResult<R> = std::result::Result<R, ErrorEnvelope>;

/// Object-safe handler, one per registered method name.
///
/// Implementations must tolerate concurrent calls: the dispatcher does not
/// serialise calls to the same handler.
pub trait MethodHandler: Send + Sync {
    /// Decode `argument`; a failure here is reported as `ARGUMENT_ERROR`.
    fn bind(&self, argument: Value) -> Result<BoundCall>;
}

/// A call whose argument has been decoded and is ready to run.
pub struct BoundCall(Box<dyn FnOnce(Completion) + Send>);

impl BoundCall {
    pub fn new(run: impl FnOnce(Completion) + Send + 'static) -> Self {
        Self(Box::new(run))
    }

    pub fn invoke(self, completion: Completion) {
        (self.0)(completion)
    }
}

/// Adapter for `Fn(A) -> HandlerResult<R>`.
pub struct SyncHandler<A, R, F> {
    f: Arc<F>,
    _types: PhantomData<fn(A) -> R>,
}

impl<A, R, F> MethodHandler for SyncHandler<A, R, F>
where
    A: FromValue,
    R: IntoValue,
    F: Fn(A) -> HandlerResult<R> + Send + Sync + 'static,
{
    fn bind(&self, argument: Value) -> Result<BoundCall> {
        let arg = A::from_value(argument)?;
        let f = Arc::clone(&self.f);
        Ok(BoundCall::new(move |completion| {
            completion.complete(f(arg).map(IntoValue::into_value));
        }))
    }
}

/// Adapter for `Fn(A, Completion)`.
pub struct DeferredHandler<A, F> {
    f: Arc<F>,
    _types: PhantomData<fn(A)>,
}

impl<A, F> MethodHandler for DeferredHandler<A, F>
where
    A: FromValue,
    F: Fn(A, Completion) + Send + Sync + 'static,
{
    fn bind(&self, argument: Value) -> Result<BoundCall> {
        let arg = A::from_value(argument)?;
        let f = Arc::clone(&self.f);
        Ok(BoundCall::new(move |completion| f(arg, completion)))
    }
}

/// Wrap a synchronous function as a registry handler.
pub fn sync<A, R, F>(f: F) -> Arc<dyn MethodHandler>
where
    A: FromValue,
    R: IntoValue,
    F: Fn(A) -> HandlerResult<R> + Send + Sync + 'static,
{
    Arc::new(SyncHandler {
        f: Arc::new(f),
        _types: PhantomData,
    })
}

/// Wrap a completion-callback function as a registry handler.
pub fn deferred<A, F>(f: F) -> Arc<dyn MethodHandler>
where
    A: FromValue,
    F: Fn(A, Completion) + Send + Sync + 'static,
{
    Arc::new(DeferredHandler {
        f: Arc::new(f),
        _types: PhantomData,
    })
}
