//! Dispatcher module exports.
//!
//! Re-exports the dispatcher, handler adapters, and completion handle so
//! downstream consumers can depend on this module directly.

pub mod completion;
pub mod dispatcher;
pub mod handler;

pub use completion::{Completion, ReplySink};
pub use dispatcher::Dispatcher;
pub use handler::{deferred, sync, BoundCall, HandlerResult, MethodHandler};
