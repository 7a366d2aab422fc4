//! Caller-side transports.

pub mod stream;

pub use stream::StreamChannel;
