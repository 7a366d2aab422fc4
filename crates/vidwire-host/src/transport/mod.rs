//! Host transports: in-process channel and framed byte streams.

pub mod local;
pub mod stream;

pub use local::LocalChannel;
pub use stream::serve_stream;
