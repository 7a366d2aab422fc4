//! vidwire caller side.
//!
//! [`Invoker`] turns a method name and argument into a METHOD_CALL, sends it
//! over a [`Channel`](vidwire_core::protocol::Channel), and decodes the reply.
//! [`VideoPlayerClient`] wraps it with one typed method per API operation.

pub mod invoker;
pub mod transport;
pub mod video_player;

pub use invoker::Invoker;
pub use transport::StreamChannel;
pub use video_player::VideoPlayerClient;
