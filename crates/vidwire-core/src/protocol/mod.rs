//! Protocol modules: envelopes, the caller-side channel contract, and stream
//! framing.
//!
//! All parsers are panic-free: malformed input is reported as `VidwireError`
//! instead of panicking or indexing raw buffers, so one bad message never
//! takes down the channel.

pub mod channel;
pub mod envelope;
pub mod frame;

pub use channel::Channel;
pub use envelope::{decode_call, decode_reply, encode_call, encode_reply, ErrorEnvelope, Reply};
