//! Value codec: the closed set of self-describing value kinds and their wire
//! encoding.
//!
//! Every value starts with a one-byte tag; variable-length payloads carry an
//! unsigned LEB128 length prefix. Decoding is panic-free: truncated or invalid
//! input is reported as `VidwireError::MalformedPayload`, never as a partial
//! value.

pub mod value;
pub mod wire;

pub use value::{tag, RecordValue, Value};
pub use wire::{
    check_depth, decode_value, encode_value, get_value, put_value, RecordShapes, MAX_DEPTH,
};
