//! Call and reply envelopes.
//!
//! Layout (one envelope per channel message):
//! - METHOD_CALL:   `[0x00][STRING name][VALUE argument]`
//! - SUCCESS_REPLY: `[0x01][VALUE result]`
//! - ERROR_REPLY:   `[0x02][STRING code][NULL|STRING message][VALUE details]`
//!
//! `STRING` is a tagged string value. Trailing bytes after an envelope are
//! malformed.

use std::fmt;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::codec::wire::{get_string, get_value, put_string, put_value, RecordShapes};
use crate::codec::Value;
use crate::error::{ErrorCode, Result, VidwireError};

/// Leading discriminant of an envelope.
pub mod kind {
    pub const METHOD_CALL: u8 = 0x00;
    pub const SUCCESS_REPLY: u8 = 0x01;
    pub const ERROR_REPLY: u8 = 0x02;
}

/// Structured failure delivered to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEnvelope {
    /// Machine-readable code.
    pub code: String,
    pub message: Option<String>,
    /// Arbitrary diagnostic payload.
    pub details: Option<Value>,
}

impl ErrorEnvelope {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: None,
            details: None,
        }
    }

    /// Domain failure without a specific code.
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unknown.as_str()).with_message(message)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// NULL details are the same as no details.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = (!details.is_null()).then_some(details);
        self
    }
}

impl fmt::Display for ErrorEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{}: {}", self.code, msg),
            None => f.write_str(&self.code),
        }
    }
}

/// Outcome carried by a reply envelope.
pub type Reply = std::result::Result<Value, ErrorEnvelope>;

pub fn encode_call(method: &str, argument: &Value) -> Bytes {
    let mut out = BytesMut::new();
    out.put_u8(kind::METHOD_CALL);
    put_string(&mut out, method);
    put_value(&mut out, argument);
    out.freeze()
}

/// Decode a METHOD_CALL into `(method, argument)`.
pub fn decode_call<S>(bytes: &[u8], shapes: &S) -> Result<(String, Value)>
where
    S: RecordShapes + ?Sized,
{
    let mut buf = bytes;
    match take_kind(&mut buf)? {
        kind::METHOD_CALL => {}
        other => {
            return Err(VidwireError::malformed(format!(
                "expected method call, got envelope kind 0x{other:02x}"
            )))
        }
    }
    let method = get_string(&mut buf, "method name")?;
    let argument = get_value(&mut buf, shapes)?;
    expect_end(buf)?;
    Ok((method, argument))
}

pub fn encode_reply(reply: &Reply) -> Bytes {
    let mut out = BytesMut::new();
    match reply {
        Ok(value) => {
            out.put_u8(kind::SUCCESS_REPLY);
            put_value(&mut out, value);
        }
        Err(err) => {
            out.put_u8(kind::ERROR_REPLY);
            put_string(&mut out, &err.code);
            match &err.message {
                Some(msg) => put_string(&mut out, msg),
                None => put_value(&mut out, &Value::Null),
            }
            put_value(&mut out, err.details.as_ref().unwrap_or(&Value::Null));
        }
    }
    out.freeze()
}

/// Decode a SUCCESS_REPLY or ERROR_REPLY.
///
/// The outer `Result` fails only on malformed bytes; a well-formed error reply
/// is `Ok(Err(envelope))`.
pub fn decode_reply<S>(bytes: &[u8], shapes: &S) -> Result<Reply>
where
    S: RecordShapes + ?Sized,
{
    let mut buf = bytes;
    let reply = match take_kind(&mut buf)? {
        kind::SUCCESS_REPLY => Ok(get_value(&mut buf, shapes)?),
        kind::ERROR_REPLY => {
            let code = get_string(&mut buf, "error code")?;
            let message = match get_value(&mut buf, shapes)? {
                Value::Null => None,
                Value::String(s) => Some(s),
                other => {
                    return Err(VidwireError::malformed(format!(
                        "error message must be string or null, got {}",
                        other.kind()
                    )))
                }
            };
            let details = get_value(&mut buf, shapes)?;
            let mut env = ErrorEnvelope::new(code).with_details(details);
            env.message = message;
            Err(env)
        }
        other => {
            return Err(VidwireError::malformed(format!(
                "expected reply, got envelope kind 0x{other:02x}"
            )))
        }
    };
    expect_end(buf)?;
    Ok(reply)
}

fn take_kind(buf: &mut &[u8]) -> Result<u8> {
    if !buf.has_remaining() {
        return Err(VidwireError::malformed("empty envelope"));
    }
    Ok(buf.get_u8())
}

fn expect_end(buf: &[u8]) -> Result<()> {
    if !buf.is_empty() {
        return Err(VidwireError::malformed(format!(
            "{} trailing bytes after envelope",
            buf.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]

    use super::*;
    use crate::schema::video_player::VIDEO_PLAYER_SCHEMAS as SCHEMAS;

    #[test]
    fn call_roundtrip() {
        let bytes = encode_call("play", &Value::Int64(9));
        assert_eq!(&bytes[..6], &[0x00, 0x06, 4, b'p', b'l', b'a']);
        let (method, arg) = decode_call(&bytes, &SCHEMAS).unwrap();
        assert_eq!(method, "play");
        assert_eq!(arg, Value::Int64(9));
    }

    #[test]
    fn success_reply_roundtrip() {
        let reply: Reply = Ok(Value::Null);
        let bytes = encode_reply(&reply);
        assert_eq!(&bytes[..], &[0x01, 0x00]);
        assert_eq!(decode_reply(&bytes, &SCHEMAS).unwrap(), reply);
    }

    #[test]
    fn error_reply_roundtrip() {
        let full = ErrorEnvelope::new("E_SEEK")
            .with_message("seek failed")
            .with_details(Value::List(vec![Value::Int64(1)]));
        for env in [full, ErrorEnvelope::new("UNKNOWN")] {
            let reply: Reply = Err(env);
            let bytes = encode_reply(&reply);
            assert_eq!(decode_reply(&bytes, &SCHEMAS).unwrap(), reply);
        }
    }

    #[test]
    fn bare_error_layout() {
        let bytes = encode_reply(&Err(ErrorEnvelope::new("X")));
        assert_eq!(&bytes[..], &[0x02, 0x06, 1, b'X', 0x00, 0x00]);
    }

    #[test]
    fn reply_is_not_a_call() {
        let bytes = encode_reply(&Ok(Value::Null));
        let err = decode_call(&bytes, &SCHEMAS).unwrap_err();
        assert!(matches!(err, VidwireError::MalformedPayload(_)));
        let call = encode_call("pause", &Value::Null);
        assert!(decode_reply(&call, &SCHEMAS).is_err());
    }

    #[test]
    fn trailing_bytes_are_malformed() {
        let mut raw = encode_call("pause", &Value::Null).to_vec();
        raw.push(0x00);
        assert!(matches!(
            decode_call(&raw, &SCHEMAS),
            Err(VidwireError::MalformedPayload(_))
        ));
    }

    #[test]
    fn non_string_message_is_malformed() {
        let raw = [0x02, 0x06, 1, b'X', 0x01, 0x00];
        assert!(decode_reply(&raw, &SCHEMAS).is_err());
    }

    #[test]
    fn display_includes_message() {
        assert_eq!(ErrorEnvelope::unknown("boom").to_string(), "UNKNOWN: boom");
        assert_eq!(ErrorEnvelope::new("E").to_string(), "E");
    }
}
