//! Shared error type across vidwire crates.

use thiserror::Error;

use crate::protocol::envelope::ErrorEnvelope;

/// Error codes carried in ERROR_REPLY envelopes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Incoming bytes were not a valid METHOD_CALL envelope.
    DecodeError,
    /// The argument did not match the handler's expected record.
    ArgumentError,
    /// No handler is registered for the method name.
    Unimplemented,
    /// Domain failure without a handler-supplied code.
    Unknown,
}

impl ErrorCode {
    /// String representation used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::DecodeError => "DECODE_ERROR",
            ErrorCode::ArgumentError => "ARGUMENT_ERROR",
            ErrorCode::Unimplemented => "UNIMPLEMENTED",
            ErrorCode::Unknown => "UNKNOWN",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, VidwireError>;

/// Unified error type used by core, host, and client.
#[derive(Debug, Error)]
pub enum VidwireError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),
    #[error("unimplemented method: {0}")]
    Unimplemented(String),
    /// A decoded ERROR_REPLY (or a domain failure raised by a handler).
    #[error("remote error: {0}")]
    Remote(ErrorEnvelope),
    /// The channel failed or never delivered a reply. Never encoded on the wire.
    #[error("channel error: {0}")]
    Channel(String),
    #[error("config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl VidwireError {
    /// Map an error to the code it carries when converted into a reply.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            VidwireError::MalformedPayload(_) => ErrorCode::DecodeError,
            VidwireError::SchemaMismatch(_) => ErrorCode::ArgumentError,
            VidwireError::Unimplemented(_) => ErrorCode::Unimplemented,
            VidwireError::Remote(_)
            | VidwireError::Channel(_)
            | VidwireError::Config(_)
            | VidwireError::Internal(_) => ErrorCode::Unknown,
        }
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        VidwireError::MalformedPayload(msg.into())
    }

    pub(crate) fn mismatch(msg: impl Into<String>) -> Self {
        VidwireError::SchemaMismatch(msg.into())
    }
}

impl From<&VidwireError> for ErrorEnvelope {
    fn from(err: &VidwireError) -> Self {
        match err {
            VidwireError::Remote(env) => env.clone(),
            other => ErrorEnvelope::new(other.error_code().as_str()).with_message(other.to_string()),
        }
    }
}

impl From<VidwireError> for ErrorEnvelope {
    fn from(err: VidwireError) -> Self {
        match err {
            VidwireError::Remote(env) => env,
            other => ErrorEnvelope::from(&other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(ErrorCode::DecodeError.as_str(), "DECODE_ERROR");
        assert_eq!(
            VidwireError::SchemaMismatch("x".into()).error_code().as_str(),
            "ARGUMENT_ERROR"
        );
        assert_eq!(
            VidwireError::Unimplemented("play".into()).error_code(),
            ErrorCode::Unimplemented
        );
    }

    #[test]
    fn remote_error_converts_back_unchanged() {
        let env = ErrorEnvelope::new("E_PLAYER").with_message("no such texture");
        let back = ErrorEnvelope::from(VidwireError::Remote(env.clone()));
        assert_eq!(back, env);
    }

    #[test]
    fn local_error_carries_code_and_message() {
        let env = ErrorEnvelope::from(&VidwireError::MalformedPayload("truncated".into()));
        assert_eq!(env.code, "DECODE_ERROR");
        assert_eq!(env.message.as_deref(), Some("malformed payload: truncated"));
        assert!(env.details.is_none());
    }
}
