//! Caller-side request/reply over a channel.

use vidwire_core::codec::{check_depth, Value};
use vidwire_core::error::{Result, VidwireError};
use vidwire_core::protocol::{decode_reply, encode_call, Channel};
use vidwire_core::schema::{FromValue, IntoValue, SchemaTable};

/// Issues calls over one channel.
///
/// Error mapping:
/// - a decoded ERROR_REPLY is `VidwireError::Remote`
/// - transport failure, or a reply that never arrives, is `VidwireError::Channel`
/// - reply bytes that do not decode are `VidwireError::MalformedPayload`, as is
///   an argument nested too deeply to decode (rejected before sending)
pub struct Invoker<C> {
    channel: C,
    schemas: &'static SchemaTable,
}

impl<C: Channel> Invoker<C> {
    pub fn new(channel: C, schemas: &'static SchemaTable) -> Self {
        Self { channel, schemas }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub async fn call(&self, method: &str, argument: Value) -> Result<Value> {
        check_depth(&argument)?;
        let message = encode_call(method, &argument);
        tracing::debug!(%method, len = message.len(), "sending call");

        let raw = self.channel.send(message).await?;
        let reply = decode_reply(&raw, self.schemas).map_err(|e| {
            tracing::warn!(%method, len = raw.len(), error = %e, "undecodable reply");
            e
        })?;

        reply.map_err(|env| {
            tracing::debug!(%method, code = %env.code, "remote error");
            VidwireError::Remote(env)
        })
    }

    /// Encode a typed argument and decode a typed result.
    ///
    /// A result that does not match `R` is `VidwireError::SchemaMismatch`.
    pub async fn call_typed<A, R>(&self, method: &str, argument: A) -> Result<R>
    where
        A: IntoValue,
        R: FromValue,
    {
        let value = self.call(method, argument.into_value()).await?;
        R::from_value(value)
    }
}
