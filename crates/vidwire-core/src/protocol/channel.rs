//! Byte channel contract seen by the caller side.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Carries one envelope to the host and resolves with the reply envelope.
///
/// Implementations report transport failures, and replies that can never
/// arrive, as `VidwireError::Channel`. Timeouts are the implementation's
/// business; without one a call that never completes waits forever.
#[async_trait]
pub trait Channel: Send + Sync {
    async fn send(&self, message: Bytes) -> Result<Bytes>;
}

#[async_trait]
impl<C: Channel + ?Sized> Channel for Arc<C> {
    async fn send(&self, message: Bytes) -> Result<Bytes> {
        (**self).send(message).await
    }
}
