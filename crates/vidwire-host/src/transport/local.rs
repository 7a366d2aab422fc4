//! In-process channel straight into a dispatcher.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use vidwire_core::error::Result;
use vidwire_core::protocol::Channel;

use crate::dispatch::Dispatcher;

/// Channel whose far end is a [`Dispatcher`] in the same process.
///
/// Replies arrive exactly as they would over a stream: a handler that drops
/// its completion without replying yields an `UNKNOWN` error reply.
#[derive(Clone)]
pub struct LocalChannel {
    dispatcher: Arc<Dispatcher>,
}

impl LocalChannel {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }
}

#[async_trait]
impl Channel for LocalChannel {
    async fn send(&self, message: Bytes) -> Result<Bytes> {
        self.dispatcher.dispatch_await(message).await
    }
}
