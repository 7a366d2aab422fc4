//! Serve a dispatcher over a framed byte stream.
//!
//! The reader loop splits `[u32 LE len][envelope]` frames and dispatches each
//! one. Replies go through an mpsc queue to a single writer task, so they are
//! written in completion order, not request order.

use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use vidwire_core::error::{ErrorCode, Result, VidwireError};
use vidwire_core::protocol::frame::{put_frame, try_split_frame};
use vidwire_core::protocol::{encode_reply, ErrorEnvelope};

use crate::dispatch::Dispatcher;

/// Run until `reader` hits EOF and every pending reply has been written.
///
/// An oversized inbound frame ends the session with `VidwireError::Channel`;
/// the stream cannot be resynchronised after it.
pub async fn serve_stream<R, W>(
    dispatcher: Arc<Dispatcher>,
    mut reader: R,
    writer: W,
    max_frame_bytes: usize,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (out_tx, out_rx) = mpsc::unbounded_channel::<Bytes>();
    let writer_task = tokio::spawn(write_replies(writer, out_rx, max_frame_bytes));

    let mut buf = BytesMut::with_capacity(8 * 1024);
    let read_result = loop {
        match try_split_frame(&mut buf, max_frame_bytes) {
            Ok(Some(frame)) => {
                let tx = out_tx.clone();
                dispatcher.dispatch(frame, move |reply| {
                    if tx.send(reply).is_err() {
                        tracing::warn!("reply dropped: stream writer closed");
                    }
                });
                continue;
            }
            Ok(None) => {}
            Err(e) => break Err(e),
        }

        match reader.read_buf(&mut buf).await {
            Ok(0) => {
                if !buf.is_empty() {
                    tracing::warn!(len = buf.len(), "stream closed mid-frame");
                }
                break Ok(());
            }
            Ok(_) => {}
            Err(e) => break Err(VidwireError::Channel(format!("read failed: {e}"))),
        }
    };

    // pending deferred replies still hold sender clones
    drop(out_tx);
    let write_result = writer_task
        .await
        .map_err(|e| VidwireError::Internal(format!("writer task failed: {e}")))?;

    read_result.and(write_result)
}

async fn write_replies<W>(
    mut writer: W,
    mut rx: mpsc::UnboundedReceiver<Bytes>,
    max_frame_bytes: usize,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut out = BytesMut::new();
    while let Some(reply) = rx.recv().await {
        if put_frame(&mut out, &reply, max_frame_bytes).is_err() {
            let substitute = encode_reply(&Err(ErrorEnvelope::new(ErrorCode::Unknown.as_str())
                .with_message(format!("reply of {} bytes exceeds frame limit", reply.len()))));
            put_frame(&mut out, &substitute, max_frame_bytes)?;
        }
        writer
            .write_all(&out)
            .await
            .map_err(|e| VidwireError::Channel(format!("write failed: {e}")))?;
        writer
            .flush()
            .await
            .map_err(|e| VidwireError::Channel(format!("flush failed: {e}")))?;
        out.clear();
    }
    Ok(())
}
