//! Channel over a framed byte stream.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use vidwire_core::error::{Result, VidwireError};
use vidwire_core::protocol::frame::{put_frame, try_split_frame};
use vidwire_core::protocol::Channel;

/// Sends `[u32 LE len][envelope]` frames and reads one reply per call.
///
/// Calls are serialised: one in flight per channel, so each reply frame
/// belongs to the call that is waiting. After an I/O failure, or a call
/// cancelled before its reply was read (a dropped `send` future, e.g. on
/// timeout), the stream is out of step and every later call fails with
/// `VidwireError::Channel`.
pub struct StreamChannel<R, W> {
    io: Mutex<StreamIo<R, W>>,
    max_frame_bytes: usize,
}

struct StreamIo<R, W> {
    reader: R,
    writer: W,
    buf: BytesMut,
    broken: bool,
}

impl<R, W> StreamChannel<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W, max_frame_bytes: usize) -> Self {
        Self {
            io: Mutex::new(StreamIo {
                reader,
                writer,
                buf: BytesMut::with_capacity(8 * 1024),
                broken: false,
            }),
            max_frame_bytes,
        }
    }
}

impl<R, W> StreamIo<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn round_trip(&mut self, message: &[u8], max_frame_bytes: usize) -> Result<Bytes> {
        let mut out = BytesMut::new();
        put_frame(&mut out, message, max_frame_bytes)?;
        self.writer
            .write_all(&out)
            .await
            .map_err(|e| VidwireError::Channel(format!("write failed: {e}")))?;
        self.writer
            .flush()
            .await
            .map_err(|e| VidwireError::Channel(format!("flush failed: {e}")))?;

        loop {
            if let Some(frame) = try_split_frame(&mut self.buf, max_frame_bytes)? {
                return Ok(frame);
            }
            let n = self
                .reader
                .read_buf(&mut self.buf)
                .await
                .map_err(|e| VidwireError::Channel(format!("read failed: {e}")))?;
            if n == 0 {
                return Err(VidwireError::Channel("stream closed before reply".into()));
            }
        }
    }
}

#[async_trait]
impl<R, W> Channel for StreamChannel<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn send(&self, message: Bytes) -> Result<Bytes> {
        let mut io = self.io.lock().await;
        if io.broken {
            return Err(VidwireError::Channel(
                "stream is unusable after an earlier failed or cancelled call".into(),
            ));
        }
        // an oversized request is rejected before anything is written
        if message.len() > self.max_frame_bytes {
            return Err(VidwireError::Channel(format!(
                "call of {} bytes exceeds frame limit of {}",
                message.len(),
                self.max_frame_bytes
            )));
        }
        // cleared only once the reply is read; a dropped call leaves it set
        io.broken = true;
        let result = io.round_trip(&message, self.max_frame_bytes).await;
        match &result {
            Ok(_) => io.broken = false,
            Err(e) => tracing::warn!(error = %e, "stream channel failed"),
        }
        result
    }
}
