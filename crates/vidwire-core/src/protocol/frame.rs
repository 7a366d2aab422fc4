//! Length-prefixed frames for carrying envelopes over a byte stream.
//!
//! Frame: `[u32 LE payload length][payload]`. The splitter is runtime-free so
//! both the host and client stream adapters can share it.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Result, VidwireError};

/// Size of the length header.
pub const FRAME_HEADER_LEN: usize = 4;

/// Append one frame to `out`.
pub fn put_frame(out: &mut BytesMut, payload: &[u8], max_frame_bytes: usize) -> Result<()> {
    check_len(payload.len(), max_frame_bytes)?;
    let len = u32::try_from(payload.len())
        .map_err(|_| VidwireError::Channel("frame length exceeds u32".into()))?;
    out.reserve(FRAME_HEADER_LEN + payload.len());
    out.put_u32_le(len);
    out.put_slice(payload);
    Ok(())
}

/// Split one complete frame off the front of `buf`.
///
/// Returns `Ok(None)` until the whole frame has arrived. An oversized length
/// header is an error: the stream cannot be resynchronised after it.
pub fn try_split_frame(buf: &mut BytesMut, max_frame_bytes: usize) -> Result<Option<Bytes>> {
    if buf.len() < FRAME_HEADER_LEN {
        return Ok(None);
    }
    let mut header = &buf[..FRAME_HEADER_LEN];
    let len = header.get_u32_le() as usize;
    check_len(len, max_frame_bytes)?;

    if buf.len() < FRAME_HEADER_LEN + len {
        buf.reserve(FRAME_HEADER_LEN + len - buf.len());
        return Ok(None);
    }
    buf.advance(FRAME_HEADER_LEN);
    Ok(Some(buf.split_to(len).freeze()))
}

fn check_len(len: usize, max_frame_bytes: usize) -> Result<()> {
    if len > max_frame_bytes {
        tracing::warn!(len, max_frame_bytes, "frame exceeds limit");
        return Err(VidwireError::Channel(format!(
            "frame of {len} bytes exceeds limit of {max_frame_bytes}"
        )));
    }
    Ok(())
}
