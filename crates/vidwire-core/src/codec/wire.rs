//! Value wire encoding (panic-free).
//!
//! Parsing rules:
//! - Never index (`buf[0]`); always use `Buf` and `remaining()` checks.
//! - Never `unwrap()` / `expect()` / `panic!()` in production paths.
//! - Length prefixes are unsigned LEB128 and are checked against the bytes
//!   actually left before anything is allocated.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::codec::value::{tag, RecordValue, Value};
use crate::error::{Result, VidwireError};

/// Deepest list/map/record nesting a valid value may have.
///
/// The top-level value sits at depth 0 and each list element, map key or
/// value, and record field is one level below its container. The decoder
/// rejects anything deeper; encoders do not check, so callers putting
/// untrusted values on the wire run [`check_depth`] first.
pub const MAX_DEPTH: usize = 64;

/// Longest LEB128 encoding of a u64.
const MAX_VARINT_LEN: usize = 10;

/// Field counts for the RECORD schema ids a decoder accepts.
pub trait RecordShapes {
    /// Declared field count for `schema_id`, or `None` when the id is unknown.
    fn field_count(&self, schema_id: u8) -> Option<usize>;
}

impl<F> RecordShapes for F
where
    F: Fn(u8) -> Option<usize>,
{
    fn field_count(&self, schema_id: u8) -> Option<usize> {
        self(schema_id)
    }
}

/// Encode one value into a fresh buffer.
pub fn encode_value(value: &Value) -> Bytes {
    let mut out = BytesMut::new();
    put_value(&mut out, value);
    out.freeze()
}

/// Append one tagged value.
///
/// A value nested deeper than [`MAX_DEPTH`] still encodes, but no decoder
/// accepts the result.
pub fn put_value(out: &mut BytesMut, value: &Value) {
    match value {
        Value::Null => out.put_u8(tag::NULL),
        Value::Bool(true) => out.put_u8(tag::TRUE),
        Value::Bool(false) => out.put_u8(tag::FALSE),
        Value::Int32(v) => {
            out.put_u8(tag::INT32);
            out.put_i32_le(*v);
        }
        Value::Int64(v) => {
            out.put_u8(tag::INT64);
            out.put_i64_le(*v);
        }
        Value::Float64(v) => {
            out.put_u8(tag::FLOAT64);
            out.put_f64_le(*v);
        }
        Value::String(s) => put_string(out, s),
        Value::Bytes(b) => {
            out.put_u8(tag::BYTES);
            put_len(out, b.len());
            out.put_slice(b);
        }
        Value::List(items) => {
            out.put_u8(tag::LIST);
            put_len(out, items.len());
            for item in items {
                put_value(out, item);
            }
        }
        Value::Map(pairs) => {
            out.put_u8(tag::MAP);
            put_len(out, pairs.len());
            for (k, v) in pairs {
                put_value(out, k);
                put_value(out, v);
            }
        }
        Value::Record(rec) => {
            out.put_u8(tag::RECORD);
            out.put_u8(rec.schema_id);
            put_len(out, rec.fields.len());
            for field in &rec.fields {
                put_value(out, field);
            }
        }
    }
}

/// Reject values nested deeper than [`MAX_DEPTH`] with `MalformedPayload`,
/// the same error the decoder reports for their encoding.
pub fn check_depth(value: &Value) -> Result<()> {
    let mut pending = vec![(value, 0usize)];
    while let Some((v, depth)) = pending.pop() {
        if depth > MAX_DEPTH {
            return Err(VidwireError::malformed("value nesting too deep"));
        }
        match v {
            Value::List(items) => pending.extend(items.iter().map(|i| (i, depth + 1))),
            Value::Map(pairs) => {
                for (k, v) in pairs {
                    pending.push((k, depth + 1));
                    pending.push((v, depth + 1));
                }
            }
            Value::Record(rec) => pending.extend(rec.fields.iter().map(|f| (f, depth + 1))),
            _ => {}
        }
    }
    Ok(())
}

/// Append a tagged STRING.
pub(crate) fn put_string(out: &mut BytesMut, s: &str) {
    out.put_u8(tag::STRING);
    put_len(out, s.len());
    out.put_slice(s.as_bytes());
}

/// Decode one value starting at `offset`; returns the value and the offset
/// just past it.
pub fn decode_value<S>(bytes: &[u8], offset: usize, shapes: &S) -> Result<(Value, usize)>
where
    S: RecordShapes + ?Sized,
{
    let mut buf = bytes
        .get(offset..)
        .ok_or_else(|| VidwireError::malformed("offset past end of buffer"))?;
    let before = buf.len();
    let value = get_value(&mut buf, shapes)?;
    Ok((value, offset + (before - buf.len())))
}

/// Read one tagged value from `buf`.
pub fn get_value<B, S>(buf: &mut B, shapes: &S) -> Result<Value>
where
    B: Buf,
    S: RecordShapes + ?Sized,
{
    get_value_at(buf, shapes, 0)
}

/// Read a value that must be a tagged STRING.
pub(crate) fn get_string<B: Buf>(buf: &mut B, what: &str) -> Result<String> {
    need(buf, 1, what)?;
    match buf.get_u8() {
        tag::STRING => get_string_payload(buf),
        other => Err(VidwireError::malformed(format!(
            "{what}: expected string tag, got 0x{other:02x}"
        ))),
    }
}

fn get_value_at<B, S>(buf: &mut B, shapes: &S, depth: usize) -> Result<Value>
where
    B: Buf,
    S: RecordShapes + ?Sized,
{
    if depth > MAX_DEPTH {
        return Err(VidwireError::malformed("value nesting too deep"));
    }
    need(buf, 1, "type tag")?;

    match buf.get_u8() {
        tag::NULL => Ok(Value::Null),
        tag::TRUE => Ok(Value::Bool(true)),
        tag::FALSE => Ok(Value::Bool(false)),
        tag::INT32 => {
            need(buf, 4, "int32")?;
            Ok(Value::Int32(buf.get_i32_le()))
        }
        tag::INT64 => {
            need(buf, 8, "int64")?;
            Ok(Value::Int64(buf.get_i64_le()))
        }
        tag::FLOAT64 => {
            need(buf, 8, "float64")?;
            Ok(Value::Float64(buf.get_f64_le()))
        }
        tag::STRING => get_string_payload(buf).map(Value::String),
        tag::BYTES => {
            let len = get_len(buf)?;
            need(buf, len, "bytes")?;
            Ok(Value::Bytes(buf.copy_to_bytes(len)))
        }
        tag::LIST => {
            let count = get_len(buf)?;
            // every element needs at least its tag byte
            need(buf, count, "list elements")?;
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(get_value_at(buf, shapes, depth + 1)?);
            }
            Ok(Value::List(items))
        }
        tag::MAP => {
            let count = get_len(buf)?;
            need(buf, count.saturating_mul(2), "map entries")?;
            let mut pairs = Vec::with_capacity(count);
            for _ in 0..count {
                let k = get_value_at(buf, shapes, depth + 1)?;
                let v = get_value_at(buf, shapes, depth + 1)?;
                pairs.push((k, v));
            }
            Ok(Value::Map(pairs))
        }
        tag::RECORD => {
            need(buf, 1, "record schema id")?;
            let schema_id = buf.get_u8();
            let expected = shapes.field_count(schema_id).ok_or_else(|| {
                VidwireError::malformed(format!("unknown record schema id {schema_id}"))
            })?;
            let count = get_len(buf)?;
            if count != expected {
                return Err(VidwireError::malformed(format!(
                    "record {schema_id}: expected {expected} fields, got {count}"
                )));
            }
            need(buf, count, "record fields")?;
            let mut fields = Vec::with_capacity(count);
            for _ in 0..count {
                fields.push(get_value_at(buf, shapes, depth + 1)?);
            }
            Ok(Value::Record(RecordValue { schema_id, fields }))
        }
        other => Err(VidwireError::malformed(format!(
            "unknown type tag 0x{other:02x}"
        ))),
    }
}

fn get_string_payload<B: Buf>(buf: &mut B) -> Result<String> {
    let len = get_len(buf)?;
    need(buf, len, "string")?;
    let raw = buf.copy_to_bytes(len);
    String::from_utf8(raw.to_vec())
        .map_err(|e| VidwireError::malformed(format!("string is not utf-8: {e}")))
}

fn need<B: Buf>(buf: &B, n: usize, what: &str) -> Result<()> {
    if buf.remaining() < n {
        return Err(VidwireError::malformed(format!(
            "truncated {what}: need {n} bytes, have {}",
            buf.remaining()
        )));
    }
    Ok(())
}

fn put_len(out: &mut BytesMut, len: usize) {
    put_varint(out, len as u64);
}

fn put_varint(out: &mut BytesMut, mut v: u64) {
    while v >= 0x80 {
        out.put_u8((v as u8 & 0x7f) | 0x80);
        v >>= 7;
    }
    out.put_u8(v as u8);
}

fn get_len<B: Buf>(buf: &mut B) -> Result<usize> {
    let v = get_varint(buf)?;
    usize::try_from(v).map_err(|_| VidwireError::malformed("length prefix exceeds usize"))
}

fn get_varint<B: Buf>(buf: &mut B) -> Result<u64> {
    let mut value = 0u64;
    for i in 0..MAX_VARINT_LEN {
        need(buf, 1, "length prefix")?;
        let byte = buf.get_u8();
        // 10th byte may only carry the top bit of a u64
        if i == MAX_VARINT_LEN - 1 && byte > 0x01 {
            return Err(VidwireError::malformed("length prefix overflows u64"));
        }
        value |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(VidwireError::malformed("length prefix overflows u64"))
}
