//! Codec properties: round-trips over a spread of values and prefix
//! truncation of whole envelopes.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::collections::BTreeMap;

use bytes::Bytes;

use vidwire_core::codec::{decode_value, encode_value, RecordValue, Value};
use vidwire_core::protocol::{decode_call, decode_reply, encode_call, encode_reply, ErrorEnvelope};
use vidwire_core::schema::video_player::{CreateRecord, PositionRecord, VIDEO_PLAYER_SCHEMAS};
use vidwire_core::schema::IntoValue;
use vidwire_core::VidwireError;

fn sample_values() -> Vec<Value> {
    let mut headers = BTreeMap::new();
    headers.insert("User-Agent".to_string(), "vidwire".to_string());
    vec![
        Value::Null,
        Value::Bool(false),
        Value::Int32(-7),
        Value::Int64(1 << 40),
        Value::Float64(std::f64::consts::PI),
        Value::String("日本語".into()),
        Value::Bytes(Bytes::from(vec![7u8; 200])),
        Value::List(vec![]),
        Value::List(vec![Value::Int32(1), Value::String("two".into()), Value::Null]),
        Value::Map(vec![
            ("k".into(), Value::List(vec![Value::Bool(true)])),
            (Value::Int64(3), Value::Map(vec![])),
        ]),
        PositionRecord { texture_id: 3, position: 1500 }.into_value(),
        CreateRecord {
            asset: Some("a.mp4".into()),
            cache: Some(false),
            http_headers: headers,
            ..CreateRecord::default()
        }
        .into_value(),
        Value::List(vec![Value::Record(RecordValue {
            schema_id: 135,
            fields: vec![Value::Int64(0)],
        })]),
    ]
}

#[test]
fn values_roundtrip() {
    for v in sample_values() {
        let bytes = encode_value(&v);
        let (back, end) = decode_value(&bytes, 0, &VIDEO_PLAYER_SCHEMAS).unwrap();
        assert_eq!(back, v);
        assert_eq!(end, bytes.len());
    }
}

#[test]
fn calls_roundtrip() {
    for v in sample_values() {
        let bytes = encode_call("someMethod", &v);
        let (method, arg) = decode_call(&bytes, &VIDEO_PLAYER_SCHEMAS).unwrap();
        assert_eq!(method, "someMethod");
        assert_eq!(arg, v);
    }
}

#[test]
fn every_strict_prefix_of_a_call_is_malformed() {
    for v in sample_values() {
        let bytes = encode_call("setVolume", &v);
        for cut in 0..bytes.len() {
            match decode_call(&bytes[..cut], &VIDEO_PLAYER_SCHEMAS) {
                Err(VidwireError::MalformedPayload(_)) => {}
                other => panic!("prefix {cut} of {v:?}: {other:?}"),
            }
        }
    }
}

#[test]
fn every_strict_prefix_of_a_reply_is_malformed() {
    let replies = [
        Ok(PositionRecord { texture_id: 3, position: 1500 }.into_value()),
        Err(ErrorEnvelope::new("E").with_message("m").with_details(Value::Int32(1))),
    ];
    for reply in replies {
        let bytes = encode_reply(&reply);
        for cut in 0..bytes.len() {
            assert!(
                matches!(
                    decode_reply(&bytes[..cut], &VIDEO_PLAYER_SCHEMAS),
                    Err(VidwireError::MalformedPayload(_))
                ),
                "prefix {cut}"
            );
        }
    }
}
