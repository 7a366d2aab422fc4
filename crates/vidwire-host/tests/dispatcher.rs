#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;

use vidwire_core::codec::Value;
use vidwire_core::protocol::{decode_reply, encode_call, ErrorEnvelope, Reply};
use vidwire_core::schema::video_player::{TextureRecord, VolumeRecord, VIDEO_PLAYER_SCHEMAS};
use vidwire_core::schema::IntoValue;
use vidwire_host::dispatch::{deferred, sync, Completion, Dispatcher};

fn dispatcher() -> Dispatcher {
    Dispatcher::new(&VIDEO_PLAYER_SCHEMAS)
}

/// Dispatch and collect every reply the sink receives before return.
fn dispatch_now(d: &Dispatcher, message: Bytes) -> Vec<Bytes> {
    let got = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&got);
    d.dispatch(message, move |b| sink.lock().unwrap().push(b));
    let out = got.lock().unwrap().clone();
    out
}

fn single_reply(d: &Dispatcher, message: Bytes) -> Reply {
    let replies = dispatch_now(d, message);
    assert_eq!(replies.len(), 1, "expected exactly one reply");
    decode_reply(&replies[0], &VIDEO_PLAYER_SCHEMAS).unwrap()
}

fn error_code(reply: Reply) -> String {
    reply.expect_err("expected error reply").code
}

#[test]
fn unknown_method_is_unimplemented_and_runs_nothing() {
    let d = dispatcher();
    let spy = Arc::new(AtomicUsize::new(0));
    let hits = Arc::clone(&spy);
    d.register(
        "play",
        Some(sync(move |_: TextureRecord| {
            hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })),
    );

    let reply = single_reply(&d, encode_call("stop", &Value::Null));
    let err = reply.unwrap_err();
    assert_eq!(err.code, "UNIMPLEMENTED");
    assert_eq!(err.message.as_deref(), Some("unimplemented method: stop"));
    assert_eq!(spy.load(Ordering::SeqCst), 0);
}

#[test]
fn undecodable_call_is_decode_error() {
    let d = dispatcher();
    // string claims 5 bytes, only 1 follows
    let reply = single_reply(&d, Bytes::from_static(&[0x00, 0x06, 0x05, b'a']));
    assert_eq!(error_code(reply), "DECODE_ERROR");

    let reply = single_reply(&d, Bytes::new());
    assert_eq!(error_code(reply), "DECODE_ERROR");
}

#[test]
fn wrong_argument_is_rejected_before_the_handler_runs() {
    let d = dispatcher();
    let spy = Arc::new(AtomicUsize::new(0));
    let hits = Arc::clone(&spy);
    d.register(
        "setVolume",
        Some(sync(move |_: VolumeRecord| {
            hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })),
    );

    let wrong_record = TextureRecord { texture_id: 7 }.into_value();
    let reply = single_reply(&d, encode_call("setVolume", &wrong_record));
    assert_eq!(error_code(reply), "ARGUMENT_ERROR");

    let null_volume = Value::Record(vidwire_core::codec::RecordValue {
        schema_id: 136,
        fields: vec![Value::Int64(7), Value::Null],
    });
    let reply = single_reply(&d, encode_call("setVolume", &null_volume));
    assert_eq!(error_code(reply), "ARGUMENT_ERROR");

    let reply = single_reply(&d, encode_call("setVolume", &Value::Null));
    assert_eq!(error_code(reply), "ARGUMENT_ERROR");

    assert_eq!(spy.load(Ordering::SeqCst), 0);
}

#[test]
fn set_volume_receives_the_record_and_replies_void() {
    let d = dispatcher();
    let seen = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&seen);
    d.register(
        "setVolume",
        Some(sync(move |msg: VolumeRecord| {
            *slot.lock().unwrap() = Some(msg);
            Ok(())
        })),
    );

    let arg = VolumeRecord { texture_id: 7, volume: 0.5 }.into_value();
    let replies = dispatch_now(&d, encode_call("setVolume", &arg));
    assert_eq!(replies, vec![Bytes::from_static(&[0x01, 0x00])]);
    assert_eq!(
        seen.lock().unwrap().clone(),
        Some(VolumeRecord { texture_id: 7, volume: 0.5 })
    );
}

#[test]
fn domain_failure_keeps_the_handler_code() {
    let d = dispatcher();
    d.register(
        "play",
        Some(sync(|_: TextureRecord| -> Result<(), ErrorEnvelope> {
            Err(ErrorEnvelope::new("E_PLAY").with_details(Value::Int64(3)))
        })),
    );
    d.register(
        "pause",
        Some(sync(|_: TextureRecord| -> Result<(), ErrorEnvelope> {
            Err(ErrorEnvelope::unknown("boom"))
        })),
    );

    let arg = TextureRecord { texture_id: 3 }.into_value();
    let err = single_reply(&d, encode_call("play", &arg)).unwrap_err();
    assert_eq!(err.code, "E_PLAY");
    assert_eq!(err.message, None);
    assert_eq!(err.details, Some(Value::Int64(3)));

    let err = single_reply(&d, encode_call("pause", &arg)).unwrap_err();
    assert_eq!(err.code, "UNKNOWN");
    assert_eq!(err.message.as_deref(), Some("boom"));
}

#[test]
fn deferred_double_completion_replies_once() {
    let d = dispatcher();
    d.register(
        "seekTo",
        Some(deferred(|_: Value, completion: Completion| {
            let again = completion.clone();
            assert!(completion.success(()));
            assert!(!again.error(ErrorEnvelope::unknown("late")));
        })),
    );

    let replies = dispatch_now(&d, encode_call("seekTo", &Value::Null));
    assert_eq!(replies.len(), 1);
    assert_eq!(
        decode_reply(&replies[0], &VIDEO_PLAYER_SCHEMAS).unwrap(),
        Ok(Value::Null)
    );
}

#[test]
fn in_flight_call_stays_with_the_replaced_handler() {
    let d = dispatcher();
    let parked: Arc<Mutex<Option<Completion>>> = Arc::new(Mutex::new(None));
    let park = Arc::clone(&parked);
    d.register(
        "seekTo",
        Some(deferred(move |_: Value, completion: Completion| {
            *park.lock().unwrap() = Some(completion);
        })),
    );

    let got = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&got);
    d.dispatch(encode_call("seekTo", &Value::Null), move |b| {
        sink.lock().unwrap().push(b)
    });
    assert!(got.lock().unwrap().is_empty());

    d.register("seekTo", Some(sync(|_: Value| Ok(Value::Int64(2)))));
    d.register("seekTo", None);

    let completion = parked.lock().unwrap().take().unwrap();
    completion.success(Value::Int64(1));

    let got = got.lock().unwrap();
    assert_eq!(got.len(), 1);
    assert_eq!(
        decode_reply(&got[0], &VIDEO_PLAYER_SCHEMAS).unwrap(),
        Ok(Value::Int64(1))
    );
}

#[test]
fn unregister_and_introspection() {
    let d = dispatcher();
    d.register("play", Some(sync(|_: TextureRecord| Ok(()))));
    d.register("create", Some(sync(|_: Value| Ok(()))));
    assert_eq!(d.registered_methods(), vec!["create".to_string(), "play".to_string()]);

    d.register("play", None);
    d.register("never-registered", None);
    assert!(!d.is_registered("play"));

    let arg = TextureRecord { texture_id: 1 }.into_value();
    let reply = single_reply(&d, encode_call("play", &arg));
    assert_eq!(error_code(reply), "UNIMPLEMENTED");
}

#[test]
fn concurrent_dispatch_while_registering() {
    let d = Arc::new(dispatcher());
    d.register("position", Some(sync(|msg: TextureRecord| Ok(Value::Int64(msg.texture_id)))));

    let churn = {
        let d = Arc::clone(&d);
        std::thread::spawn(move || {
            for _ in 0..200 {
                d.register("pause", Some(sync(|_: TextureRecord| Ok(()))));
                d.register("pause", None);
            }
        })
    };

    let workers: Vec<_> = (0..8)
        .map(|t| {
            let d = Arc::clone(&d);
            std::thread::spawn(move || {
                for i in 0..100 {
                    let id = t * 1000 + i;
                    let arg = TextureRecord { texture_id: id }.into_value();
                    let reply = single_reply(&d, encode_call("position", &arg));
                    assert_eq!(reply, Ok(Value::Int64(id)));
                }
            })
        })
        .collect();

    for w in workers {
        w.join().unwrap();
    }
    churn.join().unwrap();
}

#[tokio::test]
async fn deferred_completion_from_another_thread() {
    let d = dispatcher();
    d.register(
        "seekTo",
        Some(deferred(|_: Value, completion: Completion| {
            std::thread::spawn(move || {
                std::thread::sleep(std::time::Duration::from_millis(10));
                completion.success(Value::Bool(true));
            });
        })),
    );

    let raw = d.dispatch_await(encode_call("seekTo", &Value::Null)).await.unwrap();
    assert_eq!(
        decode_reply(&raw, &VIDEO_PLAYER_SCHEMAS).unwrap(),
        Ok(Value::Bool(true))
    );
}

#[tokio::test]
async fn dropped_completion_replies_unknown() {
    let d = dispatcher();
    d.register("seekTo", Some(deferred(|_: Value, completion: Completion| drop(completion))));

    let raw = d.dispatch_await(encode_call("seekTo", &Value::Null)).await.unwrap();
    let err = decode_reply(&raw, &VIDEO_PLAYER_SCHEMAS).unwrap().unwrap_err();
    assert_eq!(err.code, "UNKNOWN");
    assert_eq!(err.message.as_deref(), Some("completion dropped without a reply"));
}

#[test]
fn panicking_handler_gets_an_error_reply() {
    let d = dispatcher();
    d.register(
        "play",
        Some(sync(|_: TextureRecord| -> Result<(), ErrorEnvelope> {
            panic!("decoder state corrupted")
        })),
    );
    d.register(
        "seekTo",
        Some(deferred(|_: Value, _completion: Completion| panic!("seek backend gone"))),
    );
    d.register("pause", Some(sync(|_: TextureRecord| Ok(()))));

    let arg = TextureRecord { texture_id: 1 }.into_value();
    let err = single_reply(&d, encode_call("play", &arg)).unwrap_err();
    assert_eq!(err.code, "UNKNOWN");
    assert_eq!(
        err.message.as_deref(),
        Some("handler panicked: decoder state corrupted")
    );

    let err = single_reply(&d, encode_call("seekTo", &Value::Null)).unwrap_err();
    assert_eq!(err.code, "UNKNOWN");

    // the dispatcher keeps serving after a handler panic
    assert_eq!(single_reply(&d, encode_call("pause", &arg)), Ok(Value::Null));
}

#[test]
fn panic_after_completing_keeps_the_first_reply() {
    let d = dispatcher();
    d.register(
        "seekTo",
        Some(deferred(|_: Value, completion: Completion| {
            completion.success(Value::Int64(5));
            panic!("cleanup failed");
        })),
    );

    let reply = single_reply(&d, encode_call("seekTo", &Value::Null));
    assert_eq!(reply, Ok(Value::Int64(5)));
}
