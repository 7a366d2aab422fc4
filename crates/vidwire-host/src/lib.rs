//! vidwire host library entry.
//!
//! Wires the dispatcher, the video player API binding, config, and the
//! framed stream transport. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod api;
pub mod app_state;
pub mod config;
pub mod dispatch;
pub mod services;
pub mod transport;
