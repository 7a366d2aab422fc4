//! vidwire host
//!
//! Serves the video player API over stdin/stdout:
//! - frames: `[u32 LE len][envelope]` in both directions
//! - optional first argument: path to a YAML config
//! - logs go to stderr (`RUST_LOG` filter) so stdout stays a clean frame stream

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use vidwire_core::error::Result;
use vidwire_host::{app_state::AppState, config, services::MemoryPlayer, transport};

#[tokio::main]
async fn main() -> Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cfg = match std::env::args().nth(1) {
        Some(path) => config::load_from_file(&path)?,
        None => config::HostConfig::default(),
    };

    let state = AppState::new(cfg, Arc::new(MemoryPlayer::new()))?;
    let max_frame_bytes = state.cfg().channel.max_frame_bytes;

    tracing::info!(channel = %state.cfg().channel.name, max_frame_bytes, "vidwire-host serving stdio");
    let result = transport::serve_stream(
        state.dispatcher(),
        tokio::io::stdin(),
        tokio::io::stdout(),
        max_frame_bytes,
    )
    .await;

    match &result {
        Ok(()) => tracing::info!("input closed; shutting down"),
        Err(e) => tracing::error!(error = %e, "stream failed"),
    }
    result
}
