//! Shared application state for the vidwire host.
//!
//! Validates config, builds the dispatcher, and binds the video player API.

use std::sync::Arc;

use vidwire_core::error::Result;
use vidwire_core::schema::video_player::{method, VIDEO_PLAYER_SCHEMAS};

use crate::api::{setup_video_player_api, VideoPlayerApi};
use crate::config::HostConfig;
use crate::dispatch::Dispatcher;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    dispatcher: Arc<Dispatcher>,
}

struct AppStateInner {
    cfg: HostConfig,
}

impl AppState {
    /// Build application state.
    /// Returns Result so main can report config errors instead of panicking.
    pub fn new(cfg: HostConfig, api: Arc<dyn VideoPlayerApi>) -> Result<Self> {
        cfg.validate()?;

        let dispatcher = Dispatcher::new(&VIDEO_PLAYER_SCHEMAS);
        setup_video_player_api(&dispatcher, Some(api));

        // registration sanity check
        for name in method::ALL {
            if !dispatcher.is_registered(name) {
                tracing::warn!(channel = %cfg.channel.name, method = name, "method left unregistered");
            }
        }
        tracing::info!(
            channel = %cfg.channel.name,
            methods = dispatcher.registered_methods().len(),
            "host ready"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg }),
            dispatcher: Arc::new(dispatcher),
        })
    }

    pub fn cfg(&self) -> &HostConfig {
        &self.inner.cfg
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }
}
