//! In-memory video player backend.
//!
//! Tracks per-texture playback state without decoding any media. Used by the
//! host binary and as the reference backend in tests.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use dashmap::DashMap;

use vidwire_core::codec::Value;
use vidwire_core::protocol::ErrorEnvelope;
use vidwire_core::schema::video_player::{
    CachingQueryRecord, CachingResultRecord, CreateRecord, LoopingRecord, MixWithOthersRecord,
    PlaybackSpeedRecord, PositionRecord, TextureRecord, VolumeRecord,
};

use crate::api::VideoPlayerApi;
use crate::dispatch::{Completion, HandlerResult};

pub const NO_SUCH_TEXTURE: &str = "NO_SUCH_TEXTURE";
pub const INVALID_SOURCE: &str = "INVALID_SOURCE";
pub const INVALID_SPEED: &str = "INVALID_SPEED";
pub const INVALID_POSITION: &str = "INVALID_POSITION";

#[derive(Debug, Clone, PartialEq)]
pub enum MediaSource {
    Asset {
        asset: String,
        package_name: Option<String>,
    },
    Network {
        uri: String,
        format_hint: Option<String>,
        http_headers: Vec<(String, String)>,
    },
}

/// Snapshot of one player's state.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub source: MediaSource,
    pub cache: bool,
    pub is_looping: bool,
    pub volume: f64,
    pub speed: f64,
    pub position: i64,
    pub playing: bool,
}

impl PlayerState {
    fn new(source: MediaSource, cache: bool) -> Self {
        Self {
            source,
            cache,
            is_looping: false,
            volume: 1.0,
            speed: 1.0,
            position: 0,
            playing: false,
        }
    }
}

pub struct MemoryPlayer {
    players: DashMap<i64, PlayerState>,
    next_id: AtomicI64,
    mix_with_others: AtomicBool,
}

impl Default for MemoryPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryPlayer {
    pub fn new() -> Self {
        Self {
            players: DashMap::new(),
            next_id: AtomicI64::new(1),
            mix_with_others: AtomicBool::new(false),
        }
    }

    pub fn player(&self, texture_id: i64) -> Option<PlayerState> {
        self.players.get(&texture_id).map(|p| p.value().clone())
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn mixes_with_others(&self) -> bool {
        self.mix_with_others.load(Ordering::Relaxed)
    }

    fn with_player<T>(
        &self,
        texture_id: i64,
        f: impl FnOnce(&mut PlayerState) -> HandlerResult<T>,
    ) -> HandlerResult<T> {
        let mut player = self
            .players
            .get_mut(&texture_id)
            .ok_or_else(|| no_such_texture(texture_id))?;
        f(player.value_mut())
    }
}

fn no_such_texture(texture_id: i64) -> ErrorEnvelope {
    ErrorEnvelope::new(NO_SUCH_TEXTURE)
        .with_message(format!("no player for texture {texture_id}"))
        .with_details(Value::Int64(texture_id))
}

impl VideoPlayerApi for MemoryPlayer {
    fn initialize(&self) -> HandlerResult<()> {
        let dropped = self.players.len();
        self.players.clear();
        tracing::debug!(dropped, "players reset");
        Ok(())
    }

    fn create(&self, msg: CreateRecord) -> HandlerResult<TextureRecord> {
        let source = match (msg.asset, msg.uri) {
            (Some(asset), None) => MediaSource::Asset {
                asset,
                package_name: msg.package_name,
            },
            (None, Some(uri)) => MediaSource::Network {
                uri,
                format_hint: msg.format_hint,
                http_headers: msg.http_headers.into_iter().collect(),
            },
            (Some(_), Some(_)) => {
                return Err(ErrorEnvelope::new(INVALID_SOURCE)
                    .with_message("asset and uri are mutually exclusive"))
            }
            (None, None) => {
                return Err(
                    ErrorEnvelope::new(INVALID_SOURCE).with_message("one of asset or uri is required")
                )
            }
        };
        let texture_id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.players
            .insert(texture_id, PlayerState::new(source, msg.cache.unwrap_or(false)));
        tracing::debug!(texture_id, "player created");
        Ok(TextureRecord { texture_id })
    }

    fn dispose(&self, msg: TextureRecord) -> HandlerResult<()> {
        self.players
            .remove(&msg.texture_id)
            .map(|_| ())
            .ok_or_else(|| no_such_texture(msg.texture_id))
    }

    fn set_looping(&self, msg: LoopingRecord) -> HandlerResult<()> {
        self.with_player(msg.texture_id, |p| {
            p.is_looping = msg.is_looping;
            Ok(())
        })
    }

    fn clear_cache(&self, msg: TextureRecord) -> HandlerResult<()> {
        // nothing is cached in memory; only the texture must exist
        self.with_player(msg.texture_id, |_| Ok(()))
    }

    fn set_volume(&self, msg: VolumeRecord) -> HandlerResult<()> {
        self.with_player(msg.texture_id, |p| {
            p.volume = if msg.volume.is_nan() { 0.0 } else { msg.volume.clamp(0.0, 1.0) };
            Ok(())
        })
    }

    fn is_cache_supported_for_network_media(
        &self,
        msg: CachingQueryRecord,
    ) -> HandlerResult<CachingResultRecord> {
        let url = msg.url.to_ascii_lowercase();
        Ok(CachingResultRecord {
            is_supported: url.starts_with("http://") || url.starts_with("https://"),
        })
    }

    fn set_playback_speed(&self, msg: PlaybackSpeedRecord) -> HandlerResult<()> {
        if !(msg.speed.is_finite() && msg.speed > 0.0) {
            return Err(ErrorEnvelope::new(INVALID_SPEED)
                .with_message(format!("playback speed must be positive, got {}", msg.speed))
                .with_details(Value::Float64(msg.speed)));
        }
        self.with_player(msg.texture_id, |p| {
            p.speed = msg.speed;
            Ok(())
        })
    }

    fn play(&self, msg: TextureRecord) -> HandlerResult<()> {
        self.with_player(msg.texture_id, |p| {
            p.playing = true;
            Ok(())
        })
    }

    fn position(&self, msg: TextureRecord) -> HandlerResult<PositionRecord> {
        self.with_player(msg.texture_id, |p| {
            Ok(PositionRecord {
                texture_id: msg.texture_id,
                position: p.position,
            })
        })
    }

    fn seek_to(&self, msg: PositionRecord, completion: Completion) {
        let outcome = if msg.position < 0 {
            Err(ErrorEnvelope::new(INVALID_POSITION)
                .with_message(format!("cannot seek to {}", msg.position))
                .with_details(Value::Int64(msg.position)))
        } else {
            self.with_player(msg.texture_id, |p| {
                p.position = msg.position;
                Ok(())
            })
        };

        // reply off the dispatch frame when a runtime is available
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    completion.complete(outcome.map(|()| Value::Null));
                });
            }
            Err(_) => {
                completion.complete(outcome.map(|()| Value::Null));
            }
        }
    }

    fn pause(&self, msg: TextureRecord) -> HandlerResult<()> {
        self.with_player(msg.texture_id, |p| {
            p.playing = false;
            Ok(())
        })
    }

    fn set_mix_with_others(&self, msg: MixWithOthersRecord) -> HandlerResult<()> {
        self.mix_with_others
            .store(msg.mix_with_others, Ordering::Relaxed);
        Ok(())
    }
}
