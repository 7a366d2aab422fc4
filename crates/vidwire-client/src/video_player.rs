//! Typed caller for the video player API.

use vidwire_core::error::Result;
use vidwire_core::protocol::Channel;
use vidwire_core::schema::video_player::{
    method, CachingQueryRecord, CachingResultRecord, CreateRecord, LoopingRecord,
    MixWithOthersRecord, PlaybackSpeedRecord, PositionRecord, TextureRecord, VolumeRecord,
    VIDEO_PLAYER_SCHEMAS,
};

use crate::invoker::Invoker;

pub struct VideoPlayerClient<C> {
    invoker: Invoker<C>,
}

impl<C: Channel> VideoPlayerClient<C> {
    pub fn new(channel: C) -> Self {
        Self {
            invoker: Invoker::new(channel, &VIDEO_PLAYER_SCHEMAS),
        }
    }

    pub fn invoker(&self) -> &Invoker<C> {
        &self.invoker
    }

    pub async fn initialize(&self) -> Result<()> {
        self.invoker.call_typed(method::INITIALIZE, ()).await
    }

    pub async fn create(&self, msg: CreateRecord) -> Result<TextureRecord> {
        self.invoker.call_typed(method::CREATE, msg).await
    }

    pub async fn dispose(&self, msg: TextureRecord) -> Result<()> {
        self.invoker.call_typed(method::DISPOSE, msg).await
    }

    pub async fn set_looping(&self, msg: LoopingRecord) -> Result<()> {
        self.invoker.call_typed(method::SET_LOOPING, msg).await
    }

    pub async fn clear_cache(&self, msg: TextureRecord) -> Result<()> {
        self.invoker.call_typed(method::CLEAR_CACHE, msg).await
    }

    pub async fn set_volume(&self, msg: VolumeRecord) -> Result<()> {
        self.invoker.call_typed(method::SET_VOLUME, msg).await
    }

    pub async fn is_cache_supported_for_network_media(
        &self,
        msg: CachingQueryRecord,
    ) -> Result<CachingResultRecord> {
        self.invoker.call_typed(method::IS_CACHE_SUPPORTED, msg).await
    }

    pub async fn set_playback_speed(&self, msg: PlaybackSpeedRecord) -> Result<()> {
        self.invoker.call_typed(method::SET_PLAYBACK_SPEED, msg).await
    }

    pub async fn play(&self, msg: TextureRecord) -> Result<()> {
        self.invoker.call_typed(method::PLAY, msg).await
    }

    pub async fn position(&self, msg: TextureRecord) -> Result<PositionRecord> {
        self.invoker.call_typed(method::POSITION, msg).await
    }

    pub async fn seek_to(&self, msg: PositionRecord) -> Result<()> {
        self.invoker.call_typed(method::SEEK_TO, msg).await
    }

    pub async fn pause(&self, msg: TextureRecord) -> Result<()> {
        self.invoker.call_typed(method::PAUSE, msg).await
    }

    pub async fn set_mix_with_others(&self, msg: MixWithOthersRecord) -> Result<()> {
        self.invoker.call_typed(method::SET_MIX_WITH_OTHERS, msg).await
    }
}
