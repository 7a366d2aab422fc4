//! Video player host API and its registration against a [`Dispatcher`].

use std::sync::Arc;

use vidwire_core::schema::video_player::{
    method, CachingQueryRecord, CachingResultRecord, CreateRecord, LoopingRecord,
    MixWithOthersRecord, PlaybackSpeedRecord, PositionRecord, TextureRecord, VolumeRecord,
};
use vidwire_core::schema::{FromValue, IntoValue};

use crate::dispatch::{deferred, sync, Completion, Dispatcher, HandlerResult, MethodHandler};

/// Operations a video player backend exposes over the channel.
///
/// Every method except [`seek_to`](Self::seek_to) is synchronous. Methods
/// returning `()` reply with a NULL success value.
pub trait VideoPlayerApi: Send + Sync + 'static {
    fn initialize(&self) -> HandlerResult<()>;

    fn create(&self, msg: CreateRecord) -> HandlerResult<TextureRecord>;

    fn dispose(&self, msg: TextureRecord) -> HandlerResult<()>;

    fn set_looping(&self, msg: LoopingRecord) -> HandlerResult<()>;

    fn clear_cache(&self, msg: TextureRecord) -> HandlerResult<()>;

    fn set_volume(&self, msg: VolumeRecord) -> HandlerResult<()>;

    fn is_cache_supported_for_network_media(
        &self,
        msg: CachingQueryRecord,
    ) -> HandlerResult<CachingResultRecord>;

    fn set_playback_speed(&self, msg: PlaybackSpeedRecord) -> HandlerResult<()>;

    fn play(&self, msg: TextureRecord) -> HandlerResult<()>;

    fn position(&self, msg: TextureRecord) -> HandlerResult<PositionRecord>;

    /// Completes through `completion`, possibly after returning.
    fn seek_to(&self, msg: PositionRecord, completion: Completion);

    fn pause(&self, msg: TextureRecord) -> HandlerResult<()>;

    fn set_mix_with_others(&self, msg: MixWithOthersRecord) -> HandlerResult<()>;
}

/// Register every video player method against `api`, or unregister all of
/// them when `api` is `None`.
pub fn setup_video_player_api(dispatcher: &Dispatcher, api: Option<Arc<dyn VideoPlayerApi>>) {
    let Some(api) = api else {
        for name in method::ALL {
            dispatcher.register(name, None);
        }
        tracing::debug!("video player api unregistered");
        return;
    };

    dispatcher.register(method::INITIALIZE, Some(adapt(&api, |api, _: ()| api.initialize())));
    dispatcher.register(
        method::CREATE,
        Some(adapt(&api, |api, msg: CreateRecord| api.create(msg))),
    );
    dispatcher.register(
        method::DISPOSE,
        Some(adapt(&api, |api, msg: TextureRecord| api.dispose(msg))),
    );
    dispatcher.register(
        method::SET_LOOPING,
        Some(adapt(&api, |api, msg: LoopingRecord| api.set_looping(msg))),
    );
    dispatcher.register(
        method::CLEAR_CACHE,
        Some(adapt(&api, |api, msg: TextureRecord| api.clear_cache(msg))),
    );
    dispatcher.register(
        method::SET_VOLUME,
        Some(adapt(&api, |api, msg: VolumeRecord| api.set_volume(msg))),
    );
    dispatcher.register(
        method::IS_CACHE_SUPPORTED,
        Some(adapt(&api, |api, msg: CachingQueryRecord| {
            api.is_cache_supported_for_network_media(msg)
        })),
    );
    dispatcher.register(
        method::SET_PLAYBACK_SPEED,
        Some(adapt(&api, |api, msg: PlaybackSpeedRecord| api.set_playback_speed(msg))),
    );
    dispatcher.register(
        method::PLAY,
        Some(adapt(&api, |api, msg: TextureRecord| api.play(msg))),
    );
    dispatcher.register(
        method::POSITION,
        Some(adapt(&api, |api, msg: TextureRecord| api.position(msg))),
    );
    let seek_api = Arc::clone(&api);
    dispatcher.register(
        method::SEEK_TO,
        Some(deferred(move |msg: PositionRecord, completion| {
            seek_api.seek_to(msg, completion)
        })),
    );
    dispatcher.register(
        method::PAUSE,
        Some(adapt(&api, |api, msg: TextureRecord| api.pause(msg))),
    );
    dispatcher.register(
        method::SET_MIX_WITH_OTHERS,
        Some(adapt(&api, |api, msg: MixWithOthersRecord| api.set_mix_with_others(msg))),
    );
    tracing::debug!(methods = method::ALL.len(), "video player api registered");
}

fn adapt<A, R>(
    api: &Arc<dyn VideoPlayerApi>,
    f: fn(&dyn VideoPlayerApi, A) -> HandlerResult<R>,
) -> Arc<dyn MethodHandler>
where
    A: FromValue,
    R: IntoValue,
{
    let api = Arc::clone(api);
    sync(move |arg: A| f(api.as_ref(), arg))
}
