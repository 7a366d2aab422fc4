//! Host-side API surfaces bound to the dispatcher.

pub mod video_player;

pub use video_player::{setup_video_player_api, VideoPlayerApi};
