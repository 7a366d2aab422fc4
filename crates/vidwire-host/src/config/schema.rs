use serde::Deserialize;
use vidwire_core::error::{Result, VidwireError};

pub const MIN_FRAME_BYTES: usize = 64;
pub const MAX_FRAME_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    pub version: u32,

    #[serde(default)]
    pub channel: ChannelSection,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            version: 1,
            channel: ChannelSection::default(),
        }
    }
}

impl HostConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(VidwireError::Config(format!(
                "unsupported config version {}",
                self.version
            )));
        }
        self.channel.validate()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelSection {
    /// Label used in logs.
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
}

impl Default for ChannelSection {
    fn default() -> Self {
        Self {
            name: default_name(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

impl ChannelSection {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(VidwireError::Config("channel.name must not be empty".into()));
        }
        if !(MIN_FRAME_BYTES..=MAX_FRAME_BYTES).contains(&self.max_frame_bytes) {
            return Err(VidwireError::Config(format!(
                "channel.max_frame_bytes must be between {MIN_FRAME_BYTES} and {MAX_FRAME_BYTES}"
            )));
        }
        Ok(())
    }
}

fn default_name() -> String {
    "dev.flutter.pigeon.AVFoundationVideoPlayerApi".into()
}
fn default_max_frame_bytes() -> usize {
    1024 * 1024
}
