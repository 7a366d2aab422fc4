//! Host config loader (strict parsing).

pub mod schema;

use std::fs;
use std::path::Path;

use vidwire_core::error::{Result, VidwireError};

pub use schema::{ChannelSection, HostConfig};

pub fn load_from_file(path: impl AsRef<Path>) -> Result<HostConfig> {
    let path = path.as_ref();
    let s = fs::read_to_string(path).map_err(|e| {
        VidwireError::Config(format!("read config failed ({}): {e}", path.display()))
    })?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<HostConfig> {
    let cfg: HostConfig = serde_yaml::from_str(s)
        .map_err(|e| VidwireError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
