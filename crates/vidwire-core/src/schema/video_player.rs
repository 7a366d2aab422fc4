//! Record set and method names for the video player API.
//!
//! Custom record ids start at 128, below which tags are reserved for the
//! generic value kinds in generated bindings. Ids are part of the wire
//! contract: never renumber an existing record.

use std::collections::BTreeMap;

use crate::codec::Value;
use crate::error::Result;
use crate::schema::{
    string_map_value, FieldDescriptor as F, FieldKind as K, FieldReader, Record, RecordDescriptor,
    SchemaTable,
};

/// Method names, as carried in METHOD_CALL envelopes.
pub mod method {
    pub const INITIALIZE: &str = "initialize";
    pub const CREATE: &str = "create";
    pub const DISPOSE: &str = "dispose";
    pub const SET_LOOPING: &str = "setLooping";
    pub const CLEAR_CACHE: &str = "clearCache";
    pub const SET_VOLUME: &str = "setVolume";
    pub const IS_CACHE_SUPPORTED: &str = "isCacheSupportedForNetworkMedia";
    pub const SET_PLAYBACK_SPEED: &str = "setPlaybackSpeed";
    pub const PLAY: &str = "play";
    pub const POSITION: &str = "position";
    pub const SEEK_TO: &str = "seekTo";
    pub const PAUSE: &str = "pause";
    pub const SET_MIX_WITH_OTHERS: &str = "setMixWithOthers";

    pub const ALL: [&str; 13] = [
        INITIALIZE,
        CREATE,
        DISPOSE,
        SET_LOOPING,
        CLEAR_CACHE,
        SET_VOLUME,
        IS_CACHE_SUPPORTED,
        SET_PLAYBACK_SPEED,
        PLAY,
        POSITION,
        SEEK_TO,
        PAUSE,
        SET_MIX_WITH_OTHERS,
    ];
}

const CREATE: RecordDescriptor = RecordDescriptor {
    id: 128,
    name: "CreateRecord",
    fields: &[
        F::nullable("asset", K::String),
        F::nullable("uri", K::String),
        F::nullable("packageName", K::String),
        F::nullable("formatHint", K::String),
        F::nullable("cache", K::Bool),
        F::required("httpHeaders", K::StringMap),
    ],
};

const CACHING_QUERY: RecordDescriptor = RecordDescriptor {
    id: 129,
    name: "CachingQueryRecord",
    fields: &[F::required("url", K::String)],
};

const CACHING_RESULT: RecordDescriptor = RecordDescriptor {
    id: 130,
    name: "CachingResultRecord",
    fields: &[F::required("isSupported", K::Bool)],
};

const LOOPING: RecordDescriptor = RecordDescriptor {
    id: 131,
    name: "LoopingRecord",
    fields: &[
        F::required("textureId", K::Int64),
        F::required("isLooping", K::Bool),
    ],
};

const MIX_WITH_OTHERS: RecordDescriptor = RecordDescriptor {
    id: 132,
    name: "MixWithOthersRecord",
    fields: &[F::required("mixWithOthers", K::Bool)],
};

const PLAYBACK_SPEED: RecordDescriptor = RecordDescriptor {
    id: 133,
    name: "PlaybackSpeedRecord",
    fields: &[
        F::required("textureId", K::Int64),
        F::required("speed", K::Float64),
    ],
};

const POSITION: RecordDescriptor = RecordDescriptor {
    id: 134,
    name: "PositionRecord",
    fields: &[
        F::required("textureId", K::Int64),
        F::required("position", K::Int64),
    ],
};

const TEXTURE: RecordDescriptor = RecordDescriptor {
    id: 135,
    name: "TextureRecord",
    fields: &[F::required("textureId", K::Int64)],
};

const VOLUME: RecordDescriptor = RecordDescriptor {
    id: 136,
    name: "VolumeRecord",
    fields: &[
        F::required("textureId", K::Int64),
        F::required("volume", K::Float64),
    ],
};

const RECORDS: &[RecordDescriptor] = &[
    CREATE,
    CACHING_QUERY,
    CACHING_RESULT,
    LOOPING,
    MIX_WITH_OTHERS,
    PLAYBACK_SPEED,
    POSITION,
    TEXTURE,
    VOLUME,
];

/// Every record the video player API puts on the wire.
pub static VIDEO_PLAYER_SCHEMAS: SchemaTable = SchemaTable::new(RECORDS);

/// Arguments for `create`. Exactly one of `asset`/`uri` is expected to be set;
/// that rule belongs to the player, not the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateRecord {
    pub asset: Option<String>,
    pub uri: Option<String>,
    pub package_name: Option<String>,
    pub format_hint: Option<String>,
    pub cache: Option<bool>,
    pub http_headers: BTreeMap<String, String>,
}

impl Record for CreateRecord {
    const DESCRIPTOR: &'static RecordDescriptor = &CREATE;

    fn into_fields(self) -> Vec<Value> {
        vec![
            self.asset.into(),
            self.uri.into(),
            self.package_name.into(),
            self.format_hint.into(),
            self.cache.into(),
            string_map_value(self.http_headers),
        ]
    }

    fn from_fields(r: &mut FieldReader) -> Result<Self> {
        Ok(Self {
            asset: r.optional_string()?,
            uri: r.optional_string()?,
            package_name: r.optional_string()?,
            format_hint: r.optional_string()?,
            cache: r.optional_bool()?,
            http_headers: r.string_map()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureRecord {
    pub texture_id: i64,
}

impl Record for TextureRecord {
    const DESCRIPTOR: &'static RecordDescriptor = &TEXTURE;

    fn into_fields(self) -> Vec<Value> {
        vec![Value::Int64(self.texture_id)]
    }

    fn from_fields(r: &mut FieldReader) -> Result<Self> {
        Ok(Self { texture_id: r.required_i64()? })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopingRecord {
    pub texture_id: i64,
    pub is_looping: bool,
}

impl Record for LoopingRecord {
    const DESCRIPTOR: &'static RecordDescriptor = &LOOPING;

    fn into_fields(self) -> Vec<Value> {
        vec![Value::Int64(self.texture_id), Value::Bool(self.is_looping)]
    }

    fn from_fields(r: &mut FieldReader) -> Result<Self> {
        Ok(Self {
            texture_id: r.required_i64()?,
            is_looping: r.required_bool()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeRecord {
    pub texture_id: i64,
    pub volume: f64,
}

impl Record for VolumeRecord {
    const DESCRIPTOR: &'static RecordDescriptor = &VOLUME;

    fn into_fields(self) -> Vec<Value> {
        vec![Value::Int64(self.texture_id), Value::Float64(self.volume)]
    }

    fn from_fields(r: &mut FieldReader) -> Result<Self> {
        Ok(Self {
            texture_id: r.required_i64()?,
            volume: r.required_f64()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSpeedRecord {
    pub texture_id: i64,
    pub speed: f64,
}

impl Record for PlaybackSpeedRecord {
    const DESCRIPTOR: &'static RecordDescriptor = &PLAYBACK_SPEED;

    fn into_fields(self) -> Vec<Value> {
        vec![Value::Int64(self.texture_id), Value::Float64(self.speed)]
    }

    fn from_fields(r: &mut FieldReader) -> Result<Self> {
        Ok(Self {
            texture_id: r.required_i64()?,
            speed: r.required_f64()?,
        })
    }
}

/// Position in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionRecord {
    pub texture_id: i64,
    pub position: i64,
}

impl Record for PositionRecord {
    const DESCRIPTOR: &'static RecordDescriptor = &POSITION;

    fn into_fields(self) -> Vec<Value> {
        vec![Value::Int64(self.texture_id), Value::Int64(self.position)]
    }

    fn from_fields(r: &mut FieldReader) -> Result<Self> {
        Ok(Self {
            texture_id: r.required_i64()?,
            position: r.required_i64()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachingQueryRecord {
    pub url: String,
}

impl Record for CachingQueryRecord {
    const DESCRIPTOR: &'static RecordDescriptor = &CACHING_QUERY;

    fn into_fields(self) -> Vec<Value> {
        vec![Value::String(self.url)]
    }

    fn from_fields(r: &mut FieldReader) -> Result<Self> {
        Ok(Self { url: r.required_string()? })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachingResultRecord {
    pub is_supported: bool,
}

impl Record for CachingResultRecord {
    const DESCRIPTOR: &'static RecordDescriptor = &CACHING_RESULT;

    fn into_fields(self) -> Vec<Value> {
        vec![Value::Bool(self.is_supported)]
    }

    fn from_fields(r: &mut FieldReader) -> Result<Self> {
        Ok(Self { is_supported: r.required_bool()? })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixWithOthersRecord {
    pub mix_with_others: bool,
}

impl Record for MixWithOthersRecord {
    const DESCRIPTOR: &'static RecordDescriptor = &MIX_WITH_OTHERS;

    fn into_fields(self) -> Vec<Value> {
        vec![Value::Bool(self.mix_with_others)]
    }

    fn from_fields(r: &mut FieldReader) -> Result<Self> {
        Ok(Self { mix_with_others: r.required_bool()? })
    }
}
