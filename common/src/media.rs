use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CamError, Result};

/// Database holding both media collections
pub const DB_NAME: &str = "myDataBase";

/// Schema version; bumping it triggers the upgrade handler
pub const DB_VERSION: u32 = 1;

/// Key path of both collections
pub const KEY_PATH: &str = "id";

/// Kind of captured media. Each kind lives in its own collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    pub const ALL: [MediaKind; 2] = [MediaKind::Video, MediaKind::Image];

    /// Name of the object store holding this kind
    pub fn store_name(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Image => "image",
        }
    }

    /// Prefix carried by persisted ids, kept for databases written before
    /// records were tagged
    pub fn id_prefix(&self) -> &'static str {
        match self {
            MediaKind::Video => "vid",
            MediaKind::Image => "img",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        MediaKind::ALL.into_iter().find(|kind| kind.id_prefix() == prefix)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.store_name())
    }
}

/// Identifier of a stored record.
///
/// The kind is an explicit field; the `vid-`/`img-` prefix only exists in the
/// persisted form and is parsed once, at the storage or DOM boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MediaId {
    kind: MediaKind,
    key: String,
}

impl MediaId {
    pub fn new(kind: MediaKind, key: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
        }
    }

    /// Fresh identifier for a new record of `kind`
    pub fn generate(kind: MediaKind) -> Self {
        Self::new(kind, uuid::Uuid::new_v4().simple().to_string())
    }

    /// Parse the persisted form, e.g. `vid-abc123`
    pub fn parse(s: &str) -> Result<Self> {
        let (prefix, key) = s
            .split_once('-')
            .ok_or_else(|| CamError::InvalidId(s.to_string()))?;
        let kind = MediaKind::from_prefix(prefix).ok_or_else(|| CamError::InvalidId(s.to_string()))?;
        if key.is_empty() {
            return Err(CamError::InvalidId(s.to_string()));
        }
        Ok(Self::new(kind, key))
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Persisted form used as the object store key
    pub fn to_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind.id_prefix(), self.key)
    }
}

impl FromStr for MediaId {
    type Err = CamError;

    fn from_str(s: &str) -> Result<Self> {
        MediaId::parse(s)
    }
}

impl Serialize for MediaId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MediaId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        MediaId::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Recorded video. `B` is the platform's binary payload type.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoRecord<B> {
    pub id: MediaId,
    pub blob_data: B,
    pub timestamp: Option<i64>,
}

/// Captured photo, stored as a self-contained data URI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: MediaId,
    pub url: String,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// A stored record of either kind
#[derive(Debug, Clone, PartialEq)]
pub enum MediaRecord<B> {
    Video(VideoRecord<B>),
    Image(ImageRecord),
}

impl<B> MediaRecord<B> {
    pub fn id(&self) -> &MediaId {
        match self {
            MediaRecord::Video(v) => &v.id,
            MediaRecord::Image(i) => &i.id,
        }
    }

    pub fn kind(&self) -> MediaKind {
        match self {
            MediaRecord::Video(_) => MediaKind::Video,
            MediaRecord::Image(_) => MediaKind::Image,
        }
    }

    pub fn timestamp(&self) -> Option<i64> {
        match self {
            MediaRecord::Video(v) => v.timestamp,
            MediaRecord::Image(i) => i.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video_id() {
        let id = MediaId::parse("vid-abc123").unwrap();
        assert_eq!(id.kind(), MediaKind::Video);
        assert_eq!(id.key(), "abc123");
        assert_eq!(id.kind().store_name(), "video");
    }

    #[test]
    fn test_parse_image_id() {
        let id: MediaId = "img-xyz789".parse().unwrap();
        assert_eq!(id.kind(), MediaKind::Image);
        assert_eq!(id.kind().store_name(), "image");
        assert_eq!(id.to_key(), "img-xyz789");
    }

    #[test]
    fn test_key_may_contain_dashes() {
        let id = MediaId::parse("img-a-b-c").unwrap();
        assert_eq!(id.key(), "a-b-c");
        assert_eq!(id.to_string(), "img-a-b-c");
    }

    #[test]
    fn test_parse_rejects_unknown_prefix() {
        assert!(matches!(MediaId::parse("aud-123"), Err(CamError::InvalidId(_))));
        assert!(matches!(MediaId::parse("vid123"), Err(CamError::InvalidId(_))));
        assert!(matches!(MediaId::parse("vid-"), Err(CamError::InvalidId(_))));
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = MediaId::generate(MediaKind::Video);
        let b = MediaId::generate(MediaKind::Video);
        assert_ne!(a, b);
        assert!(a.to_key().starts_with("vid-"));
    }

    #[test]
    fn test_image_record_serialization() {
        let record = ImageRecord {
            id: MediaId::new(MediaKind::Image, "k1"),
            url: "data:image/png;base64,AAAA".to_string(),
            timestamp: Some(1_700_000_000_000),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], "img-k1");

        let parsed: ImageRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, record);
    }
}
