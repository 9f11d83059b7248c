use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub const NAME_KEY: &str = "name";
pub const PAGE_KEY: &str = "page";
pub const CHUNK_ID_KEY: &str = "chunk_id";

/// A metadata value: either a number or a string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl MetadataValue {
    /// Whether the value carries no information (empty text or zero)
    #[inline]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Integer(value) => *value == 0,
            Self::Float(value) => *value == 0.0,
            Self::Text(value) => value.trim().is_empty(),
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            Self::Integer(_) | Self::Float(_) => None,
        }
    }

    #[inline]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            Self::Float(_) | Self::Text(_) => None,
        }
    }
}

impl fmt::Display for MetadataValue {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{}", value),
            Self::Float(value) => write!(f, "{}", value),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for MetadataValue {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for MetadataValue {
    #[inline]
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for MetadataValue {
    #[inline]
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for MetadataValue {
    #[inline]
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for MetadataValue {
    #[inline]
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

/// Key/value description of where a chunk came from.
///
/// Documents are described by at least a display `name` and optionally a `page`;
/// each stored chunk additionally carries its `chunk_id` within the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChunkMetadata(BTreeMap<String, MetadataValue>);

impl ChunkMetadata {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata for a document with the given display name
    #[inline]
    pub fn named(name: impl Into<String>) -> Self {
        let mut metadata = Self::new();
        metadata.insert(NAME_KEY, name.into());
        metadata
    }

    #[inline]
    pub fn with_page(mut self, page: u32) -> Self {
        self.insert(PAGE_KEY, page);
        self
    }

    #[inline]
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<MetadataValue>,
    ) -> Option<MetadataValue> {
        self.0.insert(key.into(), value.into())
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.0.get(key)
    }

    /// Display name of the source document
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.get(NAME_KEY).and_then(MetadataValue::as_str)
    }

    #[inline]
    pub fn page(&self) -> Option<&MetadataValue> {
        self.get(PAGE_KEY)
    }

    /// Zero-based position of the chunk within its document
    #[inline]
    pub fn chunk_id(&self) -> Option<i64> {
        self.get(CHUNK_ID_KEY).and_then(MetadataValue::as_i64)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetadataValue)> {
        self.0.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copy of this metadata stamped with a chunk sequence number
    pub(crate) fn for_chunk(&self, chunk_id: usize) -> Self {
        let mut metadata = self.clone();
        metadata.insert(
            CHUNK_ID_KEY,
            i64::try_from(chunk_id).unwrap_or(i64::MAX),
        );
        metadata
    }
}

impl<K: Into<String>, V: Into<MetadataValue>> FromIterator<(K, V)> for ChunkMetadata {
    #[inline]
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}
