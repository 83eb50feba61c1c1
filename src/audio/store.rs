//! Request-scoped storage for uploaded audio.
//!
//! Each upload is kept under a content-derived id instead of a single shared
//! path, so a new upload can never overwrite the bytes an earlier upload's
//! playback surface is still reading.

use std::collections::HashMap;

use log::debug;

use crate::playback::PlaybackCue;

/// Opaque identifier for a stored buffer: blake3 hash of the encoded bytes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(String);

impl BufferId {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An uploaded clip retained for playback after its mesh has been built.
#[derive(Clone, Debug)]
pub struct StoredBuffer {
    /// The encoded bytes as uploaded; the playback surface decodes these
    /// itself, so no re-encoding happens here.
    pub bytes: Vec<u8>,
    /// Decoded duration in seconds, used to clamp click ranges.
    pub duration_secs: f64,
}

/// In-memory store mapping buffer ids to retained uploads.
pub struct BufferStore {
    base_uri: String,
    entries: HashMap<BufferId, StoredBuffer>,
}

impl BufferStore {
    pub fn new() -> Self {
        Self::with_base_uri("assets/audio")
    }

    /// `base_uri` is the path prefix the playback surface resolves buffer
    /// ids under.
    pub fn with_base_uri(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
            entries: HashMap::new(),
        }
    }

    /// Store an upload, returning its content-derived id. Re-uploading the
    /// same bytes yields the same id and is idempotent.
    pub fn insert(&mut self, bytes: Vec<u8>, duration_secs: f64) -> BufferId {
        let id = BufferId::from_bytes(&bytes);
        debug!("storing {} byte upload as {}", bytes.len(), id.as_str());
        self.entries.insert(
            id.clone(),
            StoredBuffer {
                bytes,
                duration_secs,
            },
        );
        id
    }

    pub fn get(&self, id: &BufferId) -> Option<&StoredBuffer> {
        self.entries.get(id)
    }

    pub fn remove(&mut self, id: &BufferId) -> Option<StoredBuffer> {
        self.entries.remove(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// URI the playback surface should load, including the cue's
    /// time-range fragment.
    pub fn playback_uri(&self, id: &BufferId, cue: &PlaybackCue) -> String {
        format!("{}/{}{}", self.base_uri, id.as_str(), cue.fragment())
    }
}

impl Default for BufferStore {
    fn default() -> Self {
        Self::new()
    }
}
