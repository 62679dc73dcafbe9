use std::fs;
use std::path::PathBuf;

use crate::engine::error::StorageError;
use crate::model::session::SavedStreamData;

const KEY_PREFIX: &str = "st_phone_streaming_";

/// Per-chat stream documents, one JSON file each.
pub struct StreamStore {
    dir: PathBuf,
}

impl StreamStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<data dir>/fling`, falling back to the working directory.
    pub fn default_dir() -> PathBuf {
        let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("fling");
        path
    }

    pub fn key(chat_id: &str) -> Option<String> {
        let chat_id = chat_id.trim();
        if chat_id.is_empty() {
            return None;
        }
        let safe: String = chat_id
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        Some(format!("{KEY_PREFIX}{safe}"))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// `Ok(None)` when nothing has been saved under `key` yet.
    pub fn load(&self, key: &str) -> Result<Option<SavedStreamData>, StorageError> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    pub fn save(&self, key: &str, data: &SavedStreamData) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(data)?;
        fs::write(self.path_for(key), json)?;
        Ok(())
    }

    /// Loads `chat_id`'s data, degrading to a fresh document on any failure.
    pub fn load_or_default(&self, chat_id: &str) -> SavedStreamData {
        let Some(key) = Self::key(chat_id) else {
            return SavedStreamData::default();
        };
        match self.load(&key) {
            Ok(data) => data.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "could not load stream data, starting fresh");
                SavedStreamData::default()
            }
        }
    }

    /// Best-effort save; failures leave the session in memory only.
    pub fn persist(&self, chat_id: &str, data: &SavedStreamData) -> bool {
        let Some(key) = Self::key(chat_id) else {
            return false;
        };
        match self.save(&key, data) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "save failed, keeping stream data in memory");
                false
            }
        }
    }
}
