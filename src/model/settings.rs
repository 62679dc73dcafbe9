use serde::{Deserialize, Serialize};

use crate::engine::sequencer::Pacing;
use crate::model::currency::Currency;

/// Everything the engine needs to talk to the model and run a stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlingSettings {
    /// Base URL of an OpenAI-compatible server.
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    pub max_context_tokens: usize,
    /// Sent as a trailing assistant message when not empty.
    pub prefill: String,

    pub user_name: String,
    pub user_personality: String,
    pub user_tags: String,

    pub currency: Currency,

    /// Identifies the host chat; history is stored per chat.
    pub chat_id: String,

    pub pacing: Pacing,
    pub replay_pacing: Pacing,
}

impl Default for FlingSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:1234".into(),
            model: "local-model".into(),
            temperature: 0.7,
            max_context_tokens: 4096,
            prefill: String::new(),

            user_name: String::new(),
            user_personality: String::new(),
            user_tags: String::new(),

            currency: Currency::Krw,

            chat_id: "default".into(),

            pacing: Pacing::LIVE,
            replay_pacing: Pacing::REPLAY,
        }
    }
}

impl FlingSettings {
    pub fn display_name(&self) -> &str {
        let name = self.user_name.trim();
        if name.is_empty() {
            "User"
        } else {
            name
        }
    }
}
