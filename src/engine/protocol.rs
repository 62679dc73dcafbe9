use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::model::chat_event::ChatEvent;
use crate::model::contact::ContactRoster;
use crate::model::session::{StreamRecord, StreamerProfile};
use crate::model::settings::FlingSettings;

/// Flag shared between the UI and the engine thread.
///
/// The engine reads it at every event boundary, so clearing it from the UI
/// stops a running sequence before its next chat line.
#[derive(Debug, Clone, Default)]
pub struct ActiveFlag(Arc<AtomicBool>);

impl ActiveFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn set(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub enum EngineCommand {
    StartStream { title: String, first_action: String },
    SubmitAction(String),
    EndStream,

    StartReplay(usize),
    ReplayNext,
    StopReplay,

    UpdateProfile(StreamerProfile),
    UpdateSettings(FlingSettings),
    ReloadContacts(ContactRoster),
    ResetData,
}

/// Numbers the screens show, sent after anything that changes them.
#[derive(Debug, Clone, Default)]
pub struct StreamSummary {
    pub live: bool,
    pub generating: bool,
    pub title: String,
    pub viewer_count: u64,
    pub earnings: u64,
    pub max_viewers: u64,
    pub follower_count: u64,
    pub total_earnings: u64,
    pub profile: StreamerProfile,
    pub history: Vec<StreamRecord>,
}

pub enum EngineResponse {
    StreamStarted { title: String },
    Chat(ChatEvent),
    ViewerCount(u64),
    Generating(bool),
    StreamEnded(StreamRecord),

    /// A stored action is about to be replayed; its chat follows as `Chat`.
    Replay {
        title: String,
        action: String,
        position: usize,
        total: usize,
    },

    Snapshot(StreamSummary),
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_is_shared_between_clones() {
        let ui_side = ActiveFlag::default();
        let engine_side = ui_side.clone();
        assert!(!engine_side.is_set());
        ui_side.set();
        assert!(engine_side.is_set());
        ui_side.clear();
        assert!(!engine_side.is_set());
    }
}
