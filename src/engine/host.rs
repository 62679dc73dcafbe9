//! Capabilities borrowed from the host application.
//!
//! Each has a no-op default so the stream screen runs on its own.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use crate::model::message::{HostChatEntry, HostChatExtra};

/// Somewhere donations end up as money.
pub trait Ledger: Send {
    fn add_balance(&mut self, amount: u64, memo: &str);
}

/// Default ledger: donations are shown but not banked anywhere.
#[derive(Debug, Default)]
pub struct DiscardLedger;

impl Ledger for DiscardLedger {
    fn add_balance(&mut self, _amount: u64, _memo: &str) {}
}

/// Append-only hidden log of the host chat.
pub trait LogSink: Send {
    fn append(&mut self, speaker: &str, text: &str);

    /// Most recent entries, oldest first. Sinks that cannot read back
    /// return nothing.
    fn recent(&self, _limit: usize) -> Vec<HostChatEntry> {
        Vec::new()
    }
}

#[derive(Debug, Default)]
pub struct DiscardLog;

impl LogSink for DiscardLog {
    fn append(&mut self, _speaker: &str, _text: &str) {}
}

/// Host chat kept as JSON lines on disk, one record per append.
pub struct ChatLog {
    path: PathBuf,
}

impl ChatLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn write_entry(&self, entry: &HostChatEntry) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", serde_json::to_string(entry)?)?;
        Ok(())
    }
}

impl LogSink for ChatLog {
    fn append(&mut self, speaker: &str, text: &str) {
        if text.trim().is_empty() {
            return;
        }

        let entry = HostChatEntry {
            name: speaker.to_string(),
            is_user: false,
            is_system: false,
            send_date: chrono::Utc::now().timestamp_millis(),
            mes: text.to_string(),
            extra: HostChatExtra { is_phone_log: true },
        };

        if let Err(e) = self.write_entry(&entry) {
            tracing::warn!(path = %self.path.display(), error = %e, "could not append to chat log");
        }
    }

    fn recent(&self, limit: usize) -> Vec<HostChatEntry> {
        let Ok(text) = fs::read_to_string(&self.path) else {
            return Vec::new();
        };

        let entries: Vec<HostChatEntry> = text
            .lines()
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect();

        let skip = entries.len().saturating_sub(limit);
        entries.into_iter().skip(skip).collect()
    }
}
