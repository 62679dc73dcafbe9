use chrono::{DateTime, Datelike, TimeZone};
use serde::{Deserialize, Serialize};

use crate::model::chat_event::ParseResult;

/// Streams kept in history; older entries fall off the end.
pub const MAX_HISTORY: usize = 20;

/// Earnings (in currency units) worth one extra follower.
const EARNINGS_PER_FOLLOWER: u64 = 10_000;

/// One submitted action and the events it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub action: String,
    #[serde(rename = "chats", with = "flattened_result")]
    pub result: ParseResult,
}

/// Older documents stored the event list directly under `chats` with no
/// viewer count, so the result is (de)serialized in that shape and the
/// viewer count rides alongside when present.
mod flattened_result {
    use super::*;
    use crate::model::chat_event::ChatEvent;
    use serde::{Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Events(Vec<ChatEvent>),
        Full(ParseResult),
    }

    pub fn serialize<S: Serializer>(result: &ParseResult, s: S) -> Result<S::Ok, S::Error> {
        result.serialize(s)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<ParseResult, D::Error> {
        Ok(match Repr::deserialize(d)? {
            Repr::Full(result) => result,
            Repr::Events(events) => ParseResult {
                events,
                viewer_count: None,
            },
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamerProfile {
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub concept: String,
    #[serde(default)]
    pub outfit: String,
}

/// The stream currently on air.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSession {
    pub title: String,
    pub start_time: i64,
    pub rp_date: String,
    pub earnings: u64,
    pub max_viewers: u64,
    pub actions: Vec<ActionRecord>,
}

impl StreamSession {
    pub fn new(title: impl Into<String>, rp_date: impl Into<String>, start_time: i64) -> Self {
        Self {
            title: title.into(),
            start_time,
            rp_date: rp_date.into(),
            earnings: 0,
            max_viewers: 0,
            actions: Vec::new(),
        }
    }

    pub fn observe_viewers(&mut self, count: u64) {
        self.max_viewers = self.max_viewers.max(count);
    }

    pub fn credit(&mut self, amount: u64) {
        self.earnings = self.earnings.saturating_add(amount);
    }

    pub fn finish(self, end_time: i64, current_viewers: u64, new_followers: u64) -> StreamRecord {
        StreamRecord {
            title: self.title,
            start_time: self.start_time,
            end_time,
            rp_date: self.rp_date,
            earnings: self.earnings,
            max_viewers: self.max_viewers.max(current_viewers),
            new_followers,
            actions: self.actions,
        }
    }
}

/// A finished stream as kept in history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamRecord {
    pub title: String,
    pub start_time: i64,
    #[serde(default)]
    pub end_time: i64,
    #[serde(default)]
    pub rp_date: String,
    #[serde(default)]
    pub earnings: u64,
    #[serde(default)]
    pub max_viewers: u64,
    #[serde(default)]
    pub new_followers: u64,
    #[serde(default)]
    pub actions: Vec<ActionRecord>,
}

impl StreamRecord {
    pub fn duration_minutes(&self) -> i64 {
        ((self.end_time - self.start_time) / 60_000).max(0)
    }
}

/// Everything persisted for one chat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedStreamData {
    #[serde(default)]
    pub stream_history: Vec<StreamRecord>,
    #[serde(default)]
    pub total_earnings: u64,
    #[serde(default)]
    pub follower_count: u64,
    #[serde(default)]
    pub streamer_profile: StreamerProfile,
}

impl SavedStreamData {
    /// Newest first, capped at [`MAX_HISTORY`].
    pub fn push_record(&mut self, record: StreamRecord) {
        self.stream_history.insert(0, record);
        self.stream_history.truncate(MAX_HISTORY);
    }
}

/// New followers earned by a stream.
///
/// `rate` is the share of average viewers that follow, drawn by the caller
/// from `[0.01, 0.06)`.
pub fn follower_gain(max_viewers: u64, current_viewers: u64, earnings: u64, rate: f64) -> u64 {
    let avg_viewers = if max_viewers > 0 {
        (max_viewers + current_viewers) / 2
    } else {
        current_viewers
    };
    let base = (avg_viewers as f64 * rate).floor().max(0.0) as u64;
    base + earnings / EARNINGS_PER_FOLLOWER
}

/// In-world date line, e.g. `2026년 10월 19일 월요일`.
pub fn rp_date_string<Tz: TimeZone>(now: &DateTime<Tz>) -> String {
    const DAYS: [&str; 7] = ["일", "월", "화", "수", "목", "금", "토"];
    let day = DAYS[now.weekday().num_days_from_sunday() as usize];
    format!("{}년 {}월 {}일 {}요일", now.year(), now.month(), now.day(), day)
}
