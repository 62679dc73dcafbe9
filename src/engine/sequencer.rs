use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::model::chat_event::ChatEvent;
use crate::model::currency::Currency;

/// Bounds of the random delay before each chat line, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pacing {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Pacing {
    pub const LIVE: Pacing = Pacing { min_ms: 400, max_ms: 1000 };
    pub const REPLAY: Pacing = Pacing { min_ms: 300, max_ms: 1000 };
    pub const INSTANT: Pacing = Pacing { min_ms: 0, max_ms: 0 };

    pub fn next_delay(&self) -> Duration {
        let (lo, hi) = if self.min_ms <= self.max_ms {
            (self.min_ms, self.max_ms)
        } else {
            (self.max_ms, self.min_ms)
        };
        if lo == hi {
            return Duration::from_millis(lo);
        }
        Duration::from_millis(rand::thread_rng().gen_range(lo..=hi))
    }
}

/// What a run actually got through.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceReport {
    pub emitted: usize,
    pub donated: u64,
    pub stopped_early: bool,
}

/// Plays parsed events into the chat at a live-chat pace.
pub struct Sequencer {
    pub pacing: Pacing,
    pub currency: Currency,
}

impl Sequencer {
    pub fn new(pacing: Pacing, currency: Currency) -> Self {
        Self { pacing, currency }
    }

    /// Emits `events` in order, one per delay.
    ///
    /// `is_active` is read before waiting for every event; once it returns
    /// false nothing further is emitted. Each processed donation is credited
    /// once, and `on_log_batch` gets every processed event's log line in a
    /// single call after the loop, even when it is empty.
    pub async fn run<A, E, D, L>(
        &self,
        events: &[ChatEvent],
        is_active: A,
        mut emit: E,
        mut on_donation: D,
        on_log_batch: L,
    ) -> SequenceReport
    where
        A: Fn() -> bool,
        E: FnMut(&ChatEvent),
        D: FnMut(&str, u64),
        L: FnOnce(Vec<String>),
    {
        let mut report = SequenceReport::default();
        let mut lines = Vec::with_capacity(events.len());

        for event in events {
            if !is_active() {
                report.stopped_early = true;
                break;
            }

            tokio::time::sleep(self.pacing.next_delay()).await;

            emit(event);
            if let ChatEvent::Donation { username, amount, .. } = event {
                on_donation(username, *amount);
                report.donated += amount;
            }
            lines.push(event.log_line(self.currency));
            report.emitted += 1;
        }

        on_log_batch(lines);
        report
    }

    /// Plays stored events back for a replay: same pacing and early stop,
    /// but no crediting and no log.
    pub async fn replay<A, E>(&self, events: &[ChatEvent], is_active: A, mut emit: E) -> SequenceReport
    where
        A: Fn() -> bool,
        E: FnMut(&ChatEvent),
    {
        let mut report = SequenceReport::default();

        for event in events {
            if !is_active() {
                report.stopped_early = true;
                break;
            }

            tokio::time::sleep(self.pacing.next_delay()).await;

            emit(event);
            report.emitted += 1;
        }

        report
    }
}
