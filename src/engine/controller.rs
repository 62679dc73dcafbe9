use rand::Rng;

use crate::engine::chat_parser::parse_viewer_chat;
use crate::engine::error::StreamError;
use crate::engine::host::{Ledger, LogSink};
use crate::engine::llm_client::{generate_with_recovery, Generator};
use crate::engine::prompt_builder::{build_viewer_prompt, PromptContext};
use crate::engine::protocol::{ActiveFlag, StreamSummary};
use crate::engine::sequencer::{SequenceReport, Sequencer};
use crate::engine::storage::StreamStore;
use crate::model::chat_event::{ChatEvent, ParseResult};
use crate::model::contact::ContactRoster;
use crate::model::session::{
    follower_gain, rp_date_string, ActionRecord, SavedStreamData, StreamRecord, StreamSession,
    StreamerProfile,
};
use crate::model::settings::FlingSettings;

/// Speaker used for hidden log lines that are not the user's.
const SYSTEM_SPEAKER: &str = "System";

/// Receives what a running action produces, as it happens.
pub trait StreamObserver {
    fn viewers(&mut self, _count: u64) {}
    fn chat(&mut self, event: &ChatEvent);
}

impl<F: FnMut(&ChatEvent)> StreamObserver for F {
    fn chat(&mut self, event: &ChatEvent) {
        self(event)
    }
}

#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub result: ParseResult,
    pub report: SequenceReport,
}

/// Mutable state of the stream screen.
#[derive(Debug, Default)]
pub struct StreamState {
    /// `Some` while a stream is on air.
    pub session: Option<StreamSession>,
    pub viewer_count: u64,
    pub generating: bool,
    pub saved: SavedStreamData,
}

/// Owns the stream state and every collaborator an action touches.
pub struct StreamController {
    settings: FlingSettings,
    roster: ContactRoster,
    state: StreamState,
    live: ActiveFlag,
    generator: Box<dyn Generator>,
    ledger: Box<dyn Ledger>,
    log: Box<dyn LogSink>,
    store: StreamStore,
}

impl StreamController {
    pub fn new(
        settings: FlingSettings,
        roster: ContactRoster,
        live: ActiveFlag,
        generator: Box<dyn Generator>,
        ledger: Box<dyn Ledger>,
        log: Box<dyn LogSink>,
        store: StreamStore,
    ) -> Self {
        let saved = store.load_or_default(&settings.chat_id);
        live.clear();
        Self {
            settings,
            roster,
            state: StreamState {
                saved,
                ..Default::default()
            },
            live,
            generator,
            ledger,
            log,
            store,
        }
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }

    pub fn settings(&self) -> &FlingSettings {
        &self.settings
    }

    pub fn is_live(&self) -> bool {
        self.state.session.is_some()
    }

    pub fn summary(&self) -> StreamSummary {
        let session = self.state.session.as_ref();
        StreamSummary {
            live: session.is_some(),
            generating: self.state.generating,
            title: session.map(|s| s.title.clone()).unwrap_or_default(),
            viewer_count: self.state.viewer_count,
            earnings: session.map(|s| s.earnings).unwrap_or(0),
            max_viewers: session.map(|s| s.max_viewers).unwrap_or(0),
            follower_count: self.state.saved.follower_count,
            total_earnings: self.state.saved.total_earnings,
            profile: self.state.saved.streamer_profile.clone(),
            history: self.state.saved.stream_history.clone(),
        }
    }

    pub fn start_stream(&mut self, title: &str, first_action: &str) -> Result<(), StreamError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(StreamError::EmptyInput("stream title"));
        }
        if first_action.trim().is_empty() {
            return Err(StreamError::EmptyInput("first action"));
        }
        if self.state.session.is_some() {
            return Err(StreamError::AlreadyLive);
        }

        let now = chrono::Local::now();
        let rp_date = rp_date_string(&now);
        let mut session = StreamSession::new(title, rp_date.clone(), now.timestamp_millis());
        // filled in by `play_first_action`
        session.actions.push(ActionRecord {
            action: first_action.trim().to_string(),
            result: ParseResult::default(),
        });
        self.state.session = Some(session);
        self.state.viewer_count = 0;
        self.state.generating = false;
        self.live.set();

        let name = self.settings.display_name().to_string();
        self.log.append(
            &name,
            &format!(
                "[📺 FLING STREAM STARTED] {name} started a Fling livestream titled \"{title}\" on {rp_date}. Current Followers: {}. First action: {}",
                self.state.saved.follower_count,
                first_action.trim()
            ),
        );
        tracing::info!(title, "stream started");
        Ok(())
    }

    /// Generates, parses and plays the viewer reaction to one action.
    ///
    /// Generation errors leave the controller ready for another attempt.
    pub async fn submit_action<O: StreamObserver>(
        &mut self,
        action: &str,
        observer: &mut O,
    ) -> Result<ActionOutcome, StreamError> {
        let action = action.trim();
        if action.is_empty() {
            return Err(StreamError::EmptyInput("action"));
        }
        if self.state.session.is_none() || !self.live.is_set() {
            return Err(StreamError::NotLive);
        }
        if self.state.generating {
            return Err(StreamError::Busy);
        }

        let name = self.settings.display_name().to_string();
        self.log.append(
            &name,
            &format!("[📺 FLING ACTION] {name} on Fling stream: {action}"),
        );

        self.state.generating = true;
        let outcome = self.run_action(action, None, observer).await;
        self.state.generating = false;
        outcome
    }

    /// Generates the reaction to the action given at stream start.
    ///
    /// Its record already exists, so nothing new is logged or pushed; the
    /// record keeps an empty result if generation fails.
    pub async fn play_first_action<O: StreamObserver>(
        &mut self,
        observer: &mut O,
    ) -> Result<ActionOutcome, StreamError> {
        let action = self
            .state
            .session
            .as_ref()
            .and_then(|s| s.actions.first())
            .map(|a| a.action.clone())
            .ok_or(StreamError::NotLive)?;
        if !self.live.is_set() {
            return Err(StreamError::NotLive);
        }
        if self.state.generating {
            return Err(StreamError::Busy);
        }

        self.state.generating = true;
        let outcome = self.run_action(&action, Some(0), observer).await;
        self.state.generating = false;
        outcome
    }

    /// `slot` names an existing record to fill; `None` appends a new one.
    async fn run_action<O: StreamObserver>(
        &mut self,
        action: &str,
        slot: Option<usize>,
        observer: &mut O,
    ) -> Result<ActionOutcome, StreamError> {
        let result = self.generate_reaction(action).await?;

        let session = self.state.session.as_mut().ok_or(StreamError::NotLive)?;
        if let Some(count) = result.viewer_count {
            self.state.viewer_count = count;
            session.observe_viewers(count);
            observer.viewers(count);
        }
        match slot.and_then(|i| session.actions.get_mut(i)) {
            Some(record) => record.result = result.clone(),
            None => session.actions.push(ActionRecord {
                action: action.to_string(),
                result: result.clone(),
            }),
        }

        let sequencer = Sequencer::new(self.settings.pacing, self.settings.currency);
        let live = &self.live;
        let ledger = &mut self.ledger;
        let log = &mut self.log;

        let report = sequencer
            .run(
                &result.events,
                || live.is_set(),
                |event| observer.chat(event),
                |username, amount| {
                    session.credit(amount);
                    ledger.add_balance(amount, &format!("{username}님 Fling 후원"));
                },
                |lines| {
                    if !lines.is_empty() {
                        log.append(SYSTEM_SPEAKER, &lines.join("\n"));
                    }
                },
            )
            .await;

        tracing::debug!(
            emitted = report.emitted,
            donated = report.donated,
            stopped_early = report.stopped_early,
            "action played"
        );
        Ok(ActionOutcome { result, report })
    }

    async fn generate_reaction(&self, action: &str) -> Result<ParseResult, StreamError> {
        let session = self.state.session.as_ref().ok_or(StreamError::NotLive)?;
        let history = self.log.recent(usize::MAX);
        let ctx = PromptContext {
            settings: &self.settings,
            profile: &self.state.saved.streamer_profile,
            roster: &self.roster,
            history: &history,
            title: &session.title,
            follower_count: self.state.saved.follower_count,
            viewer_count: self.state.viewer_count,
        };
        let messages = build_viewer_prompt(&ctx, action);

        let raw = generate_with_recovery(
            self.generator.as_ref(),
            &messages,
            self.settings.max_context_tokens,
        )
        .await?;

        Ok(parse_viewer_chat(&raw, &self.roster))
    }

    /// Closes the running stream and files it in history.
    /// Returns `None` when nothing was live.
    pub fn end_stream(&mut self) -> Option<StreamRecord> {
        let rate = rand::thread_rng().gen_range(0.01..0.06);
        self.end_stream_with_rate(rate)
    }

    fn end_stream_with_rate(&mut self, follow_rate: f64) -> Option<StreamRecord> {
        self.live.clear();
        self.state.generating = false;
        let session = self.state.session.take()?;

        let viewers = self.state.viewer_count;
        let new_followers = follower_gain(session.max_viewers, viewers, session.earnings, follow_rate);
        let record = session.finish(chrono::Utc::now().timestamp_millis(), viewers, new_followers);

        let saved = &mut self.state.saved;
        saved.follower_count += new_followers;
        saved.total_earnings = saved.total_earnings.saturating_add(record.earnings);
        saved.push_record(record.clone());
        self.store.persist(&self.settings.chat_id, saved);

        let name = self.settings.display_name().to_string();
        self.log.append(
            SYSTEM_SPEAKER,
            &format!(
                "[📺 FLING STREAM ENDED] {name}'s Fling stream \"{}\" ended. Total earnings: {}, Max viewers: {}, New followers: +{} (Total: {})",
                record.title,
                self.settings.currency.format_money(record.earnings),
                record.max_viewers,
                new_followers,
                saved.follower_count
            ),
        );
        tracing::info!(
            title = %record.title,
            earnings = record.earnings,
            new_followers,
            "stream ended"
        );
        Some(record)
    }

    pub fn record(&self, index: usize) -> Option<&StreamRecord> {
        self.state.saved.stream_history.get(index)
    }

    /// Plays one stored action's chat again. Nothing is credited or logged.
    pub async fn replay_action<A, O>(
        &self,
        record_index: usize,
        action_index: usize,
        is_active: A,
        observer: &mut O,
    ) -> Result<SequenceReport, StreamError>
    where
        A: Fn() -> bool,
        O: StreamObserver,
    {
        let record = self
            .record(record_index)
            .ok_or(StreamError::NoSuchRecord(record_index))?;
        let Some(action) = record.actions.get(action_index) else {
            return Ok(SequenceReport::default());
        };

        if let Some(count) = action.result.viewer_count {
            observer.viewers(count);
        }

        let sequencer = Sequencer::new(self.settings.replay_pacing, self.settings.currency);
        Ok(sequencer
            .replay(&action.result.events, is_active, |event| observer.chat(event))
            .await)
    }

    pub fn update_profile(&mut self, profile: StreamerProfile) {
        self.state.saved.streamer_profile = profile;
        self.store.persist(&self.settings.chat_id, &self.state.saved);
    }

    /// Swaps settings; a different chat id switches to that chat's data.
    ///
    /// While a stream is live the chat id is kept, everything else is
    /// applied, and `ChatLocked` is returned.
    pub fn update_settings(
        &mut self,
        mut settings: FlingSettings,
        generator: Box<dyn Generator>,
    ) -> Result<(), StreamError> {
        let mut outcome = Ok(());
        if settings.chat_id != self.settings.chat_id {
            if self.state.session.is_some() {
                tracing::warn!(
                    current = %self.settings.chat_id,
                    requested = %settings.chat_id,
                    "chat change refused while live"
                );
                settings.chat_id = self.settings.chat_id.clone();
                outcome = Err(StreamError::ChatLocked);
            } else {
                self.state.saved = self.store.load_or_default(&settings.chat_id);
            }
        }
        self.settings = settings;
        self.generator = generator;
        outcome
    }

    pub fn set_log_sink(&mut self, log: Box<dyn LogSink>) {
        self.log = log;
    }

    pub fn set_roster(&mut self, roster: ContactRoster) {
        self.roster = roster;
    }

    pub fn reset_data(&mut self) {
        self.state.saved = SavedStreamData::default();
        self.store.persist(&self.settings.chat_id, &self.state.saved);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::error::GenerationError;
    use crate::engine::sequencer::Pacing;
    use crate::model::message::ChatMessage;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};

    struct Canned(Result<&'static str, &'static str>);

    #[async_trait]
    impl Generator for Canned {
        async fn generate(&self, _: &[ChatMessage], _: usize) -> Result<String, GenerationError> {
            match self.0 {
                Ok(text) => Ok(text.to_string()),
                Err(body) => Err(GenerationError::Api {
                    status: 500,
                    body: body.to_string(),
                }),
            }
        }
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<(String, String)>>>);

    impl Ledger for Recorder {
        fn add_balance(&mut self, amount: u64, memo: &str) {
            self.0.lock().unwrap().push((amount.to_string(), memo.to_string()));
        }
    }

    impl LogSink for Recorder {
        fn append(&mut self, speaker: &str, text: &str) {
            self.0.lock().unwrap().push((speaker.to_string(), text.to_string()));
        }
    }

    struct Harness {
        controller: StreamController,
        live: ActiveFlag,
        ledger: Recorder,
        log: Recorder,
        _dir: tempfile::TempDir,
    }

    fn harness(reply: Result<&'static str, &'static str>) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let settings = FlingSettings {
            user_name: "하나".into(),
            chat_id: "test-chat".into(),
            pacing: Pacing::INSTANT,
            replay_pacing: Pacing::INSTANT,
            ..Default::default()
        };
        let live = ActiveFlag::default();
        let ledger = Recorder::default();
        let log = Recorder::default();
        let controller = StreamController::new(
            settings,
            ContactRoster::from_names(["Bob"]),
            live.clone(),
            Box::new(Canned(reply)),
            Box::new(ledger.clone()),
            Box::new(log.clone()),
            StreamStore::new(dir.path()),
        );
        Harness {
            controller,
            live,
            ledger,
            log,
            _dir: dir,
        }
    }

    const REPLY: &str = "[VIEWERS: 120]\n[fan1]: 와 대박\nBob: 나 왔어\n[rich] donated 10,000원: 최고!\n###";

    #[tokio::test]
    async fn action_plays_and_credits() {
        let mut h = harness(Ok(REPLY));
        h.controller.start_stream("첫 방송", "인사한다").unwrap();

        let mut seen = Vec::new();
        let outcome = h
            .controller
            .submit_action("노래한다", &mut |e: &ChatEvent| seen.push(e.short_name()))
            .await
            .unwrap();

        assert_eq!(seen, ["Chat", "Contact", "Donation"]);
        assert_eq!(outcome.report.donated, 10_000);

        let summary = h.controller.summary();
        assert_eq!(summary.viewer_count, 120);
        assert_eq!(summary.max_viewers, 120);
        assert_eq!(summary.earnings, 10_000);
        assert!(!summary.generating);

        let credits = h.ledger.0.lock().unwrap().clone();
        assert_eq!(credits, [("10000".to_string(), "rich님 Fling 후원".to_string())]);

        // start, action, one batch of three lines
        let log = h.log.0.lock().unwrap().clone();
        assert_eq!(log.len(), 3);
        assert_eq!(log[2].0, "System");
        assert_eq!(log[2].1.lines().count(), 3);

        // opening action record, then this one
        let session = h.controller.state().session.as_ref().unwrap();
        assert_eq!(session.actions.len(), 2);
        assert_eq!(session.actions[1].action, "노래한다");
        assert_eq!(session.actions[1].result, outcome.result);
    }

    #[tokio::test]
    async fn action_without_donations_keeps_earnings() {
        let mut h = harness(Ok("[VIEWERS: 3]\n[a]: ㅋㅋ\n[b]: 손 흔들어줘"));
        h.controller.start_stream("방송", "시작").unwrap();
        let before = h.controller.summary().earnings;

        h.controller
            .submit_action("웨이브한다", &mut |_: &ChatEvent| {})
            .await
            .unwrap();

        assert_eq!(h.controller.summary().earnings, before);
        assert!(h.ledger.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn generation_failure_leaves_controller_usable() {
        let mut h = harness(Err("model crashed"));
        h.controller.start_stream("방송", "시작").unwrap();

        let err = h
            .controller
            .submit_action("춤춘다", &mut |_: &ChatEvent| {})
            .await
            .unwrap_err();
        assert!(matches!(err, StreamError::Generation(_)));
        assert!(!h.controller.state().generating);
        assert!(h.controller.is_live());
        // only the opening action is on record
        let actions = &h.controller.state().session.as_ref().unwrap().actions;
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action, "시작");
    }

    #[tokio::test]
    async fn first_action_fills_its_record_without_action_log() {
        let mut h = harness(Ok(REPLY));
        h.controller.start_stream("첫 방송", "인사한다").unwrap();

        let session = h.controller.state().session.as_ref().unwrap();
        assert_eq!(session.actions.len(), 1);
        assert_eq!(session.actions[0].action, "인사한다");
        assert!(session.actions[0].result.events.is_empty());

        let outcome = h
            .controller
            .play_first_action(&mut |_: &ChatEvent| {})
            .await
            .unwrap();

        let session = h.controller.state().session.as_ref().unwrap();
        assert_eq!(session.actions.len(), 1);
        assert_eq!(session.actions[0].result, outcome.result);
        assert_eq!(h.controller.summary().earnings, 10_000);

        // stream start line, then the chat batch
        let log = h.log.0.lock().unwrap().clone();
        assert_eq!(log.len(), 2);
        assert!(log[0].1.contains("First action: 인사한다"));
        assert!(log.iter().all(|(_, text)| !text.contains("[📺 FLING ACTION]")));
    }

    #[tokio::test]
    async fn failed_first_action_stays_on_record() {
        let mut h = harness(Err("model crashed"));
        h.controller.start_stream("방송", "인사한다").unwrap();

        let err = h
            .controller
            .play_first_action(&mut |_: &ChatEvent| {})
            .await
            .unwrap_err();
        assert!(matches!(err, StreamError::Generation(_)));
        assert!(!h.controller.state().generating);

        let record = h.controller.end_stream_with_rate(0.01).unwrap();
        assert_eq!(record.actions.len(), 1);
        assert_eq!(record.actions[0].action, "인사한다");
        assert!(record.actions[0].result.events.is_empty());

        let log = h.log.0.lock().unwrap().clone();
        assert!(log.iter().all(|(_, text)| !text.contains("[📺 FLING ACTION]")));
    }

    #[tokio::test]
    async fn chat_cannot_change_while_live() {
        let dir = tempfile::tempdir().unwrap();
        let store = StreamStore::new(dir.path());
        let other = SavedStreamData {
            follower_count: 999,
            total_earnings: 777,
            ..Default::default()
        };
        store.save(&StreamStore::key("chat-b").unwrap(), &other).unwrap();

        let settings = FlingSettings {
            chat_id: "chat-a".into(),
            pacing: Pacing::INSTANT,
            ..Default::default()
        };
        let mut controller = StreamController::new(
            settings.clone(),
            ContactRoster::default(),
            ActiveFlag::default(),
            Box::new(Canned(Ok("[fan] donated 20,000원: 응원해요"))),
            Box::new(crate::engine::host::DiscardLedger),
            Box::new(crate::engine::host::DiscardLog),
            StreamStore::new(dir.path()),
        );
        controller.start_stream("방송", "시작").unwrap();
        controller.play_first_action(&mut |_: &ChatEvent| {}).await.unwrap();

        let switched = FlingSettings {
            chat_id: "chat-b".into(),
            temperature: 1.1,
            ..settings
        };
        let refused = controller.update_settings(switched, Box::new(Canned(Ok(""))));
        assert!(matches!(refused, Err(StreamError::ChatLocked)));
        assert_eq!(controller.settings().chat_id, "chat-a");
        assert_eq!(controller.settings().temperature, 1.1);

        controller.end_stream_with_rate(0.01).unwrap();

        let b = store.load(&StreamStore::key("chat-b").unwrap()).unwrap().unwrap();
        assert_eq!(b, other);
        let a = store.load(&StreamStore::key("chat-a").unwrap()).unwrap().unwrap();
        assert_eq!(a.stream_history.len(), 1);
        assert_eq!(a.total_earnings, 20_000);

        // once off air the switch goes through and loads the other chat
        let switched = FlingSettings {
            chat_id: "chat-b".into(),
            ..controller.settings().clone()
        };
        controller
            .update_settings(switched, Box::new(Canned(Ok(""))))
            .unwrap();
        assert_eq!(controller.summary().follower_count, 999);
        assert_eq!(controller.summary().total_earnings, 777);
    }

    #[tokio::test]
    async fn safety_block_is_an_empty_reaction() {
        let mut h = harness(Err("PROHIBITED_CONTENT"));
        h.controller.start_stream("방송", "시작").unwrap();
        let outcome = h
            .controller
            .submit_action("춤춘다", &mut |_: &ChatEvent| {})
            .await
            .unwrap();
        assert!(outcome.result.events.is_empty());
    }

    #[tokio::test]
    async fn actions_need_a_live_stream() {
        let mut h = harness(Ok(REPLY));
        let err = h
            .controller
            .submit_action("노래한다", &mut |_: &ChatEvent| {})
            .await
            .unwrap_err();
        assert!(matches!(err, StreamError::NotLive));

        h.controller.start_stream("방송", "시작").unwrap();
        assert!(matches!(
            h.controller.start_stream("또", "시작"),
            Err(StreamError::AlreadyLive)
        ));
        assert!(matches!(
            h.controller.submit_action("  ", &mut |_: &ChatEvent| {}).await,
            Err(StreamError::EmptyInput(_))
        ));
    }

    #[tokio::test]
    async fn cleared_flag_stops_before_next_line() {
        let mut h = harness(Ok(REPLY));
        h.controller.start_stream("방송", "시작").unwrap();

        let live = h.live.clone();
        let mut seen = 0;
        let outcome = h
            .controller
            .submit_action("노래한다", &mut |_: &ChatEvent| {
                seen += 1;
                // user hits "end stream" while the first line is on screen
                live.clear();
            })
            .await
            .unwrap();

        assert_eq!(seen, 1);
        assert!(outcome.report.stopped_early);
        assert_eq!(h.controller.summary().earnings, 0);
        // the whole parse result is still on record
        let session = h.controller.state().session.as_ref().unwrap();
        assert_eq!(session.actions[1].result.events.len(), 3);
    }

    #[tokio::test]
    async fn ending_files_history_and_totals() {
        let mut h = harness(Ok(REPLY));
        h.controller.start_stream("방송", "시작").unwrap();
        h.controller
            .submit_action("노래한다", &mut |_: &ChatEvent| {})
            .await
            .unwrap();

        let record = h.controller.end_stream_with_rate(0.05).unwrap();
        // avg (120 + 120) / 2 = 120 -> 6, plus 10,000 / 10,000 = 1
        assert_eq!(record.new_followers, 7);
        assert_eq!(record.earnings, 10_000);
        assert_eq!(record.actions.len(), 2);

        let summary = h.controller.summary();
        assert!(!summary.live);
        assert_eq!(summary.total_earnings, 10_000);
        assert_eq!(summary.follower_count, 7);
        assert_eq!(summary.history.len(), 1);
        assert!(!h.live.is_set());

        assert!(h.controller.end_stream().is_none());

        let log = h.log.0.lock().unwrap().clone();
        assert!(log.last().unwrap().1.contains("Total earnings: 10,000원"));
    }

    #[tokio::test]
    async fn ended_stream_survives_restart_and_replays() {
        let dir = tempfile::tempdir().unwrap();
        let settings = FlingSettings {
            chat_id: "persist".into(),
            pacing: Pacing::INSTANT,
            replay_pacing: Pacing::INSTANT,
            ..Default::default()
        };
        let make = |reply: &'static str| {
            StreamController::new(
                settings.clone(),
                ContactRoster::default(),
                ActiveFlag::default(),
                Box::new(Canned(Ok(reply))),
                Box::new(crate::engine::host::DiscardLedger),
                Box::new(crate::engine::host::DiscardLog),
                StreamStore::new(dir.path()),
            )
        };

        let mut first = make(REPLY);
        first.start_stream("저장", "시작").unwrap();
        first.play_first_action(&mut |_: &ChatEvent| {}).await.unwrap();
        first.end_stream_with_rate(0.01).unwrap();

        let second = make("");
        assert_eq!(second.summary().history, first.summary().history);
        assert_eq!(second.summary().total_earnings, 10_000);

        struct Tally {
            viewers: Option<u64>,
            events: usize,
        }
        impl StreamObserver for Tally {
            fn viewers(&mut self, count: u64) {
                self.viewers = Some(count);
            }
            fn chat(&mut self, _: &ChatEvent) {
                self.events += 1;
            }
        }

        let mut tally = Tally {
            viewers: None,
            events: 0,
        };
        let report = second.replay_action(0, 0, || true, &mut tally).await.unwrap();
        assert_eq!(report.emitted, 3);
        assert_eq!(report.donated, 0);
        assert_eq!(tally.viewers, Some(120));
        assert_eq!(tally.events, 3);
        // replay never credits
        assert_eq!(second.summary().total_earnings, 10_000);

        assert!(matches!(
            second.replay_action(5, 0, || true, &mut tally).await,
            Err(StreamError::NoSuchRecord(5))
        ));
    }

    #[test]
    fn profile_and_reset_persist() {
        let mut h = harness(Ok(""));
        h.controller.update_profile(StreamerProfile {
            nickname: "하나짱".into(),
            ..Default::default()
        });
        assert_eq!(h.controller.summary().profile.nickname, "하나짱");

        h.controller.reset_data();
        assert_eq!(h.controller.summary().profile, StreamerProfile::default());
    }
}
