use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};

use tokio::runtime::Runtime;

use crate::engine::controller::{StreamController, StreamObserver};
use crate::engine::host::{ChatLog, DiscardLedger};
use crate::engine::llm_client::HttpGenerator;
use crate::engine::protocol::{ActiveFlag, EngineCommand, EngineResponse};
use crate::engine::storage::StreamStore;
use crate::model::chat_event::ChatEvent;
use crate::model::contact::ContactRoster;
use crate::model::settings::FlingSettings;

#[derive(Debug, Clone, Copy)]
struct ReplayCursor {
    record: usize,
    action: usize,
}

/// Forwards what the controller produces to the UI.
struct ChannelObserver<'a> {
    tx: &'a Sender<EngineResponse>,
}

impl StreamObserver for ChannelObserver<'_> {
    fn viewers(&mut self, count: u64) {
        let _ = self.tx.send(EngineResponse::ViewerCount(count));
    }

    fn chat(&mut self, event: &ChatEvent) {
        let _ = self.tx.send(EngineResponse::Chat(event.clone()));
    }
}

/// Background worker: owns the controller and a single-threaded runtime
/// and handles one command at a time.
pub struct Engine {
    rx: Receiver<EngineCommand>,
    tx: Sender<EngineResponse>,
    controller: StreamController,
    runtime: Runtime,
    replay_flag: ActiveFlag,
    replay: Option<ReplayCursor>,
}

impl Engine {
    pub fn new(
        rx: Receiver<EngineCommand>,
        tx: Sender<EngineResponse>,
        controller: StreamController,
        replay_flag: ActiveFlag,
    ) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            rx,
            tx,
            controller,
            runtime,
            replay_flag,
            replay: None,
        })
    }

    pub fn run(&mut self) {
        self.send_snapshot();
        while let Ok(cmd) = self.rx.recv() {
            self.handle(cmd);
        }
        tracing::debug!("engine channel closed");
    }

    fn handle(&mut self, cmd: EngineCommand) {
        match cmd {
            EngineCommand::StartStream { title, first_action } => {
                match self.controller.start_stream(&title, &first_action) {
                    Ok(()) => {
                        let _ = self.tx.send(EngineResponse::StreamStarted { title });
                        self.send_snapshot();
                        self.submit(None);
                    }
                    Err(e) => self.send_error(e.to_string()),
                }
            }

            EngineCommand::SubmitAction(action) => self.submit(Some(&action)),

            EngineCommand::EndStream => {
                if let Some(record) = self.controller.end_stream() {
                    let _ = self.tx.send(EngineResponse::StreamEnded(record));
                }
                self.send_snapshot();
            }

            EngineCommand::StartReplay(record) => {
                self.replay = Some(ReplayCursor { record, action: 0 });
                self.replay_flag.set();
                self.play_replay();
            }

            EngineCommand::ReplayNext => {
                let Some(cursor) = self.replay.as_mut() else {
                    return;
                };
                let total = self
                    .controller
                    .record(cursor.record)
                    .map(|r| r.actions.len())
                    .unwrap_or(0);
                cursor.action = if cursor.action + 1 < total {
                    cursor.action + 1
                } else {
                    0
                };
                self.replay_flag.set();
                self.play_replay();
            }

            EngineCommand::StopReplay => {
                self.replay = None;
                self.replay_flag.clear();
            }

            EngineCommand::UpdateProfile(profile) => {
                self.controller.update_profile(profile);
                self.send_snapshot();
            }

            EngineCommand::UpdateSettings(settings) => {
                let switching = settings.chat_id != self.controller.settings().chat_id;
                let generator = Box::new(HttpGenerator::new(&settings));
                match self.controller.update_settings(settings, generator) {
                    Ok(()) if switching => {
                        let path = chat_log_path(&self.controller.settings().chat_id);
                        self.controller.set_log_sink(Box::new(ChatLog::new(path)));
                    }
                    Ok(()) => {}
                    Err(e) => self.send_error(e.to_string()),
                }
                self.send_snapshot();
            }

            EngineCommand::ReloadContacts(roster) => {
                tracing::info!(contacts = roster.len(), "contact roster replaced");
                self.controller.set_roster(roster);
            }

            EngineCommand::ResetData => {
                self.controller.reset_data();
                self.send_snapshot();
            }
        }
    }

    /// Plays `action`, or the stream's opening action when `None`.
    fn submit(&mut self, action: Option<&str>) {
        let _ = self.tx.send(EngineResponse::Generating(true));

        let mut observer = ChannelObserver { tx: &self.tx };
        let outcome = match action {
            Some(action) => self
                .runtime
                .block_on(self.controller.submit_action(action, &mut observer)),
            None => self
                .runtime
                .block_on(self.controller.play_first_action(&mut observer)),
        };

        let _ = self.tx.send(EngineResponse::Generating(false));
        if let Err(e) = outcome {
            self.send_error(e.to_string());
        }
        self.send_snapshot();
    }

    fn play_replay(&mut self) {
        let Some(cursor) = self.replay else {
            return;
        };
        let Some(record) = self.controller.record(cursor.record) else {
            self.send_error(format!("no stored stream at index {}", cursor.record));
            return;
        };

        let _ = self.tx.send(EngineResponse::Replay {
            title: record.title.clone(),
            action: record
                .actions
                .get(cursor.action)
                .map(|a| a.action.clone())
                .unwrap_or_default(),
            position: cursor.action,
            total: record.actions.len(),
        });

        let flag = self.replay_flag.clone();
        let mut observer = ChannelObserver { tx: &self.tx };
        let played = self.runtime.block_on(self.controller.replay_action(
            cursor.record,
            cursor.action,
            || flag.is_set(),
            &mut observer,
        ));
        if let Err(e) = played {
            self.send_error(e.to_string());
        }
    }

    fn send_snapshot(&self) {
        let _ = self.tx.send(EngineResponse::Snapshot(self.controller.summary()));
    }

    fn send_error(&self, message: String) {
        tracing::warn!(%message, "engine error");
        let _ = self.tx.send(EngineResponse::Error(message));
    }
}

/// Host chat log for `chat_id`, next to its stream data.
pub fn chat_log_path(chat_id: &str) -> PathBuf {
    let key = StreamStore::key(chat_id).unwrap_or_else(|| "st_phone_streaming_default".into());
    StreamStore::default_dir().join(format!("{key}.chat.jsonl"))
}

/// Starts the engine thread with the desktop collaborators wired in.
pub fn spawn(
    settings: FlingSettings,
    roster: ContactRoster,
    live: ActiveFlag,
    replay: ActiveFlag,
) -> anyhow::Result<(Sender<EngineCommand>, Receiver<EngineResponse>)> {
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let (resp_tx, resp_rx) = mpsc::channel();

    let controller = StreamController::new(
        settings.clone(),
        roster,
        live,
        Box::new(HttpGenerator::new(&settings)),
        Box::new(DiscardLedger),
        Box::new(ChatLog::new(chat_log_path(&settings.chat_id))),
        StreamStore::new(StreamStore::default_dir()),
    );
    let mut engine = Engine::new(cmd_rx, resp_tx, controller, replay)?;

    std::thread::Builder::new()
        .name("fling-engine".into())
        .spawn(move || engine.run())?;

    Ok((cmd_tx, resp_rx))
}
