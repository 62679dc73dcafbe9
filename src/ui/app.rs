use eframe::egui;
use egui::Layout;
use std::sync::mpsc;
use std::time::Duration;

use crate::engine::engine;
use crate::engine::protocol::{ActiveFlag, EngineCommand, EngineResponse, StreamSummary};
use crate::model::chat_event::ChatEvent;
use crate::model::contact::ContactRoster;
use crate::model::session::{StreamRecord, StreamerProfile};
use crate::model::settings::FlingSettings;
use crate::ui::center_panel::draw_center_panel;
use crate::ui::left_panel::draw_left_panel;
use crate::ui::right_panel::draw_right_panel;
use crate::ui::settings::UiSettings;
use crate::ui::settings_io;

/* =========================
   Screens
   ========================= */

#[derive(Debug, Clone, Default)]
pub enum Screen {
    #[default]
    Home,
    Live,
    Ended(StreamRecord),
    Replay,
}

/// One line in the live or replay feed.
#[derive(Debug, Clone)]
pub enum FeedItem {
    Action(String),
    Event(ChatEvent),
    Notice(String),
}

#[derive(Debug, Clone, Default)]
pub struct ReplayView {
    pub title: String,
    pub action: String,
    pub position: usize,
    pub total: usize,
}

/* =========================
   UI State
   ========================= */

#[derive(Default)]
pub struct UiState {
    pub screen: Screen,
    pub summary: StreamSummary,
    pub feed: Vec<FeedItem>,
    pub viewer_count: u64,
    pub generating: bool,
    pub should_auto_scroll: bool,

    pub input_text: String,
    pub setup_title: String,
    pub setup_action: String,

    pub replay: ReplayView,
    pub error: Option<String>,

    pub show_settings: bool,
    pub profile_draft: StreamerProfile,
    pub settings_draft: FlingSettings,
    pub status: Option<String>,
    pub confirm_reset: bool,
}

/* =========================
   App
   ========================= */

pub struct FlingApp {
    pub ui: UiState,
    pub ui_settings: UiSettings,
    pub settings: FlingSettings,

    live: ActiveFlag,
    replay: ActiveFlag,
    cmd_tx: mpsc::Sender<EngineCommand>,
    resp_rx: mpsc::Receiver<EngineResponse>,
}

impl FlingApp {
    pub fn new(settings: FlingSettings, roster: ContactRoster) -> anyhow::Result<Self> {
        let live = ActiveFlag::default();
        let replay = ActiveFlag::default();
        let (cmd_tx, resp_rx) = engine::spawn(settings.clone(), roster, live.clone(), replay.clone())?;

        Ok(Self {
            ui: UiState {
                settings_draft: settings.clone(),
                ..Default::default()
            },
            ui_settings: settings_io::load_ui_settings(),
            settings,
            live,
            replay,
            cmd_tx,
            resp_rx,
        })
    }

    pub fn send_command(&self, cmd: EngineCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            tracing::error!("engine thread is gone");
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self.ui.screen, Screen::Live)
    }

    pub fn begin_stream(&mut self) {
        let title = self.ui.setup_title.trim().to_string();
        let first_action = self.ui.setup_action.trim().to_string();
        if title.is_empty() || first_action.is_empty() {
            self.ui.error = Some("방송 제목과 첫 행동을 입력해 주세요.".into());
            return;
        }
        self.ui.error = None;
        self.ui.setup_action.clear();
        self.ui.feed = vec![FeedItem::Action(first_action.clone())];
        self.send_command(EngineCommand::StartStream { title, first_action });
    }

    pub fn submit_action(&mut self) {
        let action = self.ui.input_text.trim().to_string();
        if action.is_empty() || self.ui.generating {
            return;
        }
        self.ui.input_text.clear();
        // cleared again by the engine's Generating(false)
        self.ui.generating = true;
        self.ui.feed.push(FeedItem::Action(action.clone()));
        self.ui.should_auto_scroll = true;
        self.send_command(EngineCommand::SubmitAction(action));
    }

    /// Stops any chat still being played out, then closes the stream.
    pub fn end_stream(&mut self) {
        self.live.clear();
        self.send_command(EngineCommand::EndStream);
    }

    pub fn start_replay(&mut self, record: usize) {
        self.ui.feed.clear();
        self.ui.screen = Screen::Replay;
        self.send_command(EngineCommand::StartReplay(record));
    }

    pub fn replay_next(&mut self) {
        self.replay.clear();
        self.send_command(EngineCommand::ReplayNext);
    }

    pub fn stop_replay(&mut self) {
        self.replay.clear();
        self.send_command(EngineCommand::StopReplay);
        self.ui.screen = Screen::Home;
    }

    pub fn apply_settings(&mut self) {
        self.stage_settings();
        settings_io::save_settings(&self.settings);
        self.ui.status = Some("설정을 저장했습니다.".into());
    }

    /// Adopts the draft and hands it to the engine. The chat id is fixed
    /// while a stream is live.
    fn stage_settings(&mut self) {
        if self.is_live() {
            self.ui.settings_draft.chat_id = self.settings.chat_id.clone();
        }
        self.settings = self.ui.settings_draft.clone();
        self.send_command(EngineCommand::UpdateSettings(self.settings.clone()));
    }

    fn handle_response(&mut self, resp: EngineResponse) {
        match resp {
            EngineResponse::StreamStarted { title } => {
                tracing::debug!(%title, "stream started");
                self.ui.screen = Screen::Live;
                self.ui.viewer_count = 0;
                self.ui.should_auto_scroll = true;
            }
            EngineResponse::Chat(event) => {
                self.ui.feed.push(FeedItem::Event(event));
                self.ui.should_auto_scroll = true;
            }
            EngineResponse::ViewerCount(count) => self.ui.viewer_count = count,
            EngineResponse::Generating(busy) => self.ui.generating = busy,
            EngineResponse::StreamEnded(record) => {
                self.ui.screen = Screen::Ended(record);
                self.ui.generating = false;
            }
            EngineResponse::Replay { title, action, position, total } => {
                self.ui.feed.clear();
                self.ui.replay = ReplayView { title, action, position, total };
                self.ui.should_auto_scroll = true;
            }
            EngineResponse::Snapshot(summary) => {
                // Keep unsaved profile edits.
                if self.ui.profile_draft == self.ui.summary.profile {
                    self.ui.profile_draft = summary.profile.clone();
                }
                self.ui.summary = summary;
            }
            EngineResponse::Error(message) => {
                if self.is_live() {
                    self.ui.feed.push(FeedItem::Notice(message.clone()));
                    self.ui.should_auto_scroll = true;
                }
                self.ui.error = Some(message);
            }
        }
    }

    pub fn draw_feed_item(&self, ui: &mut egui::Ui, item: &FeedItem) {
        let (bg, right, text) = match item {
            FeedItem::Action(t) => (
                self.ui_settings.color("Action"),
                true,
                format!("{}: {t}", self.settings.display_name()),
            ),
            FeedItem::Event(ev) => match ev {
                ChatEvent::Donation { username, amount, .. } => (
                    self.ui_settings.color("Donation"),
                    false,
                    format!(
                        "💎 {username} {}\n{}",
                        self.settings.currency.format_symbol(*amount),
                        ev.display_message()
                    ),
                ),
                ChatEvent::Contact { .. } => (
                    self.ui_settings.color("Contact"),
                    false,
                    format!("★ {}: {}", ev.username(), ev.message()),
                ),
                ChatEvent::Chat { .. } => (
                    self.ui_settings.color("Chat"),
                    false,
                    format!("{}: {}", ev.username(), ev.message()),
                ),
            },
            FeedItem::Notice(t) => (self.ui_settings.color("System"), false, t.clone()),
        };

        ui.add_space(6.0);

        if right {
            ui.with_layout(Layout::right_to_left(egui::Align::TOP), |ui| {
                bubble(ui, bg, &text);
            });
        } else {
            bubble(ui, bg, &text);
        }
    }
}

/* =========================
   egui App
   ========================= */

impl eframe::App for FlingApp {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        ctx.set_pixels_per_point(self.ui_settings.ui_scale);

        while let Ok(resp) = self.resp_rx.try_recv() {
            self.handle_response(resp);
        }

        egui::TopBottomPanel::top("top").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("📺 Fling");
                ui.separator();
                ui.label(format!("팔로워 {}", self.ui.summary.follower_count));
                ui.label(format!(
                    "누적 수익 {}",
                    self.settings.currency.format_money(self.ui.summary.total_earnings)
                ));
                ui.with_layout(Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.toggle_value(&mut self.ui.show_settings, "⚙ Settings");
                });
            });
        });

        draw_left_panel(ctx, self);
        if self.ui.show_settings {
            draw_right_panel(ctx, self);
        }
        draw_center_panel(ctx, self);

        self.ui.should_auto_scroll = false;

        // Responses arrive from the engine thread between input events.
        if self.is_live() || self.ui.generating || matches!(self.ui.screen, Screen::Replay) {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

/* =========================
   UI Helpers
   ========================= */

pub fn bubble(ui: &mut egui::Ui, color: egui::Color32, text: &str) {
    egui::Frame::new()
        .fill(color)
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(10, 6))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(text).color(egui::Color32::WHITE));
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline_app() -> (FlingApp, mpsc::Receiver<EngineCommand>, mpsc::Sender<EngineResponse>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let app = FlingApp {
            ui: UiState {
                screen: Screen::Live,
                ..Default::default()
            },
            ui_settings: UiSettings::default(),
            settings: FlingSettings::default(),
            live: ActiveFlag::default(),
            replay: ActiveFlag::default(),
            cmd_tx,
            resp_rx,
        };
        (app, cmd_rx, resp_tx)
    }

    #[test]
    fn double_submit_sends_one_action() {
        let (mut app, cmd_rx, resp_tx) = offline_app();

        app.ui.input_text = "노래한다".into();
        app.submit_action();
        app.ui.input_text = "노래한다".into();
        app.submit_action();

        let sent: Vec<EngineCommand> = cmd_rx.try_iter().collect();
        assert_eq!(sent.len(), 1);
        assert!(matches!(&sent[0], EngineCommand::SubmitAction(a) if a == "노래한다"));
        assert!(app.ui.generating);

        // engine finished; input opens up again
        resp_tx.send(EngineResponse::Generating(false)).unwrap();
        while let Ok(resp) = app.resp_rx.try_recv() {
            app.handle_response(resp);
        }
        app.ui.input_text = "춤춘다".into();
        app.submit_action();
        assert_eq!(cmd_rx.try_iter().count(), 1);
    }

    #[test]
    fn live_settings_keep_the_chat() {
        let (mut app, cmd_rx, _resp_tx) = offline_app();
        app.ui.settings_draft.chat_id = "other".into();
        app.ui.settings_draft.temperature = 1.2;

        app.stage_settings();

        assert_eq!(app.settings.chat_id, "default");
        assert_eq!(app.settings.temperature, 1.2);
        let sent: Vec<EngineCommand> = cmd_rx.try_iter().collect();
        assert!(matches!(&sent[0], EngineCommand::UpdateSettings(s) if s.chat_id == "default"));
    }
}
