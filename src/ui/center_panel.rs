use eframe::egui;

use super::app::{FlingApp, Screen};

pub fn draw_center_panel(ctx: &egui::Context, app: &mut FlingApp) {
    match app.ui.screen.clone() {
        Screen::Home => draw_home(ctx, app),
        Screen::Live => draw_live(ctx, app),
        Screen::Ended(record) => {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.heading("방송 종료");
                ui.separator();
                ui.label(format!("제목: {}", record.title));
                ui.label(format!("방송 시간: {}분", record.duration_minutes()));
                ui.label(format!("최대 시청자: {}명", record.max_viewers));
                ui.label(format!(
                    "수익: {}",
                    app.settings.currency.format_money(record.earnings)
                ));
                ui.label(format!("새 팔로워: +{}명", record.new_followers));
                ui.add_space(12.0);
                if ui.button("확인").clicked() {
                    app.ui.feed.clear();
                    app.ui.screen = Screen::Home;
                }
            });
        }
        Screen::Replay => draw_replay(ctx, app),
    }
}

fn draw_home(ctx: &egui::Context, app: &mut FlingApp) {
    egui::CentralPanel::default().show(ctx, |ui| {
        ui.heading("새 방송");
        ui.separator();

        ui.label("방송 제목");
        ui.text_edit_singleline(&mut app.ui.setup_title);

        ui.label("첫 행동");
        ui.add(
            egui::TextEdit::multiline(&mut app.ui.setup_action)
                .hint_text("예: 카메라를 켜고 시청자들에게 인사한다")
                .desired_rows(3),
        );

        if let Some(err) = &app.ui.error {
            ui.colored_label(egui::Color32::LIGHT_RED, err);
        }

        if ui.button("🔴 방송 시작").clicked() {
            app.begin_stream();
        }
    });
}

fn draw_live(ctx: &egui::Context, app: &mut FlingApp) {
    let input_id = egui::Id::new("action_input_box");

    egui::TopBottomPanel::top("live_header").show(ctx, |ui| {
        ui.horizontal(|ui| {
            ui.colored_label(egui::Color32::RED, "● LIVE");
            ui.strong(&app.ui.summary.title);
            ui.separator();
            ui.label(format!("👁 {}", app.ui.viewer_count));
            ui.label(format!(
                "💰 {}",
                app.settings.currency.format_symbol(app.ui.summary.earnings)
            ));
            if app.ui.generating {
                ui.spinner();
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("방송 종료").clicked() {
                    app.end_stream();
                }
            });
        });
    });

    // ---------- Input bar ----------
    egui::TopBottomPanel::bottom("action_input").show(ctx, |ui| {
        let mut send_now = false;

        ui.horizontal(|ui| {
            let response = ui.add_sized(
                [ui.available_width() - 60.0, 60.0],
                egui::TextEdit::multiline(&mut app.ui.input_text)
                    .id(input_id)
                    .hint_text("방송에서 할 행동…")
                    .lock_focus(true),
            );

            // Enter vs Shift+Enter
            if response.has_focus() {
                let (enter, shift) =
                    ui.input(|i| (i.key_pressed(egui::Key::Enter), i.modifiers.shift));
                if enter && !shift {
                    send_now = true;
                }
            }

            if ui
                .add_enabled(!app.ui.generating, egui::Button::new("Send"))
                .clicked()
            {
                send_now = true;
            }
        });

        if send_now {
            app.submit_action();
            ui.memory_mut(|m| m.request_focus(input_id));
        }
    });

    // ---------- Chat ----------
    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .stick_to_bottom(app.ui.should_auto_scroll)
            .show(ui, |ui| {
                for item in &app.ui.feed {
                    app.draw_feed_item(ui, item);
                }
            });
    });
}

fn draw_replay(ctx: &egui::Context, app: &mut FlingApp) {
    egui::TopBottomPanel::top("replay_header").show(ctx, |ui| {
        let view = &app.ui.replay;
        ui.horizontal(|ui| {
            ui.label("▶ 다시보기");
            ui.strong(&view.title);
            if view.total > 0 {
                ui.label(format!("{}/{}", view.position + 1, view.total));
            }
        });
        if !view.action.is_empty() {
            ui.label(format!("🎬 {}", view.action));
        }
        ui.horizontal(|ui| {
            if ui.button("다음 장면").clicked() {
                app.replay_next();
            }
            if ui.button("돌아가기").clicked() {
                app.stop_replay();
            }
        });
    });

    egui::CentralPanel::default().show(ctx, |ui| {
        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .stick_to_bottom(app.ui.should_auto_scroll)
            .show(ui, |ui| {
                for item in &app.ui.feed {
                    app.draw_feed_item(ui, item);
                }
            });
    });
}
