use eframe::egui;

use crate::engine::protocol::EngineCommand;
use crate::ui::app::FlingApp;

pub fn draw_left_panel(ctx: &egui::Context, app: &mut FlingApp) {
    egui::SidePanel::left("channel")
        .resizable(true)
        .default_width(240.0)
        .min_width(200.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                draw_profile(ui, app);
                ui.separator();
                draw_history(ui, app);
            });
        });
}

fn draw_profile(ui: &mut egui::Ui, app: &mut FlingApp) {
    ui.heading("Streamer");

    let locked = app.is_live();
    let draft = &mut app.ui.profile_draft;

    ui.add_enabled_ui(!locked, |ui| {
        ui.label("닉네임");
        ui.text_edit_singleline(&mut draft.nickname);
        ui.label("방송 컨셉");
        ui.text_edit_multiline(&mut draft.concept);
        ui.label("의상");
        ui.text_edit_singleline(&mut draft.outfit);
    });

    let dirty = app.ui.profile_draft != app.ui.summary.profile;
    if ui
        .add_enabled(dirty && !locked, egui::Button::new("프로필 저장"))
        .clicked()
    {
        app.send_command(EngineCommand::UpdateProfile(app.ui.profile_draft.clone()));
    }
}

fn draw_history(ui: &mut egui::Ui, app: &mut FlingApp) {
    ui.heading("History");

    if app.ui.summary.history.is_empty() {
        ui.label("아직 방송 기록이 없습니다.");
        return;
    }

    let can_replay = !app.is_live() && !app.ui.generating;
    let currency = app.settings.currency;
    let mut replay = None;

    for (i, record) in app.ui.summary.history.iter().enumerate() {
        ui.group(|ui| {
            ui.strong(&record.title);
            if !record.rp_date.is_empty() {
                ui.label(&record.rp_date);
            }
            ui.label(format!(
                "{}분 · 최대 {}명 · {}",
                record.duration_minutes(),
                record.max_viewers,
                currency.format_money(record.earnings)
            ));
            ui.label(format!("팔로워 +{}", record.new_followers));

            let has_actions = !record.actions.is_empty();
            if ui
                .add_enabled(can_replay && has_actions, egui::Button::new("▶ 다시보기"))
                .clicked()
            {
                replay = Some(i);
            }
        });
    }

    if let Some(i) = replay {
        app.start_replay(i);
    }
}
