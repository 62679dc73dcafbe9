use eframe::egui;

use crate::engine::llm_client::test_connection;
use crate::engine::protocol::EngineCommand;
use crate::engine::sequencer::Pacing;
use crate::model::currency::Currency;
use crate::ui::app::FlingApp;
use crate::ui::settings_io;

const COLOR_KEYS: [&str; 5] = ["Chat", "Contact", "Donation", "Action", "System"];

pub fn draw_right_panel(ctx: &egui::Context, app: &mut FlingApp) {
    egui::SidePanel::right("settings")
        .resizable(true)
        .default_width(320.0)
        .min_width(260.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                draw_model_settings(ui, app);
                ui.separator();
                draw_user_settings(ui, app);
                ui.separator();
                draw_contacts(ui, app);
                ui.separator();
                draw_appearance(ui, app);
                ui.separator();
                draw_data(ui, app);

                if let Some(status) = &app.ui.status {
                    ui.separator();
                    ui.label(status);
                }
            });
        });
}

fn draw_model_settings(ui: &mut egui::Ui, app: &mut FlingApp) {
    let s = &mut app.ui.settings_draft;

    ui.heading("Model");
    ui.label("Endpoint");
    ui.text_edit_singleline(&mut s.endpoint);
    ui.label("Model");
    ui.text_edit_singleline(&mut s.model);

    ui.horizontal(|ui| {
        ui.label("Temperature");
        ui.add(egui::Slider::new(&mut s.temperature, 0.0..=2.0));
    });
    ui.horizontal(|ui| {
        ui.label("Context tokens");
        ui.add(egui::DragValue::new(&mut s.max_context_tokens).range(512..=131_072));
    });

    ui.collapsing("Prefill", |ui| {
        ui.text_edit_multiline(&mut s.prefill);
    });

    ui.collapsing("Pacing (ms)", |ui| {
        pacing_row(ui, "Live", &mut s.pacing);
        pacing_row(ui, "Replay", &mut s.replay_pacing);
    });

    if ui.button("Test connection").clicked() {
        let endpoint = app.ui.settings_draft.endpoint.clone();
        app.ui.status = Some(match test_connection(&endpoint) {
            Ok(msg) => msg,
            Err(e) => format!("Connection failed: {e}"),
        });
    }
}

fn pacing_row(ui: &mut egui::Ui, label: &str, pacing: &mut Pacing) {
    ui.horizontal(|ui| {
        ui.label(label);
        ui.add(egui::DragValue::new(&mut pacing.min_ms).range(0..=10_000));
        ui.label("–");
        ui.add(egui::DragValue::new(&mut pacing.max_ms).range(0..=10_000));
    });
}

fn draw_user_settings(ui: &mut egui::Ui, app: &mut FlingApp) {
    let live = app.is_live();
    let s = &mut app.ui.settings_draft;

    ui.heading("User");
    ui.label("이름");
    ui.text_edit_singleline(&mut s.user_name);
    ui.label("성격");
    ui.text_edit_multiline(&mut s.user_personality);
    ui.label("태그");
    ui.text_edit_singleline(&mut s.user_tags);
    ui.label("Chat ID");
    ui.add_enabled(!live, egui::TextEdit::singleline(&mut s.chat_id));

    egui::ComboBox::from_label("Currency")
        .selected_text(s.currency.code())
        .show_ui(ui, |ui| {
            for c in Currency::ALL {
                ui.selectable_value(&mut s.currency, c, format!("{} {}", c.code(), c.info().symbol));
            }
        });

    let changed = app.ui.settings_draft != app.settings;
    if ui
        .add_enabled(changed, egui::Button::new("Save settings"))
        .clicked()
    {
        app.apply_settings();
    }
}

fn draw_contacts(ui: &mut egui::Ui, app: &mut FlingApp) {
    ui.heading("Contacts");
    ui.label("연락처 목록(JSON)을 불러오면 해당 시청자의 채팅이 강조됩니다.");

    if ui.button("Import contacts…").clicked() {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .pick_file()
        {
            app.ui.status = Some(match settings_io::import_contacts(&path) {
                Ok(roster) => {
                    let msg = format!("연락처 {}명을 불러왔습니다.", roster.len());
                    app.send_command(EngineCommand::ReloadContacts(roster));
                    msg
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "contact import failed");
                    format!("Import failed: {e}")
                }
            });
        }
    }
}

fn draw_appearance(ui: &mut egui::Ui, app: &mut FlingApp) {
    ui.heading("Appearance");
    ui.label("UI Scale");
    ui.add(egui::Slider::new(&mut app.ui_settings.ui_scale, 0.75..=2.0));

    for key in COLOR_KEYS {
        let mut color = app.ui_settings.color(key);
        ui.horizontal(|ui| {
            if ui.color_edit_button_srgba(&mut color).changed() {
                app.ui_settings.set_color(key, color);
            }
            ui.label(key);
        });
    }

    if ui.button("Save appearance").clicked() {
        settings_io::save_ui_settings(&app.ui_settings);
    }
}

fn draw_data(ui: &mut egui::Ui, app: &mut FlingApp) {
    ui.heading("Data");
    ui.add_enabled_ui(!app.is_live(), |ui| {
        ui.checkbox(&mut app.ui.confirm_reset, "방송 기록과 수익을 모두 지웁니다");
        if ui
            .add_enabled(app.ui.confirm_reset, egui::Button::new("Reset channel"))
            .clicked()
        {
            app.ui.confirm_reset = false;
            app.send_command(EngineCommand::ResetData);
        }
    });
}
