mod engine;
mod model;
mod ui;

use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = ui::settings_io::load_settings();
    let roster = ui::settings_io::load_contacts();
    tracing::info!(
        endpoint = %settings.endpoint,
        contacts = roster.len(),
        "starting Fling"
    );

    let app = ui::app::FlingApp::new(settings, roster)?;
    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Fling",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
