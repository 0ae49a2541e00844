mod app;
mod fonts;
mod i18n;

use app::UiApp;
use eframe::{NativeOptions, egui};
use leaf_core::AppConfig;
use std::path::PathBuf;

fn main() {
    tracing_subscriber::fmt::init();
    let config_path = config_path();
    let config = match config_path.as_deref() {
        Some(path) => AppConfig::load_or_default(path),
        None => {
            tracing::warn!("no config directory available; settings will not be saved");
            AppConfig::default()
        }
    };
    tracing::info!("diagnosis service: {}", config.server_url);

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([980.0, 760.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    if let Err(e) = eframe::run_native(
        "Leaf Doctor",
        options,
        Box::new(move |cc| {
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>(Box::new(UiApp::new(
                cc,
                config,
                config_path,
            )))
        }),
    ) {
        eprintln!("Application stopped with error: {e}");
    }
}

fn config_path() -> Option<PathBuf> {
    directories_next::ProjectDirs::from("org", "leafdoctor", "LeafDoctor")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
