mod app;
mod app_dir;
mod config;
mod input;
mod surface;

use eframe::egui;
use tracing::info;

use app::ExplorerApp;
use config::ExplorerConfig;

fn main() -> eframe::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting mandelview");

    let config = ExplorerConfig::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Mandelbrot Set Explorer")
            .with_inner_size([config.window_width, config.window_height]),
        ..Default::default()
    };

    eframe::run_native(
        "Mandelbrot Set Explorer",
        options,
        Box::new(move |cc| Ok(Box::new(ExplorerApp::new(&cc.egui_ctx, config)?))),
    )
}
