mod app;
mod chart;
mod storage;

use app::TimesQuizApp;
use eframe::egui;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("times_quiz=info,quiz_core=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn main() -> eframe::Result<()> {
    init_logging();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([420.0, 560.0])
            .with_min_inner_size([360.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Multiplication Quiz",
        options,
        Box::new(|cc| Ok(Box::new(TimesQuizApp::new(cc)))),
    )
}
