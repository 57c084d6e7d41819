use eframe::egui;
use mindmap_canvas::{EngineConfig, MindmapApp, MindmapFile};

fn main() -> eframe::Result<()> {
    let app = match std::env::args().nth(1) {
        Some(path) => {
            let file = MindmapFile::new(path);
            let app = if file.path().exists() {
                MindmapApp::from_file(file, EngineConfig::default())
            } else {
                let title = file
                    .path()
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "Untitled".to_string());
                MindmapFile::create(file.path(), &title)
                    .and_then(|file| MindmapApp::from_file(file, EngineConfig::default()))
            };
            match app {
                Ok(app) => app,
                Err(e) => {
                    eprintln!("Failed to open mind map: {:#}", e);
                    std::process::exit(1);
                }
            }
        }
        None => MindmapApp::new(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title("Mind Map Canvas"),
        ..Default::default()
    };

    eframe::run_native(
        "Mind Map Canvas",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
}
