use anyhow::{Context, Result};
use mindmap_canvas::{CanvasEngine, EngineConfig, MindmapFile, PersistedNode, Severity};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(map_path) = args.next().map(PathBuf::from) else {
        eprintln!("usage: mindmap_canvas <mindmap.json> [config.json]");
        std::process::exit(2);
    };
    let config = match args.next() {
        Some(path) => EngineConfig::load(&PathBuf::from(path))?,
        None => EngineConfig::default(),
    };

    let mindmap = MindmapFile::new(&map_path).load()?;

    let saved: Rc<RefCell<Option<PersistedNode>>> = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&saved);
    let mut engine = CanvasEngine::new(&mindmap.data, config)
        .with_save_callback(move |document| *sink.borrow_mut() = Some(document));

    eprintln!("Mind map: {} ({})", mindmap.title, map_path.display());
    eprintln!("  Nodes: {}", engine.graph().node_count());
    eprintln!("  Edges: {}", engine.graph().edge_count());
    for issue in engine.diagnostics().iter() {
        let marker = match issue.severity {
            Severity::Warning => "⚠",
            Severity::Info => "ℹ",
        };
        eprintln!("  {} {}", marker, issue.message);
    }

    engine.save_now();
    engine.shutdown();

    let document = saved
        .borrow_mut()
        .take()
        .context("Mind map has no nodes, nothing to save")?;
    println!("{}", mindmap_canvas::document_to_json(&document)?);

    Ok(())
}
