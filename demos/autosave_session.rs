/// Example: a scripted editing session with autosave
///
/// This example demonstrates:
/// - Loading a mind map with missing ids and default layout
/// - Dragging, selecting, renaming and recoloring nodes
/// - Debounced and periodic saves driven by a virtual clock
/// - Writing the saved record and event log to disk

use anyhow::Result;
use mindmap_canvas::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Mind Map Canvas: Autosave Session ===\n");

    let document = PersistedNode::new("root", "Launch")
        .with_child(PersistedNode::new("", "Design"))
        .with_child(PersistedNode::new("", "Build").with_child(PersistedNode::new("", "Test")))
        .with_child(PersistedNode::new("ship", "Ship"));
    let mut mindmap = Mindmap::new(1, "Launch plan", 1, document);

    let saves: Rc<RefCell<Vec<PersistedNode>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&saves);
    let mut engine = CanvasEngine::new(&mindmap.data, EngineConfig::default())
        .with_save_callback(move |doc| sink.borrow_mut().push(doc));

    println!("Step 1: Loaded '{}'", mindmap.title);
    println!("  Nodes: {}, edges: {}", engine.graph().node_count(), engine.graph().edge_count());
    for issue in engine.diagnostics().iter() {
        println!("  note: {}", issue.message);
    }

    println!("\nStep 2: Dragging 'ship' 60px right over 400ms...");
    let start = engine.graph().position_of("ship");
    engine.on_pointer_down(PointerTarget::Node("ship".into()), Point::ZERO);
    for step in 1..=4u64 {
        engine.tick(Duration::from_millis(step * 100));
        engine.on_pointer_move(Point::new(step as f32 * 15.0, 0.0));
    }
    engine.on_pointer_up();
    println!(
        "  ✓ Moved from ({}, {}) to ({}, {})",
        start.x,
        start.y,
        engine.graph().position_of("ship").x,
        engine.graph().position_of("ship").y
    );

    println!("\nStep 3: Selecting and recoloring 'ship'...");
    engine.on_pointer_down(PointerTarget::Node("ship".into()), Point::ZERO);
    engine.on_pointer_up();
    engine.recolor("ship", Some("#c8e6c9".to_string()));
    engine.on_double_click("ship");
    engine.on_text_commit("Ship it");
    println!("  ✓ Selected: {:?}", engine.graph().selected_ids());

    println!("\nStep 4: Letting time pass...");
    for second in 1..=31u64 {
        if engine.tick(Duration::from_secs(second)) {
            println!("  ✓ Save at {}s", second);
        }
    }
    println!("  Total saves: {}", saves.borrow().len());

    println!("\nStep 5: Writing to disk...");
    let dir = std::env::temp_dir().join("mindmap_canvas_demo");
    std::fs::create_dir_all(&dir)?;
    let file = MindmapFile::new(dir.join("launch.json"));
    if let Some(latest) = saves.borrow().last() {
        mindmap.replace_data(latest.clone());
    }
    file.save(&mindmap)?;
    file.append_events(engine.events())?;
    println!("  ✓ Saved to {}", file.path().display());
    println!("  ✓ {} events logged to {}", engine.events().len(), file.events_path().display());

    engine.shutdown();
    println!("\n=== Session complete ===");
    Ok(())
}
