// Helper functions to build mind maps and engines for integration tests
#![allow(dead_code)]

use mindmap_canvas::{CanvasEngine, EngineConfig, IdGenerator, PersistedNode, Point};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Documents handed to the save callback, in order
pub type SaveLog = Rc<RefCell<Vec<PersistedNode>>>;

pub fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// Root with two pinned children:
///
/// ```text
/// root (400,100)
/// ├── a (300,250)
/// │   └── a1 (300,400)
/// └── b (500,250)
/// ```
pub fn plans_map() -> PersistedNode {
    PersistedNode::new("root", "Plans")
        .at(400.0, 100.0)
        .with_child(
            PersistedNode::new("a", "Travel")
                .at(300.0, 250.0)
                .with_child(PersistedNode::new("a1", "Tickets").at(300.0, 400.0)),
        )
        .with_child(PersistedNode::new("b", "Budget").at(500.0, 250.0).colored("#c8e6c9"))
}

/// A single node pinned at (10, 10)
pub fn single_node_map() -> PersistedNode {
    PersistedNode::new("n", "Only").at(10.0, 10.0)
}

/// Engine with deterministic ids and a recording save callback
pub fn recording_engine(document: &PersistedNode, config: EngineConfig) -> (CanvasEngine, SaveLog) {
    let saves: SaveLog = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&saves);
    let engine = CanvasEngine::with_id_source(document, config, Box::new(IdGenerator::new()))
        .with_save_callback(move |doc| sink.borrow_mut().push(doc));
    (engine, saves)
}

/// Click (press and release without moving) on a node
pub fn click_node(engine: &mut CanvasEngine, id: &str) {
    let at = engine.graph().position_of(id);
    engine.on_pointer_down(mindmap_canvas::PointerTarget::Node(id.to_string()), at);
    engine.on_pointer_up();
}

/// Press on a node, move through `path`, release
pub fn drag_node(engine: &mut CanvasEngine, id: &str, start: Point, path: &[Point]) {
    engine.on_pointer_down(mindmap_canvas::PointerTarget::Node(id.to_string()), start);
    for point in path {
        engine.on_pointer_move(*point);
    }
    engine.on_pointer_up();
}
