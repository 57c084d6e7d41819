// Mind Map Canvas - Core Library

pub mod config;
pub mod convert;
pub mod diagnostics;
pub mod document;
pub mod edge;
pub mod engine;
pub mod event;
pub mod graph;
pub mod id_generator;
pub mod node;
pub mod schedule;
pub mod serialization;
pub mod ui;

// Re-export main types for convenience
pub use config::{AutosaveConfig, EngineConfig};
pub use convert::{flatten, unflatten, FlatGraph, Rebuilt};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use document::{Mindmap, PersistedNode, PersistedStyle};
pub use edge::CanvasEdge;
pub use engine::{CanvasEngine, InteractionMode, PointerTarget, SaveCallback, DRAG_THRESHOLD};
pub use event::{EventType, GraphEvent};
pub use graph::LiveGraph;
pub use id_generator::{IdGenerator, IdSource, UlidIds};
pub use node::{CanvasNode, NodeStyle, Point, Rectangle, DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH};
pub use schedule::{SaveScheduler, SaveTrigger};
pub use serialization::{document_from_json, document_to_json, MindmapFile};
pub use ui::MindmapApp;
