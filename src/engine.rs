//! Pointer/keyboard state machine over the live graph
//!
//! The engine is framework-free: a UI binding forwards pointer positions (in
//! its own screen space, only deltas matter) and the time, and renders from
//! [`CanvasEngine::graph`] and [`CanvasEngine::pan_offset`].

use crate::{
    convert, Diagnostics, EngineConfig, EventType, GraphEvent, IdSource, LiveGraph,
    PersistedNode, Point, SaveScheduler, SaveTrigger, UlidIds,
};
use std::collections::HashSet;
use std::time::Duration;

/// Cumulative pointer travel (per axis) beyond which a press becomes a drag
pub const DRAG_THRESHOLD: f32 = 3.0;

/// Receives every saved document
pub type SaveCallback = Box<dyn FnMut(PersistedNode)>;

/// What the pointer went down on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerTarget {
    Background,
    Node(String),
}

/// Externally visible interaction state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    Idle,
    Panning,
    DraggingNodes,
    EditingText,
}

#[derive(Debug, Clone)]
enum Gesture {
    None,
    Panning {
        origin: Point,
        last: Point,
        moved: bool,
    },
    Dragging {
        pressed: String,
        origin: Point,
        /// Moving nodes with their positions at drag start
        tracked: Vec<(String, Point)>,
        moved: bool,
    },
    /// Node press while read-only: can still select, never moves
    Pressing {
        pressed: String,
        origin: Point,
        moved: bool,
    },
}

fn beyond_threshold(origin: Point, current: Point) -> bool {
    (current.x - origin.x).abs() > DRAG_THRESHOLD || (current.y - origin.y).abs() > DRAG_THRESHOLD
}

/// Owns the live graph and every piece of interaction state around it
pub struct CanvasEngine {
    config: EngineConfig,
    ids: Box<dyn IdSource>,
    on_save: Option<SaveCallback>,

    graph: LiveGraph,
    gesture: Gesture,
    pan_offset: Point,

    scheduler: SaveScheduler,
    /// Last time passed to `tick`
    clock: Duration,
    torn_down: bool,

    load_diagnostics: Diagnostics,
    save_diagnostics: Diagnostics,
    events: Vec<GraphEvent>,
}

impl CanvasEngine {
    /// Engine over `document`, minting ULIDs for nodes that lack an id
    pub fn new(document: &PersistedNode, config: EngineConfig) -> Self {
        Self::with_id_source(document, config, Box::new(UlidIds))
    }

    pub fn with_id_source(
        document: &PersistedNode,
        config: EngineConfig,
        ids: Box<dyn IdSource>,
    ) -> Self {
        let scheduler = SaveScheduler::new(config.autosave);
        let mut engine = Self {
            config,
            ids,
            on_save: None,
            graph: LiveGraph::new(),
            gesture: Gesture::None,
            pan_offset: Point::ZERO,
            scheduler,
            clock: Duration::ZERO,
            torn_down: false,
            load_diagnostics: Diagnostics::new(),
            save_diagnostics: Diagnostics::new(),
            events: Vec::new(),
        };
        engine.load(document);
        engine
    }

    pub fn with_save_callback(mut self, callback: impl FnMut(PersistedNode) + 'static) -> Self {
        self.set_save_callback(callback);
        self
    }

    pub fn set_save_callback(&mut self, callback: impl FnMut(PersistedNode) + 'static) {
        self.on_save = Some(Box::new(callback));
    }

    pub fn clear_save_callback(&mut self) {
        self.on_save = None;
    }

    // ========== Lifecycle ==========

    /// Replace the live graph with a new document
    ///
    /// Selection, edit focus, pan offset and any gesture are reset, and both
    /// save timers restart from the current clock.
    pub fn load(&mut self, document: &PersistedNode) {
        let mut flat = convert::flatten(
            document,
            self.config.canvas_width,
            self.config.canvas_height,
            self.ids.as_mut(),
        );
        self.load_diagnostics = std::mem::take(&mut flat.diagnostics);
        self.save_diagnostics = Diagnostics::new();
        self.graph = LiveGraph::from_flat(flat);
        self.gesture = Gesture::None;
        self.pan_offset = Point::ZERO;
        self.scheduler.start(self.clock);
        self.torn_down = false;

        let root_id = self
            .graph
            .nodes()
            .first()
            .map(|n| n.id.clone())
            .unwrap_or_default();
        log::info!(
            "Loaded mind map {} ({} nodes, {} edges)",
            root_id,
            self.graph.node_count(),
            self.graph.edge_count()
        );
        self.record(EventType::DocumentLoaded {
            root_id,
            node_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
        });
    }

    /// Cancel both save timers; ticks only advance the clock until the next `load`
    pub fn shutdown(&mut self) {
        if self.torn_down {
            return;
        }
        self.scheduler.cancel();
        self.gesture = Gesture::None;
        self.torn_down = true;
        log::debug!("Canvas engine torn down");
        self.record(EventType::TornDown);
    }

    /// Toggle read-only mode; entering it drops text editing and node drags
    pub fn set_read_only(&mut self, read_only: bool) {
        self.config.read_only = read_only;
        if read_only {
            if matches!(self.gesture, Gesture::Dragging { .. }) {
                self.gesture = Gesture::None;
            }
            if let Some(id) = self.graph.end_edit() {
                self.record(EventType::EditCancelled { id });
            }
        }
    }

    // ========== Queries ==========

    pub fn graph(&self) -> &LiveGraph {
        &self.graph
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_read_only(&self) -> bool {
        self.config.read_only
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn mode(&self) -> InteractionMode {
        match self.gesture {
            Gesture::Panning { .. } => InteractionMode::Panning,
            Gesture::Dragging { .. } => InteractionMode::DraggingNodes,
            _ if self.graph.edit_focus().is_some() => InteractionMode::EditingText,
            _ => InteractionMode::Idle,
        }
    }

    pub fn selection(&self) -> &HashSet<String> {
        self.graph.selection()
    }

    pub fn edit_focus(&self) -> Option<&str> {
        self.graph.edit_focus()
    }

    /// Translation applied to the whole canvas when rendering
    pub fn pan_offset(&self) -> Point {
        self.pan_offset
    }

    /// Undo any panning
    pub fn reset_view(&mut self) {
        self.pan_offset = Point::ZERO;
    }

    pub fn screen_to_canvas(&self, point: Point) -> Point {
        point - self.pan_offset
    }

    pub fn canvas_to_screen(&self, point: Point) -> Point {
        point + self.pan_offset
    }

    /// Recoveries made while loading the current document
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.load_diagnostics
    }

    /// Recoveries made while building the most recent saved document
    pub fn save_diagnostics(&self) -> &Diagnostics {
        &self.save_diagnostics
    }

    pub fn events(&self) -> &[GraphEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub fn clock(&self) -> Duration {
        self.clock
    }

    /// When the pending debounced save will fire, if one is pending
    pub fn pending_save_at(&self) -> Option<Duration> {
        self.scheduler.pending_debounce()
    }

    /// Earliest moment `tick` has work to do
    pub fn next_deadline(&self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    // ========== Pointer input ==========

    pub fn on_pointer_down(&mut self, target: PointerTarget, position: Point) {
        if !matches!(self.gesture, Gesture::None) {
            log::debug!("Pointer down during an active gesture, restarting it");
        }

        self.gesture = match target {
            PointerTarget::Background => Gesture::Panning {
                origin: position,
                last: position,
                moved: false,
            },
            PointerTarget::Node(id) if self.config.read_only => Gesture::Pressing {
                pressed: id,
                origin: position,
                moved: false,
            },
            PointerTarget::Node(id) => {
                let moving = if self.graph.is_selected(&id) {
                    self.graph.selected_ids()
                } else {
                    vec![id.clone()]
                };
                let tracked = moving
                    .into_iter()
                    .map(|node_id| {
                        let start = self.graph.position_of(&node_id);
                        (node_id, start)
                    })
                    .collect();
                Gesture::Dragging {
                    pressed: id,
                    origin: position,
                    tracked,
                    moved: false,
                }
            }
        };
    }

    /// Returns whether the view changed
    pub fn on_pointer_move(&mut self, position: Point) -> bool {
        match &mut self.gesture {
            Gesture::None => false,
            Gesture::Panning {
                origin,
                last,
                moved,
            } => {
                let delta = position - *last;
                *last = position;
                if beyond_threshold(*origin, position) {
                    *moved = true;
                }
                self.pan_offset = self.pan_offset + delta;
                true
            }
            Gesture::Dragging {
                origin,
                tracked,
                moved,
                ..
            } => {
                if beyond_threshold(*origin, position) {
                    *moved = true;
                }
                // Always relative to the drag start so rounding never accumulates
                let delta = position - *origin;
                let moves: Vec<(String, Point)> = tracked
                    .iter()
                    .map(|(id, start)| (id.clone(), *start + delta))
                    .collect();
                if self.graph.move_nodes(&moves) == 0 {
                    return false;
                }
                self.scheduler.note_mutation(self.clock);
                true
            }
            Gesture::Pressing { origin, moved, .. } => {
                if beyond_threshold(*origin, position) {
                    *moved = true;
                }
                false
            }
        }
    }

    /// End the gesture; a press that never crossed the threshold counts as a click
    pub fn on_pointer_up(&mut self) {
        match std::mem::replace(&mut self.gesture, Gesture::None) {
            Gesture::None => {}
            Gesture::Panning { moved, .. } => {
                if !moved {
                    self.click_background();
                }
            }
            Gesture::Dragging {
                pressed,
                tracked,
                moved,
                ..
            } => {
                if moved {
                    self.record_drag(tracked);
                } else {
                    self.click_node(&pressed);
                }
            }
            Gesture::Pressing { pressed, moved, .. } => {
                if !moved {
                    self.click_node(&pressed);
                }
            }
        }
    }

    /// Pointer left the canvas: end the gesture without a click
    pub fn on_pointer_leave(&mut self) {
        if let Gesture::Dragging {
            tracked,
            moved: true,
            ..
        } = std::mem::replace(&mut self.gesture, Gesture::None)
        {
            self.record_drag(tracked);
        }
    }

    fn click_node(&mut self, id: &str) {
        match self.graph.toggle_selected(id) {
            Ok(_) => self.record(EventType::SelectionChanged {
                selected: self.graph.selected_ids(),
            }),
            Err(e) => log::debug!("Ignoring click: {}", e),
        }
    }

    fn click_background(&mut self) {
        if self.graph.clear_selection() {
            self.record(EventType::SelectionChanged {
                selected: Vec::new(),
            });
        }
    }

    fn record_drag(&mut self, tracked: Vec<(String, Point)>) {
        self.record(EventType::NodesMoved {
            ids: tracked.into_iter().map(|(id, _)| id).collect(),
        });
    }

    // ========== Editing ==========

    /// Start inline editing of a node; returns false when refused
    pub fn on_double_click(&mut self, node_id: &str) -> bool {
        if self.config.read_only {
            log::debug!("Read-only canvas, not editing {}", node_id);
            return false;
        }
        match self.graph.begin_edit(node_id) {
            Ok(()) => {
                self.record(EventType::EditStarted {
                    id: node_id.to_string(),
                });
                true
            }
            Err(e) => {
                log::debug!("Cannot edit: {}", e);
                false
            }
        }
    }

    /// Apply edited text to the focused node and leave editing
    pub fn on_text_commit(&mut self, text: impl Into<String>) -> bool {
        let Some(id) = self.graph.end_edit() else {
            return false;
        };
        let text = text.into();
        match self.graph.set_text(&id, text.clone()) {
            Ok(()) => {
                self.scheduler.note_mutation(self.clock);
                self.record(EventType::TextChanged { id, text });
                true
            }
            Err(e) => {
                log::warn!("Dropping text edit: {}", e);
                false
            }
        }
    }

    pub fn on_text_cancel(&mut self) -> bool {
        match self.graph.end_edit() {
            Some(id) => {
                self.record(EventType::EditCancelled { id });
                true
            }
            None => false,
        }
    }

    /// Set (or clear) a node's fill color
    pub fn recolor(&mut self, node_id: &str, color: Option<String>) -> bool {
        if self.config.read_only {
            return false;
        }
        match self.graph.set_background(node_id, color.clone()) {
            Ok(()) => {
                self.scheduler.note_mutation(self.clock);
                self.record(EventType::NodeRecolored {
                    id: node_id.to_string(),
                    color,
                });
                true
            }
            Err(e) => {
                log::debug!("Cannot recolor: {}", e);
                false
            }
        }
    }

    /// Remove the selected nodes and their edges
    pub fn delete_selected(&mut self) -> Vec<String> {
        if self.config.read_only {
            return Vec::new();
        }
        let removed = self.graph.delete_selected();
        if !removed.is_empty() {
            self.scheduler.note_mutation(self.clock);
            self.record(EventType::NodesDeleted {
                ids: removed.clone(),
            });
        }
        removed
    }

    // ========== Persistence ==========

    /// Save immediately
    pub fn save_now(&mut self) -> bool {
        self.save(vec![SaveTrigger::Explicit])
    }

    /// Advance time and run any save that has come due
    ///
    /// Returns whether a save was handed to the callback. Time never goes
    /// backwards: an earlier `now` is treated as the last one seen.
    pub fn tick(&mut self, now: Duration) -> bool {
        self.clock = self.clock.max(now);
        if self.torn_down {
            return false;
        }

        let triggers = self.scheduler.poll(self.clock);
        if triggers.is_empty() {
            return false;
        }
        self.save(triggers)
    }

    fn save(&mut self, triggers: Vec<SaveTrigger>) -> bool {
        let Some(callback) = self.on_save.as_mut() else {
            log::debug!("No save handler configured, skipping {:?} save", triggers);
            return false;
        };

        let rebuilt = convert::unflatten(self.graph.nodes(), self.graph.edges());
        self.save_diagnostics = rebuilt.diagnostics;
        let Some(document) = rebuilt.document else {
            log::debug!("Mind map is empty, nothing to save");
            return false;
        };

        let root_id = document.id.clone();
        callback(document);
        log::debug!("Saved mind map {} ({:?})", root_id, triggers);
        self.record(EventType::Saved { triggers, root_id });
        true
    }

    fn record(&mut self, event: EventType) {
        self.events.push(GraphEvent::new(event));
    }
}
