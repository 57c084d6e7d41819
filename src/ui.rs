use crate::{
    CanvasEdge, CanvasEngine, CanvasNode, EngineConfig, Mindmap, MindmapFile, PersistedNode,
    Point, PointerTarget, Severity,
};
use anyhow::Result;
use egui::{epaint::PathShape, vec2, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

const CANVAS_BACKGROUND: Color32 = Color32::from_rgb(0xf5, 0xf5, 0xf5);
const SELECTION_BLUE: Color32 = Color32::from_rgb(0x21, 0x96, 0xf3);

/// Fill colors offered for the selected nodes
const PALETTE: [&str; 6] = ["#ffffff", "#ffcdd2", "#fff9c4", "#c8e6c9", "#bbdefb", "#e1bee7"];

/// Desktop mind-map editor
pub struct MindmapApp {
    engine: CanvasEngine,

    /// Record the canvas edits; `data` is replaced on every save
    mindmap: Mindmap,

    /// Where saves go (if opened from a file)
    file: Option<MindmapFile>,

    /// Filled by the engine's save callback, drained every frame
    saved: Rc<RefCell<Option<PersistedNode>>>,

    /// Text being edited in the inline editor
    edit_buffer: String,

    status_message: String,

    show_diagnostics: bool,
}

impl Default for MindmapApp {
    fn default() -> Self {
        Self::new()
    }
}

impl MindmapApp {
    /// Unsaved map with a single central node
    pub fn new() -> Self {
        let root = PersistedNode::new("", "Central idea");
        Self::with_mindmap(Mindmap::new(0, "Untitled", 0, root), None, EngineConfig::default())
    }

    pub fn from_file(file: MindmapFile, config: EngineConfig) -> Result<Self> {
        let mindmap = file.load()?;
        let mut app = Self::with_mindmap(mindmap, Some(file), config);
        if let Some(file) = &app.file {
            app.status_message = format!("Loaded {}", file.path().display());
        }
        Ok(app)
    }

    fn with_mindmap(mindmap: Mindmap, file: Option<MindmapFile>, config: EngineConfig) -> Self {
        let saved = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&saved);
        let engine = CanvasEngine::new(&mindmap.data, config)
            .with_save_callback(move |document| *sink.borrow_mut() = Some(document));

        Self {
            engine,
            mindmap,
            file,
            saved,
            edit_buffer: String::new(),
            status_message: "Ready".to_string(),
            show_diagnostics: false,
        }
    }

    /// Persist whatever the engine handed to the save callback
    fn flush_saved(&mut self) {
        let Some(document) = self.saved.borrow_mut().take() else {
            return;
        };
        self.mindmap.replace_data(document);

        let Some(file) = &self.file else {
            self.status_message = "Saved in memory (no file)".to_string();
            return;
        };
        let result = file
            .save(&self.mindmap)
            .and_then(|_| file.append_events(self.engine.events()));
        match result {
            Ok(()) => {
                self.engine.clear_events();
                self.status_message = format!("✓ Saved {}", file.path().display());
            }
            Err(e) => {
                log::error!("Save failed: {:#}", e);
                self.status_message = format!("❌ Save failed: {}", e);
            }
        }
    }

    fn render_ui(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(&self.mindmap.title);
                ui.separator();

                if ui.button("💾 Save").clicked() {
                    self.engine.save_now();
                }
                let can_edit = !self.engine.is_read_only();
                let has_selection = !self.engine.selection().is_empty();
                let delete = egui::Button::new("🗑 Delete");
                if ui.add_enabled(can_edit && has_selection, delete).clicked() {
                    let removed = self.engine.delete_selected();
                    self.status_message = format!("Deleted {} node(s)", removed.len());
                }
                if ui.button("Reset View").clicked() {
                    self.engine.reset_view();
                }

                let mut read_only = self.engine.is_read_only();
                if ui.checkbox(&mut read_only, "Read-only").changed() {
                    self.engine.set_read_only(read_only);
                }
                ui.checkbox(&mut self.show_diagnostics, "Diagnostics");

                ui.separator();
                ui.add_enabled_ui(can_edit, |ui| self.render_palette(ui));
            });
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(&self.status_message);
                ui.separator();
                let graph = self.engine.graph();
                ui.label(format!(
                    "{} nodes, {} edges, {} selected",
                    graph.node_count(),
                    graph.edge_count(),
                    graph.selection().len()
                ));
                let diagnostics = self.engine.diagnostics();
                if !diagnostics.is_empty() {
                    ui.separator();
                    ui.label(format!("⚠ {} load diagnostic(s)", diagnostics.len()));
                }
            });
        });

        if self.show_diagnostics {
            egui::SidePanel::right("diagnostics").show(ctx, |ui| {
                ui.heading("Diagnostics");
                let issues = self
                    .engine
                    .diagnostics()
                    .iter()
                    .chain(self.engine.save_diagnostics().iter());
                for issue in issues {
                    let color = match issue.severity {
                        Severity::Warning => Color32::from_rgb(200, 120, 0),
                        Severity::Info => Color32::GRAY,
                    };
                    ui.colored_label(color, &issue.message);
                }
            });
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(CANVAS_BACKGROUND))
            .show(ctx, |ui| self.render_canvas(ui));
    }

    fn render_palette(&mut self, ui: &mut egui::Ui) {
        for hex in PALETTE {
            let fill = Color32::from_hex(hex).unwrap_or(Color32::WHITE);
            let swatch = egui::Button::new("   ").fill(fill);
            if ui.add(swatch).on_hover_text(hex).clicked() {
                for id in self.engine.graph().selected_ids() {
                    self.engine.recolor(&id, Some(hex.to_string()));
                }
            }
        }
        if ui.button("Clear color").clicked() {
            for id in self.engine.graph().selected_ids() {
                self.engine.recolor(&id, None);
            }
        }
    }

    fn render_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
        let canvas_rect = response.rect;

        self.handle_pointer(ui, &response, canvas_rect);

        let editing = self.engine.edit_focus().is_some();
        if !editing && ui.input(|i| i.key_pressed(egui::Key::Delete)) {
            self.engine.delete_selected();
        }

        for edge in self.engine.graph().edges() {
            self.draw_edge(&painter, canvas_rect, edge);
        }
        for node in self.engine.graph().nodes() {
            self.draw_node(&painter, canvas_rect, node);
        }

        if let Some(id) = self.engine.edit_focus().map(str::to_string) {
            self.draw_inline_editor(ui, canvas_rect, &id);
        }
    }

    /// Translate egui pointer state into engine calls
    fn handle_pointer(&mut self, ui: &egui::Ui, response: &egui::Response, canvas_rect: Rect) {
        let (pressed, released, held, latest) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.primary_down() && i.pointer.delta() != egui::Vec2::ZERO,
                i.pointer.latest_pos(),
            )
        });
        let local = latest.map(|pos| Point::new(pos.x - canvas_rect.left(), pos.y - canvas_rect.top()));

        if response.double_clicked() {
            if let Some(id) = local.and_then(|p| self.node_at(p)) {
                if self.engine.on_double_click(&id) {
                    self.edit_buffer = self
                        .engine
                        .graph()
                        .node(&id)
                        .map(|n| n.text.clone())
                        .unwrap_or_default();
                }
            }
        }

        match local {
            Some(point) if latest.is_some_and(|pos| canvas_rect.contains(pos)) => {
                if pressed && self.engine.edit_focus().is_none() {
                    let target = match self.node_at(point) {
                        Some(id) => PointerTarget::Node(id),
                        None => PointerTarget::Background,
                    };
                    self.engine.on_pointer_down(target, point);
                } else if held {
                    self.engine.on_pointer_move(point);
                }
                if released {
                    self.engine.on_pointer_up();
                }
            }
            _ => self.engine.on_pointer_leave(),
        }
    }

    fn node_at(&self, screen: Point) -> Option<String> {
        let canvas = self.engine.screen_to_canvas(screen);
        self.engine.graph().hit_test(canvas).map(|n| n.id.clone())
    }

    fn draw_edge(&self, painter: &egui::Painter, canvas_rect: Rect, edge: &CanvasEdge) {
        let from = self.to_screen(edge.points[0], canvas_rect);
        let to = self.to_screen(edge.points[1], canvas_rect);
        if from == to {
            return;
        }

        let color = if self.engine.graph().is_edge_highlighted(edge) {
            SELECTION_BLUE
        } else {
            Color32::BLACK
        };
        let stroke = Stroke::new(2.0, color);
        painter.line_segment([from, to], stroke);

        // Arrowhead stops at the target box
        let target_half = self
            .engine
            .graph()
            .node(&edge.target)
            .map(|n| n.style().width.min(n.style().height) * 0.5)
            .unwrap_or(0.0);
        let dir = (to - from).normalized();
        let perpendicular = vec2(-dir.y, dir.x);
        let arrow_size = 10.0;
        let arrow_tip = to - dir * target_half;

        let arrow_point1 = arrow_tip - dir * arrow_size + perpendicular * arrow_size * 0.5;
        let arrow_point2 = arrow_tip - dir * arrow_size - perpendicular * arrow_size * 0.5;

        painter.add(PathShape::convex_polygon(
            vec![arrow_tip, arrow_point1, arrow_point2],
            color,
            stroke,
        ));
    }

    fn draw_node(&self, painter: &egui::Painter, canvas_rect: Rect, node: &CanvasNode) {
        let rect = self.node_screen_rect(node, canvas_rect);
        let fill = node
            .style()
            .background_color
            .as_deref()
            .and_then(|hex| Color32::from_hex(hex).ok())
            .unwrap_or(Color32::WHITE);
        let stroke = if self.engine.graph().is_selected(&node.id) {
            Stroke::new(2.5, SELECTION_BLUE)
        } else {
            Stroke::new(1.0, Color32::BLACK)
        };

        painter.rect(rect, 4.0, fill, stroke);
        if self.engine.edit_focus() != Some(node.id.as_str()) {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                &node.text,
                FontId::proportional(14.0),
                Color32::BLACK,
            );
        }
    }

    fn draw_inline_editor(&mut self, ui: &mut egui::Ui, canvas_rect: Rect, node_id: &str) {
        let Some(node) = self.engine.graph().node(node_id) else {
            return;
        };
        let editor_rect = self.node_screen_rect(node, canvas_rect).shrink(2.0);

        let response = ui.put(
            editor_rect,
            egui::TextEdit::singleline(&mut self.edit_buffer),
        );
        if !response.has_focus() && !response.lost_focus() {
            response.request_focus();
        }

        if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.engine.on_text_cancel();
            self.edit_buffer.clear();
            self.status_message = "Editing cancelled".to_string();
        } else if response.lost_focus() {
            // Enter or clicking away
            let text = std::mem::take(&mut self.edit_buffer);
            self.engine.on_text_commit(text);
        }
    }

    fn to_screen(&self, point: Point, canvas_rect: Rect) -> Pos2 {
        let shifted = self.engine.canvas_to_screen(point);
        canvas_rect.left_top() + vec2(shifted.x, shifted.y)
    }

    fn node_screen_rect(&self, node: &CanvasNode, canvas_rect: Rect) -> Rect {
        let bounds = node.bounds();
        let top_left = self.to_screen(Point::new(bounds.x, bounds.y), canvas_rect);
        Rect::from_min_size(top_left, vec2(bounds.width, bounds.height))
    }
}

impl eframe::App for MindmapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Duration::from_secs_f64(ctx.input(|i| i.time).max(0.0));
        self.engine.tick(now);
        self.render_ui(ctx);
        self.flush_saved();

        if let Some(deadline) = self.engine.next_deadline() {
            ctx.request_repaint_after(deadline.saturating_sub(now));
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.engine.save_now();
        self.flush_saved();
        self.engine.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_colors_parse() {
        for hex in PALETTE {
            assert!(Color32::from_hex(hex).is_ok(), "{}", hex);
        }
    }

    #[test]
    fn test_save_updates_record_without_file() {
        let mut app = MindmapApp::new();
        let root_id = app.engine.graph().nodes()[0].id.clone();
        app.engine.recolor(&root_id, Some("#bbdefb".to_string()));
        assert!(app.engine.save_now());
        app.flush_saved();

        let style = app.mindmap.data.style.as_ref().unwrap();
        assert_eq!(style.background_color.as_deref(), Some("#bbdefb"));
        assert_eq!(app.status_message, "Saved in memory (no file)");
    }
}
