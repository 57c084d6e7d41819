//! Conversion between the persisted tree and the flat live graph
//!
//! `flatten` lays a document out on the canvas and produces nodes in
//! pre-order plus one edge per parent/child pair. `unflatten` walks the edges
//! back into a single tree, recovering from graphs that are not trees.

use crate::{
    CanvasEdge, CanvasNode, DiagnosticKind, Diagnostics, IdSource, PersistedNode, PersistedStyle,
    Point, DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH,
};
use std::collections::{HashMap, HashSet};

/// Horizontal pitch between siblings laid out by default
pub const CHILD_SPACING: f32 = 150.0;

/// Vertical distance between a parent and its default-placed children
pub const LEVEL_SPACING: f32 = 150.0;

/// Id of the wrapper emitted when the live graph has several roots
pub const SYNTHETIC_ROOT_ID: &str = "virtual-root";

/// Label of the wrapper emitted when the live graph has several roots
pub const SYNTHETIC_ROOT_TEXT: &str = "Root";

const MAX_ID_ATTEMPTS: usize = 16;

/// Output of [`flatten`]
#[derive(Debug, Clone, Default)]
pub struct FlatGraph {
    /// Pre-order traversal of the document
    pub nodes: Vec<CanvasNode>,
    /// One `parent -> child` edge per link, ordered like the children they reach
    pub edges: Vec<CanvasEdge>,
    pub diagnostics: Diagnostics,
}

/// Output of [`unflatten`]
#[derive(Debug, Clone, Default)]
pub struct Rebuilt {
    /// `None` only when the graph had no nodes at all
    pub document: Option<PersistedNode>,
    pub diagnostics: Diagnostics,
}

/// Lay out a persisted document as a flat graph
///
/// The root sits at its stored position or at the canvas center. Children
/// without a stored position are spread `CHILD_SPACING` apart, centered
/// under their parent and `LEVEL_SPACING` below it.
pub fn flatten(
    document: &PersistedNode,
    canvas_width: f32,
    canvas_height: f32,
    ids: &mut dyn IdSource,
) -> FlatGraph {
    let mut reserved = HashSet::new();
    collect_ids(document, &mut reserved);

    let mut flattener = Flattener {
        ids,
        reserved,
        assigned: HashSet::new(),
        graph: FlatGraph::default(),
    };
    flattener.visit(
        document,
        Point::new(canvas_width / 2.0, canvas_height / 2.0),
        None,
    );
    flattener.graph
}

fn collect_ids(node: &PersistedNode, into: &mut HashSet<String>) {
    if !node.id.is_empty() {
        into.insert(node.id.clone());
    }
    for child in &node.children {
        collect_ids(child, into);
    }
}

struct Flattener<'a> {
    ids: &'a mut dyn IdSource,
    /// Every id spelled out in the document
    reserved: HashSet<String>,
    /// Ids already handed to live nodes
    assigned: HashSet<String>,
    graph: FlatGraph,
}

impl Flattener<'_> {
    fn visit(&mut self, doc: &PersistedNode, default: Point, parent: Option<(&str, Point)>) {
        let style = doc.style.as_ref();
        let position = Point::new(
            style.and_then(|s| s.x).unwrap_or(default.x),
            style.and_then(|s| s.y).unwrap_or(default.y),
        );

        let id = self.resolve_id(doc);
        let node = CanvasNode::new(id.clone(), doc.text.clone(), position)
            .with_size(
                style.and_then(|s| s.width).unwrap_or(DEFAULT_NODE_WIDTH),
                style.and_then(|s| s.height).unwrap_or(DEFAULT_NODE_HEIGHT),
            )
            .with_background(style.and_then(|s| s.background_color.clone()));
        self.graph.nodes.push(node);

        if let Some((parent_id, parent_position)) = parent {
            self.graph
                .edges
                .push(CanvasEdge::new(parent_id, id.clone(), [parent_position, position]));
        }

        let count = doc.children.len();
        if count == 0 {
            return;
        }

        let start_x = position.x - (count - 1) as f32 * CHILD_SPACING / 2.0;
        let child_y = position.y + LEVEL_SPACING;
        for (index, child) in doc.children.iter().enumerate() {
            let child_default = Point::new(start_x + index as f32 * CHILD_SPACING, child_y);
            self.visit(child, child_default, Some((id.as_str(), position)));
        }
    }

    /// First occurrence of an id keeps it; missing and repeated ids get a fresh one
    fn resolve_id(&mut self, doc: &PersistedNode) -> String {
        let id = if doc.id.is_empty() {
            let id = self.fresh_id();
            self.graph.diagnostics.info(
                DiagnosticKind::GeneratedId,
                format!("Node '{}' has no id, assigned {}", doc.text, id),
                vec![id.clone()],
            );
            id
        } else if self.assigned.contains(&doc.id) {
            let id = self.fresh_id();
            self.graph.diagnostics.warn(
                DiagnosticKind::DuplicateId,
                format!("Duplicate node id {}, later occurrence renamed to {}", doc.id, id),
                vec![doc.id.clone(), id.clone()],
            );
            id
        } else {
            doc.id.clone()
        };

        self.assigned.insert(id.clone());
        id
    }

    fn fresh_id(&mut self) -> String {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = self.ids.next_id();
            if self.is_free(&candidate) {
                return candidate;
            }
        }

        // The source keeps colliding; derive a free id from its last answer
        let mut base = self.ids.next_id();
        if base.is_empty() {
            base = "node".to_string();
        }
        let mut suffix = 1u64;
        loop {
            let candidate = format!("{}-{}", base, suffix);
            if self.is_free(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }

    fn is_free(&self, candidate: &str) -> bool {
        !candidate.is_empty() && !self.reserved.contains(candidate) && !self.assigned.contains(candidate)
    }
}

/// Rebuild a single persisted tree from a live graph
///
/// Roots are nodes no edge points at. With no root the first node is forced
/// to be one; with several, they are wrapped under a synthetic root. A node
/// reached a second time is emitted without children, which stops cycles.
pub fn unflatten(nodes: &[CanvasNode], edges: &[CanvasEdge]) -> Rebuilt {
    let mut rebuilder = Rebuilder::new(nodes, edges);
    let document = rebuilder.run(edges);
    Rebuilt {
        document,
        diagnostics: rebuilder.diagnostics,
    }
}

struct Rebuilder<'a> {
    nodes: &'a [CanvasNode],
    by_id: HashMap<&'a str, &'a CanvasNode>,
    children_of: HashMap<&'a str, Vec<&'a str>>,
    visited: HashSet<&'a str>,
    diagnostics: Diagnostics,
}

impl<'a> Rebuilder<'a> {
    fn new(nodes: &'a [CanvasNode], edges: &'a [CanvasEdge]) -> Self {
        let mut by_id = HashMap::with_capacity(nodes.len());
        for node in nodes {
            by_id.entry(node.id.as_str()).or_insert(node);
        }

        let mut children_of: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in edges {
            children_of
                .entry(edge.source.as_str())
                .or_default()
                .push(edge.target.as_str());
        }

        Self {
            nodes,
            by_id,
            children_of,
            visited: HashSet::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    fn run(&mut self, edges: &'a [CanvasEdge]) -> Option<PersistedNode> {
        let nodes = self.nodes;
        let targets: HashSet<&str> = edges.iter().map(|e| e.target.as_str()).collect();
        let roots: Vec<&'a CanvasNode> = nodes
            .iter()
            .filter(|n| !targets.contains(n.id.as_str()))
            .collect();

        match roots.as_slice() {
            [] => {
                let forced = nodes.first()?;
                self.diagnostics.warn(
                    DiagnosticKind::ForcedRoot,
                    format!("No root node found, using first node {} as root", forced.id),
                    vec![forced.id.clone()],
                );
                Some(self.persist(forced))
            }
            [root] => Some(self.persist(*root)),
            many => {
                self.diagnostics.info(
                    DiagnosticKind::SyntheticRoot,
                    format!("{} root nodes found, wrapping them under {}", many.len(), SYNTHETIC_ROOT_ID),
                    many.iter().map(|n| n.id.clone()).collect(),
                );
                let children = many.iter().map(|root| self.persist(*root)).collect();
                Some(PersistedNode {
                    id: SYNTHETIC_ROOT_ID.to_string(),
                    text: SYNTHETIC_ROOT_TEXT.to_string(),
                    children,
                    style: None,
                })
            }
        }
    }

    fn persist(&mut self, node: &'a CanvasNode) -> PersistedNode {
        PersistedNode {
            id: node.id.clone(),
            text: node.text.clone(),
            children: self.find_children(node.id.as_str()),
            style: Some(persisted_style(node)),
        }
    }

    fn find_children(&mut self, id: &'a str) -> Vec<PersistedNode> {
        if !self.visited.insert(id) {
            self.diagnostics.warn(
                DiagnosticKind::CycleTruncated,
                format!("Node {} reached more than once, not expanding it again", id),
                vec![id.to_string()],
            );
            return Vec::new();
        }

        let targets = match self.children_of.get(id) {
            Some(targets) => targets.clone(),
            None => return Vec::new(),
        };

        let mut children = Vec::with_capacity(targets.len());
        for target in targets {
            match self.by_id.get(target).copied() {
                Some(child) => children.push(self.persist(child)),
                None => self.diagnostics.warn(
                    DiagnosticKind::DanglingEdge,
                    format!("Edge {} -> {} points at a missing node", id, target),
                    vec![id.to_string(), target.to_string()],
                ),
            }
        }
        children
    }
}

fn persisted_style(node: &CanvasNode) -> PersistedStyle {
    let style = node.style();
    PersistedStyle {
        width: Some(style.width),
        height: Some(style.height),
        background_color: style.background_color.clone(),
        x: Some(node.x()),
        y: Some(node.y()),
    }
}
