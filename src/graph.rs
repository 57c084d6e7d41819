use crate::{CanvasEdge, CanvasNode, FlatGraph, Point};
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};

/// The live, editable mind map
///
/// Owns nodes, edges, the selection set and the edit focus. All mutation goes
/// through the methods below so that ids stay unique, every node's style
/// mirrors its position, and edge `points` track their endpoints.
#[derive(Debug, Clone, Default)]
pub struct LiveGraph {
    /// Nodes in document pre-order
    nodes: Vec<CanvasNode>,

    /// Node id -> index into `nodes`
    index: HashMap<String, usize>,

    edges: Vec<CanvasEdge>,

    selection: HashSet<String>,

    /// Node currently accepting inline text edits
    edit_focus: Option<String>,
}

impl LiveGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from converter output
    ///
    /// Nodes reusing an id already taken are dropped (first wins).
    pub fn from_parts(nodes: Vec<CanvasNode>, edges: Vec<CanvasEdge>) -> Self {
        let mut graph = Self::new();
        for node in nodes {
            if graph.index.contains_key(&node.id) {
                log::warn!("Dropping node with duplicate id {}", node.id);
                continue;
            }
            graph.index.insert(node.id.clone(), graph.nodes.len());
            graph.nodes.push(node);
        }
        graph.edges = edges;
        graph.recompute_edges();
        graph
    }

    pub fn from_flat(flat: FlatGraph) -> Self {
        Self::from_parts(flat.nodes, flat.edges)
    }

    // ========== Queries ==========

    pub fn nodes(&self) -> &[CanvasNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[CanvasEdge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&CanvasNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Position of a node, or the origin for an unknown id
    pub fn position_of(&self, id: &str) -> Point {
        self.node(id).map(CanvasNode::position).unwrap_or(Point::ZERO)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Topmost node whose box contains a canvas point
    pub fn hit_test(&self, point: Point) -> Option<&CanvasNode> {
        self.nodes
            .iter()
            .rev()
            .find(|node| node.bounds().contains_point(point))
    }

    /// An edge is highlighted when both of its endpoints are selected
    pub fn is_edge_highlighted(&self, edge: &CanvasEdge) -> bool {
        self.selection.contains(&edge.source) && self.selection.contains(&edge.target)
    }

    // ========== Node commands ==========

    /// Move several nodes, then refresh edges once
    ///
    /// Unknown ids are skipped. Returns how many nodes moved.
    pub fn move_nodes(&mut self, moves: &[(String, Point)]) -> usize {
        let mut moved = 0;
        for (id, position) in moves {
            match self.index.get(id) {
                Some(&i) => {
                    self.nodes[i].set_position(*position);
                    moved += 1;
                }
                None => log::debug!("Ignoring move of unknown node {}", id),
            }
        }
        if moved > 0 {
            self.recompute_edges();
        }
        moved
    }

    pub fn move_node(&mut self, id: &str, position: Point) -> Result<()> {
        if !self.contains(id) {
            return Err(anyhow!("Node not found: {}", id));
        }
        self.move_nodes(&[(id.to_string(), position)]);
        Ok(())
    }

    pub fn set_text(&mut self, id: &str, text: impl Into<String>) -> Result<()> {
        self.node_mut(id)?.set_text(text);
        Ok(())
    }

    pub fn set_background(&mut self, id: &str, color: Option<String>) -> Result<()> {
        self.node_mut(id)?.set_background(color);
        Ok(())
    }

    /// Remove every selected node and the edges touching them
    ///
    /// Returns the removed ids in node order.
    pub fn delete_selected(&mut self) -> Vec<String> {
        if self.selection.is_empty() {
            return Vec::new();
        }

        let selection = std::mem::take(&mut self.selection);
        let mut removed = Vec::new();
        self.nodes.retain(|node| {
            let keep = !selection.contains(&node.id);
            if !keep {
                removed.push(node.id.clone());
            }
            keep
        });
        self.edges
            .retain(|edge| !selection.contains(&edge.source) && !selection.contains(&edge.target));

        if self
            .edit_focus
            .as_ref()
            .is_some_and(|focus| selection.contains(focus))
        {
            self.edit_focus = None;
        }

        self.rebuild_index();
        self.recompute_edges();
        removed
    }

    /// Refresh every edge's cached endpoints from current node positions
    pub fn recompute_edges(&mut self) {
        for i in 0..self.edges.len() {
            let source = self.position_of(&self.edges[i].source);
            let target = self.position_of(&self.edges[i].target);
            self.edges[i].points = [source, target];
        }
    }

    fn node_mut(&mut self, id: &str) -> Result<&mut CanvasNode> {
        let i = *self
            .index
            .get(id)
            .ok_or_else(|| anyhow!("Node not found: {}", id))?;
        Ok(&mut self.nodes[i])
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.clone(), i))
            .collect();
    }

    // ========== Selection ==========

    pub fn selection(&self) -> &HashSet<String> {
        &self.selection
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id)
    }

    /// Add the node if absent, remove it if present; returns membership afterwards
    pub fn toggle_selected(&mut self, id: &str) -> Result<bool> {
        if !self.contains(id) {
            return Err(anyhow!("Node not found: {}", id));
        }
        if self.selection.remove(id) {
            Ok(false)
        } else {
            self.selection.insert(id.to_string());
            Ok(true)
        }
    }

    /// Returns whether anything was selected before
    pub fn clear_selection(&mut self) -> bool {
        let had_any = !self.selection.is_empty();
        self.selection.clear();
        had_any
    }

    /// Selected ids in node order
    pub fn selected_ids(&self) -> Vec<String> {
        self.nodes
            .iter()
            .filter(|n| self.selection.contains(&n.id))
            .map(|n| n.id.clone())
            .collect()
    }

    // ========== Edit focus ==========

    pub fn edit_focus(&self) -> Option<&str> {
        self.edit_focus.as_deref()
    }

    /// Focus a node for text editing, replacing any previous focus
    pub fn begin_edit(&mut self, id: &str) -> Result<()> {
        if !self.contains(id) {
            return Err(anyhow!("Node not found: {}", id));
        }
        self.edit_focus = Some(id.to_string());
        Ok(())
    }

    pub fn end_edit(&mut self) -> Option<String> {
        self.edit_focus.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> LiveGraph {
        LiveGraph::from_parts(
            vec![
                CanvasNode::new("a", "A", Point::new(0.0, 0.0)),
                CanvasNode::new("b", "B", Point::new(0.0, 150.0)),
                CanvasNode::new("c", "C", Point::new(150.0, 150.0)),
            ],
            vec![
                CanvasEdge::new("a", "b", [Point::ZERO; 2]),
                CanvasEdge::new("a", "c", [Point::ZERO; 2]),
            ],
        )
    }

    #[test]
    fn test_from_parts_refreshes_edges() {
        let graph = chain();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.edges()[0].points, [Point::new(0.0, 0.0), Point::new(0.0, 150.0)]);
        assert_eq!(graph.edges()[1].points, [Point::new(0.0, 0.0), Point::new(150.0, 150.0)]);
    }

    #[test]
    fn test_from_parts_drops_duplicate_ids() {
        let graph = LiveGraph::from_parts(
            vec![
                CanvasNode::new("a", "First", Point::ZERO),
                CanvasNode::new("a", "Second", Point::ZERO),
            ],
            vec![],
        );

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.node("a").unwrap().text, "First");
    }

    #[test]
    fn test_move_node_updates_edges() {
        let mut graph = chain();
        graph.move_node("a", Point::new(50.0, 50.0)).unwrap();

        let node = graph.node("a").unwrap();
        assert_eq!(node.style().x(), 50.0);
        assert_eq!(node.style().y(), 50.0);
        for edge in graph.edges() {
            assert_eq!(edge.points[0], Point::new(50.0, 50.0));
        }
    }

    #[test]
    fn test_move_unknown_node() {
        let mut graph = chain();
        assert!(graph.move_node("ghost", Point::ZERO).is_err());
        assert_eq!(graph.move_nodes(&[("ghost".to_string(), Point::ZERO)]), 0);
    }

    #[test]
    fn test_position_of_unknown_is_origin() {
        let graph = chain();
        assert_eq!(graph.position_of("ghost"), Point::ZERO);
    }

    #[test]
    fn test_stale_edge_endpoint_defaults_to_origin() {
        let graph = LiveGraph::from_parts(
            vec![CanvasNode::new("a", "A", Point::new(10.0, 10.0))],
            vec![CanvasEdge::new("a", "gone", [Point::new(1.0, 1.0); 2])],
        );

        assert_eq!(graph.edges()[0].points, [Point::new(10.0, 10.0), Point::ZERO]);
    }

    #[test]
    fn test_text_and_background() {
        let mut graph = chain();
        graph.set_text("b", "Renamed").unwrap();
        graph.set_background("b", Some("#00ff00".to_string())).unwrap();

        let node = graph.node("b").unwrap();
        assert_eq!(node.text, "Renamed");
        assert_eq!(node.style().background_color.as_deref(), Some("#00ff00"));
        assert_eq!(node.position(), Point::new(0.0, 150.0));
        assert!(graph.set_text("ghost", "x").is_err());
    }

    #[test]
    fn test_toggle_selection() {
        let mut graph = chain();

        assert!(graph.toggle_selected("a").unwrap());
        assert!(graph.toggle_selected("b").unwrap());
        assert_eq!(graph.selected_ids(), vec!["a".to_string(), "b".to_string()]);

        assert!(!graph.toggle_selected("a").unwrap());
        assert_eq!(graph.selected_ids(), vec!["b".to_string()]);

        assert!(graph.clear_selection());
        assert!(!graph.clear_selection());
        assert!(graph.toggle_selected("ghost").is_err());
    }

    #[test]
    fn test_edge_highlight() {
        let mut graph = chain();
        graph.toggle_selected("a").unwrap();
        assert!(!graph.is_edge_highlighted(&graph.edges()[0]));

        graph.toggle_selected("b").unwrap();
        assert!(graph.is_edge_highlighted(&graph.edges()[0]));
        assert!(!graph.is_edge_highlighted(&graph.edges()[1]));
    }

    #[test]
    fn test_edit_focus_is_exclusive() {
        let mut graph = chain();
        graph.begin_edit("a").unwrap();
        graph.begin_edit("b").unwrap();

        assert_eq!(graph.edit_focus(), Some("b"));
        assert_eq!(graph.end_edit(), Some("b".to_string()));
        assert_eq!(graph.edit_focus(), None);
    }

    #[test]
    fn test_delete_selected() {
        let mut graph = chain();
        graph.toggle_selected("b").unwrap();
        graph.begin_edit("b").unwrap();

        let removed = graph.delete_selected();

        assert_eq!(removed, vec!["b".to_string()]);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges()[0].target, "c");
        assert!(graph.selection().is_empty());
        assert_eq!(graph.edit_focus(), None);
        assert_eq!(graph.node("c").unwrap().id, "c");
    }

    #[test]
    fn test_hit_test() {
        let graph = chain();

        assert_eq!(graph.hit_test(Point::new(10.0, 5.0)).map(|n| n.id.as_str()), Some("a"));
        assert_eq!(graph.hit_test(Point::new(150.0, 160.0)).map(|n| n.id.as_str()), Some("c"));
        assert!(graph.hit_test(Point::new(400.0, 400.0)).is_none());
    }
}
