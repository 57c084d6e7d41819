use crate::Point;
use serde::{Deserialize, Serialize};

/// Parent/child link between two live nodes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanvasEdge {
    /// Parent node id
    pub source: String,

    /// Child node id
    pub target: String,

    /// Cached endpoint positions for rendering, `[source, target]`
    pub points: [Point; 2],
}

impl CanvasEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, points: [Point; 2]) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            points,
        }
    }

    /// Check if this edge touches a given node
    pub fn involves(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }

    pub fn starts_from(&self, node_id: &str) -> bool {
        self.source == node_id
    }

    pub fn ends_at(&self, node_id: &str) -> bool {
        self.target == node_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_involves() {
        let edge = CanvasEdge::new("a", "b", [Point::ZERO, Point::new(1.0, 1.0)]);

        assert!(edge.involves("a"));
        assert!(edge.involves("b"));
        assert!(!edge.involves("c"));
    }

    #[test]
    fn test_edge_direction() {
        let edge = CanvasEdge::new("a", "b", [Point::ZERO, Point::ZERO]);

        assert!(edge.starts_from("a"));
        assert!(!edge.starts_from("b"));
        assert!(edge.ends_at("b"));
        assert!(!edge.ends_at("a"));
    }
}
