use crate::SaveTrigger;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An engine event with timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEvent {
    pub timestamp: DateTime<Utc>,
    pub event: EventType,
}

impl GraphEvent {
    /// Create a new event with the current timestamp
    pub fn new(event: EventType) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Things the engine did to the live graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventType {
    DocumentLoaded {
        root_id: String,
        node_count: usize,
        edge_count: usize,
    },

    /// Recorded once per drag gesture that actually moved
    NodesMoved {
        ids: Vec<String>,
    },

    TextChanged {
        id: String,
        text: String,
    },

    NodeRecolored {
        id: String,
        color: Option<String>,
    },

    SelectionChanged {
        selected: Vec<String>,
    },

    NodesDeleted {
        ids: Vec<String>,
    },

    EditStarted {
        id: String,
    },

    EditCancelled {
        id: String,
    },

    Saved {
        triggers: Vec<SaveTrigger>,
        root_id: String,
    },

    TornDown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_creation() {
        let event = GraphEvent::new(EventType::EditStarted { id: "a".to_string() });
        assert!(event.timestamp <= Utc::now());
    }

    #[test]
    fn test_event_serialization() {
        let event = GraphEvent::new(EventType::Saved {
            triggers: vec![SaveTrigger::Debounced],
            root_id: "root".to_string(),
        });

        let json = serde_json::to_string(&event).unwrap();
        let deserialized: GraphEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized.event, event.event);
    }
}
