use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A node of the persisted mind-map tree
///
/// This is the storage and transport shape shared with whoever persists the
/// map, so field names and optionality must stay stable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PersistedNode {
    /// May be empty in hand-written documents; a fresh id is assigned on load
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub children: Vec<PersistedNode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<PersistedStyle>,
}

/// Optional visual attributes of a persisted node
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PersistedStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f32>,
}

impl PersistedNode {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            children: Vec::new(),
            style: None,
        }
    }

    /// Append a child (builder style)
    pub fn with_child(mut self, child: PersistedNode) -> Self {
        self.children.push(child);
        self
    }

    /// Pin the node to an explicit canvas position
    pub fn at(mut self, x: f32, y: f32) -> Self {
        let style = self.style.get_or_insert_with(PersistedStyle::default);
        style.x = Some(x);
        style.y = Some(y);
        self
    }

    pub fn sized(mut self, width: f32, height: f32) -> Self {
        let style = self.style.get_or_insert_with(PersistedStyle::default);
        style.width = Some(width);
        style.height = Some(height);
        self
    }

    pub fn colored(mut self, color: impl Into<String>) -> Self {
        self.style
            .get_or_insert_with(PersistedStyle::default)
            .background_color = Some(color.into());
        self
    }

    /// Number of nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(PersistedNode::node_count).sum::<usize>()
    }

    /// Depth-first search for a node by id
    pub fn find(&self, id: &str) -> Option<&PersistedNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

/// A stored mind map together with its metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Mindmap {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub project_id: i64,
    pub data: PersistedNode,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Mindmap {
    pub fn new(id: i64, title: impl Into<String>, project_id: i64, data: PersistedNode) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: title.into(),
            description: None,
            project_id,
            data,
            created_at: now,
            updated_at: now,
        }
    }

    /// Store a freshly saved document and bump the modification time
    pub fn replace_data(&mut self, data: PersistedNode) {
        self.data = data;
        self.updated_at = Utc::now();
    }
}
