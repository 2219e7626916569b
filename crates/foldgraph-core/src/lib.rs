use serde::{Deserialize, Serialize};
use std::fmt;

pub mod color;
pub mod error;
pub mod geometry;

pub use color::Color;
pub use error::FoldError;
pub use geometry::{Rect, Vec2};

/// Arbitrary key-value payload carried by nodes and edges.
pub type ElementData = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub i64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub i64);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Expand/collapse state of a node. Nodes that were never touched are `Expanded`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollapseState {
    #[default]
    Expanded,
    Collapsed,
}

impl fmt::Display for CollapseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expanded => write!(f, "expanded"),
            Self::Collapsed => write!(f, "collapsed"),
        }
    }
}

fn default_node_size() -> Vec2 {
    Vec2::new(40.0, 40.0)
}

/// A graph vertex. `position` is the model-space center, `size` the outer width/height.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub parent: Option<NodeId>,
    #[serde(default)]
    pub position: Vec2,
    #[serde(default = "default_node_size")]
    pub size: Vec2,
    #[serde(default)]
    pub data: ElementData,
}

impl Node {
    pub fn new(id: NodeId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            parent: None,
            position: Vec2::default(),
            size: default_node_size(),
            data: ElementData::new(),
        }
    }

    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    /// Model-space bounding box around `position`.
    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.position, self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub data: ElementData,
}

impl Edge {
    pub fn new(id: EdgeId, source: NodeId, target: NodeId) -> Self {
        Self {
            id,
            source,
            target,
            data: ElementData::new(),
        }
    }
}
