//! Core data types and structures for the network map tool.
//!
//! This module defines the fundamental data structures used throughout the
//! application: nodes, edges, and the `NetworkMap` store that owns them and
//! enforces the structural invariants (no self-loops, at most one edge per
//! unordered node pair, cascading deletes).

use egui::Color32;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for map nodes.
pub type NodeId = Uuid;

/// Unique identifier for edges between nodes.
pub type EdgeId = Uuid;

/// A single node placed on the map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapNode {
    /// Unique identifier for this node
    pub id: NodeId,
    /// Position in world coordinates as (x, y)
    pub position: (f32, f32),
    /// User-displayable label of the node
    pub label: String,
    /// Fill color used when drawing the node
    pub color: Color32,
    /// Radius of the node in world units (always positive)
    pub size: f32,
}

impl MapNode {
    /// Creates a new node with a fresh unique id and default styling.
    ///
    /// # Arguments
    ///
    /// * `label` - The display label for the node
    /// * `position` - The (x, y) position in world coordinates
    pub fn new(label: String, position: (f32, f32)) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            label,
            color: crate::constants::DEFAULT_NODE_COLOR,
            size: crate::constants::DEFAULT_NODE_SIZE,
        }
    }
}

/// An undirected edge between two distinct nodes.
///
/// `source` and `target` carry no direction meaning; they are simply the two
/// endpoints in the order the edge was drawn. The edge's weight is never
/// stored here: it is derived from the endpoint positions on demand (see
/// [`crate::routing::edge_weight`]), so moving a node changes the cost of
/// every incident edge with no explicit update step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapEdge {
    /// Unique identifier for this edge
    pub id: EdgeId,
    /// One endpoint of the edge
    pub source: NodeId,
    /// The other endpoint of the edge
    pub target: NodeId,
    /// Stroke color used when drawing the edge
    pub color: Color32,
    /// Stroke width in world units
    pub width: f32,
}

impl MapEdge {
    /// Creates a new edge between two nodes with default styling.
    pub fn new(source: NodeId, target: NodeId) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            target,
            color: crate::constants::DEFAULT_EDGE_COLOR,
            width: crate::constants::DEFAULT_EDGE_WIDTH,
        }
    }

    /// Returns true if the given node is one of this edge's endpoints.
    pub fn touches(&self, node_id: NodeId) -> bool {
        self.source == node_id || self.target == node_id
    }

    /// Returns true if this edge connects the given unordered pair of nodes.
    pub fn connects(&self, a: NodeId, b: NodeId) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

/// A patch of optional node property changes applied by [`NetworkMap::update_node`].
#[derive(Debug, Clone, Default)]
pub struct NodePatch {
    /// New label, if changing
    pub label: Option<String>,
    /// New fill color, if changing
    pub color: Option<Color32>,
    /// New radius in world units, if changing
    pub size: Option<f32>,
}

/// The map document: all nodes and edges.
///
/// Nodes are kept in insertion order because that order doubles as the
/// z-order for rendering and hit-testing: later nodes draw on top and win
/// hit-tests when overlapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkMap {
    /// All nodes, in insertion (z) order
    pub nodes: Vec<MapNode>,
    /// All edges between nodes
    pub edges: Vec<MapEdge>,
}

impl NetworkMap {
    /// Creates a new empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize the map to a pretty-printed JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a map from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Adds a node to the map.
    ///
    /// # Returns
    ///
    /// The id of the newly added node.
    pub fn add_node(&mut self, node: MapNode) -> NodeId {
        let id = node.id;
        self.nodes.push(node);
        id
    }

    /// Looks up a node by id.
    pub fn node(&self, id: NodeId) -> Option<&MapNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Looks up a node by id for mutation.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut MapNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Looks up an edge by id.
    pub fn edge(&self, id: EdgeId) -> Option<&MapEdge> {
        self.edges.iter().find(|e| e.id == id)
    }

    /// Looks up an edge by id for mutation.
    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut MapEdge> {
        self.edges.iter_mut().find(|e| e.id == id)
    }

    /// Returns true if an edge already connects the unordered pair (a, b).
    pub fn has_edge_between(&self, a: NodeId, b: NodeId) -> bool {
        self.edges.iter().any(|e| e.connects(a, b))
    }

    /// Adds an undirected edge between two existing nodes.
    ///
    /// Fails silently (returns `None`) for a self-loop, for an unknown
    /// endpoint, or when an edge already connects the pair in either order.
    ///
    /// # Returns
    ///
    /// The id of the newly created edge, or `None` if the edge was rejected.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> Option<EdgeId> {
        if source == target {
            return None;
        }
        if self.node(source).is_none() || self.node(target).is_none() {
            return None;
        }
        if self.has_edge_between(source, target) {
            return None;
        }

        let edge = MapEdge::new(source, target);
        let id = edge.id;
        self.edges.push(edge);
        Some(id)
    }

    /// Removes a node and every edge incident to it.
    ///
    /// # Returns
    ///
    /// `true` if the node was found and removed, `false` otherwise.
    pub fn remove_node(&mut self, node_id: NodeId) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != node_id);
        let removed = self.nodes.len() != before;
        if removed {
            self.edges.retain(|e| !e.touches(node_id));
        }
        removed
    }

    /// Removes a single edge, leaving its endpoint nodes untouched.
    ///
    /// # Returns
    ///
    /// `true` if the edge was found and removed, `false` otherwise.
    pub fn remove_edge(&mut self, edge_id: EdgeId) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| e.id != edge_id);
        self.edges.len() != before
    }

    /// Applies label/color/size changes to a node.
    ///
    /// Unset patch fields leave the corresponding property unchanged. A
    /// non-positive size in the patch is ignored.
    ///
    /// # Returns
    ///
    /// `true` if the node was found and the patch applied, `false` otherwise.
    pub fn update_node(&mut self, id: NodeId, patch: NodePatch) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        if let Some(label) = patch.label {
            node.label = label;
        }
        if let Some(color) = patch.color {
            node.color = color;
        }
        if let Some(size) = patch.size {
            if size > 0.0 {
                node.size = size;
            }
        }
        true
    }

    /// Empties the map of all nodes and edges.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }
}
