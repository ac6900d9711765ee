//! Builds the downloadable network-data document.
//!
//! The export shape is consumed by external tooling:
//! `{nodes: [{id, label, x, y, color, size, isMarked}],
//!   edges: [{id, source, target, color, width, weight}]}`.
//! Edge weights are evaluated at export time from current node positions so
//! the document always matches a live re-derivation, never a cached value.

use crate::routing;
use crate::types::{EdgeId, NetworkMap, NodeId};
use egui::Color32;
use serde::Serialize;
use std::collections::HashSet;

/// A node entry in the export document.
#[derive(Debug, Clone, Serialize)]
pub struct ExportNode {
    /// Node id
    pub id: NodeId,
    /// Display label
    pub label: String,
    /// World x coordinate
    pub x: f32,
    /// World y coordinate
    pub y: f32,
    /// Fill color as a `#rrggbb` hex string
    pub color: String,
    /// Radius in world units
    pub size: f32,
    /// Whether the node is currently marked
    #[serde(rename = "isMarked")]
    pub is_marked: bool,
}

/// An edge entry in the export document, including its live weight.
#[derive(Debug, Clone, Serialize)]
pub struct ExportEdge {
    /// Edge id
    pub id: EdgeId,
    /// One endpoint node id
    pub source: NodeId,
    /// The other endpoint node id
    pub target: NodeId,
    /// Stroke color as a `#rrggbb` hex string
    pub color: String,
    /// Stroke width in world units
    pub width: f32,
    /// Euclidean distance between the endpoints at export time
    pub weight: f32,
}

/// The complete export document.
#[derive(Debug, Clone, Serialize)]
pub struct ExportDocument {
    /// All nodes with their mark state
    pub nodes: Vec<ExportNode>,
    /// All edges with their live weights
    pub edges: Vec<ExportEdge>,
}

/// Formats a color as a `#rrggbb` hex string (alpha is dropped).
pub fn color_hex(color: Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

/// Builds the export document from the map and the current mark set.
pub fn export_document(map: &NetworkMap, marked: &HashSet<NodeId>) -> ExportDocument {
    let nodes = map
        .nodes
        .iter()
        .map(|node| ExportNode {
            id: node.id,
            label: node.label.clone(),
            x: node.position.0,
            y: node.position.1,
            color: color_hex(node.color),
            size: node.size,
            is_marked: marked.contains(&node.id),
        })
        .collect();

    let edges = map
        .edges
        .iter()
        .map(|edge| ExportEdge {
            id: edge.id,
            source: edge.source,
            target: edge.target,
            color: color_hex(edge.color),
            width: edge.width,
            weight: routing::edge_weight(map, edge).unwrap_or(0.0),
        })
        .collect();

    ExportDocument { nodes, edges }
}

/// Serializes the export document for the map to pretty-printed JSON.
pub fn export_json(map: &NetworkMap, marked: &HashSet<NodeId>) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&export_document(map, marked))
}
