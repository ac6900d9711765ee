//! # Netmap Tool
//!
//! An interactive editor for spatial network maps: nodes placed on a
//! pannable, zoomable canvas, connected by undirected edges whose weights
//! are the Euclidean distances between their endpoints.
//!
//! ## Features
//! - Interactive node creation, selection, and repositioning
//! - Undirected edges with live distance weights
//! - Dijkstra shortest-path search with an on-canvas route overlay
//! - Node marking independent of selection
//! - Canvas panning and cursor-anchored zooming
//! - Export of the weighted graph as JSON

#![warn(missing_docs)]
#![deny(unsafe_code)]

mod constants;
mod export;
mod routing;
mod types;
mod ui;

// Re-export public types and functions
pub use export::{export_document, export_json, ExportDocument, ExportEdge, ExportNode};
pub use routing::{edge_weight, route_weight, shortest_path, RouteError, RouteHop};
pub use types::*;
pub use ui::{CanvasState, InteractionState, MapApp, Tool};

/// Runs the map application with default settings.
///
/// This function initializes the egui application window and starts the
/// main event loop, restoring the previous session's state when available.
///
/// # Returns
///
/// Returns `Ok(())` if the application runs successfully, or an
/// `eframe::Error` if initialization fails.
///
/// # Example
///
/// ```no_run
/// use netmap_tool::run_app;
///
/// fn main() -> Result<(), eframe::Error> {
///     run_app()
/// }
/// ```
pub fn run_app() -> Result<(), eframe::Error> {
    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Netmap Tool",
        options,
        Box::new(|cc| {
            let app = cc
                .storage
                .and_then(|storage| storage.get_string("app_state"))
                .and_then(|json| MapApp::from_json(&json).ok())
                .unwrap_or_default();
            Ok(Box::new(app))
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_default() {
        let map = NetworkMap::default();
        assert!(map.nodes.is_empty());
        assert!(map.edges.is_empty());
    }

    #[test]
    fn test_node_defaults() {
        let node = MapNode::new("Node 1".into(), (10.0, 20.0));
        assert_eq!(node.label, "Node 1");
        assert_eq!(node.size, crate::constants::DEFAULT_NODE_SIZE);
        assert_eq!(node.color, crate::constants::DEFAULT_NODE_COLOR);
    }
}
