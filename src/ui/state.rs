//! Application state management structures.
//!
//! This module contains the state structures that track the application's
//! current UI state: canvas navigation (the viewport transform), selection
//! and marking, the active tool, context menus, and file operations.

use crate::routing::RouteHop;
use crate::types::*;
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::mpsc::{channel, Receiver, Sender};

/// The currently active canvas tool.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Tool {
    /// Select, drag nodes, and pan the canvas
    Select,
    /// Click on empty canvas to place a new node
    AddNode,
    /// Two-click gesture: first click picks the start node, a second click
    /// on a different node commits the edge
    AddEdge,
}

/// State related to canvas navigation and display: the viewport transform.
///
/// `offset` and `zoom_factor` define the affine mapping between world
/// coordinates (where node positions live) and screen pixels. The mapping
/// methods are pure so the transform is testable without a UI context.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasState {
    /// Current canvas pan offset for navigation (in screen space)
    #[serde(skip)]
    pub offset: egui::Vec2,
    /// Current zoom level (1.0 = normal, 2.0 = 2x zoom, 0.5 = 50% zoom)
    pub zoom_factor: f32,
    /// Whether the grid should be displayed on the canvas
    pub show_grid: bool,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            offset: egui::Vec2::ZERO,
            zoom_factor: 1.0,
            show_grid: true,
        }
    }
}

impl CanvasState {
    /// Converts screen coordinates to world coordinates accounting for zoom and pan.
    pub fn screen_to_world(&self, screen_pos: egui::Pos2) -> egui::Pos2 {
        (screen_pos - self.offset) / self.zoom_factor
    }

    /// Converts world coordinates to screen coordinates accounting for zoom and pan.
    pub fn world_to_screen(&self, world_pos: egui::Pos2) -> egui::Pos2 {
        world_pos * self.zoom_factor + self.offset
    }

    /// Sets the zoom factor, keeping the world point under `anchor` fixed on
    /// screen.
    ///
    /// The new factor is clamped to the allowed zoom range before the offset
    /// is recomputed, so the anchor invariant holds for the applied value.
    pub fn set_zoom(&mut self, new_zoom: f32, anchor: egui::Pos2) {
        let new_zoom = new_zoom.clamp(crate::constants::MIN_ZOOM, crate::constants::MAX_ZOOM);

        let anchor_world = (anchor.to_vec2() - self.offset) / self.zoom_factor;
        self.offset -= anchor_world * (new_zoom - self.zoom_factor);
        self.zoom_factor = new_zoom;
    }

    /// Zooms in by the fixed button factor, anchored at `center`.
    pub fn zoom_in(&mut self, center: egui::Pos2) {
        self.set_zoom(
            self.zoom_factor * crate::constants::BUTTON_ZOOM_FACTOR,
            center,
        );
    }

    /// Zooms out by the fixed button factor, anchored at `center`.
    pub fn zoom_out(&mut self, center: egui::Pos2) {
        self.set_zoom(
            self.zoom_factor / crate::constants::BUTTON_ZOOM_FACTOR,
            center,
        );
    }

    /// Pans by a screen-pixel delta. Pixels map 1:1 to translation, with no
    /// scale factor involved.
    pub fn pan_by(&mut self, delta: egui::Vec2) {
        self.offset += delta;
    }
}

/// State related to user interactions: selection, marks, the current route,
/// and in-flight gestures.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionState {
    /// Currently selected node id, if any (single selection)
    #[serde(skip)]
    pub selected_node: Option<NodeId>,
    /// Currently selected edge id, if any
    #[serde(skip)]
    pub selected_edge: Option<EdgeId>,
    /// Marked nodes (toggle membership, independent of selection)
    #[serde(skip)]
    pub marked_nodes: HashSet<NodeId>,
    /// The most recently computed route, until explicitly cleared
    #[serde(skip)]
    pub route: Option<Vec<RouteHop>>,
    /// Source node chosen in the route panel
    #[serde(skip)]
    pub route_source: Option<NodeId>,
    /// Destination node chosen in the route panel
    #[serde(skip)]
    pub route_dest: Option<NodeId>,
    /// Status line shown under the route controls
    #[serde(skip)]
    pub route_status: Option<String>,
    /// Node currently being dragged by the user
    #[serde(skip)]
    pub dragging_node: Option<NodeId>,
    /// Offset from mouse to node center during dragging (world units)
    #[serde(skip)]
    pub node_drag_offset: egui::Vec2,
    /// Whether the user is currently panning the canvas
    #[serde(skip)]
    pub is_panning: bool,
    /// Last mouse position during panning operation
    #[serde(skip)]
    pub last_pan_pos: Option<egui::Pos2>,
    /// First endpoint picked by the two-click edge gesture
    #[serde(skip)]
    pub edge_start_node: Option<NodeId>,
    /// Temporary storage for the node label while editing
    #[serde(skip)]
    pub temp_node_label: String,
    /// Which node's label is loaded in `temp_node_label`
    #[serde(skip)]
    pub temp_label_node_id: Option<NodeId>,
}

impl Default for InteractionState {
    fn default() -> Self {
        Self {
            selected_node: None,
            selected_edge: None,
            marked_nodes: HashSet::new(),
            route: None,
            route_source: None,
            route_dest: None,
            route_status: None,
            dragging_node: None,
            node_drag_offset: egui::Vec2::ZERO,
            is_panning: false,
            last_pan_pos: None,
            edge_start_node: None,
            temp_node_label: String::new(),
            temp_label_node_id: None,
        }
    }
}

impl InteractionState {
    /// Selects a node, clearing any selected edge.
    pub fn select(&mut self, node_id: NodeId) {
        self.selected_node = Some(node_id);
        self.selected_edge = None;
    }

    /// Clears node and edge selection.
    pub fn clear_selection(&mut self) {
        self.selected_node = None;
        self.selected_edge = None;
    }

    /// Toggles a node's membership in the marked set.
    pub fn toggle_mark(&mut self, node_id: NodeId) {
        if !self.marked_nodes.remove(&node_id) {
            self.marked_nodes.insert(node_id);
        }
    }

    /// Drops the stored route result and its status line.
    pub fn clear_route(&mut self) {
        self.route = None;
        self.route_status = None;
    }

    /// Removes every reference to a node that is about to be deleted, so no
    /// dangling id survives in selection, marks, gesture state, or the
    /// route-panel endpoints. The stored route itself is left alone: it is a
    /// snapshot that stays visible until explicitly cleared.
    pub fn forget_node(&mut self, node_id: NodeId) {
        if self.selected_node == Some(node_id) {
            self.selected_node = None;
        }
        self.marked_nodes.remove(&node_id);
        if self.dragging_node == Some(node_id) {
            self.dragging_node = None;
        }
        if self.edge_start_node == Some(node_id) {
            self.edge_start_node = None;
        }
        if self.route_source == Some(node_id) {
            self.route_source = None;
        }
        if self.route_dest == Some(node_id) {
            self.route_dest = None;
        }
        if self.temp_label_node_id == Some(node_id) {
            self.temp_label_node_id = None;
            self.temp_node_label.clear();
        }
    }
}

/// State related to the right-click context menu on a node.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct ContextMenuState {
    /// Whether the context menu is currently visible
    #[serde(skip)]
    pub show: bool,
    /// Screen position where the context menu should appear
    #[serde(skip)]
    pub screen_pos: (f32, f32),
    /// The node the menu was opened on
    #[serde(skip)]
    pub node: Option<NodeId>,
    /// Flag to prevent the menu from closing immediately after opening
    #[serde(skip)]
    pub just_opened: bool,
}

impl Default for ContextMenuState {
    fn default() -> Self {
        Self {
            show: false,
            screen_pos: (0.0, 0.0),
            node: None,
            just_opened: false,
        }
    }
}

/// State related to file operations and persistence.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct FileState {
    /// Current file path for save/load operations
    #[serde(skip)]
    pub current_path: Option<String>,
    /// Flag indicating if the map has unsaved changes
    #[serde(skip)]
    pub has_unsaved_changes: bool,
    /// Pending file operations for WASM compatibility
    #[serde(skip)]
    pub pending_save_operation: Option<PendingSaveOperation>,
    #[serde(skip)]
    pub pending_load_operation: Option<PendingLoadOperation>,
    /// Pending export of the weighted network-data JSON
    #[serde(skip)]
    pub pending_export_operation: bool,
    /// Channel for receiving file operation results from async contexts
    #[serde(skip)]
    pub file_operation_sender: Option<Sender<FileOperationResult>>,
    #[serde(skip)]
    pub file_operation_receiver: Option<Receiver<FileOperationResult>>,
    /// Whether to show an unsaved-changes confirmation dialog
    #[serde(skip)]
    pub show_unsaved_dialog: bool,
    /// The action the user attempted that requires confirmation
    #[serde(skip)]
    pub pending_confirm_action: Option<PendingConfirmAction>,
    /// One-shot flag to allow the next close request to proceed after user confirmation (native only)
    #[serde(skip)]
    pub allow_close_on_next_request: bool,
}

impl Default for FileState {
    fn default() -> Self {
        let (sender, receiver) = channel();
        Self {
            current_path: None,
            has_unsaved_changes: false,
            pending_save_operation: None,
            pending_load_operation: None,
            pending_export_operation: false,
            file_operation_sender: Some(sender),
            file_operation_receiver: Some(receiver),
            show_unsaved_dialog: false,
            pending_confirm_action: None,
            allow_close_on_next_request: false,
        }
    }
}

/// Represents a pending save operation type.
#[derive(Debug)]
pub enum PendingSaveOperation {
    /// Save with a new file path (show file picker)
    SaveAs,
    /// Save to the existing file path
    Save,
}

/// Represents a pending load operation type.
#[derive(Debug)]
pub enum PendingLoadOperation {
    /// Load from a file (show file picker)
    Load,
}

/// Messages sent from async file operations back to the main app.
#[derive(Debug)]
pub enum FileOperationResult {
    /// Save operation completed successfully with the given path
    SaveCompleted(String),
    /// Load operation completed successfully with path and content
    LoadCompleted(String, String),
    /// Export operation completed successfully with the given path
    ExportCompleted(String),
    /// Operation failed with an error message
    OperationFailed(String),
}

/// Pending confirmation actions that may require user approval due to unsaved changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingConfirmAction {
    /// User is attempting to create a new map
    New,
    /// User is attempting to open a map file
    Open,
    /// User is attempting to quit the application
    Quit,
}

/// The main application structure containing UI state and the map data.
///
/// This struct implements the `eframe::App` trait and handles all user
/// interface rendering and interaction logic.
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct MapApp {
    /// The map being edited
    pub map: NetworkMap,
    /// Currently active canvas tool
    pub tool: Tool,
    /// Canvas navigation and display state (the viewport transform)
    pub canvas: CanvasState,
    /// User interaction state: selection, marks, route, gestures
    pub interaction: InteractionState,
    /// Context menu state
    pub context_menu: ContextMenuState,
    /// File operations state
    pub file: FileState,
    /// When set, any graph mutation drops the stored route instead of
    /// leaving a stale overlay on screen. Off by default: the route stays
    /// until the user clears or recomputes it.
    pub auto_clear_route_on_edit: bool,
    /// Whether dark mode visuals are enabled
    pub dark_mode: bool,
    /// Remembered width of the properties panel across sessions
    pub properties_panel_width: f32,
}

impl Default for MapApp {
    fn default() -> Self {
        Self {
            map: NetworkMap::default(),
            tool: Tool::Select,
            canvas: CanvasState::default(),
            interaction: InteractionState::default(),
            context_menu: ContextMenuState::default(),
            file: FileState::default(),
            auto_clear_route_on_edit: false,
            dark_mode: true,
            properties_panel_width: 300.0,
        }
    }
}

impl MapApp {
    /// Serializes the application state to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes application state from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Marks the document dirty after a graph mutation, and drops the stored
    /// route when auto-clearing is enabled.
    pub fn touch(&mut self) {
        self.file.has_unsaved_changes = true;
        if self.auto_clear_route_on_edit {
            self.interaction.clear_route();
        }
    }

    /// Creates a node at the given screen position with default styling and
    /// a label derived from the current node count, selecting it.
    ///
    /// # Returns
    ///
    /// The id of the created node.
    pub fn add_node_at_screen(&mut self, screen_pos: egui::Pos2) -> NodeId {
        let world_pos = self.canvas.screen_to_world(screen_pos);
        let label = format!("Node {}", self.map.nodes.len() + 1);
        let id = self
            .map
            .add_node(MapNode::new(label, (world_pos.x, world_pos.y)));
        self.interaction.select(id);
        self.touch();
        id
    }

    /// Deletes a node, cascading to its incident edges and cleaning every
    /// selection/mark reference in one step so callers never observe a
    /// dangling id.
    pub fn delete_node(&mut self, node_id: NodeId) {
        if self.map.remove_node(node_id) {
            self.interaction.forget_node(node_id);
            self.touch();
        }
    }

    /// Deletes a single edge.
    pub fn delete_edge(&mut self, edge_id: EdgeId) {
        if self.map.remove_edge(edge_id) {
            if self.interaction.selected_edge == Some(edge_id) {
                self.interaction.selected_edge = None;
            }
            self.touch();
        }
    }

    /// Empties the map and resets all selection/marking state.
    pub fn clear_map(&mut self) {
        self.map.clear();
        self.interaction = InteractionState::default();
        self.touch();
    }
}
