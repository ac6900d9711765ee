//! Shared application-wide constants.
//! Centralizes tweakable values used across UI rendering and interactions.

use egui::Color32;

// Zoom
/// Minimum allowed zoom factor.
pub const MIN_ZOOM: f32 = 0.1;
/// Maximum allowed zoom factor.
pub const MAX_ZOOM: f32 = 5.0;
/// Multiplier applied by the toolbar zoom in/out buttons.
pub const BUTTON_ZOOM_FACTOR: f32 = 1.2;
/// Multiplier applied per wheel notch when scrolling up (zoom in).
pub const WHEEL_ZOOM_IN: f32 = 1.1;
/// Multiplier applied per wheel notch when scrolling down (zoom out).
pub const WHEEL_ZOOM_OUT: f32 = 0.9;

// Node defaults
/// Default radius of a newly created node, in world units.
pub const DEFAULT_NODE_SIZE: f32 = 10.0;
/// Default fill color of a newly created node.
pub const DEFAULT_NODE_COLOR: Color32 = Color32::from_rgb(0x34, 0x98, 0xdb);

// Edge defaults
/// Default stroke width of a newly created edge, in world units.
pub const DEFAULT_EDGE_WIDTH: f32 = 2.0;
/// Default stroke color of a newly created edge.
pub const DEFAULT_EDGE_COLOR: Color32 = Color32::from_rgb(0x7f, 0x8c, 0x8d);

// Route overlay
/// Stroke width of the highlighted shortest-path overlay, in world units.
pub const ROUTE_WIDTH: f32 = 4.0;
/// Stroke color of the highlighted shortest-path overlay.
pub const ROUTE_COLOR: Color32 = Color32::from_rgb(0xe7, 0x4c, 0x3c);
/// Dash length of the route overlay, in world units.
pub const ROUTE_DASH_LENGTH: f32 = 6.0;
/// Gap length of the route overlay, in world units.
pub const ROUTE_GAP_LENGTH: f32 = 3.0;

// Selection and marks
/// Ring color drawn around the selected node.
pub const SELECTION_RING_COLOR: Color32 = Color32::from_rgb(0xe7, 0x4c, 0x3c);
/// Ring color drawn around marked nodes.
pub const MARK_RING_COLOR: Color32 = Color32::from_rgb(0x80, 0x00, 0x80);

// Grid/drawing
/// Grid cell size in world units.
pub const GRID_SIZE: f32 = 20.0;

// Canvas interactions
/// Screen-space threshold (pixels) for hitting an edge with the pointer.
pub const EDGE_CLICK_THRESHOLD: f32 = 8.0;
