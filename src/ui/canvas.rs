//! Canvas interaction and navigation functionality.
//!
//! This module handles canvas panning, zooming, node dragging, the
//! two-click edge gesture, and hit-testing of nodes and edges.

use super::state::{MapApp, Tool};
use crate::types::*;
use eframe::egui;

impl MapApp {
    /// Finds the node under the given screen position, if any.
    ///
    /// Hit-testing happens in screen space: a node is hit when the pixel
    /// distance from the pointer to its center is within `size * zoom`.
    /// Nodes are scanned in reverse insertion order so the most recently
    /// added (visually topmost) node wins when several overlap.
    pub fn find_node_at_screen(&self, screen_pos: egui::Pos2) -> Option<NodeId> {
        for node in self.map.nodes.iter().rev() {
            let center = self
                .canvas
                .world_to_screen(egui::pos2(node.position.0, node.position.1));
            let distance = (center - screen_pos).length();
            if distance <= node.size * self.canvas.zoom_factor {
                return Some(node.id);
            }
        }
        None
    }

    /// Finds the edge under the given screen position, if any.
    ///
    /// Uses distance-to-line-segment calculation in screen space with a
    /// fixed pixel threshold. Earlier edges win ties, matching draw order.
    pub fn find_edge_at_screen(&self, screen_pos: egui::Pos2) -> Option<EdgeId> {
        for edge in &self.map.edges {
            let (Some(source), Some(target)) =
                (self.map.node(edge.source), self.map.node(edge.target))
            else {
                continue;
            };
            let start = self
                .canvas
                .world_to_screen(egui::pos2(source.position.0, source.position.1));
            let end = self
                .canvas
                .world_to_screen(egui::pos2(target.position.0, target.position.1));
            if point_to_segment_distance(screen_pos, start, end)
                < crate::constants::EDGE_CLICK_THRESHOLD
            {
                return Some(edge.id);
            }
        }
        None
    }

    /// Handles node dragging with the left mouse button in the Select tool.
    ///
    /// Pressing on a node selects it and begins the drag; the node follows
    /// the pointer in world space until release.
    pub fn handle_node_dragging(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        if self.tool != Tool::Select {
            return;
        }

        if ui.input(|i| i.pointer.primary_down()) && !self.interaction.is_panning {
            if let Some(current_pos) = response.interact_pointer_pos() {
                if let Some(dragging_id) = self.interaction.dragging_node {
                    // Continue dragging: move the node to the pointer's world
                    // position, preserving the grab offset.
                    let world_pos =
                        self.canvas.screen_to_world(current_pos) + self.interaction.node_drag_offset;
                    if let Some(node) = self.map.node_mut(dragging_id) {
                        if node.position != (world_pos.x, world_pos.y) {
                            node.position = (world_pos.x, world_pos.y);
                            self.touch();
                        }
                    }
                } else if let Some(node_id) = self.find_node_at_screen(current_pos) {
                    // Start dragging; pressing a node also selects it.
                    self.interaction.dragging_node = Some(node_id);
                    self.interaction.select(node_id);
                    if let Some(node) = self.map.node(node_id) {
                        let center = egui::pos2(node.position.0, node.position.1);
                        let world_pos = self.canvas.screen_to_world(current_pos);
                        self.interaction.node_drag_offset = center - world_pos;
                    }
                }
            }
        } else {
            self.interaction.dragging_node = None;
        }
    }

    /// Handles canvas panning: middle-button drag in any tool, or
    /// left-button drag on empty space in the Select tool.
    ///
    /// A drag delta in screen pixels adds directly to the offset; no scale
    /// factor is involved.
    pub fn handle_canvas_panning(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        let should_pan = ui.input(|i| {
            i.pointer.middle_down() || (i.pointer.primary_down() && self.tool == Tool::Select)
        });

        if should_pan && self.interaction.dragging_node.is_none() {
            if let Some(current_pos) = response.interact_pointer_pos() {
                if self.interaction.is_panning {
                    if let Some(last_pos) = self.interaction.last_pan_pos {
                        self.canvas.pan_by(current_pos - last_pos);
                    }
                    self.interaction.last_pan_pos = Some(current_pos);
                } else if self.find_node_at_screen(current_pos).is_none() {
                    self.interaction.is_panning = true;
                    self.interaction.last_pan_pos = Some(current_pos);
                }
            }
        } else {
            self.interaction.is_panning = false;
            self.interaction.last_pan_pos = None;
        }
    }

    /// Handles Ctrl/Cmd + scroll wheel zooming anchored at the cursor.
    ///
    /// The world point under the cursor stays under the cursor after the
    /// zoom change. Only zooms if the cursor is over the canvas.
    pub fn handle_canvas_zoom(&mut self, ui: &mut egui::Ui, response: &egui::Response) {
        let (scroll_delta, modifier_held) =
            ui.input(|i| (i.smooth_scroll_delta.y, i.modifiers.command));

        if scroll_delta != 0.0 && modifier_held {
            let mouse_pos = ui
                .input(|i| i.pointer.hover_pos())
                .or_else(|| response.interact_pointer_pos());

            if let Some(mouse_pos) = mouse_pos {
                if !response.rect.contains(mouse_pos) {
                    return;
                }

                let factor = if scroll_delta > 0.0 {
                    crate::constants::WHEEL_ZOOM_IN
                } else {
                    crate::constants::WHEEL_ZOOM_OUT
                };
                self.canvas
                    .set_zoom(self.canvas.zoom_factor * factor, mouse_pos);
            }
        }
    }

    /// Handles canvas click interactions for the active tool, plus the
    /// right-click context menu on nodes.
    pub fn handle_canvas_interactions(&mut self, _ui: &mut egui::Ui, response: &egui::Response) {
        if response.clicked() && !self.interaction.is_panning {
            if let Some(pos) = response.interact_pointer_pos() {
                match self.tool {
                    Tool::AddNode => {
                        self.add_node_at_screen(pos);
                    }
                    Tool::AddEdge => {
                        if let Some(node_id) = self.find_node_at_screen(pos) {
                            self.connect_click(node_id);
                        }
                    }
                    Tool::Select => {
                        if let Some(node_id) = self.find_node_at_screen(pos) {
                            self.interaction.select(node_id);
                        } else if let Some(edge_id) = self.find_edge_at_screen(pos) {
                            self.interaction.selected_edge = Some(edge_id);
                            self.interaction.selected_node = None;
                        } else {
                            self.interaction.clear_selection();
                        }
                    }
                }
            }
        }

        // Right-click opens the context menu when a node is under the cursor.
        if response.secondary_clicked() && !self.interaction.is_panning {
            if let Some(screen_pos) = response.interact_pointer_pos() {
                if let Some(node_id) = self.find_node_at_screen(screen_pos) {
                    self.context_menu.screen_pos = (screen_pos.x, screen_pos.y);
                    self.context_menu.node = Some(node_id);
                    self.context_menu.show = true;
                    self.context_menu.just_opened = true;
                }
            }
        }
    }

    /// Advances the two-click edge gesture with a click on `node_id`.
    ///
    /// The first click picks the start endpoint; the second click commits
    /// the edge when it lands on a different node. Self-loops and duplicate
    /// pairs are silently rejected by the store, and the gesture resets
    /// after any second click.
    pub fn connect_click(&mut self, node_id: NodeId) {
        match self.interaction.edge_start_node {
            None => {
                self.interaction.edge_start_node = Some(node_id);
            }
            Some(start) => {
                if self.map.add_edge(start, node_id).is_some() {
                    self.touch();
                }
                self.interaction.edge_start_node = None;
            }
        }
    }
}

/// Calculates the distance from a point to a line segment.
///
/// Uses vector projection clamped to the segment endpoints.
fn point_to_segment_distance(
    point: egui::Pos2,
    segment_start: egui::Pos2,
    segment_end: egui::Pos2,
) -> f32 {
    let segment_vec = segment_end - segment_start;
    let point_vec = point - segment_start;
    let segment_len_sq = segment_vec.length_sq();

    if segment_len_sq < 0.0001 {
        // Segment is essentially a point
        return point_vec.length();
    }

    let t = (point_vec.dot(segment_vec) / segment_len_sq).clamp(0.0, 1.0);
    let projection = segment_start + segment_vec * t;

    (point - projection).length()
}
