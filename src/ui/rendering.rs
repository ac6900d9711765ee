//! Canvas rendering functionality for nodes, edges, the route overlay, and
//! the background grid.
//!
//! All drawing goes through the viewport transform so world geometry lands
//! at the right pixels for the current pan/zoom.

use super::state::MapApp;
use crate::types::*;
use eframe::egui;

impl MapApp {
    /// Renders all map elements on the canvas.
    ///
    /// Elements are drawn in layers: grid first (background), then edges,
    /// then the route overlay, then nodes (foreground) so nodes always sit
    /// on top, matching the hit-test z-order.
    pub fn render_map_elements(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        if self.canvas.show_grid {
            self.draw_grid(painter, canvas_rect);
        }

        for edge in &self.map.edges {
            let is_selected = self.interaction.selected_edge == Some(edge.id);
            self.draw_edge(painter, edge, is_selected);
        }

        if let Some(route) = &self.interaction.route {
            self.draw_route_overlay(painter, route);
        }

        // Preview line while the edge gesture has a start endpoint
        if let Some(start_id) = self.interaction.edge_start_node {
            if let Some(pointer) = painter.ctx().pointer_hover_pos() {
                self.draw_edge_preview(painter, start_id, pointer);
            }
        }

        for node in &self.map.nodes {
            self.draw_node(painter, node);
        }
    }

    /// Draws a zoom-aware grid on the canvas for visual reference.
    ///
    /// Grid lines are spaced every `GRID_SIZE` world units and skipped when
    /// the zoom level would render them closer than a couple of pixels.
    pub fn draw_grid(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        let grid_size = crate::constants::GRID_SIZE;
        let grid_color = egui::Color32::from_rgba_unmultiplied(128, 128, 128, 32);
        let stroke = egui::Stroke::new(1.0, grid_color);

        let screen_grid_size = grid_size * self.canvas.zoom_factor;
        if screen_grid_size < 2.0 {
            return;
        }

        let top_left_world = self.canvas.screen_to_world(canvas_rect.min);
        let bottom_right_world = self.canvas.screen_to_world(canvas_rect.max);

        let start_x = (top_left_world.x / grid_size).floor() * grid_size;
        let end_x = (bottom_right_world.x / grid_size).ceil() * grid_size;
        let start_y = (top_left_world.y / grid_size).floor() * grid_size;
        let end_y = (bottom_right_world.y / grid_size).ceil() * grid_size;

        let mut x = start_x;
        while x <= end_x {
            let screen_x = self.canvas.world_to_screen(egui::pos2(x, 0.0)).x;
            if screen_x >= canvas_rect.min.x && screen_x <= canvas_rect.max.x {
                painter.line_segment(
                    [
                        egui::pos2(screen_x, canvas_rect.min.y),
                        egui::pos2(screen_x, canvas_rect.max.y),
                    ],
                    stroke,
                );
            }
            x += grid_size;
        }

        let mut y = start_y;
        while y <= end_y {
            let screen_y = self.canvas.world_to_screen(egui::pos2(0.0, y)).y;
            if screen_y >= canvas_rect.min.y && screen_y <= canvas_rect.max.y {
                painter.line_segment(
                    [
                        egui::pos2(canvas_rect.min.x, screen_y),
                        egui::pos2(canvas_rect.max.x, screen_y),
                    ],
                    stroke,
                );
            }
            y += grid_size;
        }
    }

    /// Renders a single undirected edge as a line between its endpoints.
    pub fn draw_edge(&self, painter: &egui::Painter, edge: &MapEdge, is_selected: bool) {
        let (Some(source), Some(target)) =
            (self.map.node(edge.source), self.map.node(edge.target))
        else {
            return;
        };

        let start = self
            .canvas
            .world_to_screen(egui::pos2(source.position.0, source.position.1));
        let end = self
            .canvas
            .world_to_screen(egui::pos2(target.position.0, target.position.1));

        let (color, width) = if is_selected {
            (
                crate::constants::SELECTION_RING_COLOR,
                (edge.width + 1.0) * self.canvas.zoom_factor,
            )
        } else {
            (edge.color, edge.width * self.canvas.zoom_factor)
        };

        painter.line_segment([start, end], egui::Stroke::new(width, color));
    }

    /// Renders the current shortest-path result as a dashed overlay on top
    /// of the traversed edges.
    ///
    /// Hops referencing since-deleted nodes are skipped silently: a stale
    /// route stays visible after graph edits until explicitly cleared, and
    /// partial hops simply drop out of the drawing.
    pub fn draw_route_overlay(&self, painter: &egui::Painter, route: &[crate::routing::RouteHop]) {
        let zoom = self.canvas.zoom_factor;
        let stroke = egui::Stroke::new(
            crate::constants::ROUTE_WIDTH * zoom,
            crate::constants::ROUTE_COLOR,
        );

        for hop in route {
            let (Some(from), Some(to)) = (self.map.node(hop.from), self.map.node(hop.to)) else {
                continue;
            };
            let start = self
                .canvas
                .world_to_screen(egui::pos2(from.position.0, from.position.1));
            let end = self
                .canvas
                .world_to_screen(egui::pos2(to.position.0, to.position.1));

            painter.add(egui::Shape::dashed_line(
                &[start, end],
                stroke,
                crate::constants::ROUTE_DASH_LENGTH * zoom,
                crate::constants::ROUTE_GAP_LENGTH * zoom,
            ));
        }
    }

    /// Renders a preview line from the edge gesture's start node to the
    /// current pointer position.
    pub fn draw_edge_preview(
        &self,
        painter: &egui::Painter,
        from_node_id: NodeId,
        to_screen_pos: egui::Pos2,
    ) {
        let Some(from) = self.map.node(from_node_id) else {
            return;
        };
        let start = self
            .canvas
            .world_to_screen(egui::pos2(from.position.0, from.position.1));

        let color = egui::Color32::from_rgb(100, 150, 255);
        painter.line_segment([start, to_screen_pos], egui::Stroke::new(2.0, color));
        painter.circle_filled(to_screen_pos, 4.0, color);
    }

    /// Renders a single node as a filled circle with its label below.
    ///
    /// The selected node gets a contrasting ring, marked nodes a thicker
    /// purple ring, and the edge-gesture start node a blue ring.
    pub fn draw_node(&self, painter: &egui::Painter, node: &MapNode) {
        let center = self
            .canvas
            .world_to_screen(egui::pos2(node.position.0, node.position.1));
        let radius = node.size * self.canvas.zoom_factor;

        painter.circle_filled(center, radius, node.color);

        if self.interaction.selected_node == Some(node.id) {
            painter.circle_stroke(
                center,
                radius,
                egui::Stroke::new(2.0, crate::constants::SELECTION_RING_COLOR),
            );
        }

        if self.interaction.marked_nodes.contains(&node.id) {
            painter.circle_stroke(
                center,
                radius,
                egui::Stroke::new(3.0, crate::constants::MARK_RING_COLOR),
            );
        }

        if self.interaction.edge_start_node == Some(node.id) {
            painter.circle_stroke(
                center,
                radius + 2.0,
                egui::Stroke::new(2.0, egui::Color32::from_rgb(100, 150, 255)),
            );
        }

        // Label below the node, scaled with zoom for readability
        let font_size = ((node.size / 2.0) * self.canvas.zoom_factor).clamp(8.0, 48.0);
        let label_pos = egui::pos2(center.x, center.y + radius + 5.0 * self.canvas.zoom_factor);
        let text_color = if self.dark_mode {
            egui::Color32::from_gray(220)
        } else {
            egui::Color32::from_gray(40)
        };
        painter.text(
            label_pos,
            egui::Align2::CENTER_TOP,
            &node.label,
            egui::FontId::proportional(font_size),
            text_color,
        );
    }
}
