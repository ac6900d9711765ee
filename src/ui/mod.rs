//! User interface components and rendering logic for the map tool.
//!
//! This module contains all the UI-related code including the main application
//! struct, canvas rendering, property panels, context menus, and user
//! interaction handling.
//!
//! # Module Organization
//!
//! - `state` - Application state structures and the main MapApp
//! - `file_ops` - File save/load/export operations for native and WASM
//! - `canvas` - Canvas navigation, zooming, panning, and interaction
//! - `rendering` - Drawing nodes, edges, the route overlay, and the grid

mod canvas;
mod file_ops;
mod rendering;
mod state;

#[cfg(test)]
mod tests;

pub use state::{CanvasState, InteractionState, MapApp, Tool};

use self::state::PendingConfirmAction;
use crate::routing;
use eframe::egui;

impl eframe::App for MapApp {
    /// Persist entire app state between restarts.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        match self.to_json() {
            Ok(json) => {
                storage.set_string("app_state", json);
            }
            Err(err) => {
                eprintln!("Failed to serialize app state: {err}");
            }
        }
    }

    /// Main update function called by egui for each frame.
    ///
    /// This method handles the overall UI layout, including the properties
    /// panel, toolbar, and main canvas area.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Apply theme visuals
        let visuals = if self.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        ctx.set_visuals(visuals);

        // Handle pending file operations
        self.handle_pending_operations(ctx);

        // Handle delete key for removing selected objects
        self.handle_delete_key(ctx);

        // Handle file-related keyboard shortcuts (New/Open/Save)
        self.handle_file_shortcuts(ctx);

        // Intercept native window close requests (titlebar X)
        #[cfg(not(target_arch = "wasm32"))]
        {
            if ctx.input(|i| i.viewport().close_requested()) {
                if self.file.has_unsaved_changes && !self.file.allow_close_on_next_request {
                    // Abort close and show confirmation dialog
                    ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
                    if !self.file.show_unsaved_dialog {
                        self.file.show_unsaved_dialog = true;
                        self.file.pending_confirm_action = Some(PendingConfirmAction::Quit);
                    }
                } else {
                    self.file.allow_close_on_next_request = false;
                }
            }
        }

        // Top toolbar occupies full width and is independent of the properties panel
        egui::TopBottomPanel::top("top_toolbar").show(ctx, |ui| {
            self.draw_toolbar(ui);
        });

        // Properties panel should only take space from the canvas area below the toolbar
        let viewport_width = ctx.input(|i| i.screen_rect().width());
        let clamped_width = self
            .properties_panel_width
            .clamp(180.0, (viewport_width * 0.9).max(180.0));

        egui::SidePanel::right("properties_panel")
            .resizable(true)
            .default_width(clamped_width)
            .show(ctx, |ui| {
                // Capture the current width each frame so we can remember it
                let current_width = ui.available_width();
                let max_allowed = (viewport_width * 0.9).max(180.0);
                self.properties_panel_width = current_width.clamp(180.0, max_allowed);
                self.draw_properties_panel(ui);
            });

        // Central canvas area (below the toolbar)
        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_canvas(ui);
        });

        // Unsaved changes confirmation dialog
        if self.file.show_unsaved_dialog {
            let title = match self.file.pending_confirm_action {
                Some(PendingConfirmAction::Quit) => "Unsaved changes — Quit?",
                Some(PendingConfirmAction::New) => "Unsaved changes — Create New?",
                Some(PendingConfirmAction::Open) => "Unsaved changes — Open File?",
                None => "Unsaved changes",
            };
            egui::Window::new(title)
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
                .show(ctx, |ui| {
                    ui.label("You have unsaved changes. Are you sure you want to continue?");
                    ui.horizontal(|ui| {
                        let confirm_label = match self.file.pending_confirm_action {
                            Some(PendingConfirmAction::Quit) => "Discard and Quit",
                            Some(PendingConfirmAction::New) => "Discard and Create New",
                            Some(PendingConfirmAction::Open) => "Discard and Open",
                            None => "Discard",
                        };
                        if ui.button(confirm_label).clicked() {
                            match self.file.pending_confirm_action {
                                Some(PendingConfirmAction::New) => {
                                    self.new_map();
                                }
                                Some(PendingConfirmAction::Open) => {
                                    self.load_map();
                                }
                                Some(PendingConfirmAction::Quit) => {
                                    // Allow one close request to pass without interception
                                    self.file.allow_close_on_next_request = true;
                                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                                }
                                None => {}
                            }
                            self.file.show_unsaved_dialog = false;
                            self.file.pending_confirm_action = None;
                        }
                        if ui.button("Cancel").clicked() {
                            self.file.show_unsaved_dialog = false;
                            self.file.pending_confirm_action = None;
                        }
                    });
                });
        }
    }
}

impl MapApp {
    /// Handles file-related keyboard shortcuts (Save/Open/New/Quit).
    fn handle_file_shortcuts(&mut self, ctx: &egui::Context) {
        let is_editing_text = ctx.wants_keyboard_input();
        if is_editing_text {
            return;
        }
        #[cfg(target_arch = "wasm32")]
        let request_quit = false;
        #[cfg(not(target_arch = "wasm32"))]
        let mut request_quit = false;
        ctx.input(|i| {
            let cmd = i.modifiers.command;
            let shift = i.modifiers.shift;
            // Save As: Cmd/Ctrl+Shift+S
            if i.key_pressed(egui::Key::S) && cmd && shift {
                self.save_as_map();
            }
            // Save: Cmd/Ctrl+S
            else if i.key_pressed(egui::Key::S) && cmd {
                self.save_map();
            }
            // Open: Cmd/Ctrl+O
            if i.key_pressed(egui::Key::O) && cmd {
                if self.file.has_unsaved_changes {
                    self.file.show_unsaved_dialog = true;
                    self.file.pending_confirm_action = Some(PendingConfirmAction::Open);
                } else {
                    self.load_map();
                }
            }
            // New: Cmd/Ctrl+N
            if i.key_pressed(egui::Key::N) && cmd {
                if self.file.has_unsaved_changes {
                    self.file.show_unsaved_dialog = true;
                    self.file.pending_confirm_action = Some(PendingConfirmAction::New);
                } else {
                    self.new_map();
                }
            }
            // Quit: Cmd/Ctrl+Q (native only)
            #[cfg(not(target_arch = "wasm32"))]
            if i.key_pressed(egui::Key::Q) && cmd {
                if self.file.has_unsaved_changes {
                    self.file.show_unsaved_dialog = true;
                    self.file.pending_confirm_action = Some(PendingConfirmAction::Quit);
                } else {
                    request_quit = true;
                }
            }
        });
        if request_quit {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }
    }

    /// Handles delete key presses to remove the selected node or edge.
    fn handle_delete_key(&mut self, ctx: &egui::Context) {
        // Don't handle delete while a text edit widget has keyboard focus
        let is_editing_text = ctx.wants_keyboard_input();

        if ctx.input(|i| i.key_pressed(egui::Key::Delete)) && !is_editing_text {
            if let Some(node_id) = self.interaction.selected_node {
                self.delete_node(node_id);
            } else if let Some(edge_id) = self.interaction.selected_edge {
                self.delete_edge(edge_id);
            }
        }
    }

    /// Renders the toolbar with file operations, tool selection, and view options.
    fn draw_toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            // File operations
            if ui.button("New").clicked() {
                if self.file.has_unsaved_changes {
                    self.file.show_unsaved_dialog = true;
                    self.file.pending_confirm_action = Some(PendingConfirmAction::New);
                } else {
                    self.new_map();
                }
            }
            if ui.button("Open").clicked() {
                if self.file.has_unsaved_changes {
                    self.file.show_unsaved_dialog = true;
                    self.file.pending_confirm_action = Some(PendingConfirmAction::Open);
                } else {
                    self.load_map();
                }
            }
            if ui.button("Save").clicked() {
                self.save_map();
            }
            if ui.button("Save As").clicked() {
                self.save_as_map();
            }
            if ui.button("Export JSON").clicked() {
                self.export_network_data();
            }

            ui.separator();

            // Tool selection
            ui.selectable_value(&mut self.tool, Tool::Select, "Select");
            ui.selectable_value(&mut self.tool, Tool::AddNode, "Add Node");
            ui.selectable_value(&mut self.tool, Tool::AddEdge, "Add Edge");

            ui.separator();

            // Zoom controls, anchored at the canvas center so the view stays put
            let viewport_center = ui.ctx().screen_rect().center();
            if ui.button("−").clicked() {
                self.canvas.zoom_out(viewport_center);
            }
            ui.label(format!("{:.0}%", self.canvas.zoom_factor * 100.0));
            if ui.button("+").clicked() {
                self.canvas.zoom_in(viewport_center);
            }

            ui.separator();

            if ui.button("Clear").clicked() {
                self.clear_map();
            }

            ui.separator();

            // View options
            ui.checkbox(&mut self.canvas.show_grid, "Show Grid");
            ui.checkbox(&mut self.dark_mode, "Dark Mode");
            ui.checkbox(&mut self.auto_clear_route_on_edit, "Clear path on edit");

            // Show current file and unsaved changes indicator
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if let Some(file_path) = &self.file.current_path {
                    let status = if self.file.has_unsaved_changes { "*" } else { "" };
                    ui.label(format!("{}{}", file_path, status));
                } else {
                    let status = if self.file.has_unsaved_changes {
                        "Untitled*"
                    } else {
                        "Untitled"
                    };
                    ui.label(status);
                }
            });
        });
    }

    /// Renders the properties panel showing details of the selected node or
    /// edge, plus the pathfinding controls.
    fn draw_properties_panel(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.heading("Properties");
                    ui.separator();

                    if let Some(node_id) = self.interaction.selected_node {
                        self.draw_node_properties(ui, node_id);
                    } else if let Some(edge_id) = self.interaction.selected_edge {
                        self.draw_edge_properties(ui, edge_id);
                    } else {
                        ui.label("Nothing selected");
                        ui.label("Click a node or edge to edit it.");
                    }

                    ui.separator();
                    self.draw_route_panel(ui);
                });
            });
    }

    /// Renders editable properties of the selected node.
    fn draw_node_properties(&mut self, ui: &mut egui::Ui, node_id: crate::types::NodeId) {
        let Some(node) = self.map.node(node_id) else {
            return;
        };
        let position = node.position;
        let mut color = node.color;
        let mut size = node.size;
        let is_marked = self.interaction.marked_nodes.contains(&node_id);

        ui.label("Node");
        ui.label(format!("Position: ({:.1}, {:.1})", position.0, position.1));

        // Label edits go through a staging buffer so partial typing doesn't
        // thrash the map on every keystroke
        if self.interaction.temp_label_node_id != Some(node_id) {
            self.interaction.temp_node_label = node.label.clone();
            self.interaction.temp_label_node_id = Some(node_id);
        }

        ui.horizontal(|ui| {
            ui.label("Label:");
            let response = ui.text_edit_singleline(&mut self.interaction.temp_node_label);
            if response.lost_focus() || ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                let label = self.interaction.temp_node_label.clone();
                if self.map.update_node(
                    node_id,
                    crate::types::NodePatch {
                        label: Some(label),
                        ..Default::default()
                    },
                ) {
                    self.touch();
                }
            }
        });

        ui.horizontal(|ui| {
            ui.label("Color:");
            if ui.color_edit_button_srgba(&mut color).changed() {
                if self.map.update_node(
                    node_id,
                    crate::types::NodePatch {
                        color: Some(color),
                        ..Default::default()
                    },
                ) {
                    self.touch();
                }
            }
        });

        ui.horizontal(|ui| {
            ui.label("Size:");
            let response = ui.add(
                egui::DragValue::new(&mut size)
                    .speed(0.5)
                    .range(1.0..=100.0),
            );
            if response.changed() {
                if self.map.update_node(
                    node_id,
                    crate::types::NodePatch {
                        size: Some(size),
                        ..Default::default()
                    },
                ) {
                    self.touch();
                }
            }
        });

        let mut marked = is_marked;
        if ui.checkbox(&mut marked, "Marked").changed() {
            self.interaction.toggle_mark(node_id);
        }

        if ui.button("Delete Node").clicked() {
            self.delete_node(node_id);
        }
    }

    /// Renders editable properties of the selected edge.
    fn draw_edge_properties(&mut self, ui: &mut egui::Ui, edge_id: crate::types::EdgeId) {
        let Some(edge) = self.map.edge(edge_id) else {
            return;
        };
        let mut color = edge.color;
        let mut width = edge.width;
        let weight = routing::edge_weight(&self.map, edge).unwrap_or(0.0);
        let source_label = self
            .map
            .node(edge.source)
            .map(|n| n.label.clone())
            .unwrap_or_default();
        let target_label = self
            .map
            .node(edge.target)
            .map(|n| n.label.clone())
            .unwrap_or_default();

        ui.label("Edge");
        ui.label(format!("{} ↔ {}", source_label, target_label));
        ui.label(format!("Weight: {:.2}", weight));

        ui.horizontal(|ui| {
            ui.label("Color:");
            if ui.color_edit_button_srgba(&mut color).changed() {
                if let Some(edge) = self.map.edge_mut(edge_id) {
                    edge.color = color;
                    self.touch();
                }
            }
        });

        ui.horizontal(|ui| {
            ui.label("Width:");
            let response = ui.add(
                egui::DragValue::new(&mut width)
                    .speed(0.1)
                    .range(0.5..=20.0),
            );
            if response.changed() {
                if let Some(edge) = self.map.edge_mut(edge_id) {
                    edge.width = width;
                    self.touch();
                }
            }
        });

        if ui.button("Delete Edge").clicked() {
            self.delete_edge(edge_id);
        }
    }

    /// Renders the shortest-path controls: endpoint pickers, the Find Path
    /// button, and the status/result line.
    fn draw_route_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Pathfinding");

        let node_label = |id: Option<crate::types::NodeId>| -> String {
            id.and_then(|id| self.map.node(id))
                .map(|n| n.label.clone())
                .unwrap_or_else(|| "—".to_string())
        };

        egui::ComboBox::from_label("From")
            .selected_text(node_label(self.interaction.route_source))
            .show_ui(ui, |ui| {
                for node in &self.map.nodes {
                    ui.selectable_value(
                        &mut self.interaction.route_source,
                        Some(node.id),
                        node.label.clone(),
                    );
                }
            });

        egui::ComboBox::from_label("To")
            .selected_text(node_label(self.interaction.route_dest))
            .show_ui(ui, |ui| {
                for node in &self.map.nodes {
                    ui.selectable_value(
                        &mut self.interaction.route_dest,
                        Some(node.id),
                        node.label.clone(),
                    );
                }
            });

        ui.horizontal(|ui| {
            if ui.button("Find Path").clicked() {
                self.find_route();
            }
            if ui.button("Clear Path").clicked() {
                self.interaction.clear_route();
            }
        });

        if let Some(status) = &self.interaction.route_status {
            ui.label(status);
        }
    }

    /// Runs the shortest-path search between the chosen endpoints and stores
    /// the result plus a human-readable status line.
    fn find_route(&mut self) {
        let (Some(source), Some(dest)) =
            (self.interaction.route_source, self.interaction.route_dest)
        else {
            self.interaction.route_status =
                Some("Pick both endpoints first".to_string());
            return;
        };

        match routing::shortest_path(&self.map, source, dest) {
            Ok(Some(hops)) => {
                let total = routing::route_weight(&self.map, &hops);
                self.interaction.route_status = Some(format!(
                    "Found path: {} hop(s), total weight {:.2}",
                    hops.len(),
                    total
                ));
                self.interaction.route = Some(hops);
            }
            Ok(None) => {
                self.interaction.route = None;
                self.interaction.route_status = Some("No path exists".to_string());
            }
            Err(e) => {
                self.interaction.route = None;
                self.interaction.route_status = Some(format!("Cannot search: {}", e));
            }
        }
    }

    /// Renders the right-click context menu for a node.
    fn draw_context_menu(&mut self, ui: &mut egui::Ui) {
        // Use the stored screen coordinates for menu positioning
        let screen_pos = egui::pos2(
            self.context_menu.screen_pos.0,
            self.context_menu.screen_pos.1,
        );

        let area_response = egui::Area::new(egui::Id::new("context_menu"))
            .fixed_pos(screen_pos)
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.vertical(|ui| {
                        let Some(node_id) = self.context_menu.node else {
                            self.context_menu.show = false;
                            return;
                        };

                        if ui.button("Edit").clicked() {
                            self.interaction.select(node_id);
                            self.context_menu.show = false;
                        }

                        let mark_label = if self.interaction.marked_nodes.contains(&node_id) {
                            "Unmark"
                        } else {
                            "Mark"
                        };
                        if ui.button(mark_label).clicked() {
                            self.interaction.toggle_mark(node_id);
                            self.context_menu.show = false;
                        }

                        if ui.button("Delete").clicked() {
                            self.delete_node(node_id);
                            self.context_menu.show = false;
                        }

                        ui.separator();
                        if ui.button("Cancel").clicked() {
                            self.context_menu.show = false;
                        }
                    });
                })
            });

        // Handle click-outside-to-close after the first frame
        if !self.context_menu.just_opened && ui.input(|i| i.pointer.primary_clicked()) {
            if let Some(click_pos) = ui.input(|i| i.pointer.interact_pos()) {
                if !area_response.response.rect.contains(click_pos) {
                    self.context_menu.show = false;
                }
            }
        }

        self.context_menu.just_opened = false;
    }

    /// Renders the main canvas area with nodes, edges, and handles user
    /// interactions.
    fn draw_canvas(&mut self, ui: &mut egui::Ui) {
        let (response, painter) =
            ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());

        // Initialize canvas to center the origin on first frame
        if self.canvas.offset == egui::Vec2::ZERO && self.map.nodes.is_empty() {
            let canvas_center = response.rect.center();
            self.canvas.offset = canvas_center.to_vec2();
        }

        // Handle node dragging with left mouse button
        self.handle_node_dragging(ui, &response);

        // Handle canvas panning with middle mouse button or drag on empty space
        self.handle_canvas_panning(ui, &response);

        // Handle scroll wheel zooming
        self.handle_canvas_zoom(ui, &response);

        // Handle other interactions (node placement, edge gesture, selection,
        // context menu)
        self.handle_canvas_interactions(ui, &response);

        // Render all map elements
        let canvas_rect = response.rect;
        self.render_map_elements(&painter, canvas_rect);

        // Show context menu if active
        if self.context_menu.show {
            self.draw_context_menu(ui);
        }
    }
}
