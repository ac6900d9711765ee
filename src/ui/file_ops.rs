//! File operations for saving, loading, and exporting maps.
//!
//! This module handles all file I/O including native file dialogs and
//! WASM-compatible browser-based operations. Map documents save and load as
//! plain JSON; the export operation writes the weighted network-data
//! document built by [`crate::export`].

use super::state::{
    FileOperationResult, MapApp, PendingLoadOperation, PendingSaveOperation,
};
use crate::types::NetworkMap;
use eframe::egui;

impl MapApp {
    /// Handles pending file operations for both native and WASM platforms.
    ///
    /// Processes completed async file operations from the channel and
    /// initiates newly requested ones.
    pub fn handle_pending_operations(&mut self, ctx: &egui::Context) {
        // First, process any completed file operations from the channel
        if let Some(receiver) = &self.file.file_operation_receiver {
            while let Ok(result) = receiver.try_recv() {
                match result {
                    FileOperationResult::SaveCompleted(path) => {
                        self.file.current_path = Some(path);
                        self.file.has_unsaved_changes = false;
                        println!("Map saved successfully");
                    }
                    FileOperationResult::LoadCompleted(path, content) => {
                        match NetworkMap::from_json(&content) {
                            Ok(map) => {
                                self.map = map;
                                self.file.current_path = Some(path);
                                self.file.has_unsaved_changes = false;
                                self.interaction = Default::default();
                                println!("Map loaded successfully");
                            }
                            Err(e) => {
                                eprintln!("Failed to parse map: {}", e);
                            }
                        }
                    }
                    FileOperationResult::ExportCompleted(path) => {
                        println!("Network data exported to {}", path);
                    }
                    FileOperationResult::OperationFailed(error) => {
                        eprintln!("File operation failed: {}", error);
                    }
                }
            }
        }

        // Handle pending save operations
        if let Some(save_op) = self.file.pending_save_operation.take() {
            let ctx = ctx.clone();
            let map_json = self.map.to_json().unwrap_or_default();
            let sender = self.file.file_operation_sender.clone();

            match save_op {
                PendingSaveOperation::SaveAs => {
                    Self::spawn_save_dialog("map.json", map_json, sender, ctx);
                }
                PendingSaveOperation::Save => {
                    if let Some(path) = self.file.current_path.clone() {
                        #[cfg(not(target_arch = "wasm32"))]
                        {
                            tokio::spawn(async move {
                                match std::fs::write(&path, map_json) {
                                    Ok(_) => {
                                        if let Some(tx) = sender {
                                            let _ =
                                                tx.send(FileOperationResult::SaveCompleted(path));
                                        }
                                    }
                                    Err(e) => {
                                        if let Some(tx) = sender {
                                            let _ = tx.send(FileOperationResult::OperationFailed(
                                                format!("Failed to save file: {}", e),
                                            ));
                                        }
                                    }
                                }
                                ctx.request_repaint();
                            });
                        }

                        #[cfg(target_arch = "wasm32")]
                        {
                            // The browser can't re-save to a previous path
                            // without user interaction; fall back to Save As
                            let _ = (sender, ctx);
                            self.file.pending_save_operation = Some(PendingSaveOperation::SaveAs);
                        }
                    } else {
                        self.file.pending_save_operation = Some(PendingSaveOperation::SaveAs);
                    }
                }
            }
        }

        // Handle a pending export of the weighted network-data document
        if self.file.pending_export_operation {
            self.file.pending_export_operation = false;
            match crate::export::export_json(&self.map, &self.interaction.marked_nodes) {
                Ok(json) => {
                    let sender = self.file.file_operation_sender.clone();
                    Self::spawn_export_dialog("network-data.json", json, sender, ctx.clone());
                }
                Err(e) => {
                    eprintln!("Failed to build export document: {}", e);
                }
            }
        }

        // Handle pending load operations
        if let Some(PendingLoadOperation::Load) = self.file.pending_load_operation.take() {
            let ctx = ctx.clone();
            let sender = self.file.file_operation_sender.clone();

            #[cfg(target_arch = "wasm32")]
            {
                wasm_bindgen_futures::spawn_local(async move {
                    match Self::show_open_file_picker().await {
                        Some(file) => {
                            let filename = file.name();
                            match Self::read_file(file).await {
                                Ok(content) => {
                                    if let Some(tx) = sender {
                                        let _ = tx.send(FileOperationResult::LoadCompleted(
                                            filename, content,
                                        ));
                                    }
                                }
                                Err(e) => {
                                    if let Some(tx) = sender {
                                        let _ = tx.send(FileOperationResult::OperationFailed(e));
                                    }
                                }
                            }
                        }
                        None => {
                            eprintln!("Open dialog cancelled or API not supported");
                        }
                    }
                    ctx.request_repaint();
                });
            }

            #[cfg(not(target_arch = "wasm32"))]
            {
                tokio::spawn(async move {
                    if let Some(handle) = rfd::AsyncFileDialog::new()
                        .add_filter("JSON", &["json"])
                        .pick_file()
                        .await
                    {
                        let path = handle.path();
                        match std::fs::read_to_string(path) {
                            Ok(json) => {
                                if let Some(tx) = sender {
                                    let _ = tx.send(FileOperationResult::LoadCompleted(
                                        path.display().to_string(),
                                        json,
                                    ));
                                }
                            }
                            Err(e) => {
                                if let Some(tx) = sender {
                                    let _ = tx.send(FileOperationResult::OperationFailed(format!(
                                        "Failed to read file: {}",
                                        e
                                    )));
                                }
                            }
                        }
                    }
                    ctx.request_repaint();
                });
            }
        }
    }

    /// Shows a save dialog for the map document and reports the outcome as
    /// a `SaveCompleted` result.
    fn spawn_save_dialog(
        default_name: &str,
        content: String,
        sender: Option<std::sync::mpsc::Sender<FileOperationResult>>,
        ctx: egui::Context,
    ) {
        #[cfg(target_arch = "wasm32")]
        {
            match Self::trigger_download(default_name, &content) {
                Ok(_) => {
                    if let Some(tx) = sender {
                        let _ =
                            tx.send(FileOperationResult::SaveCompleted(default_name.to_string()));
                    }
                }
                Err(e) => {
                    if let Some(tx) = sender {
                        let _ = tx.send(FileOperationResult::OperationFailed(e));
                    }
                }
            }
            ctx.request_repaint();
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let default_name = default_name.to_string();
            tokio::spawn(async move {
                if let Some(handle) = rfd::AsyncFileDialog::new()
                    .add_filter("JSON", &["json"])
                    .set_file_name(&default_name)
                    .save_file()
                    .await
                {
                    let path = handle.path();
                    match std::fs::write(path, content) {
                        Ok(_) => {
                            if let Some(tx) = sender {
                                let _ = tx.send(FileOperationResult::SaveCompleted(
                                    path.display().to_string(),
                                ));
                            }
                        }
                        Err(e) => {
                            if let Some(tx) = sender {
                                let _ = tx.send(FileOperationResult::OperationFailed(format!(
                                    "Failed to save file: {}",
                                    e
                                )));
                            }
                        }
                    }
                }
                ctx.request_repaint();
            });
        }
    }

    /// Shows a save dialog for the export document and reports the outcome
    /// as an `ExportCompleted` result.
    fn spawn_export_dialog(
        default_name: &str,
        content: String,
        sender: Option<std::sync::mpsc::Sender<FileOperationResult>>,
        ctx: egui::Context,
    ) {
        #[cfg(target_arch = "wasm32")]
        {
            match Self::trigger_download(default_name, &content) {
                Ok(_) => {
                    if let Some(tx) = sender {
                        let _ = tx
                            .send(FileOperationResult::ExportCompleted(default_name.to_string()));
                    }
                }
                Err(e) => {
                    if let Some(tx) = sender {
                        let _ = tx.send(FileOperationResult::OperationFailed(e));
                    }
                }
            }
            ctx.request_repaint();
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let default_name = default_name.to_string();
            tokio::spawn(async move {
                if let Some(handle) = rfd::AsyncFileDialog::new()
                    .add_filter("JSON", &["json"])
                    .set_file_name(&default_name)
                    .save_file()
                    .await
                {
                    let path = handle.path();
                    match std::fs::write(path, content) {
                        Ok(_) => {
                            if let Some(tx) = sender {
                                let _ = tx.send(FileOperationResult::ExportCompleted(
                                    path.display().to_string(),
                                ));
                            }
                        }
                        Err(e) => {
                            if let Some(tx) = sender {
                                let _ = tx.send(FileOperationResult::OperationFailed(format!(
                                    "Failed to export file: {}",
                                    e
                                )));
                            }
                        }
                    }
                }
                ctx.request_repaint();
            });
        }
    }

    /// Triggers a file download in the browser (WASM only).
    ///
    /// Creates a temporary anchor element with a blob URL and clicks it.
    #[cfg(target_arch = "wasm32")]
    fn trigger_download(filename: &str, content: &str) -> Result<(), String> {
        use wasm_bindgen::JsCast;

        let window = web_sys::window().ok_or("No window found")?;
        let document = window.document().ok_or("No document found")?;

        let blob_parts = js_sys::Array::new();
        blob_parts.push(&wasm_bindgen::JsValue::from_str(content));

        let mut blob_options = web_sys::BlobPropertyBag::new();
        blob_options.type_("application/json");

        let blob = web_sys::Blob::new_with_str_sequence_and_options(&blob_parts, &blob_options)
            .map_err(|_| "Failed to create blob")?;

        let url = web_sys::Url::create_object_url_with_blob(&blob)
            .map_err(|_| "Failed to create object URL")?;

        let anchor = document
            .create_element("a")
            .map_err(|_| "Failed to create anchor element")?
            .dyn_into::<web_sys::HtmlAnchorElement>()
            .map_err(|_| "Failed to cast to anchor element")?;

        anchor.set_href(&url);
        anchor.set_download(filename);
        anchor.style().set_property("display", "none").ok();

        document
            .body()
            .ok_or("No body found")?
            .append_child(&anchor)
            .map_err(|_| "Failed to append anchor")?;

        anchor.click();

        document
            .body()
            .ok_or("No body found")?
            .remove_child(&anchor)
            .map_err(|_| "Failed to remove anchor")?;

        web_sys::Url::revoke_object_url(&url).map_err(|_| "Failed to revoke object URL")?;

        Ok(())
    }

    /// Opens a file picker dialog in the browser (WASM only).
    ///
    /// Creates a temporary file input element and waits for a selection.
    #[cfg(target_arch = "wasm32")]
    async fn show_open_file_picker() -> Option<web_sys::File> {
        use wasm_bindgen::closure::Closure;
        use wasm_bindgen::JsCast;

        let window = web_sys::window()?;
        let document = window.document()?;

        let input = document
            .create_element("input")
            .ok()?
            .dyn_into::<web_sys::HtmlInputElement>()
            .ok()?;

        input.set_type("file");
        input.set_accept(".json,application/json");
        input.style().set_property("display", "none").ok()?;

        let (sender, receiver) = futures::channel::oneshot::channel::<Option<web_sys::File>>();
        let sender = std::rc::Rc::new(std::cell::RefCell::new(Some(sender)));

        let onchange = Closure::wrap(Box::new(move |event: web_sys::Event| {
            let input = event
                .target()
                .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok());

            if let Some(input) = input {
                let file = input.files().and_then(|files| files.get(0));

                if let Some(sender) = sender.borrow_mut().take() {
                    let _ = sender.send(file);
                }
            }
        }) as Box<dyn FnMut(_)>);

        input.set_onchange(Some(onchange.as_ref().unchecked_ref()));
        onchange.forget();

        document.body()?.append_child(&input).ok()?;
        input.click();

        let file = receiver.await.ok()??;

        document.body()?.remove_child(&input).ok()?;

        Some(file)
    }

    /// Reads content from a File object (WASM only).
    #[cfg(target_arch = "wasm32")]
    async fn read_file(file: web_sys::File) -> Result<String, String> {
        use wasm_bindgen::JsCast;
        use wasm_bindgen::JsValue;

        let file_reader =
            web_sys::FileReader::new().map_err(|_| "Failed to create FileReader".to_string())?;

        let promise = js_sys::Promise::new(&mut |resolve, reject| {
            let reader = file_reader.clone();

            let onload = wasm_bindgen::closure::Closure::wrap(Box::new(
                move |_event: web_sys::ProgressEvent| {
                    if let Ok(result) = reader.result() {
                        let _ = resolve.call1(&JsValue::NULL, &result);
                    }
                },
            )
                as Box<dyn FnMut(_)>);

            file_reader.set_onload(Some(onload.as_ref().unchecked_ref()));
            onload.forget();

            let onerror = wasm_bindgen::closure::Closure::wrap(Box::new(
                move |_event: web_sys::ProgressEvent| {
                    let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("Failed to read file"));
                },
            )
                as Box<dyn FnMut(_)>);

            file_reader.set_onerror(Some(onerror.as_ref().unchecked_ref()));
            onerror.forget();
        });

        file_reader
            .read_as_text(&file)
            .map_err(|_| "Failed to start reading file".to_string())?;

        let result = wasm_bindgen_futures::JsFuture::from(promise)
            .await
            .map_err(|e| format!("Failed to read file: {:?}", e))?;

        result
            .as_string()
            .ok_or_else(|| "File content is not a string".to_string())
    }

    /// Opens a file dialog to save the map with a new name.
    pub fn save_as_map(&mut self) {
        self.file.pending_save_operation = Some(PendingSaveOperation::SaveAs);
    }

    /// Saves the map to the current file path, or triggers "Save As" if no
    /// path is set.
    pub fn save_map(&mut self) {
        if self.file.current_path.is_some() {
            self.file.pending_save_operation = Some(PendingSaveOperation::Save);
        } else {
            self.save_as_map();
        }
    }

    /// Opens a file dialog to load a map from disk or browser storage.
    pub fn load_map(&mut self) {
        self.file.pending_load_operation = Some(PendingLoadOperation::Load);
    }

    /// Requests an export of the weighted network-data JSON document.
    pub fn export_network_data(&mut self) {
        self.file.pending_export_operation = true;
    }

    /// Creates a new empty map, resetting all state.
    pub fn new_map(&mut self) {
        self.map = NetworkMap::new();
        self.interaction = Default::default();
        self.file.current_path = None;
        self.file.has_unsaved_changes = false;
        self.canvas.offset = egui::Vec2::ZERO;
        self.canvas.zoom_factor = 1.0;
    }
}
