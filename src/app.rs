use std::collections::HashMap;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};

use crate::bridge::{BridgeMode, UploadBridge};
use crate::catalog::{CatalogKind, ResolutionSpec};
use crate::config::{Settings, UploaderConfig};
use crate::delivery::{resize_url, thumbnail_url};
use crate::error::ExportError;
use crate::export::{ArchiveExport, HttpFetcher, ImageFetcher, export_archive, export_manifest};
use crate::format::format_size;
use crate::preview::{PreviewCache, PreviewState};
use crate::registry::{FileDescriptor, FileId, FileRegistry, MergePolicy};
use crate::save::{SaveOutcome, save_artifact};
use crate::selection::SelectionStore;
use crate::uploader::{self, UploaderWidget};

// Box each preview is fitted into
const PREVIEW_BOX: egui::Vec2 = egui::vec2(160.0, 120.0);
const THUMBNAIL_BOX: egui::Vec2 = egui::vec2(100.0, 100.0);

/// Last export attempt for a file, shown on its card.
enum ExportStatus {
    Running,
    Finished(String),
    Failed(String),
}

struct ArchiveDone {
    file: FileId,
    result: Result<ArchiveExport, ExportError>,
}

enum CardAction {
    Remove(FileId),
    Archive(FileDescriptor),
    Manifest(FileDescriptor),
}

pub struct ResizerApp {
    settings: Settings,
    registry: FileRegistry,
    selection: SelectionStore,
    bridge: UploadBridge,
    uploader: Option<Box<dyn UploaderWidget>>,
    uploader_theme: egui::Theme,
    fetcher: Arc<dyn ImageFetcher>,
    previews: PreviewCache,
    status: HashMap<FileId, ExportStatus>,
    archive_tx: Sender<ArchiveDone>,
    archive_rx: Receiver<ArchiveDone>,
}

impl ResizerApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Load previous settings (if any).
        // Note that you must enable the `persistence` feature for this to work.
        let settings: Settings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        uploader::register_components();
        let theme = cc.egui_ctx.theme();
        let widget = uploader::mount(&UploaderConfig::default(), theme);

        Self::with_parts(settings, widget, theme, Arc::new(HttpFetcher::new()))
    }

    fn with_parts(
        settings: Settings,
        uploader: Option<Box<dyn UploaderWidget>>,
        uploader_theme: egui::Theme,
        fetcher: Arc<dyn ImageFetcher>,
    ) -> Self {
        let (archive_tx, archive_rx) = channel();
        Self {
            settings,
            registry: FileRegistry::new(),
            selection: SelectionStore::new(settings.catalog.resolutions()),
            bridge: UploadBridge::new(settings.bridge_mode, settings.merge_policy),
            uploader,
            uploader_theme,
            previews: PreviewCache::new(Arc::clone(&fetcher)),
            fetcher,
            status: HashMap::new(),
            archive_tx,
            archive_rx,
        }
    }

    fn apply_settings(&mut self, previous: Settings) {
        if previous == self.settings {
            return;
        }
        if previous.catalog != self.settings.catalog {
            log::info!("Switched to {} catalog; selections cleared", self.settings.catalog.name());
            self.selection = SelectionStore::new(self.settings.catalog.resolutions());
        }
        self.bridge.set_mode(self.settings.bridge_mode);
        self.bridge.set_policy(self.settings.merge_policy);
    }

    fn sync_uploader_theme(&mut self, ctx: &egui::Context) {
        let theme = ctx.theme();
        if theme != self.uploader_theme {
            if let Some(widget) = self.uploader.as_deref_mut() {
                widget.set_theme(theme);
            }
            self.uploader_theme = theme;
        }
    }

    fn start_archive(&mut self, ctx: &egui::Context, file: FileDescriptor) {
        let selected = self.selection.selected_specs(&file.id);
        self.status.insert(file.id.clone(), ExportStatus::Running);

        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.archive_tx.clone();
        let ctx = ctx.clone();
        crate::task::spawn(async move {
            let result = export_archive(fetcher.as_ref(), &file, &selected).await;
            if tx.send(ArchiveDone { file: file.id, result }).is_ok() {
                ctx.request_repaint();
            }
        });
    }

    fn save_manifest(&mut self, file: &FileDescriptor) {
        let selected = self.selection.selected_specs(&file.id);
        let artifact = export_manifest(file, &selected);
        let status = match save_artifact(&artifact) {
            Ok(outcome) => ExportStatus::Finished(describe_save(
                &outcome,
                &format!("{} resolutions listed", selected.len()),
            )),
            Err(err) => {
                log::error!("Failed to save manifest: {err}");
                ExportStatus::Failed(err.to_string())
            }
        };
        self.status.insert(file.id.clone(), status);
    }

    fn poll_archives(&mut self) {
        while let Ok(ArchiveDone { file, result }) = self.archive_rx.try_recv() {
            let status = match result {
                Ok(export) => match save_artifact(&export.artifact) {
                    Ok(outcome) => ExportStatus::Finished(describe_save(&outcome, &export.report.summary())),
                    Err(err) => {
                        log::error!("Failed to save archive: {err}");
                        ExportStatus::Failed(err.to_string())
                    }
                },
                Err(err) => {
                    log::error!("Failed to generate zip file: {err}");
                    ExportStatus::Failed(err.to_string())
                }
            };
            if self.registry.contains(&file) {
                self.status.insert(file, status);
            }
        }
    }

    fn apply(&mut self, ctx: &egui::Context, action: CardAction) {
        match action {
            CardAction::Remove(id) => {
                if let Some(file) = self.registry.remove(&id) {
                    log::info!("Removed {}", file.name);
                    self.forget(&file);
                }
            }
            CardAction::Archive(file) => self.start_archive(ctx, file),
            CardAction::Manifest(file) => self.save_manifest(&file),
        }
    }

    /// Drops everything kept per file once it has left the registry.
    fn forget(&mut self, file: &FileDescriptor) {
        self.selection.forget(&file.id);
        self.status.remove(&file.id);
        self.previews.forget_file(&file.cdn_url);
    }

    fn pump_uploads(&mut self) {
        let dropped = self.bridge.pump(self.uploader.as_deref_mut(), &mut self.registry);
        for file in dropped {
            log::info!("{} replaced by newer uploads", file.name);
            self.forget(&file);
        }
    }

    fn settings_menu(&mut self, ui: &mut egui::Ui) {
        ui.menu_button("Settings", |ui| {
            egui::ComboBox::from_label("Resolutions")
                .selected_text(self.settings.catalog.name())
                .show_ui(ui, |ui| {
                    for kind in CatalogKind::ALL {
                        ui.selectable_value(&mut self.settings.catalog, kind, kind.name());
                    }
                });
            egui::ComboBox::from_label("Uploads")
                .selected_text(self.settings.bridge_mode.name())
                .show_ui(ui, |ui| {
                    for mode in BridgeMode::ALL {
                        ui.selectable_value(&mut self.settings.bridge_mode, mode, mode.name());
                    }
                });
            egui::ComboBox::from_label("Reopening the uploader")
                .selected_text(self.settings.merge_policy.name())
                .show_ui(ui, |ui| {
                    for policy in MergePolicy::ALL {
                        ui.selectable_value(&mut self.settings.merge_policy, policy, policy.name());
                    }
                });
        });
    }
}

impl eframe::App for ResizerApp {
    /// Called by the framework to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.settings);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.previews.poll(ctx);
        self.poll_archives();
        self.sync_uploader_theme(ctx);
        self.pump_uploads();

        let previous = self.settings;
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                // NOTE: no File->Quit on web pages!
                let is_web = cfg!(target_arch = "wasm32");
                if !is_web {
                    ui.menu_button("File", |ui| {
                        if ui.button("Quit").clicked() {
                            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                        }
                    });
                    ui.add_space(16.0);
                }

                self.settings_menu(ui);
                ui.add_space(16.0);
                egui::widgets::global_theme_preference_buttons(ui);
            });
        });
        self.apply_settings(previous);

        let mut actions = Vec::new();
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Image Resizer");
            if self.uploader.is_none() {
                ui.label("The hosted uploader is only available in the web build.");
            }
            if !self.bridge.pending().is_empty() {
                ui.weak(format!(
                    "{} upload(s) will be added when the uploader closes.",
                    self.bridge.pending().len()
                ));
            }
            ui.separator();

            let files: Vec<FileDescriptor> = self.registry.iter().cloned().collect();
            if files.is_empty() {
                ui.label("Upload photos to pick export sizes.");
            }

            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    if self.bridge.mode() == BridgeMode::Session && !files.is_empty() {
                        if let Some(id) = thumbnail_strip(ui, &files, &mut self.previews) {
                            actions.push(CardAction::Remove(id));
                        }
                        ui.separator();
                    }

                    for file in &files {
                        let status = self.status.get(&file.id);
                        if let Some(action) =
                            file_card(ui, file, &mut self.selection, &mut self.previews, status)
                        {
                            actions.push(action);
                        }
                        ui.add_space(8.0);
                    }
                });

            ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
                powered_by_egui_and_eframe(ui);
                egui::warn_if_debug_build(ui);
            });
        });

        for action in actions {
            self.apply(ctx, action);
        }
    }
}

fn describe_save(outcome: &SaveOutcome, summary: &str) -> String {
    match outcome {
        SaveOutcome::Saved(path) => format!("{summary}. Saved to {path}"),
        SaveOutcome::Downloaded => format!("{summary}. Download started"),
        SaveOutcome::Cancelled => "Save cancelled".to_owned(),
    }
}

/// Scales `size` down (or up, at most 4x) to fit inside `bounds`.
fn fit(size: egui::Vec2, bounds: egui::Vec2) -> egui::Vec2 {
    if size.x <= 0.0 || size.y <= 0.0 {
        return bounds;
    }
    let scale = (bounds.x / size.x).min(bounds.y / size.y).clamp(0.01, 4.0);
    size * scale
}

fn preview_image(ui: &mut egui::Ui, previews: &mut PreviewCache, url: &str, bounds: egui::Vec2) {
    let ctx = ui.ctx().clone();
    match previews.get(&ctx, url) {
        PreviewState::Ready(texture) => {
            let size = fit(texture.size_vec2(), bounds);
            ui.add(egui::Image::new((texture.id(), size)));
        }
        PreviewState::Loading => {
            ui.add_sized(bounds, egui::Spinner::new());
        }
        PreviewState::Failed(err) => {
            ui.add_sized(bounds, egui::Label::new("Preview unavailable"))
                .on_hover_text(err.as_str());
        }
    }
}

/// Upload strip with remove buttons. Returns the file to remove, if any.
fn thumbnail_strip(
    ui: &mut egui::Ui,
    files: &[FileDescriptor],
    previews: &mut PreviewCache,
) -> Option<FileId> {
    let mut removed = None;
    ui.horizontal_wrapped(|ui| {
        for file in files {
            ui.vertical(|ui| {
                preview_image(ui, previews, &thumbnail_url(&file.cdn_url), THUMBNAIL_BOX);
                ui.horizontal(|ui| {
                    ui.small(file.name.as_str());
                    if ui.small_button("×").on_hover_text("Remove").clicked() {
                        removed = Some(file.id.clone());
                    }
                });
            });
        }
    });
    removed
}

fn file_card(
    ui: &mut egui::Ui,
    file: &FileDescriptor,
    selection: &mut SelectionStore,
    previews: &mut PreviewCache,
    status: Option<&ExportStatus>,
) -> Option<CardAction> {
    let mut action = None;
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.heading(file.name.as_str());
        ui.label(format_size(file.size));

        let mut all = selection.is_all_selected(&file.id);
        if ui.checkbox(&mut all, "Select all").changed() {
            selection.set_all(&file.id, all);
        }

        ui.horizontal_wrapped(|ui| {
            for resolution in selection.catalog() {
                resolution_cell(ui, file, resolution, selection, previews);
            }
        });

        ui.horizontal(|ui| {
            let enabled = selection.has_any_selected(&file.id);
            let busy = matches!(status, Some(ExportStatus::Running));
            if ui
                .add_enabled(enabled && !busy, egui::Button::new("Download selected as ZIP"))
                .clicked()
            {
                action = Some(CardAction::Archive(file.clone()));
            }
            if ui
                .add_enabled(enabled, egui::Button::new("Download URLs as CSV"))
                .clicked()
            {
                action = Some(CardAction::Manifest(file.clone()));
            }

            match status {
                Some(ExportStatus::Running) => {
                    ui.spinner();
                    ui.label("Preparing archive…");
                }
                Some(ExportStatus::Finished(message)) => {
                    ui.label(message.as_str());
                }
                Some(ExportStatus::Failed(message)) => {
                    ui.colored_label(egui::Color32::RED, message.as_str());
                }
                None => {}
            }
        });
    });
    action
}

fn resolution_cell(
    ui: &mut egui::Ui,
    file: &FileDescriptor,
    resolution: &ResolutionSpec,
    selection: &mut SelectionStore,
    previews: &mut PreviewCache,
) {
    ui.vertical(|ui| {
        let key = resolution.key();
        let mut checked = selection.is_selected(&file.id, &key);
        let text = format!("{} ({key})", resolution.label);
        if ui.checkbox(&mut checked, text).changed() {
            selection.set_one(&file.id, key, checked);
        }
        let url = resize_url(&file.cdn_url, resolution.width, resolution.height);
        preview_image(ui, previews, &url, PREVIEW_BOX);
    });
}

fn powered_by_egui_and_eframe(ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        ui.label("Powered by ");
        ui.hyperlink_to("egui", "https://github.com/emilk/egui");
        ui.label(" and ");
        ui.hyperlink_to(
            "eframe",
            "https://github.com/emilk/egui/tree/master/crates/eframe",
        );
        ui.label(".");
    });
}
