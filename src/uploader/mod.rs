//! Seam to the hosted upload widget.
//!
//! The widget owns file intake, storage and its own dialog. We only see the
//! events it emits and one imperative call to reset it.

use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(target_arch = "wasm32")]
pub mod web;

/// Upload state reported by the widget for one entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    #[default]
    Idle,
    Uploading,
    Success,
    Failed,
    Removed,
    #[serde(other)]
    Unknown,
}

/// Metadata the CDN knows once an upload has finished.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileInfo {
    pub original_filename: Option<String>,
    pub size: Option<u64>,
}

/// One element of the widget's `allEntries` list.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UploaderEntry {
    pub status: EntryStatus,
    pub uuid: Option<String>,
    pub cdn_url: Option<String>,
    pub name: Option<String>,
    pub size: Option<u64>,
    pub file_info: Option<FileInfo>,
}

/// `detail` of the widget's `change` event.
#[derive(Clone, Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangeDetail {
    pub all_entries: Vec<UploaderEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploaderEvent {
    /// Full snapshot of the widget's entries.
    Change(Vec<UploaderEntry>),
    /// The upload dialog was dismissed.
    ModalClose,
}

/// A mounted upload widget.
pub trait UploaderWidget {
    /// Events received since the last call, oldest first.
    fn drain_events(&mut self) -> Vec<UploaderEvent>;

    /// Forget every tracked file so the next dialog starts empty.
    fn remove_all_files(&mut self);

    /// Follow the app's light/dark theme.
    fn set_theme(&mut self, _theme: egui::Theme) {}
}

static COMPONENTS_REGISTERED: AtomicBool = AtomicBool::new(false);

/// Registers the widget's custom elements. Only the first call does any work.
///
/// Returns `true` if this call performed the registration.
pub fn register_components() -> bool {
    if COMPONENTS_REGISTERED
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        return false;
    }

    #[cfg(target_arch = "wasm32")]
    if let Err(err) = web::define_components() {
        log::error!("Failed to register uploader components: {err}");
    }

    #[cfg(not(target_arch = "wasm32"))]
    log::debug!("Hosted uploader is web-only; nothing to register");

    true
}

/// Mounts the platform's uploader, if it has one.
#[cfg(target_arch = "wasm32")]
pub fn mount(
    config: &crate::config::UploaderConfig,
    theme: egui::Theme,
) -> Option<Box<dyn UploaderWidget>> {
    match web::WebUploader::mount(config, theme) {
        Ok(widget) => Some(Box::new(widget)),
        Err(err) => {
            log::error!("Failed to mount uploader: {err}");
            None
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn mount(
    _config: &crate::config::UploaderConfig,
    _theme: egui::Theme,
) -> Option<Box<dyn UploaderWidget>> {
    log::info!("Hosted uploader is not available in native builds");
    None
}
