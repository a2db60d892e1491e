//! Mirrors the uploader's file list into the [`FileRegistry`].

use crate::registry::{FileDescriptor, FileRegistry, MergePolicy};
use crate::uploader::{UploaderEntry, UploaderEvent, UploaderWidget};

/// When uploads become visible in the registry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum BridgeMode {
    /// Every `change` lands in the registry right away.
    #[default]
    Gallery,
    /// Uploads are held until the dialog closes; files can be removed afterwards.
    Session,
}

impl BridgeMode {
    pub const ALL: [Self; 2] = [Self::Gallery, Self::Session];

    pub fn name(self) -> &'static str {
        match self {
            Self::Gallery => "Gallery",
            Self::Session => "Upload session",
        }
    }
}

#[derive(Debug, Default)]
pub struct UploadBridge {
    mode: BridgeMode,
    policy: MergePolicy,
    /// Successful uploads of the open dialog (session mode only).
    pending: Vec<FileDescriptor>,
}

impl UploadBridge {
    pub fn new(mode: BridgeMode, policy: MergePolicy) -> Self {
        Self {
            mode,
            policy,
            pending: Vec::new(),
        }
    }

    pub fn mode(&self) -> BridgeMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: BridgeMode) {
        self.mode = mode;
    }

    pub fn set_policy(&mut self, policy: MergePolicy) {
        self.policy = policy;
    }

    /// Uploads waiting for the dialog to close.
    pub fn pending(&self) -> &[FileDescriptor] {
        &self.pending
    }

    /// Applies everything the widget reported since the last pump.
    ///
    /// Without a mounted widget this does nothing; it is called every frame
    /// so events are picked up as soon as one exists. Returns the files a
    /// replace pushed out of the registry.
    pub fn pump(
        &mut self,
        widget: Option<&mut (dyn UploaderWidget + 'static)>,
        registry: &mut FileRegistry,
    ) -> Vec<FileDescriptor> {
        let Some(widget) = widget else {
            return Vec::new();
        };
        let mut dropped = Vec::new();
        for event in widget.drain_events() {
            dropped.extend(self.handle(event, widget, registry));
        }
        dropped
    }

    pub fn handle(
        &mut self,
        event: UploaderEvent,
        widget: &mut (dyn UploaderWidget + '_),
        registry: &mut FileRegistry,
    ) -> Vec<FileDescriptor> {
        match event {
            UploaderEvent::Change(entries) => {
                let uploaded = successful(&entries);
                match self.mode {
                    // An empty snapshot is what the widget reports after a reset
                    // or before the first upload finishes; it never clears the gallery.
                    BridgeMode::Gallery if uploaded.is_empty() => Vec::new(),
                    BridgeMode::Gallery => {
                        let applied = registry.apply(self.policy, uploaded);
                        if applied.added > 0 {
                            log::info!("{} uploaded file(s) added", applied.added);
                        }
                        applied.dropped
                    }
                    BridgeMode::Session => {
                        self.pending = uploaded;
                        Vec::new()
                    }
                }
            }
            UploaderEvent::ModalClose => {
                widget.remove_all_files();
                let uploaded = std::mem::take(&mut self.pending);
                if uploaded.is_empty() {
                    return Vec::new();
                }
                let applied = registry.apply(self.policy, uploaded);
                log::info!("Upload dialog closed, {} file(s) added", applied.added);
                applied.dropped
            }
        }
    }
}

fn successful(entries: &[UploaderEntry]) -> Vec<FileDescriptor> {
    entries.iter().filter_map(FileDescriptor::from_entry).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uploader::EntryStatus;

    #[derive(Default)]
    struct FakeWidget {
        queued: Vec<UploaderEvent>,
        resets: usize,
        /// Report the emptied list after a reset, like the hosted widget does.
        echo_reset: bool,
    }

    impl UploaderWidget for FakeWidget {
        fn drain_events(&mut self) -> Vec<UploaderEvent> {
            std::mem::take(&mut self.queued)
        }

        fn remove_all_files(&mut self) {
            self.resets += 1;
            if self.echo_reset {
                self.queued.push(UploaderEvent::Change(Vec::new()));
            }
        }
    }

    fn entry(id: &str, status: EntryStatus) -> UploaderEntry {
        UploaderEntry {
            status,
            uuid: Some(id.to_owned()),
            cdn_url: Some(format!("https://ucarecdn.com/{id}/")),
            name: Some(format!("{id}.jpg")),
            size: Some(100),
            file_info: None,
        }
    }

    fn ids(registry: &FileRegistry) -> Vec<&str> {
        registry.iter().map(|file| file.id.as_str()).collect()
    }

    #[test]
    fn missing_widget_is_a_no_op() {
        let mut bridge = UploadBridge::default();
        let mut registry = FileRegistry::new();
        bridge.pump(None, &mut registry);
        assert!(registry.is_empty());
    }

    #[test]
    fn gallery_merges_successful_entries_by_id() {
        let change = UploaderEvent::Change(vec![
            entry("a", EntryStatus::Success),
            entry("x", EntryStatus::Uploading),
            entry("b", EntryStatus::Success),
        ]);
        let mut widget = FakeWidget {
            queued: vec![change.clone(), change],
            ..Default::default()
        };
        let mut bridge = UploadBridge::new(BridgeMode::Gallery, MergePolicy::Append);
        let mut registry = FileRegistry::new();

        bridge.pump(Some(&mut widget), &mut registry);

        assert_eq!(ids(&registry), ["a", "b"]);
        assert_eq!(widget.resets, 0);
    }

    #[test]
    fn gallery_replace_policy_keeps_latest_snapshot() {
        let mut widget = FakeWidget {
            queued: vec![
                UploaderEvent::Change(vec![entry("a", EntryStatus::Success)]),
                UploaderEvent::Change(vec![entry("b", EntryStatus::Success)]),
            ],
            ..Default::default()
        };
        let mut bridge = UploadBridge::new(BridgeMode::Gallery, MergePolicy::Replace);
        let mut registry = FileRegistry::new();

        bridge.pump(Some(&mut widget), &mut registry);

        assert_eq!(ids(&registry), ["b"]);
    }

    #[test]
    fn session_holds_uploads_until_close() {
        let mut widget = FakeWidget {
            queued: vec![
                UploaderEvent::Change(vec![entry("a", EntryStatus::Success)]),
                UploaderEvent::Change(vec![
                    entry("a", EntryStatus::Success),
                    entry("b", EntryStatus::Success),
                ]),
            ],
            ..Default::default()
        };
        let mut bridge = UploadBridge::new(BridgeMode::Session, MergePolicy::Append);
        let mut registry = FileRegistry::new();

        bridge.pump(Some(&mut widget), &mut registry);
        assert!(registry.is_empty());
        assert_eq!(bridge.pending().len(), 2);

        widget.queued.push(UploaderEvent::ModalClose);
        bridge.pump(Some(&mut widget), &mut registry);

        assert_eq!(ids(&registry), ["a", "b"]);
        assert!(bridge.pending().is_empty());
        assert_eq!(widget.resets, 1);
    }

    #[test]
    fn reopening_the_dialog_adds_to_existing_files() {
        let mut widget = FakeWidget::default();
        let mut bridge = UploadBridge::new(BridgeMode::Session, MergePolicy::Append);
        let mut registry = FileRegistry::new();

        for id in ["a", "b"] {
            widget.queued.push(UploaderEvent::Change(vec![entry(id, EntryStatus::Success)]));
            widget.queued.push(UploaderEvent::ModalClose);
            bridge.pump(Some(&mut widget), &mut registry);
        }

        assert_eq!(ids(&registry), ["a", "b"]);
        assert_eq!(widget.resets, 2);
    }

    #[test]
    fn close_without_uploads_still_resets_widget() {
        let mut widget = FakeWidget {
            queued: vec![UploaderEvent::ModalClose],
            ..Default::default()
        };
        let mut bridge = UploadBridge::new(BridgeMode::Gallery, MergePolicy::Replace);
        let mut registry = FileRegistry::new();
        registry.merge(FileDescriptor::from_entry(&entry("keep", EntryStatus::Success)));

        bridge.pump(Some(&mut widget), &mut registry);

        assert_eq!(ids(&registry), ["keep"]);
        assert_eq!(widget.resets, 1);
    }

    #[test]
    fn reset_echo_keeps_replaced_gallery() {
        let mut widget = FakeWidget {
            queued: vec![
                UploaderEvent::Change(vec![
                    entry("a", EntryStatus::Success),
                    entry("b", EntryStatus::Success),
                ]),
                UploaderEvent::ModalClose,
            ],
            echo_reset: true,
            ..Default::default()
        };
        let mut bridge = UploadBridge::new(BridgeMode::Gallery, MergePolicy::Replace);
        let mut registry = FileRegistry::new();

        bridge.pump(Some(&mut widget), &mut registry);
        assert_eq!(widget.queued.len(), 1);
        let dropped = bridge.pump(Some(&mut widget), &mut registry);

        assert_eq!(ids(&registry), ["a", "b"]);
        assert!(dropped.is_empty());
    }

    #[test]
    fn replace_reports_files_it_pushed_out() {
        let mut widget = FakeWidget {
            queued: vec![
                UploaderEvent::Change(vec![entry("a", EntryStatus::Success)]),
                UploaderEvent::ModalClose,
            ],
            echo_reset: true,
            ..Default::default()
        };
        let mut bridge = UploadBridge::new(BridgeMode::Session, MergePolicy::Replace);
        let mut registry = FileRegistry::new();
        bridge.pump(Some(&mut widget), &mut registry);

        widget.queued.push(UploaderEvent::Change(vec![entry("b", EntryStatus::Success)]));
        widget.queued.push(UploaderEvent::ModalClose);
        let dropped = bridge.pump(Some(&mut widget), &mut registry);

        let dropped: Vec<_> = dropped.iter().map(|file| file.id.as_str()).collect();
        assert_eq!(dropped, ["a"]);
        assert_eq!(ids(&registry), ["b"]);
    }
}
