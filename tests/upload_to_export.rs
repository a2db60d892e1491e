//! Upload events flowing through to both export formats.

use std::io::Cursor;

use async_trait::async_trait;
use resize_exporter::bridge::{BridgeMode, UploadBridge};
use resize_exporter::catalog::{ResolutionKey, ResolutionSpec, STANDARD_RESOLUTIONS};
use resize_exporter::error::FetchError;
use resize_exporter::export::{ImageFetcher, export_archive, manifest_text};
use resize_exporter::registry::{FileId, FileRegistry, MergePolicy};
use resize_exporter::selection::SelectionStore;
use resize_exporter::uploader::{EntryStatus, FileInfo, UploaderEntry, UploaderEvent, UploaderWidget};

const CATALOG: &[ResolutionSpec] = &[
    ResolutionSpec::new(200, 200, "Thumb"),
    ResolutionSpec::new(800, 600, "Small"),
];

#[derive(Default)]
struct ScriptedWidget {
    queued: Vec<UploaderEvent>,
    resets: usize,
}

impl UploaderWidget for ScriptedWidget {
    fn drain_events(&mut self) -> Vec<UploaderEvent> {
        std::mem::take(&mut self.queued)
    }

    fn remove_all_files(&mut self) {
        self.resets += 1;
    }
}

/// Fails every URL that mentions `broken`.
struct FlakyCdn {
    broken: &'static str,
}

#[async_trait]
impl ImageFetcher for FlakyCdn {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if url.contains(self.broken) {
            Err(FetchError::Status {
                status: 500,
                url: url.to_owned(),
            })
        } else {
            Ok(vec![0xFF, 0xD8, 0xFF])
        }
    }
}

fn uploaded(id: &str, name: &str) -> UploaderEntry {
    UploaderEntry {
        status: EntryStatus::Success,
        uuid: Some(id.to_owned()),
        cdn_url: Some(format!("https://ucarecdn.com/{id}/")),
        name: None,
        size: None,
        file_info: Some(FileInfo {
            original_filename: Some(name.to_owned()),
            size: Some(1536),
        }),
    }
}

#[test]
fn repeated_change_events_do_not_duplicate_files() {
    let change = UploaderEvent::Change(vec![uploaded("f1", "one.jpg"), uploaded("f2", "two.jpg")]);
    let mut widget = ScriptedWidget {
        queued: vec![change.clone()],
        ..Default::default()
    };
    let mut bridge = UploadBridge::new(BridgeMode::Gallery, MergePolicy::Append);
    let mut registry = FileRegistry::new();

    bridge.pump(Some(&mut widget), &mut registry);
    widget.queued.push(change);
    bridge.pump(Some(&mut widget), &mut registry);

    let names: Vec<_> = registry.iter().map(|file| file.name.as_str()).collect();
    assert_eq!(names, ["one.jpg", "two.jpg"]);
}

#[test]
fn selecting_thumb_only_yields_one_manifest_row() {
    let mut widget = ScriptedWidget {
        queued: vec![UploaderEvent::Change(vec![uploaded("f1", "one.jpg")])],
        ..Default::default()
    };
    let mut bridge = UploadBridge::default();
    let mut registry = FileRegistry::new();
    bridge.pump(Some(&mut widget), &mut registry);

    let file = registry.get(&FileId::new("f1")).unwrap();
    let mut selection = SelectionStore::new(CATALOG);
    selection.set_one(&file.id, ResolutionKey::new(200, 200), true);

    let text = manifest_text(file, &selection.selected_specs(&file.id));
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1], "Thumb,200,200,https://ucarecdn.com/f1/-/preview/-/resize/200x200/");
}

#[tokio::test]
async fn archive_and_manifest_agree_on_selection_size() {
    let mut registry = FileRegistry::new();
    let mut bridge = UploadBridge::new(BridgeMode::Session, MergePolicy::Append);
    let mut widget = ScriptedWidget {
        queued: vec![
            UploaderEvent::Change(vec![uploaded("f1", "one.jpg")]),
            UploaderEvent::ModalClose,
        ],
        ..Default::default()
    };
    bridge.pump(Some(&mut widget), &mut registry);
    assert_eq!(widget.resets, 1);

    let file = registry.get(&FileId::new("f1")).unwrap().clone();
    let mut selection = SelectionStore::new(STANDARD_RESOLUTIONS);
    selection.set_all(&file.id, true);
    selection.set_one(&file.id, ResolutionKey::new(800, 600), false);
    let selected = selection.selected_specs(&file.id);
    assert_eq!(selected.len(), 4);

    let cdn = FlakyCdn { broken: "1920x1080" };
    let export = export_archive(&cdn, &file, &selected).await.unwrap();
    let archive = zip::ZipArchive::new(Cursor::new(export.artifact.bytes)).unwrap();
    assert_eq!(archive.len(), 3);
    assert_eq!(export.report.summary(), "3 of 4 images included; 1 failed");

    let manifest = manifest_text(&file, &selected);
    assert_eq!(manifest.lines().count() - 1, selected.len());
}
