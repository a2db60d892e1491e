//! Turning a file's selection into something the user can download.

mod archive;
mod fetch;
mod manifest;

pub use archive::{ArchiveExport, ArchiveReport, FailedResolution, build_archive, export_archive};
pub use fetch::{HttpFetcher, ImageFetcher};
pub use manifest::{export_manifest, manifest_text};

/// A finished download, ready to be handed to [`crate::save::save_artifact`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}
