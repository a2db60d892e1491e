use std::io::{Cursor, Write as _};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::{ExportArtifact, ImageFetcher};
use crate::catalog::ResolutionSpec;
use crate::delivery::resize_url;
use crate::error::ExportError;
use crate::registry::FileDescriptor;

pub const ARCHIVE_MIME: &str = "application/zip";

/// A resolution left out of an archive and why.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailedResolution {
    pub resolution: ResolutionSpec,
    pub reason: String,
}

/// What went into an archive.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArchiveReport {
    pub included: Vec<ResolutionSpec>,
    pub failed: Vec<FailedResolution>,
}

impl ArchiveReport {
    pub fn requested(&self) -> usize {
        self.included.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// e.g. `"3 of 5 images included; 2 failed"`.
    pub fn summary(&self) -> String {
        let included = self.included.len();
        let requested = self.requested();
        if self.is_complete() {
            format!("{included} of {requested} images included")
        } else {
            format!(
                "{included} of {requested} images included; {} failed",
                self.failed.len()
            )
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveExport {
    pub artifact: ExportArtifact,
    pub report: ArchiveReport,
}

/// Name of the archive entry holding `file` at `resolution`.
pub fn entry_name(file: &FileDescriptor, resolution: &ResolutionSpec) -> String {
    format!("{}_{}.jpg", file.name, resolution.key())
}

/// Fetches every selected resolution of `file` and zips the results.
///
/// Resolutions are fetched one after another and keep the order of
/// `selected`. A resolution whose fetch fails is logged and left out; the
/// archive is still produced from the rest.
pub async fn export_archive(
    fetcher: &dyn ImageFetcher,
    file: &FileDescriptor,
    selected: &[ResolutionSpec],
) -> Result<ArchiveExport, ExportError> {
    let mut entries = Vec::with_capacity(selected.len());
    let mut report = ArchiveReport::default();

    for resolution in selected {
        let url = resize_url(&file.cdn_url, resolution.width, resolution.height);
        match fetcher.fetch(&url).await {
            Ok(bytes) => {
                entries.push((entry_name(file, resolution), bytes));
                report.included.push(*resolution);
            }
            Err(err) => {
                log::warn!("Failed to download image: {} ({err})", resolution.label);
                report.failed.push(FailedResolution {
                    resolution: *resolution,
                    reason: err.to_string(),
                });
            }
        }
    }

    let bytes = build_archive(&entries)?;
    log::info!("Built archive for {}: {}", file.name, report.summary());

    Ok(ArchiveExport {
        artifact: ExportArtifact {
            file_name: format!("{}_images.zip", file.name),
            mime: ARCHIVE_MIME,
            bytes,
        },
        report,
    })
}

/// Writes named entries into an in-memory, deflate-compressed zip.
pub fn build_archive(entries: &[(String, Vec<u8>)]) -> Result<Vec<u8>, ExportError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, bytes) in entries {
        zip.start_file(name.as_str(), options)?;
        zip.write_all(bytes)?;
    }

    Ok(zip.finish()?.into_inner())
}
