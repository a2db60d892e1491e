use std::borrow::Cow;

use super::ExportArtifact;
use crate::catalog::ResolutionSpec;
use crate::delivery::resize_url;
use crate::registry::FileDescriptor;

pub const MANIFEST_MIME: &str = "text/csv;charset=utf-8";
const HEADER: &str = "label,width,height,url";

/// Quotes a field when it holds a delimiter, quote or line break (RFC 4180).
fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// CSV listing every selected resolution of `file` and its resize URL.
///
/// Rows are separated by `\n` with no trailing newline.
pub fn manifest_text(file: &FileDescriptor, selected: &[ResolutionSpec]) -> String {
    let mut rows = Vec::with_capacity(selected.len() + 1);
    rows.push(HEADER.to_owned());
    for resolution in selected {
        let url = resize_url(&file.cdn_url, resolution.width, resolution.height);
        rows.push(format!(
            "{},{},{},{}",
            escape(resolution.label),
            resolution.width,
            resolution.height,
            escape(&url)
        ));
    }
    rows.join("\n")
}

pub fn export_manifest(file: &FileDescriptor, selected: &[ResolutionSpec]) -> ExportArtifact {
    ExportArtifact {
        file_name: format!("{}_resolutions.csv", file.name),
        mime: MANIFEST_MIME,
        bytes: manifest_text(file, selected).into_bytes(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FileId;

    fn file() -> FileDescriptor {
        FileDescriptor {
            id: FileId::new("f1"),
            name: "cat.jpg".to_owned(),
            size: 0,
            cdn_url: "https://ucarecdn.com/f1".to_owned(),
        }
    }

    #[test]
    fn single_selection_yields_header_and_one_row() {
        let selected = [ResolutionSpec::new(200, 200, "Thumb")];
        let text = manifest_text(&file(), &selected);
        assert_eq!(
            text,
            "label,width,height,url\nThumb,200,200,https://ucarecdn.com/f1/-/preview/-/resize/200x200/"
        );
    }

    #[test]
    fn one_row_per_selection() {
        let selected = [
            ResolutionSpec::new(200, 200, "Thumb"),
            ResolutionSpec::new(800, 600, "Small"),
            ResolutionSpec::new(1920, 1080, "Full HD"),
        ];
        let text = manifest_text(&file(), &selected);
        assert_eq!(text.lines().count(), selected.len() + 1);
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn labels_with_delimiters_are_quoted() {
        let selected = [ResolutionSpec::new(300, 250, "Rectangle, \"medium\"")];
        let text = manifest_text(&file(), &selected);
        let row = text.lines().nth(1).unwrap();
        assert!(row.starts_with("\"Rectangle, \"\"medium\"\"\",300,250,"));
    }

    #[test]
    fn artifact_is_named_after_the_file() {
        let artifact = export_manifest(&file(), &[]);
        assert_eq!(artifact.file_name, "cat.jpg_resolutions.csv");
        assert_eq!(artifact.mime, "text/csv;charset=utf-8");
        assert_eq!(artifact.bytes, b"label,width,height,url");
    }
}
