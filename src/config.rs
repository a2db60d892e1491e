use crate::bridge::BridgeMode;
use crate::catalog::CatalogKind;
use crate::registry::MergePolicy;

/// User settings, persisted by eframe between runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct Settings {
    pub catalog: CatalogKind,
    pub bridge_mode: BridgeMode,
    pub merge_policy: MergePolicy,
}

/// Static configuration of the hosted uploader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploaderConfig {
    /// Groups the widget's elements; all of them must share it.
    pub ctx_name: &'static str,
    pub public_key: &'static str,
    pub sources: &'static [&'static str],
    pub multiple: bool,
    pub images_only: bool,
    pub confirm_upload: bool,
    pub remove_copyright: bool,
    /// Replacement strings for the widget's English locale.
    pub locale_overrides: &'static [(&'static str, &'static str)],
}

const PHOTO_LOCALE: &[(&str, &str)] = &[
    ("photo__one", "photo"),
    ("photo__many", "photos"),
    ("photo__other", "photos"),
    ("upload-file", "Upload photo"),
    ("upload-files", "Upload photos"),
    ("choose-file", "Choose photo"),
    ("choose-files", "Choose photos"),
    ("drop-files-here", "Drop photos here"),
    ("select-file-source", "Select photo source"),
    ("edit-image", "Edit photo"),
    ("no-files", "No photos selected"),
    ("caption-edit-file", "Edit photo"),
    ("files-count-allowed", "Only {{count}} {{plural:photo(count)}} allowed"),
    ("files-max-size-limit-error", "Photo is too big. Max photo size is {{maxFileSize}}."),
    ("header-uploading", "Uploading {{count}} {{plural:photo(count)}}"),
    ("header-succeed", "{{count}} {{plural:photo(count)}} uploaded"),
    ("header-total", "{{count}} {{plural:photo(count)}} selected"),
];

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            ctx_name: "resize-exporter-uploader",
            public_key: "a6ca334c3520777c0045",
            sources: &["local", "url", "camera", "dropbox", "gdrive"],
            multiple: true,
            images_only: true,
            confirm_upload: false,
            remove_copyright: true,
            locale_overrides: PHOTO_LOCALE,
        }
    }
}

impl UploaderConfig {
    /// Value of the `source-list` attribute.
    pub fn source_list(&self) -> String {
        self.sources.join(", ")
    }

    /// Attributes for the `uc-config` element.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ctx-name", self.ctx_name.to_owned()),
            ("pubkey", self.public_key.to_owned()),
            ("multiple", self.multiple.to_string()),
            ("source-list", self.source_list()),
            ("confirm-upload", self.confirm_upload.to_string()),
            ("remove-copyright", self.remove_copyright.to_string()),
            ("img-only", self.images_only.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_survive_a_round_trip_and_tolerate_missing_fields() {
        let settings = Settings {
            catalog: CatalogKind::Banner,
            bridge_mode: BridgeMode::Session,
            merge_policy: MergePolicy::Replace,
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(serde_json::from_str::<Settings>(&json).unwrap(), settings);

        let partial: Settings = serde_json::from_str(r#"{"catalog":"Banner"}"#).unwrap();
        assert_eq!(partial.catalog, CatalogKind::Banner);
        assert_eq!(partial.bridge_mode, BridgeMode::Gallery);
    }

    #[test]
    fn uploader_attributes_reflect_config() {
        let config = UploaderConfig::default();
        let attributes = config.attributes();
        let get = |name: &str| {
            attributes
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.as_str())
        };
        assert_eq!(get("source-list"), Some("local, url, camera, dropbox, gdrive"));
        assert_eq!(get("img-only"), Some("true"));
        assert_eq!(get("confirm-upload"), Some("false"));
        assert_eq!(get("ctx-name"), Some(config.ctx_name));
    }
}
