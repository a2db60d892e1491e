//! URL conventions of the image CDN.
//!
//! Every uploaded file has a base delivery URL; resized variants are
//! requested by appending a processing path to it.

/// Height of the previews shown in the upload strip.
pub const THUMBNAIL_HEIGHT: u32 = 200;

fn trimmed(base: &str) -> &str {
    base.trim_end_matches('/')
}

/// `{base}/-/preview/-/resize/{width}x{height}/`
pub fn resize_url(base: &str, width: u32, height: u32) -> String {
    format!("{}/-/preview/-/resize/{width}x{height}/", trimmed(base))
}

/// Height-constrained preview used for the upload strip.
pub fn thumbnail_url(base: &str) -> String {
    format!("{}/-/preview/-/resize/x{THUMBNAIL_HEIGHT}/", trimmed(base))
}
