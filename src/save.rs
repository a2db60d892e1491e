//! Offering an export to the user as a download.

use crate::error::SaveError;
use crate::export::ExportArtifact;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written to disk at this path.
    Saved(String),
    /// Handed to the browser's download flow.
    Downloaded,
    /// The user dismissed the save dialog.
    Cancelled,
}

#[cfg(not(target_arch = "wasm32"))]
pub fn save_artifact(artifact: &ExportArtifact) -> Result<SaveOutcome, SaveError> {
    let extension = std::path::Path::new(&artifact.file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_owned();

    let Some(path) = rfd::FileDialog::new()
        .set_file_name(artifact.file_name.as_str())
        .add_filter(extension.to_uppercase(), &[extension.as_str()])
        .save_file()
    else {
        return Ok(SaveOutcome::Cancelled);
    };

    std::fs::write(&path, &artifact.bytes)?;
    log::info!("Saved {} ({} bytes)", path.display(), artifact.bytes.len());
    Ok(SaveOutcome::Saved(path.to_string_lossy().to_string()))
}

/// How long an offered download's object url stays valid after the click.
#[cfg(target_arch = "wasm32")]
const REVOKE_DELAY_MS: i32 = 40_000;

#[cfg(target_arch = "wasm32")]
fn js_err(value: wasm_bindgen::JsValue) -> SaveError {
    SaveError::Web(format!("{value:?}"))
}

/// Revokes the object url `url` after `delay_ms`.
#[cfg(target_arch = "wasm32")]
fn revoke_later(window: &web_sys::Window, url: String, delay_ms: i32) -> Result<(), SaveError> {
    use wasm_bindgen::JsCast as _;
    use wasm_bindgen::closure::Closure;

    let revoke = Closure::once_into_js(move || {
        if let Err(err) = web_sys::Url::revoke_object_url(&url) {
            log::warn!("Could not revoke {url}: {err:?}");
        }
    });
    window
        .set_timeout_with_callback_and_timeout_and_arguments_0(revoke.unchecked_ref(), delay_ms)
        .map_err(js_err)?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
pub fn save_artifact(artifact: &ExportArtifact) -> Result<SaveOutcome, SaveError> {
    use js_sys::{Array, Uint8Array};
    use wasm_bindgen::JsCast as _;
    use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

    let window = web_sys::window().ok_or_else(|| SaveError::Web("no window".to_owned()))?;
    let document = window
        .document()
        .ok_or_else(|| SaveError::Web("no document".to_owned()))?;
    let body = document
        .body()
        .ok_or_else(|| SaveError::Web("no body".to_owned()))?;

    let parts = Array::new();
    parts.push(&Uint8Array::from(artifact.bytes.as_slice()));
    let options = BlobPropertyBag::new();
    options.set_type(artifact.mime);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(js_err)?;
    let url = Url::create_object_url_with_blob(&blob).map_err(js_err)?;

    let anchor = document
        .create_element("a")
        .map_err(js_err)?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|_| SaveError::Web("<a> is not an anchor element".to_owned()))?;
    anchor.set_href(&url);
    anchor.set_download(&artifact.file_name);
    anchor.set_attribute("style", "display: none").map_err(js_err)?;

    body.append_child(&anchor).map_err(js_err)?;
    anchor.click();
    anchor.remove();
    revoke_later(&window, url, REVOKE_DELAY_MS)?;

    log::info!("Offered {} ({} bytes)", artifact.file_name, artifact.bytes.len());
    Ok(SaveOutcome::Downloaded)
}
