// Browser side of the hosted uploader: custom elements are created in the DOM next to the
// egui canvas, and their events are queued until the next frame drains them.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;
use std::rc::Rc;

use js_sys::{Function, JSON, Object, Reflect};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::JsFuture;
use web_sys::{CustomEvent, Document, Element, Event};

use super::{UploaderEntry, UploaderEvent, UploaderWidget};
use crate::config::UploaderConfig;
use crate::error::UploaderError;

const UPLOADER_MODULE: &str =
    "https://cdn.jsdelivr.net/npm/@uploadcare/file-uploader@v1/web/file-uploader.min.js";

// Keep the widget above the canvas, top right, clear of the menu bar.
const CONTAINER_STYLE: &str = "position: fixed; top: 36px; right: 16px; z-index: 10;";

type EventQueue = Rc<RefCell<VecDeque<UploaderEvent>>>;

fn dom(value: JsValue) -> UploaderError {
    UploaderError::Dom(format!("{value:?}"))
}

fn document() -> Result<Document, UploaderError> {
    web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| UploaderError::Dom("no document".to_owned()))
}

/// Loads the widget bundle and defines its custom elements.
pub(super) fn define_components() -> Result<(), UploaderError> {
    let document = document()?;
    let script = document.create_element("script").map_err(dom)?;
    script.set_attribute("type", "module").map_err(dom)?;
    script.set_text_content(Some(&format!(
        "import * as UC from '{UPLOADER_MODULE}';\nUC.defineComponents(UC);"
    )));
    let body = document
        .body()
        .ok_or_else(|| UploaderError::Dom("no body".to_owned()))?;
    body.append_child(&script).map_err(dom)?;
    log::debug!("Uploader components requested from {UPLOADER_MODULE}");
    Ok(())
}

fn theme_class(theme: egui::Theme) -> &'static str {
    match theme {
        egui::Theme::Dark => "uc-dark",
        egui::Theme::Light => "uc-light",
    }
}

fn locale_override(config: &UploaderConfig) -> Result<Object, UploaderError> {
    let strings = Object::new();
    for (key, value) in config.locale_overrides {
        Reflect::set(&strings, &JsValue::from_str(key), &JsValue::from_str(value)).map_err(dom)?;
    }
    let locales = Object::new();
    Reflect::set(&locales, &JsValue::from_str("en"), &strings).map_err(dom)?;
    Ok(locales)
}

/// Sets `property` on `element` once the custom element `tag` is defined.
///
/// The bundle defines its elements asynchronously. A property set on the plain,
/// not yet upgraded element would shadow the component's own accessor.
fn set_when_defined(
    element: &Element,
    tag: &str,
    property: &'static str,
    value: JsValue,
) -> Result<impl Future<Output = Result<(), UploaderError>> + use<>, UploaderError> {
    let defined = web_sys::window()
        .ok_or_else(|| UploaderError::Dom("no window".to_owned()))?
        .custom_elements()
        .when_defined(tag)
        .map_err(dom)?;
    let element = element.clone();
    Ok(async move {
        JsFuture::from(defined).await.map_err(dom)?;
        Reflect::set(&element, &JsValue::from_str(property), &value).map_err(dom)?;
        Ok(())
    })
}

fn parse_change(event: &Event) -> Result<Vec<UploaderEntry>, UploaderError> {
    let detail = event
        .dyn_ref::<CustomEvent>()
        .map(CustomEvent::detail)
        .ok_or_else(|| UploaderError::Dom("change event without detail".to_owned()))?;
    let entries = Reflect::get(&detail, &JsValue::from_str("allEntries")).map_err(dom)?;
    let json = String::from(JSON::stringify(&entries).map_err(dom)?);
    Ok(serde_json::from_str(&json)?)
}

/// Calls `target.name()` and returns its result.
fn call_method(target: &JsValue, name: &str) -> Result<JsValue, UploaderError> {
    let method = Reflect::get(target, &JsValue::from_str(name))
        .map_err(dom)?
        .dyn_into::<Function>()
        .map_err(|_| UploaderError::Dom(format!("{name} is not available yet")))?;
    method.call0(target).map_err(dom)
}

pub struct WebUploader {
    container: Element,
    uploader: Element,
    ctx_provider: Element,
    events: EventQueue,
    on_change: Closure<dyn FnMut(Event)>,
    on_close: Closure<dyn FnMut(Event)>,
}

impl WebUploader {
    pub fn mount(config: &UploaderConfig, theme: egui::Theme) -> Result<Self, UploaderError> {
        super::register_components();

        let document = document()?;
        let container = document.create_element("div").map_err(dom)?;
        container.set_attribute("style", CONTAINER_STYLE).map_err(dom)?;

        let config_el = document.create_element("uc-config").map_err(dom)?;
        for (name, value) in config.attributes() {
            config_el.set_attribute(name, &value).map_err(dom)?;
        }
        let locale = set_when_defined(
            &config_el,
            "uc-config",
            "localeDefinitionOverride",
            locale_override(config)?.into(),
        )?;
        crate::task::spawn(async move {
            if let Err(err) = locale.await {
                log::warn!("Uploader wording not applied: {err}");
            }
        });

        let uploader = document.create_element("uc-file-uploader-regular").map_err(dom)?;
        uploader.set_attribute("ctx-name", config.ctx_name).map_err(dom)?;
        uploader.set_class_name(theme_class(theme));

        let ctx_provider = document.create_element("uc-upload-ctx-provider").map_err(dom)?;
        ctx_provider.set_attribute("ctx-name", config.ctx_name).map_err(dom)?;

        for child in [&config_el, &uploader, &ctx_provider] {
            container.append_child(child).map_err(dom)?;
        }
        document
            .body()
            .ok_or_else(|| UploaderError::Dom("no body".to_owned()))?
            .append_child(&container)
            .map_err(dom)?;

        let events = EventQueue::default();

        let queue = Rc::clone(&events);
        let on_change = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            match parse_change(&event) {
                Ok(entries) => queue.borrow_mut().push_back(UploaderEvent::Change(entries)),
                Err(err) => log::error!("Ignoring uploader change event: {err}"),
            }
        });
        let queue = Rc::clone(&events);
        let on_close = Closure::<dyn FnMut(Event)>::new(move |_event: Event| {
            queue.borrow_mut().push_back(UploaderEvent::ModalClose);
        });

        ctx_provider
            .add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())
            .map_err(dom)?;
        ctx_provider
            .add_event_listener_with_callback("modal-close", on_close.as_ref().unchecked_ref())
            .map_err(dom)?;

        log::info!("Uploader mounted (ctx {})", config.ctx_name);
        Ok(Self {
            container,
            uploader,
            ctx_provider,
            events,
            on_change,
            on_close,
        })
    }
}

impl UploaderWidget for WebUploader {
    fn drain_events(&mut self) -> Vec<UploaderEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    fn remove_all_files(&mut self) {
        let result = call_method(&self.ctx_provider, "getAPI")
            .and_then(|api| call_method(&api, "removeAllFiles"));
        if let Err(err) = result {
            log::warn!("Could not reset uploader: {err}");
        }
    }

    fn set_theme(&mut self, theme: egui::Theme) {
        self.uploader.set_class_name(theme_class(theme));
    }
}

impl Drop for WebUploader {
    fn drop(&mut self) {
        let _ = self
            .ctx_provider
            .remove_event_listener_with_callback("change", self.on_change.as_ref().unchecked_ref());
        let _ = self.ctx_provider.remove_event_listener_with_callback(
            "modal-close",
            self.on_close.as_ref().unchecked_ref(),
        );
        self.container.remove();
    }
}

#[cfg(test)]
mod tests {
    use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};

    use super::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    async fn property_reaches_the_element_once_defined() {
        let document = document().unwrap();
        let element = document.create_element("resize-exporter-test-config").unwrap();
        document.body().unwrap().append_child(&element).unwrap();

        let pending = set_when_defined(
            &element,
            "resize-exporter-test-config",
            "wording",
            JsValue::from_str("photo"),
        )
        .unwrap();
        assert!(!Reflect::has(&element, &JsValue::from_str("wording")).unwrap());

        js_sys::eval(
            "customElements.define('resize-exporter-test-config', \
             class extends HTMLElement { set wording(value) { this.received = value; } })",
        )
        .unwrap();
        pending.await.unwrap();

        let received = Reflect::get(&element, &JsValue::from_str("received")).unwrap();
        assert_eq!(received.as_string().as_deref(), Some("photo"));
        element.remove();
    }
}
