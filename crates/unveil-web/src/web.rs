//! Entry point and script-facing helpers.
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use log::{error, info};
use wasm_bindgen::prelude::*;

use unveil_core::format::DateFormat;
use unveil_core::host::{Document, DomEvent, EventKind, EventTarget};
use unveil_core::notify::NotificationKind;
use unveil_core::{Page, enhance_page, format, loading};

use crate::WebHost;
use crate::options::{load_config, parse_log_level};

thread_local! {
    static PAGE: RefCell<Option<Page<WebHost>>> = const { RefCell::new(None) };
}

#[wasm_bindgen]
pub struct WebOptions {
    config: Option<String>,
    log_level: Option<String>,
}

#[wasm_bindgen]
impl WebOptions {
    /// `config` is optional JSON overriding the stock behavior.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Self {
        Self {
            config,
            log_level: None,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn config(&self) -> Option<String> {
        self.config.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn log_level(&self) -> Option<String> {
        self.log_level.clone()
    }

    #[wasm_bindgen(setter)]
    pub fn set_log_level(&mut self, v: Option<String>) {
        self.log_level = v;
    }
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Enhances the current document. Call once the DOM is ready.
#[wasm_bindgen]
pub fn start(options: WebOptions) -> Result<(), JsValue> {
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    let level = parse_log_level(options.log_level.as_deref())
        .to_level()
        .unwrap_or(log::Level::Info);
    let _ = console_log::init_with_level(level);

    let config = load_config(options.config.as_deref()).map_err(|e| js_error(format!("{e:#}")))?;
    let host = Rc::new(WebHost::new().map_err(js_error)?);

    host.listen(
        EventTarget::Window,
        EventKind::Error,
        Box::new(|event: &mut DomEvent| {
            error!(
                "page error: {}",
                event.message.as_deref().unwrap_or("unknown error")
            );
        }),
    );

    let page = enhance_page(host, config);
    info!("unveil started");
    PAGE.with(|p| *p.borrow_mut() = Some(page));
    Ok(())
}

fn with_page<R>(f: impl FnOnce(&Page<WebHost>) -> R) -> Result<R, JsValue> {
    PAGE.with(|p| match p.borrow().as_ref() {
        Some(page) => Ok(f(page)),
        None => Err(JsValue::from_str("unveil: start() has not been called")),
    })
}

#[wasm_bindgen]
pub fn show_loading_state(button: web_sys::Element, text: Option<String>) -> Result<(), JsValue> {
    with_page(|page| {
        let host = page.host();
        let id = host.element_id(&button);
        let text = text.unwrap_or_else(|| page.config().loading.text.clone());
        loading::show_loading_state(&**host, id, &text);
    })
}

#[wasm_bindgen]
pub fn hide_loading_state(button: web_sys::Element) -> Result<bool, JsValue> {
    with_page(|page| {
        let host = page.host();
        loading::hide_loading_state(&**host, host.element_id(&button))
    })
}

/// `kind` is one of info, success, warning, danger.
#[wasm_bindgen]
pub fn show_notification(
    message: &str,
    kind: Option<String>,
    duration_ms: Option<u32>,
) -> Result<(), JsValue> {
    let kind = match kind.as_deref() {
        None => NotificationKind::Info,
        Some(name) => NotificationKind::from_name(name)
            .ok_or_else(|| js_error(format!("unknown notification kind {name:?}")))?,
    };
    with_page(|page| {
        let notifier = page.notifier();
        let duration = duration_ms
            .map(|ms| Duration::from_millis(ms.into()))
            .unwrap_or_else(|| notifier.config().default_duration());
        notifier.show(message, kind, duration);
    })
}

#[wasm_bindgen]
pub fn copy_to_clipboard(text: &str) -> Result<(), JsValue> {
    with_page(|page| page.copy_to_clipboard(text))
}

#[wasm_bindgen]
pub fn format_number(value: f64) -> String {
    format::format_number(value)
}

/// `options` is optional JSON such as `{"month":"long"}`.
#[wasm_bindgen]
pub fn format_date(input: &str, options: Option<String>) -> Result<String, JsValue> {
    let style = match options.as_deref() {
        None => DateFormat::default(),
        Some(json) => serde_json::from_str(json).map_err(js_error)?,
    };
    format::format_date(input, style).map_err(js_error)
}

#[wasm_bindgen]
pub fn is_valid_email(email: &str) -> bool {
    format::is_valid_email(email)
}

#[wasm_bindgen]
pub fn storage_set(key: &str, value: JsValue) -> Result<bool, JsValue> {
    let json = js_sys::JSON::stringify(&value)?
        .as_string()
        .unwrap_or_default();
    let value: serde_json::Value = serde_json::from_str(&json).map_err(js_error)?;
    with_page(|page| page.storage().set(key, &value))
}

#[wasm_bindgen]
pub fn storage_get(key: &str) -> Result<JsValue, JsValue> {
    let value = with_page(|page| page.storage().get::<serde_json::Value>(key))?;
    match value {
        Some(v) => js_sys::JSON::parse(&v.to_string()),
        None => Ok(JsValue::NULL),
    }
}

#[wasm_bindgen]
pub fn storage_remove(key: &str) -> Result<bool, JsValue> {
    with_page(|page| page.storage().remove(key))
}
