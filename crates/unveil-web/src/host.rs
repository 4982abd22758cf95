//! `web-sys` implementation of the host traits.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use js_sys::{Array, Function, Promise, Reflect};
use log::{error, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    HtmlDocument, HtmlElement, HtmlFormElement, HtmlInputElement, HtmlSelectElement,
    HtmlTextAreaElement, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit,
    ScrollToOptions, ValidityState,
};

use unveil_core::animation::Clock;
use unveil_core::error::HostError;
use unveil_core::host::{
    Clipboard, Document, DomEvent, ElementId, EventHandler, EventKind, EventTarget,
    FrameScheduler, IntersectionEntry, IntersectionService, KeyValueStore, ObserverHandle,
    ObserverOptions, ScrollBehavior, TimerId, Timers, Validity,
};

use crate::slots::Slots;

const ID_ATTRIBUTE: &str = "data-unveil-id";

fn host_error(e: JsValue) -> HostError {
    HostError::Failed(e.as_string().unwrap_or_else(|| format!("{e:?}")))
}

/// Maps DOM elements to stable handles. Elements are stamped with their
/// handle so repeated queries resolve to the same id. Removing an element
/// releases its handle and those of its stamped descendants.
#[derive(Default)]
struct Registry {
    elements: RefCell<Slots<web_sys::Element>>,
}

impl Registry {
    fn id_of(&self, el: &web_sys::Element) -> ElementId {
        if let Some(id) = stamp_of(el).filter(|id| self.get(*id).as_ref() == Some(el)) {
            return id;
        }
        let id = ElementId(self.elements.borrow_mut().insert(el.clone()));
        let _ = el.set_attribute(ID_ATTRIBUTE, &id.0.to_string());
        id
    }

    fn reserve(&self) -> ElementId {
        ElementId(self.elements.borrow_mut().reserve())
    }

    fn get(&self, id: ElementId) -> Option<web_sys::Element> {
        self.elements.borrow().get(id.0)
    }

    fn html(&self, id: ElementId) -> Option<HtmlElement> {
        self.get(id)?.dyn_into::<HtmlElement>().ok()
    }

    fn release_tree(&self, root: &web_sys::Element) {
        let mut stamped = Vec::new();
        if let Ok(list) = root.query_selector_all(&format!("[{ID_ATTRIBUTE}]")) {
            stamped.extend(
                (0..list.length())
                    .filter_map(|i| list.get(i))
                    .filter_map(|node| node.dyn_into::<web_sys::Element>().ok()),
            );
        }
        stamped.push(root.clone());
        let mut elements = self.elements.borrow_mut();
        for el in stamped {
            if let Some(id) = stamp_of(&el)
                && elements.get(id.0).as_ref() == Some(&el)
            {
                elements.release(id.0);
            }
        }
    }
}

fn stamp_of(el: &web_sys::Element) -> Option<ElementId> {
    el.get_attribute(ID_ATTRIBUTE)
        .and_then(|v| v.parse::<u64>().ok())
        .map(ElementId)
}

pub struct WebHost {
    window: web_sys::Window,
    document: web_sys::Document,
    registry: Rc<Registry>,
    observers: RefCell<Vec<Option<IntersectionObserver>>>,
}

impl WebHost {
    pub fn new() -> Result<Self, HostError> {
        let window = web_sys::window().ok_or(HostError::Unavailable("window"))?;
        let document = window.document().ok_or(HostError::Unavailable("document"))?;
        Ok(Self {
            window,
            document,
            registry: Rc::new(Registry::default()),
            observers: RefCell::new(Vec::new()),
        })
    }

    /// Handle for an element obtained outside the host (e.g. from script).
    pub fn element_id(&self, el: &web_sys::Element) -> ElementId {
        self.registry.id_of(el)
    }

    fn collect(&self, list: web_sys::NodeList) -> Vec<ElementId> {
        (0..list.length())
            .filter_map(|i| list.get(i))
            .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
            .map(|el| self.registry.id_of(&el))
            .collect()
    }

    fn observer(&self, handle: ObserverHandle) -> Option<IntersectionObserver> {
        self.observers
            .borrow()
            .get(handle.0 as usize)
            .cloned()
            .flatten()
    }

    fn native_validity(&self, el: &web_sys::Element) -> Option<ValidityState> {
        if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
            Some(input.validity())
        } else if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
            Some(area.validity())
        } else {
            el.dyn_ref::<HtmlSelectElement>().map(|s| s.validity())
        }
    }
}

impl Document for WebHost {
    fn query_selector(&self, selector: &str) -> Option<ElementId> {
        match self.document.query_selector(selector) {
            Ok(found) => found.map(|el| self.registry.id_of(&el)),
            Err(e) => {
                warn!("bad selector {selector:?}: {e:?}");
                None
            }
        }
    }

    fn query_all(&self, selector: &str) -> Vec<ElementId> {
        match self.document.query_selector_all(selector) {
            Ok(list) => self.collect(list),
            Err(e) => {
                warn!("bad selector {selector:?}: {e:?}");
                Vec::new()
            }
        }
    }

    fn query_within(&self, root: ElementId, selector: &str) -> Vec<ElementId> {
        let Some(root) = self.registry.get(root) else {
            return Vec::new();
        };
        match root.query_selector_all(selector) {
            Ok(list) => self.collect(list),
            Err(e) => {
                warn!("bad selector {selector:?}: {e:?}");
                Vec::new()
            }
        }
    }

    fn parent(&self, el: ElementId) -> Option<ElementId> {
        let parent = self.registry.get(el)?.parent_element()?;
        Some(self.registry.id_of(&parent))
    }

    fn next_element_sibling(&self, el: ElementId) -> Option<ElementId> {
        let next = self.registry.get(el)?.next_element_sibling()?;
        Some(self.registry.id_of(&next))
    }

    fn is_connected(&self, el: ElementId) -> bool {
        self.registry.get(el).is_some_and(|e| e.is_connected())
    }

    fn attribute(&self, el: ElementId, name: &str) -> Option<String> {
        self.registry.get(el)?.get_attribute(name)
    }

    fn set_attribute(&self, el: ElementId, name: &str, value: &str) {
        if let Some(e) = self.registry.get(el) {
            let _ = e.set_attribute(name, value);
        }
    }

    fn remove_attribute(&self, el: ElementId, name: &str) {
        if let Some(e) = self.registry.get(el) {
            let _ = e.remove_attribute(name);
        }
    }

    fn add_class(&self, el: ElementId, class: &str) {
        if let Some(e) = self.registry.get(el) {
            let _ = e.class_list().add_1(class);
        }
    }

    fn remove_class(&self, el: ElementId, class: &str) {
        if let Some(e) = self.registry.get(el) {
            let _ = e.class_list().remove_1(class);
        }
    }

    fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.registry
            .get(el)
            .is_some_and(|e| e.class_list().contains(class))
    }

    fn text(&self, el: ElementId) -> String {
        self.registry
            .get(el)
            .and_then(|e| e.text_content())
            .unwrap_or_default()
    }

    fn set_text(&self, el: ElementId, text: &str) {
        if let Some(e) = self.registry.get(el) {
            e.set_text_content(Some(text));
        }
    }

    fn inner_html(&self, el: ElementId) -> String {
        self.registry
            .get(el)
            .map(|e| e.inner_html())
            .unwrap_or_default()
    }

    fn set_inner_html(&self, el: ElementId, html: &str) {
        if let Some(e) = self.registry.get(el) {
            e.set_inner_html(html);
        }
    }

    fn set_value(&self, el: ElementId, value: &str) {
        let Some(e) = self.registry.get(el) else {
            return;
        };
        if let Some(area) = e.dyn_ref::<HtmlTextAreaElement>() {
            area.set_value(value);
        } else if let Some(input) = e.dyn_ref::<HtmlInputElement>() {
            input.set_value(value);
        }
    }

    fn style(&self, el: ElementId, property: &str) -> Option<String> {
        self.registry
            .html(el)?
            .style()
            .get_property_value(property)
            .ok()
            .filter(|v| !v.is_empty())
    }

    fn set_style(&self, el: ElementId, property: &str, value: &str) {
        if let Some(e) = self.registry.html(el) {
            let _ = e.style().set_property(property, value);
        }
    }

    fn create_element(&self, tag: &str) -> ElementId {
        match self.document.create_element(tag) {
            Ok(el) => self.registry.id_of(&el),
            Err(e) => {
                error!("create_element({tag:?}) failed: {e:?}");
                self.registry.reserve()
            }
        }
    }

    fn append_child(&self, parent: ElementId, child: ElementId) {
        if let (Some(p), Some(c)) = (self.registry.get(parent), self.registry.get(child)) {
            let _ = p.append_child(&c);
        }
    }

    fn append_to_body(&self, el: ElementId) {
        if let (Some(body), Some(e)) = (self.document.body(), self.registry.get(el)) {
            let _ = body.append_child(&e);
        }
    }

    fn remove(&self, el: ElementId) {
        if let Some(e) = self.registry.get(el) {
            e.remove();
            self.registry.release_tree(&e);
        }
    }

    fn focus_and_select(&self, el: ElementId) {
        let Some(e) = self.registry.get(el) else {
            return;
        };
        if let Some(area) = e.dyn_ref::<HtmlTextAreaElement>() {
            let _ = area.focus();
            area.select();
        } else if let Some(input) = e.dyn_ref::<HtmlInputElement>() {
            let _ = input.focus();
            input.select();
        }
    }

    fn exec_copy(&self) -> Result<bool, HostError> {
        let doc = self
            .document
            .dyn_ref::<HtmlDocument>()
            .ok_or(HostError::Unavailable("execCommand"))?;
        doc.exec_command("copy").map_err(host_error)
    }

    fn offset_top(&self, el: ElementId) -> f64 {
        self.registry
            .html(el)
            .map(|e| e.offset_top() as f64)
            .unwrap_or_default()
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or_default()
    }

    fn scroll_to(&self, top: f64, behavior: ScrollBehavior) {
        let opts = ScrollToOptions::new();
        opts.set_top(top);
        opts.set_behavior(match behavior {
            ScrollBehavior::Auto => web_sys::ScrollBehavior::Auto,
            ScrollBehavior::Smooth => web_sys::ScrollBehavior::Smooth,
        });
        self.window.scroll_to_with_scroll_to_options(&opts);
    }

    fn check_validity(&self, el: ElementId) -> bool {
        let Some(e) = self.registry.get(el) else {
            return true;
        };
        if let Some(form) = e.dyn_ref::<HtmlFormElement>() {
            form.check_validity()
        } else if let Some(input) = e.dyn_ref::<HtmlInputElement>() {
            input.check_validity()
        } else if let Some(area) = e.dyn_ref::<HtmlTextAreaElement>() {
            area.check_validity()
        } else if let Some(select) = e.dyn_ref::<HtmlSelectElement>() {
            select.check_validity()
        } else {
            true
        }
    }

    fn validity(&self, el: ElementId) -> Validity {
        let Some(state) = self
            .registry
            .get(el)
            .and_then(|e| self.native_validity(&e))
        else {
            return Validity::empty();
        };
        let mut v = Validity::empty();
        v.set(Validity::VALUE_MISSING, state.value_missing());
        v.set(Validity::TYPE_MISMATCH, state.type_mismatch());
        v.set(Validity::TOO_SHORT, state.too_short());
        v.set(Validity::PATTERN_MISMATCH, state.pattern_mismatch());
        if v.is_empty() && !state.valid() {
            v |= Validity::OTHER;
        }
        v
    }

    fn min_length(&self, el: ElementId) -> Option<u32> {
        let e = self.registry.get(el)?;
        let n = if let Some(input) = e.dyn_ref::<HtmlInputElement>() {
            input.min_length()
        } else {
            e.dyn_ref::<HtmlTextAreaElement>()?.min_length()
        };
        u32::try_from(n).ok()
    }

    fn selected_file_name(&self, el: ElementId) -> Option<String> {
        let input = self.registry.get(el)?.dyn_into::<HtmlInputElement>().ok()?;
        Some(input.files()?.get(0)?.name())
    }

    fn listen(&self, target: EventTarget, kind: EventKind, handler: EventHandler) {
        let native: web_sys::EventTarget = match target {
            EventTarget::Window => self.window.clone().into(),
            EventTarget::Element(el) => match self.registry.get(el) {
                Some(e) => e.into(),
                None => return,
            },
        };
        let closure = Closure::<dyn FnMut(web_sys::Event)>::new(move |ev: web_sys::Event| {
            let mut event = DomEvent::new(target, kind);
            if let Some(err) = ev.dyn_ref::<web_sys::ErrorEvent>() {
                event.message = Some(err.message());
            }
            if ev.default_prevented() {
                event.prevent_default();
            }
            handler(&mut event);
            if event.is_default_prevented() {
                ev.prevent_default();
            }
            if event.is_propagation_stopped() {
                ev.stop_propagation();
            }
        });
        if let Err(e) =
            native.add_event_listener_with_callback(kind.as_str(), closure.as_ref().unchecked_ref())
        {
            error!("failed to listen for {}: {e:?}", kind.as_str());
        }
        // Listeners live as long as the page.
        closure.forget();
    }
}

impl IntersectionService for WebHost {
    fn create_observer(
        &self,
        options: ObserverOptions,
        callback: Box<dyn Fn(&[IntersectionEntry])>,
    ) -> ObserverHandle {
        let registry = self.registry.clone();
        let closure = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, _: IntersectionObserver| {
                let batch: Vec<IntersectionEntry> = entries
                    .iter()
                    .filter_map(|v| v.dyn_into::<IntersectionObserverEntry>().ok())
                    .map(|entry| IntersectionEntry {
                        target: registry.id_of(&entry.target()),
                        ratio: entry.intersection_ratio(),
                        is_intersecting: entry.is_intersecting(),
                    })
                    .collect();
                callback(&batch);
            },
        );

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin.to_css());
        let observer =
            match IntersectionObserver::new_with_options(closure.as_ref().unchecked_ref(), &init) {
                Ok(o) => {
                    closure.forget();
                    Some(o)
                }
                Err(e) => {
                    error!("IntersectionObserver unavailable: {e:?}");
                    None
                }
            };
        let mut observers = self.observers.borrow_mut();
        observers.push(observer);
        ObserverHandle((observers.len() - 1) as u32)
    }

    fn observe(&self, observer: ObserverHandle, el: ElementId) {
        if let (Some(o), Some(e)) = (self.observer(observer), self.registry.get(el)) {
            o.observe(&e);
        }
    }

    fn unobserve(&self, observer: ObserverHandle, el: ElementId) {
        if let (Some(o), Some(e)) = (self.observer(observer), self.registry.get(el)) {
            o.unobserve(&e);
        }
    }
}

impl FrameScheduler for WebHost {
    fn request_frame(&self, callback: Box<dyn FnOnce(Duration)>) {
        let cb = Closure::once_into_js(move |ts: f64| {
            callback(Duration::from_secs_f64(ts.max(0.0) / 1000.0));
        });
        if let Err(e) = self.window.request_animation_frame(cb.unchecked_ref()) {
            error!("requestAnimationFrame failed: {e:?}");
        }
    }
}

impl Timers for WebHost {
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerId {
        let cb = Closure::once_into_js(move || callback());
        let ms = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        match self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), ms)
        {
            Ok(handle) => TimerId(handle as u64),
            Err(e) => {
                error!("setTimeout failed: {e:?}");
                TimerId(0)
            }
        }
    }

    fn clear_timeout(&self, id: TimerId) {
        if let Ok(handle) = i32::try_from(id.0) {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}

impl Clock for WebHost {
    fn now(&self) -> Duration {
        let ms = self
            .window
            .performance()
            .map(|p| p.now())
            .unwrap_or_default();
        Duration::from_secs_f64(ms.max(0.0) / 1000.0)
    }
}

impl WebHost {
    fn write_text_fn(&self) -> Option<(JsValue, Function)> {
        if !self.window.is_secure_context() {
            return None;
        }
        let clipboard = Reflect::get(&self.window.navigator(), &"clipboard".into()).ok()?;
        if clipboard.is_undefined() || clipboard.is_null() {
            return None;
        }
        let write = Reflect::get(&clipboard, &"writeText".into())
            .ok()?
            .dyn_into::<Function>()
            .ok()?;
        Some((clipboard, write))
    }
}

impl Clipboard for WebHost {
    fn clipboard_available(&self) -> bool {
        self.write_text_fn().is_some()
    }

    fn write_clipboard(&self, text: &str, on_done: Box<dyn FnOnce(Result<(), HostError>)>) {
        let Some((clipboard, write)) = self.write_text_fn() else {
            on_done(Err(HostError::Unavailable("navigator.clipboard")));
            return;
        };
        let promise = match write.call1(&clipboard, &JsValue::from_str(text)) {
            Ok(p) => p.dyn_into::<Promise>().map_err(host_error),
            Err(e) => Err(host_error(e)),
        };
        match promise {
            Ok(promise) => spawn_local(async move {
                let result = JsFuture::from(promise).await.map(|_| ()).map_err(host_error);
                on_done(result);
            }),
            Err(e) => on_done(Err(e)),
        }
    }
}

impl WebHost {
    fn local_storage(&self) -> Result<web_sys::Storage, HostError> {
        self.window
            .local_storage()
            .map_err(host_error)?
            .ok_or(HostError::Unavailable("localStorage"))
    }
}

impl KeyValueStore for WebHost {
    fn get_item(&self, key: &str) -> Result<Option<String>, HostError> {
        self.local_storage()?.get_item(key).map_err(host_error)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), HostError> {
        self.local_storage()?.set_item(key, value).map_err(host_error)
    }

    fn remove_item(&self, key: &str) -> Result<(), HostError> {
        self.local_storage()?.remove_item(key).map_err(host_error)
    }
}
