//! Services the page environment provides.
//!
//! Every behavior in this crate is policy over these traits. The browser
//! backend lives in `unveil-web`; [`crate::sim::SimHost`] is an in-memory
//! implementation for tests and headless replays.
//!
//! All callbacks are delivered on one logical timeline: implementations must
//! never invoke a callback while holding a borrow that the callback could
//! re-enter.

use std::fmt;
use std::time::Duration;

use bitflags::bitflags;

use crate::animation::Clock;
use crate::error::HostError;

/// Opaque handle to an element. Identity is the handle itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventTarget {
    Window,
    Element(ElementId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Scroll,
    Click,
    Submit,
    Blur,
    Input,
    Change,
    Error,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Scroll => "scroll",
            EventKind::Click => "click",
            EventKind::Submit => "submit",
            EventKind::Blur => "blur",
            EventKind::Input => "input",
            EventKind::Change => "change",
            EventKind::Error => "error",
        }
    }
}

/// Event as seen by a handler. Default-prevention and propagation flags are
/// forwarded to the native event once the handler returns.
#[derive(Clone, Debug)]
pub struct DomEvent {
    pub target: EventTarget,
    pub kind: EventKind,
    /// Error text for [`EventKind::Error`] events.
    pub message: Option<String>,
    default_prevented: bool,
    propagation_stopped: bool,
}

impl DomEvent {
    pub fn new(target: EventTarget, kind: EventKind) -> Self {
        Self {
            target,
            kind,
            message: None,
            default_prevented: false,
            propagation_stopped: false,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

pub type EventHandler = Box<dyn Fn(&mut DomEvent)>;

bitflags! {
    /// Constraint-validation failures of a form field. Empty means valid.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Validity: u8 {
        const VALUE_MISSING = 1;
        const TYPE_MISMATCH = 1 << 1;
        const TOO_SHORT = 1 << 2;
        const PATTERN_MISMATCH = 1 << 3;
        /// Any other native failure (range, step, custom error, ...).
        const OTHER = 1 << 7;
    }
}

impl Validity {
    pub fn is_valid(&self) -> bool {
        self.is_empty()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScrollBehavior {
    #[default]
    Auto,
    Smooth,
}

/// Margins applied to the viewport before intersection is computed, in px.
/// Negative values shrink the viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RootMargin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl RootMargin {
    pub const ZERO: RootMargin = RootMargin {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };

    pub fn shrink_bottom(px: f64) -> Self {
        Self {
            bottom: -px,
            ..Self::ZERO
        }
    }

    /// CSS shorthand, e.g. `0px 0px -50px 0px`.
    pub fn to_css(&self) -> String {
        format!(
            "{}px {}px {}px {}px",
            self.top, self.right, self.bottom, self.left
        )
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ObserverOptions {
    /// Visible fraction in `[0, 1]` at which notifications are delivered.
    pub threshold: f64,
    pub root_margin: RootMargin,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntersectionEntry {
    pub target: ElementId,
    /// Visible fraction of the target's area.
    pub ratio: f64,
    pub is_intersecting: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverHandle(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(pub u64);

pub trait Document {
    fn query_selector(&self, selector: &str) -> Option<ElementId>;
    fn query_all(&self, selector: &str) -> Vec<ElementId>;
    fn query_within(&self, root: ElementId, selector: &str) -> Vec<ElementId>;

    fn parent(&self, el: ElementId) -> Option<ElementId>;
    fn next_element_sibling(&self, el: ElementId) -> Option<ElementId>;
    fn is_connected(&self, el: ElementId) -> bool;

    fn attribute(&self, el: ElementId, name: &str) -> Option<String>;
    fn set_attribute(&self, el: ElementId, name: &str, value: &str);
    fn remove_attribute(&self, el: ElementId, name: &str);

    fn add_class(&self, el: ElementId, class: &str);
    fn remove_class(&self, el: ElementId, class: &str);
    fn has_class(&self, el: ElementId, class: &str) -> bool;

    fn text(&self, el: ElementId) -> String;
    fn set_text(&self, el: ElementId, text: &str);
    fn inner_html(&self, el: ElementId) -> String;
    fn set_inner_html(&self, el: ElementId, html: &str);
    fn set_value(&self, el: ElementId, value: &str);

    /// Inline style property, `None` when unset or empty.
    fn style(&self, el: ElementId, property: &str) -> Option<String>;
    fn set_style(&self, el: ElementId, property: &str, value: &str);

    fn create_element(&self, tag: &str) -> ElementId;
    fn append_child(&self, parent: ElementId, child: ElementId);
    fn append_to_body(&self, el: ElementId);
    fn remove(&self, el: ElementId);

    fn focus_and_select(&self, el: ElementId);
    /// Legacy copy-selection command. `Ok(false)` when the command is refused.
    fn exec_copy(&self) -> Result<bool, HostError>;

    fn offset_top(&self, el: ElementId) -> f64;
    fn scroll_y(&self) -> f64;
    fn scroll_to(&self, top: f64, behavior: ScrollBehavior);

    fn check_validity(&self, el: ElementId) -> bool;
    fn validity(&self, el: ElementId) -> Validity;
    fn min_length(&self, el: ElementId) -> Option<u32>;
    fn selected_file_name(&self, el: ElementId) -> Option<String>;

    fn listen(&self, target: EventTarget, kind: EventKind, handler: EventHandler);
}

pub trait IntersectionService {
    fn create_observer(
        &self,
        options: ObserverOptions,
        callback: Box<dyn Fn(&[IntersectionEntry])>,
    ) -> ObserverHandle;
    fn observe(&self, observer: ObserverHandle, el: ElementId);
    fn unobserve(&self, observer: ObserverHandle, el: ElementId);
}

pub trait FrameScheduler {
    /// One-shot callback on the next frame with a timestamp on the
    /// [`Clock`] time base.
    fn request_frame(&self, callback: Box<dyn FnOnce(Duration)>);
}

pub trait Timers {
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerId;
    fn clear_timeout(&self, id: TimerId);
}

pub trait Clipboard {
    fn clipboard_available(&self) -> bool;
    fn write_clipboard(&self, text: &str, on_done: Box<dyn FnOnce(Result<(), HostError>)>);
}

pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, HostError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), HostError>;
    fn remove_item(&self, key: &str) -> Result<(), HostError>;
}

/// Everything a page needs.
pub trait Host:
    Document + IntersectionService + FrameScheduler + Timers + Clock + Clipboard + KeyValueStore + 'static
{
}

impl<T> Host for T where
    T: Document
        + IntersectionService
        + FrameScheduler
        + Timers
        + Clock
        + Clipboard
        + KeyValueStore
        + 'static
{
}
