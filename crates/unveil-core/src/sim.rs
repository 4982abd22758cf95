//! In-memory host.
//!
//! Implements every host service deterministically: a small element tree
//! with simple selector matching, a manual clock, frame and timer queues,
//! intersection observers driven by [`SimHost::set_visibility`], and
//! injectable storage/clipboard failures. Time only moves through
//! [`SimHost::advance`].

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;
use std::time::Duration;

use crate::animation::Clock;
use crate::error::HostError;
use crate::format::escape_html;
use crate::host::*;

/// Frame interval used by [`SimHost::advance`].
pub const FRAME: Duration = Duration::from_millis(16);

const BODY: ElementId = ElementId(0);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClipboardMode {
    #[default]
    Unavailable,
    Grants,
    Denies,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExecCopy {
    #[default]
    Works,
    Refuses,
    Throws,
}

#[derive(Default)]
struct SimNode {
    tag: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
    text: String,
    html: String,
    value: String,
    style: BTreeMap<String, String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    validity: Validity,
    file: Option<String>,
    offset_top: f64,
}

struct SimObserver {
    options: ObserverOptions,
    callback: Rc<dyn Fn(&[IntersectionEntry])>,
    watched: Vec<ElementId>,
    above: HashSet<ElementId>,
}

struct SimTimer {
    id: TimerId,
    due: Duration,
    callback: Box<dyn FnOnce()>,
}

type Listener = (EventTarget, EventKind, Rc<dyn Fn(&mut DomEvent)>);

#[derive(Default)]
struct SimState {
    nodes: Vec<SimNode>,
    now: Duration,
    frames: Vec<Box<dyn FnOnce(Duration)>>,
    timers: Vec<SimTimer>,
    next_timer: u64,
    observers: Vec<SimObserver>,
    queued: Vec<(usize, IntersectionEntry)>,
    visibility: BTreeMap<ElementId, f64>,
    listeners: Vec<Listener>,
    scroll_y: f64,
    last_scroll_to: Option<(f64, ScrollBehavior)>,
    focused: Option<ElementId>,
    selection: Option<String>,
    clipboard_mode: ClipboardMode,
    clipboard: Option<String>,
    exec_copy: ExecCopy,
    storage: BTreeMap<String, String>,
    storage_failing: bool,
}

impl SimState {
    fn node(&self, el: ElementId) -> Option<&SimNode> {
        self.nodes.get(el.0 as usize)
    }

    fn node_mut(&mut self, el: ElementId) -> Option<&mut SimNode> {
        self.nodes.get_mut(el.0 as usize)
    }

    fn detach(&mut self, el: ElementId) {
        let parent = self.node_mut(el).and_then(|n| n.parent.take());
        if let Some(p) = parent.and_then(|p| self.node_mut(p)) {
            p.children.retain(|c| *c != el);
        }
    }

    fn connected(&self, el: ElementId) -> bool {
        let mut cur = Some(el);
        while let Some(id) = cur {
            if id == BODY {
                return true;
            }
            cur = self.node(id).and_then(|n| n.parent);
        }
        false
    }

    fn descendants(&self, root: ElementId, out: &mut Vec<ElementId>) {
        if let Some(n) = self.node(root) {
            for &c in &n.children {
                out.push(c);
                self.descendants(c, out);
            }
        }
    }

    fn matches(&self, el: ElementId, selector: &SelectorList) -> bool {
        self.node(el)
            .is_some_and(|n| selector.0.iter().any(|c| c.matches(n)))
    }
}

/// Parsed `a, b.c, d[e^="f"]` selector list.
struct SelectorList(Vec<Compound>);

#[derive(Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, AttrOp)>,
}

enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
}

impl SelectorList {
    fn parse(selector: &str) -> Self {
        SelectorList(
            selector
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(Compound::parse)
                .collect(),
        )
    }
}

fn is_ident(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

impl Compound {
    fn parse(s: &str) -> Self {
        let mut out = Compound::default();
        let mut rest = s;
        let take_ident = |r: &str| -> (String, usize) {
            let end = r.find(|c: char| !is_ident(c)).unwrap_or(r.len());
            (r[..end].to_string(), end)
        };
        let (tag, used) = take_ident(rest);
        if !tag.is_empty() {
            out.tag = Some(tag.to_ascii_lowercase());
        }
        rest = &rest[used..];
        while let Some(c) = rest.chars().next() {
            match c {
                '.' | '#' => {
                    let (name, used) = take_ident(&rest[1..]);
                    if c == '.' {
                        out.classes.push(name);
                    } else {
                        out.id = Some(name);
                    }
                    rest = &rest[1 + used..];
                }
                '[' => {
                    let end = rest.find(']').unwrap_or(rest.len());
                    let body = &rest[1..end];
                    let unquote = |v: &str| v.trim().trim_matches('"').trim_matches('\'').to_string();
                    let attr = if let Some((name, v)) = body.split_once("^=") {
                        (name.trim().to_string(), AttrOp::Prefix(unquote(v)))
                    } else if let Some((name, v)) = body.split_once('=') {
                        (name.trim().to_string(), AttrOp::Equals(unquote(v)))
                    } else {
                        (body.trim().to_string(), AttrOp::Exists)
                    };
                    out.attrs.push(attr);
                    rest = rest.get(end + 1..).unwrap_or("");
                }
                _ => {
                    // unsupported combinator: match nothing rather than guess
                    out.id = Some(String::new());
                    break;
                }
            }
        }
        out
    }

    fn matches(&self, n: &SimNode) -> bool {
        if self.tag.as_deref().is_some_and(|t| t != n.tag) {
            return false;
        }
        if let Some(id) = &self.id
            && n.attrs.get("id") != Some(id)
        {
            return false;
        }
        if !self.classes.iter().all(|c| n.classes.contains(c)) {
            return false;
        }
        self.attrs.iter().all(|(name, op)| match (n.attrs.get(name), op) {
            (Some(_), AttrOp::Exists) => true,
            (Some(v), AttrOp::Equals(want)) => v == want,
            (Some(v), AttrOp::Prefix(want)) => v.starts_with(want.as_str()),
            (None, _) => false,
        })
    }
}

fn strip_tags(html: &str) -> String {
    let mut out = String::new();
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

pub struct SimHost {
    state: RefCell<SimState>,
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SimHost {
    pub fn new() -> Self {
        let state = SimState {
            nodes: vec![SimNode {
                tag: "body".into(),
                ..Default::default()
            }],
            ..Default::default()
        };
        Self {
            state: RefCell::new(state),
        }
    }

    pub fn body(&self) -> ElementId {
        BODY
    }

    /// Starts building a detached element.
    pub fn spawn(&self, tag: &str) -> SimElement<'_> {
        let id = self.create_element(tag);
        SimElement { host: self, id }
    }

    pub fn tag(&self, el: ElementId) -> Option<String> {
        self.state.borrow().node(el).map(|n| n.tag.clone())
    }

    pub fn class_list(&self, el: ElementId) -> String {
        self.state
            .borrow()
            .node(el)
            .map(|n| n.classes.join(" "))
            .unwrap_or_default()
    }

    pub fn children(&self, el: ElementId) -> Vec<ElementId> {
        self.state
            .borrow()
            .node(el)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    pub fn value(&self, el: ElementId) -> String {
        self.state
            .borrow()
            .node(el)
            .map(|n| n.value.clone())
            .unwrap_or_default()
    }

    fn with_node(&self, el: ElementId, f: impl FnOnce(&mut SimNode)) {
        if let Some(n) = self.state.borrow_mut().node_mut(el) {
            f(n);
        }
    }

    // ---- time ----

    /// Moves time forward frame by frame; each step flushes queued
    /// observations, fires due timers, then runs the frame queue.
    pub fn advance(&self, dt: Duration) {
        let mut remaining = dt;
        while !remaining.is_zero() {
            let step = remaining.min(FRAME);
            remaining -= step;
            self.state.borrow_mut().now += step;
            self.flush_observations();
            self.fire_due_timers();
            self.run_frame();
        }
    }

    /// Runs every callback requested before this call; returns how many ran.
    pub fn run_frame(&self) -> usize {
        let (frames, now) = {
            let mut s = self.state.borrow_mut();
            (std::mem::take(&mut s.frames), s.now)
        };
        let n = frames.len();
        for f in frames {
            f(now);
        }
        n
    }

    fn fire_due_timers(&self) {
        loop {
            let next = {
                let mut s = self.state.borrow_mut();
                let now = s.now;
                let idx = s
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.due <= now)
                    .min_by_key(|(_, t)| (t.due, t.id.0))
                    .map(|(i, _)| i);
                idx.map(|i| s.timers.remove(i))
            };
            match next {
                Some(timer) => (timer.callback)(),
                None => break,
            }
        }
    }

    pub fn pending_frames(&self) -> usize {
        self.state.borrow().frames.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    // ---- intersection ----

    /// Sets `el`'s visible fraction and notifies every observer whose
    /// threshold the change crosses.
    pub fn set_visibility(&self, el: ElementId, ratio: f64) {
        let calls = {
            let mut s = self.state.borrow_mut();
            s.visibility.insert(el, ratio);
            let mut calls = Vec::new();
            for obs in s.observers.iter_mut() {
                if !obs.watched.contains(&el) {
                    continue;
                }
                let above = ratio > 0.0 && ratio >= obs.options.threshold;
                let was_above = obs.above.contains(&el);
                if above == was_above {
                    continue;
                }
                if above {
                    obs.above.insert(el);
                } else {
                    obs.above.remove(&el);
                }
                calls.push((
                    obs.callback.clone(),
                    IntersectionEntry {
                        target: el,
                        ratio,
                        is_intersecting: ratio > 0.0,
                    },
                ));
            }
            calls
        };
        for (cb, entry) in calls {
            cb(&[entry]);
        }
    }

    /// Delivers a notification to every observer watching `el`, crossing or
    /// not.
    pub fn notify_raw(&self, el: ElementId, ratio: f64) {
        let calls: Vec<_> = {
            let s = self.state.borrow();
            s.observers
                .iter()
                .filter(|o| o.watched.contains(&el))
                .map(|o| o.callback.clone())
                .collect()
        };
        let entry = IntersectionEntry {
            target: el,
            ratio,
            is_intersecting: ratio > 0.0,
        };
        for cb in calls {
            cb(&[entry]);
        }
    }

    fn flush_observations(&self) {
        let (queued, callbacks) = {
            let mut s = self.state.borrow_mut();
            let queued = std::mem::take(&mut s.queued);
            let callbacks: Vec<_> = queued
                .iter()
                .map(|(i, _)| s.observers[*i].callback.clone())
                .collect();
            (queued, callbacks)
        };
        for ((_, entry), cb) in queued.into_iter().zip(callbacks) {
            cb(&[entry]);
        }
    }

    pub fn observer_options(&self, handle: ObserverHandle) -> ObserverOptions {
        self.state
            .borrow()
            .observers
            .get(handle.0 as usize)
            .map(|o| o.options)
            .unwrap_or_default()
    }

    pub fn is_observed(&self, handle: ObserverHandle, el: ElementId) -> bool {
        self.state
            .borrow()
            .observers
            .get(handle.0 as usize)
            .is_some_and(|o| o.watched.contains(&el))
    }

    // ---- events ----

    pub fn dispatch(&self, target: EventTarget, kind: EventKind) -> DomEvent {
        self.dispatch_event(DomEvent::new(target, kind))
    }

    pub fn dispatch_event(&self, mut event: DomEvent) -> DomEvent {
        let handlers: Vec<_> = self
            .state
            .borrow()
            .listeners
            .iter()
            .filter(|(t, k, _)| *t == event.target && *k == event.kind)
            .map(|(_, _, h)| h.clone())
            .collect();
        for h in handlers {
            h(&mut event);
        }
        event
    }

    pub fn click(&self, el: ElementId) -> DomEvent {
        self.dispatch(EventTarget::Element(el), EventKind::Click)
    }

    /// Sets the window scroll offset and fires a scroll event.
    pub fn set_scroll(&self, y: f64) {
        self.state.borrow_mut().scroll_y = y;
        self.dispatch(EventTarget::Window, EventKind::Scroll);
    }

    pub fn last_scroll_to(&self) -> Option<(f64, ScrollBehavior)> {
        self.state.borrow().last_scroll_to
    }

    // ---- forms ----

    pub fn set_validity(&self, el: ElementId, validity: Validity) {
        self.with_node(el, |n| n.validity = validity);
    }

    /// Chooses (or clears) the file of a file input and fires `change`.
    pub fn select_file(&self, el: ElementId, name: Option<&str>) {
        self.with_node(el, |n| n.file = name.map(str::to_string));
        self.dispatch(EventTarget::Element(el), EventKind::Change);
    }

    // ---- clipboard & storage ----

    pub fn set_clipboard_mode(&self, mode: ClipboardMode) {
        self.state.borrow_mut().clipboard_mode = mode;
    }

    pub fn set_exec_copy(&self, behavior: ExecCopy) {
        self.state.borrow_mut().exec_copy = behavior;
    }

    pub fn clipboard_text(&self) -> Option<String> {
        self.state.borrow().clipboard.clone()
    }

    pub fn focused(&self) -> Option<ElementId> {
        self.state.borrow().focused
    }

    pub fn set_storage_failing(&self, failing: bool) {
        self.state.borrow_mut().storage_failing = failing;
    }

    pub fn raw_item(&self, key: &str) -> Option<String> {
        self.state.borrow().storage.get(key).cloned()
    }

    pub fn put_raw_item(&self, key: &str, value: &str) {
        self.state
            .borrow_mut()
            .storage
            .insert(key.to_string(), value.to_string());
    }
}

/// Builder returned by [`SimHost::spawn`].
pub struct SimElement<'a> {
    host: &'a SimHost,
    id: ElementId,
}

impl SimElement<'_> {
    pub fn class(self, class: &str) -> Self {
        self.host.add_class(self.id, class);
        self
    }

    pub fn attr(self, name: &str, value: &str) -> Self {
        self.host.set_attribute(self.id, name, value);
        self
    }

    pub fn style(self, property: &str, value: &str) -> Self {
        self.host.set_style(self.id, property, value);
        self
    }

    pub fn text(self, text: &str) -> Self {
        self.host.set_text(self.id, text);
        self
    }

    pub fn html(self, html: &str) -> Self {
        self.host.set_inner_html(self.id, html);
        self
    }

    pub fn offset_top(self, px: f64) -> Self {
        self.host.with_node(self.id, |n| n.offset_top = px);
        self
    }

    pub fn child_of(self, parent: ElementId) -> ElementId {
        self.host.append_child(parent, self.id);
        self.id
    }

    pub fn attach(self) -> ElementId {
        self.host.append_to_body(self.id);
        self.id
    }

    /// Leaves the element detached.
    pub fn build(self) -> ElementId {
        self.id
    }
}

impl Document for SimHost {
    fn query_selector(&self, selector: &str) -> Option<ElementId> {
        self.query_all(selector).into_iter().next()
    }

    fn query_all(&self, selector: &str) -> Vec<ElementId> {
        self.query_within(BODY, selector)
    }

    fn query_within(&self, root: ElementId, selector: &str) -> Vec<ElementId> {
        let list = SelectorList::parse(selector);
        let s = self.state.borrow();
        let mut all = Vec::new();
        s.descendants(root, &mut all);
        all.into_iter().filter(|el| s.matches(*el, &list)).collect()
    }

    fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.state.borrow().node(el).and_then(|n| n.parent)
    }

    fn next_element_sibling(&self, el: ElementId) -> Option<ElementId> {
        let s = self.state.borrow();
        let parent = s.node(el)?.parent?;
        let siblings = &s.node(parent)?.children;
        let pos = siblings.iter().position(|c| *c == el)?;
        siblings.get(pos + 1).copied()
    }

    fn is_connected(&self, el: ElementId) -> bool {
        self.state.borrow().connected(el)
    }

    fn attribute(&self, el: ElementId, name: &str) -> Option<String> {
        self.state
            .borrow()
            .node(el)
            .and_then(|n| n.attrs.get(name).cloned())
    }

    fn set_attribute(&self, el: ElementId, name: &str, value: &str) {
        self.with_node(el, |n| {
            n.attrs.insert(name.to_string(), value.to_string());
        });
    }

    fn remove_attribute(&self, el: ElementId, name: &str) {
        self.with_node(el, |n| {
            n.attrs.remove(name);
        });
    }

    fn add_class(&self, el: ElementId, class: &str) {
        self.with_node(el, |n| {
            if !n.classes.iter().any(|c| c == class) {
                n.classes.push(class.to_string());
            }
        });
    }

    fn remove_class(&self, el: ElementId, class: &str) {
        self.with_node(el, |n| n.classes.retain(|c| c != class));
    }

    fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.state
            .borrow()
            .node(el)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    fn text(&self, el: ElementId) -> String {
        self.state
            .borrow()
            .node(el)
            .map(|n| n.text.clone())
            .unwrap_or_default()
    }

    fn set_text(&self, el: ElementId, text: &str) {
        self.with_node(el, |n| {
            n.text = text.to_string();
            n.html = escape_html(text);
        });
    }

    fn inner_html(&self, el: ElementId) -> String {
        self.state
            .borrow()
            .node(el)
            .map(|n| n.html.clone())
            .unwrap_or_default()
    }

    fn set_inner_html(&self, el: ElementId, html: &str) {
        self.with_node(el, |n| {
            n.html = html.to_string();
            n.text = strip_tags(html);
        });
    }

    fn set_value(&self, el: ElementId, value: &str) {
        self.with_node(el, |n| n.value = value.to_string());
    }

    fn style(&self, el: ElementId, property: &str) -> Option<String> {
        self.state
            .borrow()
            .node(el)
            .and_then(|n| n.style.get(property).cloned())
            .filter(|v| !v.is_empty())
    }

    fn set_style(&self, el: ElementId, property: &str, value: &str) {
        self.with_node(el, |n| {
            n.style.insert(property.to_string(), value.to_string());
        });
    }

    fn create_element(&self, tag: &str) -> ElementId {
        let mut s = self.state.borrow_mut();
        s.nodes.push(SimNode {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        });
        ElementId((s.nodes.len() - 1) as u64)
    }

    fn append_child(&self, parent: ElementId, child: ElementId) {
        let mut s = self.state.borrow_mut();
        if s.node(parent).is_none() || s.node(child).is_none() {
            return;
        }
        s.detach(child);
        if let Some(n) = s.node_mut(child) {
            n.parent = Some(parent);
        }
        if let Some(p) = s.node_mut(parent) {
            p.children.push(child);
        }
    }

    fn append_to_body(&self, el: ElementId) {
        self.append_child(BODY, el);
    }

    fn remove(&self, el: ElementId) {
        self.state.borrow_mut().detach(el);
    }

    fn focus_and_select(&self, el: ElementId) {
        let mut s = self.state.borrow_mut();
        let value = s.node(el).map(|n| n.value.clone());
        s.focused = Some(el);
        s.selection = value;
    }

    fn exec_copy(&self) -> Result<bool, HostError> {
        let mut s = self.state.borrow_mut();
        match s.exec_copy {
            ExecCopy::Works => {
                s.clipboard = s.selection.clone();
                Ok(true)
            }
            ExecCopy::Refuses => Ok(false),
            ExecCopy::Throws => Err(HostError::Failed("SecurityError".into())),
        }
    }

    fn offset_top(&self, el: ElementId) -> f64 {
        self.state
            .borrow()
            .node(el)
            .map(|n| n.offset_top)
            .unwrap_or_default()
    }

    fn scroll_y(&self) -> f64 {
        self.state.borrow().scroll_y
    }

    fn scroll_to(&self, top: f64, behavior: ScrollBehavior) {
        {
            let mut s = self.state.borrow_mut();
            s.scroll_y = top.max(0.0);
            s.last_scroll_to = Some((top, behavior));
        }
        self.dispatch(EventTarget::Window, EventKind::Scroll);
    }

    fn check_validity(&self, el: ElementId) -> bool {
        let fields = if self.tag(el).as_deref() == Some("form") {
            self.query_within(el, "input, select, textarea")
        } else {
            vec![el]
        };
        fields.into_iter().all(|f| self.validity(f).is_valid())
    }

    fn validity(&self, el: ElementId) -> Validity {
        self.state
            .borrow()
            .node(el)
            .map(|n| n.validity)
            .unwrap_or_default()
    }

    fn min_length(&self, el: ElementId) -> Option<u32> {
        self.attribute(el, "minlength")?.trim().parse().ok()
    }

    fn selected_file_name(&self, el: ElementId) -> Option<String> {
        self.state.borrow().node(el).and_then(|n| n.file.clone())
    }

    fn listen(&self, target: EventTarget, kind: EventKind, handler: EventHandler) {
        self.state
            .borrow_mut()
            .listeners
            .push((target, kind, Rc::from(handler)));
    }
}

impl IntersectionService for SimHost {
    fn create_observer(
        &self,
        options: ObserverOptions,
        callback: Box<dyn Fn(&[IntersectionEntry])>,
    ) -> ObserverHandle {
        let mut s = self.state.borrow_mut();
        s.observers.push(SimObserver {
            options,
            callback: Rc::from(callback),
            watched: Vec::new(),
            above: HashSet::new(),
        });
        ObserverHandle((s.observers.len() - 1) as u32)
    }

    /// Like the browser, an element that is already visible produces an
    /// initial notification on the next step.
    fn observe(&self, observer: ObserverHandle, el: ElementId) {
        let mut s = self.state.borrow_mut();
        let ratio = s.visibility.get(&el).copied().unwrap_or(0.0);
        let idx = observer.0 as usize;
        let Some(obs) = s.observers.get_mut(idx) else {
            return;
        };
        if obs.watched.contains(&el) {
            return;
        }
        obs.watched.push(el);
        if ratio > 0.0 && ratio >= obs.options.threshold {
            obs.above.insert(el);
            s.queued.push((
                idx,
                IntersectionEntry {
                    target: el,
                    ratio,
                    is_intersecting: true,
                },
            ));
        }
    }

    fn unobserve(&self, observer: ObserverHandle, el: ElementId) {
        let mut s = self.state.borrow_mut();
        let idx = observer.0 as usize;
        if let Some(obs) = s.observers.get_mut(idx) {
            obs.watched.retain(|w| *w != el);
            obs.above.remove(&el);
        }
        s.queued
            .retain(|(i, entry)| !(*i == idx && entry.target == el));
    }
}

impl FrameScheduler for SimHost {
    fn request_frame(&self, callback: Box<dyn FnOnce(Duration)>) {
        self.state.borrow_mut().frames.push(callback);
    }
}

impl Timers for SimHost {
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerId {
        let mut s = self.state.borrow_mut();
        s.next_timer += 1;
        let id = TimerId(s.next_timer);
        let due = s.now + delay;
        s.timers.push(SimTimer { id, due, callback });
        id
    }

    fn clear_timeout(&self, id: TimerId) {
        self.state.borrow_mut().timers.retain(|t| t.id != id);
    }
}

impl Clock for SimHost {
    fn now(&self) -> Duration {
        self.state.borrow().now
    }
}

impl Clipboard for SimHost {
    fn clipboard_available(&self) -> bool {
        self.state.borrow().clipboard_mode != ClipboardMode::Unavailable
    }

    /// Settles on the next step, like a promise.
    fn write_clipboard(&self, text: &str, on_done: Box<dyn FnOnce(Result<(), HostError>)>) {
        let result = {
            let mut s = self.state.borrow_mut();
            match s.clipboard_mode {
                ClipboardMode::Grants => {
                    s.clipboard = Some(text.to_string());
                    Ok(())
                }
                ClipboardMode::Denies => Err(HostError::Failed("NotAllowedError".into())),
                ClipboardMode::Unavailable => Err(HostError::Unavailable("clipboard")),
            }
        };
        self.set_timeout(Duration::ZERO, Box::new(move || on_done(result)));
    }
}

impl KeyValueStore for SimHost {
    fn get_item(&self, key: &str) -> Result<Option<String>, HostError> {
        let s = self.state.borrow();
        if s.storage_failing {
            return Err(HostError::Failed("SecurityError".into()));
        }
        Ok(s.storage.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), HostError> {
        let mut s = self.state.borrow_mut();
        if s.storage_failing {
            return Err(HostError::Failed("QuotaExceededError".into()));
        }
        s.storage.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), HostError> {
        let mut s = self.state.borrow_mut();
        if s.storage_failing {
            return Err(HostError::Failed("SecurityError".into()));
        }
        s.storage.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_matching() {
        let host = SimHost::new();
        let a = host.spawn("a").attr("href", "#features").attach();
        let b = host.spawn("a").attr("href", "/login").attach();
        let card = host.spawn("div").class("card").class("stats-card").attach();
        let input = host.spawn("input").attr("type", "file").child_of(card);
        let id = host.spawn("section").attr("id", "features").attach();

        assert_eq!(host.query_all(r##"a[href^="#"]"##), vec![a]);
        assert_eq!(host.query_all("a"), vec![a, b]);
        assert_eq!(host.query_all(".feature-card, .stats-card"), vec![card]);
        assert_eq!(host.query_all(r#"input[type="file"]"#), vec![input]);
        assert_eq!(host.query_selector("#features"), Some(id));
        assert_eq!(host.query_within(card, "input, select"), vec![input]);
        assert_eq!(host.query_selector("div > input"), None);
    }

    #[test]
    fn timers_fire_in_due_order() {
        let host = SimHost::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (name, ms) in [("late", 40), ("early", 10), ("cleared", 20)] {
            let log = log.clone();
            let id = host.set_timeout(
                Duration::from_millis(ms),
                Box::new(move || log.borrow_mut().push(name)),
            );
            if name == "cleared" {
                host.clear_timeout(id);
            }
        }
        host.advance(Duration::from_millis(50));
        assert_eq!(*log.borrow(), vec!["early", "late"]);
    }

    #[test]
    fn visibility_notifies_on_crossings_only() {
        let host = SimHost::new();
        let el = host.spawn("div").attach();
        let hits = Rc::new(RefCell::new(Vec::new()));
        let obs = host.create_observer(
            ObserverOptions {
                threshold: 0.5,
                ..Default::default()
            },
            Box::new({
                let hits = hits.clone();
                move |entries: &[IntersectionEntry]| {
                    hits.borrow_mut().extend(entries.iter().map(|e| e.ratio))
                }
            }),
        );
        host.observe(obs, el);
        host.set_visibility(el, 0.2);
        host.set_visibility(el, 0.6);
        host.set_visibility(el, 0.9);
        host.set_visibility(el, 0.1);
        assert_eq!(*hits.borrow(), vec![0.6, 0.1]);
    }

    #[test]
    fn observing_visible_element_notifies_next_step() {
        let host = SimHost::new();
        let el = host.spawn("div").attach();
        host.set_visibility(el, 1.0);
        let hits = Rc::new(RefCell::new(0));
        let obs = host.create_observer(
            ObserverOptions::default(),
            Box::new({
                let hits = hits.clone();
                move |_: &[IntersectionEntry]| *hits.borrow_mut() += 1
            }),
        );
        host.observe(obs, el);
        assert_eq!(*hits.borrow(), 0);
        host.advance(FRAME);
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn removal_disconnects_subtree() {
        let host = SimHost::new();
        let form = host.spawn("form").attach();
        let field = host.spawn("input").child_of(form);
        assert!(host.is_connected(field));
        host.remove(form);
        assert!(!host.is_connected(field));
        assert_eq!(host.parent(field), Some(form));
    }
}
