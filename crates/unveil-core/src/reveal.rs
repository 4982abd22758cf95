//! Visibility-triggered reveals.
//!
//! A [`Revealer`] owns one intersection observer per [`RevealKind`]. Each
//! registered element sits in `Watching` until a notification reports it at
//! or above the kind's threshold; it then moves to `Fired`, is unobserved and
//! its behavior runs once:
//!
//! - `ClassToggle` adds the reveal class.
//! - `CounterRamp` counts the element's text from 0 to its target, one value
//!   per animation frame, ending exactly on the target.
//! - `ProgressBarExpand` snaps the width to the reset value, then sets the
//!   target width after a short delay and lets CSS transition it.
//!
//! Declarative targets are read and validated at registration; an element
//! with a bad target is skipped with a warning instead of animating toward
//! garbage.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use log::{debug, info, warn};

use crate::animation::CounterRamp;
use crate::config::RevealConfig;
use crate::error::RevealError;
use crate::host::{ElementId, Host, IntersectionEntry, ObserverHandle, ObserverOptions};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RevealKind {
    ClassToggle,
    CounterRamp,
    ProgressBarExpand,
}

impl RevealKind {
    pub const ALL: [RevealKind; 3] = [
        RevealKind::ClassToggle,
        RevealKind::CounterRamp,
        RevealKind::ProgressBarExpand,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RevealKind::ClassToggle => "class",
            RevealKind::CounterRamp => "counter",
            RevealKind::ProgressBarExpand => "progress",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealState {
    Watching,
    Fired,
}

#[derive(Clone, Debug, PartialEq)]
enum Plan {
    Class,
    Counter { target: u64 },
    Progress { width: String },
}

struct Registration {
    plan: Plan,
    state: RevealState,
}

struct Channel {
    handle: ObserverHandle,
    threshold: f64,
    registrations: HashMap<ElementId, Registration>,
}

struct Channels {
    class: Channel,
    counter: Channel,
    progress: Channel,
}

impl Channels {
    fn get(&self, kind: RevealKind) -> &Channel {
        match kind {
            RevealKind::ClassToggle => &self.class,
            RevealKind::CounterRamp => &self.counter,
            RevealKind::ProgressBarExpand => &self.progress,
        }
    }

    fn get_mut(&mut self, kind: RevealKind) -> &mut Channel {
        match kind {
            RevealKind::ClassToggle => &mut self.class,
            RevealKind::CounterRamp => &mut self.counter,
            RevealKind::ProgressBarExpand => &mut self.progress,
        }
    }
}

struct Shared<H: Host> {
    host: Rc<H>,
    config: RevealConfig,
    channels: RefCell<Channels>,
}

/// Outcome of a registration batch.
#[derive(Debug, Default)]
pub struct RegistrationReport {
    pub registered: Vec<ElementId>,
    pub rejected: Vec<RevealError>,
}

impl RegistrationReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    pub fn merge(&mut self, other: RegistrationReport) {
        self.registered.extend(other.registered);
        self.rejected.extend(other.rejected);
    }
}

pub struct Revealer<H: Host> {
    shared: Rc<Shared<H>>,
}

impl<H: Host> Clone for Revealer<H> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<H: Host> Revealer<H> {
    pub fn new(host: Rc<H>, config: RevealConfig) -> Self {
        let shared = Rc::new_cyclic(|weak: &Weak<Shared<H>>| {
            let open = |kind: RevealKind, options: ObserverOptions| {
                let weak = weak.clone();
                let handle = host.create_observer(
                    options,
                    Box::new(move |entries: &[IntersectionEntry]| {
                        if let Some(shared) = weak.upgrade() {
                            shared.on_entries(kind, entries);
                        }
                    }),
                );
                Channel {
                    handle,
                    threshold: options.threshold,
                    registrations: HashMap::new(),
                }
            };
            let channels = Channels {
                class: open(RevealKind::ClassToggle, config.class_observer()),
                counter: open(RevealKind::CounterRamp, ObserverOptions::default()),
                progress: open(RevealKind::ProgressBarExpand, ObserverOptions::default()),
            };
            Shared {
                host: host.clone(),
                config,
                channels: RefCell::new(channels),
            }
        });
        Self { shared }
    }

    pub fn config(&self) -> &RevealConfig {
        &self.shared.config
    }

    /// Starts watching `elements` for `kind`. Each element is validated on
    /// its own; rejected elements are logged and reported, the rest proceed.
    pub fn register_for_reveal(
        &self,
        elements: impl IntoIterator<Item = ElementId>,
        kind: RevealKind,
    ) -> RegistrationReport {
        let mut report = RegistrationReport::default();
        for el in elements {
            match self.shared.register(el, kind) {
                Ok(()) => report.registered.push(el),
                Err(e) => {
                    warn!("reveal: skipping {kind:?} registration: {e}");
                    report.rejected.push(e);
                }
            }
        }
        report
    }

    /// Registers every element matching the configured selectors.
    pub fn scan_document(&self) -> RegistrationReport {
        let cfg = &self.shared.config;
        let host = &self.shared.host;
        let mut report = RegistrationReport::default();
        for (kind, selector) in [
            (RevealKind::ClassToggle, &cfg.reveal_selector),
            (RevealKind::CounterRamp, &cfg.counter_selector),
            (RevealKind::ProgressBarExpand, &cfg.progress_selector),
        ] {
            report.merge(self.register_for_reveal(host.query_all(selector), kind));
        }
        info!(
            "reveal: watching {} element(s), {} rejected",
            report.registered.len(),
            report.rejected.len()
        );
        report
    }

    /// Feeds a notification batch as if it came from the `kind` observer.
    pub fn deliver(&self, kind: RevealKind, entries: &[IntersectionEntry]) {
        self.shared.on_entries(kind, entries);
    }

    pub fn state(&self, el: ElementId, kind: RevealKind) -> Option<RevealState> {
        self.shared
            .channels
            .borrow()
            .get(kind)
            .registrations
            .get(&el)
            .map(|r| r.state)
    }

    pub fn watching(&self, kind: RevealKind) -> usize {
        self.shared
            .channels
            .borrow()
            .get(kind)
            .registrations
            .values()
            .filter(|r| r.state == RevealState::Watching)
            .count()
    }

    pub fn observer(&self, kind: RevealKind) -> ObserverHandle {
        self.shared.channels.borrow().get(kind).handle
    }
}

impl<H: Host> Shared<H> {
    fn register(&self, el: ElementId, kind: RevealKind) -> Result<(), RevealError> {
        if !self.host.is_connected(el) {
            return Err(RevealError::Detached(el));
        }
        if self
            .channels
            .borrow()
            .get(kind)
            .registrations
            .contains_key(&el)
        {
            return Err(RevealError::AlreadyRegistered(el));
        }
        let plan = self.plan_for(el, kind)?;
        let handle = {
            let mut channels = self.channels.borrow_mut();
            let channel = channels.get_mut(kind);
            channel.registrations.insert(
                el,
                Registration {
                    plan,
                    state: RevealState::Watching,
                },
            );
            channel.handle
        };
        self.host.observe(handle, el);
        Ok(())
    }

    fn plan_for(&self, el: ElementId, kind: RevealKind) -> Result<Plan, RevealError> {
        match kind {
            RevealKind::ClassToggle => Ok(Plan::Class),
            RevealKind::CounterRamp => {
                let attrs = &self.config.counter_attributes;
                let raw = attrs
                    .iter()
                    .find_map(|name| self.host.attribute(el, name))
                    .ok_or_else(|| RevealError::MissingCounterTarget {
                        element: el,
                        attributes: attrs.clone(),
                    })?;
                let target = parse_counter_target(el, &raw)?;
                Ok(Plan::Counter { target })
            }
            RevealKind::ProgressBarExpand => {
                let width = self
                    .host
                    .attribute(el, &self.config.progress_attribute)
                    .filter(|w| !w.trim().is_empty())
                    .or_else(|| self.host.style(el, "width"))
                    .ok_or(RevealError::MissingProgressWidth(el))?;
                Ok(Plan::Progress {
                    width: width.trim().to_string(),
                })
            }
        }
    }

    fn on_entries(&self, kind: RevealKind, entries: &[IntersectionEntry]) {
        for entry in entries {
            let fired = {
                let mut channels = self.channels.borrow_mut();
                let channel = channels.get_mut(kind);
                if !entry.is_intersecting || entry.ratio < channel.threshold {
                    continue;
                }
                let handle = channel.handle;
                match channel.registrations.get_mut(&entry.target) {
                    Some(reg) if reg.state == RevealState::Watching => {
                        reg.state = RevealState::Fired;
                        Some((handle, reg.plan.clone()))
                    }
                    Some(_) => None,
                    None => {
                        debug!("reveal: notification for unregistered {}", entry.target);
                        None
                    }
                }
            };
            if let Some((handle, plan)) = fired {
                self.host.unobserve(handle, entry.target);
                self.run(entry.target, plan);
            }
        }
    }

    fn run(&self, el: ElementId, plan: Plan) {
        debug!("reveal: firing {plan:?} on {el}");
        match plan {
            Plan::Class => self.host.add_class(el, &self.config.reveal_class),
            Plan::Counter { target } => {
                let ramp = CounterRamp::new(target, self.host.now(), self.config.counter_spec());
                schedule_counter_frame(self.host.clone(), el, ramp);
            }
            Plan::Progress { width } => {
                self.host
                    .set_style(el, "width", &self.config.progress_reset_width);
                let host = self.host.clone();
                self.host.set_timeout(
                    self.config.progress_delay(),
                    Box::new(move || host.set_style(el, "width", &width)),
                );
            }
        }
    }
}

fn schedule_counter_frame<H: Host>(host: Rc<H>, el: ElementId, ramp: CounterRamp) {
    let next = host.clone();
    host.request_frame(Box::new(move |now| {
        let sample = ramp.sample(now);
        next.set_text(el, &sample.value.to_string());
        if !sample.done {
            schedule_counter_frame(next, el, ramp);
        }
    }));
}

/// Parses a counter target. Surrounding whitespace is ignored; anything
/// else that is not a plain non-negative integer is a defect.
pub fn parse_counter_target(el: ElementId, raw: &str) -> Result<u64, RevealError> {
    let trimmed = raw.trim();
    match trimmed.parse::<i64>() {
        Ok(v) if v < 0 => Err(RevealError::NegativeCounterTarget {
            element: el,
            value: v,
        }),
        Ok(v) => Ok(v as u64),
        Err(_) => trimmed
            .parse::<u64>()
            .map_err(|_| RevealError::InvalidCounterTarget {
                element: el,
                value: raw.to_string(),
            }),
    }
}
