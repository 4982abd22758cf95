//! Dismissible notification banners.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use log::debug;
use serde::Deserialize;

use crate::config::NotifyConfig;
use crate::effects::Dispose;
use crate::host::{DomEvent, ElementId, EventKind, EventTarget, Host};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Danger,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Danger => "danger",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "info" => Some(NotificationKind::Info),
            "success" => Some(NotificationKind::Success),
            "warning" => Some(NotificationKind::Warning),
            "danger" => Some(NotificationKind::Danger),
            _ => None,
        }
    }
}

pub struct Notifier<H: Host> {
    host: Rc<H>,
    config: NotifyConfig,
}

impl<H: Host> Clone for Notifier<H> {
    fn clone(&self) -> Self {
        Self {
            host: self.host.clone(),
            config: self.config.clone(),
        }
    }
}

/// A banner on screen and the handle that takes it down.
#[derive(Clone, Debug)]
pub struct Banner {
    pub element: ElementId,
    pub dismiss: Dispose,
}

impl<H: Host> Notifier<H> {
    pub fn new(host: Rc<H>, config: NotifyConfig) -> Self {
        Self { host, config }
    }

    pub fn host(&self) -> &Rc<H> {
        &self.host
    }

    pub fn config(&self) -> &NotifyConfig {
        &self.config
    }

    /// Shows `message` with the configured default duration.
    pub fn notify(&self, message: &str, kind: NotificationKind) -> Banner {
        self.show(message, kind, self.config.default_duration())
    }

    /// Appends a fixed banner to the body. It is removed after `duration`
    /// or when its close button is clicked, whichever happens first.
    pub fn show(&self, message: &str, kind: NotificationKind, duration: Duration) -> Banner {
        let host = &self.host;
        let banner = host.create_element("div");
        let kind_class = format!("alert-{}", kind.as_str());
        for class in [
            "alert",
            kind_class.as_str(),
            "alert-dismissible",
            "fade",
            "show",
            "position-fixed",
        ] {
            host.add_class(banner, class);
        }
        host.set_attribute(banner, "role", "alert");
        host.set_style(banner, "top", "100px");
        host.set_style(banner, "right", "20px");
        host.set_style(banner, "z-index", "9999");
        host.set_style(banner, "min-width", "300px");

        let body = host.create_element("span");
        host.set_text(body, message);
        host.append_child(banner, body);

        let close = host.create_element("button");
        host.set_attribute(close, "type", "button");
        host.add_class(close, "btn-close");
        host.set_attribute(close, "data-bs-dismiss", "alert");
        host.set_attribute(close, "aria-label", "Close");
        host.append_child(banner, close);

        host.append_to_body(banner);

        let timer = Rc::new(Cell::new(None));
        let dismiss = Dispose::new({
            let host = Rc::downgrade(host);
            let timer = timer.clone();
            move || {
                let Some(host) = host.upgrade() else {
                    return;
                };
                if let Some(id) = timer.take() {
                    host.clear_timeout(id);
                }
                if host.is_connected(banner) {
                    host.remove(banner);
                }
            }
        });
        timer.set(Some(host.set_timeout(
            duration,
            Box::new({
                let dismiss = dismiss.clone();
                move || dismiss.run()
            }),
        )));
        host.listen(
            EventTarget::Element(close),
            EventKind::Click,
            Box::new({
                let dismiss = dismiss.clone();
                move |_: &mut DomEvent| dismiss.run()
            }),
        );

        debug!("notify: {} banner for {duration:?}", kind.as_str());
        Banner {
            element: banner,
            dismiss,
        }
    }
}
