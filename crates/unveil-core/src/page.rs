//! Page bootstrap: wires every behavior against a host.

use std::rc::Rc;

use log::{debug, info};

use crate::clipboard;
use crate::config::EnhanceConfig;
use crate::effects::Dispose;
use crate::forms;
use crate::host::Host;
use crate::loading;
use crate::navbar;
use crate::notify::{NotificationKind, Notifier};
use crate::reveal::{RegistrationReport, RevealKind, Revealer};
use crate::storage::Storage;
use crate::uploads;

/// What [`enhance_page`] found and wired.
#[derive(Debug, Default)]
pub struct EnhanceSummary {
    pub navbar: bool,
    pub anchors: usize,
    pub reveal: RegistrationReport,
    pub validated_forms: usize,
    pub file_inputs: usize,
    pub loading_forms: usize,
}

/// An enhanced page and the services scripts can call into.
pub struct Page<H: Host> {
    host: Rc<H>,
    config: EnhanceConfig,
    revealer: Revealer<H>,
    notifier: Notifier<H>,
    storage: Storage<H>,
    summary: EnhanceSummary,
}

/// Installs navbar, reveal, form validation, upload label and loading
/// behaviors, in that order.
pub fn enhance_page<H: Host>(host: Rc<H>, config: EnhanceConfig) -> Page<H> {
    let navbar = navbar::install_scroll_style(&host, &config.navbar);
    let anchors = navbar::install_anchor_scrolling(&host, &config.navbar);

    let revealer = Revealer::new(host.clone(), config.reveal.clone());
    let reveal = revealer.scan_document();

    let validated_forms = forms::install(&host);
    let file_inputs = uploads::install(&host);
    let loading_forms = loading::install(&host, &config.loading);

    let summary = EnhanceSummary {
        navbar,
        anchors,
        reveal,
        validated_forms,
        file_inputs,
        loading_forms,
    };
    for kind in RevealKind::ALL {
        debug!("page: {} observer watching {}", kind.as_str(), revealer.watching(kind));
    }
    info!(
        "page: enhanced (navbar: {}, anchors: {}, reveal: {}, forms: {}, uploads: {})",
        summary.navbar,
        summary.anchors,
        summary.reveal.registered.len(),
        summary.validated_forms,
        summary.file_inputs
    );

    Page {
        notifier: Notifier::new(host.clone(), config.notify.clone()),
        storage: Storage::new(host.clone()),
        host,
        config,
        revealer,
        summary,
    }
}

impl<H: Host> Page<H> {
    pub fn host(&self) -> &Rc<H> {
        &self.host
    }

    pub fn config(&self) -> &EnhanceConfig {
        &self.config
    }

    pub fn revealer(&self) -> &Revealer<H> {
        &self.revealer
    }

    pub fn notifier(&self) -> &Notifier<H> {
        &self.notifier
    }

    pub fn storage(&self) -> &Storage<H> {
        &self.storage
    }

    pub fn summary(&self) -> &EnhanceSummary {
        &self.summary
    }

    pub fn notify(&self, message: &str, kind: NotificationKind) -> Dispose {
        self.notifier.notify(message, kind).dismiss
    }

    pub fn copy_to_clipboard(&self, text: &str) {
        clipboard::copy_to_clipboard(&self.notifier, text);
    }
}
