//! Navbar scroll styling and in-page anchor scrolling.

use std::rc::Rc;

use log::{debug, trace};

use crate::config::NavbarConfig;
use crate::host::{DomEvent, EventKind, EventTarget, Host, ScrollBehavior};

/// Toggles the scrolled class on the first navbar as the window scrolls.
/// Returns whether a navbar was found.
pub fn install_scroll_style<H: Host>(host: &Rc<H>, config: &NavbarConfig) -> bool {
    let Some(navbar) = host.query_selector(&config.selector) else {
        debug!("navbar: no element matches {:?}", config.selector);
        return false;
    };
    let weak = Rc::downgrade(host);
    let class = config.scrolled_class.clone();
    let threshold = config.scroll_threshold_px;
    host.listen(
        EventTarget::Window,
        EventKind::Scroll,
        Box::new(move |_: &mut DomEvent| {
            let Some(host) = weak.upgrade() else {
                return;
            };
            if host.scroll_y() > threshold {
                host.add_class(navbar, &class);
            } else {
                host.remove_class(navbar, &class);
            }
        }),
    );
    true
}

/// Makes `#fragment` links scroll smoothly to their target, leaving room
/// for the fixed navbar. Returns the number of links wired.
pub fn install_anchor_scrolling<H: Host>(host: &Rc<H>, config: &NavbarConfig) -> usize {
    let anchors = host.query_all(&config.anchor_selector);
    for &anchor in &anchors {
        let weak = Rc::downgrade(host);
        let offset = config.anchor_offset_px;
        host.listen(
            EventTarget::Element(anchor),
            EventKind::Click,
            Box::new(move |event: &mut DomEvent| {
                event.prevent_default();
                let Some(host) = weak.upgrade() else {
                    return;
                };
                let Some(href) = host.attribute(anchor, "href") else {
                    return;
                };
                if href.len() <= 1 {
                    return;
                }
                let Some(target) = host.query_selector(&href) else {
                    trace!("navbar: anchor {href:?} has no target");
                    return;
                };
                host.scroll_to(host.offset_top(target) - offset, ScrollBehavior::Smooth);
            }),
        );
    }
    anchors.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Document;
    use crate::sim::SimHost;

    #[test]
    fn navbar_class_follows_scroll_offset() {
        let host = Rc::new(SimHost::new());
        let nav = host.spawn("nav").class("navbar").attach();
        assert!(install_scroll_style(&host, &NavbarConfig::default()));

        host.set_scroll(50.0);
        assert!(!host.has_class(nav, "navbar-scrolled"));
        host.set_scroll(51.0);
        assert!(host.has_class(nav, "navbar-scrolled"));
        host.set_scroll(0.0);
        assert!(!host.has_class(nav, "navbar-scrolled"));
    }

    #[test]
    fn missing_navbar_is_skipped() {
        let host = Rc::new(SimHost::new());
        assert!(!install_scroll_style(&host, &NavbarConfig::default()));
        host.set_scroll(400.0);
    }

    #[test]
    fn anchor_scrolls_below_fixed_navbar() {
        let host = Rc::new(SimHost::new());
        let link = host.spawn("a").attr("href", "#pricing").attach();
        host.spawn("section").attr("id", "pricing").offset_top(1200.0).attach();
        assert_eq!(install_anchor_scrolling(&host, &NavbarConfig::default()), 1);

        let event = host.click(link);
        assert!(event.is_default_prevented());
        assert_eq!(host.last_scroll_to(), Some((1120.0, ScrollBehavior::Smooth)));
    }

    #[test]
    fn bare_or_dangling_anchor_stays_put() {
        let host = Rc::new(SimHost::new());
        let bare = host.spawn("a").attr("href", "#").attach();
        let dangling = host.spawn("a").attr("href", "#nowhere").attach();
        install_anchor_scrolling(&host, &NavbarConfig::default());

        assert!(host.click(bare).is_default_prevented());
        assert!(host.click(dangling).is_default_prevented());
        assert_eq!(host.last_scroll_to(), None);
    }
}
