//! Busy state for submit buttons.

use std::rc::Rc;

use log::trace;

use crate::config::LoadingConfig;
use crate::format::escape_html;
use crate::host::{Document, DomEvent, ElementId, EventKind, EventTarget, Host};

const ORIGINAL_TEXT: &str = "data-original-text";
const ORIGINAL_DISABLED: &str = "data-original-disabled";
const SUBMIT_SELECTOR: &str = r#"button[type="submit"]"#;

pub fn spinner_markup(text: &str) -> String {
    format!(
        r#"<span class="spinner-border spinner-border-sm me-2" role="status" aria-hidden="true"></span>{}"#,
        escape_html(text)
    )
}

fn is_disabled<D: Document + ?Sized>(doc: &D, el: ElementId) -> bool {
    doc.attribute(el, "disabled").is_some()
}

fn set_disabled<D: Document + ?Sized>(doc: &D, el: ElementId, disabled: bool) {
    if disabled {
        doc.set_attribute(el, "disabled", "");
    } else {
        doc.remove_attribute(el, "disabled");
    }
}

/// Swaps the button content for a spinner and `text`, remembering what
/// was there so [`hide_loading_state`] can put it back.
pub fn show_loading_state<D: Document + ?Sized>(doc: &D, button: ElementId, text: &str) {
    let original = doc.inner_html(button);
    let was_disabled = is_disabled(doc, button);
    doc.set_inner_html(button, &spinner_markup(text));
    set_disabled(doc, button, true);
    doc.set_attribute(button, ORIGINAL_TEXT, &original);
    doc.set_attribute(button, ORIGINAL_DISABLED, if was_disabled { "true" } else { "false" });
}

/// Restores a button put into the loading state. Buttons without a stored
/// state are left alone.
pub fn hide_loading_state<D: Document + ?Sized>(doc: &D, button: ElementId) -> bool {
    let Some(original) = doc.attribute(button, ORIGINAL_TEXT) else {
        return false;
    };
    let was_disabled = doc.attribute(button, ORIGINAL_DISABLED).as_deref() == Some("true");
    doc.set_inner_html(button, &original);
    set_disabled(doc, button, was_disabled);
    doc.remove_attribute(button, ORIGINAL_TEXT);
    doc.remove_attribute(button, ORIGINAL_DISABLED);
    true
}

/// Puts the first submit button of each form into the loading state when
/// the form is submitted. A disabled first button or a submit that was
/// already prevented leaves the form alone. Returns the number of forms wired.
pub fn install<H: Host>(host: &Rc<H>, config: &LoadingConfig) -> usize {
    let forms = host.query_all("form");
    for &form in &forms {
        let weak = Rc::downgrade(host);
        let text = config.text.clone();
        host.listen(
            EventTarget::Element(form),
            EventKind::Submit,
            Box::new(move |event: &mut DomEvent| {
                if event.is_default_prevented() {
                    trace!("loading: submit of {form} was prevented");
                    return;
                }
                let Some(host) = weak.upgrade() else {
                    return;
                };
                let button = host
                    .query_within(form, SUBMIT_SELECTOR)
                    .into_iter()
                    .next()
                    .filter(|b| !is_disabled(&*host, *b));
                if let Some(button) = button {
                    show_loading_state(&*host, button, &text);
                }
            }),
        );
    }
    forms.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms;
    use crate::host::Validity;
    use crate::sim::SimHost;

    #[test]
    fn show_then_hide_restores_button() {
        let host = SimHost::new();
        let button = host.spawn("button").html("<b>Apply</b>").attach();
        show_loading_state(&host, button, "Sending <now>");

        insta::assert_snapshot!(
            host.inner_html(button),
            @r#"<span class="spinner-border spinner-border-sm me-2" role="status" aria-hidden="true"></span>Sending &lt;now&gt;"#
        );
        assert!(is_disabled(&host, button));
        assert_eq!(host.attribute(button, ORIGINAL_TEXT).as_deref(), Some("<b>Apply</b>"));

        assert!(hide_loading_state(&host, button));
        assert_eq!(host.inner_html(button), "<b>Apply</b>");
        assert!(!is_disabled(&host, button));
        assert_eq!(host.attribute(button, ORIGINAL_TEXT), None);
        assert_eq!(host.attribute(button, ORIGINAL_DISABLED), None);
    }

    #[test]
    fn hide_without_state_is_a_no_op() {
        let host = SimHost::new();
        let button = host.spawn("button").html("Go").attach();
        assert!(!hide_loading_state(&host, button));
        assert_eq!(host.inner_html(button), "Go");
    }

    #[test]
    fn originally_disabled_button_stays_disabled() {
        let host = SimHost::new();
        let button = host.spawn("button").attr("disabled", "").html("Go").attach();
        show_loading_state(&host, button, "Loading...");
        hide_loading_state(&host, button);
        assert!(is_disabled(&host, button));
    }

    #[test]
    fn submit_marks_first_submit_button() {
        let host = Rc::new(SimHost::new());
        let form = host.spawn("form").attach();
        let first = host.spawn("button").attr("type", "submit").html("Send").child_of(form);
        let second = host.spawn("button").attr("type", "submit").html("Draft").child_of(form);
        assert_eq!(install(&host, &LoadingConfig::default()), 1);

        host.dispatch(EventTarget::Element(form), EventKind::Submit);
        assert_eq!(host.text(first), "Loading...");
        assert_eq!(host.inner_html(second), "Draft");
    }

    #[test]
    fn disabled_first_submit_button_leaves_form_idle() {
        let host = Rc::new(SimHost::new());
        let form = host.spawn("form").attach();
        let off = host
            .spawn("button")
            .attr("type", "submit")
            .attr("disabled", "")
            .html("Old")
            .child_of(form);
        let on = host.spawn("button").attr("type", "submit").html("Send").child_of(form);
        install(&host, &LoadingConfig::default());

        host.dispatch(EventTarget::Element(form), EventKind::Submit);
        assert_eq!(host.inner_html(off), "Old");
        assert_eq!(host.inner_html(on), "Send");
        assert_eq!(host.attribute(on, "data-original-text"), None);
    }

    #[test]
    fn blocked_submit_keeps_button_idle() {
        let host = Rc::new(SimHost::new());
        let form = host.spawn("form").class("needs-validation").attach();
        let field = host.spawn("input").child_of(form);
        let button = host.spawn("button").attr("type", "submit").html("Send").child_of(form);
        forms::install(&host);
        install(&host, &LoadingConfig::default());

        host.set_validity(field, Validity::VALUE_MISSING);
        host.dispatch(EventTarget::Element(form), EventKind::Submit);
        assert_eq!(host.inner_html(button), "Send");

        host.set_validity(field, Validity::empty());
        host.dispatch(EventTarget::Element(form), EventKind::Submit);
        assert!(is_disabled(&*host, button));
    }
}
