//! Constraint-validation feedback for `.needs-validation` forms.

use std::rc::Rc;

use log::debug;

use crate::host::{DomEvent, ElementId, EventKind, EventTarget, Host, Validity};

pub const FORM_SELECTOR: &str = ".needs-validation";
pub const FIELD_SELECTOR: &str = "input, select, textarea";

/// The feedback line for a failed field, or `None` when the failure is of a
/// kind that has no canned message.
pub fn feedback_message(
    validity: Validity,
    field_name: Option<&str>,
    min_length: Option<u32>,
    pattern_error: Option<&str>,
) -> Option<String> {
    if validity.contains(Validity::VALUE_MISSING) {
        let name = field_name.filter(|n| !n.is_empty()).unwrap_or("This field");
        Some(format!("{name} is required."))
    } else if validity.contains(Validity::TYPE_MISMATCH) {
        Some("Please enter a valid format.".to_string())
    } else if validity.contains(Validity::TOO_SHORT) {
        Some(format!("Minimum {} characters required.", min_length.unwrap_or(0)))
    } else if validity.contains(Validity::PATTERN_MISMATCH) {
        Some(
            pattern_error
                .filter(|m| !m.is_empty())
                .unwrap_or("Invalid format.")
                .to_string(),
        )
    } else {
        None
    }
}

/// Marks `field` valid or invalid and refreshes the sibling feedback text.
pub fn validate_field<H: Host>(host: &H, field: ElementId) -> bool {
    if host.check_validity(field) {
        host.remove_class(field, "is-invalid");
        host.add_class(field, "is-valid");
        return true;
    }
    host.remove_class(field, "is-valid");
    host.add_class(field, "is-invalid");

    let feedback = host
        .parent(field)
        .and_then(|p| host.query_within(p, ".invalid-feedback").into_iter().next());
    if let Some(feedback) = feedback {
        let message = feedback_message(
            host.validity(field),
            host.attribute(field, "data-field-name").as_deref(),
            host.min_length(field),
            host.attribute(field, "data-pattern-error").as_deref(),
        );
        if let Some(message) = message {
            host.set_text(feedback, &message);
        }
    }
    false
}

/// Wires submit gating and per-field feedback. Returns the number of forms.
pub fn install<H: Host>(host: &Rc<H>) -> usize {
    let forms = host.query_all(FORM_SELECTOR);
    for &form in &forms {
        let weak = Rc::downgrade(host);
        host.listen(
            EventTarget::Element(form),
            EventKind::Submit,
            Box::new(move |event: &mut DomEvent| {
                let Some(host) = weak.upgrade() else {
                    return;
                };
                if !host.check_validity(form) {
                    debug!("forms: blocked invalid submit of {form}");
                    event.prevent_default();
                    event.stop_propagation();
                }
                host.add_class(form, "was-validated");
            }),
        );

        for field in host.query_within(form, FIELD_SELECTOR) {
            let weak = Rc::downgrade(host);
            host.listen(
                EventTarget::Element(field),
                EventKind::Blur,
                Box::new(move |_: &mut DomEvent| {
                    if let Some(host) = weak.upgrade() {
                        validate_field(&*host, field);
                    }
                }),
            );
            let weak = Rc::downgrade(host);
            host.listen(
                EventTarget::Element(field),
                EventKind::Input,
                Box::new(move |_: &mut DomEvent| {
                    if let Some(host) = weak.upgrade()
                        && host.has_class(field, "is-invalid")
                    {
                        validate_field(&*host, field);
                    }
                }),
            );
        }
    }
    forms.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Document;
    use crate::sim::SimHost;

    #[test]
    fn message_precedence() {
        let all = Validity::VALUE_MISSING | Validity::TOO_SHORT | Validity::PATTERN_MISMATCH;
        assert_eq!(
            feedback_message(all, Some("Email"), Some(3), None).as_deref(),
            Some("Email is required.")
        );
        assert_eq!(
            feedback_message(Validity::VALUE_MISSING, None, None, None).as_deref(),
            Some("This field is required.")
        );
        assert_eq!(
            feedback_message(Validity::TYPE_MISMATCH | Validity::TOO_SHORT, None, Some(8), None)
                .as_deref(),
            Some("Please enter a valid format.")
        );
        assert_eq!(
            feedback_message(Validity::TOO_SHORT, None, Some(8), None).as_deref(),
            Some("Minimum 8 characters required.")
        );
        assert_eq!(
            feedback_message(Validity::PATTERN_MISMATCH, None, None, Some("Digits only")).as_deref(),
            Some("Digits only")
        );
        assert_eq!(
            feedback_message(Validity::PATTERN_MISMATCH, None, None, None).as_deref(),
            Some("Invalid format.")
        );
        assert_eq!(feedback_message(Validity::OTHER, None, None, None), None);
    }

    struct Fixture {
        host: Rc<SimHost>,
        form: ElementId,
        field: ElementId,
        feedback: ElementId,
    }

    fn fixture() -> Fixture {
        let host = Rc::new(SimHost::new());
        let form = host.spawn("form").class("needs-validation").attach();
        let group = host.spawn("div").child_of(form);
        let field = host
            .spawn("input")
            .attr("data-field-name", "Email")
            .child_of(group);
        let feedback = host
            .spawn("div")
            .class("invalid-feedback")
            .text("Looks wrong")
            .child_of(group);
        assert_eq!(install(&host), 1);
        Fixture {
            host,
            form,
            field,
            feedback,
        }
    }

    #[test]
    fn invalid_submit_is_blocked() {
        let f = fixture();
        f.host.set_validity(f.field, Validity::VALUE_MISSING);
        let event = f.host.dispatch(EventTarget::Element(f.form), EventKind::Submit);
        assert!(event.is_default_prevented());
        assert!(event.is_propagation_stopped());
        assert!(f.host.has_class(f.form, "was-validated"));
    }

    #[test]
    fn valid_submit_goes_through() {
        let f = fixture();
        let event = f.host.dispatch(EventTarget::Element(f.form), EventKind::Submit);
        assert!(!event.is_default_prevented());
        assert!(f.host.has_class(f.form, "was-validated"));
    }

    #[test]
    fn blur_validates_and_input_revalidates_only_invalid_fields() {
        let f = fixture();
        let target = EventTarget::Element(f.field);

        f.host.dispatch(target, EventKind::Input);
        assert_eq!(f.host.class_list(f.field), "");

        f.host.set_validity(f.field, Validity::VALUE_MISSING);
        f.host.dispatch(target, EventKind::Blur);
        assert!(f.host.has_class(f.field, "is-invalid"));
        assert_eq!(f.host.text(f.feedback), "Email is required.");

        f.host.set_validity(f.field, Validity::empty());
        f.host.dispatch(target, EventKind::Input);
        assert_eq!(f.host.class_list(f.field), "is-valid");

        f.host.set_validity(f.field, Validity::VALUE_MISSING);
        f.host.dispatch(target, EventKind::Input);
        assert_eq!(f.host.class_list(f.field), "is-valid");
    }

    #[test]
    fn unknown_failure_keeps_feedback_text() {
        let f = fixture();
        f.host.set_validity(f.field, Validity::OTHER);
        assert!(!validate_field(&*f.host, f.field));
        assert_eq!(f.host.text(f.feedback), "Looks wrong");
    }
}
