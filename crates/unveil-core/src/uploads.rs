//! File-input labels that show the chosen file name.

use std::rc::Rc;

use crate::host::{DomEvent, EventKind, EventTarget, Host};

pub const FILE_INPUT_SELECTOR: &str = r#"input[type="file"]"#;
pub const SELECTED_CLASS: &str = "file-selected";
const FALLBACK_LABEL: &str = "Choose file";

/// Returns the number of file inputs wired.
pub fn install<H: Host>(host: &Rc<H>) -> usize {
    let inputs = host.query_all(FILE_INPUT_SELECTOR);
    for &input in &inputs {
        let label = host.next_element_sibling(input);
        let original = label
            .map(|l| host.text(l))
            .unwrap_or_else(|| FALLBACK_LABEL.to_string());
        let weak = Rc::downgrade(host);
        host.listen(
            EventTarget::Element(input),
            EventKind::Change,
            Box::new(move |_: &mut DomEvent| {
                let Some(host) = weak.upgrade() else {
                    return;
                };
                let chosen = host.selected_file_name(input);
                if let Some(label) = label {
                    host.set_text(label, chosen.as_deref().unwrap_or(&original));
                }
                let targets = std::iter::once(input).chain(label);
                if chosen.is_some() {
                    targets.for_each(|el| host.add_class(el, SELECTED_CLASS));
                } else {
                    targets.for_each(|el| host.remove_class(el, SELECTED_CLASS));
                }
            }),
        );
    }
    inputs.len()
}
