//! Copy-to-clipboard with a manual-selection fallback.

use log::{error, warn};

use crate::host::Host;
use crate::notify::{NotificationKind, Notifier};

pub const COPIED: &str = "Copied to clipboard!";
pub const COPY_FAILED: &str = "Failed to copy to clipboard";

/// Copies `text`, preferring the asynchronous clipboard. A rejected or
/// missing clipboard falls back to [`selection_copy`]. Either way the user
/// gets a banner with the outcome.
pub fn copy_to_clipboard<H: Host>(notifier: &Notifier<H>, text: &str) {
    let host = notifier.host();
    if !host.clipboard_available() {
        selection_copy(notifier, text);
        return;
    }
    let notifier = notifier.clone();
    let owned = text.to_string();
    host.write_clipboard(
        text,
        Box::new(move |result| match result {
            Ok(()) => {
                notifier.show(
                    COPIED,
                    NotificationKind::Success,
                    notifier.config().clipboard_duration(),
                );
            }
            Err(e) => {
                warn!("clipboard: write rejected ({e}); using selection copy");
                selection_copy(&notifier, &owned);
            }
        }),
    );
}

/// Copies through an off-screen textarea and the legacy copy command.
/// Returns whether the command reported success.
pub fn selection_copy<H: Host>(notifier: &Notifier<H>, text: &str) -> bool {
    let host = notifier.host();
    let area = host.create_element("textarea");
    host.set_value(area, text);
    host.set_style(area, "position", "fixed");
    host.set_style(area, "left", "-999999px");
    host.append_to_body(area);
    host.focus_and_select(area);

    let copied = match host.exec_copy() {
        Ok(true) => true,
        Ok(false) => {
            warn!("clipboard: copy command refused");
            false
        }
        Err(e) => {
            error!("clipboard: copy command failed: {e}");
            false
        }
    };
    host.remove(area);

    let duration = notifier.config().clipboard_duration();
    if copied {
        notifier.show(COPIED, NotificationKind::Success, duration);
    } else {
        notifier.show(COPY_FAILED, NotificationKind::Danger, duration);
    }
    copied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NotifyConfig;
    use crate::host::Document;
    use crate::sim::{ClipboardMode, ExecCopy, SimHost};
    use std::rc::Rc;
    use std::time::Duration;

    fn setup(mode: ClipboardMode, exec: ExecCopy) -> (Rc<SimHost>, Notifier<SimHost>) {
        let host = Rc::new(SimHost::new());
        host.set_clipboard_mode(mode);
        host.set_exec_copy(exec);
        (host.clone(), Notifier::new(host, NotifyConfig::default()))
    }

    fn banner_text(host: &SimHost) -> Vec<String> {
        host.query_all(".alert")
            .into_iter()
            .map(|b| host.text(host.children(b)[0]))
            .collect()
    }

    #[test]
    fn async_clipboard_success() {
        let (host, notifier) = setup(ClipboardMode::Grants, ExecCopy::Throws);
        copy_to_clipboard(&notifier, "ref-42");
        assert!(banner_text(&host).is_empty());
        host.advance(Duration::from_millis(1));
        assert_eq!(host.clipboard_text().as_deref(), Some("ref-42"));
        assert_eq!(banner_text(&host), vec![COPIED]);
        assert!(host.query_all(".alert-success").len() == 1);
        host.advance(Duration::from_millis(3000));
        assert!(banner_text(&host).is_empty());
    }

    #[test]
    fn rejected_clipboard_falls_back_to_selection() {
        let (host, notifier) = setup(ClipboardMode::Denies, ExecCopy::Works);
        copy_to_clipboard(&notifier, "fallback me");
        host.advance(Duration::from_millis(1));
        assert_eq!(host.clipboard_text().as_deref(), Some("fallback me"));
        assert_eq!(banner_text(&host), vec![COPIED]);
        assert!(host.query_all("textarea").is_empty());
    }

    #[test]
    fn missing_clipboard_uses_selection_synchronously() {
        let (host, notifier) = setup(ClipboardMode::Unavailable, ExecCopy::Works);
        copy_to_clipboard(&notifier, "now");
        assert_eq!(host.clipboard_text().as_deref(), Some("now"));
        let area = host.focused().expect("textarea was focused");
        assert_eq!(host.value(area), "now");
        assert_eq!(host.style(area, "left").as_deref(), Some("-999999px"));
        assert!(!host.is_connected(area));
    }

    #[test]
    fn failing_copy_command_reports_failure() {
        for exec in [ExecCopy::Throws, ExecCopy::Refuses] {
            let (host, notifier) = setup(ClipboardMode::Unavailable, exec);
            assert!(!selection_copy(&notifier, "x"));
            assert_eq!(banner_text(&host), vec![COPY_FAILED]);
            assert_eq!(host.query_all(".alert-danger").len(), 1);
        }
    }
}
