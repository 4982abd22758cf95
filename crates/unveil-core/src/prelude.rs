pub use crate::animation::{AnimationSpec, Clock, CounterRamp, Easing, RampSample};
pub use crate::clipboard::{copy_to_clipboard, selection_copy};
pub use crate::config::{EnhanceConfig, LoadingConfig, NavbarConfig, NotifyConfig, RevealConfig};
pub use crate::effects::Dispose;
pub use crate::error::*;
pub use crate::format::{DateFormat, escape_html, format_date, format_number, is_valid_email};
pub use crate::host::{
    Clipboard, Document, DomEvent, ElementId, EventKind, EventTarget, FrameScheduler, Host,
    IntersectionEntry, IntersectionService, KeyValueStore, ObserverHandle, ObserverOptions,
    RootMargin, ScrollBehavior, TimerId, Timers, Validity,
};
pub use crate::loading::{hide_loading_state, show_loading_state};
pub use crate::notify::{Banner, NotificationKind, Notifier};
pub use crate::page::{EnhanceSummary, Page, enhance_page};
pub use crate::reveal::{RegistrationReport, RevealKind, RevealState, Revealer};
pub use crate::sim::SimHost;
pub use crate::storage::Storage;
pub use crate::timing::{Debounced, Throttled, debounce, throttle};
