//! # Page enhancements
//!
//! Unveil attaches small, progressive behaviors to a server-rendered page.
//! The centerpiece is the [`Revealer`](reveal::Revealer): elements are
//! registered once, watched for visibility, and fire exactly one effect the
//! first time they are seen:
//!
//! - `ClassToggle` adds the reveal class (`animate-in`).
//! - `CounterRamp` counts the element text up from 0 to its `data-count`
//!   target over two seconds, one step per animation frame.
//! - `ProgressBarExpand` collapses a bar to `0%` and, after a short delay,
//!   expands it to its `data-progress` width.
//!
//! Around it sit the rest of the page script: navbar scroll styling, form
//! validation feedback, file-input labels, button loading states,
//! notification banners, clipboard copy, a JSON storage façade, and a few
//! formatters.
//!
//! ## Hosts
//!
//! Nothing here touches a browser directly. Every platform service
//! (document, intersection observers, animation frames, timers, clock,
//! clipboard, storage) is a trait in [`host`], bundled as [`Host`]. The
//! `unveil-web` crate implements it over `web-sys`; [`sim::SimHost`]
//! implements it in memory for tests and replays.
//!
//! ```rust
//! use std::rc::Rc;
//! use std::time::Duration;
//! use unveil_core::prelude::*;
//!
//! let host = Rc::new(SimHost::new());
//! let stat = host.spawn("span").attr("data-count", "150").attach();
//!
//! let page = enhance_page(host.clone(), EnhanceConfig::default());
//! assert_eq!(page.summary().reveal.registered, vec![stat]);
//!
//! host.set_visibility(stat, 1.0);
//! host.advance(Duration::from_millis(2100));
//! assert_eq!(host.text(stat), "150");
//! ```
//!
//! ## Lifetimes
//!
//! Installed behaviors hold only weak references to the host. Dropping the
//! last `Rc` to the host (or the [`Revealer`](reveal::Revealer)) silences
//! pending callbacks instead of keeping the page alive.

pub mod animation;
pub mod clipboard;
pub mod config;
pub mod effects;
pub mod error;
pub mod format;
pub mod forms;
pub mod host;
pub mod loading;
pub mod navbar;
pub mod notify;
pub mod page;
pub mod prelude;
pub mod reveal;
pub mod sim;
pub mod storage;
pub mod tests;
pub mod timing;
pub mod uploads;

pub use error::*;
pub use host::Host;
pub use page::{Page, enhance_page};
