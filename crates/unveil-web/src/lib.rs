//! Browser host for unveil (wasm32).
//!
//! [`WebHost`] implements the `unveil-core` host traits over `web-sys`;
//! `start` wires the page once the module is loaded. Configuration parsing
//! is platform independent so it can be tested natively.

pub mod options;
#[cfg(any(target_arch = "wasm32", test))]
mod slots;

#[cfg(target_arch = "wasm32")]
mod host;
#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(target_arch = "wasm32")]
pub use host::WebHost;
pub use options::{load_config, parse_log_level};
