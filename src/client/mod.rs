//! Host implementations
//!
//! The API client only talks to the traits in [`crate::interface`]. This module
//! provides concrete hosts: reqwest + JSON file storage for native builds and
//! gloo_net + localStorage for the browser, plus in-process parts that work on
//! both.

pub mod memory;
pub mod platform;

#[cfg(feature = "no-wasm")]
pub mod native;

#[cfg(feature = "wasm")]
pub mod gloo;

pub use memory::{FixedCodeLogin, MemoryStorage};
pub use platform::{FnLogin, Platform};
