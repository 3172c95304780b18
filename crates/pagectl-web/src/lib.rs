#![forbid(unsafe_code)]

//! WASM frontend for the page behavior controller.
//!
//! The browser side is a thin shell around [`pagectl_core::PageController`]:
//! it probes the document once, implements `PageHost` with `web-sys`,
//! translates DOM events into actions and keeps a single `setTimeout`
//! armed for the controller's next timer deadline.
//!
//! Everything that does not need a browser (element identifiers, embedded
//! configuration parsing, console log formatting) lives in platform
//! independent modules and is tested natively.

pub mod config;
pub mod console;
pub mod dom;

#[cfg(target_arch = "wasm32")]
mod host;
#[cfg(target_arch = "wasm32")]
mod listeners;
#[cfg(target_arch = "wasm32")]
mod page;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{PageHandle, current_page, start};
