//! Platform glue
//!
//! The browser entry point lives in `main.rs` (it needs the DOM). Natively the
//! game runs headless: a driver thread and an optional stdin input thread feed
//! one bounded channel, and the session loop consumes it in order.

#[cfg(not(target_arch = "wasm32"))]
mod headless;

#[cfg(not(target_arch = "wasm32"))]
pub use headless::{HeadlessOptions, LoopEvent, RunSummary, run, session_loop};
