//! Floating window management with a minimize dock.
//!
//! The core (`window`, `layout`, `drag`, `input`) is renderer-agnostic: it
//! keeps the registry, stacking order, focus and dock, and drives a
//! `Surface` implementation. `tui` provides a terminal surface built on
//! ratatui; `window::surface::HeadlessSurface` records calls for tests and
//! headless hosts.

pub mod constants;
pub mod drag;
pub mod drivers;
pub mod error;
pub mod event_loop;
pub mod input;
pub mod layout;
pub mod log_buffer;
pub mod term_color;
pub mod tui;
pub mod window;

pub use error::{ConfigError, WmError};
pub use window::{WindowEvent, WindowId, WindowManager, WindowState};
