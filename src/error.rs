//! Error types shared by the window manager and its configuration layer.

use thiserror::Error;

use crate::window::config::Axis;
use crate::window::{WindowId, WindowState};

/// Raised while parsing or validating construction parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid dimension {0:?}: expected pixels (\"640\", \"640px\") or a viewport share (\"50%\", \"50vw\", \"50vh\")")]
    InvalidDimension(String),
    #[error("{input:?} cannot size a {axis}: vw applies to widths and vh to heights")]
    ViewportUnitAxis { input: String, axis: Axis },
    #[error("invalid position {0:?}: expected pixels, a percentage or \"center\"")]
    InvalidPosition(String),
    #[error("invalid color {0:?}: expected a name, #rgb, #rrggbb, rgb(..) or rgba(..)")]
    InvalidColor(String),
    #[error("invalid font size {0:?}: expected a number followed by px, pt, em, rem, %, vw or vh")]
    InvalidFontSize(String),
    #[error("invalid button set {0:?}: expected both, close, minimize or none")]
    InvalidButtons(String),
    #[error("invalid conflict policy {0:?}: expected queue or restart")]
    InvalidConflictPolicy(String),
    #[error("{field} must be a finite, non-negative number (got {value})")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Raised by window manager operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WmError {
    #[error("no window with id {0}")]
    UnknownWindow(WindowId),
    #[error("cannot {op} window {id} while it is {state:?}")]
    InvalidState {
        id: WindowId,
        state: WindowState,
        op: &'static str,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl WmError {
    pub(crate) fn invalid_state(id: WindowId, state: WindowState, op: &'static str) -> Self {
        Self::InvalidState { id, state, op }
    }
}
