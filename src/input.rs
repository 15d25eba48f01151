//! Host input, already resolved to window surfaces.
//!
//! Hosts translate whatever their platform delivers (terminal mouse
//! reports, DOM events, ...) into `HostEvent`s and hand them to
//! `WindowManager::handle_event`.

use crate::constants::PRIMARY_BUTTON;
use crate::window::surface::{SurfaceHandle, SurfacePart};

/// Pressed pointer buttons, one bit per button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonMask(pub u8);

impl ButtonMask {
    pub const NONE: Self = Self(0);
    pub const PRIMARY: Self = Self(PRIMARY_BUTTON);

    /// Only the primary button is down.
    pub fn primary_only(self) -> bool {
        self.0 == PRIMARY_BUTTON
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
}

/// The window part under the pointer, as reported by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitTarget {
    pub surface: SurfaceHandle,
    pub part: SurfacePart,
}

impl HitTarget {
    pub fn new(surface: SurfaceHandle, part: SurfacePart) -> Self {
        Self { surface, part }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: f64,
    pub y: f64,
    pub buttons: ButtonMask,
    /// `None` when the pointer is over no window.
    pub target: Option<HitTarget>,
}

impl PointerEvent {
    pub fn down(x: f64, y: f64, target: Option<HitTarget>) -> Self {
        Self {
            kind: PointerKind::Down,
            x,
            y,
            buttons: ButtonMask::PRIMARY,
            target,
        }
    }

    pub fn moved(x: f64, y: f64, buttons: ButtonMask) -> Self {
        Self {
            kind: PointerKind::Move,
            x,
            y,
            buttons,
            target: None,
        }
    }

    pub fn up(x: f64, y: f64, target: Option<HitTarget>) -> Self {
        Self {
            kind: PointerKind::Up,
            x,
            y,
            buttons: ButtonMask::NONE,
            target,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    Pointer(PointerEvent),
    /// The viewport changed size.
    Resize { width: f64, height: f64 },
    /// Keyboard focus moved into a window, or out of all of them.
    FocusIn(Option<SurfaceHandle>),
}

impl From<PointerEvent> for HostEvent {
    fn from(event: PointerEvent) -> Self {
        HostEvent::Pointer(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_only_rejects_chords() {
        assert!(ButtonMask::PRIMARY.primary_only());
        assert!(!ButtonMask::NONE.primary_only());
        assert!(!ButtonMask(0b011).primary_only());
        assert!(!ButtonMask(0b010).primary_only());
    }
}
