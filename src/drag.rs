//! Pointer-driven window moves.
//!
//! A `DragController` tracks at most one drag at a time and turns pointer
//! motion into target positions. It owns no windows: the manager tells it
//! what the dragged window currently is and applies whatever it returns.

use crate::input::ButtonMask;
use crate::layout::Bounds;
use crate::window::{ManagementState, WindowId, WindowState};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub window: WindowId,
    pub start_x: f64,
    pub start_y: f64,
    pub origin_left: f64,
    pub origin_top: f64,
    undocked: bool,
}

impl DragSession {
    fn position(&self, dx: f64, dy: f64) -> (f64, f64) {
        // Never drag the title bar above the viewport. A window that was
        // placed there programmatically may stay where it is.
        let floor = self.origin_top.min(0.0);
        (self.origin_left + dx, (self.origin_top + dy).max(floor))
    }
}

/// What the dragged window currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSubject {
    pub state: WindowState,
    pub management: ManagementState,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragUpdate {
    /// No drag in progress, or the window cannot move right now.
    Ignored,
    /// The primary button is no longer the only one down.
    Ended,
    /// A docked tile moved, but not yet far enough to leave the dock.
    Held,
    /// A docked tile crossed the undock threshold; detach it, then move it.
    Undock { left: f64, top: f64 },
    MoveTo { left: f64, top: f64 },
}

#[derive(Debug, Default)]
pub struct DragController {
    active: Option<DragSession>,
}

impl DragController {
    pub fn begin(&mut self, window: WindowId, x: f64, y: f64, origin: Bounds) {
        tracing::trace!(window_id = %window, x, y, "drag started");
        self.active = Some(DragSession {
            window,
            start_x: x,
            start_y: y,
            origin_left: origin.left,
            origin_top: origin.top,
            undocked: false,
        });
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.active.as_ref()
    }

    pub fn is_dragging(&self, window: WindowId) -> bool {
        self.active.is_some_and(|session| session.window == window)
    }

    pub fn end(&mut self) -> Option<DragSession> {
        self.active.take()
    }

    /// Drop the session if it belongs to `window`.
    pub fn cancel(&mut self, window: WindowId) {
        if self.is_dragging(window) {
            self.active = None;
        }
    }

    pub fn update(
        &mut self,
        x: f64,
        y: f64,
        buttons: ButtonMask,
        subject: DragSubject,
        undock_threshold: f64,
    ) -> DragUpdate {
        let Some(session) = self.active.as_mut() else {
            return DragUpdate::Ignored;
        };
        if !buttons.primary_only() {
            self.active = None;
            return DragUpdate::Ended;
        }
        if !matches!(subject.state, WindowState::Normal | WindowState::Minimized) {
            return DragUpdate::Ignored;
        }

        let dx = x - session.start_x;
        let dy = y - session.start_y;
        let (left, top) = session.position(dx, dy);

        let docked = subject.state == WindowState::Minimized
            && subject.management == ManagementState::Managed;
        if docked && !session.undocked {
            if dx.hypot(dy) < undock_threshold {
                return DragUpdate::Held;
            }
            session.undocked = true;
            return DragUpdate::Undock { left, top };
        }
        DragUpdate::MoveTo { left, top }
    }
}
