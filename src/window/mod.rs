pub mod config;
pub mod surface;
pub mod transition;

mod window_manager;

use std::collections::VecDeque;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::layout::{Bounds, DockPlacement, Viewport};
use config::{Buttons, WindowConfig, WindowStyle};
use surface::SurfaceHandle;
use transition::{LifecycleRequest, PendingTransition};

pub use window_manager::{WindowEvent, WindowManager};

static NEXT_WINDOW_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique window identifier. Never reused, even across managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WindowId(u64);

impl WindowId {
    pub(crate) fn next() -> Self {
        Self(NEXT_WINDOW_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Normal,
    Minimized,
    /// A minimize or restore is in flight.
    Animating,
    Invisible,
    /// Closed. Terminal.
    Invalid,
}

/// Who owns a minimized window's tray position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManagementState {
    /// The dock layout places it.
    #[default]
    Managed,
    /// The user's last drag (or an explicit position) places it.
    Unmanaged,
}

/// A cached dock cell. Compared as a whole so an unchanged placement does
/// not re-animate the tile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DockSlot {
    pub slot: usize,
    pub row: usize,
    pub x: f64,
    pub y: f64,
    pub tile_width: f64,
    pub tile_height: f64,
    pub valid_at: Viewport,
}

impl DockSlot {
    pub fn new(placement: DockPlacement, valid_at: Viewport) -> Self {
        Self {
            slot: placement.slot,
            row: placement.row,
            x: placement.x,
            y: placement.y,
            tile_width: placement.width,
            tile_height: placement.height,
            valid_at,
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.tile_width, self.tile_height)
    }
}

/// Viewport shares a window was sized with; re-applied on viewport resize.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportRelative {
    pub width_fraction: Option<f64>,
    pub height_fraction: Option<f64>,
}

impl ViewportRelative {
    fn from_config(config: &WindowConfig) -> Option<Self> {
        let relative = Self {
            width_fraction: config.width.viewport_fraction(),
            height_fraction: config.height.viewport_fraction(),
        };
        (relative.width_fraction.is_some() || relative.height_fraction.is_some())
            .then_some(relative)
    }

    pub fn apply(&self, bounds: Bounds, viewport: Viewport) -> Bounds {
        bounds.with_size(
            self.width_fraction
                .map_or(bounds.width, |f| viewport.width * f),
            self.height_fraction
                .map_or(bounds.height, |f| viewport.height * f),
        )
    }

    /// Re-derive the shares after the user resized the window by hand.
    fn rebase(&mut self, bounds: Bounds, viewport: Viewport) {
        if self.width_fraction.is_some() && viewport.width > 0.0 {
            self.width_fraction = Some(bounds.width / viewport.width);
        }
        if self.height_fraction.is_some() && viewport.height > 0.0 {
            self.height_fraction = Some(bounds.height / viewport.height);
        }
    }
}

pub type WindowCallback = Box<dyn FnMut(&Window)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackKind {
    Close,
    Resize,
    Focus,
    Blur,
    Minimize,
    Restore,
}

/// Host hooks, each invoked once the matching change has committed.
#[derive(Default)]
pub struct WindowCallbacks {
    on_close: Option<WindowCallback>,
    on_resize: Option<WindowCallback>,
    on_focus: Option<WindowCallback>,
    on_blur: Option<WindowCallback>,
    on_minimize: Option<WindowCallback>,
    on_restore: Option<WindowCallback>,
}

impl WindowCallbacks {
    pub fn on_close(&mut self, f: impl FnMut(&Window) + 'static) -> &mut Self {
        self.on_close = Some(Box::new(f));
        self
    }

    pub fn on_resize(&mut self, f: impl FnMut(&Window) + 'static) -> &mut Self {
        self.on_resize = Some(Box::new(f));
        self
    }

    pub fn on_focus(&mut self, f: impl FnMut(&Window) + 'static) -> &mut Self {
        self.on_focus = Some(Box::new(f));
        self
    }

    pub fn on_blur(&mut self, f: impl FnMut(&Window) + 'static) -> &mut Self {
        self.on_blur = Some(Box::new(f));
        self
    }

    pub fn on_minimize(&mut self, f: impl FnMut(&Window) + 'static) -> &mut Self {
        self.on_minimize = Some(Box::new(f));
        self
    }

    pub fn on_restore(&mut self, f: impl FnMut(&Window) + 'static) -> &mut Self {
        self.on_restore = Some(Box::new(f));
        self
    }

    fn slot(&mut self, kind: CallbackKind) -> &mut Option<WindowCallback> {
        match kind {
            CallbackKind::Close => &mut self.on_close,
            CallbackKind::Resize => &mut self.on_resize,
            CallbackKind::Focus => &mut self.on_focus,
            CallbackKind::Blur => &mut self.on_blur,
            CallbackKind::Minimize => &mut self.on_minimize,
            CallbackKind::Restore => &mut self.on_restore,
        }
    }
}

impl fmt::Debug for WindowCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowCallbacks")
            .field("on_close", &self.on_close.is_some())
            .field("on_resize", &self.on_resize.is_some())
            .field("on_focus", &self.on_focus.is_some())
            .field("on_blur", &self.on_blur.is_some())
            .field("on_minimize", &self.on_minimize.is_some())
            .field("on_restore", &self.on_restore.is_some())
            .finish()
    }
}

/// One managed window. Owned by the `WindowManager`; hosts read it through
/// `WindowManager::window` and change it through manager operations.
#[derive(Debug)]
pub struct Window {
    pub(crate) id: WindowId,
    pub(crate) surface: SurfaceHandle,
    pub(crate) title: String,
    pub(crate) state: WindowState,
    /// State to return to from `Invisible`.
    pub(crate) prior_state: WindowState,
    pub(crate) management: ManagementState,
    pub(crate) index: usize,
    pub(crate) z_order: i64,
    pub(crate) bounds: Bounds,
    pub(crate) restore_position: Bounds,
    pub(crate) dock_slot: Option<DockSlot>,
    /// Tile rectangle while minimized and unmanaged.
    pub(crate) tray_position: Option<Bounds>,
    pub(crate) viewport_relative: Option<ViewportRelative>,
    /// Viewport size when the window was last minimized.
    pub(crate) minimized_viewport: Option<Viewport>,
    /// Set when a drag took the window out of the dock.
    pub(crate) drag_flag: bool,
    pub(crate) center_x: bool,
    pub(crate) center_y: bool,
    pub(crate) buttons: Buttons,
    pub(crate) resizable: bool,
    pub(crate) draggable: bool,
    pub(crate) style: WindowStyle,
    pub(crate) pending: Option<PendingTransition>,
    pub(crate) queued: VecDeque<LifecycleRequest>,
    /// When the surface's tile re-placement animation should be ended.
    pub(crate) settle_at: Option<Instant>,
    pub(crate) callbacks: WindowCallbacks,
}

impl Window {
    fn new(id: WindowId, surface: SurfaceHandle, config: &WindowConfig, bounds: Bounds) -> Self {
        Self {
            id,
            surface,
            title: config.title.clone(),
            state: WindowState::Normal,
            prior_state: WindowState::Normal,
            management: ManagementState::Managed,
            index: 0,
            z_order: 0,
            bounds,
            restore_position: bounds,
            dock_slot: None,
            tray_position: None,
            viewport_relative: ViewportRelative::from_config(config),
            minimized_viewport: None,
            drag_flag: false,
            center_x: config.x.resolve(0.0).is_none(),
            center_y: config.y.resolve(0.0).is_none(),
            buttons: config.buttons,
            resizable: config.resizable,
            draggable: config.draggable,
            style: config.style.clone(),
            pending: None,
            queued: VecDeque::new(),
            settle_at: None,
            callbacks: WindowCallbacks::default(),
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn surface(&self) -> SurfaceHandle {
        self.surface
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn management_state(&self) -> ManagementState {
        self.management
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn z_order(&self) -> i64 {
        self.z_order
    }

    /// Last committed NORMAL bounds.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn restore_position(&self) -> Bounds {
        self.restore_position
    }

    pub fn dock_slot(&self) -> Option<DockSlot> {
        self.dock_slot
    }

    pub fn tray_position(&self) -> Option<Bounds> {
        self.tray_position
    }

    pub fn viewport_relative(&self) -> Option<ViewportRelative> {
        self.viewport_relative
    }

    pub fn drag_flag(&self) -> bool {
        self.drag_flag
    }

    pub fn buttons(&self) -> Buttons {
        self.buttons
    }

    pub fn resizable(&self) -> bool {
        self.resizable
    }

    pub fn draggable(&self) -> bool {
        self.draggable
    }

    pub fn style(&self) -> &WindowStyle {
        &self.style
    }

    pub fn pending_transition(&self) -> Option<&PendingTransition> {
        self.pending.as_ref()
    }

    pub fn queued_requests(&self) -> impl Iterator<Item = LifecycleRequest> + '_ {
        self.queued.iter().copied()
    }

    /// Minimized and placed by the dock layout.
    pub fn is_docked(&self) -> bool {
        self.state == WindowState::Minimized && self.management == ManagementState::Managed
    }

    /// The rectangle that is authoritative for the current state: NORMAL
    /// bounds, the dock cell or the tray position while minimized, and the
    /// transition target while animating.
    pub fn visible_bounds(&self) -> Bounds {
        match self.state {
            WindowState::Minimized => self.tile_bounds(),
            WindowState::Animating => self.pending.map_or(self.bounds, |p| p.target),
            WindowState::Invisible if self.prior_state == WindowState::Minimized => {
                self.tile_bounds()
            }
            _ => self.bounds,
        }
    }

    pub(crate) fn tile_bounds(&self) -> Bounds {
        match self.management {
            ManagementState::Managed => self.dock_slot.map(|slot| slot.bounds()),
            ManagementState::Unmanaged => self.tray_position,
        }
        .unwrap_or(self.bounds)
    }

    /// Invoke a host callback. A panicking callback is logged and dropped
    /// so it cannot stop event routing for other windows.
    pub(crate) fn fire(&mut self, kind: CallbackKind) {
        let Some(mut callback) = self.callbacks.slot(kind).take() else {
            return;
        };
        let outcome = catch_unwind(AssertUnwindSafe(|| callback(self)));
        match outcome {
            Ok(()) => *self.callbacks.slot(kind) = Some(callback),
            Err(_) => {
                tracing::error!(window_id = %self.id, ?kind, "window callback panicked; removed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::config::Dimension;
    use std::cell::Cell;
    use std::rc::Rc;

    fn window_with(config: &WindowConfig) -> Window {
        Window::new(
            WindowId::next(),
            SurfaceHandle(1),
            config,
            Bounds::new(0.0, 0.0, 100.0, 80.0),
        )
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let a = WindowId::next();
        let b = WindowId::next();
        assert!(b > a);
        assert_ne!(a.get(), b.get());
    }

    #[test]
    fn viewport_relative_only_for_shares() {
        let fixed = WindowConfig::new("fixed");
        assert!(ViewportRelative::from_config(&fixed).is_none());

        let half = WindowConfig::new("half").with_size(Dimension::Viewport(0.5), 200.0.into());
        let relative = ViewportRelative::from_config(&half).unwrap();
        assert_eq!(relative.width_fraction, Some(0.5));
        assert_eq!(relative.height_fraction, None);
        let resized = relative.apply(Bounds::new(0.0, 0.0, 600.0, 200.0), Viewport::new(800.0, 600.0));
        assert_eq!(resized.width, 400.0);
        assert_eq!(resized.height, 200.0);
    }

    #[test]
    fn rebase_tracks_manual_resize() {
        let mut relative = ViewportRelative {
            width_fraction: Some(0.5),
            height_fraction: None,
        };
        relative.rebase(Bounds::new(0.0, 0.0, 250.0, 90.0), Viewport::new(1000.0, 500.0));
        assert_eq!(relative.width_fraction, Some(0.25));
        assert_eq!(relative.height_fraction, None);
    }

    #[test]
    fn centered_axes_come_from_config() {
        let config = WindowConfig::new("c").with_position(10.0.into(), config::Position::Center);
        let window = window_with(&config);
        assert!(!window.center_x);
        assert!(window.center_y);
    }

    #[test]
    fn panicking_callback_is_dropped_and_others_survive() {
        let mut window = window_with(&WindowConfig::new("w"));
        let focused = Rc::new(Cell::new(0));
        let seen = Rc::clone(&focused);
        window.callbacks.on_close(|_| panic!("host bug"));
        window.callbacks.on_focus(move |_| seen.set(seen.get() + 1));

        window.fire(CallbackKind::Close);
        window.fire(CallbackKind::Close);
        window.fire(CallbackKind::Focus);
        window.fire(CallbackKind::Focus);

        assert_eq!(focused.get(), 2);
        assert!(window.callbacks.on_close.is_none());
    }

    #[test]
    fn tile_bounds_follow_management_state() {
        let mut window = window_with(&WindowConfig::new("w"));
        window.state = WindowState::Minimized;
        window.dock_slot = Some(DockSlot {
            slot: 1,
            row: 0,
            x: 0.0,
            y: 760.0,
            tile_width: 170.0,
            tile_height: 40.0,
            valid_at: Viewport::new(1000.0, 800.0),
        });
        assert_eq!(window.visible_bounds(), Bounds::new(0.0, 760.0, 170.0, 40.0));

        window.management = ManagementState::Unmanaged;
        window.tray_position = Some(Bounds::new(300.0, 200.0, 170.0, 40.0));
        assert_eq!(window.visible_bounds().left, 300.0);
        assert!(!window.is_docked());
    }
}
