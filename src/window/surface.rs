//! The boundary between the window core and whatever draws windows.
//!
//! The core never paints anything. It tells a `Surface` where each window
//! is, whether it is visible, how it is stacked and which pane it shows, and
//! asks the surface for measurements it cannot know itself (the title bar
//! height drives the dock tile height).

use std::collections::BTreeMap;
use std::time::Duration;

use super::WindowId;
use super::config::{Buttons, WindowConfig, WindowStyle};
use crate::layout::Bounds;

/// Opaque token a surface hands out for each window it hosts. Hit tests
/// report these, and the manager resolves them to windows in O(1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SurfaceHandle(pub u64);

/// Which part of a window a pointer landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfacePart {
    TitleBar,
    Body,
    CloseButton,
    MinimizeButton,
}

/// The two content panes a window carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentPane {
    #[default]
    Primary,
    MinimizedPreview,
}

pub trait Surface {
    /// Start hosting a window. Called once, before any other call for it.
    fn attach(&mut self, id: WindowId, config: &WindowConfig) -> SurfaceHandle;
    fn set_bounds(&mut self, handle: SurfaceHandle, bounds: Bounds);
    fn set_visible(&mut self, handle: SurfaceHandle, visible: bool);
    fn set_z_order(&mut self, handle: SurfaceHandle, z: i64);
    /// Animate subsequent `set_bounds` calls over `duration`.
    fn begin_transition(&mut self, handle: SurfaceHandle, duration: Duration);
    fn end_transition(&mut self, handle: SurfaceHandle);
    fn show_chrome(&mut self, handle: SurfaceHandle, buttons: Buttons);
    fn swap_content_pane(&mut self, handle: SurfaceHandle, pane: ContentPane);
    /// Toggle the focused ("active") title bar styling.
    fn set_active(&mut self, handle: SurfaceHandle, active: bool);
    fn set_title(&mut self, _handle: SurfaceHandle, _title: &str) {}
    fn set_style(&mut self, _handle: SurfaceHandle, _style: &WindowStyle) {}
    fn set_resizable(&mut self, _handle: SurfaceHandle, _resizable: bool) {}
    /// Measured height of the rendered title bar.
    fn title_bar_height(&self, handle: SurfaceHandle) -> f64;
    /// Release everything held for the window. No calls follow.
    fn dispose(&mut self, handle: SurfaceHandle);
}

/// Last state a `HeadlessSurface` was told for one window.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessView {
    pub id: WindowId,
    pub title: String,
    pub bounds: Bounds,
    pub visible: bool,
    pub z: i64,
    pub buttons: Buttons,
    pub pane: ContentPane,
    pub active: bool,
    pub resizable: bool,
    pub in_transition: bool,
    pub style: WindowStyle,
}

/// Recording surface for hosts without a renderer and for tests.
///
/// Keeps the most recent state per handle and a count of `set_bounds`
/// calls, which is how callers check that unchanged dock tiles are not
/// re-animated.
#[derive(Debug)]
pub struct HeadlessSurface {
    title_bar_height: f64,
    next_handle: u64,
    views: BTreeMap<SurfaceHandle, HeadlessView>,
    disposed: Vec<SurfaceHandle>,
    bounds_writes: BTreeMap<SurfaceHandle, usize>,
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new(20.0)
    }
}

impl HeadlessSurface {
    pub fn new(title_bar_height: f64) -> Self {
        Self {
            title_bar_height,
            next_handle: 1,
            views: BTreeMap::new(),
            disposed: Vec::new(),
            bounds_writes: BTreeMap::new(),
        }
    }

    pub fn view(&self, handle: SurfaceHandle) -> Option<&HeadlessView> {
        self.views.get(&handle)
    }

    pub fn is_disposed(&self, handle: SurfaceHandle) -> bool {
        self.disposed.contains(&handle)
    }

    pub fn bounds_writes(&self, handle: SurfaceHandle) -> usize {
        self.bounds_writes.get(&handle).copied().unwrap_or(0)
    }

    fn with_view(&mut self, handle: SurfaceHandle, f: impl FnOnce(&mut HeadlessView)) {
        if let Some(view) = self.views.get_mut(&handle) {
            f(view);
        }
    }
}

impl Surface for HeadlessSurface {
    fn attach(&mut self, id: WindowId, config: &WindowConfig) -> SurfaceHandle {
        let handle = SurfaceHandle(self.next_handle);
        self.next_handle += 1;
        self.views.insert(
            handle,
            HeadlessView {
                id,
                title: config.title.clone(),
                bounds: Bounds::default(),
                visible: false,
                z: 0,
                buttons: config.buttons,
                pane: ContentPane::Primary,
                active: false,
                resizable: config.resizable,
                in_transition: false,
                style: config.style.clone(),
            },
        );
        handle
    }

    fn set_bounds(&mut self, handle: SurfaceHandle, bounds: Bounds) {
        *self.bounds_writes.entry(handle).or_default() += 1;
        self.with_view(handle, |view| view.bounds = bounds);
    }

    fn set_visible(&mut self, handle: SurfaceHandle, visible: bool) {
        self.with_view(handle, |view| view.visible = visible);
    }

    fn set_z_order(&mut self, handle: SurfaceHandle, z: i64) {
        self.with_view(handle, |view| view.z = z);
    }

    fn begin_transition(&mut self, handle: SurfaceHandle, _duration: Duration) {
        self.with_view(handle, |view| view.in_transition = true);
    }

    fn end_transition(&mut self, handle: SurfaceHandle) {
        self.with_view(handle, |view| view.in_transition = false);
    }

    fn show_chrome(&mut self, handle: SurfaceHandle, buttons: Buttons) {
        self.with_view(handle, |view| view.buttons = buttons);
    }

    fn swap_content_pane(&mut self, handle: SurfaceHandle, pane: ContentPane) {
        self.with_view(handle, |view| view.pane = pane);
    }

    fn set_active(&mut self, handle: SurfaceHandle, active: bool) {
        self.with_view(handle, |view| view.active = active);
    }

    fn set_title(&mut self, handle: SurfaceHandle, title: &str) {
        self.with_view(handle, |view| view.title = title.to_string());
    }

    fn set_style(&mut self, handle: SurfaceHandle, style: &WindowStyle) {
        self.with_view(handle, |view| view.style = style.clone());
    }

    fn set_resizable(&mut self, handle: SurfaceHandle, resizable: bool) {
        self.with_view(handle, |view| view.resizable = resizable);
    }

    fn title_bar_height(&self, _handle: SurfaceHandle) -> f64 {
        self.title_bar_height
    }

    fn dispose(&mut self, handle: SurfaceHandle) {
        if self.views.remove(&handle).is_some() {
            self.disposed.push(handle);
        }
    }
}
