use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use super::config::{Buttons, ColorRole, ManagerConfig, StyleColor, TransitionConflict, WindowConfig};
use super::surface::{ContentPane, Surface, SurfaceHandle, SurfacePart};
use super::transition::{
    LifecycleRequest, PendingTransition, Transition, TransitionKind, TransitionPhase,
};
use super::{CallbackKind, DockSlot, ManagementState, Window, WindowCallbacks, WindowId, WindowState};
use crate::constants::MAX_CONTENT_HEIGHT_PERCENT;
use crate::drag::{DragController, DragSubject, DragUpdate};
use crate::error::{ConfigError, WmError};
use crate::input::{HostEvent, PointerEvent, PointerKind};
use crate::layout::{Bounds, TileGeometry, Viewport, place_in_dock};

/// Notifications queued for the host, drained with `take_events`.
#[derive(Debug, Clone, PartialEq)]
pub enum WindowEvent {
    Opened(WindowId),
    Closed(WindowId),
    Resized(WindowId),
    Focused(WindowId),
    Blurred(WindowId),
    Minimized(WindowId),
    Restored(WindowId),
    /// A drag pulled a tile out of the dock.
    Undocked(WindowId),
    /// A queued lifecycle call was no longer valid when its turn came.
    Rejected { id: WindowId, error: WmError },
}

impl WindowEvent {
    fn for_callback(kind: CallbackKind, id: WindowId) -> Self {
        match kind {
            CallbackKind::Close => WindowEvent::Closed(id),
            CallbackKind::Resize => WindowEvent::Resized(id),
            CallbackKind::Focus => WindowEvent::Focused(id),
            CallbackKind::Blur => WindowEvent::Blurred(id),
            CallbackKind::Minimize => WindowEvent::Minimized(id),
            CallbackKind::Restore => WindowEvent::Restored(id),
        }
    }
}

/// Registry, stacking order, focus and minimize dock for a set of windows
/// drawn by one `Surface`.
///
/// Time is explicit: the manager remembers the last instant it was ticked
/// and schedules transitions relative to it. Hosts call `tick` from their
/// event loop; tests call it with synthetic instants.
#[derive(Debug)]
pub struct WindowManager<S: Surface> {
    config: ManagerConfig,
    surface: S,
    windows: BTreeMap<WindowId, Window>,
    by_surface: HashMap<SurfaceHandle, WindowId>,
    focused: Option<WindowId>,
    /// Dock slot (1-based) to docked window.
    dock: BTreeMap<usize, WindowId>,
    viewport: Viewport,
    geometry: TileGeometry,
    drag: DragController,
    last_click: Option<(WindowId, Instant)>,
    events: Vec<WindowEvent>,
    now: Instant,
}

impl<S: Surface> WindowManager<S> {
    pub fn new(surface: S, viewport: Viewport) -> Self {
        let config = ManagerConfig::default();
        Self::build(surface, viewport, config)
    }

    pub fn with_config(
        surface: S,
        viewport: Viewport,
        config: ManagerConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(surface, viewport, config))
    }

    fn build(surface: S, viewport: Viewport, config: ManagerConfig) -> Self {
        let geometry = TileGeometry::compute(viewport, config.tile_width_percent, 0);
        Self {
            config,
            surface,
            windows: BTreeMap::new(),
            by_surface: HashMap::new(),
            focused: None,
            dock: BTreeMap::new(),
            viewport,
            geometry,
            drag: DragController::default(),
            last_click: None,
            events: Vec::new(),
            now: Instant::now(),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn tile_geometry(&self) -> TileGeometry {
        self.geometry
    }

    /// The instant the manager was last advanced to.
    pub fn now(&self) -> Instant {
        self.now
    }

    pub fn count(&self) -> usize {
        self.windows.len()
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(&id)
    }

    pub fn windows(&self) -> impl Iterator<Item = &Window> {
        self.windows.values()
    }

    /// Windows from bottom to top of the stacking order.
    pub fn stacking_order(&self) -> Vec<WindowId> {
        let mut ordered: Vec<&Window> = self.windows.values().collect();
        ordered.sort_by_key(|w| w.index);
        ordered.into_iter().map(|w| w.id).collect()
    }

    pub fn window_by_surface(&self, handle: SurfaceHandle) -> Option<WindowId> {
        self.by_surface.get(&handle).copied()
    }

    pub fn focused(&self) -> Option<WindowId> {
        self.focused
    }

    pub fn dock(&self) -> &BTreeMap<usize, WindowId> {
        &self.dock
    }

    /// The NORMAL window highest in the stacking order.
    pub fn top_window(&self) -> Option<WindowId> {
        self.windows
            .values()
            .filter(|w| w.state == WindowState::Normal)
            .max_by_key(|w| w.index)
            .map(|w| w.id)
    }

    pub fn callbacks_mut(&mut self, id: WindowId) -> Option<&mut WindowCallbacks> {
        self.windows.get_mut(&id).map(|w| &mut w.callbacks)
    }

    pub fn take_events(&mut self) -> Vec<WindowEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.session().is_some()
    }

    // ---- creation and teardown ----

    pub fn create(&mut self, config: WindowConfig) -> Result<WindowId, WmError> {
        config.validate()?;
        let id = WindowId::next();
        let handle = self.surface.attach(id, &config);
        let viewport = self.viewport;
        let bounds = Bounds::new(
            config.x.resolve(viewport.width).unwrap_or(0.0),
            config.y.resolve(viewport.height).unwrap_or(0.0),
            config.width.resolve(viewport.width),
            config.height.resolve(viewport.height),
        );
        let mut window = Window::new(id, handle, &config, bounds);
        window.index = self.windows.len() + 1;
        window.z_order = self.config.base_z + window.index as i64;

        self.surface.set_bounds(handle, bounds);
        self.surface.set_z_order(handle, window.z_order);
        self.surface.show_chrome(handle, window.buttons);
        self.surface.swap_content_pane(handle, ContentPane::Primary);
        self.windows.insert(id, window);
        self.by_surface.insert(handle, id);
        self.events.push(WindowEvent::Opened(id));
        tracing::debug!(window_id = %id, title = %config.title, ?bounds, "opened window");

        if config.hidden {
            if let Some(window) = self.windows.get_mut(&id) {
                window.prior_state = WindowState::Normal;
                window.state = WindowState::Invisible;
            }
            self.surface.set_visible(handle, false);
            let top = self.windows.len();
            self.apply_order(Some((id, top)));
        } else {
            self.apply_pending_centering(id);
            self.surface.set_visible(handle, true);
            self.set_focus(id);
        }
        Ok(id)
    }

    /// Close a window from any live state. In-flight and queued
    /// transitions are dropped; the close callback runs once.
    pub fn close(&mut self, id: WindowId) {
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        if window.state == WindowState::Invalid {
            return;
        }
        let cancelled = window.pending.take().is_some();
        window.queued.clear();
        window.state = WindowState::Invalid;
        tracing::debug!(window_id = %id, cancelled, "closing window");

        self.drag.cancel(id);
        if self.last_click.is_some_and(|(clicked, _)| clicked == id) {
            self.last_click = None;
        }
        let was_focused = self.focused == Some(id);
        if was_focused {
            self.focused = None;
        }
        self.notify(id, CallbackKind::Close);

        if let Some(window) = self.windows.remove(&id) {
            self.by_surface.remove(&window.surface);
            self.surface.dispose(window.surface);
        }
        self.apply_order(None);
        if was_focused {
            self.focus_next();
        }
    }

    // ---- ordering and focus ----

    /// Move a window to `new_index` (1-based, clamped to the window count)
    /// and renumber everything else densely around it.
    pub fn set_index(&mut self, id: WindowId, new_index: usize) {
        if !self.is_live(id) {
            return;
        }
        let index = new_index.clamp(1, self.windows.len());
        self.apply_order(Some((id, index)));
    }

    /// Renumber all windows 1..=N by current index, optionally inserting
    /// `target` at a position first, then re-place the dock.
    fn apply_order(&mut self, target: Option<(WindowId, usize)>) {
        let target_id = target.map(|(id, _)| id);
        let mut ordered: Vec<(usize, WindowId)> = self
            .windows
            .values()
            .filter(|w| Some(w.id) != target_id)
            .map(|w| (w.index, w.id))
            .collect();
        ordered.sort_by_key(|(index, _)| *index);
        let mut ids: Vec<WindowId> = ordered.into_iter().map(|(_, id)| id).collect();
        if let Some((id, position)) = target {
            let at = position.saturating_sub(1).min(ids.len());
            ids.insert(at, id);
        }

        let base = self.config.base_z;
        for (offset, id) in ids.into_iter().enumerate() {
            let Some(window) = self.windows.get_mut(&id) else {
                continue;
            };
            let index = offset + 1;
            let z = base + index as i64;
            window.index = index;
            if window.z_order != z {
                window.z_order = z;
                self.surface.set_z_order(window.surface, z);
            }
        }
        self.reflow_dock();
    }

    /// Give `id` focus and raise it to the top. Focusing the focused window
    /// is a no-op. Docked tiles keep their index so the dock order holds.
    pub fn set_focus(&mut self, id: WindowId) {
        let Some(window) = self.windows.get(&id) else {
            return;
        };
        if self.focused == Some(id) || window.state == WindowState::Invalid {
            return;
        }
        if !window.is_docked() {
            let top = self.windows.len();
            self.apply_order(Some((id, top)));
        }
        let previous = self.focused.replace(id);
        if let Some(window) = self.windows.get(&id) {
            self.surface.set_active(window.surface, true);
        }
        tracing::trace!(window_id = %id, ?previous, "focus changed");
        self.notify(id, CallbackKind::Focus);
        if let Some(previous) = previous {
            self.deactivate(previous);
        }
    }

    /// Drop focus without focusing anything else.
    pub fn blur(&mut self) {
        if let Some(previous) = self.focused.take() {
            self.deactivate(previous);
        }
    }

    /// Focus the topmost NORMAL window, if any.
    pub fn focus_next(&mut self) {
        if let Some(top) = self.top_window() {
            self.set_focus(top);
        }
    }

    fn deactivate(&mut self, id: WindowId) {
        if let Some(window) = self.windows.get(&id) {
            self.surface.set_active(window.surface, false);
            self.notify(id, CallbackKind::Blur);
        }
    }

    /// Raise to the top and focus, even when already focused.
    fn raise_and_focus(&mut self, id: WindowId) {
        if self.focused == Some(id) {
            let top = self.windows.len();
            self.apply_order(Some((id, top)));
        } else {
            self.set_focus(id);
        }
    }

    pub fn base_z(&self) -> i64 {
        self.config.base_z
    }

    /// Shift every window's z-order so it stays `base + index`.
    pub fn set_base_z(&mut self, base: i64) {
        self.config.base_z = base;
        for window in self.windows.values_mut() {
            window.z_order = base + window.index as i64;
            self.surface.set_z_order(window.surface, window.z_order);
        }
    }

    // ---- dock ----

    /// Assign dense dock slots to MINIMIZED+MANAGED windows in index order
    /// and move any tile whose cell changed.
    fn reflow_dock(&mut self) {
        let mut docked: Vec<(usize, WindowId)> = self
            .windows
            .values()
            .filter(|w| w.is_docked())
            .map(|w| (w.index, w.id))
            .collect();
        docked.sort_by_key(|(index, _)| *index);

        self.geometry = TileGeometry::compute(
            self.viewport,
            self.config.tile_width_percent,
            docked.len(),
        );
        self.dock.clear();
        let duration = self.config.transition_duration;
        let mut moved = 0usize;
        for (offset, (_, id)) in docked.into_iter().enumerate() {
            let slot = offset + 1;
            self.dock.insert(slot, id);
            let Some(window) = self.windows.get_mut(&id) else {
                continue;
            };
            let title_bar = self.surface.title_bar_height(window.surface);
            let placement = place_in_dock(slot, &self.geometry, title_bar, self.viewport.height);
            let cell = DockSlot::new(placement, self.viewport);
            if window.dock_slot == Some(cell) {
                continue;
            }
            window.dock_slot = Some(cell);
            if window.drag_flag {
                continue;
            }
            self.surface.begin_transition(window.surface, duration);
            self.surface.set_bounds(window.surface, cell.bounds());
            window.settle_at = Some(self.now + duration);
            moved += 1;
        }
        tracing::trace!(
            docked = self.dock.len(),
            rows = self.geometry.row_count,
            moved,
            "reflowed dock"
        );
    }

    /// Hand a minimized window's tray position to the user (or the host).
    pub fn set_management_state(&mut self, id: WindowId, management: ManagementState) {
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        if window.management == management || window.state == WindowState::Invalid {
            return;
        }
        window.management = management;
        tracing::debug!(window_id = %id, ?management, "management state changed");
        match management {
            ManagementState::Unmanaged => {
                if window.state == WindowState::Minimized {
                    window.tray_position =
                        Some(window.dock_slot.map_or(window.bounds, |cell| cell.bounds()));
                    window.dock_slot = None;
                    self.raise_and_focus(id);
                }
            }
            ManagementState::Managed => {
                window.drag_flag = false;
                window.tray_position = None;
                if window.state == WindowState::Minimized {
                    let slot = self.dock.len() + 1;
                    self.apply_order(Some((id, slot)));
                }
            }
        }
    }

    /// Pin a window's minimized tile at `(x, y)`. The window becomes
    /// UNMANAGED; if it is minimized the tile moves there now.
    pub fn set_minimized_position(&mut self, id: WindowId, x: f64, y: f64) {
        if !self.is_live(id) {
            return;
        }
        self.set_management_state(id, ManagementState::Unmanaged);
        let tile_width = self.geometry.tile_width;
        let duration = self.config.transition_duration;
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        let tile_height = self.surface.title_bar_height(window.surface) * 2.0;
        let tray = window
            .tray_position
            .unwrap_or(Bounds::new(x, y, tile_width, tile_height))
            .with_origin(x, y);
        window.tray_position = Some(tray);
        if window.state == WindowState::Minimized {
            self.surface.begin_transition(window.surface, duration);
            self.surface.set_bounds(window.surface, tray);
            window.settle_at = Some(self.now + duration);
        }
    }

    // ---- minimize / restore ----

    pub fn minimize(&mut self, id: WindowId) -> Result<Transition, WmError> {
        let window = self.windows.get(&id).ok_or(WmError::UnknownWindow(id))?;
        if window.pending.is_some() {
            return self.resolve_conflict(id, LifecycleRequest::Minimize);
        }
        self.begin_minimize(id)
    }

    pub fn restore(&mut self, id: WindowId) -> Result<Transition, WmError> {
        let window = self.windows.get(&id).ok_or(WmError::UnknownWindow(id))?;
        if window.pending.is_some() {
            return self.resolve_conflict(id, LifecycleRequest::Restore);
        }
        self.begin_restore(id)
    }

    fn begin(&mut self, id: WindowId, request: LifecycleRequest) -> Result<Transition, WmError> {
        match request {
            LifecycleRequest::Minimize => self.begin_minimize(id),
            LifecycleRequest::Restore => self.begin_restore(id),
        }
    }

    fn begin_minimize(&mut self, id: WindowId) -> Result<Transition, WmError> {
        let in_flight = self
            .windows
            .values()
            .filter(|w| {
                w.management == ManagementState::Managed
                    && w.pending
                        .is_some_and(|p| p.kind == TransitionKind::Minimize)
            })
            .count();
        let reserved = self.dock.len() + in_flight + 1;
        let geometry = self.geometry.with_docked(reserved);
        let viewport = self.viewport;
        let now = self.now;
        let (delay, duration) = (self.config.transition_delay, self.config.transition_duration);

        let window = self.windows.get_mut(&id).ok_or(WmError::UnknownWindow(id))?;
        if window.state != WindowState::Normal {
            return Err(WmError::invalid_state(id, window.state, "minimize"));
        }
        let title_bar = self.surface.title_bar_height(window.surface);
        let target = match window.management {
            ManagementState::Managed => {
                let placement = place_in_dock(reserved, &geometry, title_bar, viewport.height);
                let cell = DockSlot::new(placement, viewport);
                window.dock_slot = Some(cell);
                cell.bounds()
            }
            ManagementState::Unmanaged => {
                let tray = window.tray_position.unwrap_or(Bounds::new(
                    window.bounds.left,
                    window.bounds.top,
                    geometry.tile_width,
                    title_bar * 2.0,
                ));
                window.tray_position = Some(tray);
                tray
            }
        };
        window.restore_position = window.bounds;
        window.minimized_viewport = Some(viewport);
        window.state = WindowState::Animating;
        window.settle_at = None;
        window.pending = Some(PendingTransition::new(
            TransitionKind::Minimize,
            now,
            delay,
            duration,
            target,
        ));
        self.surface.set_resizable(window.surface, false);
        self.surface.begin_transition(window.surface, duration);
        tracing::debug!(window_id = %id, ?target, "minimizing window");

        if self.focused == Some(id) {
            self.blur();
        }
        Ok(Transition::Started)
    }

    fn begin_restore(&mut self, id: WindowId) -> Result<Transition, WmError> {
        let viewport = self.viewport;
        let now = self.now;
        let (delay, duration) = (self.config.transition_delay, self.config.transition_duration);
        let top_z = self.config.base_z + self.windows.len() as i64;

        let window = self.windows.get_mut(&id).ok_or(WmError::UnknownWindow(id))?;
        if window.state != WindowState::Minimized {
            return Err(WmError::invalid_state(id, window.state, "restore"));
        }
        let target = restore_target(window, viewport);
        window.state = WindowState::Animating;
        window.settle_at = None;
        window.pending = Some(PendingTransition::new(
            TransitionKind::Restore,
            now,
            delay,
            duration,
            target,
        ));
        self.surface.begin_transition(window.surface, duration);
        // Visual raise only; the index changes when the restore commits.
        self.surface.set_z_order(window.surface, top_z);
        tracing::debug!(window_id = %id, ?target, "restoring window");

        // Leaving the dock frees its slot for the remaining tiles.
        self.reflow_dock();
        Ok(Transition::Started)
    }

    fn resolve_conflict(
        &mut self,
        id: WindowId,
        request: LifecycleRequest,
    ) -> Result<Transition, WmError> {
        match self.config.conflict {
            TransitionConflict::Queue => {
                let window = self.windows.get_mut(&id).ok_or(WmError::UnknownWindow(id))?;
                window.queued.push_back(request);
                tracing::debug!(window_id = %id, ?request, "queued lifecycle call");
                Ok(Transition::Queued)
            }
            TransitionConflict::Restart => {
                self.cancel_transition(id);
                let state = self.windows.get(&id).map(|w| w.state);
                if state == Some(request.kind().target_state()) {
                    if request == LifecycleRequest::Restore {
                        self.raise_and_focus(id);
                    }
                    return Ok(Transition::Settled);
                }
                self.begin(id, request)
            }
        }
    }

    /// Abandon an in-flight transition and put the window back where it
    /// started.
    fn cancel_transition(&mut self, id: WindowId) {
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        let Some(pending) = window.pending.take() else {
            return;
        };
        window.queued.clear();
        self.surface.end_transition(window.surface);
        window.state = pending.kind.origin_state();
        match pending.kind {
            TransitionKind::Minimize => {
                window.bounds = window.restore_position;
                if window.management == ManagementState::Managed {
                    window.dock_slot = None;
                }
                self.surface.show_chrome(window.surface, window.buttons);
                self.surface
                    .swap_content_pane(window.surface, ContentPane::Primary);
                self.surface.set_bounds(window.surface, window.bounds);
                self.surface.set_resizable(window.surface, window.resizable);
            }
            TransitionKind::Restore => {
                // Force the dock to re-seat the tile.
                window.dock_slot = None;
                self.surface.show_chrome(window.surface, Buttons::None);
                self.surface
                    .swap_content_pane(window.surface, ContentPane::MinimizedPreview);
                self.surface.set_z_order(window.surface, window.z_order);
                if let Some(tray) = window.tray_position
                    && window.management == ManagementState::Unmanaged
                {
                    self.surface.set_bounds(window.surface, tray);
                }
            }
        }
        tracing::debug!(window_id = %id, kind = ?pending.kind, "cancelled transition");
        self.reflow_dock();
    }

    /// Advance time to `now` and run every transition phase that has come
    /// due, in deadline order.
    pub fn tick(&mut self, now: Instant) {
        if now > self.now {
            self.now = now;
        }
        loop {
            let due = self
                .windows
                .values()
                .filter_map(|w| {
                    let pending = w.pending.filter(|p| p.is_due(self.now))?;
                    Some((pending.next_deadline(), w.id))
                })
                .min();
            let Some((_, id)) = due else {
                break;
            };
            self.advance(id);
        }
        for window in self.windows.values_mut() {
            if window.settle_at.is_some_and(|at| at <= self.now) {
                window.settle_at = None;
                self.surface.end_transition(window.surface);
            }
        }
    }

    /// Earliest instant at which `tick` has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.windows
            .values()
            .flat_map(|w| [w.pending.map(|p| p.next_deadline()), w.settle_at])
            .flatten()
            .min()
    }

    fn advance(&mut self, id: WindowId) {
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        let Some(pending) = window.pending.as_mut() else {
            return;
        };
        match pending.phase {
            TransitionPhase::Scheduled => {
                pending.phase = TransitionPhase::Moving;
                let (kind, target) = (pending.kind, pending.target);
                match kind {
                    TransitionKind::Minimize => {
                        self.surface.show_chrome(window.surface, Buttons::None);
                        self.surface
                            .swap_content_pane(window.surface, ContentPane::MinimizedPreview);
                    }
                    TransitionKind::Restore => {
                        self.surface.show_chrome(window.surface, window.buttons);
                        self.surface
                            .swap_content_pane(window.surface, ContentPane::Primary);
                    }
                }
                self.surface.set_bounds(window.surface, target);
                tracing::trace!(window_id = %id, ?kind, "transition swapped panes");
            }
            TransitionPhase::Moving => self.commit(id),
        }
    }

    fn commit(&mut self, id: WindowId) {
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        let Some(pending) = window.pending.take() else {
            return;
        };
        self.surface.end_transition(window.surface);
        match pending.kind {
            TransitionKind::Minimize => {
                window.state = WindowState::Minimized;
                let managed = window.management == ManagementState::Managed;
                tracing::debug!(window_id = %id, "minimized window");
                let next = self.top_window();
                if managed {
                    let slot = self.dock.len() + 1;
                    self.apply_order(Some((id, slot)));
                }
                if let Some(next) = next {
                    self.set_focus(next);
                }
                self.notify(id, CallbackKind::Minimize);
            }
            TransitionKind::Restore => {
                window.state = WindowState::Normal;
                window.bounds = pending.target;
                window.restore_position = pending.target;
                window.dock_slot = None;
                window.drag_flag = false;
                self.surface.set_resizable(window.surface, window.resizable);
                tracing::debug!(window_id = %id, bounds = ?pending.target, "restored window");
                self.raise_and_focus(id);
                self.notify(id, CallbackKind::Restore);
            }
        }
        self.run_queued(id);
    }

    /// Start the next queued call that is still valid. Stale calls are
    /// reported and dropped.
    fn run_queued(&mut self, id: WindowId) {
        loop {
            let Some(request) = self
                .windows
                .get_mut(&id)
                .and_then(|w| w.queued.pop_front())
            else {
                return;
            };
            match self.begin(id, request) {
                Ok(_) => return,
                Err(error) => {
                    tracing::warn!(window_id = %id, op = request.op(), %error, "dropped queued call");
                    self.events.push(WindowEvent::Rejected { id, error });
                }
            }
        }
    }

    // ---- visibility ----

    /// Take a NORMAL or MINIMIZED window off screen. Other states are left
    /// alone.
    pub fn hide(&mut self, id: WindowId) {
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        if !matches!(window.state, WindowState::Normal | WindowState::Minimized) {
            tracing::debug!(window_id = %id, state = ?window.state, "ignored hide");
            return;
        }
        let was_minimized = window.state == WindowState::Minimized;
        window.prior_state = window.state;
        window.state = WindowState::Invisible;
        self.surface.set_visible(window.surface, false);
        self.drag.cancel(id);
        if self.focused == Some(id) {
            self.blur();
        }
        if was_minimized {
            self.reflow_dock();
        }
    }

    /// Bring back a hidden window in the state it was hidden from. Centering
    /// requested at construction is applied on the first show.
    pub fn show(&mut self, id: WindowId) {
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        if window.state != WindowState::Invisible {
            return;
        }
        window.state = window.prior_state;
        let (handle, minimized) = (window.surface, window.state == WindowState::Minimized);
        self.apply_pending_centering(id);
        self.surface.set_visible(handle, true);
        if minimized {
            self.reflow_dock();
        }
    }

    fn apply_pending_centering(&mut self, id: WindowId) {
        let viewport = self.viewport;
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        if !(window.center_x || window.center_y) {
            return;
        }
        window.bounds = window
            .bounds
            .centered_in(viewport, window.center_x, window.center_y);
        window.restore_position = window.bounds;
        window.center_x = false;
        window.center_y = false;
        if window.state == WindowState::Normal {
            self.surface.set_bounds(window.surface, window.bounds);
        }
    }

    // ---- geometry ----

    /// Move a window's top-left corner. A NORMAL window moves now; any other
    /// state only changes where a later restore lands.
    pub fn move_window(&mut self, id: WindowId, x: f64, y: f64) {
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        window.restore_position = window.restore_position.with_origin(x, y);
        if window.state == WindowState::Normal {
            window.bounds = window.bounds.with_origin(x, y);
            self.surface.set_bounds(window.surface, window.bounds);
        }
    }

    /// Set a NORMAL window's pixel size.
    pub fn resize_window(&mut self, id: WindowId, width: f64, height: f64) -> Result<(), WmError> {
        for (field, value) in [("width", width), ("height", height)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::OutOfRange { field, value }.into());
            }
        }
        let viewport = self.viewport;
        let window = self.windows.get_mut(&id).ok_or(WmError::UnknownWindow(id))?;
        if window.state != WindowState::Normal {
            return Err(WmError::invalid_state(id, window.state, "resize"));
        }
        window.bounds = window.bounds.with_size(width, height);
        window.restore_position = window.bounds;
        if let Some(relative) = window.viewport_relative.as_mut() {
            relative.rebase(window.bounds, viewport);
        }
        self.surface.set_bounds(window.surface, window.bounds);
        self.notify(id, CallbackKind::Resize);
        Ok(())
    }

    /// Size a NORMAL window to fit `content_height` below its title bar,
    /// capped at most of the viewport height.
    pub fn fit_height_to_content(&mut self, id: WindowId, content_height: f64) -> Result<(), WmError> {
        let window = self.windows.get(&id).ok_or(WmError::UnknownWindow(id))?;
        let title_bar = self.surface.title_bar_height(window.surface);
        let cap = self.viewport.height * MAX_CONTENT_HEIGHT_PERCENT / 100.0;
        let height = (title_bar * 2.0 + content_height.max(0.0)).min(cap);
        let width = window.bounds.width;
        self.resize_window(id, width, height)
    }

    /// The viewport changed size. Viewport-relative windows that are NORMAL,
    /// or hidden from NORMAL, are resized; in-flight restores are re-aimed
    /// at the new viewport; the dock is re-placed.
    pub fn resize_viewport(&mut self, width: f64, height: f64) {
        let viewport = Viewport::new(width.max(0.0), height.max(0.0));
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        tracing::debug!(width = viewport.width, height = viewport.height, "viewport resized");

        let resized: Vec<WindowId> = self
            .windows
            .values_mut()
            .filter(|w| {
                w.state == WindowState::Normal
                    || (w.state == WindowState::Invisible && w.prior_state == WindowState::Normal)
            })
            .filter_map(|w| {
                let relative = w.viewport_relative?;
                let bounds = relative.apply(w.bounds, viewport);
                if bounds == w.bounds {
                    return None;
                }
                w.bounds = bounds;
                w.restore_position = bounds;
                self.surface.set_bounds(w.surface, bounds);
                Some(w.id)
            })
            .collect();
        for window in self.windows.values_mut() {
            if !window
                .pending
                .is_some_and(|p| p.kind == TransitionKind::Restore)
            {
                continue;
            }
            let target = restore_target(window, viewport);
            if let Some(pending) = window.pending.as_mut() {
                pending.target = target;
                if pending.phase == TransitionPhase::Moving {
                    self.surface.set_bounds(window.surface, target);
                }
            }
        }
        for id in resized {
            self.notify(id, CallbackKind::Resize);
        }
        self.reflow_dock();
    }

    // ---- presentation ----

    pub fn set_title(&mut self, id: WindowId, title: impl Into<String>) {
        if let Some(window) = self.windows.get_mut(&id) {
            window.title = title.into();
            self.surface.set_title(window.surface, &window.title);
        }
    }

    pub fn set_buttons(&mut self, id: WindowId, buttons: Buttons) {
        if let Some(window) = self.windows.get_mut(&id) {
            window.buttons = buttons;
            if window.state == WindowState::Normal {
                self.surface.show_chrome(window.surface, buttons);
            }
        }
    }

    pub fn set_draggable(&mut self, id: WindowId, draggable: bool) {
        if let Some(window) = self.windows.get_mut(&id) {
            window.draggable = draggable;
            if !draggable {
                self.drag.cancel(id);
            }
        }
    }

    pub fn set_resizable(&mut self, id: WindowId, resizable: bool) {
        if let Some(window) = self.windows.get_mut(&id) {
            window.resizable = resizable;
            if window.state == WindowState::Normal {
                self.surface.set_resizable(window.surface, resizable);
            }
        }
    }

    /// Parse and apply a color. Malformed input leaves the style untouched.
    pub fn set_style_color(&mut self, id: WindowId, role: ColorRole, color: &str) -> Result<(), WmError> {
        let color: StyleColor = color.parse()?;
        let window = self.windows.get_mut(&id).ok_or(WmError::UnknownWindow(id))?;
        window.style.set_color(role, color);
        self.surface.set_style(window.surface, &window.style);
        Ok(())
    }

    // ---- input ----

    /// Route one host event. Returns `true` when the event was consumed.
    pub fn handle_event(&mut self, event: &HostEvent) -> bool {
        match event {
            HostEvent::Pointer(pointer) => self.handle_pointer(pointer),
            HostEvent::Resize { width, height } => {
                self.resize_viewport(*width, *height);
                true
            }
            HostEvent::FocusIn(target) => {
                match target.and_then(|handle| self.window_by_surface(handle)) {
                    Some(id) if self.takes_input_focus(id) => self.set_focus(id),
                    Some(id) => tracing::trace!(window_id = %id, "focus-in ignored"),
                    None => self.blur(),
                }
                true
            }
        }
    }

    fn handle_pointer(&mut self, event: &PointerEvent) -> bool {
        let hit = event
            .target
            .and_then(|target| Some((self.window_by_surface(target.surface)?, target.part)));
        match event.kind {
            PointerKind::Down => match hit {
                Some((id, part)) => self.pointer_down(id, part, event),
                None => false,
            },
            PointerKind::Move => self.pointer_move(event),
            PointerKind::Up => {
                let dragged = self.drag.end();
                if let Some(session) = dragged {
                    tracing::trace!(window_id = %session.window, "drag finished");
                }
                if hit.is_none() && self.focused.is_some() {
                    self.blur();
                }
                dragged.is_some() || hit.is_some()
            }
        }
    }

    fn pointer_down(&mut self, id: WindowId, part: SurfacePart, event: &PointerEvent) -> bool {
        let Some(window) = self.windows.get(&id) else {
            return false;
        };
        let (state, buttons, draggable) = (window.state, window.buttons, window.draggable);
        let origin = window.visible_bounds();
        if state == WindowState::Invalid {
            return false;
        }

        match part {
            SurfacePart::CloseButton if buttons.has_close() => {
                self.close(id);
                if self.focused.is_none() {
                    self.focus_next();
                }
                return true;
            }
            SurfacePart::MinimizeButton if buttons.has_minimize() => {
                self.set_focus(id);
                if let Err(error) = self.minimize(id) {
                    tracing::debug!(window_id = %id, %error, "minimize button ignored");
                }
                return true;
            }
            _ => {}
        }

        let interval = self.config.double_click_interval;
        let double = self.last_click.is_some_and(|(clicked, at)| {
            clicked == id && self.now.saturating_duration_since(at) <= interval
        });
        self.last_click = if double { None } else { Some((id, self.now)) };
        if double && state == WindowState::Minimized {
            if let Err(error) = self.restore(id) {
                tracing::debug!(window_id = %id, %error, "double-click restore ignored");
            }
            return true;
        }

        if self.takes_input_focus(id) {
            self.set_focus(id);
        }
        if part == SurfacePart::TitleBar
            && draggable
            && matches!(state, WindowState::Normal | WindowState::Minimized)
        {
            self.drag.begin(id, event.x, event.y, origin);
        }
        true
    }

    fn pointer_move(&mut self, event: &PointerEvent) -> bool {
        let Some(session) = self.drag.session().copied() else {
            return false;
        };
        let id = session.window;
        let Some(window) = self.windows.get(&id) else {
            self.drag.cancel(id);
            return false;
        };
        let subject = DragSubject {
            state: window.state,
            management: window.management,
        };
        let threshold = self.config.undock_threshold;
        match self
            .drag
            .update(event.x, event.y, event.buttons, subject, threshold)
        {
            DragUpdate::Ignored | DragUpdate::Held => {}
            DragUpdate::Ended => {
                tracing::trace!(window_id = %id, "drag ended by button release");
            }
            DragUpdate::Undock { left, top } => {
                self.undock(id);
                self.drag_to(id, left, top);
            }
            DragUpdate::MoveTo { left, top } => self.drag_to(id, left, top),
        }
        true
    }

    /// Pull a docked tile out of the dock under the pointer.
    fn undock(&mut self, id: WindowId) {
        if let Some(window) = self.windows.get_mut(&id) {
            window.drag_flag = true;
        }
        self.set_management_state(id, ManagementState::Unmanaged);
        tracing::debug!(window_id = %id, "undocked window");
        self.events.push(WindowEvent::Undocked(id));
    }

    fn drag_to(&mut self, id: WindowId, left: f64, top: f64) {
        let Some(window) = self.windows.get_mut(&id) else {
            return;
        };
        match (window.state, window.management) {
            (WindowState::Normal, _) => {
                window.bounds = window.bounds.with_origin(left, top);
                window.restore_position = window.bounds;
                self.surface.set_bounds(window.surface, window.bounds);
            }
            (WindowState::Minimized, ManagementState::Unmanaged) => {
                let tray = window.tile_bounds().with_origin(left, top);
                window.tray_position = Some(tray);
                window.restore_position = window.restore_position.with_origin(left, top);
                self.surface.set_bounds(window.surface, tray);
            }
            _ => {}
        }
    }

    // ---- helpers ----

    /// Pointer and focus-in input only focus NORMAL or UNMANAGED windows;
    /// docked tiles stay put.
    fn takes_input_focus(&self, id: WindowId) -> bool {
        self.windows.get(&id).is_some_and(|w| {
            w.state == WindowState::Normal || w.management == ManagementState::Unmanaged
        })
    }

    fn is_live(&self, id: WindowId) -> bool {
        self.windows
            .get(&id)
            .is_some_and(|w| w.state != WindowState::Invalid)
    }

    /// Run a window's callback and queue the matching event.
    fn notify(&mut self, id: WindowId, kind: CallbackKind) {
        self.events.push(WindowEvent::for_callback(kind, id));
        if let Some(window) = self.windows.get_mut(&id) {
            window.fire(kind);
        }
    }
}

/// Where a restore of `window` lands in `viewport`: viewport-relative sizes
/// are re-applied if the viewport changed since the minimize, then the
/// rectangle is pulled back on-screen.
fn restore_target(window: &Window, viewport: Viewport) -> Bounds {
    let mut target = window.restore_position;
    if let Some(relative) = window.viewport_relative
        && window.minimized_viewport != Some(viewport)
    {
        target = relative.apply(target, viewport);
    }
    target.clamp_into(viewport)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::config::{Dimension, Position};
    use crate::window::surface::HeadlessSurface;
    use std::time::Duration;

    fn manager() -> WindowManager<HeadlessSurface> {
        WindowManager::new(HeadlessSurface::default(), Viewport::new(1000.0, 800.0))
    }

    fn at(x: f64, y: f64) -> WindowConfig {
        WindowConfig::new("w").with_position(Position::Pixels(x), Position::Pixels(y))
    }

    fn settle(wm: &mut WindowManager<HeadlessSurface>) {
        let later = wm.now() + Duration::from_millis(300);
        wm.tick(later);
    }

    #[test]
    fn create_focuses_and_stacks() {
        let mut wm = manager();
        let a = wm.create(at(10.0, 10.0)).unwrap();
        let b = wm.create(at(20.0, 20.0)).unwrap();
        assert_eq!(wm.focused(), Some(b));
        assert_eq!(wm.window(a).unwrap().index(), 1);
        assert_eq!(wm.window(b).unwrap().index(), 2);
        assert_eq!(wm.window(b).unwrap().z_order(), 2);
        let view = wm.surface().view(wm.window(b).unwrap().surface()).unwrap();
        assert!(view.active && view.visible);
    }

    #[test]
    fn centered_window_lands_in_the_middle() {
        let mut wm = manager();
        let id = wm
            .create(WindowConfig::new("c").with_size(Dimension::Pixels(200.0), Dimension::Pixels(100.0)))
            .unwrap();
        assert_eq!(wm.window(id).unwrap().bounds(), Bounds::new(400.0, 350.0, 200.0, 100.0));
    }

    #[test]
    fn set_index_clamps_and_renumbers_densely() {
        let mut wm = manager();
        let ids: Vec<_> = (0..3).map(|i| wm.create(at(i as f64, 0.0)).unwrap()).collect();
        wm.set_index(ids[2], 0);
        assert_eq!(wm.stacking_order(), vec![ids[2], ids[0], ids[1]]);
        wm.set_index(ids[2], 99);
        assert_eq!(wm.stacking_order(), vec![ids[0], ids[1], ids[2]]);
        let indices: Vec<_> = ids.iter().map(|id| wm.window(*id).unwrap().index()).collect();
        assert_eq!(indices, vec![1, 2, 3]);
    }

    #[test]
    fn minimize_commits_after_duration() {
        let mut wm = manager();
        let id = wm.create(at(100.0, 100.0)).unwrap();
        let t0 = wm.now();
        assert_eq!(wm.minimize(id), Ok(Transition::Started));
        assert_eq!(wm.window(id).unwrap().state(), WindowState::Animating);
        assert_eq!(wm.focused(), None);

        wm.tick(t0 + Duration::from_millis(60));
        let handle = wm.window(id).unwrap().surface();
        assert_eq!(wm.surface().view(handle).unwrap().pane, ContentPane::MinimizedPreview);
        assert_eq!(wm.window(id).unwrap().state(), WindowState::Animating);

        wm.tick(t0 + Duration::from_millis(250));
        assert_eq!(wm.window(id).unwrap().state(), WindowState::Minimized);
        assert_eq!(wm.dock().get(&1), Some(&id));
        assert!(wm.take_events().contains(&WindowEvent::Minimized(id)));
    }

    #[test]
    fn restore_requires_minimized() {
        let mut wm = manager();
        let id = wm.create(at(0.0, 0.0)).unwrap();
        assert!(matches!(
            wm.restore(id),
            Err(WmError::InvalidState { op: "restore", .. })
        ));
    }

    #[test]
    fn restart_policy_cancels_back_to_origin() {
        let config = ManagerConfig {
            conflict: TransitionConflict::Restart,
            ..ManagerConfig::default()
        };
        let mut wm = WindowManager::with_config(
            HeadlessSurface::default(),
            Viewport::new(1000.0, 800.0),
            config,
        )
        .unwrap();
        let id = wm.create(at(50.0, 60.0)).unwrap();
        wm.minimize(id).unwrap();
        assert_eq!(wm.restore(id), Ok(Transition::Settled));
        let window = wm.window(id).unwrap();
        assert_eq!(window.state(), WindowState::Normal);
        assert_eq!(window.bounds().left, 50.0);
        assert!(window.pending_transition().is_none());
        assert_eq!(wm.focused(), Some(id));
    }

    #[test]
    fn hide_and_show_keep_prior_state() {
        let mut wm = manager();
        let id = wm.create(at(0.0, 0.0)).unwrap();
        wm.minimize(id).unwrap();
        settle(&mut wm);
        wm.hide(id);
        assert!(wm.dock().is_empty());
        wm.show(id);
        assert_eq!(wm.window(id).unwrap().state(), WindowState::Minimized);
        assert_eq!(wm.dock().get(&1), Some(&id));
    }

    #[test]
    fn hidden_window_centers_on_first_show() {
        let mut wm = manager();
        let id = wm
            .create(
                WindowConfig::new("later")
                    .with_size(Dimension::Pixels(100.0), Dimension::Pixels(100.0))
                    .hidden(true),
            )
            .unwrap();
        assert_eq!(wm.window(id).unwrap().state(), WindowState::Invisible);
        assert_eq!(wm.focused(), None);
        wm.resize_viewport(600.0, 400.0);
        wm.show(id);
        assert_eq!(wm.window(id).unwrap().bounds(), Bounds::new(250.0, 150.0, 100.0, 100.0));
    }

    #[test]
    fn fit_height_is_capped() {
        let mut wm = manager();
        let id = wm.create(at(0.0, 0.0)).unwrap();
        wm.fit_height_to_content(id, 100.0).unwrap();
        assert_eq!(wm.window(id).unwrap().bounds().height, 140.0);
        wm.fit_height_to_content(id, 5000.0).unwrap();
        assert_eq!(wm.window(id).unwrap().bounds().height, 720.0);
    }

    #[test]
    fn bad_color_fails_fast() {
        let mut wm = manager();
        let id = wm.create(at(0.0, 0.0)).unwrap();
        assert!(wm.set_style_color(id, ColorRole::Background, "#zz").is_err());
        assert_eq!(
            wm.window(id).unwrap().style().background,
            StyleColor::rgb(0xd4, 0xf9, 0xfa)
        );
        wm.set_style_color(id, ColorRole::Background, "red").unwrap();
        let handle = wm.window(id).unwrap().surface();
        assert_eq!(
            wm.surface().view(handle).unwrap().style.background,
            StyleColor::rgb(255, 0, 0)
        );
    }

    #[test]
    fn set_base_z_restamps_every_window() {
        let mut wm = manager();
        let a = wm.create(at(0.0, 0.0)).unwrap();
        let b = wm.create(at(0.0, 0.0)).unwrap();
        wm.set_base_z(100);
        assert_eq!(wm.window(a).unwrap().z_order(), 101);
        assert_eq!(wm.window(b).unwrap().z_order(), 102);
        let handle = wm.window(b).unwrap().surface();
        assert_eq!(wm.surface().view(handle).unwrap().z, 102);
    }
}
