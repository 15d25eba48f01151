//! Terminal rendition of the window surface.
//!
//! One cell is one unit of `Bounds`, so the title bar is a single row and
//! a docked tile is two rows tall. Transitions are interpolated at render
//! time from the wall clock.

pub mod decorator;

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::prelude::Rect;

use crate::input::HitTarget;
use crate::layout::Bounds;
use crate::term_color::to_color;
use crate::window::WindowId;
use crate::window::config::{Buttons, WindowConfig, WindowStyle};
use crate::window::surface::{ContentPane, Surface, SurfaceHandle};
use decorator::{Chrome, TitleBarDecorator, WindowDecorator};

const TITLE_BAR_ROWS: f64 = 1.0;

#[derive(Debug, Clone, Copy)]
struct Motion {
    from: Bounds,
    started: Instant,
    duration: Duration,
}

#[derive(Debug, Clone)]
struct TerminalPane {
    id: WindowId,
    title: String,
    bounds: Bounds,
    motion: Option<Motion>,
    /// Set between `begin_transition` and `end_transition`.
    animating: Option<Duration>,
    visible: bool,
    z: i64,
    buttons: Buttons,
    pane: ContentPane,
    active: bool,
    style: WindowStyle,
    body: Vec<String>,
    preview: String,
}

impl TerminalPane {
    fn displayed(&self, now: Instant) -> Bounds {
        let Some(motion) = self.motion else {
            return self.bounds;
        };
        let t = if motion.duration.is_zero() {
            1.0
        } else {
            (now.saturating_duration_since(motion.started).as_secs_f64()
                / motion.duration.as_secs_f64())
            .min(1.0)
        };
        let lerp = |a: f64, b: f64| a + (b - a) * t;
        Bounds::new(
            lerp(motion.from.left, self.bounds.left),
            lerp(motion.from.top, self.bounds.top),
            lerp(motion.from.width, self.bounds.width),
            lerp(motion.from.height, self.bounds.height),
        )
    }
}

/// Clip fractional cell bounds to `area`.
fn to_rect(bounds: Bounds, area: Rect) -> Option<Rect> {
    let clamp_x = |v: f64| (v.round().max(0.0) as u32).min(u32::from(area.width)) as u16;
    let clamp_y = |v: f64| (v.round().max(0.0) as u32).min(u32::from(area.height)) as u16;
    let (x0, x1) = (clamp_x(bounds.left), clamp_x(bounds.right()));
    let (y0, y1) = (clamp_y(bounds.top), clamp_y(bounds.bottom()));
    (x1 > x0 && y1 > y0).then(|| Rect::new(area.x + x0, area.y + y0, x1 - x0, y1 - y0))
}

#[derive(Debug)]
pub struct TerminalSurface {
    next_handle: u64,
    panes: BTreeMap<SurfaceHandle, TerminalPane>,
    decorator: TitleBarDecorator,
    truecolor: bool,
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new(crate::term_color::truecolor_supported())
    }
}

impl TerminalSurface {
    pub fn new(truecolor: bool) -> Self {
        Self {
            next_handle: 1,
            panes: BTreeMap::new(),
            decorator: TitleBarDecorator,
            truecolor,
        }
    }

    pub fn set_body(&mut self, handle: SurfaceHandle, lines: Vec<String>) {
        if let Some(pane) = self.panes.get_mut(&handle) {
            pane.body = lines;
        }
    }

    /// Text shown in the strip under a minimized tile's title bar.
    pub fn set_preview(&mut self, handle: SurfaceHandle, preview: impl Into<String>) {
        if let Some(pane) = self.panes.get_mut(&handle) {
            pane.preview = preview.into();
        }
    }

    pub fn is_animating(&self) -> bool {
        self.panes.values().any(|pane| pane.motion.is_some())
    }

    fn stacked(&self) -> Vec<(SurfaceHandle, &TerminalPane)> {
        let mut panes: Vec<_> = self
            .panes
            .iter()
            .filter(|(_, pane)| pane.visible)
            .map(|(handle, pane)| (*handle, pane))
            .collect();
        panes.sort_by_key(|(handle, pane)| (pane.z, *handle));
        panes
    }

    /// Topmost window part under a cell, if any.
    pub fn hit_test(&self, area: Rect, column: u16, row: u16, now: Instant) -> Option<HitTarget> {
        self.stacked().into_iter().rev().find_map(|(handle, pane)| {
            let rect = to_rect(pane.displayed(now), area)?;
            let inside = column >= rect.x
                && column < rect.x + rect.width
                && row >= rect.y
                && row < rect.y + rect.height;
            inside.then(|| {
                HitTarget::new(handle, self.decorator.hit_test(rect, pane.buttons, column, row))
            })
        })
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, now: Instant) {
        self.render_into(frame.buffer_mut(), area, now);
    }

    pub fn render_into(&self, buffer: &mut Buffer, area: Rect, now: Instant) {
        for (_, pane) in self.stacked() {
            let Some(rect) = to_rect(pane.displayed(now), area) else {
                continue;
            };
            let color = |c| to_color(c, self.truecolor);
            let (buttons, body): (Buttons, Vec<&str>) = match pane.pane {
                ContentPane::Primary => (pane.buttons, pane.body.iter().map(String::as_str).collect()),
                ContentPane::MinimizedPreview => (Buttons::None, vec![pane.preview.as_str()]),
            };
            let header = if pane.active {
                pane.style.title_bar_active
            } else {
                pane.style.title_bar_inactive
            };
            let chrome = Chrome {
                title: &pane.title,
                buttons,
                header: color(header),
                header_text: color(pane.style.title_text),
                body: color(pane.style.background),
                body_text: color(pane.style.text),
                active: pane.active,
            };
            tracing::trace!(window_id = %pane.id, ?rect, "render window");
            self.decorator.render_window(buffer, rect, &chrome, &body);
        }
    }
}

impl Surface for TerminalSurface {
    fn attach(&mut self, id: WindowId, config: &WindowConfig) -> SurfaceHandle {
        let handle = SurfaceHandle(self.next_handle);
        self.next_handle += 1;
        self.panes.insert(
            handle,
            TerminalPane {
                id,
                title: config.title.clone(),
                bounds: Bounds::default(),
                motion: None,
                animating: None,
                visible: false,
                z: 0,
                buttons: config.buttons,
                pane: ContentPane::Primary,
                active: false,
                style: config.style.clone(),
                body: Vec::new(),
                preview: String::new(),
            },
        );
        handle
    }

    fn set_bounds(&mut self, handle: SurfaceHandle, bounds: Bounds) {
        let now = Instant::now();
        if let Some(pane) = self.panes.get_mut(&handle) {
            let from = pane.displayed(now);
            pane.motion = pane.animating.map(|duration| Motion {
                from,
                started: now,
                duration,
            });
            pane.bounds = bounds;
        }
    }

    fn set_visible(&mut self, handle: SurfaceHandle, visible: bool) {
        if let Some(pane) = self.panes.get_mut(&handle) {
            pane.visible = visible;
        }
    }

    fn set_z_order(&mut self, handle: SurfaceHandle, z: i64) {
        if let Some(pane) = self.panes.get_mut(&handle) {
            pane.z = z;
        }
    }

    fn begin_transition(&mut self, handle: SurfaceHandle, duration: Duration) {
        if let Some(pane) = self.panes.get_mut(&handle) {
            pane.animating = Some(duration);
        }
    }

    fn end_transition(&mut self, handle: SurfaceHandle) {
        if let Some(pane) = self.panes.get_mut(&handle) {
            pane.animating = None;
            pane.motion = None;
        }
    }

    fn show_chrome(&mut self, handle: SurfaceHandle, buttons: Buttons) {
        if let Some(pane) = self.panes.get_mut(&handle) {
            pane.buttons = buttons;
        }
    }

    fn swap_content_pane(&mut self, handle: SurfaceHandle, content: ContentPane) {
        if let Some(pane) = self.panes.get_mut(&handle) {
            pane.pane = content;
        }
    }

    fn set_active(&mut self, handle: SurfaceHandle, active: bool) {
        if let Some(pane) = self.panes.get_mut(&handle) {
            pane.active = active;
        }
    }

    fn set_title(&mut self, handle: SurfaceHandle, title: &str) {
        if let Some(pane) = self.panes.get_mut(&handle) {
            pane.title = title.to_string();
        }
    }

    fn set_style(&mut self, handle: SurfaceHandle, style: &WindowStyle) {
        if let Some(pane) = self.panes.get_mut(&handle) {
            pane.style = style.clone();
        }
    }

    fn title_bar_height(&self, _handle: SurfaceHandle) -> f64 {
        TITLE_BAR_ROWS
    }

    fn dispose(&mut self, handle: SurfaceHandle) {
        self.panes.remove(&handle);
    }
}
