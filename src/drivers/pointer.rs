//! crossterm mouse reports to `HostEvent`s.

use crossterm::event::{Event, MouseButton, MouseEvent, MouseEventKind};

use crate::input::{ButtonMask, HitTarget, HostEvent, PointerEvent, PointerKind};

fn button_bit(button: MouseButton) -> u8 {
    match button {
        MouseButton::Left => 0b001,
        MouseButton::Right => 0b010,
        MouseButton::Middle => 0b100,
    }
}

/// Tracks which buttons are held, since terminals only report the button
/// that changed.
#[derive(Debug, Default)]
pub struct PointerTranslator {
    pressed: u8,
}

impl PointerTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate a terminal event. `hit` resolves a cell to the window part
    /// under it; `top_offset` is the number of rows above the viewport.
    pub fn translate<H>(&mut self, event: &Event, top_offset: u16, hit: H) -> Option<HostEvent>
    where
        H: Fn(u16, u16) -> Option<HitTarget>,
    {
        match event {
            Event::Mouse(mouse) => self.pointer(mouse, top_offset, hit).map(HostEvent::Pointer),
            Event::Resize(width, height) => Some(HostEvent::Resize {
                width: f64::from(*width),
                height: f64::from(height.saturating_sub(top_offset)),
            }),
            Event::FocusLost => Some(HostEvent::FocusIn(None)),
            _ => None,
        }
    }

    fn pointer<H>(&mut self, mouse: &MouseEvent, top_offset: u16, hit: H) -> Option<PointerEvent>
    where
        H: Fn(u16, u16) -> Option<HitTarget>,
    {
        let kind = match mouse.kind {
            MouseEventKind::Down(button) => {
                self.pressed |= button_bit(button);
                PointerKind::Down
            }
            MouseEventKind::Up(button) => {
                self.pressed &= !button_bit(button);
                PointerKind::Up
            }
            MouseEventKind::Drag(button) => {
                self.pressed |= button_bit(button);
                PointerKind::Move
            }
            MouseEventKind::Moved => {
                self.pressed = 0;
                PointerKind::Move
            }
            _ => return None,
        };
        let target = match kind {
            PointerKind::Move => None,
            PointerKind::Down | PointerKind::Up => hit(mouse.column, mouse.row),
        };
        Some(PointerEvent {
            kind,
            x: f64::from(mouse.column),
            y: f64::from(mouse.row) - f64::from(top_offset),
            buttons: ButtonMask(self.pressed),
            target,
        })
    }
}
