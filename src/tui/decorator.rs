use ratatui::buffer::Buffer;
use ratatui::prelude::Rect;
use ratatui::style::{Color, Modifier, Style};

use crate::window::config::Buttons;
use crate::window::surface::SurfacePart;

const MINIMIZE_LABEL: &str = "[_]";
const CLOSE_LABEL: &str = "[x]";
const BUTTON_WIDTH: u16 = 3;

/// Colors and labels for one window's frame.
#[derive(Debug, Clone)]
pub struct Chrome<'a> {
    pub title: &'a str,
    pub buttons: Buttons,
    pub header: Color,
    pub header_text: Color,
    pub body: Color,
    pub body_text: Color,
    pub active: bool,
}

pub trait WindowDecorator: std::fmt::Debug {
    /// Paint the title bar on the first row of `rect` and the body below.
    fn render_window(&self, buffer: &mut Buffer, rect: Rect, chrome: &Chrome<'_>, body: &[&str]);
    fn hit_test(&self, rect: Rect, buttons: Buttons, column: u16, row: u16) -> SurfacePart;
}

/// Flat single-row title bar with bracketed buttons at the right edge.
#[derive(Debug, Default)]
pub struct TitleBarDecorator;

impl TitleBarDecorator {
    /// Left edge of each button present, right to left: close, then minimize.
    fn button_columns(rect: Rect, buttons: Buttons) -> (Option<u16>, Option<u16>) {
        let right = rect.x.saturating_add(rect.width);
        let mut edge = right;
        let mut take = |present: bool| {
            if present && edge >= rect.x + BUTTON_WIDTH {
                edge -= BUTTON_WIDTH;
                Some(edge)
            } else {
                None
            }
        };
        let close = take(buttons.has_close());
        let minimize = take(buttons.has_minimize());
        (close, minimize)
    }
}

fn put_str(buffer: &mut Buffer, x: u16, y: u16, text: &str, limit: u16, style: Style) {
    for (offset, ch) in text.chars().enumerate() {
        let col = x.saturating_add(offset as u16);
        if col >= limit {
            break;
        }
        if let Some(cell) = buffer.cell_mut((col, y)) {
            cell.set_symbol(&ch.to_string());
            cell.set_style(style);
        }
    }
}

impl WindowDecorator for TitleBarDecorator {
    fn render_window(&self, buffer: &mut Buffer, rect: Rect, chrome: &Chrome<'_>, body: &[&str]) {
        if rect.width == 0 || rect.height == 0 {
            return;
        }
        let mut header_style = Style::default().bg(chrome.header).fg(chrome.header_text);
        if chrome.active {
            header_style = header_style.add_modifier(Modifier::BOLD);
        }
        let body_style = Style::default().bg(chrome.body).fg(chrome.body_text);
        let right = rect.x.saturating_add(rect.width);

        for y in rect.y..rect.y.saturating_add(rect.height) {
            let style = if y == rect.y { header_style } else { body_style };
            for x in rect.x..right {
                if let Some(cell) = buffer.cell_mut((x, y)) {
                    cell.set_symbol(" ");
                    cell.set_style(style);
                }
            }
        }

        let (close, minimize) = Self::button_columns(rect, chrome.buttons);
        let title_limit = minimize.or(close).unwrap_or(right);
        put_str(buffer, rect.x.saturating_add(1), rect.y, chrome.title, title_limit, header_style);
        if let Some(x) = minimize {
            put_str(buffer, x, rect.y, MINIMIZE_LABEL, right, header_style);
        }
        if let Some(x) = close {
            put_str(buffer, x, rect.y, CLOSE_LABEL, right, header_style);
        }

        for (offset, line) in body.iter().enumerate() {
            let y = rect.y.saturating_add(1 + offset as u16);
            if y >= rect.y.saturating_add(rect.height) {
                break;
            }
            put_str(buffer, rect.x.saturating_add(1), y, line, right, body_style);
        }
    }

    fn hit_test(&self, rect: Rect, buttons: Buttons, column: u16, row: u16) -> SurfacePart {
        if row != rect.y {
            return SurfacePart::Body;
        }
        let (close, minimize) = Self::button_columns(rect, buttons);
        let within = |start: Option<u16>| {
            start.is_some_and(|x| column >= x && column < x + BUTTON_WIDTH)
        };
        if within(close) {
            SurfacePart::CloseButton
        } else if within(minimize) {
            SurfacePart::MinimizeButton
        } else {
            SurfacePart::TitleBar
        }
    }
}
