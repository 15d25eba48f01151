use ratatui::style::Color;

use crate::window::config::StyleColor;

/// Channel values of the xterm 6x6x6 color cube.
const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

/// True when `COLORTERM` advertises 24-bit color.
pub fn truecolor_supported() -> bool {
    std::env::var("COLORTERM").is_ok_and(|value| {
        let value = value.to_ascii_lowercase();
        value.contains("truecolor") || value.contains("24bit")
    })
}

pub fn to_color(color: StyleColor, truecolor: bool) -> Color {
    if truecolor {
        Color::Rgb(color.r, color.g, color.b)
    } else {
        Color::Indexed(xterm_index(color.r, color.g, color.b))
    }
}

/// Nearest xterm-256 palette entry, picking between the color cube and the
/// gray ramp.
fn xterm_index(r: u8, g: u8, b: u8) -> u8 {
    let (ri, gi, bi) = (cube_step(r), cube_step(g), cube_step(b));
    let cube = (CUBE_LEVELS[ri], CUBE_LEVELS[gi], CUBE_LEVELS[bi]);
    let cube_index = 16 + 36 * ri as u8 + 6 * gi as u8 + bi as u8;

    let average = (r as u16 + g as u16 + b as u16) / 3;
    let gray_step = (average.saturating_sub(3) / 10).min(23) as u8;
    let gray = 8 + gray_step * 10;

    if distance((r, g, b), (gray, gray, gray)) < distance((r, g, b), cube) {
        232 + gray_step
    } else {
        cube_index
    }
}

fn cube_step(channel: u8) -> usize {
    CUBE_LEVELS
        .iter()
        .enumerate()
        .min_by_key(|(_, level)| (i16::from(**level) - i16::from(channel)).unsigned_abs())
        .map_or(0, |(step, _)| step)
}

fn distance(a: (u8, u8, u8), b: (u8, u8, u8)) -> u32 {
    let d = |x: u8, y: u8| (i32::from(x) - i32::from(y)).pow(2) as u32;
    d(a.0, b.0) + d(a.1, b.1) + d(a.2, b.2)
}
