//! Typed construction parameters.
//!
//! Every option a window or the manager recognizes is enumerated here with
//! its default. String forms parse through `FromStr` and fail with a
//! `ConfigError` naming the offending input instead of coercing to zero.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::constants::{
    DEFAULT_TILE_WIDTH_PERCENT, DOUBLE_CLICK_INTERVAL, TRANSITION_DURATION,
    TRANSITION_PHASE_DELAY, UNDOCK_THRESHOLD,
};
use crate::error::ConfigError;

fn parse_number(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    value.is_finite().then_some(value)
}

fn check_non_negative(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}

/// A window extent: fixed pixels, or a share of the viewport that is
/// re-applied whenever the viewport changes size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    Pixels(f64),
    /// Fraction of the viewport extent, `0.5` for "50%".
    Viewport(f64),
}

impl Dimension {
    pub fn resolve(self, extent: f64) -> f64 {
        match self {
            Dimension::Pixels(px) => px,
            Dimension::Viewport(fraction) => extent * fraction,
        }
    }

    pub fn viewport_fraction(self) -> Option<f64> {
        match self {
            Dimension::Pixels(_) => None,
            Dimension::Viewport(fraction) => Some(fraction),
        }
    }

    fn validate(self, field: &'static str) -> Result<(), ConfigError> {
        match self {
            Dimension::Pixels(v) | Dimension::Viewport(v) => check_non_negative(field, v).map(drop),
        }
    }
}

impl From<f64> for Dimension {
    fn from(px: f64) -> Self {
        Dimension::Pixels(px)
    }
}

impl Dimension {
    /// Parse an extent for one axis. "%" works on either axis, "vw" only on
    /// widths and "vh" only on heights.
    pub fn parse_on(s: &str, axis: Axis) -> Result<Self, ConfigError> {
        let raw = s.trim().to_ascii_lowercase();
        let (own, other) = match axis {
            Axis::Horizontal => ("vw", "vh"),
            Axis::Vertical => ("vh", "vw"),
        };
        if raw.ends_with(other) {
            return Err(ConfigError::ViewportUnitAxis {
                input: s.to_string(),
                axis,
            });
        }
        match raw.strip_suffix(own) {
            Some(number) => Self::viewport_share(s, number),
            None => s.parse(),
        }
    }

    fn viewport_share(input: &str, number: &str) -> Result<Self, ConfigError> {
        let fraction = parse_number(number)
            .ok_or_else(|| ConfigError::InvalidDimension(input.to_string()))?
            / 100.0;
        let dimension = Dimension::Viewport(fraction);
        dimension.validate("dimension")?;
        Ok(dimension)
    }
}

/// Axis-free form: pixels or a "%" share. Use `Dimension::parse_on` for
/// "vw"/"vh".
impl FromStr for Dimension {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().to_ascii_lowercase();
        if let Some(number) = raw.strip_suffix('%') {
            return Self::viewport_share(s, number);
        }
        let number = raw.strip_suffix("px").unwrap_or(&raw);
        let dimension = Dimension::Pixels(
            parse_number(number).ok_or_else(|| ConfigError::InvalidDimension(s.to_string()))?,
        );
        dimension.validate("dimension")?;
        Ok(dimension)
    }
}

/// Which viewport extent a dimension is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Axis::Horizontal => "width",
            Axis::Vertical => "height",
        })
    }
}

/// Initial window origin on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Position {
    Pixels(f64),
    /// Fraction of the viewport extent, resolved once at construction.
    Percent(f64),
    #[default]
    Center,
}

impl Position {
    /// `None` for `Center`, which depends on the window size.
    pub fn resolve(self, extent: f64) -> Option<f64> {
        match self {
            Position::Pixels(px) => Some(px),
            Position::Percent(fraction) => Some(extent * fraction),
            Position::Center => None,
        }
    }
}

impl From<f64> for Position {
    fn from(px: f64) -> Self {
        Position::Pixels(px)
    }
}

impl FromStr for Position {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().to_ascii_lowercase();
        let invalid = || ConfigError::InvalidPosition(s.to_string());
        if raw == "center" || raw == "centre" {
            return Ok(Position::Center);
        }
        if let Some(number) = raw.strip_suffix('%') {
            return Ok(Position::Percent(parse_number(number).ok_or_else(invalid)? / 100.0));
        }
        let number = raw.strip_suffix("px").unwrap_or(&raw);
        Ok(Position::Pixels(parse_number(number).ok_or_else(invalid)?))
    }
}

/// Which native control buttons the title bar shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Buttons {
    #[default]
    Both,
    Close,
    Minimize,
    None,
}

impl Buttons {
    pub fn has_close(self) -> bool {
        matches!(self, Buttons::Both | Buttons::Close)
    }

    pub fn has_minimize(self) -> bool {
        matches!(self, Buttons::Both | Buttons::Minimize)
    }

    pub fn count(self) -> usize {
        usize::from(self.has_close()) + usize::from(self.has_minimize())
    }
}

impl FromStr for Buttons {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "both" => Ok(Buttons::Both),
            "close" => Ok(Buttons::Close),
            "minimize" => Ok(Buttons::Minimize),
            "none" => Ok(Buttons::None),
            _ => Err(ConfigError::InvalidButtons(s.to_string())),
        }
    }
}

/// An RGBA color as handed to the surface adapter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f32,
}

impl StyleColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, alpha: 1.0 }
    }

    fn named(name: &str) -> Option<Self> {
        let color = match name {
            "black" => Self::rgb(0, 0, 0),
            "white" => Self::rgb(255, 255, 255),
            "red" => Self::rgb(255, 0, 0),
            "green" => Self::rgb(0, 128, 0),
            "lime" => Self::rgb(0, 255, 0),
            "blue" => Self::rgb(0, 0, 255),
            "yellow" => Self::rgb(255, 255, 0),
            "cyan" => Self::rgb(0, 255, 255),
            "magenta" | "fuchsia" => Self::rgb(255, 0, 255),
            "purple" => Self::rgb(128, 0, 128),
            "gray" | "grey" => Self::rgb(128, 128, 128),
            "orange" => Self::rgb(255, 165, 0),
            _ => return None,
        };
        Some(color)
    }

    fn hex(digits: &str) -> Option<Self> {
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match digits.len() {
            3 => {
                let mut it = digits.chars().map(|c| c.to_digit(16).map(|d| (d * 17) as u8));
                Some(Self::rgb(it.next()??, it.next()??, it.next()??))
            }
            6 => Some(Self::rgb(
                channel(digits.get(0..2)?)?,
                channel(digits.get(2..4)?)?,
                channel(digits.get(4..6)?)?,
            )),
            _ => None,
        }
    }

    fn functional(raw: &str) -> Option<Self> {
        let (name, rest) = raw.split_once('(')?;
        let body = rest.strip_suffix(')')?;
        let parts: Vec<f64> = body
            .split(',')
            .map(parse_number)
            .collect::<Option<Vec<_>>>()?;
        let expected = match name.trim() {
            "rgb" => 3,
            "rgba" => 4,
            _ => return None,
        };
        if parts.len() != expected {
            return None;
        }
        let clamp = |v: f64| v.clamp(0.0, 255.0).round() as u8;
        Some(Self {
            r: clamp(parts[0]),
            g: clamp(parts[1]),
            b: clamp(parts[2]),
            alpha: parts.get(3).map_or(1.0, |a| a.clamp(0.0, 1.0) as f32),
        })
    }
}

impl FromStr for StyleColor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().to_ascii_lowercase();
        let parsed = if let Some(digits) = raw.strip_prefix('#') {
            Self::hex(digits)
        } else if raw.contains('(') {
            Self::functional(&raw)
        } else {
            Self::named(&raw)
        };
        parsed.ok_or_else(|| ConfigError::InvalidColor(s.to_string()))
    }
}

impl fmt::Display for StyleColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({},{},{},{:.2})", self.r, self.g, self.b, self.alpha)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontUnit {
    Px,
    Pt,
    Em,
    Rem,
    Percent,
    Vw,
    Vh,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSize {
    pub value: f64,
    pub unit: FontUnit,
}

impl FromStr for FontSize {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim().to_ascii_lowercase();
        // longest suffixes first so "rem" is not read as "em"
        const UNITS: [(&str, FontUnit); 7] = [
            ("rem", FontUnit::Rem),
            ("px", FontUnit::Px),
            ("pt", FontUnit::Pt),
            ("em", FontUnit::Em),
            ("vw", FontUnit::Vw),
            ("vh", FontUnit::Vh),
            ("%", FontUnit::Percent),
        ];
        UNITS
            .iter()
            .find_map(|(suffix, unit)| {
                let number = raw.strip_suffix(suffix)?;
                let value = parse_number(number)?;
                (value > 0.0).then_some(FontSize { value, unit: *unit })
            })
            .ok_or_else(|| ConfigError::InvalidFontSize(s.to_string()))
    }
}

/// Color slots a window exposes to its surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRole {
    Background,
    Text,
    TitleBarActive,
    TitleBarInactive,
    TitleText,
}

/// Presentation passthrough. None of this affects the state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowStyle {
    pub background: StyleColor,
    pub text: StyleColor,
    pub title_bar_active: StyleColor,
    pub title_bar_inactive: StyleColor,
    pub title_text: StyleColor,
    pub font_size: Option<FontSize>,
}

impl Default for WindowStyle {
    fn default() -> Self {
        Self {
            background: StyleColor::rgb(0xd4, 0xf9, 0xfa),
            text: StyleColor::rgb(0, 0, 0),
            title_bar_active: StyleColor::rgb(0x60, 0x83, 0xeb),
            title_bar_inactive: StyleColor::rgb(0x8e, 0xa1, 0xad),
            title_text: StyleColor::rgb(255, 255, 255),
            font_size: None,
        }
    }
}

impl WindowStyle {
    pub fn color(&self, role: ColorRole) -> StyleColor {
        match role {
            ColorRole::Background => self.background,
            ColorRole::Text => self.text,
            ColorRole::TitleBarActive => self.title_bar_active,
            ColorRole::TitleBarInactive => self.title_bar_inactive,
            ColorRole::TitleText => self.title_text,
        }
    }

    pub fn set_color(&mut self, role: ColorRole, color: StyleColor) {
        let slot = match role {
            ColorRole::Background => &mut self.background,
            ColorRole::Text => &mut self.text,
            ColorRole::TitleBarActive => &mut self.title_bar_active,
            ColorRole::TitleBarInactive => &mut self.title_bar_inactive,
            ColorRole::TitleText => &mut self.title_text,
        };
        *slot = color;
    }
}

/// Everything needed to construct a window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    pub title: String,
    pub x: Position,
    pub y: Position,
    pub width: Dimension,
    pub height: Dimension,
    pub buttons: Buttons,
    pub resizable: bool,
    pub draggable: bool,
    /// Create the window hidden; centering is deferred to the first `show`.
    pub hidden: bool,
    pub style: WindowStyle,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            x: Position::Center,
            y: Position::Center,
            width: Dimension::Pixels(400.0),
            height: Dimension::Pixels(300.0),
            buttons: Buttons::Both,
            resizable: true,
            draggable: true,
            hidden: false,
            style: WindowStyle::default(),
        }
    }
}

impl WindowConfig {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Build from the string forms a host typically carries around, e.g.
    /// `("center", "40", "50%", "300px", "Inbox")`.
    pub fn from_specs(
        x: &str,
        y: &str,
        width: &str,
        height: &str,
        title: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(title)
            .with_position(x.parse()?, y.parse()?)
            .with_size(
                Dimension::parse_on(width, Axis::Horizontal)?,
                Dimension::parse_on(height, Axis::Vertical)?,
            ))
    }

    pub fn with_position(mut self, x: Position, y: Position) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_size(mut self, width: Dimension, height: Dimension) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_buttons(mut self, buttons: Buttons) -> Self {
        self.buttons = buttons;
        self
    }

    pub fn with_style(mut self, style: WindowStyle) -> Self {
        self.style = style;
        self
    }

    pub fn resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    pub fn draggable(mut self, draggable: bool) -> Self {
        self.draggable = draggable;
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.width.validate("width")?;
        self.height.validate("height")?;
        for position in [self.x, self.y] {
            if let Position::Pixels(v) | Position::Percent(v) = position
                && !v.is_finite()
            {
                return Err(ConfigError::OutOfRange {
                    field: "position",
                    value: v,
                });
            }
        }
        Ok(())
    }
}

/// How a lifecycle call that arrives while a minimize/restore is still in
/// flight is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionConflict {
    /// Run the call after the in-flight transition commits.
    #[default]
    Queue,
    /// Cancel the in-flight transition, revert to its origin, then run the
    /// call.
    Restart,
}

impl FromStr for TransitionConflict {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "queue" => Ok(TransitionConflict::Queue),
            "restart" | "cancel" => Ok(TransitionConflict::Restart),
            _ => Err(ConfigError::InvalidConflictPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for TransitionConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransitionConflict::Queue => "queue",
            TransitionConflict::Restart => "restart",
        })
    }
}

/// Manager-wide settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagerConfig {
    pub tile_width_percent: f64,
    /// Added to every window's index to form its z-order.
    pub base_z: i64,
    pub transition_delay: Duration,
    pub transition_duration: Duration,
    pub undock_threshold: f64,
    pub double_click_interval: Duration,
    pub conflict: TransitionConflict,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            tile_width_percent: DEFAULT_TILE_WIDTH_PERCENT,
            base_z: 0,
            transition_delay: TRANSITION_PHASE_DELAY,
            transition_duration: TRANSITION_DURATION,
            undock_threshold: UNDOCK_THRESHOLD,
            double_click_interval: DOUBLE_CLICK_INTERVAL,
            conflict: TransitionConflict::Queue,
        }
    }
}

impl ManagerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("tile_width_percent", self.tile_width_percent)?;
        check_non_negative("undock_threshold", self.undock_threshold)?;
        Ok(())
    }
}
