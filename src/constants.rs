//! Shared crate-wide constants.

use std::time::Duration;

/// Width of one minimized tile as a percentage of the viewport width.
pub const DEFAULT_TILE_WIDTH_PERCENT: f64 = 17.0;

/// Share of a tile's width that overlaps its right-hand neighbour.
///
/// Tiles are laid out on a stride of 80 % of their width so more of them fit
/// on a row than a plain division would allow.
pub const TILE_OVERLAP_PERCENT: f64 = 20.0;

/// Distance (in pixels) a docked tile must travel under the pointer before
/// it leaves the dock.
pub const UNDOCK_THRESHOLD: f64 = 5.0;

/// Delay before the first phase of a minimize/restore transition swaps
/// chrome and content panes.
pub const TRANSITION_PHASE_DELAY: Duration = Duration::from_millis(50);

/// Time from the start of a minimize/restore until the new state commits.
pub const TRANSITION_DURATION: Duration = Duration::from_millis(250);

/// Two pointer-downs on the same window within this interval count as a
/// double click.
pub const DOUBLE_CLICK_INTERVAL: Duration = Duration::from_millis(500);

/// Largest share of the viewport height `fit_height_to_content` may use.
pub const MAX_CONTENT_HEIGHT_PERCENT: f64 = 90.0;

/// Primary pointer button bit in a `ButtonMask`.
pub const PRIMARY_BUTTON: u8 = 0b001;
