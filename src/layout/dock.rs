//! Grid math for the minimize dock.
//!
//! Minimized windows are shrunk to tiles and laid out left-to-right in rows
//! along the bottom of the viewport. Everything here is a pure function of
//! the viewport, the tile width setting, the number of docked windows and
//! the measured title bar height.

use super::{Bounds, Viewport};
use crate::constants::TILE_OVERLAP_PERCENT;

/// Derived dock grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileGeometry {
    pub tile_width_percent: f64,
    pub tile_width: f64,
    /// Horizontal distance between the left edges of neighbouring tiles.
    pub stride: f64,
    pub slots_per_row: usize,
    pub row_count: usize,
}

impl TileGeometry {
    pub fn compute(viewport: Viewport, tile_width_percent: f64, docked: usize) -> Self {
        let tile_width = viewport.width * tile_width_percent / 100.0;
        let stride = tile_width - tile_width * TILE_OVERLAP_PERCENT / 100.0;
        let slots_per_row = if stride > 0.0 && stride.is_finite() {
            (viewport.width / stride).floor() as usize
        } else {
            0
        };
        // A viewport narrower than one tile still gets a single column.
        let slots_per_row = slots_per_row.max(1);
        Self {
            tile_width_percent,
            tile_width,
            stride,
            slots_per_row,
            row_count: docked.div_ceil(slots_per_row),
        }
    }

    /// Same grid with a different number of docked windows.
    pub fn with_docked(self, docked: usize) -> Self {
        Self {
            row_count: docked.div_ceil(self.slots_per_row),
            ..self
        }
    }
}

/// Where a docked tile goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DockPlacement {
    pub slot: usize,
    /// Zero-based row, counted in fill order.
    pub row: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl DockPlacement {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.x, self.y, self.width, self.height)
    }
}

/// Compute the tile rectangle for the 1-based `slot`.
///
/// A tile is two title bars tall: the bar itself plus a strip for the
/// minimized preview pane.
pub fn place_in_dock(
    slot: usize,
    geometry: &TileGeometry,
    title_bar_height: f64,
    viewport_height: f64,
) -> DockPlacement {
    let slot = slot.max(1);
    let per_row = geometry.slots_per_row.max(1);
    let row = (slot - 1) / per_row;
    let row_count = geometry.row_count.max(1);
    let logical_row = row_count as f64 - row as f64;
    let height = title_bar_height * 2.0;
    DockPlacement {
        slot,
        row,
        x: geometry.stride * ((slot - 1) % per_row) as f64,
        y: viewport_height - height * logical_row,
        width: geometry.tile_width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_for_reference_viewport() {
        let geometry = TileGeometry::compute(Viewport::new(1000.0, 800.0), 17.0, 3);
        assert_eq!(geometry.tile_width, 170.0);
        assert_eq!(geometry.stride, 136.0);
        assert_eq!(geometry.slots_per_row, 7);
        assert_eq!(geometry.row_count, 1);
    }

    #[test]
    fn first_row_tiles_share_a_baseline() {
        let geometry = TileGeometry::compute(Viewport::new(1000.0, 800.0), 17.0, 3);
        let xs: Vec<f64> = (1..=3)
            .map(|slot| place_in_dock(slot, &geometry, 20.0, 800.0).x)
            .collect();
        assert_eq!(xs, vec![0.0, 136.0, 272.0]);
        for slot in 1..=3 {
            let placement = place_in_dock(slot, &geometry, 20.0, 800.0);
            assert_eq!(placement.y, 760.0);
            assert_eq!(placement.height, 40.0);
            assert_eq!(placement.width, 170.0);
            assert_eq!(placement.row, 0);
        }
    }

    #[test]
    fn second_row_stacks_rows_upward() {
        let geometry = TileGeometry::compute(Viewport::new(1000.0, 800.0), 17.0, 8);
        assert_eq!(geometry.row_count, 2);
        let first = place_in_dock(1, &geometry, 20.0, 800.0);
        let eighth = place_in_dock(8, &geometry, 20.0, 800.0);
        assert_eq!(first.y, 720.0);
        assert_eq!(eighth.row, 1);
        assert_eq!(eighth.x, 0.0);
        assert_eq!(eighth.y, 760.0);
    }

    #[test]
    fn narrow_viewport_still_has_one_slot_per_row() {
        let geometry = TileGeometry::compute(Viewport::new(0.0, 400.0), 17.0, 2);
        assert_eq!(geometry.slots_per_row, 1);
        assert_eq!(geometry.row_count, 2);
        let placement = place_in_dock(2, &geometry, 10.0, 400.0);
        assert_eq!(placement.x, 0.0);
        assert_eq!(placement.y, 380.0);
    }

    #[test]
    fn placement_is_deterministic() {
        let geometry = TileGeometry::compute(Viewport::new(1280.0, 720.0), 17.0, 5);
        let a = place_in_dock(4, &geometry, 24.0, 720.0);
        let b = place_in_dock(4, &geometry, 24.0, 720.0);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_dock_uses_a_single_logical_row() {
        let geometry = TileGeometry::compute(Viewport::new(1000.0, 800.0), 17.0, 0);
        assert_eq!(geometry.row_count, 0);
        let placement = place_in_dock(1, &geometry, 20.0, 800.0);
        assert_eq!(placement.y, 760.0);
        assert_eq!(geometry.with_docked(1).row_count, 1);
    }
}
