//! Grid transforms applied before block detection
//!
//! Sheets read from files are raw: a merged region only stores its value in
//! the top-left (anchor) cell. A [`GridTransform`] rewrites a grid into the
//! shape block detection should see, without touching the worksheet.

use crate::cell::{CellRange, CellValue};
use crate::grid::Grid;

/// A rewrite of a whole grid
pub trait GridTransform {
    /// Produce the transformed grid
    fn apply(&self, grid: Grid) -> Grid;
}

impl<F: Fn(Grid) -> Grid> GridTransform for F {
    fn apply(&self, grid: Grid) -> Grid {
        self(grid)
    }
}

/// Fills the secondary cells of merged regions
///
/// With `copy_anchor` set, every cell of a merged region takes the anchor's
/// value. Secondary cells still empty afterwards (anchor empty, or copying
/// disabled) receive `dummy` when one is configured. Regions reaching past
/// the grid are clipped; the grid keeps its shape.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedCellFill {
    /// Merged regions to fill
    pub regions: Vec<CellRange>,
    /// Copy the anchor value into secondary cells
    pub copy_anchor: bool,
    /// Marker for secondary cells left empty
    pub dummy: Option<CellValue>,
}

impl MergedCellFill {
    /// Copy anchors into the given regions, without a dummy marker
    pub fn new(regions: impl Into<Vec<CellRange>>) -> Self {
        Self {
            regions: regions.into(),
            copy_anchor: true,
            dummy: None,
        }
    }

    /// Set the marker written into secondary cells left empty
    pub fn with_dummy(mut self, dummy: impl Into<CellValue>) -> Self {
        self.dummy = Some(dummy.into());
        self
    }

    /// Enable or disable copying of the anchor value
    pub fn with_copy_anchor(mut self, copy_anchor: bool) -> Self {
        self.copy_anchor = copy_anchor;
        self
    }

    /// The value a secondary cell of a region with this anchor should hold
    fn fill_value(&self, anchor: &CellValue) -> Option<CellValue> {
        if self.copy_anchor && !anchor.is_empty() {
            Some(anchor.clone())
        } else {
            self.dummy.clone()
        }
    }
}

impl GridTransform for MergedCellFill {
    fn apply(&self, mut grid: Grid) -> Grid {
        for region in &self.regions {
            let (anchor_row, anchor_col) = region.start.indices();
            let anchor = grid.value(anchor_row, anchor_col);
            let Some(fill) = self.fill_value(&anchor) else {
                continue;
            };

            // Clip to the grid before walking the region
            let (end_row, end_col) = region.end.indices();
            let last_row = end_row.min(grid.row_count().saturating_sub(1));
            for row in anchor_row..=last_row {
                let width = grid.row(row).map_or(0, <[CellValue]>::len);
                for col in anchor_col..=end_col.min(width.saturating_sub(1)) {
                    if (row, col) == (anchor_row, anchor_col) {
                        continue;
                    }
                    if grid.get(row, col).map_or(false, CellValue::is_empty) {
                        grid.set(row, col, fill.clone());
                    }
                }
            }
        }
        grid
    }
}
