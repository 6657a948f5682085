//! Worksheet type

use std::collections::BTreeMap;

use crate::cell::{CellAddress, CellRange, CellValue};
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::{MAX_COLS, MAX_ROWS};

/// A worksheet (single sheet in a workbook)
///
/// Cells are stored sparsely; [`Worksheet::to_grid`] materializes them as a
/// dense grid anchored at A1.
#[derive(Debug, Clone, Default)]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Populated cells keyed by (row, col)
    cells: BTreeMap<(u32, u16), CellValue>,
    /// Merged regions, in file order
    merged_regions: Vec<CellRange>,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    // === Cell Access ===

    /// Get a cell value by address string (e.g., "A1")
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.get_value_at(addr.row, addr.col))
    }

    /// Get a cell value by indices; missing cells are empty
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.cell_at(row, col).cloned().unwrap_or_default()
    }

    /// Get a populated cell by indices
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&CellValue> {
        self.cells.get(&(row, col))
    }

    /// Set a cell value by address string
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value by row and column indices
    ///
    /// Setting [`CellValue::Empty`] clears the cell.
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        self.validate_cell_position(row, col)?;
        match value.into() {
            CellValue::Empty => {
                self.cells.remove(&(row, col));
            }
            value => {
                self.cells.insert((row, col), value);
            }
        }
        Ok(())
    }

    /// Get the number of populated cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Get the used range (bounds of all populated cells)
    pub fn used_range(&self) -> Option<CellRange> {
        let mut iter = self.cells.keys();
        let &(first_row, first_col) = iter.next()?;
        let (min_row, min_col, max_row, max_col) = iter.fold(
            (first_row, first_col, first_row, first_col),
            |(r0, c0, r1, c1), &(row, col)| (r0.min(row), c0.min(col), r1.max(row), c1.max(col)),
        );
        Some(CellRange::from_indices(min_row, min_col, max_row, max_col))
    }

    /// Dense grid size `(rows, cols)`, counted from A1 to the last populated cell
    pub fn dimensions(&self) -> (usize, usize) {
        self.used_range().map_or((0, 0), |range| {
            (range.end.row as usize + 1, range.end.col as usize + 1)
        })
    }

    /// Materialize the sheet as a dense grid anchored at A1
    ///
    /// Every row has the same length; an empty sheet yields a grid with no rows.
    pub fn to_grid(&self) -> Grid {
        let (rows, cols) = self.dimensions();
        self.to_grid_sized(rows, cols)
    }

    /// Materialize a `rows` x `cols` grid anchored at A1
    ///
    /// Populated cells outside the requested size are left out.
    pub fn to_grid_sized(&self, rows: usize, cols: usize) -> Grid {
        let mut grid = Grid::empty(rows, cols);
        for (&(row, col), value) in &self.cells {
            grid.set(row as usize, col as usize, value.clone());
        }
        grid
    }

    // === Merged Cells ===

    /// Get merged regions
    pub fn merged_regions(&self) -> &[CellRange] {
        &self.merged_regions
    }

    /// Merge cells
    pub fn merge_cells(&mut self, range: &CellRange) -> Result<()> {
        if self.merged_regions.iter().any(|existing| range.overlaps(existing)) {
            return Err(Error::MergedCellConflict(range.to_string()));
        }
        self.merged_regions.push(*range);
        Ok(())
    }

    /// Validate cell position
    fn validate_cell_position(&self, row: u32, col: u16) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        Ok(())
    }
}
