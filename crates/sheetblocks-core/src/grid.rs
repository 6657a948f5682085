//! Dense row-major grids of cell values

use crate::block::snapshot;
use crate::cell::CellValue;

/// A cell type that distinguishes populated cells from the empty marker
///
/// Block detection only needs to know whether a cell is present, and which
/// value to substitute for cells that lie past the end of a short row.
pub trait Presence: Clone {
    /// Whether the cell is populated
    fn is_present(&self) -> bool;

    /// The empty marker
    fn absent() -> Self;
}

impl Presence for CellValue {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }

    fn absent() -> Self {
        CellValue::Empty
    }
}

impl<T: Clone> Presence for Option<T> {
    fn is_present(&self) -> bool {
        self.is_some()
    }

    fn absent() -> Self {
        None
    }
}

/// A materialized sheet: rows of cell values
///
/// Rows are expected to share row 0's length but ragged rows are tolerated;
/// reads past the end of a row yield [`CellValue::Empty`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Grid {
    rows: Vec<Vec<CellValue>>,
}

impl Grid {
    /// Create a grid from rows
    pub fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// Create a grid of the given shape filled with empty cells
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            rows: vec![vec![CellValue::Empty; cols]; rows],
        }
    }

    /// Build a grid from anything convertible to cell values
    ///
    /// ```
    /// use sheetblocks_core::{CellValue, Grid};
    ///
    /// let grid = Grid::from_values(vec![vec![Some(1), None], vec![None, Some(2)]]);
    /// assert_eq!(grid.get(1, 1), Some(&CellValue::Number(2.0)));
    /// assert_eq!(grid.get(0, 1), Some(&CellValue::Empty));
    /// ```
    pub fn from_values<V, R, I>(rows: I) -> Self
    where
        V: Into<CellValue>,
        R: IntoIterator<Item = V>,
        I: IntoIterator<Item = R>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Nominal column count (the length of row 0)
    pub fn col_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Check if the grid has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Consume the grid, returning its rows
    pub fn into_rows(self) -> Vec<Vec<CellValue>> {
        self.rows
    }

    /// Get a cell, or `None` when the position lies outside its row
    pub fn get(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Get a cell value, treating out-of-range positions as empty
    pub fn value(&self, row: usize, col: usize) -> CellValue {
        self.get(row, col).cloned().unwrap_or_default()
    }

    /// Check whether a cell is populated
    pub fn is_present(&self, row: usize, col: usize) -> bool {
        self.get(row, col).map_or(false, Presence::is_present)
    }

    /// Overwrite a cell; positions outside the row are ignored
    pub fn set(&mut self, row: usize, col: usize, value: CellValue) -> bool {
        match self.rows.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) => {
                *cell = value;
                true
            }
            None => false,
        }
    }

    /// A single row
    pub fn row(&self, row: usize) -> Option<&[CellValue]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    /// A single column across all rows; short rows contribute empty cells
    pub fn column(&self, col: usize) -> Vec<CellValue> {
        self.rows
            .iter()
            .map(|r| r.get(col).cloned().unwrap_or_default())
            .collect()
    }

    /// Copy the inclusive rectangle `[start_row..=end_row] x [start_col..=end_col]`
    ///
    /// The result is always rectangular; positions outside the grid are empty.
    pub fn sub_grid(
        &self,
        start_row: usize,
        start_col: usize,
        end_row: usize,
        end_col: usize,
    ) -> Grid {
        Grid::new(snapshot(&self.rows, start_row, start_col, end_row, end_col))
    }
}

impl From<Vec<Vec<CellValue>>> for Grid {
    fn from(rows: Vec<Vec<CellValue>>) -> Self {
        Self::new(rows)
    }
}

impl AsRef<[Vec<CellValue>]> for Grid {
    fn as_ref(&self) -> &[Vec<CellValue>] {
        &self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ragged() -> Grid {
        Grid::from_values(vec![
            vec![Some(1), Some(2), Some(3)],
            vec![Some(4)],
            vec![None, Some(5), None],
        ])
    }

    #[test]
    fn test_dimensions_follow_row_zero() {
        let grid = ragged();
        assert_eq!(grid.row_count(), 3);
        assert_eq!(grid.col_count(), 3);
        assert_eq!(Grid::default().col_count(), 0);
        assert!(Grid::default().is_empty());
    }

    #[test]
    fn test_short_rows_read_as_empty() {
        let grid = ragged();
        assert_eq!(grid.get(1, 2), None);
        assert_eq!(grid.value(1, 2), CellValue::Empty);
        assert!(!grid.is_present(1, 2));
        assert!(grid.is_present(1, 0));
        assert_eq!(grid.value(10, 10), CellValue::Empty);
    }

    #[test]
    fn test_row_and_column() {
        let grid = ragged();
        assert_eq!(grid.row(1), Some(&[CellValue::Number(4.0)][..]));
        assert_eq!(grid.row(3), None);
        assert_eq!(
            grid.column(2),
            vec![CellValue::Number(3.0), CellValue::Empty, CellValue::Empty]
        );
    }

    #[test]
    fn test_sub_grid_pads_short_rows() {
        let grid = ragged();
        let sub = grid.sub_grid(0, 1, 1, 2);
        assert_eq!(
            sub,
            Grid::new(vec![
                vec![CellValue::Number(2.0), CellValue::Number(3.0)],
                vec![CellValue::Empty, CellValue::Empty],
            ])
        );
    }

    #[test]
    fn test_set_ignores_out_of_range() {
        let mut grid = Grid::empty(2, 2);
        assert!(grid.set(1, 1, CellValue::from("x")));
        assert!(!grid.set(1, 5, CellValue::from("y")));
        assert_eq!(grid.value(1, 1).as_string(), Some("x"));
    }
}
