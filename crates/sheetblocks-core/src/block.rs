//! Block detection
//!
//! A *block* is a maximal connected component of populated cells together
//! with the bounding box that encloses it. Blocks recover the logical tables
//! scattered across an otherwise free-form sheet.
//!
//! The scan is row-major and the traversal uses an explicit stack, so a sheet
//! that is one giant component costs heap memory, never call-stack depth.
//!
//! ```
//! use sheetblocks_core::{find_blocks, Connectivity, Grid};
//!
//! let grid = Grid::from_values(vec![
//!     vec![Some(1), Some(1), None],
//!     vec![None, None, None],
//!     vec![None, Some(1), Some(1)],
//! ]);
//!
//! let blocks = find_blocks(grid.rows(), Connectivity::Eight, false).unwrap();
//! assert_eq!(blocks.len(), 2);
//! assert_eq!((blocks[1].start_row, blocks[1].start_col), (2, 1));
//! ```

use std::fmt;
use std::str::FromStr;

use crate::cell::{CellAddress, CellRange, CellValue};
use crate::error::{Error, Result};
use crate::grid::Presence;

const ORTHOGONAL: [(isize, isize); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

const ALL_DIRECTIONS: [(isize, isize); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Adjacency rule deciding which neighbouring cells are connected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Connectivity {
    /// Up, down, left, right
    Four,
    /// Orthogonal neighbours plus the four diagonals
    #[default]
    Eight,
}

impl Connectivity {
    /// Row/column offsets of the neighbours under this rule
    pub fn neighbors(self) -> &'static [(isize, isize)] {
        match self {
            Connectivity::Four => &ORTHOGONAL,
            Connectivity::Eight => &ALL_DIRECTIONS,
        }
    }

    /// Number of neighbours a cell has under this rule
    pub fn neighbor_count(self) -> u8 {
        match self {
            Connectivity::Four => 4,
            Connectivity::Eight => 8,
        }
    }
}

impl TryFrom<u8> for Connectivity {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            4 => Ok(Connectivity::Four),
            8 => Ok(Connectivity::Eight),
            other => Err(Error::InvalidArgument(format!(
                "unsupported connectivity {} (expected 4 or 8)",
                other
            ))),
        }
    }
}

impl FromStr for Connectivity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "4" | "four" => Ok(Connectivity::Four),
            "8" | "eight" => Ok(Connectivity::Eight),
            _ => Err(Error::InvalidArgument(format!(
                "unsupported connectivity '{}' (expected 4 or 8)",
                s
            ))),
        }
    }
}

impl fmt::Display for Connectivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.neighbor_count())
    }
}

/// Options for block detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockOptions {
    /// Adjacency rule (default: eight-way)
    pub connectivity: Connectivity,
    /// Copy each block's bounding-box contents into [`Block::data`]
    pub include_data: bool,
}

impl BlockOptions {
    /// Options that only compute bounding boxes
    pub fn points_only(connectivity: Connectivity) -> Self {
        Self {
            connectivity,
            include_data: false,
        }
    }
}

impl Default for BlockOptions {
    fn default() -> Self {
        Self {
            connectivity: Connectivity::Eight,
            include_data: true,
        }
    }
}

/// A connected component's bounding box, optionally with its contents
///
/// Bounds are inclusive. `data` holds the whole rectangle verbatim, so cells
/// inside the box that belong to no component (or to another component)
/// appear as they are in the grid. Boxes of distinct blocks may overlap.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Block<T = CellValue> {
    /// First row of the bounding box
    pub start_row: usize,
    /// First column of the bounding box
    pub start_col: usize,
    /// Last row of the bounding box
    pub end_row: usize,
    /// Last column of the bounding box
    pub end_col: usize,
    /// Rows of the bounding box, when requested
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub data: Option<Vec<Vec<T>>>,
}

impl<T> Block<T> {
    /// Number of rows spanned by the box
    pub fn row_count(&self) -> usize {
        self.end_row - self.start_row + 1
    }

    /// Number of columns spanned by the box
    pub fn col_count(&self) -> usize {
        self.end_col - self.start_col + 1
    }

    /// Check if a position lies inside the bounding box
    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.start_row..=self.end_row).contains(&row)
            && (self.start_col..=self.end_col).contains(&col)
    }

    /// Drop the data snapshot, keeping only the box
    pub fn without_data(self) -> Self {
        Self { data: None, ..self }
    }

    /// The bounding box as an A1-style range
    pub fn range(&self) -> Result<CellRange> {
        Ok(CellRange::new(
            CellAddress::from_indices(self.start_row, self.start_col)?,
            CellAddress::from_indices(self.end_row, self.end_col)?,
        ))
    }
}

/// The cells of one connected component, in traversal order
///
/// The first cell is the seed: the first cell of the component reached by
/// the row-major scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    cells: Vec<(usize, usize)>,
}

impl Component {
    /// Member cells as `(row, col)`
    pub fn cells(&self) -> &[(usize, usize)] {
        &self.cells
    }

    /// The seed cell
    pub fn seed(&self) -> (usize, usize) {
        self.cells[0]
    }

    /// Number of member cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Components always hold at least their seed
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Inclusive bounding box as `(start_row, start_col, end_row, end_col)`
    pub fn bounds(&self) -> (usize, usize, usize, usize) {
        let (r, c) = self.seed();
        self.cells
            .iter()
            .fold((r, c, r, c), |(r0, c0, r1, c1), &(row, col)| {
                (r0.min(row), c0.min(col), r1.max(row), c1.max(col))
            })
    }

    /// Turn the component into a block, copying contents from `rows` if asked
    pub fn to_block<T: Presence, R: AsRef<[T]>>(
        &self,
        rows: &[R],
        include_data: bool,
    ) -> Block<T> {
        let (start_row, start_col, end_row, end_col) = self.bounds();
        Block {
            start_row,
            start_col,
            end_row,
            end_col,
            data: include_data.then(|| snapshot(rows, start_row, start_col, end_row, end_col)),
        }
    }
}

/// Finds blocks of connected populated cells
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockFinder {
    options: BlockOptions,
}

impl BlockFinder {
    /// Create a finder with the given options
    pub fn new(options: BlockOptions) -> Self {
        Self { options }
    }

    /// The options in use
    pub fn options(&self) -> &BlockOptions {
        &self.options
    }

    /// Partition all populated cells into connected components
    ///
    /// Components come out in the order the row-major scan reaches their
    /// seed. Fails with [`Error::EmptyInput`] when `rows` is empty.
    pub fn components<T: Presence, R: AsRef<[T]>>(
        &self,
        rows: &[R],
    ) -> Result<Vec<Component>> {
        let first = rows.first().ok_or(Error::EmptyInput)?;
        let height = rows.len();
        let width = first.as_ref().len();

        let area = height.checked_mul(width).ok_or_else(|| {
            Error::invalid_argument(format!("grid of {}x{} is too large", height, width))
        })?;
        let mut visited = vec![false; area];
        let mut stack = Vec::new();
        let mut components = Vec::new();
        let neighbors = self.options.connectivity.neighbors();

        let present = |row: usize, col: usize| {
            rows.get(row)
                .and_then(|r| r.as_ref().get(col))
                .map_or(false, Presence::is_present)
        };

        for row in 0..height {
            for col in 0..width {
                let idx = row * width + col;
                if visited[idx] || !present(row, col) {
                    continue;
                }

                visited[idx] = true;
                stack.push((row, col));
                let mut cells = Vec::new();

                while let Some((r, c)) = stack.pop() {
                    cells.push((r, c));

                    for &(dr, dc) in neighbors {
                        let (Some(nr), Some(nc)) =
                            (r.checked_add_signed(dr), c.checked_add_signed(dc))
                        else {
                            continue;
                        };
                        if nr >= height || nc >= width {
                            continue;
                        }
                        let nidx = nr * width + nc;
                        if !visited[nidx] && present(nr, nc) {
                            visited[nidx] = true;
                            stack.push((nr, nc));
                        }
                    }
                }

                components.push(Component { cells });
            }
        }

        Ok(components)
    }

    /// Find all blocks in `rows`
    pub fn find<T: Presence, R: AsRef<[T]>>(&self, rows: &[R]) -> Result<Vec<Block<T>>> {
        let components = self.components(rows)?;
        let blocks: Vec<Block<T>> = components
            .iter()
            .map(|component| component.to_block(rows, self.options.include_data))
            .collect();

        log::debug!(
            "found {} block(s) in {} row(s) with {}-connectivity",
            blocks.len(),
            rows.len(),
            self.options.connectivity
        );
        Ok(blocks)
    }
}

/// Find all blocks of connected populated cells in `rows`
///
/// Shorthand for [`BlockFinder::find`].
pub fn find_blocks<T: Presence, R: AsRef<[T]>>(
    rows: &[R],
    connectivity: Connectivity,
    include_data: bool,
) -> Result<Vec<Block<T>>> {
    BlockFinder::new(BlockOptions {
        connectivity,
        include_data,
    })
    .find(rows)
}

/// Copy an inclusive rectangle out of `rows`, padding short rows with the absent value
pub(crate) fn snapshot<T: Presence, R: AsRef<[T]>>(
    rows: &[R],
    start_row: usize,
    start_col: usize,
    end_row: usize,
    end_col: usize,
) -> Vec<Vec<T>> {
    (start_row..=end_row)
        .map(|row| {
            let cells = rows.get(row).map_or(&[][..], AsRef::as_ref);
            (start_col..=end_col)
                .map(|col| cells.get(col).cloned().unwrap_or_else(T::absent))
                .collect()
        })
        .collect()
}
