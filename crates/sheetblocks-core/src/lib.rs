//! # sheetblocks-core
//!
//! Core data structures and block detection for sheetblocks.
//!
//! This crate provides:
//! - [`CellValue`] - Cell values; [`CellValue::Empty`] marks an absent cell
//! - [`CellAddress`] and [`CellRange`] - A1-style addressing
//! - [`Grid`] - A dense, row-major sheet snapshot
//! - [`BlockFinder`] / [`find_blocks`] - Connected blocks of populated cells
//! - [`MergedCellFill`] - Merged-region substitution applied before detection
//! - [`Workbook`], [`Worksheet`] - The loaded document
//!
//! ## Example
//!
//! ```rust
//! use sheetblocks_core::{BlockFinder, BlockOptions, Connectivity, Worksheet};
//!
//! let mut sheet = Worksheet::new("Sheet1");
//! sheet.set_cell_value("A1", "Name").unwrap();
//! sheet.set_cell_value("B1", "Qty").unwrap();
//! sheet.set_cell_value("A2", "Bolts").unwrap();
//! sheet.set_cell_value("B2", 40).unwrap();
//! sheet.set_cell_value("E5", "notes").unwrap();
//!
//! let grid = sheet.to_grid();
//! let finder = BlockFinder::new(BlockOptions {
//!     connectivity: Connectivity::Four,
//!     include_data: true,
//! });
//! let blocks = finder.find(grid.rows()).unwrap();
//!
//! assert_eq!(blocks.len(), 2);
//! assert_eq!(blocks[0].range().unwrap().to_string(), "A1:B2");
//! assert_eq!(blocks[1].range().unwrap().to_string(), "E5");
//! ```

pub mod block;
pub mod cell;
pub mod error;
pub mod grid;
pub mod transform;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use block::{find_blocks, Block, BlockFinder, BlockOptions, Component, Connectivity};
pub use cell::{CellAddress, CellError, CellRange, CellValue, SharedString};
pub use error::{Error, Result};
pub use grid::{Grid, Presence};
pub use transform::{GridTransform, MergedCellFill};
pub use workbook::{SheetRef, Workbook};
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
