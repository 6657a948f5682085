//! # sheetblocks
//!
//! Find rectangular blocks of connected, populated cells in spreadsheets.
//!
//! A sheet often holds several tables separated by blank rows and columns.
//! This crate loads a workbook (XLSX or CSV), picks a sheet, and reports each
//! group of connected non-empty cells with its bounding box and, optionally,
//! a copy of the data inside it.
//!
//! ## Features
//!
//! - Read XLSX files (values, cached formula results, merged regions)
//! - Read and write CSV files
//! - 4- or 8-way connectivity
//! - Optional filling of merged regions before detection
//!
//! ## Example
//!
//! ```rust
//! use sheetblocks::prelude::*;
//!
//! let mut sheet = Worksheet::new("Sheet1");
//! sheet.set_cell_value("A1", "Region").unwrap();
//! sheet.set_cell_value("A2", "North").unwrap();
//! sheet.set_cell_value("D1", "Total").unwrap();
//!
//! let mut workbook = Workbook::new();
//! workbook.add_existing_worksheet(sheet).unwrap();
//!
//! let view = SheetView::new(&workbook, &SheetRef::Index(0)).unwrap();
//! let blocks = view.block_points(Connectivity::Eight).unwrap();
//!
//! assert_eq!(blocks.len(), 2);
//! assert_eq!(blocks[0].range().unwrap().to_string(), "A1:A2");
//! ```

pub mod prelude;
pub mod view;

pub use view::{SheetView, DEFAULT_MAX_CELLS};

// Re-export core types
pub use sheetblocks_core::{
    find_blocks,
    Block,
    BlockFinder,
    BlockOptions,
    CellAddress,
    CellError,
    CellRange,
    CellValue,
    Component,
    Connectivity,
    // Error types
    Error,
    Grid,
    GridTransform,
    MergedCellFill,
    Presence,
    Result,
    SheetRef,
    SharedString,
    // Main types
    Workbook,
    Worksheet,

    // Constants
    MAX_COLS,
    MAX_ROWS,
    MAX_SHEET_NAME_LEN,
};

// Re-export I/O types
pub use sheetblocks_csv::{
    CsvError, CsvReadOptions, CsvReader, CsvWriteOptions, CsvWriter, LineTerminator,
};
pub use sheetblocks_xlsx::{XlsxError, XlsxReader};

use std::path::Path;

/// Extension trait for Workbook to add file loading
pub trait WorkbookExt: Sized {
    /// Open a workbook from a file, choosing the format by extension
    fn open<P: AsRef<Path>>(path: P) -> Result<Self>;

    /// Open a CSV file as a single-sheet workbook
    fn open_csv<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> Result<Self>;
}

impl WorkbookExt for Workbook {
    fn open<P: AsRef<Path>>(path: P) -> Result<Workbook> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension.as_deref() {
            Some("xlsx") | Some("xlsm") => {
                XlsxReader::read_file(path).map_err(|e| Error::other(e.to_string()))
            }
            Some("csv") => Self::open_csv(path, &CsvReadOptions::default()),
            _ => Err(Error::other(format!(
                "Unsupported file format: {}",
                path.display()
            ))),
        }
    }

    fn open_csv<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> Result<Workbook> {
        let worksheet =
            CsvReader::read_file(path, options).map_err(|e| Error::other(e.to_string()))?;

        let mut workbook = Workbook::new();
        workbook.add_existing_worksheet(worksheet)?;
        Ok(workbook)
    }
}
