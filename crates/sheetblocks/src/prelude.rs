//! Prelude module - common imports for sheetblocks users
//!
//! ```rust
//! use sheetblocks::prelude::*;
//! ```

pub use crate::{
    // Block detection
    find_blocks,
    Block,
    BlockFinder,
    BlockOptions,
    // Cell types
    CellAddress,
    CellRange,
    CellValue,
    Connectivity,

    CsvReadOptions,
    CsvReader,
    CsvWriteOptions,
    CsvWriter,

    // Error types
    Error,
    GridTransform,
    Grid,
    MergedCellFill,
    Result,

    // Main types
    SheetRef,
    SheetView,
    Workbook,
    // Extension traits
    WorkbookExt,
    Worksheet,

    // I/O types
    XlsxReader,
};
