//! # sheetblocks-csv
//!
//! CSV reader and writer for sheetblocks.
//!
//! A CSV file loads as a single worksheet; any grid (a whole sheet or one
//! block's data) can be written back out.

mod reader;
mod writer;
mod options;
mod error;

pub use reader::CsvReader;
pub use writer::CsvWriter;
pub use options::{CsvReadOptions, CsvWriteOptions, LineTerminator};
pub use error::{CsvError, CsvResult};
