//! # sheetblocks-xlsx
//!
//! XLSX (Office Open XML) reader for sheetblocks.
//!
//! Only what block detection needs is read: sheet names, cell values
//! (with cached formula results) and merged regions. Styles, comments and
//! drawings are skipped.

pub mod error;
pub mod reader;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
