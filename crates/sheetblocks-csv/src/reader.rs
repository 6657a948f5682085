//! CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::options::CsvReadOptions;
use sheetblocks_core::{CellValue, Worksheet, MAX_COLS};

/// CSV file reader
pub struct CsvReader;

impl CsvReader {
    /// Read CSV file into a worksheet
    pub fn read_file<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> CsvResult<Worksheet> {
        let path = path.as_ref();
        log::debug!("reading csv '{}'", path.display());
        let file = File::open(path)?;
        Self::read(file, options)
    }

    /// Read CSV from a reader into a worksheet
    ///
    /// Records may have differing lengths. Empty fields leave the cell empty.
    pub fn read<R: Read>(reader: R, options: &CsvReadOptions) -> CsvResult<Worksheet> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut worksheet = Worksheet::new(options.sheet_name.as_str());

        for (row_idx, result) in csv_reader.records().enumerate() {
            let record = result?;
            if record.len() > MAX_COLS as usize {
                return Err(CsvError::TooManyFields {
                    row: row_idx + 1,
                    fields: record.len(),
                    max: MAX_COLS,
                });
            }
            let row = u32::try_from(row_idx).unwrap_or(u32::MAX);
            let as_text = options.has_header && row_idx == 0;

            for (col, field) in record.iter().enumerate() {
                let value = if options.auto_detect_types && !as_text {
                    Self::detect_type(field)
                } else if field.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::string(field)
                };

                worksheet.set_cell_value_at(row, col as u16, value)?;
            }
        }

        log::debug!(
            "csv sheet '{}': {} cell(s)",
            worksheet.name(),
            worksheet.cell_count()
        );
        Ok(worksheet)
    }

    /// Detect the type of a field value
    fn detect_type(field: &str) -> CellValue {
        let trimmed = field.trim();

        if trimmed.is_empty() {
            return CellValue::Empty;
        }

        if trimmed.eq_ignore_ascii_case("true") {
            return CellValue::Boolean(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return CellValue::Boolean(false);
        }

        // "inf"/"nan" parse as f64 but are text in a spreadsheet
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => CellValue::Number(n),
            _ => CellValue::string(field),
        }
    }
}
