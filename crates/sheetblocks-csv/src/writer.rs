//! CSV writer

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::CsvResult;
use crate::options::CsvWriteOptions;
use sheetblocks_core::CellValue;

/// CSV file writer
pub struct CsvWriter;

impl CsvWriter {
    /// Write rows of cells to a CSV file
    pub fn write_file<P, R>(rows: &[R], path: P, options: &CsvWriteOptions) -> CsvResult<()>
    where
        P: AsRef<Path>,
        R: AsRef<[CellValue]>,
    {
        let file = File::create(path)?;
        Self::write(rows, file, options)
    }

    /// Write rows of cells to a writer
    ///
    /// Accepts a [`Grid`](sheetblocks_core::Grid)'s rows or a block's data
    /// snapshot. Formulas are written as their cached value; empty cells as
    /// empty fields. Short rows produce short records.
    pub fn write<W, R>(rows: &[R], writer: W, options: &CsvWriteOptions) -> CsvResult<()>
    where
        W: Write,
        R: AsRef<[CellValue]>,
    {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .terminator(options.line_terminator.to_csv())
            .flexible(true)
            .from_writer(writer);

        for row in rows {
            let record: Vec<String> = row
                .as_ref()
                .iter()
                .map(|value| value.effective_value().to_string())
                .collect();
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::LineTerminator;
    use crate::{CsvReadOptions, CsvReader};
    use pretty_assertions::assert_eq;
    use sheetblocks_core::Grid;

    fn write_to_string<R: AsRef<[CellValue]>>(rows: &[R], options: &CsvWriteOptions) -> String {
        let mut out = Vec::new();
        CsvWriter::write(rows, &mut out, options).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_write_grid() {
        let grid = Grid::new(vec![
            vec![CellValue::from("Name"), CellValue::from("Qty")],
            vec![CellValue::from("a, b"), CellValue::Number(3.0)],
            vec![CellValue::Empty, CellValue::Boolean(true)],
        ]);

        let csv = write_to_string(grid.rows(), &CsvWriteOptions::default());
        assert_eq!(csv, "Name,Qty\n\"a, b\",3\n,TRUE\n");
    }

    #[test]
    fn test_formula_writes_cached_value() {
        let mut formula = CellValue::formula("=A1*2");
        if let CellValue::Formula { cached_value, .. } = &mut formula {
            *cached_value = Some(Box::new(CellValue::Number(8.0)));
        }
        let rows = vec![vec![CellValue::Number(4.0), formula]];

        let options = CsvWriteOptions {
            delimiter: b'\t',
            line_terminator: LineTerminator::CRLF,
            ..CsvWriteOptions::default()
        };
        assert_eq!(write_to_string(&rows, &options), "4\t8\r\n");
    }

    #[test]
    fn test_write_file_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("block.csv");
        let rows = vec![
            vec![CellValue::from("x"), CellValue::Number(1.5)],
            vec![CellValue::Empty, CellValue::from("y")],
        ];

        CsvWriter::write_file(&rows, &path, &CsvWriteOptions::default()).unwrap();
        let sheet = CsvReader::read_file(&path, &CsvReadOptions::default()).unwrap();

        assert_eq!(sheet.to_grid().into_rows(), rows);
    }
}
