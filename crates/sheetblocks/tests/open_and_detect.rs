//! End-to-end tests: write a file to disk, open it, detect blocks

use std::fs;
use std::io::Write;

use pretty_assertions::assert_eq;
use sheetblocks::prelude::*;

fn block_ranges(blocks: &[Block]) -> Vec<String> {
    blocks
        .iter()
        .map(|b| b.range().unwrap().to_string())
        .collect()
}

/// Write a single-sheet XLSX package whose sheet XML body is `body`
fn write_xlsx(path: &std::path::Path, sheet_name: &str, body: &str) {
    let file = fs::File::create(path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
        .unwrap();

    zip.start_file("xl/workbook.xml", options).unwrap();
    zip.write_all(
        format!(
            r#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
            sheet_name
        )
        .as_bytes(),
    )
    .unwrap();

    zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
    zip.write_all(br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/sheet1.xml"/></Relationships>"#)
        .unwrap();

    zip.start_file("xl/worksheets/sheet1.xml", options).unwrap();
    zip.write_all(
        format!(
            r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">{}</worksheet>"#,
            body
        )
        .as_bytes(),
    )
    .unwrap();

    zip.finish().unwrap();
}

#[test]
fn test_csv_blocks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("two_tables.csv");
    fs::write(
        &path,
        "name,qty,,,\nbolts,40,,,\n,,,,\n,,,city,pop\n,,,Oslo,700000\n",
    )
    .unwrap();

    let workbook = Workbook::open(&path).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Sheet1"]);

    let view = SheetView::new(&workbook, &SheetRef::default()).unwrap();
    let blocks = view.blocks(BlockOptions::default()).unwrap();
    assert_eq!(block_ranges(&blocks), vec!["A1:B2", "D4:E5"]);

    let data = blocks[1].data.as_ref().unwrap();
    assert_eq!(data[1][1], CellValue::Number(700000.0));
}

#[test]
fn test_csv_diagonal_connectivity() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("diagonal.csv");
    fs::write(&path, "1,\n,1\n").unwrap();

    let workbook = Workbook::open(&path).unwrap();
    let view = SheetView::new(&workbook, &SheetRef::Index(0)).unwrap();

    let eight = view.block_points(Connectivity::Eight).unwrap();
    assert_eq!(block_ranges(&eight), vec!["A1:B2"]);
    assert!(eight[0].data.is_none());

    let four = view.block_points(Connectivity::Four).unwrap();
    assert_eq!(block_ranges(&four), vec!["A1", "B2"]);
}

#[test]
fn test_csv_with_options() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("semicolons.txt");
    fs::write(&path, "a;b\n1;2\n").unwrap();

    let options = CsvReadOptions {
        delimiter: b';',
        sheet_name: "Imported".into(),
        ..CsvReadOptions::default()
    };
    let workbook = Workbook::open_csv(&path, &options).unwrap();
    let view = SheetView::new(&workbook, &"Imported".into()).unwrap();
    assert_eq!(view.cell("B2").unwrap(), CellValue::Number(2.0));
}

#[test]
fn test_xlsx_merged_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.xlsx");
    write_xlsx(
        &path,
        "Report",
        r#"<sheetData>
            <row r="1"><c r="A1" t="inlineStr"><is><t>Sales</t></is></c></row>
            <row r="2"><c r="A2"><v>1</v></c></row>
            <row r="3"><c r="B3"><v>2</v></c></row>
        </sheetData>
        <mergeCells count="1"><mergeCell ref="A1:C1"/></mergeCells>"#,
    );

    let workbook = Workbook::open(&path).unwrap();
    assert_eq!(workbook.sheet_names(), vec!["Report"]);

    let raw = SheetView::new(&workbook, &"Report".into()).unwrap();
    assert_eq!(
        block_ranges(&raw.block_points(Connectivity::Four).unwrap()),
        vec!["A1:A2", "B3"]
    );

    let merged = raw.with_merged_cells(None);
    assert_eq!(
        merged.row(1).unwrap(),
        vec![CellValue::from("Sales"); 3]
    );
    assert_eq!(
        block_ranges(&merged.block_points(Connectivity::Eight).unwrap()),
        vec!["A1:C3"]
    );
}

#[test]
fn test_extracted_block_round_trips_through_csv() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.csv");
    fs::write(&source, ",,\n,x,1\n,y,2\n").unwrap();

    let workbook = Workbook::open(&source).unwrap();
    let view = SheetView::new(&workbook, &SheetRef::default()).unwrap();
    let blocks = view.blocks(BlockOptions::default()).unwrap();
    assert_eq!(block_ranges(&blocks), vec!["B2:C3"]);

    let out = dir.path().join("block.csv");
    let data = blocks[0].data.as_ref().unwrap();
    CsvWriter::write_file(data, &out, &CsvWriteOptions::default()).unwrap();
    assert_eq!(fs::read_to_string(&out).unwrap(), "x,1\ny,2\n");
}

#[test]
fn test_unsupported_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "hello").unwrap();
    assert!(Workbook::open(&path).is_err());
}
