//! XLSX reader

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use sheetblocks_core::{CellAddress, CellError, CellRange, CellValue, Workbook, Worksheet};

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// Excel writes control characters this way, e.g. `_x000d_` for CR and
/// `_x005f_` for a literal underscore. Anything that is not a complete
/// sequence is copied through unchanged.
fn decode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos..];

        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);

        match decoded {
            Some(c) => {
                result.push(c);
                rest = &candidate[7..];
            }
            None => {
                result.push_str("_x");
                rest = &candidate[2..];
            }
        }
    }

    result.push_str(rest);
    result
}

/// Read the value of an attribute as an owned string
fn attr_value(e: &BytesStart, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

/// Which text node is being collected inside a `<c>` element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Capture {
    None,
    Value,
    Formula,
    InlineText,
}

/// A `<c>` element being read
#[derive(Debug)]
struct PendingCell {
    addr: CellAddress,
    kind: Option<String>,
    value: Option<String>,
    formula: Option<String>,
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let path = path.as_ref();
        log::debug!("reading xlsx '{}'", path.display());
        let file = File::open(path)?;
        Self::read(BufReader::new(file))
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut archive = zip::ZipArchive::new(reader)?;

        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat("Missing [Content_Types].xml".into()));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let sheet_info = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut workbook = Workbook::new();
        for (name, r_id) in &sheet_info {
            let Some(path) = sheet_paths.get(r_id) else {
                log::warn!(
                    "sheet '{}' has no worksheet relationship {}; skipped",
                    name,
                    r_id
                );
                continue;
            };
            let mut worksheet = Worksheet::new(name.as_str());
            Self::read_worksheet(&mut archive, path, &mut worksheet, &shared_strings)?;
            log::debug!(
                "sheet '{}': {} cell(s), {} merged region(s)",
                name,
                worksheet.cell_count(),
                worksheet.merged_regions().len()
            );
            workbook.add_existing_worksheet(worksheet)?;
        }

        Ok(workbook)
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        let mut buf = Vec::new();
        let mut current = String::new();
        let mut in_t = false;
        // Phonetic runs (<rPh>) repeat the text as a reading guide
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"si" => current.clear(),
                    b"rPh" => in_phonetic = true,
                    b"t" if !in_phonetic => in_t = true,
                    _ => {}
                },
                Event::Empty(e) if e.name().as_ref() == b"si" => strings.push(String::new()),
                Event::End(e) => match e.name().as_ref() {
                    b"si" => strings.push(decode_excel_escapes(&current)),
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Event::Text(e) if in_t => current.push_str(&e.unescape()?),
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Read workbook.xml to get sheet names and relationship ids
    fn read_workbook_xml<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<Vec<(String, String)>> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        let mut buf = Vec::new();
        let mut sheets = Vec::new();

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) if e.name().as_ref() == b"sheet" => {
                    match (attr_value(&e, b"name"), attr_value(&e, b"r:id")) {
                        (Some(name), Some(r_id)) => sheets.push((name, r_id)),
                        _ => log::warn!("<sheet> without name or r:id ignored"),
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(sheets)
    }

    /// Read workbook.xml.rels to map relationship ids to worksheet paths
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Empty(e) | Event::Start(e) if e.name().as_ref() == b"Relationship" => {
                    let id = attr_value(&e, b"Id");
                    let target = attr_value(&e, b"Target");
                    let rel_type = attr_value(&e, b"Type");

                    if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                        if rel_type.ends_with("/worksheet") {
                            // Targets are relative to xl/ unless absolute
                            let full_path = match target.strip_prefix('/') {
                                Some(absolute) => absolute.to_string(),
                                None => format!("xl/{}", target),
                            };
                            rels.insert(id, full_path);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Read cell values and merged regions of one worksheet part
    fn read_worksheet<R: Read + Seek>(
        archive: &mut zip::ZipArchive<R>,
        path: &str,
        worksheet: &mut Worksheet,
        shared_strings: &[String],
    ) -> XlsxResult<()> {
        let file = archive
            .by_name(path)
            .map_err(|_| XlsxError::MissingPart(path.to_string()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        let mut buf = Vec::new();

        // Cells may omit their `r` attribute; positions then follow document order
        let mut row_cursor: u32 = 0;
        let mut col_cursor: u16 = 0;
        let mut pending: Option<PendingCell> = None;
        let mut capture = Capture::None;
        let mut in_inline_str = false;

        loop {
            match xml_reader.read_event_into(&mut buf)? {
                Event::Start(e) => match e.name().as_ref() {
                    b"row" => {
                        if let Some(r) = attr_value(&e, b"r").and_then(|s| s.parse::<u32>().ok()) {
                            row_cursor = r.saturating_sub(1);
                        }
                        col_cursor = 0;
                    }
                    b"c" => {
                        let addr = Self::cell_position(&e, row_cursor, col_cursor)?;
                        col_cursor = addr.col.saturating_add(1);
                        pending = Some(PendingCell {
                            addr,
                            kind: attr_value(&e, b"t"),
                            value: None,
                            formula: None,
                        });
                    }
                    b"v" if pending.is_some() => capture = Capture::Value,
                    b"f" if pending.is_some() => capture = Capture::Formula,
                    b"is" if pending.is_some() => in_inline_str = true,
                    b"t" if in_inline_str => capture = Capture::InlineText,
                    _ => {}
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"row" => {
                        if let Some(r) = attr_value(&e, b"r").and_then(|s| s.parse::<u32>().ok()) {
                            row_cursor = r;
                        } else {
                            row_cursor += 1;
                        }
                    }
                    b"c" => {
                        let addr = Self::cell_position(&e, row_cursor, col_cursor)?;
                        col_cursor = addr.col.saturating_add(1);
                    }
                    b"mergeCell" => {
                        if let Some(reference) = attr_value(&e, b"ref") {
                            let merged = CellRange::parse(&reference)
                                .and_then(|range| worksheet.merge_cells(&range));
                            if let Err(err) = merged {
                                log::warn!(
                                    "ignoring merged region '{}' in {}: {}",
                                    reference,
                                    path,
                                    err
                                );
                            }
                        }
                    }
                    _ => {}
                },
                Event::End(e) => match e.name().as_ref() {
                    b"row" => row_cursor += 1,
                    b"c" => {
                        if let Some(cell) = pending.take() {
                            let value = Self::cell_value(&cell, shared_strings)?;
                            worksheet.set_cell_value_at(cell.addr.row, cell.addr.col, value)?;
                        }
                        capture = Capture::None;
                        in_inline_str = false;
                    }
                    b"v" | b"f" | b"t" => capture = Capture::None,
                    b"is" => in_inline_str = false,
                    _ => {}
                },
                Event::Text(e) if capture != Capture::None => {
                    let text = e.unescape()?;
                    if let Some(cell) = pending.as_mut() {
                        let slot = match capture {
                            Capture::Formula => &mut cell.formula,
                            _ => &mut cell.value,
                        };
                        slot.get_or_insert_with(String::new).push_str(&text);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    /// Position of a `<c>` element: its `r` attribute, or the running cursor
    fn cell_position(e: &BytesStart, row: u32, col: u16) -> XlsxResult<CellAddress> {
        match attr_value(e, b"r") {
            Some(reference) => CellAddress::parse(&reference).map_err(|err| {
                XlsxError::Parse(format!("Invalid cell reference '{}': {}", reference, err))
            }),
            None => Ok(CellAddress::new(row, col)),
        }
    }

    /// Convert a cell's raw type, value and formula into a [`CellValue`]
    fn cell_value(cell: &PendingCell, shared_strings: &[String]) -> XlsxResult<CellValue> {
        let value = match cell.value.as_deref() {
            None => CellValue::Empty,
            Some(raw) => match cell.kind.as_deref() {
                Some("s") => {
                    let idx: usize = raw.trim().parse().map_err(|_| {
                        XlsxError::Parse(format!("Invalid shared string index: {}", raw))
                    })?;
                    let s = shared_strings.get(idx).ok_or_else(|| {
                        XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
                    })?;
                    CellValue::string(s.as_str())
                }
                Some("b") => CellValue::Boolean(raw == "1" || raw.eq_ignore_ascii_case("true")),
                Some("e") => CellError::parse(raw)
                    .map(CellValue::Error)
                    .unwrap_or_else(|| CellValue::string(raw)),
                Some("str") | Some("inlineStr") => CellValue::string(decode_excel_escapes(raw)),
                None | Some("n") => match raw.trim().parse::<f64>() {
                    Ok(n) => CellValue::Number(n),
                    Err(_) => CellValue::string(raw),
                },
                // ISO 8601 dates ("d") and unknown types keep their text
                Some(_) => CellValue::string(raw),
            },
        };

        Ok(match cell.formula.as_deref() {
            Some(text) if !text.is_empty() => CellValue::Formula {
                text: if text.starts_with('=') {
                    text.to_string()
                } else {
                    format!("={}", text)
                },
                cached_value: (!value.is_empty()).then(|| Box::new(value)),
            },
            _ => value,
        })
    }
}
