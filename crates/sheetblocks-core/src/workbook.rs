//! Workbook type and sheet selection

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

/// A workbook: an ordered list of uniquely named worksheets
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    worksheets: Vec<Worksheet>,
}

impl Workbook {
    /// Create a workbook with no worksheets
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of worksheets
    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    /// Get a worksheet by index
    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    /// Get a worksheet by exact name
    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.worksheets.iter().find(|ws| ws.name() == name)
    }

    /// Get the index of a worksheet by exact name
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.worksheets.iter().position(|ws| ws.name() == name)
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.worksheets.iter().map(Worksheet::name).collect()
    }

    /// Iterate over all worksheets
    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    /// Resolve a sheet reference to its index
    pub fn resolve(&self, sheet: &SheetRef) -> Result<usize> {
        match sheet {
            SheetRef::Index(index) if *index < self.worksheets.len() => Ok(*index),
            SheetRef::Index(index) => Err(Error::SheetOutOfBounds(*index, self.worksheets.len())),
            SheetRef::Name(name) => self
                .sheet_index(name)
                .ok_or_else(|| Error::SheetNotFound(name.clone())),
        }
    }

    /// Look up a worksheet by reference
    pub fn get(&self, sheet: &SheetRef) -> Result<&Worksheet> {
        let index = self.resolve(sheet)?;
        Ok(&self.worksheets[index])
    }

    /// Add a new, empty worksheet with the given name
    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<usize> {
        self.add_existing_worksheet(Worksheet::new(name))
    }

    /// Add an existing worksheet to the workbook
    pub fn add_existing_worksheet(&mut self, worksheet: Worksheet) -> Result<usize> {
        self.validate_sheet_name(worksheet.name())?;
        let index = self.worksheets.len();
        self.worksheets.push(worksheet);
        Ok(index)
    }

    /// Validate a sheet name against Excel's rules and existing sheets
    fn validate_sheet_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidSheetName("Sheet name cannot be empty".into()));
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name too long (max {} characters)",
                MAX_SHEET_NAME_LEN
            )));
        }

        const INVALID_CHARS: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];
        if let Some(c) = name.chars().find(|c| INVALID_CHARS.contains(c)) {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name cannot contain '{}'",
                c
            )));
        }

        // Excel compares sheet names case-insensitively
        let name_lower = name.to_lowercase();
        if self
            .worksheets
            .iter()
            .any(|ws| ws.name().to_lowercase() == name_lower)
        {
            return Err(Error::DuplicateSheetName(name.into()));
        }

        Ok(())
    }
}

/// Which sheet an operation reads
///
/// Passed explicitly to every accessor; there is no implicit "current sheet".
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SheetRef {
    /// Sheet by exact name
    Name(String),
    /// Sheet by 0-based position
    Index(usize),
}

impl Default for SheetRef {
    fn default() -> Self {
        SheetRef::Index(0)
    }
}

impl fmt::Display for SheetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetRef::Name(name) => write!(f, "'{}'", name),
            SheetRef::Index(index) => write!(f, "#{}", index),
        }
    }
}

impl FromStr for SheetRef {
    type Err = Error;

    /// All-digit input is an index; anything else is a name
    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::InvalidSheetName("Sheet name cannot be empty".into()));
        }
        if s.bytes().all(|b| b.is_ascii_digit()) {
            s.parse()
                .map(SheetRef::Index)
                .map_err(|_| Error::invalid_argument(format!("sheet index '{}' is too large", s)))
        } else {
            Ok(SheetRef::Name(s.to_string()))
        }
    }
}

impl From<usize> for SheetRef {
    fn from(index: usize) -> Self {
        SheetRef::Index(index)
    }
}

impl From<&str> for SheetRef {
    fn from(name: &str) -> Self {
        SheetRef::Name(name.to_string())
    }
}

impl From<String> for SheetRef {
    fn from(name: String) -> Self {
        SheetRef::Name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workbook() -> Workbook {
        let mut wb = Workbook::new();
        wb.add_worksheet_with_name("Summary").unwrap();
        wb.add_worksheet_with_name("Data").unwrap();
        wb
    }

    #[test]
    fn test_add_worksheets() {
        let wb = workbook();
        assert_eq!(wb.sheet_count(), 2);
        assert_eq!(wb.sheet_names(), vec!["Summary", "Data"]);
        assert!(wb.worksheet_by_name("Data").is_some());
        assert!(wb.worksheet_by_name("data").is_none());
    }

    #[test]
    fn test_duplicate_name() {
        let mut wb = workbook();
        assert!(matches!(
            wb.add_worksheet_with_name("DATA"),
            Err(Error::DuplicateSheetName(_))
        ));
    }

    #[test]
    fn test_invalid_sheet_name() {
        let mut wb = Workbook::new();
        assert!(wb.add_worksheet_with_name("").is_err());
        assert!(wb.add_worksheet_with_name("Sheet/1").is_err());
        assert!(wb.add_worksheet_with_name("Sheet[1]").is_err());
        let long_name = "A".repeat(MAX_SHEET_NAME_LEN + 1);
        assert!(wb.add_worksheet_with_name(&long_name).is_err());
    }

    #[test]
    fn test_resolve_sheet_ref() {
        let wb = workbook();
        assert_eq!(wb.resolve(&SheetRef::from("Data")).unwrap(), 1);
        assert_eq!(wb.resolve(&SheetRef::Index(0)).unwrap(), 0);
        assert!(matches!(
            wb.resolve(&SheetRef::from("Missing")),
            Err(Error::SheetNotFound(name)) if name == "Missing"
        ));
        assert!(matches!(
            wb.resolve(&SheetRef::Index(2)),
            Err(Error::SheetOutOfBounds(2, 2))
        ));
        assert_eq!(wb.get(&SheetRef::Index(1)).unwrap().name(), "Data");
    }

    #[test]
    fn test_parse_sheet_ref() {
        assert_eq!("3".parse::<SheetRef>().unwrap(), SheetRef::Index(3));
        assert_eq!(
            "Sheet 3".parse::<SheetRef>().unwrap(),
            SheetRef::Name("Sheet 3".into())
        );
        assert!("".parse::<SheetRef>().is_err());
    }
}
