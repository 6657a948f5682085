//! Read access to one sheet of a workbook
//!
//! A [`SheetView`] pairs a worksheet with an optional merged-cell policy.
//! Every accessor goes through the same policy, so `cell`, `row`, `column`
//! and `blocks` always agree on what the sheet contains.
//!
//! Sheets are stored sparsely but read densely from A1, so one stray cell
//! far down a sheet can demand a huge grid. The view refuses to build a grid
//! larger than its cell limit ([`DEFAULT_MAX_CELLS`] unless changed).

use sheetblocks_core::{
    find_blocks, Block, BlockOptions, CellAddress, CellValue, Connectivity, Error, Grid,
    GridTransform, MergedCellFill, Result, SheetRef, Workbook, Worksheet,
};

/// Largest dense grid a [`SheetView`] builds by default, in cells
pub const DEFAULT_MAX_CELLS: usize = 10_000_000;

/// One resolved sheet, with an optional merged-cell policy
#[derive(Debug, Clone)]
pub struct SheetView<'a> {
    worksheet: &'a Worksheet,
    merge: Option<MergedCellFill>,
    max_cells: usize,
}

impl<'a> SheetView<'a> {
    /// Resolve `sheet` in `workbook`
    pub fn new(workbook: &'a Workbook, sheet: &SheetRef) -> Result<Self> {
        let worksheet = workbook.get(sheet)?;
        Ok(Self::from_worksheet(worksheet))
    }

    /// View a worksheet directly
    pub fn from_worksheet(worksheet: &'a Worksheet) -> Self {
        Self {
            worksheet,
            merge: None,
            max_cells: DEFAULT_MAX_CELLS,
        }
    }

    /// Fill the sheet's own merged regions, optionally marking leftovers with `dummy`
    pub fn with_merged_cells(self, dummy: Option<CellValue>) -> Self {
        let mut fill = MergedCellFill::new(self.worksheet.merged_regions().to_vec());
        fill.dummy = dummy;
        self.with_merge_policy(fill)
    }

    /// Use an explicit merged-cell policy
    pub fn with_merge_policy(mut self, fill: MergedCellFill) -> Self {
        self.merge = Some(fill);
        self
    }

    /// Limit the size of the dense grid, in cells
    pub fn with_max_cells(mut self, max_cells: usize) -> Self {
        self.max_cells = max_cells;
        self
    }

    /// Sheet name
    pub fn name(&self) -> &'a str {
        self.worksheet.name()
    }

    /// Shape of the dense grid: the used area from A1, widened to cover
    /// merged regions when a merge policy is set
    fn grid_shape(&self) -> (usize, usize) {
        let used = self.worksheet.dimensions();
        match &self.merge {
            None => used,
            Some(fill) => fill.regions.iter().fold(used, |(rows, cols), region| {
                let (end_row, end_col) = region.end.indices();
                (rows.max(end_row + 1), cols.max(end_col + 1))
            }),
        }
    }

    /// Dense grid of the sheet anchored at A1
    ///
    /// With a merge policy, the grid also covers every merged region, so a
    /// region reaching past the last populated cell is filled in full.
    /// Fails with [`Error::InvalidArgument`] when the grid would exceed the
    /// cell limit.
    pub fn grid(&self) -> Result<Grid> {
        let (rows, cols) = self.grid_shape();
        let cells = rows.saturating_mul(cols);
        if cells > self.max_cells {
            return Err(Error::invalid_argument(format!(
                "sheet '{}' spans {} rows x {} columns ({} cells), over the limit of {} cells",
                self.name(),
                rows,
                cols,
                cells,
                self.max_cells
            )));
        }

        let grid = self.worksheet.to_grid_sized(rows, cols);
        Ok(match &self.merge {
            Some(fill) => fill.apply(grid),
            None => grid,
        })
    }

    /// Value of one cell by A1 reference
    pub fn cell(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        if self.merge.is_none() {
            return Ok(self.worksheet.get_value_at(addr.row, addr.col));
        }
        let (row, col) = addr.indices();
        Ok(self.grid()?.value(row, col))
    }

    /// Values of row `n` (1-based) across the sheet's width
    ///
    /// Rows below the last populated row come back as empty cells.
    pub fn row(&self, n: usize) -> Result<Vec<CellValue>> {
        let index = one_based(n, "row")?;
        let grid = self.grid()?;
        Ok(match grid.row(index) {
            Some(row) => row.to_vec(),
            None => vec![CellValue::Empty; grid.col_count()],
        })
    }

    /// Values of column `n` (1-based) down the sheet's height
    pub fn column(&self, n: usize) -> Result<Vec<CellValue>> {
        let index = one_based(n, "column")?;
        Ok(self.grid()?.column(index))
    }

    /// Blocks of connected populated cells
    ///
    /// An empty sheet is [`Error::EmptyInput`]; a sheet whose cells are all
    /// empty yields no blocks.
    pub fn blocks(&self, options: BlockOptions) -> Result<Vec<Block>> {
        let grid = self.grid()?;
        let blocks = find_blocks(grid.rows(), options.connectivity, options.include_data)?;
        log::debug!(
            "sheet '{}': {} block(s) with {}-connectivity",
            self.name(),
            blocks.len(),
            options.connectivity
        );
        Ok(blocks)
    }

    /// Bounding boxes only
    pub fn block_points(&self, connectivity: Connectivity) -> Result<Vec<Block>> {
        self.blocks(BlockOptions::points_only(connectivity))
    }
}

fn one_based(n: usize, what: &str) -> Result<usize> {
    n.checked_sub(1)
        .ok_or_else(|| Error::invalid_argument(format!("{} numbers start at 1", what)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sheetblocks_core::CellRange;

    fn workbook() -> Workbook {
        let mut sheet = Worksheet::new("Report");
        sheet.set_cell_value("A1", "Quarterly").unwrap();
        sheet.set_cell_value("A2", "Q1").unwrap();
        sheet.set_cell_value("B2", 10).unwrap();
        sheet.set_cell_value("D2", "note").unwrap();
        sheet.merge_cells(&CellRange::parse("A1:D1").unwrap()).unwrap();

        let mut wb = Workbook::new();
        wb.add_existing_worksheet(sheet).unwrap();
        wb.add_worksheet_with_name("Blank").unwrap();
        wb
    }

    #[test]
    fn test_resolve_by_name_and_index() {
        let wb = workbook();
        assert_eq!(SheetView::new(&wb, &"Blank".into()).unwrap().name(), "Blank");
        assert_eq!(SheetView::new(&wb, &SheetRef::Index(0)).unwrap().name(), "Report");
        assert!(matches!(
            SheetView::new(&wb, &"Nope".into()),
            Err(Error::SheetNotFound(_))
        ));
        assert!(matches!(
            SheetView::new(&wb, &SheetRef::Index(9)),
            Err(Error::SheetOutOfBounds(9, 2))
        ));
    }

    #[test]
    fn test_raw_accessors() {
        let wb = workbook();
        let view = SheetView::new(&wb, &SheetRef::default()).unwrap();

        assert!(view.cell("B1").unwrap().is_empty());
        assert_eq!(view.cell("B2").unwrap(), CellValue::Number(10.0));
        assert_eq!(
            view.row(2).unwrap(),
            vec![
                CellValue::from("Q1"),
                CellValue::Number(10.0),
                CellValue::Empty,
                CellValue::from("note"),
            ]
        );
        assert_eq!(view.row(5).unwrap(), vec![CellValue::Empty; 4]);
        assert_eq!(
            view.column(1).unwrap(),
            vec![CellValue::from("Quarterly"), CellValue::from("Q1")]
        );
    }

    #[test]
    fn test_zero_index_is_invalid() {
        let wb = workbook();
        let view = SheetView::new(&wb, &SheetRef::default()).unwrap();
        assert!(matches!(view.row(0), Err(Error::InvalidArgument(_))));
        assert!(matches!(view.column(0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_merged_cells_join_blocks() {
        let wb = workbook();
        let raw = SheetView::new(&wb, &SheetRef::default()).unwrap();
        let raw_blocks = raw.block_points(Connectivity::Four).unwrap();
        assert_eq!(raw_blocks.len(), 2);

        let merged = raw.clone().with_merged_cells(None);
        assert_eq!(merged.cell("C1").unwrap().as_string(), Some("Quarterly"));

        let blocks = merged.block_points(Connectivity::Four).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].range().unwrap().to_string(), "A1:D2");
    }

    #[test]
    fn test_merged_region_past_used_range() {
        let mut sheet = Worksheet::new("S");
        sheet.set_cell_value("A1", "x").unwrap();
        sheet.merge_cells(&CellRange::parse("A1:C2").unwrap()).unwrap();

        let view = SheetView::from_worksheet(&sheet).with_merged_cells(None);
        let grid = view.grid().unwrap();
        assert_eq!((grid.row_count(), grid.col_count()), (2, 3));
        assert_eq!(view.cell("C2").unwrap().as_string(), Some("x"));
    }

    #[test]
    fn test_dummy_marks_empty_anchor_regions() {
        let mut sheet = Worksheet::new("S");
        sheet.set_cell_value("C1", 1).unwrap();
        sheet.merge_cells(&CellRange::parse("A1:B1").unwrap()).unwrap();

        let view = SheetView::from_worksheet(&sheet)
            .with_merged_cells(Some(CellValue::from("<merged>")));
        assert!(view.cell("A1").unwrap().is_empty());
        assert_eq!(view.cell("B1").unwrap().as_string(), Some("<merged>"));

        let blocks = view.blocks(BlockOptions::default()).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].range().unwrap().to_string(), "B1:C1");
    }

    #[test]
    fn test_empty_sheet_is_an_error() {
        let wb = workbook();
        let view = SheetView::new(&wb, &"Blank".into()).unwrap();
        assert!(matches!(
            view.blocks(BlockOptions::default()),
            Err(Error::EmptyInput)
        ));
    }

    #[test]
    fn test_blocks_with_data() {
        let wb = workbook();
        let view = SheetView::new(&wb, &SheetRef::default()).unwrap();
        let blocks = view.blocks(BlockOptions::default()).unwrap();

        assert_eq!(blocks.len(), 2);
        assert_eq!(
            blocks[0].data,
            Some(vec![
                vec![CellValue::from("Quarterly"), CellValue::Empty],
                vec![CellValue::from("Q1"), CellValue::Number(10.0)],
            ])
        );
        assert_eq!(blocks[1].range().unwrap().to_string(), "D2");
    }

    #[test]
    fn test_far_cell_exceeds_cell_limit() {
        let mut sheet = Worksheet::new("Sparse");
        sheet.set_cell_value("A1", 1).unwrap();
        sheet.set_cell_value("XFD1048576", 2).unwrap();
        assert_eq!(sheet.dimensions(), (1_048_576, 16_384));

        let view = SheetView::from_worksheet(&sheet);
        let err = view.block_points(Connectivity::Eight).unwrap_err();
        match err {
            Error::InvalidArgument(msg) => {
                assert!(msg.contains("1048576 rows x 16384 columns"), "{}", msg)
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(matches!(view.row(1), Err(Error::InvalidArgument(_))));
        // Reading one cell without a merge policy needs no grid
        assert_eq!(view.cell("XFD1048576").unwrap(), CellValue::Number(2.0));
    }

    #[test]
    fn test_cell_limit_is_inclusive() {
        let mut sheet = Worksheet::new("S");
        sheet.set_cell_value("C2", 1).unwrap();

        let view = SheetView::from_worksheet(&sheet).with_max_cells(6);
        assert_eq!(view.block_points(Connectivity::Four).unwrap().len(), 1);

        let view = view.with_max_cells(5);
        assert!(matches!(
            view.block_points(Connectivity::Four),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_merged_regions_count_toward_cell_limit() {
        let mut sheet = Worksheet::new("S");
        sheet.set_cell_value("A1", "x").unwrap();
        sheet.merge_cells(&CellRange::parse("A1:J10").unwrap()).unwrap();

        let raw = SheetView::from_worksheet(&sheet).with_max_cells(50);
        assert!(raw.grid().is_ok());
        assert!(matches!(
            raw.with_merged_cells(None).grid(),
            Err(Error::InvalidArgument(_))
        ));
    }
}
