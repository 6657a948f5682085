//! sheetblocks CLI - find blocks of data in spreadsheets

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sheetblocks::prelude::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sheetblocks")]
#[command(
    author,
    version,
    about = "Find rectangular blocks of connected data in spreadsheets"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Sheet selection shared by every per-sheet command
#[derive(clap::Args)]
struct SheetArgs {
    /// Input spreadsheet file (xlsx, xlsm, csv)
    input: PathBuf,

    /// Sheet name or 0-based index
    #[arg(short, long, default_value = "0")]
    sheet: SheetRef,

    /// Fill merged regions with their top-left value before reading
    #[arg(short, long)]
    merged: bool,

    /// Marker for merged cells that stay empty (implies --merged)
    #[arg(long)]
    dummy: Option<String>,

    /// Refuse sheets whose grid from A1 would hold more cells than this
    #[arg(long, default_value_t = sheetblocks::DEFAULT_MAX_CELLS)]
    max_cells: usize,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List all sheets in a workbook
    Sheets {
        /// Input spreadsheet file
        input: PathBuf,
    },

    /// Show information about a spreadsheet
    Info {
        /// Input spreadsheet file
        input: PathBuf,
    },

    /// List the blocks of connected cells on a sheet
    Blocks {
        #[command(flatten)]
        sheet: SheetArgs,

        /// Neighbourhood: 4 (edges only) or 8 (edges and corners)
        #[arg(short, long, default_value = "8")]
        connectivity: Connectivity,

        /// Print bounding boxes only
        #[arg(long)]
        no_data: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print one cell
    Cell {
        #[command(flatten)]
        sheet: SheetArgs,

        /// Cell reference, e.g. B7
        address: String,
    },

    /// Print one row (1-based), tab separated
    Row {
        #[command(flatten)]
        sheet: SheetArgs,

        /// Row number
        number: usize,
    },

    /// Print one column (1-based), one value per line
    Column {
        #[command(flatten)]
        sheet: SheetArgs,

        /// Column number
        number: usize,
    },

    /// Write one block's data as CSV
    Extract {
        #[command(flatten)]
        sheet: SheetArgs,

        /// Block index (0-based, in the order `blocks` lists them)
        index: usize,

        /// Neighbourhood: 4 or 8
        #[arg(short, long, default_value = "8")]
        connectivity: Connectivity,

        /// Output CSV file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Field delimiter (default: comma)
        #[arg(short, long, default_value = ",")]
        delimiter: char,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sheets { input } => list_sheets(&input),
        Commands::Info { input } => show_info(&input),
        Commands::Blocks {
            sheet,
            connectivity,
            no_data,
            format,
        } => list_blocks(
            &sheet,
            BlockOptions {
                connectivity,
                include_data: !no_data,
            },
            format,
        ),
        Commands::Cell { sheet, address } => print_cell(&sheet, &address),
        Commands::Row { sheet, number } => print_row(&sheet, number),
        Commands::Column { sheet, number } => print_column(&sheet, number),
        Commands::Extract {
            sheet,
            index,
            connectivity,
            output,
            delimiter,
        } => extract(&sheet, index, connectivity, output.as_deref(), delimiter),
    }
}

fn open(input: &Path) -> Result<Workbook> {
    let workbook =
        Workbook::open(input).with_context(|| format!("Failed to open '{}'", input.display()))?;
    log::info!(
        "loaded {} sheet(s) from '{}'",
        workbook.sheet_count(),
        input.display()
    );
    Ok(workbook)
}

/// Resolve the selected sheet and apply the merge options
fn view<'a>(workbook: &'a Workbook, args: &SheetArgs) -> Result<SheetView<'a>> {
    let view = SheetView::new(workbook, &args.sheet)
        .with_context(|| format!("Cannot select sheet {}", args.sheet))?
        .with_max_cells(args.max_cells);

    Ok(if args.merged || args.dummy.is_some() {
        view.with_merged_cells(args.dummy.as_deref().map(CellValue::from))
    } else {
        view
    })
}

/// Run block detection, reporting an empty sheet separately from other failures
fn detect(view: &SheetView<'_>, options: BlockOptions) -> Result<Vec<Block>> {
    view.blocks(options).map_err(|e| detection_error(view.name(), e))
}

fn detection_error(sheet: &str, err: Error) -> anyhow::Error {
    match err {
        Error::EmptyInput => anyhow::anyhow!("sheet '{}' is empty", sheet),
        e => anyhow::Error::new(e).context("Block detection failed"),
    }
}

/// Text listing of `blocks`: one line per block, data rows indented below
fn render_blocks(blocks: &[Block]) -> Result<String> {
    if blocks.is_empty() {
        return Ok("no blocks found\n".to_string());
    }

    let mut text = String::new();
    for (i, block) in blocks.iter().enumerate() {
        text.push_str(&format!(
            "{}\t{}\t{}x{}\n",
            i,
            block.range()?,
            block.row_count(),
            block.col_count()
        ));
        for row in block.data.iter().flatten() {
            text.push_str(&format!("    {}\n", join_values(row, "\t")));
        }
    }
    Ok(text)
}

fn list_blocks(args: &SheetArgs, options: BlockOptions, format: OutputFormat) -> Result<()> {
    let workbook = open(&args.input)?;
    let view = view(&workbook, args)?;
    let blocks = detect(&view, options)?;

    let mut out = io::stdout().lock();
    match format {
        OutputFormat::Json => {
            let doc = serde_json::json!({
                "sheet": view.name(),
                "connectivity": options.connectivity.neighbor_count(),
                "blocks": blocks,
            });
            serde_json::to_writer_pretty(&mut out, &doc).context("Failed to write JSON")?;
            writeln!(out)?;
        }
        OutputFormat::Text => out.write_all(render_blocks(&blocks)?.as_bytes())?,
    }

    Ok(())
}

fn print_cell(args: &SheetArgs, address: &str) -> Result<()> {
    let workbook = open(&args.input)?;
    let value = view(&workbook, args)?
        .cell(address)
        .with_context(|| format!("Cannot read cell '{}'", address))?;
    println!("{}", value);
    Ok(())
}

fn print_row(args: &SheetArgs, number: usize) -> Result<()> {
    let workbook = open(&args.input)?;
    let values = view(&workbook, args)?.row(number)?;
    println!("{}", join_values(&values, "\t"));
    Ok(())
}

fn print_column(args: &SheetArgs, number: usize) -> Result<()> {
    let workbook = open(&args.input)?;
    let values = view(&workbook, args)?.column(number)?;
    let mut out = io::stdout().lock();
    for value in &values {
        writeln!(out, "{}", value)?;
    }
    Ok(())
}

fn extract(
    args: &SheetArgs,
    index: usize,
    connectivity: Connectivity,
    output: Option<&Path>,
    delimiter: char,
) -> Result<()> {
    if !delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character, got '{}'", delimiter);
    }

    let workbook = open(&args.input)?;
    let view = view(&workbook, args)?;
    let blocks = detect(
        &view,
        BlockOptions {
            connectivity,
            include_data: true,
        },
    )?;

    let Some(block) = blocks.get(index) else {
        bail!(
            "Block {} not found; sheet '{}' has {} block(s)",
            index,
            view.name(),
            blocks.len()
        );
    };
    let data = block.data.as_deref().unwrap_or_default();

    let options = CsvWriteOptions {
        delimiter: delimiter as u8,
        ..CsvWriteOptions::default()
    };

    if let Some(output_path) = output {
        CsvWriter::write_file(data, output_path, &options)
            .with_context(|| format!("Failed to write '{}'", output_path.display()))?;
        eprintln!(
            "Wrote block {} ({}) to '{}'",
            index,
            block.range()?,
            output_path.display()
        );
    } else {
        CsvWriter::write(data, io::stdout().lock(), &options)
            .context("Failed to write to stdout")?;
    }

    Ok(())
}

fn join_values(values: &[CellValue], separator: &str) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}

fn show_info(input: &Path) -> Result<()> {
    let workbook = open(input)?;

    println!("File: {}", input.display());
    println!("Sheets: {}", workbook.sheet_count());

    for (i, sheet) in workbook.worksheets().enumerate() {
        println!();
        println!("  Sheet {}: \"{}\"", i, sheet.name());

        match sheet.used_range() {
            Some(range) => {
                let (rows, cols) = sheet.dimensions();
                println!("    Used range: {} ({} rows x {} columns)", range, rows, cols)
            }
            None => println!("    Used range: empty"),
        }
        println!("    Cells: {}", sheet.cell_count());
        println!("    Merged regions: {}", sheet.merged_regions().len());
    }

    Ok(())
}

fn list_sheets(input: &Path) -> Result<()> {
    let workbook = open(input)?;

    for (i, name) in workbook.sheet_names().into_iter().enumerate() {
        println!("{}\t{}", i, name);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_blocks_args() {
        let cli = Cli::try_parse_from([
            "sheetblocks",
            "blocks",
            "book.xlsx",
            "-s",
            "Data",
            "-c",
            "4",
            "--no-data",
            "-f",
            "json",
        ])
        .unwrap();
        let Commands::Blocks {
            sheet,
            connectivity,
            no_data,
            format,
        } = cli.command
        else {
            panic!("expected blocks command");
        };
        assert_eq!(sheet.sheet, SheetRef::Name("Data".into()));
        assert_eq!(connectivity, Connectivity::Four);
        assert!(no_data);
        assert!(matches!(format, OutputFormat::Json));
    }

    #[test]
    fn test_bad_connectivity_is_rejected() {
        assert!(Cli::try_parse_from(["sheetblocks", "blocks", "book.csv", "-c", "6"]).is_err());
    }

    #[test]
    fn test_sheet_index_default() {
        let cli = Cli::try_parse_from(["sheetblocks", "row", "book.csv", "3"]).unwrap();
        let Commands::Row { sheet, number } = cli.command else {
            panic!("expected row command");
        };
        assert_eq!(sheet.sheet, SheetRef::Index(0));
        assert_eq!(number, 3);
    }

    #[test]
    fn test_max_cells_flag() {
        let cli = Cli::try_parse_from(["sheetblocks", "cell", "book.csv", "A1"]).unwrap();
        let Commands::Cell { sheet, .. } = cli.command else {
            panic!("expected cell command");
        };
        assert_eq!(sheet.max_cells, sheetblocks::DEFAULT_MAX_CELLS);

        let cli = Cli::try_parse_from([
            "sheetblocks",
            "blocks",
            "book.csv",
            "--max-cells",
            "100",
        ])
        .unwrap();
        let Commands::Blocks { sheet, .. } = cli.command else {
            panic!("expected blocks command");
        };
        assert_eq!(sheet.max_cells, 100);
    }

    #[test]
    fn test_empty_sheet_message() {
        let sheet = Worksheet::new("Blank");
        let err = detect(&SheetView::from_worksheet(&sheet), BlockOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "sheet 'Blank' is empty");
    }

    #[test]
    fn test_other_detection_errors_keep_their_cause() {
        let mut sheet = Worksheet::new("Wide");
        sheet.set_cell_value("C3", 1).unwrap();
        let view = SheetView::from_worksheet(&sheet).with_max_cells(4);

        let err = detect(&view, BlockOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "Block detection failed");
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_render_no_blocks() {
        assert_eq!(render_blocks(&[]).unwrap(), "no blocks found\n");

        // An unanchored merged region gives a grid of empty cells and no blocks
        let mut sheet = Worksheet::new("Hollow");
        sheet.merge_cells(&CellRange::parse("A1:B2").unwrap()).unwrap();
        let view = SheetView::from_worksheet(&sheet).with_merged_cells(None);
        let blocks = detect(&view, BlockOptions::default()).unwrap();
        assert_eq!(render_blocks(&blocks).unwrap(), "no blocks found\n");
    }

    #[test]
    fn test_render_blocks_with_data() {
        let mut sheet = Worksheet::new("S");
        sheet.set_cell_value("A1", "id").unwrap();
        sheet.set_cell_value("B1", "qty").unwrap();
        sheet.set_cell_value("A2", 7).unwrap();
        sheet.set_cell_value("D4", "x").unwrap();
        let blocks = detect(&SheetView::from_worksheet(&sheet), BlockOptions::default()).unwrap();

        assert_eq!(
            render_blocks(&blocks).unwrap(),
            "0\tA1:B2\t2x2\n    id\tqty\n    7\t\n1\tD4\t1x1\n    x\n"
        );
    }
}
