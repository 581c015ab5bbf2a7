// `romtab`: extract, compare and export calibration tables.

use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::image::RomImage;
use crate::tables::{
    self, DEFAULT_TOLERANCE, TableDefinition, TableRegistry, diff_tables, export, extract,
};

// ---------------------------------------------------------------------------
// Tolerance parsing
// ---------------------------------------------------------------------------

fn parse_tolerance(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|e| format!("invalid tolerance '{s}': {e}"))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(format!("tolerance must be a positive finite number, got '{s}'"));
    }
    Ok(value)
}

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Extract, compare and export calibration tables from images.
#[derive(Parser, Debug)]
#[command(
    name = "romtab",
    version,
    about = "Extract, compare and export calibration tables",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// JSON table catalog (defaults to the builtin 4G63 catalog).
    #[arg(long, global = true, value_name = "tables.json", value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output a machine-readable summary as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Print a table from an image.
    Show(ShowArgs),
    /// Diff a table between two images.
    Compare(CompareArgs),
    /// Export a table as tabular text.
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Image file.
    #[arg(value_hint = ValueHint::FilePath)]
    image: PathBuf,

    /// Table name.
    #[arg(long)]
    table: String,
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// First image.
    #[arg(value_hint = ValueHint::FilePath)]
    image_a: PathBuf,

    /// Second image.
    #[arg(value_hint = ValueHint::FilePath)]
    image_b: PathBuf,

    /// Table name.
    #[arg(long)]
    table: String,

    /// Changed-cell tolerance (positive; defaults to a small epsilon).
    #[arg(long, value_parser = parse_tolerance)]
    tolerance: Option<f64>,
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Image file.
    #[arg(value_hint = ValueHint::FilePath)]
    image: PathBuf,

    /// Table name.
    #[arg(long)]
    table: String,

    /// Output file path.
    #[arg(long, value_hint = ValueHint::FilePath)]
    out: PathBuf,
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn load_registry(config: Option<&Path>) -> Result<TableRegistry, i32> {
    match config {
        Some(path) => TableRegistry::from_path(path).map_err(|e| {
            eprintln!("romtab: {}: {e}", path.display());
            1
        }),
        None => Ok(TableRegistry::builtin()),
    }
}

fn load_image(path: &Path) -> Result<RomImage, i32> {
    RomImage::load(path).map_err(|e| {
        eprintln!("romtab: {}: {e}", path.display());
        1
    })
}

fn extract_table(image: &RomImage, def: &TableDefinition) -> Result<tables::CalTable, i32> {
    extract(image.as_bytes(), def).map_err(|e| {
        eprintln!("romtab: {}: {e}", image.path().display());
        1
    })
}

// ---------------------------------------------------------------------------
// show command
// ---------------------------------------------------------------------------

fn cmd_show(cli: &Cli, args: &ShowArgs) -> i32 {
    let registry = match load_registry(cli.config.as_deref()) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let def = match registry.get(&args.table) {
        Ok(def) => def,
        Err(e) => {
            eprintln!("romtab: {e}");
            return 1;
        }
    };
    let image = match load_image(&args.image) {
        Ok(image) => image,
        Err(code) => return code,
    };
    let table = match extract_table(&image, def) {
        Ok(table) => table,
        Err(code) => return code,
    };

    if !cli.quiet {
        println!("Table '{}' — {}", table.name, image.file_name());
        if cli.verbose > 0 {
            println!(
                "offset 0x{:X}, {}x{} cells, {} byte(s) each",
                def.offset, def.rows, def.cols, def.cell_width
            );
        }
        println!();
        print!("{}", export::render_table(&table));
    }
    0
}

// ---------------------------------------------------------------------------
// compare command
// ---------------------------------------------------------------------------

fn cmd_compare(cli: &Cli, args: &CompareArgs) -> i32 {
    let registry = match load_registry(cli.config.as_deref()) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let def = match registry.get(&args.table) {
        Ok(def) => def,
        Err(e) => {
            eprintln!("romtab: {e}");
            return 1;
        }
    };

    let image_a = match load_image(&args.image_a) {
        Ok(image) => image,
        Err(code) => return code,
    };
    let image_b = match load_image(&args.image_b) {
        Ok(image) => image,
        Err(code) => return code,
    };

    let table_a = match extract_table(&image_a, def) {
        Ok(t) => t,
        Err(code) => return code,
    };
    let table_b = match extract_table(&image_b, def) {
        Ok(t) => t,
        Err(code) => return code,
    };

    let tolerance = args.tolerance.unwrap_or(DEFAULT_TOLERANCE);
    let delta = match diff_tables(&table_a, &table_b, tolerance) {
        Ok(delta) => delta,
        Err(e) => {
            eprintln!("romtab: {e}");
            return 1;
        }
    };

    if !cli.quiet {
        println!(
            "Table '{}': {} vs {}",
            delta.name,
            image_a.file_name(),
            image_b.file_name()
        );
        println!();
        print!("{}", export::render_delta(&delta));
        println!();
        println!("{}", export::summary_line(&delta));
    }

    if cli.json_output {
        let (peak_row, peak_col) = delta.peak;
        let json = serde_json::json!({
            "command": "compare",
            "table": delta.name,
            "image_a": image_a.path().display().to_string(),
            "image_b": image_b.path().display().to_string(),
            "tolerance": delta.tolerance,
            "changed": delta.changed,
            "min_delta": delta.min_delta,
            "max_delta": delta.max_delta,
            "peak": { "row": peak_row, "col": peak_col },
        });
        eprintln!("{}", serde_json::to_string_pretty(&json).unwrap());
    }

    0
}

// ---------------------------------------------------------------------------
// export command
// ---------------------------------------------------------------------------

fn cmd_export(cli: &Cli, args: &ExportArgs) -> i32 {
    let registry = match load_registry(cli.config.as_deref()) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let def = match registry.get(&args.table) {
        Ok(def) => def,
        Err(e) => {
            eprintln!("romtab: {e}");
            return 1;
        }
    };
    let image = match load_image(&args.image) {
        Ok(image) => image,
        Err(code) => return code,
    };
    let table = match extract_table(&image, def) {
        Ok(table) => table,
        Err(code) => return code,
    };

    if args.out.exists() && !cli.force {
        eprintln!(
            "romtab: output file exists, use -f to overwrite: {}",
            args.out.display()
        );
        return 1;
    }
    if let Err(e) = export::export_table(&args.out, &table) {
        eprintln!("romtab: {}: {e}", args.out.display());
        return 1;
    }

    if !cli.quiet {
        println!(
            "Exported table '{}' ({}x{}) -> {}",
            table.name,
            table.rows(),
            table.cols(),
            args.out.display()
        );
    }
    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main `romtab` entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    super::init_logging();

    let cli = Cli::parse();
    let exit_code = match &cli.command {
        Cmd::Show(args) => cmd_show(&cli, args),
        Cmd::Compare(args) => cmd_compare(&cli, args),
        Cmd::Export(args) => cmd_export(&cli, args),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
