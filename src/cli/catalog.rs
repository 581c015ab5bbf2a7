// `romcat`: catalog and byte-diff calibration images.

use std::io;
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::bytediff::{self, ByteDelta};
use crate::image::RomImage;
use crate::naming::{FileKind, RomName};

/// Display cap for individual change records; runs summarize the rest.
const MAX_CHANGE_ROWS: usize = 200;
const MAX_RUN_ROWS: usize = 50;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// Catalog and byte-diff ECU calibration images.
#[derive(Parser, Debug)]
#[command(
    name = "romcat",
    version,
    about = "Catalog and byte-diff ECU calibration images",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

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
    /// List every calibration image under a directory.
    List(ListArgs),
    /// Show tunes derived from a base capture.
    Tunes(TunesArgs),
    /// Byte-level diff two images.
    Diff(DiffArgs),
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Root directory to search (recursively).
    #[arg(value_hint = ValueHint::DirPath)]
    directory: PathBuf,
}

#[derive(Args, Debug)]
struct TunesArgs {
    /// Base image filename (or path; only the name is parsed).
    base: String,

    /// Directory to search for tune images.
    #[arg(long, value_hint = ValueHint::DirPath)]
    dir: PathBuf,
}

#[derive(Args, Debug)]
struct DiffArgs {
    /// First image.
    #[arg(value_hint = ValueHint::FilePath)]
    file_a: PathBuf,

    /// Second image.
    #[arg(value_hint = ValueHint::FilePath)]
    file_b: PathBuf,

    /// Fail instead of truncating when the images differ in length.
    #[arg(long)]
    strict: bool,
}

// ---------------------------------------------------------------------------
// Directory scanning
// ---------------------------------------------------------------------------

/// Recursively collect `.bin`/`.hex` files under `root`.
fn collect_images(root: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_images(&path, out)?;
        } else if matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("bin") | Some("hex")
        ) {
            out.push(path);
        }
    }
    Ok(())
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Listing order: capture date, then base before tune, then tune sequence.
fn sort_key(meta: &RomName) -> (u16, u8, u8, bool, u16) {
    (
        meta.year,
        meta.month,
        meta.day,
        meta.is_tune(),
        meta.tune.as_ref().map_or(0, |t| t.sequence),
    )
}

// ---------------------------------------------------------------------------
// list command
// ---------------------------------------------------------------------------

fn cmd_list(args: &ListArgs) -> i32 {
    if !args.directory.is_dir() {
        eprintln!("romcat: directory not found: {}", args.directory.display());
        return 1;
    }

    let mut paths = Vec::new();
    if let Err(e) = collect_images(&args.directory, &mut paths) {
        eprintln!("romcat: {}: {e}", args.directory.display());
        return 1;
    }

    // A malformed name is reported and skipped; the listing still completes.
    let mut images: Vec<(PathBuf, RomName)> = Vec::new();
    for path in paths {
        match RomName::parse(&file_name_of(&path)) {
            Ok(meta) => images.push((path, meta)),
            Err(e) => eprintln!("romcat: {}: {e}", path.display()),
        }
    }

    if images.is_empty() {
        println!("No calibration images found.");
        return 0;
    }

    // Binary images first, interchange files after, each group in date order.
    images.sort_by_key(|(_, meta)| (meta.kind == FileKind::Interchange, sort_key(meta)));

    println!(
        "{:<60} {:<12} {:<8} {:<6} {}",
        "File", "Date", "Type", "Tune#", "Description"
    );
    println!("{}", "-".repeat(110));
    for (path, meta) in &images {
        let kind = if meta.is_tune() { "tune" } else { "base" };
        let (seq, desc) = match &meta.tune {
            Some(tune) => (format!("{:03}", tune.sequence), tune.description.as_str()),
            None => (String::new(), ""),
        };
        println!(
            "{:<60} {:<12} {:<8} {:<6} {}",
            file_name_of(path),
            meta.capture_date(),
            kind,
            seq,
            desc
        );
    }
    0
}

// ---------------------------------------------------------------------------
// tunes command
// ---------------------------------------------------------------------------

fn cmd_tunes(args: &TunesArgs) -> i32 {
    let base_name = file_name_of(Path::new(&args.base));
    let base = match RomName::parse(&base_name) {
        Ok(meta) => meta,
        Err(e) => {
            eprintln!("romcat: cannot parse base image name '{base_name}': {e}");
            return 1;
        }
    };

    if !args.dir.is_dir() {
        eprintln!("romcat: directory not found: {}", args.dir.display());
        return 1;
    }

    let mut paths = Vec::new();
    if let Err(e) = collect_images(&args.dir, &mut paths) {
        eprintln!("romcat: {}: {e}", args.dir.display());
        return 1;
    }

    let mut tunes: Vec<(PathBuf, RomName)> = paths
        .into_iter()
        .filter_map(|path| {
            let meta = RomName::parse(&file_name_of(&path)).ok()?;
            (meta.is_tune() && meta.base_stem() == base.base_stem()).then_some((path, meta))
        })
        .collect();
    tunes.sort_by_key(|(_, meta)| {
        (
            meta.tune.as_ref().map_or(0, |t| t.sequence),
            meta.kind == FileKind::Interchange,
        )
    });

    if tunes.is_empty() {
        println!("No tunes found for base image: {base_name}");
        return 0;
    }

    println!("Tunes derived from: {base_name}");
    println!("{:<60} {:<6} {:<5} {}", "File", "Tune#", "Ext", "Description");
    println!("{}", "-".repeat(90));
    for (path, meta) in &tunes {
        let tune = meta.tune.as_ref().expect("filtered to tunes");
        println!(
            "{:<60} {:<6} {:<5} {}",
            file_name_of(path),
            format!("{:03}", tune.sequence),
            meta.kind.extension(),
            tune.description
        );
    }
    0
}

// ---------------------------------------------------------------------------
// diff command
// ---------------------------------------------------------------------------

fn print_diff_header(image_a: &RomImage, image_b: &RomImage, verbose: u8) {
    println!("A: {}  ({} bytes)", image_a.path().display(), image_a.len());
    println!("B: {}  ({} bytes)", image_b.path().display(), image_b.len());
    #[cfg(feature = "checksums")]
    if verbose > 0 {
        println!("A sha256: {}", image_a.sha256_hex());
        println!("B sha256: {}", image_b.sha256_hex());
    }
    #[cfg(not(feature = "checksums"))]
    let _ = verbose;
}

fn print_changes(delta: &ByteDelta) {
    println!();
    println!("{} byte(s) differ:", delta.change_count());
    println!();
    println!("{:<14} {:<10} {}", "Offset (hex)", "A (hex)", "B (hex)");
    println!("{}", "-".repeat(36));
    for change in delta.changes.iter().take(MAX_CHANGE_ROWS) {
        println!(
            "0x{:08X}     {:<10} {:02X}",
            change.offset,
            format!("{:02X}", change.before),
            change.after
        );
    }
    if delta.change_count() > MAX_CHANGE_ROWS {
        println!(
            "  ... and {} more differences (truncated).",
            delta.change_count() - MAX_CHANGE_ROWS
        );
    }

    println!();
    println!("{} contiguous run(s):", delta.runs.len());
    for run in delta.runs.iter().take(MAX_RUN_ROWS) {
        println!(
            "  0x{:08X}..0x{:08X}  ({} byte(s))",
            run.start,
            run.end(),
            run.len
        );
    }
    if delta.runs.len() > MAX_RUN_ROWS {
        println!("  ... and {} more run(s).", delta.runs.len() - MAX_RUN_ROWS);
    }
}

fn cmd_diff(args: &DiffArgs, quiet: bool, verbose: u8, json_output: bool) -> i32 {
    let image_a = match RomImage::load(&args.file_a) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("romcat: {}: {e}", args.file_a.display());
            return 1;
        }
    };
    let image_b = match RomImage::load(&args.file_b) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("romcat: {}: {e}", args.file_b.display());
            return 1;
        }
    };

    let delta = match bytediff::diff_bytes(image_a.as_bytes(), image_b.as_bytes(), args.strict) {
        Ok(delta) => delta,
        Err(e) => {
            eprintln!("romcat: {e}");
            return 1;
        }
    };

    if !quiet {
        print_diff_header(&image_a, &image_b, verbose);
        if delta.is_identical() {
            println!("Images are identical.");
        } else {
            if delta.length_mismatch {
                println!(
                    "note: lengths differ; compared the first {} byte(s) only",
                    delta.compared
                );
            }
            if delta.changes.is_empty() {
                println!("No differences within the compared range.");
            } else {
                print_changes(&delta);
            }
        }
    }

    if json_output {
        let json = serde_json::json!({
            "command": "diff",
            "file_a": image_a.path().display().to_string(),
            "file_b": image_b.path().display().to_string(),
            "len_a": delta.len_a,
            "len_b": delta.len_b,
            "compared": delta.compared,
            "changes": delta.change_count(),
            "runs": delta.runs.len(),
            "length_mismatch": delta.length_mismatch,
        });
        eprintln!("{}", serde_json::to_string_pretty(&json).unwrap());
    }

    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Main `romcat` entry point. Parses arguments via clap, dispatches commands.
pub fn run() -> ! {
    super::init_logging();

    let cli = Cli::parse();
    let exit_code = match &cli.command {
        Cmd::List(args) => cmd_list(args),
        Cmd::Tunes(args) => cmd_tunes(args),
        Cmd::Diff(args) => cmd_diff(args, cli.quiet, cli.verbose, cli.json_output),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
