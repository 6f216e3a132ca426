use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use tracing::debug;

use crate::capture::{FrameScanner, ImageSequenceSource, ScanOutcome};
use crate::clipboard::{copy_to_clipboard, read_clipboard_image};
use crate::codec::{Decode, DecodeOutcome, ErrorCorrection, PixelFrame, QrDecoder, validate_input};
use crate::error::HistoryError;
use crate::models::{HistoryEntry, HistoryKind};
use crate::store::{FileStore, HISTORY_CAPACITY, Histories, content_contains};
use crate::utils::{collect_image_paths, format_path_with_tilde, get_data_dir, sanitize_for_terminal, single_line};
use crate::workbench::{ScanResult, Workbench};

#[derive(Parser)]
#[command(name = "qr-toolkit")]
#[command(version)]
#[command(about = "Generate and scan QR codes, keeping a local history", long_about = None)]
pub struct Cli {
    /// Directory holding the history files [env: QR_TOOLKIT_DATA_DIR]
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Log debug detail to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode text into a QR code
    Generate {
        /// Text, URL or any other content to encode
        text: String,

        /// Error-correction level
        #[arg(short, long, value_enum, ignore_case = true, default_value_t = ErrorCorrection::M)]
        level: ErrorCorrection,

        /// Write the code to this PNG file
        #[arg(short, long, value_name = "FILE.png")]
        output: Option<PathBuf>,

        /// Don't print the code to the terminal
        #[arg(short, long)]
        quiet: bool,
    },

    /// Decode QR codes from image files
    Scan {
        /// Image files, or directories with --recursive
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Scan directories recursively
        #[arg(short, long)]
        recursive: bool,

        /// Copy the last decoded text to the clipboard
        #[arg(short, long)]
        copy: bool,
    },

    /// Decode a QR code from the image on the clipboard
    Paste {
        /// Copy the decoded text back to the clipboard as text
        #[arg(short, long)]
        copy: bool,
    },

    /// Poll a directory of captured frames until a code is found
    Camera {
        /// Directory of frames, read in file-name order
        frames_dir: PathBuf,
    },

    /// Inspect or manage history
    History {
        #[command(subcommand)]
        action: HistoryCommand,
    },

    /// Browse history interactively
    Browse,

    /// Show statistics about the history
    Stats,
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// List entries, newest first
    List {
        /// Only this history (generated or scanned)
        #[arg(short, long)]
        kind: Option<HistoryKind>,

        /// Case-insensitive substring filter over content
        #[arg(short, long)]
        search: Option<String>,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete history (both kinds unless --kind is given)
    Clear {
        #[arg(short, long)]
        kind: Option<HistoryKind>,
    },

    /// Write the image stored with an entry to a PNG file
    Save {
        /// Entry number as shown by `history list` (1 = newest)
        index: usize,

        #[arg(short, long, value_name = "FILE.png")]
        output: PathBuf,

        #[arg(short, long, default_value = "generated")]
        kind: HistoryKind,
    },
}

pub fn run(cli: Cli) -> Result<()> {
    let data_dir = cli.data_dir.as_deref();

    match cli.command {
        Some(Commands::Generate { text, level, output, quiet }) => {
            generate(data_dir, &text, level, output.as_deref(), quiet)
        }
        Some(Commands::Scan { paths, recursive, copy }) => scan(data_dir, &paths, recursive, copy),
        Some(Commands::Paste { copy }) => paste(data_dir, copy),
        Some(Commands::Camera { frames_dir }) => camera(data_dir, &frames_dir),
        Some(Commands::History { action }) => match action {
            HistoryCommand::List { kind, search, json } => {
                list_history(data_dir, kind, search.as_deref().unwrap_or(""), json)
            }
            HistoryCommand::Clear { kind } => clear_history(data_dir, kind),
            HistoryCommand::Save { index, output, kind } => save_entry(data_dir, kind, index, &output),
        },
        Some(Commands::Browse) => browse(data_dir),
        Some(Commands::Stats) => show_stats(data_dir),
        None => {
            println!("Use --help for usage information");
            Ok(())
        }
    }
}

fn open_store(data_dir: Option<&Path>) -> Result<FileStore> {
    let dir = get_data_dir(data_dir)?;
    debug!(dir = %dir.display(), "Opening history store");
    FileStore::open(&dir).with_context(|| format!("Failed to open data directory: {}", dir.display()))
}

fn open_workbench(data_dir: Option<&Path>) -> Result<Workbench<FileStore>> {
    Ok(Workbench::open(open_store(data_dir)?))
}

fn report_unsaved(warning: Option<HistoryError>) {
    if let Some(err) = warning {
        eprintln!("Warning: result not saved to history: {}", err);
    }
}

fn print_decoded(label: Option<&Path>, text: &str) {
    let text = sanitize_for_terminal(text);
    match label {
        Some(path) => println!("{}: {}", path.display(), text),
        None => println!("{}", text),
    }
}

fn copy_decoded(text: &str) -> Result<()> {
    copy_to_clipboard(text).context("Failed to copy to clipboard")?;
    println!("Copied to clipboard");
    Ok(())
}

fn generate(
    data_dir: Option<&Path>,
    text: &str,
    level: ErrorCorrection,
    output: Option<&Path>,
    quiet: bool,
) -> Result<()> {
    validate_input(text)?;

    let mut bench = open_workbench(data_dir)?;
    let generation = bench.generate(text, level).context("Failed to generate QR code")?;

    if let Some(path) = output {
        let png = generation.encoded.artifact.png_bytes()?;
        fs::write(path, png).with_context(|| format!("Failed to write {}", path.display()))?;
    }

    if !quiet {
        println!("{}", generation.encoded.preview);
    }
    println!("Generated QR code, error correction {}", generation.encoded.level.label());
    if let Some(path) = output {
        println!("Saved to {}", path.display());
    }

    report_unsaved(generation.recorded.warning);
    Ok(())
}

fn scan(data_dir: Option<&Path>, inputs: &[PathBuf], recursive: bool, copy: bool) -> Result<()> {
    let paths = collect_image_paths(inputs, recursive)?;
    if paths.is_empty() {
        bail!("No image files to scan");
    }

    let mut bench = open_workbench(data_dir)?;

    // Decode in parallel; `collect` keeps input order for the history appends below
    let decoder = bench.decoder();
    let results: Vec<_> = paths
        .par_iter()
        .map(|path| PixelFrame::from_path(path).and_then(|frame| decoder.decode(&frame)))
        .collect();

    let label_each = paths.len() > 1;
    let mut last_found = None;
    let mut failures = 0usize;

    for (path, result) in paths.iter().zip(results) {
        let label = label_each.then_some(path.as_path());
        match result {
            Ok(DecodeOutcome::Found(text)) => {
                print_decoded(label, &text);
                let recorded = bench.record_scan(text.clone());
                report_unsaved(recorded.warning);
                last_found = Some(text);
            }
            Ok(DecodeOutcome::NotFound) => {
                println!("{}: No QR code found", path.display());
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                failures += 1;
            }
        }
    }

    if copy && let Some(text) = last_found {
        copy_decoded(&text)?;
    }

    if failures > 0 {
        bail!("{} of {} images could not be read", failures, paths.len());
    }
    Ok(())
}

fn paste(data_dir: Option<&Path>, copy: bool) -> Result<()> {
    let frame = read_clipboard_image()?;
    let mut bench = open_workbench(data_dir)?;

    match bench.scan_frame(&frame).context("Failed to decode clipboard image")? {
        ScanResult::Found(recorded) => {
            print_decoded(None, &recorded.entry.content);
            if copy {
                copy_decoded(&recorded.entry.content)?;
            }
            report_unsaved(recorded.warning);
        }
        ScanResult::NotFound => println!("No QR code found in the clipboard image"),
    }
    Ok(())
}

fn camera(data_dir: Option<&Path>, frames_dir: &Path) -> Result<()> {
    let mut bench = open_workbench(data_dir)?;

    let scanner = FrameScanner::new(QrDecoder::new());
    let handle = scanner.start(ImageSequenceSource::new(frames_dir));

    match handle.wait().context("Camera scan failed")? {
        ScanOutcome::Found(text) => {
            print_decoded(None, &text);
            let recorded = bench.record_scan(text);
            report_unsaved(recorded.warning);
        }
        ScanOutcome::SourceEnded => {
            println!("No QR code found in {}", frames_dir.display());
        }
        ScanOutcome::Cancelled => println!("Scan cancelled"),
    }
    Ok(())
}

fn selected_kinds(kind: Option<HistoryKind>) -> Vec<HistoryKind> {
    kind.map_or_else(|| HistoryKind::ALL.to_vec(), |kind| vec![kind])
}

fn list_history(data_dir: Option<&Path>, kind: Option<HistoryKind>, term: &str, json: bool) -> Result<()> {
    let histories = Histories::open(open_store(data_dir)?);
    let matches = content_contains(term);

    if json {
        let entries: Vec<&HistoryEntry> = selected_kinds(kind)
            .into_iter()
            .flat_map(|kind| histories.for_kind(kind).search(term))
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for kind in selected_kinds(kind) {
        let store = histories.for_kind(kind);
        println!("{} history ({}/{})", capitalize(kind.as_str()), store.len(), HISTORY_CAPACITY);

        let mut shown = 0;
        for (idx, entry) in store.entries().iter().enumerate() {
            if !matches(&entry.content) {
                continue;
            }
            let image = if entry.artifact.as_ref().is_some_and(|a| !a.is_empty()) { " [png]" } else { "" };
            println!(
                "{:>4}. {}  {}{}",
                idx + 1,
                entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                single_line(&entry.content),
                image
            );
            shown += 1;
        }

        if shown == 0 {
            println!("  (no entries)");
        }
    }

    Ok(())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn clear_history(data_dir: Option<&Path>, kind: Option<HistoryKind>) -> Result<()> {
    let mut bench = open_workbench(data_dir)?;
    bench.clear(kind).context("Failed to clear history")?;

    match kind {
        Some(kind) => println!("Cleared {} history", kind),
        None => println!("Cleared all history"),
    }
    Ok(())
}

fn save_entry(data_dir: Option<&Path>, kind: HistoryKind, index: usize, output: &Path) -> Result<()> {
    let histories = Histories::open(open_store(data_dir)?);
    let store = histories.for_kind(kind);

    let entry = index
        .checked_sub(1)
        .and_then(|idx| store.get(idx))
        .with_context(|| format!("No entry {} in {} history ({} entries)", index, kind, store.len()))?;

    let artifact = match &entry.artifact {
        Some(artifact) if !artifact.is_empty() => artifact,
        _ => bail!("Entry {} has no stored image", index),
    };

    let png = artifact.png_bytes().with_context(|| format!("Entry {} has a malformed image", index))?;
    fs::write(output, png).with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Saved entry {} to {}", index, output.display());
    Ok(())
}

fn browse(data_dir: Option<&Path>) -> Result<()> {
    let histories = Histories::open(open_store(data_dir)?);
    crate::tui::run_interactive(histories)
}

fn show_stats(data_dir: Option<&Path>) -> Result<()> {
    let dir = get_data_dir(data_dir)?;
    let store = open_store(Some(dir.as_path()))?;
    let histories = Histories::open(store);

    println!("QR Toolkit History Statistics");
    println!("=============================");
    for kind in HistoryKind::ALL {
        let history = histories.for_kind(kind);
        println!("{} entries: {}/{}", capitalize(kind.as_str()), history.len(), HISTORY_CAPACITY);
        if let Some(newest) = history.newest() {
            println!("  Newest: {}", newest.timestamp.format("%Y-%m-%d %H:%M:%S"));
        }
        if let Some(oldest) = history.oldest() {
            println!("  Oldest: {}", oldest.timestamp.format("%Y-%m-%d %H:%M:%S"));
        }
    }
    println!();
    println!("Data directory: {}", format_path_with_tilde(&dir));

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate_with_level() {
        let cli = Cli::try_parse_from(["qr-toolkit", "generate", "hello", "--level", "h"]).unwrap();
        match cli.command {
            Some(Commands::Generate { text, level, output, quiet }) => {
                assert_eq!(text, "hello");
                assert_eq!(level, ErrorCorrection::H);
                assert!(output.is_none());
                assert!(!quiet);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_generate_level_defaults_to_m() {
        let cli = Cli::try_parse_from(["qr-toolkit", "generate", "hello"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Generate { level: ErrorCorrection::M, .. })));
    }

    #[test]
    fn test_parse_history_list_kind_alias() {
        let cli =
            Cli::try_parse_from(["qr-toolkit", "history", "list", "--kind", "scan", "--search", "ex"])
                .unwrap();
        match cli.command {
            Some(Commands::History { action: HistoryCommand::List { kind, search, json } }) => {
                assert_eq!(kind, Some(HistoryKind::Scanned));
                assert_eq!(search.as_deref(), Some("ex"));
                assert!(!json);
            }
            _ => panic!("expected history list"),
        }
    }

    #[test]
    fn test_global_data_dir_after_subcommand() {
        let cli = Cli::try_parse_from(["qr-toolkit", "stats", "--data-dir", "/tmp/qr"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/qr")));
    }

    #[test]
    fn test_scan_requires_path() {
        assert!(Cli::try_parse_from(["qr-toolkit", "scan"]).is_err());
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("generated"), "Generated");
        assert_eq!(capitalize(""), "");
    }
}
