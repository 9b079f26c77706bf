//! `wrenc` — the command-line driver for the Wren static analyzer.
//!
//! `wrenc [--json] <path>` analyzes a single `.wren` file or every
//! `.wren` file directly inside a directory (non-recursive), printing
//! diagnostics either as pretty text or as one JSON array.

mod errors;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use wren_common::Diagnostic;

use errors::CliError;

#[derive(Parser)]
#[command(name = "wrenc", version, about = "Static analyzer for Wren source files")]
struct Cli {
    /// A `.wren` file, or a directory of `.wren` files (not searched recursively)
    path: PathBuf,

    /// Emit a single JSON array of diagnostics instead of pretty text
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(had_errors) => {
            if had_errors {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            eprintln!("wrenc: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Runs the analyzer over every input file. Returns whether any
/// error-severity diagnostic was found across all of them.
fn run(cli: &Cli) -> Result<bool, CliError> {
    let files = collect_wren_files(&cli.path)?;
    log::debug!("wrenc: analyzing {} file(s)", files.len());

    let mut had_errors = false;
    let mut all_diagnostics: Vec<Diagnostic> = Vec::new();

    for path in &files {
        let display_path = path.display().to_string();
        let bytes = std::fs::read(path).map_err(|source| CliError::Read {
            path: path.clone(),
            source,
        })?;
        let source = String::from_utf8(bytes).map_err(|_| CliError::NotUtf8 { path: path.clone() })?;

        let result = wren_analyze::analyze(&source, &display_path);
        had_errors |= result.diagnostics.iter().any(Diagnostic::is_error);

        if cli.json {
            all_diagnostics.extend(result.diagnostics);
        } else {
            for diagnostic in &result.diagnostics {
                println!("{}\n", wren_report::render_pretty(&display_path, &source, diagnostic));
            }
        }
    }

    if cli.json {
        let json = wren_report::render_json(&all_diagnostics)
            .map_err(|e| CliError::Serialize(e.to_string()))?;
        println!("{json}");
    }

    Ok(had_errors)
}

/// Resolves `path` to the ordered list of `.wren` files it names: a
/// single file as itself, or every direct (non-recursive) `.wren`
/// child of a directory, sorted for deterministic output.
fn collect_wren_files(path: &Path) -> Result<Vec<PathBuf>, CliError> {
    if !path.exists() {
        return Err(CliError::NotFound(path.to_path_buf()));
    }
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    if !path.is_dir() {
        return Err(CliError::NotWrenFileOrDirectory(path.to_path_buf()));
    }

    let entries = std::fs::read_dir(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "wren"))
        .collect();
    files.sort();
    Ok(files)
}
