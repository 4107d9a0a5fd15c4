//! Makro - fixed-point spreadsheet recalculation from the command line

mod config;
mod logger;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use makro_core::Document;
use makro_core::storage::{write_json_content, write_markdown, write_markdown_content};
use makro_engine::engine::{ERROR_MARKER, RecalcOptions, Value, format_value};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "makro")]
#[command(
    author,
    version,
    about = "Spreadsheet cells recalculated to a fixed point, with Rhai formulas"
)]
struct Cli {
    /// Spreadsheet file (.grd, or .json)
    file: Option<PathBuf>,

    /// Set a cell, e.g. `-s A3==A1+A2` (repeatable, applied in order)
    #[arg(short, long = "set", value_name = "LABEL=FORMULA")]
    set: Vec<String>,

    /// Load custom Rhai functions (repeatable)
    #[arg(short, long, value_name = "FILE")]
    functions: Vec<PathBuf>,

    /// Evaluate one expression against the sheet and print the result
    #[arg(short, long, value_name = "EXPR")]
    command: Option<String>,

    /// Export the sheet to a markdown file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Print the sheet as JSON instead of a markdown table
    #[arg(long)]
    json: bool,

    /// Do not write edits back to FILE
    #[arg(long)]
    no_save: bool,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "FILE", conflicts_with = "no_config")]
    config: Option<PathBuf>,

    /// Ignore the config file
    #[arg(long)]
    no_config: bool,

    /// More log output (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = if cli.no_config {
        config::Config::default()
    } else {
        config::load(cli.config.as_deref())?
    };

    let mut functions_files = config.functions.clone();
    functions_files.extend(cli.functions.iter().cloned());

    let mut doc = open_document(&cli, &config, &functions_files)?;

    if let Some(expr) = &cli.command {
        return Ok(run_command(&doc, expr));
    }

    for edit in &cli.set {
        let Some((label, formula)) = edit.split_once('=') else {
            bail!("Invalid --set '{}': expected LABEL=FORMULA", edit);
        };
        let report = doc
            .set_cell_label(label.trim(), formula)
            .with_context(|| format!("Failed to set {}", label.trim()))?;
        log::info!(
            "{} recalculated in {} pass(es){}",
            label.trim(),
            report.passes,
            if report.converged { "" } else { " (not converged)" }
        );
    }

    if doc.modified && !cli.no_save && doc.store.is_some() {
        doc.save().context("Failed to save")?;
    }

    if let Some(output_path) = &cli.output {
        write_markdown(output_path, &doc.sheet)
            .with_context(|| format!("Failed to export '{}'", output_path.display()))?;
        println!("Exported to {}", output_path.display());
    } else if cli.json {
        println!("{}", write_json_content(&doc.sheet)?);
    } else {
        print!("{}", write_markdown_content(&doc.sheet));
    }

    Ok(ExitCode::SUCCESS)
}

fn open_document(
    cli: &Cli,
    config: &config::Config,
    functions_files: &[PathBuf],
) -> Result<Document> {
    let mut doc = Document::with_options(RecalcOptions {
        max_passes: config
            .max_passes
            .unwrap_or(RecalcOptions::default().max_passes),
    });
    doc.autosave = false;
    if let Some(operations) = config.max_operations {
        doc.set_max_operations(operations);
    }

    for func_path in functions_files {
        doc.load_functions(func_path)
            .with_context(|| format!("Failed to load functions '{}'", func_path.display()))?;
    }

    if let Some(path) = &cli.file {
        let report = doc
            .open(makro_core::storage::store_for_path(path))
            .with_context(|| format!("Failed to open '{}'", path.display()))?;
        log::debug!(
            "{} loaded in {} pass(es)",
            path.display(),
            report.passes
        );
    }
    Ok(doc)
}

/// Print the result of one expression. Lists print one item per line.
fn run_command(doc: &Document, expr: &str) -> ExitCode {
    match doc.evaluate_expression(expr) {
        Ok(Some(Value::List(items))) => {
            for item in &items {
                println!("{}", format_value(item));
            }
            ExitCode::SUCCESS
        }
        Ok(Some(value)) => {
            println!("{}", format_value(&value));
            ExitCode::SUCCESS
        }
        Ok(None) => {
            println!();
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{} {}", ERROR_MARKER, e);
            ExitCode::FAILURE
        }
    }
}
