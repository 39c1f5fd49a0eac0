//! CLI tool for sheetmap - builds the map document of an XLSX file
//!
//! Usage:
//!   sheetmap_cli <input.xlsx>                    # Write to the configured output path
//!   sheetmap_cli <input.xlsx> -o out.json        # Write to out.json
//!   sheetmap_cli <input.xlsx> -o -               # Print to stdout
//!   sheetmap_cli <input.xlsx> --config map.toml  # Custom settings

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sheetmap::{export, map_xlsx, MapConfig};

#[derive(Parser)]
#[command(version, about = "Build the layout and dependency map of an XLSX workbook.")]
struct Args {
    /// Workbook to map.
    input: PathBuf,

    /// Output file; `-` prints to stdout. Defaults to `output_path` from the config.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// TOML settings file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => MapConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MapConfig::default(),
    };

    let data =
        std::fs::read(&args.input).with_context(|| format!("reading {}", args.input.display()))?;
    let document =
        map_xlsx(&data, &config).with_context(|| format!("mapping {}", args.input.display()))?;

    for diagnostic in &document.diagnostics {
        eprintln!("warning: {diagnostic}");
    }

    let output = args.output.as_ref().unwrap_or(&config.output_path);
    if output.as_os_str() == "-" {
        let json = export::to_json_string(&document)?;
        let mut stdout = io::stdout().lock();
        stdout.write_all(json.as_bytes())?;
        writeln!(stdout)?;
    } else {
        export::write_document(&document, output)
            .with_context(|| format!("writing {}", output.display()))?;
        eprintln!("Written: {}", output.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
