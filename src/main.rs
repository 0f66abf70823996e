use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use ibw_extractor::convert::{run_batch, ConvertOptions};
use ibw_extractor::export::save::{OverwritePolicy, StdinPrompt};
use ibw_extractor::export::writer::WriteOptions;
use ibw_extractor::export::OutputFormat;
use ibw_extractor::paths::{check_outfile, collect_inputs};

/// Convert Igor binary wave (.ibw) files to csv, tsv or json
#[derive(Parser, Debug)]
#[command(name = "ibw-extractor")]
#[command(version)]
struct Args {
    /// Input .ibw files or directories
    #[arg(required = true)]
    infiles: Vec<PathBuf>,

    /// Output filename
    #[arg(short, long)]
    outfile: Option<String>,

    /// Output format (csv, tsv, json or dump)
    #[arg(short = 'f', long, value_parser = parse_format)]
    outformat: Option<OutputFormat>,

    /// Output file directory (relative to input file/folder)
    #[arg(short = 'd', long)]
    outdir: Option<PathBuf>,

    /// Force overwrite without confirmation
    #[arg(long)]
    clobber: bool,

    /// Include column headers in csv/tsv output
    #[arg(long)]
    headers: bool,

    /// Write json without indentation
    #[arg(long)]
    compact: bool,

    /// Recurse into sub-folders
    #[arg(long)]
    recursive: bool,
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse().map_err(|e: ibw_extractor::PathError| e.to_string())
}

impl Args {
    fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            format: self.outformat,
            outfile: self.outfile.clone(),
            outdir: self.outdir.clone(),
            overwrite: if self.clobber {
                OverwritePolicy::Clobber
            } else {
                OverwritePolicy::Ask
            },
            write: WriteOptions {
                headers: self.headers,
                compact: self.compact,
            },
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every file converted.
fn run(args: &Args) -> Result<bool> {
    let inputs = collect_inputs(&args.infiles, args.recursive)?;
    check_outfile(&inputs, args.outfile.as_deref())?;

    let opts = args.convert_options();
    let report = run_batch(&inputs, &opts, &mut StdinPrompt, std::io::stdout());

    if !report.is_success() {
        log::error!(
            "{} of {} file(s) failed:",
            report.failed.len(),
            inputs.len()
        );
        for (path, _) in &report.failed {
            log::error!("  {}", path.display());
        }
    }
    Ok(report.is_success())
}
