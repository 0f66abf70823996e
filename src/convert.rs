//! One-file conversion and the batch loop around it.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::export::save::{save_to_file, OverwritePolicy, Prompt, SaveOutcome};
use crate::export::writer::{write_dump, write_record, WriteOptions};
use crate::export::OutputFormat;
use crate::paths::output_path;
use crate::wave::decoder::{decode_file, read_raw_file};

/// How files are converted; built from the command line.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Requested output format.  May be implied by `outfile` instead.
    pub format: Option<OutputFormat>,
    /// Explicit output file name (single input only).
    pub outfile: Option<String>,
    /// Output directory, relative to each input file's directory.
    pub outdir: Option<PathBuf>,
    pub overwrite: OverwritePolicy,
    pub write: WriteOptions,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            format: None,
            outfile: None,
            outdir: None,
            overwrite: OverwritePolicy::Ask,
            write: WriteOptions::default(),
        }
    }
}

impl ConvertOptions {
    /// Dump mode without an output file prints to stdout.
    pub fn dumps_to_stdout(&self) -> bool {
        self.format == Some(OutputFormat::Dump) && self.outfile.is_none()
    }
}

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Written(PathBuf),
    Skipped,
    Dumped,
}

impl From<SaveOutcome> for FileOutcome {
    fn from(outcome: SaveOutcome) -> Self {
        match outcome {
            SaveOutcome::Written(path) => FileOutcome::Written(path),
            SaveOutcome::Skipped => FileOutcome::Skipped,
        }
    }
}

/// Per-file results of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<(PathBuf, FileOutcome)>,
    pub failed: Vec<(PathBuf, anyhow::Error)>,
}

impl BatchReport {
    /// True when no file failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Single file
// ---------------------------------------------------------------------------

/// Convert one `.ibw` file to its output file.
pub fn convert_file(
    infile: &Path,
    opts: &ConvertOptions,
    prompt: &mut dyn Prompt,
) -> Result<SaveOutcome> {
    let (outpath, format) = output_path(
        infile,
        opts.outfile.as_deref(),
        opts.format,
        opts.outdir.as_deref(),
    )?;

    if format == OutputFormat::Dump {
        let raw = read_raw_file(infile).with_context(|| format!("reading {}", infile.display()))?;
        return save_to_file(&outpath, opts.overwrite, prompt, |out| write_dump(&raw, out));
    }

    let decoded = decode_file(infile).with_context(|| format!("decoding {}", infile.display()))?;
    for warning in &decoded.warnings {
        log::warn!("{}: {warning}", infile.display());
    }

    save_to_file(&outpath, opts.overwrite, prompt, |out| {
        write_record(&decoded.record, format, out, opts.write)
    })
}

/// Print the raw contents of one file.
pub fn dump_file<W: Write>(infile: &Path, out: W) -> Result<()> {
    let raw = read_raw_file(infile).with_context(|| format!("reading {}", infile.display()))?;
    write_dump(&raw, out)
}

// ---------------------------------------------------------------------------
// Batch
// ---------------------------------------------------------------------------

/// Convert every input in order.  A failing file is logged and recorded but
/// never stops the remaining files.
pub fn run_batch<W: Write>(
    inputs: &[PathBuf],
    opts: &ConvertOptions,
    prompt: &mut dyn Prompt,
    mut stdout: W,
) -> BatchReport {
    let mut report = BatchReport::default();

    for infile in inputs {
        let result = if opts.dumps_to_stdout() {
            dump_file(infile, &mut stdout).map(|()| FileOutcome::Dumped)
        } else {
            convert_file(infile, opts, prompt).map(FileOutcome::from)
        };

        match result {
            Ok(outcome) => {
                if let FileOutcome::Written(path) = &outcome {
                    log::info!("{} -> {}", infile.display(), path.display());
                }
                report.succeeded.push((infile.clone(), outcome));
            }
            Err(e) => {
                log::error!("{}: {e:#}", infile.display());
                report.failed.push((infile.clone(), e));
            }
        }
    }

    report
}
