//! Input discovery and output path rules.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::PathError;
use crate::export::OutputFormat;

const IBW_EXTENSION: &str = "ibw";

/// Whether a path has an `.ibw` extension.
pub fn is_ibw(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(IBW_EXTENSION))
}

// ---------------------------------------------------------------------------
// Input discovery
// ---------------------------------------------------------------------------

/// Expand the command-line inputs into the list of files to convert.
///
/// Without `recursive`, an `.ibw` path is taken as-is and a directory
/// contributes the `.ibw` files directly inside it.  With `recursive`, plain
/// files are kept whatever their extension and directories are walked to
/// any depth.
pub fn collect_inputs(inputs: &[PathBuf], recursive: bool) -> Result<Vec<PathBuf>, PathError> {
    let mut files = Vec::new();

    for input in inputs {
        if recursive {
            if input.is_file() {
                files.push(input.clone());
            } else if input.is_dir() {
                files.extend(walk_ibw(input));
            }
        } else if is_ibw(input) {
            files.push(input.clone());
        } else if input.is_dir() {
            files.extend(list_ibw(input)?);
        } else {
            log::debug!("skipping {}: not an .ibw file or directory", input.display());
        }
    }

    if files.is_empty() {
        return Err(PathError::NoInputs);
    }
    log::debug!("{} input file(s) found", files.len());
    Ok(files)
}

fn list_ibw(dir: &Path) -> Result<Vec<PathBuf>, PathError> {
    let entries = std::fs::read_dir(dir).map_err(|source| PathError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_ibw(path))
        .collect();
    files.sort();
    Ok(files)
}

fn walk_ibw(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("error accessing entry: {e}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_ibw(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}

/// `--outfile` names a single output, so it only makes sense for one input.
pub fn check_outfile(inputs: &[PathBuf], outfile: Option<&str>) -> Result<(), PathError> {
    if outfile.is_some() && inputs.len() > 1 {
        return Err(PathError::OutfileWithManyInputs);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Output path construction
// ---------------------------------------------------------------------------

/// Work out where to write the converted `infile`, and in which format.
///
/// * the directory is the input's own, joined with `outdir` when given
///   (created if missing);
/// * `outfile` wins over the input stem; its extension implies the format
///   and must agree with `format` when both are present;
/// * an `outfile` without extension gets the format's extension appended.
pub fn output_path(
    infile: &Path,
    outfile: Option<&str>,
    format: Option<OutputFormat>,
    outdir: Option<&Path>,
) -> Result<(PathBuf, OutputFormat), PathError> {
    if !is_ibw(infile) {
        return Err(PathError::NotIbw(infile.to_path_buf()));
    }

    let parent = infile.parent().unwrap_or_else(|| Path::new(""));
    let dir = match outdir {
        Some(outdir) => {
            let dir = parent.join(outdir);
            std::fs::create_dir_all(&dir).map_err(|source| PathError::Io {
                path: dir.clone(),
                source,
            })?;
            dir
        }
        None => parent.to_path_buf(),
    };

    let (file_name, format) = match outfile {
        Some(outfile) => named_output(outfile, format)?,
        None => {
            let format = format.ok_or(PathError::FormatNotSpecified)?;
            let stem = infile.file_stem().unwrap_or_default().to_string_lossy();
            (format!("{stem}.{}", format.extension()), format)
        }
    };

    Ok((dir.join(file_name), format))
}

fn named_output(
    outfile: &str,
    format: Option<OutputFormat>,
) -> Result<(String, OutputFormat), PathError> {
    let implied = Path::new(outfile)
        .extension()
        .map(|e| e.to_string_lossy().into_owned());

    match (implied, format) {
        (Some(ext), Some(format)) => {
            if ext.parse::<OutputFormat>().ok() != Some(format) {
                return Err(PathError::InconsistentFormats {
                    format: format.to_string(),
                    extension: ext,
                });
            }
            Ok((outfile.to_string(), format))
        }
        (Some(ext), None) => Ok((outfile.to_string(), ext.parse()?)),
        (None, Some(format)) => Ok((format!("{outfile}.{}", format.extension()), format)),
        (None, None) => Err(PathError::FormatNotSpecified),
    }
}
