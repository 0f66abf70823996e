//! Error types for decoding and exporting waves

use std::path::PathBuf;

use thiserror::Error;

/// Result type for wave decoding.
pub type Result<T> = std::result::Result<T, WaveError>;

/// Errors raised while reading or decoding a binary wave file.
///
/// None of these are transient: a corrupt file stays corrupt, so callers
/// report and move on instead of retrying.
#[derive(Error, Debug)]
pub enum WaveError {
    /// A text field (label or wave name) is not valid UTF-8
    #[error("invalid UTF-8 in {field}: {source}")]
    Decode {
        field: &'static str,
        #[source]
        source: std::str::Utf8Error,
    },

    /// The file ends before a section the headers announce
    #[error("file truncated: {what} needs {needed} bytes at offset {offset}, file has {len}")]
    Truncated {
        what: &'static str,
        offset: usize,
        needed: usize,
        len: usize,
    },

    /// Leading version word is not 1, 2, 3 or 5 in either byte order
    #[error("unsupported binary wave version {0}")]
    UnsupportedVersion(i16),

    /// Text, complex or unknown numeric type
    #[error("unsupported wave data type 0x{0:04x}")]
    UnsupportedDataType(u16),

    /// Header fields contradict each other
    #[error("inconsistent wave layout: {0}")]
    Layout(String),

    /// Reading the input file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Validation errors for input and output paths.
#[derive(Error, Debug)]
pub enum PathError {
    #[error("no valid input files found")]
    NoInputs,

    #[error("output filename cannot be specified for multiple input files")]
    OutfileWithManyInputs,

    #[error("input file does not have a .ibw extension: {0}")]
    NotIbw(PathBuf),

    #[error("output format not specified or implied")]
    FormatNotSpecified,

    #[error("inconsistent formats in arguments: --outformat {format} but output file extension .{extension}")]
    InconsistentFormats { format: String, extension: String },

    #[error("unknown output format: {0}")]
    UnknownFormat(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
