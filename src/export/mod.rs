/// Export layer: serialise decoded waves and save them safely.
///
/// ```text
///   WaveRecord / RawWave
///        │
///        ▼
///   ┌──────────┐
///   │  writer   │  json / csv / tsv / dump → any io::Write
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │   save    │  overwrite policy, prompt, rename
///   └──────────┘
/// ```

pub mod save;
pub mod writer;

use std::fmt;
use std::str::FromStr;

use crate::error::PathError;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Csv,
    Tsv,
    Json,
    Dump,
}

impl OutputFormat {
    /// File extension (without the dot).
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json => "json",
            OutputFormat::Dump => "dump",
        }
    }

    /// Field delimiter for the tabular formats.
    pub fn delimiter(self) -> Option<u8> {
        match self {
            OutputFormat::Csv => Some(b','),
            OutputFormat::Tsv => Some(b'\t'),
            OutputFormat::Json | OutputFormat::Dump => None,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "tsv" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            "dump" => Ok(OutputFormat::Dump),
            other => Err(PathError::UnknownFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
