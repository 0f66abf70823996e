//! # ibw-extractor
//!
//! Convert Igor Pro binary wave (`.ibw`) files to CSV, TSV or JSON, or dump
//! their raw contents.
//!
//! ```no_run
//! use ibw_extractor::wave::decoder::decode_file;
//!
//! let decoded = decode_file(std::path::Path::new("sample1.ibw"))?;
//! println!("{} labels, {} rows", decoded.record.labels.len(), decoded.record.data.len());
//! # Ok::<(), ibw_extractor::WaveError>(())
//! ```

pub mod convert;
pub mod error;
pub mod export;
pub mod paths;
pub mod wave;

pub use convert::{run_batch, BatchReport, ConvertOptions, FileOutcome};
pub use error::{PathError, WaveError};
pub use export::OutputFormat;
pub use wave::decoder::{decode, decode_file};
pub use wave::model::{DecodeWarning, Decoded, NoteValue, Sample, WaveData, WaveRecord};
