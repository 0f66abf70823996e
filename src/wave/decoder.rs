use std::path::Path;

use super::binary::{read_wave, RawWave};
use super::flatten::flatten;
use super::model::{DecodeWarning, Decoded, Sample, WaveData, WaveRecord};
use super::notes::parse_notes;
use crate::error::{Result, WaveError};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Decode an in-memory `.ibw` file.
///
/// `source_name` is the input file's stem; it is only compared against the
/// name stored in the header, and a mismatch is reported as a warning.
pub fn decode(raw: &[u8], source_name: &str) -> Result<Decoded> {
    let wave = read_wave(raw)?;
    decode_raw(wave, source_name)
}

/// Read and decode a file from disk, using its stem as the source name.
pub fn decode_file(path: &Path) -> Result<Decoded> {
    let raw = std::fs::read(path)?;
    decode(&raw, &file_stem(path))
}

/// Read a file from disk without normalising it (for dump output).
pub fn read_raw_file(path: &Path) -> Result<RawWave> {
    let raw = std::fs::read(path)?;
    read_wave(&raw)
}

/// The file name without directory or extension.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Normalisation
// ---------------------------------------------------------------------------

/// Turn a parsed container into a [`WaveRecord`].
pub fn decode_raw(wave: RawWave, source_name: &str) -> Result<Decoded> {
    let mut warnings = Vec::new();
    if wave.checksum != 0 {
        warnings.push(DecodeWarning::ChecksumMismatch {
            computed: wave.checksum,
        });
    }

    let dims = wave.dimensions();
    let rows = wave.wave_header.dims[0];

    let labels = flatten(wave.labels)
        .into_iter()
        .map(|label| {
            String::from_utf8(label).map_err(|e| WaveError::Decode {
                field: "label",
                source: e.utf8_error(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let notes = parse_notes(&wave.note);

    let filename = String::from_utf8(wave.wave_header.bname).map_err(|e| WaveError::Decode {
        field: "wave name",
        source: e.utf8_error(),
    })?;

    if filename != source_name {
        warnings.push(DecodeWarning::FilenameMismatch {
            stored: filename.clone(),
            input: source_name.to_string(),
        });
    }

    let data = shape_data(wave.data, dims, rows);

    Ok(Decoded {
        record: WaveRecord {
            filename,
            labels,
            notes,
            data,
        },
        warnings,
    })
}

/// Arrange column-major samples into the record layout.
///
/// One dimension stays flat.  Otherwise the first dimension gives the rows
/// and every remaining dimension is folded into the columns, so element
/// `(r, c)` is sample `r + c * rows`.
fn shape_data(samples: Vec<Sample>, dims: usize, rows: usize) -> WaveData {
    if dims < 2 || rows == 0 {
        return WaveData::Flat(samples);
    }
    let cols = samples.len() / rows;
    let table = (0..rows)
        .map(|r| (0..cols).map(|c| samples[r + c * rows]).collect())
        .collect();
    WaveData::Rows(table)
}
