use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Sample – a single element of the wave data buffer
// ---------------------------------------------------------------------------

/// One numeric element of a wave.  Integer waves keep integer samples so that
/// exported files show `3` rather than `3.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Sample {
    Int(i64),
    Float(f64),
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sample::Int(i) => write!(f, "{i}"),
            // Debug keeps the trailing ".0" on integral floats.
            Sample::Float(v) => write!(f, "{v:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// WaveData – the sample array with its dimensionality
// ---------------------------------------------------------------------------

/// The wave's numeric array.  1-D waves are a flat list; 2-D waves are a
/// list of rows.  Waves with three or four dimensions keep the first one as
/// rows and fold the rest into the columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum WaveData {
    Flat(Vec<Sample>),
    Rows(Vec<Vec<Sample>>),
}

impl WaveData {
    /// Number of top-level entries (samples for 1-D, rows for 2-D).
    pub fn len(&self) -> usize {
        match self {
            WaveData::Flat(v) => v.len(),
            WaveData::Rows(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// NoteValue – a typed value from the notes blob
// ---------------------------------------------------------------------------

/// A note value after numeric coercion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NoteValue {
    Int(i64),
    Float(f64),
    Text(String),
}

// ---------------------------------------------------------------------------
// WaveRecord – the decoded result for one file
// ---------------------------------------------------------------------------

/// Everything the exporters need from one `.ibw` file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaveRecord {
    /// Wave name stored in the binary header.
    pub filename: String,
    /// Flattened axis/column labels in storage order.
    pub labels: Vec<String>,
    /// Parsed `key:value` notes.
    pub notes: BTreeMap<String, NoteValue>,
    /// The sample array.
    pub data: WaveData,
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Advisory findings that never abort a decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeWarning {
    /// The name stored in the header differs from the input file stem.
    FilenameMismatch { stored: String, input: String },
    /// The header words did not sum to zero.
    ChecksumMismatch { computed: u16 },
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeWarning::FilenameMismatch { stored, input } => write!(
                f,
                "stored filename differs from input file name (input: {input}, stored: {stored} (.ibw))"
            ),
            DecodeWarning::ChecksumMismatch { computed } => {
                write!(f, "header checksum mismatch (sum 0x{computed:04x}, expected 0)")
            }
        }
    }
}

/// A decoded record plus the warnings raised while producing it.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub record: WaveRecord,
    pub warnings: Vec<DecodeWarning>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_samples_keep_decimal_point() {
        assert_eq!(Sample::Float(2.0).to_string(), "2.0");
        assert_eq!(Sample::Float(1.5).to_string(), "1.5");
        assert_eq!(Sample::Int(-7).to_string(), "-7");
    }

    #[test]
    fn record_serializes_untagged_values() {
        let mut notes = BTreeMap::new();
        notes.insert("A".to_string(), NoteValue::Int(1));
        notes.insert("B".to_string(), NoteValue::Float(2.5));
        notes.insert("C".to_string(), NoteValue::Text("x".to_string()));
        let record = WaveRecord {
            filename: "w".to_string(),
            labels: vec!["X".to_string()],
            notes,
            data: WaveData::Rows(vec![vec![Sample::Int(1), Sample::Float(0.5)]]),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "filename": "w",
                "labels": ["X"],
                "notes": {"A": 1, "B": 2.5, "C": "x"},
                "data": [[1, 0.5]],
            })
        );
    }
}
