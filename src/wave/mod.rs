/// Wave layer: container parsing, label/notes normalisation, decoding.
///
/// Architecture:
/// ```text
///  .ibw bytes
///        │
///        ▼
///   ┌──────────┐
///   │  binary   │  byte order, headers, data buffer → RawWave
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  decoder  │  flatten labels, parse notes, shape data
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │  WaveRecord   │  filename, labels, notes, data (+ warnings)
///   └──────────────┘
/// ```

pub mod binary;
pub mod decoder;
pub mod flatten;
pub mod model;
pub mod notes;
