//! Igor binary wave container reader.
//!
//! Handles the four on-disk versions (1, 2, 3 and 5) in either byte order.
//! Layout summary:
//!
//! ```text
//!  v1  BinHeader1 (8)   WaveHeader2 (110)  data
//!  v2  BinHeader2 (16)  WaveHeader2 (110)  data  pad(16)  note
//!  v3  BinHeader3 (20)  WaveHeader2 (110)  data  pad(16)  note  formula
//!  v5  BinHeader5 (64)  WaveHeader5 (320)  data  formula  note  data units
//!                                           dim units[4]  dim labels[4] ...
//! ```
//!
//! The sections after the data start at `binheader size + wfmSize`; the
//! padding of versions 2 and 3 is counted in `wfmSize`.

use super::flatten::LabelNode;
use super::model::Sample;
use crate::error::{Result, WaveError};

const WAVE_HEADER2_SIZE: usize = 110;
/// `WaveHeader2` including its `wData[4]` field, which overlaps the data.
const WAVE_HEADER2_CHECKSUM_SIZE: usize = 126;
const WAVE_HEADER5_SIZE: usize = 320;
const MAX_WAVE_NAME2: usize = 20;
const MAX_WAVE_NAME5: usize = 32;
const DIM_LABEL_SLOT: usize = 32;
const MAX_DIMENSIONS: usize = 4;

// ---------------------------------------------------------------------------
// Byte order / data types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Little,
    Big,
}

/// Numeric storage type of the wave data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    F32,
    F64,
    I8,
    I16,
    I32,
    U8,
    U16,
    U32,
}

impl DataType {
    const COMPLEX: u16 = 0x01;
    const UNSIGNED: u16 = 0x40;

    /// Map an Igor `type` code.  Text (0) and complex waves are rejected.
    pub fn from_code(code: u16) -> Result<Self> {
        if code & Self::COMPLEX != 0 {
            return Err(WaveError::UnsupportedDataType(code));
        }
        let unsigned = code & Self::UNSIGNED != 0;
        match (code & !Self::UNSIGNED, unsigned) {
            (0x02, false) => Ok(DataType::F32),
            (0x04, false) => Ok(DataType::F64),
            (0x08, false) => Ok(DataType::I8),
            (0x10, false) => Ok(DataType::I16),
            (0x20, false) => Ok(DataType::I32),
            (0x08, true) => Ok(DataType::U8),
            (0x10, true) => Ok(DataType::U16),
            (0x20, true) => Ok(DataType::U32),
            _ => Err(WaveError::UnsupportedDataType(code)),
        }
    }

    /// Bytes per element.
    pub fn size(self) -> usize {
        match self {
            DataType::I8 | DataType::U8 => 1,
            DataType::I16 | DataType::U16 => 2,
            DataType::F32 | DataType::I32 | DataType::U32 => 4,
            DataType::F64 => 8,
        }
    }
}

// ---------------------------------------------------------------------------
// Parsed container
// ---------------------------------------------------------------------------

/// Section sizes from the binary header.  Fields a version lacks are zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinHeader {
    pub version: i16,
    pub wfm_size: usize,
    pub note_size: usize,
    pub formula_size: usize,
    pub pict_size: usize,
    pub data_e_units_size: usize,
    pub dim_e_units_size: [usize; MAX_DIMENSIONS],
    pub dim_labels_size: [usize; MAX_DIMENSIONS],
    pub s_indices_size: usize,
}

/// The wave header fields the exporters and the dump care about.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveHeader {
    pub type_code: u16,
    pub data_type: DataType,
    pub npnts: usize,
    /// Wave name bytes, cut at the first NUL.
    pub bname: Vec<u8>,
    /// Dimension sizes; unused dimensions are 0.  Version 1-3 waves are 1-D.
    pub dims: [usize; MAX_DIMENSIONS],
    /// Per-dimension scaling delta (`sfA`, or `hsA` for version 1-3).
    pub scale_delta: [f64; MAX_DIMENSIONS],
    /// Per-dimension scaling offset (`sfB`, or `hsB` for version 1-3).
    pub scale_offset: [f64; MAX_DIMENSIONS],
    pub data_units: String,
    pub dim_units: [String; MAX_DIMENSIONS],
    pub creation_date: u32,
    pub mod_date: u32,
}

/// Everything read out of the container before any normalisation.
#[derive(Debug, Clone)]
pub struct RawWave {
    pub byte_order: ByteOrder,
    pub bin_header: BinHeader,
    pub wave_header: WaveHeader,
    /// Samples in storage (column-major) order.
    pub data: Vec<Sample>,
    pub note: Vec<u8>,
    pub formula: Vec<u8>,
    pub data_e_units: Vec<u8>,
    pub dim_e_units: [Vec<u8>; MAX_DIMENSIONS],
    /// One sequence per dimension, one leaf per label slot.
    pub labels: Vec<LabelNode<Vec<u8>>>,
    /// Wrapping sum of the header words; zero for an intact header.
    pub checksum: u16,
}

impl RawWave {
    /// Number of used dimensions (at least 1).
    pub fn dimensions(&self) -> usize {
        self.wave_header
            .dims
            .iter()
            .take_while(|&&d| d > 0)
            .count()
            .max(1)
    }
}

// ---------------------------------------------------------------------------
// Byte view with explicit byte order
// ---------------------------------------------------------------------------

struct ByteView<'a> {
    buf: &'a [u8],
    order: ByteOrder,
}

macro_rules! read_number {
    ($name:ident, $ty:ty, $n:literal) => {
        fn $name(&self, offset: usize, what: &'static str) -> Result<$ty> {
            let raw: [u8; $n] = self.array(offset, what)?;
            Ok(match self.order {
                ByteOrder::Little => <$ty>::from_le_bytes(raw),
                ByteOrder::Big => <$ty>::from_be_bytes(raw),
            })
        }
    };
}

impl<'a> ByteView<'a> {
    fn bytes(&self, offset: usize, len: usize, what: &'static str) -> Result<&'a [u8]> {
        let end = offset.checked_add(len).filter(|&end| end <= self.buf.len());
        match end {
            Some(end) => Ok(&self.buf[offset..end]),
            None => Err(WaveError::Truncated {
                what,
                offset,
                needed: len,
                len: self.buf.len(),
            }),
        }
    }

    fn array<const N: usize>(&self, offset: usize, what: &'static str) -> Result<[u8; N]> {
        let mut raw = [0u8; N];
        raw.copy_from_slice(self.bytes(offset, N, what)?);
        Ok(raw)
    }

    read_number!(u16_at, u16, 2);
    read_number!(i16_at, i16, 2);
    read_number!(u32_at, u32, 4);
    read_number!(i32_at, i32, 4);
    read_number!(f64_at, f64, 8);

    /// A non-negative `i32` size or count field.
    fn size_at(&self, offset: usize, what: &'static str) -> Result<usize> {
        let v = self.i32_at(offset, what)?;
        usize::try_from(v).map_err(|_| WaveError::Layout(format!("negative {what}: {v}")))
    }

    /// Fixed-width NUL-terminated text field.
    fn cstr(&self, offset: usize, len: usize, what: &'static str) -> Result<Vec<u8>> {
        Ok(until_nul(self.bytes(offset, len, what)?).to_vec())
    }

    fn checksum(&self, len: usize) -> Result<u16> {
        let mut sum = 0u16;
        for offset in (0..len).step_by(2) {
            sum = sum.wrapping_add(self.u16_at(offset, "header checksum")?);
        }
        Ok(sum)
    }
}

fn until_nul(raw: &[u8]) -> &[u8] {
    match raw.iter().position(|&b| b == 0) {
        Some(end) => &raw[..end],
        None => raw,
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Parse a complete `.ibw` file held in memory.
pub fn read_wave(buf: &[u8]) -> Result<RawWave> {
    let (byte_order, version) = detect_byte_order(buf)?;
    let view = ByteView {
        buf,
        order: byte_order,
    };

    let (bin_header, bin_size) = read_bin_header(&view, version)?;
    log::debug!(
        "binary wave version {version}, {byte_order:?} endian, wfmSize {}",
        bin_header.wfm_size
    );

    let (wave_header, header_size) = if version == 5 {
        (read_wave_header5(&view, bin_size)?, WAVE_HEADER5_SIZE)
    } else {
        (read_wave_header2(&view, bin_size)?, WAVE_HEADER2_SIZE)
    };
    let checksum = view.checksum(checksum_len(version, bin_size, buf.len()))?;

    let data = read_data(&view, &wave_header, bin_size + header_size)?;

    let mut wave = RawWave {
        byte_order,
        bin_header,
        wave_header,
        data,
        note: Vec::new(),
        formula: Vec::new(),
        data_e_units: Vec::new(),
        dim_e_units: Default::default(),
        labels: Vec::new(),
        checksum,
    };
    read_sections(&view, &mut wave, bin_size)?;
    Ok(wave)
}

/// Bytes covered by the header checksum.
///
/// Version 5 sums the headers without the data field.  Versions 1-3 sum the
/// whole `WaveHeader2`, so the first 16 data bytes are included; a version 1
/// file with fewer data bytes than that is summed up to its end.
fn checksum_len(version: i16, bin_size: usize, file_len: usize) -> usize {
    if version == 5 {
        bin_size + WAVE_HEADER5_SIZE
    } else {
        (bin_size + WAVE_HEADER2_CHECKSUM_SIZE).min(file_len) & !1
    }
}

fn detect_byte_order(buf: &[u8]) -> Result<(ByteOrder, i16)> {
    const SUPPORTED: [i16; 4] = [1, 2, 3, 5];

    let raw: [u8; 2] = match buf.get(..2) {
        Some(&[a, b]) => [a, b],
        _ => {
            return Err(WaveError::Truncated {
                what: "version",
                offset: 0,
                needed: 2,
                len: buf.len(),
            })
        }
    };
    let little = i16::from_le_bytes(raw);
    if SUPPORTED.contains(&little) {
        return Ok((ByteOrder::Little, little));
    }
    let big = i16::from_be_bytes(raw);
    if SUPPORTED.contains(&big) {
        return Ok((ByteOrder::Big, big));
    }
    Err(WaveError::UnsupportedVersion(little))
}

// ---------------------------------------------------------------------------
// Headers
// ---------------------------------------------------------------------------

fn read_bin_header(view: &ByteView<'_>, version: i16) -> Result<(BinHeader, usize)> {
    let mut h = BinHeader {
        version,
        ..BinHeader::default()
    };
    let size = match version {
        1 => {
            h.wfm_size = view.size_at(2, "wfmSize")?;
            8
        }
        2 => {
            h.wfm_size = view.size_at(2, "wfmSize")?;
            h.note_size = view.size_at(6, "noteSize")?;
            h.pict_size = view.size_at(10, "pictSize")?;
            16
        }
        3 => {
            h.wfm_size = view.size_at(2, "wfmSize")?;
            h.note_size = view.size_at(6, "noteSize")?;
            h.formula_size = view.size_at(10, "formulaSize")?;
            h.pict_size = view.size_at(14, "pictSize")?;
            20
        }
        5 => {
            h.wfm_size = view.size_at(4, "wfmSize")?;
            h.formula_size = view.size_at(8, "formulaSize")?;
            h.note_size = view.size_at(12, "noteSize")?;
            h.data_e_units_size = view.size_at(16, "dataEUnitsSize")?;
            for i in 0..MAX_DIMENSIONS {
                h.dim_e_units_size[i] = view.size_at(20 + 4 * i, "dimEUnitsSize")?;
                h.dim_labels_size[i] = view.size_at(36 + 4 * i, "dimLabelsSize")?;
            }
            h.s_indices_size = view.size_at(52, "sIndicesSize")?;
            64
        }
        other => return Err(WaveError::UnsupportedVersion(other)),
    };
    Ok((h, size))
}

fn units(raw: &[u8]) -> String {
    String::from_utf8_lossy(until_nul(raw)).into_owned()
}

fn read_wave_header2(view: &ByteView<'_>, base: usize) -> Result<WaveHeader> {
    let type_code = view.i16_at(base, "wave type")? as u16;
    let npnts = view.size_at(base + 42, "npnts")?;
    Ok(WaveHeader {
        type_code,
        data_type: DataType::from_code(type_code)?,
        npnts,
        bname: view.cstr(base + 6, MAX_WAVE_NAME2, "bname")?,
        dims: [npnts, 0, 0, 0],
        scale_delta: [view.f64_at(base + 48, "hsA")?, 0.0, 0.0, 0.0],
        scale_offset: [view.f64_at(base + 56, "hsB")?, 0.0, 0.0, 0.0],
        data_units: units(view.bytes(base + 34, 4, "dataUnits")?),
        dim_units: [
            units(view.bytes(base + 38, 4, "xUnits")?),
            String::new(),
            String::new(),
            String::new(),
        ],
        creation_date: view.u32_at(base + 96, "creationDate")?,
        mod_date: view.u32_at(base + 102, "modDate")?,
    })
}

fn read_wave_header5(view: &ByteView<'_>, base: usize) -> Result<WaveHeader> {
    let type_code = view.i16_at(base + 16, "wave type")? as u16;
    let npnts = view.size_at(base + 12, "npnts")?;

    let mut dims = [0usize; MAX_DIMENSIONS];
    let mut scale_delta = [0.0; MAX_DIMENSIONS];
    let mut scale_offset = [0.0; MAX_DIMENSIONS];
    let mut dim_units: [String; MAX_DIMENSIONS] = Default::default();
    for i in 0..MAX_DIMENSIONS {
        dims[i] = view.size_at(base + 68 + 4 * i, "nDim")?;
        scale_delta[i] = view.f64_at(base + 84 + 8 * i, "sfA")?;
        scale_offset[i] = view.f64_at(base + 116 + 8 * i, "sfB")?;
        dim_units[i] = units(view.bytes(base + 152 + 4 * i, 4, "dimUnits")?);
    }
    if dims[0] == 0 {
        dims[0] = npnts;
    }

    Ok(WaveHeader {
        type_code,
        data_type: DataType::from_code(type_code)?,
        npnts,
        bname: view.cstr(base + 28, MAX_WAVE_NAME5, "bname")?,
        dims,
        scale_delta,
        scale_offset,
        data_units: units(view.bytes(base + 148, 4, "dataUnits")?),
        dim_units,
        creation_date: view.u32_at(base + 4, "creationDate")?,
        mod_date: view.u32_at(base + 8, "modDate")?,
    })
}

// ---------------------------------------------------------------------------
// Data and trailing sections
// ---------------------------------------------------------------------------

fn read_data(view: &ByteView<'_>, header: &WaveHeader, offset: usize) -> Result<Vec<Sample>> {
    let used: Vec<usize> = header.dims.iter().copied().take_while(|&d| d > 0).collect();
    let expected: usize = used.iter().product();
    if !used.is_empty() && expected != header.npnts {
        return Err(WaveError::Layout(format!(
            "dimensions {used:?} hold {expected} points but npnts is {}",
            header.npnts
        )));
    }

    let width = header.data_type.size();
    let len = header
        .npnts
        .checked_mul(width)
        .ok_or_else(|| WaveError::Layout(format!("npnts {} overflows", header.npnts)))?;
    let raw = view.bytes(offset, len, "wave data")?;

    let sample_view = ByteView {
        buf: raw,
        order: view.order,
    };
    (0..header.npnts)
        .map(|i| read_sample(&sample_view, header.data_type, i * width))
        .collect()
}

fn read_sample(view: &ByteView<'_>, ty: DataType, at: usize) -> Result<Sample> {
    const WHAT: &str = "wave data";
    Ok(match ty {
        DataType::F32 => {
            let bits = view.u32_at(at, WHAT)?;
            Sample::Float(f64::from(f32::from_bits(bits)))
        }
        DataType::F64 => Sample::Float(view.f64_at(at, WHAT)?),
        DataType::I8 => Sample::Int(i64::from(view.array::<1>(at, WHAT)?[0] as i8)),
        DataType::U8 => Sample::Int(i64::from(view.array::<1>(at, WHAT)?[0])),
        DataType::I16 => Sample::Int(i64::from(view.i16_at(at, WHAT)?)),
        DataType::U16 => Sample::Int(i64::from(view.u16_at(at, WHAT)?)),
        DataType::I32 => Sample::Int(i64::from(view.i32_at(at, WHAT)?)),
        DataType::U32 => Sample::Int(i64::from(view.u32_at(at, WHAT)?)),
    })
}

fn read_sections(view: &ByteView<'_>, wave: &mut RawWave, bin_size: usize) -> Result<()> {
    let h = wave.bin_header.clone();
    let mut pos = bin_size
        .checked_add(h.wfm_size)
        .ok_or_else(|| WaveError::Layout("wfmSize overflows".to_string()))?;

    let mut take = |len: usize, what: &'static str| -> Result<Vec<u8>> {
        let section = view.bytes(pos, len, what)?.to_vec();
        pos += len;
        Ok(section)
    };

    match h.version {
        1 => {}
        2 => wave.note = take(h.note_size, "note")?,
        3 => {
            wave.note = take(h.note_size, "note")?;
            wave.formula = take(h.formula_size, "formula")?;
        }
        _ => {
            wave.formula = take(h.formula_size, "formula")?;
            wave.note = take(h.note_size, "note")?;
            wave.data_e_units = take(h.data_e_units_size, "extended data units")?;
            for i in 0..MAX_DIMENSIONS {
                wave.dim_e_units[i] = take(h.dim_e_units_size[i], "extended dimension units")?;
            }
            let mut labels = Vec::with_capacity(MAX_DIMENSIONS);
            for size in h.dim_labels_size {
                if size % DIM_LABEL_SLOT != 0 {
                    return Err(WaveError::Layout(format!(
                        "dimension label block of {size} bytes is not a multiple of {DIM_LABEL_SLOT}"
                    )));
                }
                let block = take(size, "dimension labels")?;
                let slots = block
                    .chunks(DIM_LABEL_SLOT)
                    .map(|slot| LabelNode::Leaf(until_nul(slot).to_vec()))
                    .collect();
                labels.push(LabelNode::Seq(slots));
            }
            wave.labels = labels;
        }
    }
    Ok(())
}
