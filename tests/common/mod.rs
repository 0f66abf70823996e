//! Builds synthetic `.ibw` files for the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

pub const NT_FP32: u16 = 0x02;
pub const NT_FP64: u16 = 0x04;
pub const NT_I8: u16 = 0x08;
pub const NT_I16: u16 = 0x10;
pub const NT_I32: u16 = 0x20;
pub const NT_UNSIGNED: u16 = 0x40;

/// Binary wave under construction; serialised as version 5 or 1-3.
#[derive(Debug, Clone)]
pub struct IbwBuilder {
    name: Vec<u8>,
    type_code: u16,
    npnts: usize,
    dims: [i32; 4],
    data: Vec<[u8; 8]>,
    width: usize,
    note: Vec<u8>,
    formula: Vec<u8>,
    labels: [Vec<Vec<u8>>; 4],
    big_endian: bool,
}

impl IbwBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.as_bytes().to_vec(),
            type_code: NT_FP64,
            npnts: 0,
            dims: [0; 4],
            data: Vec::new(),
            width: 8,
            note: Vec::new(),
            formula: Vec::new(),
            labels: Default::default(),
            big_endian: false,
        }
    }

    pub fn raw_name(mut self, name: &[u8]) -> Self {
        self.name = name.to_vec();
        self
    }

    pub fn big_endian(mut self) -> Self {
        self.big_endian = true;
        self
    }

    pub fn f64_data(mut self, values: &[f64]) -> Self {
        self.set_data(NT_FP64, 8, values.iter().map(|v| v.to_bits()));
        self
    }

    pub fn f32_data(mut self, values: &[f32]) -> Self {
        self.set_data(NT_FP32, 4, values.iter().map(|v| u64::from(v.to_bits())));
        self
    }

    pub fn i16_data(mut self, values: &[i16]) -> Self {
        self.set_data(NT_I16, 2, values.iter().map(|&v| u64::from(v as u16)));
        self
    }

    pub fn i32_data(mut self, values: &[i32]) -> Self {
        self.set_data(NT_I32, 4, values.iter().map(|&v| u64::from(v as u32)));
        self
    }

    pub fn i8_data(mut self, values: &[i8]) -> Self {
        self.set_data(NT_I8, 1, values.iter().map(|&v| u64::from(v as u8)));
        self
    }

    pub fn u8_data(mut self, values: &[u8]) -> Self {
        self.set_data(NT_I8 | NT_UNSIGNED, 1, values.iter().map(|&v| u64::from(v)));
        self
    }

    pub fn u16_data(mut self, values: &[u16]) -> Self {
        self.set_data(NT_I16 | NT_UNSIGNED, 2, values.iter().map(|&v| u64::from(v)));
        self
    }

    pub fn u32_data(mut self, values: &[u32]) -> Self {
        self.set_data(NT_I32 | NT_UNSIGNED, 4, values.iter().map(|&v| u64::from(v)));
        self
    }

    /// Override the type code (e.g. to build a complex or text wave).
    pub fn type_code(mut self, code: u16) -> Self {
        self.type_code = code;
        self
    }

    /// Dimension sizes, e.g. `&[2, 3]` for 2 rows and 3 columns.
    pub fn shape(mut self, dims: &[i32]) -> Self {
        self.dims = [0; 4];
        self.dims[..dims.len()].copy_from_slice(dims);
        self
    }

    pub fn note(mut self, note: &[u8]) -> Self {
        self.note = note.to_vec();
        self
    }

    /// Dependency formula; only stored by version 3 and 5 files.
    pub fn formula(mut self, formula: &[u8]) -> Self {
        self.formula = formula.to_vec();
        self
    }

    /// Label slots for one dimension: the dimension label first, then one
    /// per index.  Empty strings are unused slots.
    pub fn dim_labels(mut self, dim: usize, slots: &[&[u8]]) -> Self {
        self.labels[dim] = slots.iter().map(|s| s.to_vec()).collect();
        self
    }

    fn set_data(&mut self, code: u16, width: usize, bits: impl Iterator<Item = u64>) {
        self.type_code = code;
        self.width = width;
        self.data = bits.map(u64::to_le_bytes).collect();
        self.npnts = self.data.len();
        if self.dims == [0; 4] {
            self.dims[0] = self.npnts as i32;
        }
    }

    fn put_i16(&self, buf: &mut [u8], at: usize, v: i16) {
        let raw = if self.big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        };
        buf[at..at + 2].copy_from_slice(&raw);
    }

    fn put_i32(&self, buf: &mut [u8], at: usize, v: i32) {
        let raw = if self.big_endian {
            v.to_be_bytes()
        } else {
            v.to_le_bytes()
        };
        buf[at..at + 4].copy_from_slice(&raw);
    }

    fn data_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() * self.width);
        for le in &self.data {
            let mut value = le[..self.width].to_vec();
            if self.big_endian {
                value.reverse();
            }
            out.extend(value);
        }
        out
    }

    fn seal_checksum(&self, buf: &mut [u8], header_len: usize, field: usize) {
        let mut sum = 0u16;
        for chunk in buf[..header_len].chunks_exact(2) {
            let word = if self.big_endian {
                u16::from_be_bytes([chunk[0], chunk[1]])
            } else {
                u16::from_le_bytes([chunk[0], chunk[1]])
            };
            sum = sum.wrapping_add(word);
        }
        self.put_i16(buf, field, sum.wrapping_neg() as i16);
    }

    /// Serialise as a version 5 file.
    pub fn build(&self) -> Vec<u8> {
        let data = self.data_bytes();
        let mut head = vec![0u8; 64 + 320];

        // BinHeader5
        self.put_i16(&mut head, 0, 5);
        self.put_i32(&mut head, 4, (320 + data.len()) as i32);
        self.put_i32(&mut head, 8, self.formula.len() as i32);
        self.put_i32(&mut head, 12, self.note.len() as i32);
        for (i, slots) in self.labels.iter().enumerate() {
            self.put_i32(&mut head, 36 + 4 * i, (slots.len() * 32) as i32);
        }

        // WaveHeader5
        let w = 64;
        self.put_i32(&mut head, w + 12, self.npnts as i32);
        self.put_i16(&mut head, w + 16, self.type_code as i16);
        let name_len = self.name.len().min(31);
        head[w + 28..w + 28 + name_len].copy_from_slice(&self.name[..name_len]);
        for (i, &d) in self.dims.iter().enumerate() {
            self.put_i32(&mut head, w + 68 + 4 * i, d);
        }
        self.seal_checksum(&mut head, 64 + 320, 2);

        let mut out = head;
        out.extend(data);
        out.extend(&self.formula);
        out.extend(&self.note);
        for slots in &self.labels {
            for slot in slots {
                let mut padded = [0u8; 32];
                padded[..slot.len()].copy_from_slice(slot);
                out.extend(padded);
            }
        }
        out
    }

    /// Serialise as a version 1 file (1-D, nothing after the data).
    pub fn build_v1(&self) -> Vec<u8> {
        self.build_classic(1)
    }

    /// Serialise as a version 2 file (1-D, note after the padding).
    pub fn build_v2(&self) -> Vec<u8> {
        self.build_classic(2)
    }

    /// Serialise as a version 3 file (1-D, note then formula).
    pub fn build_v3(&self) -> Vec<u8> {
        self.build_classic(3)
    }

    /// Versions 1-3 share `WaveHeader2`.  Its last 16 bytes (`wData`) overlap
    /// the start of the data and are part of the checksum.
    fn build_classic(&self, version: i16) -> Vec<u8> {
        let data = self.data_bytes();
        let (bin_size, checksum_at) = match version {
            1 => (8, 6),
            2 => (16, 14),
            _ => (20, 18),
        };
        let mut out = vec![0u8; bin_size + 110];

        // BinHeader1/2/3
        self.put_i16(&mut out, 0, version);
        let pad = if version == 1 { 0 } else { 16 };
        self.put_i32(&mut out, 2, (110 + data.len() + pad) as i32);
        if version > 1 {
            self.put_i32(&mut out, 6, self.note.len() as i32);
        }
        if version == 3 {
            self.put_i32(&mut out, 10, self.formula.len() as i32);
        }

        // WaveHeader2
        let w = bin_size;
        self.put_i16(&mut out, w, self.type_code as i16);
        let name_len = self.name.len().min(19);
        out[w + 6..w + 6 + name_len].copy_from_slice(&self.name[..name_len]);
        self.put_i32(&mut out, w + 42, self.npnts as i32);

        out.extend(data);
        out.extend(vec![0u8; pad]);
        let checksum_len = (bin_size + 126).min(out.len()) & !1;
        self.seal_checksum(&mut out, checksum_len, checksum_at);

        if version > 1 {
            out.extend(&self.note);
        }
        if version == 3 {
            out.extend(&self.formula);
        }
        out
    }

    /// Write the version 5 serialisation to `dir/<file_name>`.
    pub fn write_to(&self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        std::fs::write(&path, self.build()).expect("writing fixture");
        path
    }
}

/// The reference fixture: labels X and Y, two notes, a 2x3 float buffer.
pub fn sample1() -> IbwBuilder {
    IbwBuilder::new("sample1")
        // column-major: rows [1, 2, 3] and [4, 5, 6]
        .f64_data(&[1.0, 4.0, 2.0, 5.0, 3.0, 6.0])
        .shape(&[2, 3])
        .note(b"A:1\rB:2.5\r")
        .dim_labels(0, &[b"", b"X", b"Y"])
}
