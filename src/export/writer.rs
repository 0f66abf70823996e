use std::io::Write;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use super::OutputFormat;
use crate::wave::binary::RawWave;
use crate::wave::flatten::LabelNode;
use crate::wave::model::{WaveData, WaveRecord};

/// Knobs that change how a record is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Emit the labels as a header row in CSV/TSV output.
    pub headers: bool,
    /// Emit JSON without whitespace.
    pub compact: bool,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Serialise a record in the given format.  Dispatch by format.
///
/// `Dump` works on the raw container, see [`write_dump`].
pub fn write_record<W: Write>(
    record: &WaveRecord,
    format: OutputFormat,
    out: W,
    opts: WriteOptions,
) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(record, out, opts.compact),
        OutputFormat::Csv | OutputFormat::Tsv => {
            let delimiter = format.delimiter().unwrap_or(b',');
            write_delimited(record, out, delimiter, opts.headers)
        }
        OutputFormat::Dump => bail!("dump output is written from the raw wave, not a record"),
    }
}

// ---------------------------------------------------------------------------
// JSON writer
// ---------------------------------------------------------------------------

/// Output shape:
///
/// ```json
/// {
///     "data": [[1.0, 2.0], [3.0, 4.0]],
///     "filename": "sample1",
///     "labels": ["X", "Y"],
///     "notes": {"A": 1}
/// }
/// ```
///
/// Keys are sorted at every level.  Non-finite floats become `null`.
pub fn write_json<W: Write>(record: &WaveRecord, mut out: W, compact: bool) -> Result<()> {
    // Going through Value sorts the struct keys as well as the notes.
    let value = serde_json::to_value(record).context("converting record to JSON")?;

    if compact {
        serde_json::to_writer(&mut out, &value).context("writing JSON")?;
    } else {
        let mut ser =
            serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
        value.serialize(&mut ser).context("writing JSON")?;
    }
    out.write_all(b"\n").context("writing JSON")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV / TSV writer
// ---------------------------------------------------------------------------

/// One row per data row (one single-field row per sample for 1-D waves),
/// optionally preceded by a label row.  Every field is quoted.
pub fn write_delimited<W: Write>(
    record: &WaveRecord,
    out: W,
    delimiter: u8,
    headers: bool,
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::CRLF)
        .flexible(true)
        .from_writer(out);

    if headers && !record.labels.is_empty() {
        writer
            .write_record(&record.labels)
            .context("writing header row")?;
    }

    match &record.data {
        WaveData::Flat(samples) => {
            for (i, sample) in samples.iter().enumerate() {
                writer
                    .write_record([sample.to_string()])
                    .with_context(|| format!("writing row {i}"))?;
            }
        }
        WaveData::Rows(rows) => {
            for (i, row) in rows.iter().enumerate() {
                writer
                    .write_record(row.iter().map(|s| s.to_string()))
                    .with_context(|| format!("writing row {i}"))?;
            }
        }
    }

    writer.flush().context("flushing delimited output")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Dump writer
// ---------------------------------------------------------------------------

const DUMP_VALUES_PER_LINE: usize = 8;

/// Human-readable listing of everything in the container.
pub fn write_dump<W: Write>(wave: &RawWave, mut out: W) -> Result<()> {
    let h = &wave.wave_header;
    let b = &wave.bin_header;

    writeln!(out, "version:       {} ({:?} endian)", b.version, wave.byte_order)?;
    writeln!(out, "wave name:     {}", String::from_utf8_lossy(&h.bname))?;
    writeln!(out, "type:          {:?} (0x{:04x})", h.data_type, h.type_code)?;
    writeln!(out, "points:        {}", h.npnts)?;
    writeln!(out, "dimensions:    {:?}", h.dims)?;
    writeln!(out, "scale delta:   {:?}", h.scale_delta)?;
    writeln!(out, "scale offset:  {:?}", h.scale_offset)?;
    writeln!(out, "data units:    {:?}", h.data_units)?;
    writeln!(out, "dim units:     {:?}", h.dim_units)?;
    writeln!(out, "created:       {}", h.creation_date)?;
    writeln!(out, "modified:      {}", h.mod_date)?;
    writeln!(out, "checksum:      0x{:04x}", wave.checksum)?;
    writeln!(
        out,
        "sections:      wfm {} note {} formula {} picture {} string indices {}",
        b.wfm_size, b.note_size, b.formula_size, b.pict_size, b.s_indices_size
    )?;
    if !wave.formula.is_empty() {
        let formula = String::from_utf8_lossy(&wave.formula);
        writeln!(out, "formula:       {}", formula.trim_end_matches('\0'))?;
    }
    if !wave.data_e_units.is_empty() {
        writeln!(out, "ext units:     {}", String::from_utf8_lossy(&wave.data_e_units))?;
    }

    writeln!(out, "labels:")?;
    for (dim, node) in wave.labels.iter().enumerate() {
        let slots: Vec<String> = match node {
            LabelNode::Seq(children) => children.iter().map(lossy_leaf).collect(),
            leaf => vec![lossy_leaf(leaf)],
        };
        writeln!(out, "  dim {dim}: {slots:?}")?;
    }

    writeln!(out, "note:")?;
    for line in String::from_utf8_lossy(&wave.note).split('\r') {
        let line = line.trim_end();
        if !line.is_empty() {
            writeln!(out, "  {line}")?;
        }
    }

    writeln!(out, "data:")?;
    for chunk in wave.data.chunks(DUMP_VALUES_PER_LINE) {
        let line: Vec<String> = chunk.iter().map(|s| s.to_string()).collect();
        writeln!(out, "  {}", line.join(", "))?;
    }
    out.flush()?;
    Ok(())
}

fn lossy_leaf(node: &LabelNode<Vec<u8>>) -> String {
    match node {
        LabelNode::Leaf(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        LabelNode::Seq(children) => {
            let inner: Vec<String> = children.iter().map(lossy_leaf).collect();
            format!("{inner:?}")
        }
    }
}
