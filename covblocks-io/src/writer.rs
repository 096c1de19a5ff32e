use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::Compression;
use flate2::write::GzEncoder;

use covblocks_core::{ChromosomeRegistry, StrandClass};
use covblocks_depth::DepthTrack;

use crate::consts::{COV_FORMAT_VERSION, COV_MAGIC};
use crate::error::{CovError, Result};

/// Where one compressed track lives in the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackIndex {
    pub offset: u64,
    pub compressed_len: u64,
    pub n_runs: u32,
}

impl TrackIndex {
    pub fn is_empty(&self) -> bool {
        self.compressed_len == 0
    }
}

/// Index slot of a `(ref_id, class)` pair.
pub(crate) fn slot(ref_id: u32, class: StrandClass) -> usize {
    ref_id as usize * StrandClass::ALL.len() + class.index()
}

///
/// Append-only COV container writer.
///
/// Layout:
/// - header: magic, version, chromosome count, then per chromosome in registry order
///   `ref_id (u32)`, `name length (u32)`, `name`, `length (u32)`
/// - one gzip member per written track holding `n_runs (u32)` followed by
///   `(position delta, depth)` pairs of u32
/// - index: one entry per `(ref_id, class)` slot, in ref id then class order
/// - footer: byte offset of the index (u64)
///
/// All integers are little endian. Tracks that were never written keep an empty
/// index entry.
///
pub struct CovWriter<W: Write> {
    writer: W,
    offset: u64,
    n_chroms: usize,
    index: Vec<Option<TrackIndex>>,
}

impl<W: Write> CovWriter<W> {
    pub fn new(mut writer: W, registry: &ChromosomeRegistry) -> Result<Self> {
        writer.write_all(COV_MAGIC)?;
        writer.write_u8(COV_FORMAT_VERSION)?;
        writer.write_u32::<LittleEndian>(registry.len() as u32)?;
        let mut offset = COV_MAGIC.len() as u64 + 1 + 4;

        for entry in registry.iter() {
            let name = entry.name.as_bytes();
            writer.write_u32::<LittleEndian>(entry.ref_id)?;
            writer.write_u32::<LittleEndian>(name.len() as u32)?;
            writer.write_all(name)?;
            writer.write_u32::<LittleEndian>(entry.length)?;
            offset += 4 + 4 + name.len() as u64 + 4;
        }

        Ok(CovWriter {
            writer,
            offset,
            n_chroms: registry.len(),
            index: vec![None; registry.len() * StrandClass::ALL.len()],
        })
    }

    ///
    /// Compress and append one track. Each `(ref_id, class)` may be written once.
    ///
    pub fn write_track(&mut self, ref_id: u32, class: StrandClass, track: &DepthTrack) -> Result<()> {
        if ref_id as usize >= self.n_chroms {
            return Err(CovError::UnknownRefId(ref_id));
        }
        let slot = slot(ref_id, class);
        if self.index[slot].is_some() {
            return Err(CovError::DuplicateTrack { ref_id, class });
        }

        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_u32::<LittleEndian>(track.len() as u32)?;
        let mut previous = 0u32;
        for run in track.runs() {
            encoder.write_u32::<LittleEndian>(run.position - previous)?;
            encoder.write_u32::<LittleEndian>(run.depth)?;
            previous = run.position;
        }
        let compressed = encoder.finish()?;

        self.writer.write_all(&compressed)?;
        self.index[slot] = Some(TrackIndex {
            offset: self.offset,
            compressed_len: compressed.len() as u64,
            n_runs: track.len() as u32,
        });
        self.offset += compressed.len() as u64;

        Ok(())
    }

    ///
    /// Write the index and footer, flush, and hand back the underlying writer.
    ///
    pub fn finish(mut self) -> Result<W> {
        let index_offset = self.offset;
        for entry in &self.index {
            let entry = entry.unwrap_or_default();
            self.writer.write_u64::<LittleEndian>(entry.offset)?;
            self.writer.write_u64::<LittleEndian>(entry.compressed_len)?;
            self.writer.write_u32::<LittleEndian>(entry.n_runs)?;
        }
        self.writer.write_u64::<LittleEndian>(index_offset)?;
        self.writer.flush()?;

        Ok(self.writer)
    }
}
