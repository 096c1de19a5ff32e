use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use byteorder::{LittleEndian, ReadBytesExt};
use flate2::read::GzDecoder;

use covblocks_core::{ChromEntry, ChromosomeRegistry, StrandClass};
use covblocks_depth::{DepthHistogram, DepthRun, DepthTrack};

use crate::consts::{
    COV_FORMAT_VERSION, COV_MAGIC, FOOTER_SIZE, INDEX_ENTRY_SIZE, MIN_CHROM_ENTRY_SIZE,
};
use crate::error::{CovError, Result};
use crate::tracks::CovTracks;
use crate::writer::{TrackIndex, slot};

///
/// Random-access reader for a COV container.
///
/// Opening reads the header and the index only. Each track is decompressed on
/// demand from its own gzip member, so a query touches nothing but the requested
/// `(chromosome, strand class)` track.
///
pub struct CovReader<R: Read + Seek> {
    reader: R,
    registry: Arc<ChromosomeRegistry>,
    index: Vec<TrackIndex>,
}

impl CovReader<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        CovReader::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> CovReader<R> {
    pub fn new(mut reader: R) -> Result<Self> {
        let stream_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != COV_MAGIC {
            return Err(CovError::BadMagic);
        }
        let version = reader.read_u8()?;
        if version != COV_FORMAT_VERSION {
            return Err(CovError::UnsupportedVersion(version));
        }

        // counts come from the file, so nothing is allocated from them up front
        let n_chroms = reader.read_u32::<LittleEndian>()? as u64;
        if n_chroms * MIN_CHROM_ENTRY_SIZE > stream_len {
            return Err(CovError::Corrupt(format!(
                "{n_chroms} chromosomes cannot fit in {stream_len} bytes"
            )));
        }
        let n_chroms = n_chroms as usize;

        let mut entries = Vec::new();
        for _ in 0..n_chroms {
            let ref_id = reader.read_u32::<LittleEndian>()?;
            let name_len = reader.read_u32::<LittleEndian>()? as u64;
            let mut name = Vec::new();
            (&mut reader).take(name_len).read_to_end(&mut name)?;
            if name.len() as u64 != name_len {
                return Err(CovError::Corrupt(format!(
                    "chromosome name truncated: expected {name_len} bytes, found {}",
                    name.len()
                )));
            }
            let name = String::from_utf8(name)
                .map_err(|_| CovError::Corrupt("chromosome name is not valid UTF-8".to_string()))?;
            let length = reader.read_u32::<LittleEndian>()?;
            entries.push(ChromEntry {
                name,
                length,
                ref_id,
            });
        }
        let registry = ChromosomeRegistry::new(entries)
            .map_err(|e| CovError::Corrupt(format!("invalid chromosome table: {e}")))?;

        let n_slots = n_chroms * StrandClass::ALL.len();
        let end = reader.seek(SeekFrom::End(-(FOOTER_SIZE as i64)))?;
        let index_offset = reader.read_u64::<LittleEndian>()?;
        if index_offset.checked_add(n_slots as u64 * INDEX_ENTRY_SIZE) != Some(end) {
            return Err(CovError::Corrupt(format!(
                "index at {index_offset} does not fit {n_slots} entries before the footer"
            )));
        }

        reader.seek(SeekFrom::Start(index_offset))?;
        let mut index = Vec::new();
        for _ in 0..n_slots {
            index.push(TrackIndex {
                offset: reader.read_u64::<LittleEndian>()?,
                compressed_len: reader.read_u64::<LittleEndian>()?,
                n_runs: reader.read_u32::<LittleEndian>()?,
            });
        }

        Ok(CovReader {
            reader,
            registry: Arc::new(registry),
            index,
        })
    }

    pub fn registry(&self) -> &Arc<ChromosomeRegistry> {
        &self.registry
    }

    /// Index entry of one track, if the ref id exists.
    pub fn track_index(&self, ref_id: u32, class: StrandClass) -> Option<&TrackIndex> {
        self.index.get(slot(ref_id, class))
    }

    ///
    /// Decompress a single track. Returns `None` for tracks that were never written.
    ///
    pub fn read_track(&mut self, ref_id: u32, class: StrandClass) -> Result<Option<DepthTrack>> {
        let entry = *self
            .track_index(ref_id, class)
            .ok_or(CovError::UnknownRefId(ref_id))?;
        if entry.is_empty() {
            return Ok(None);
        }

        self.reader.seek(SeekFrom::Start(entry.offset))?;
        let mut decoder = GzDecoder::new((&mut self.reader).take(entry.compressed_len));

        let n_runs = decoder.read_u32::<LittleEndian>()?;
        if n_runs != entry.n_runs {
            return Err(CovError::Corrupt(format!(
                "track {ref_id}/{class} holds {n_runs} runs, index says {}",
                entry.n_runs
            )));
        }

        let mut runs = Vec::new();
        let mut position = 0u32;
        for _ in 0..n_runs {
            let delta = decoder.read_u32::<LittleEndian>()?;
            let depth = decoder.read_u32::<LittleEndian>()?;
            position = position
                .checked_add(delta)
                .ok_or_else(|| CovError::Corrupt(format!("track {ref_id}/{class} overflows u32")))?;
            runs.push(DepthRun::new(position, depth));
        }

        Ok(Some(DepthTrack::from_runs(runs)?))
    }

    ///
    /// Depth histogram of `chrom:[start, end)`, identical to querying the live
    /// accumulator the container was written from.
    ///
    pub fn histogram(
        &mut self,
        chrom: &str,
        start: u32,
        end: u32,
        class: StrandClass,
    ) -> Result<DepthHistogram> {
        let mut hist = DepthHistogram::new();
        if start >= end {
            return Ok(hist);
        }
        let track = match self.registry.ref_id(chrom) {
            Some(ref_id) => self.read_track(ref_id, class)?,
            None => None,
        };
        match track {
            Some(track) => track.accumulate(&mut hist, start, end),
            None => hist.add(0, (end - start) as u64),
        }
        Ok(hist)
    }

    ///
    /// Decompress every track into memory.
    ///
    pub fn load_all(mut self) -> Result<CovTracks> {
        let mut tracks = CovTracks::empty(self.registry.clone());
        for ref_id in 0..self.registry.len() as u32 {
            for class in StrandClass::ALL {
                if let Some(track) = self.read_track(ref_id, class)? {
                    tracks.insert(ref_id, class, track);
                }
            }
        }
        Ok(tracks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::writer::CovWriter;

    #[fixture]
    fn container() -> Vec<u8> {
        let registry = ChromosomeRegistry::from_sizes(&[("chr1", 1000), ("chr2", 500)]).unwrap();
        let mut writer = CovWriter::new(Vec::new(), &registry).unwrap();
        let track = DepthTrack::from_deltas(vec![(100, 1), (200, -1), (150, 1), (250, -1)]);
        writer.write_track(1, StrandClass::Combined, &track).unwrap();
        writer.write_track(0, StrandClass::Reverse, &DepthTrack::default()).unwrap();
        writer.finish().unwrap()
    }

    #[rstest]
    fn test_read_single_track(container: Vec<u8>) {
        let mut reader = CovReader::new(Cursor::new(container)).unwrap();
        assert_eq!(reader.registry().by_ref_id(1).unwrap().name, "chr2");

        let track = reader.read_track(1, StrandClass::Combined).unwrap().unwrap();
        assert_eq!(
            track.runs(),
            &[
                DepthRun::new(100, 1),
                DepthRun::new(150, 2),
                DepthRun::new(200, 1),
                DepthRun::new(250, 0),
            ]
        );
        assert!(reader.read_track(1, StrandClass::Forward).unwrap().is_none());
        assert!(matches!(
            reader.read_track(7, StrandClass::Forward),
            Err(CovError::UnknownRefId(7))
        ));
    }

    #[rstest]
    fn test_empty_track_is_kept(container: Vec<u8>) {
        let mut reader = CovReader::new(Cursor::new(container)).unwrap();
        let track = reader.read_track(0, StrandClass::Reverse).unwrap().unwrap();
        assert!(track.is_empty());
    }

    #[rstest]
    fn test_histogram(container: Vec<u8>) {
        let mut reader = CovReader::new(Cursor::new(container)).unwrap();
        let hist = reader.histogram("chr2", 100, 250, StrandClass::Combined).unwrap();
        assert_eq!(hist, [(1, 100), (2, 50)].into_iter().collect());

        let unknown = reader.histogram("chrZ", 0, 30, StrandClass::Combined).unwrap();
        assert_eq!(unknown, [(0, 30)].into_iter().collect());
    }

    #[rstest]
    fn test_rejects_bad_magic(container: Vec<u8>) {
        let mut bytes = container;
        bytes[0] = b'X';
        assert!(matches!(
            CovReader::new(Cursor::new(bytes)),
            Err(CovError::BadMagic)
        ));
    }

    #[rstest]
    fn test_rejects_oversized_header() {
        let mut bytes = COV_MAGIC.to_vec();
        bytes.push(COV_FORMAT_VERSION);
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 16]);
        assert!(matches!(
            CovReader::new(Cursor::new(bytes)),
            Err(CovError::Corrupt(_))
        ));
    }

    #[rstest]
    fn test_rejects_oversized_name() {
        let mut bytes = COV_MAGIC.to_vec();
        bytes.push(COV_FORMAT_VERSION);
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        bytes.extend_from_slice(b"chr1");
        assert!(matches!(
            CovReader::new(Cursor::new(bytes)),
            Err(CovError::Corrupt(_))
        ));
    }

    #[rstest]
    fn test_rejects_truncated_container(container: Vec<u8>) {
        let mut bytes = container;
        bytes.truncate(bytes.len() - 3);
        assert!(CovReader::new(Cursor::new(bytes)).is_err());
    }
}
