use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle};
use log::info;

use covblocks_core::StrandClass;
use covblocks_depth::DepthSource;

use crate::error::Result;
use crate::writer::CovWriter;

///
/// Persist finalized depth tracks as a COV container.
///
/// Implemented for every [`DepthSource`], so a live accumulator and a reloaded
/// container are written the same way.
///
pub trait CovWrite {
    ///
    /// Write every chromosome's three strand-class tracks, in registry order.
    ///
    /// # Arguments
    /// - writer: destination of the container
    /// - verbose: show a per-chromosome progress bar
    fn write_cov<W: Write>(&self, writer: W, verbose: bool) -> Result<W>;

    ///
    /// Write the container to `path`, creating parent directories as needed.
    ///
    fn write_cov_file(&self, path: &Path, verbose: bool) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        self.write_cov(BufWriter::with_capacity(1024 * 1024, file), verbose)?;
        info!("Wrote COV container to {}", path.display());
        Ok(())
    }
}

impl<T: DepthSource + ?Sized> CovWrite for T {
    fn write_cov<W: Write>(&self, writer: W, verbose: bool) -> Result<W> {
        let registry = self.registry();
        let mut cov = CovWriter::new(writer, registry)?;

        let pb = if verbose {
            ProgressBar::new(registry.len() as u64)
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) =
            ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")
        {
            pb.set_style(style.progress_chars("##-"));
        }

        info!("Writing depth tracks for {} chromosomes", registry.len());
        for entry in registry.iter() {
            pb.set_message(entry.name.clone());
            for class in StrandClass::ALL {
                if let Some(track) = self.track(entry.ref_id, class)? {
                    cov.write_track(entry.ref_id, class, track)?;
                }
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        cov.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;
    use std::sync::Arc;

    use covblocks_core::{ChromosomeRegistry, Fragment, Strand};
    use covblocks_depth::FragmentsMap;
    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::consts::COV_FILE_EXTENSION;
    use crate::error::CovError;
    use crate::reader::CovReader;

    #[fixture]
    fn map() -> FragmentsMap {
        let registry = Arc::new(ChromosomeRegistry::from_sizes(&[("chr1", 500), ("chr2", 300)]).unwrap());
        let mut map = FragmentsMap::new(registry);
        map.ingest(&Fragment::contiguous(0, Strand::Forward, 10, 60)).unwrap();
        map.ingest(&Fragment::contiguous(1, Strand::Reverse, 20, 90)).unwrap();
        map
    }

    #[rstest]
    fn test_unfinalized_map_is_rejected(map: FragmentsMap) {
        assert!(matches!(map.write_cov(Vec::new(), false), Err(CovError::Depth(_))));
    }

    #[rstest]
    fn test_write_file_and_reload(mut map: FragmentsMap) {
        map.finalize();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join(format!("sample.{COV_FILE_EXTENSION}"));
        map.write_cov_file(&path, false).unwrap();

        let mut reader = CovReader::open(&path).unwrap();
        for class in StrandClass::ALL {
            assert_eq!(
                reader.histogram("chr2", 0, 300, class).unwrap(),
                map.query("chr2", 0, 300, class).unwrap()
            );
        }
    }

    #[rstest]
    fn test_reloaded_tracks_write_identically(mut map: FragmentsMap) {
        map.finalize();
        let first = map.write_cov(Vec::new(), false).unwrap();
        let tracks = CovReader::new(Cursor::new(first.clone())).unwrap().load_all().unwrap();
        let second = tracks.write_cov(Vec::new(), false).unwrap();
        assert_eq!(first, second);
    }
}
