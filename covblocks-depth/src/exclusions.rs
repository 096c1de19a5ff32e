use std::io::Write;

use covblocks_core::StrandClass;

use crate::errors::Result;
use crate::track::DepthSource;

///
/// Write BED3 regions where the combined depth is at most `threshold`.
///
/// Chromosomes are visited in registry order. Adjacent low-depth segments are merged
/// into one maximal region, and the final region of a chromosome extends to its
/// length. Chromosomes without any recorded data are emitted whole.
///
pub fn write_low_coverage_regions<S, W>(source: &S, writer: &mut W, threshold: u32) -> Result<()>
where
    S: DepthSource + ?Sized,
    W: Write,
{
    for entry in source.registry().iter() {
        let segments = match source.track(entry.ref_id, StrandClass::Combined)? {
            Some(track) => track.segments(entry.length),
            None if entry.length > 0 => vec![(0, entry.length, 0)],
            None => vec![],
        };

        let mut open: Option<(u32, u32)> = None;
        for (start, end, depth) in segments {
            if depth <= threshold {
                open = match open {
                    Some((s, _)) => Some((s, end)),
                    None => Some((start, end)),
                };
            } else if let Some((s, e)) = open.take() {
                writeln!(writer, "{}\t{}\t{}", entry.name, s, e)?;
            }
        }
        if let Some((s, e)) = open {
            writeln!(writer, "{}\t{}\t{}", entry.name, s, e)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use covblocks_core::{ChromosomeRegistry, Fragment, Strand};
    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::fragments_map::FragmentsMap;

    #[rstest]
    #[case(0, "chr1\t0\t10\nchr1\t40\t100\nchr2\t0\t50\n")]
    #[case(1, "chr1\t0\t20\nchr1\t30\t100\nchr2\t0\t50\n")]
    #[case(2, "chr1\t0\t100\nchr2\t0\t50\n")]
    fn test_low_coverage_regions(#[case] threshold: u32, #[case] expected: &str) {
        let registry = Arc::new(ChromosomeRegistry::from_sizes(&[("chr1", 100), ("chr2", 50)]).unwrap());
        let mut map = FragmentsMap::new(registry);
        map.ingest(&Fragment::contiguous(0, Strand::Forward, 10, 30)).unwrap();
        map.ingest(&Fragment::contiguous(0, Strand::Reverse, 20, 40)).unwrap();
        map.finalize();

        let mut out = Vec::new();
        write_low_coverage_regions(&map, &mut out, threshold).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }
}
