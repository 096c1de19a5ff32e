use crate::errors::CoreError;
use crate::models::Strand;

///
/// One contiguous aligned sub-interval of a fragment, relative to the
/// fragment start.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentBlock {
    pub offset: u32,
    pub length: u32,
}

///
/// A sequenced fragment as handed over by the alignment parser: the
/// chromosome it maps to, its strand, and the ordered list of aligned blocks.
/// Spliced alignments carry more than one block.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub ref_id: u32,
    pub strand: Strand,
    pub start: u32,
    pub blocks: Vec<FragmentBlock>,
}

impl Fragment {
    pub fn new(ref_id: u32, strand: Strand, start: u32, blocks: Vec<FragmentBlock>) -> Self {
        Fragment {
            ref_id,
            strand,
            start,
            blocks,
        }
    }

    /// An unspliced fragment covering `[start, end)`.
    pub fn contiguous(ref_id: u32, strand: Strand, start: u32, end: u32) -> Self {
        Fragment {
            ref_id,
            strand,
            start,
            blocks: vec![FragmentBlock {
                offset: 0,
                length: end.saturating_sub(start),
            }],
        }
    }

    ///
    /// Absolute `[start, end)` coordinates of every non-empty block.
    ///
    /// Fails if any block end does not fit in a `u32` coordinate.
    ///
    pub fn intervals(&self) -> Result<Vec<(u32, u32)>, CoreError> {
        self.blocks
            .iter()
            .filter(|b| b.length > 0)
            .map(|b| {
                let start = self.start.checked_add(b.offset);
                let end = start.and_then(|s| s.checked_add(b.length));
                match (start, end) {
                    (Some(start), Some(end)) => Ok((start, end)),
                    _ => Err(CoreError::CoordinateOverflow {
                        start: self.start,
                        offset: b.offset,
                        length: b.length,
                    }),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_spliced_intervals() {
        let frag = Fragment::new(
            0,
            Strand::Forward,
            1000,
            vec![
                FragmentBlock { offset: 0, length: 50 },
                FragmentBlock { offset: 300, length: 0 },
                FragmentBlock { offset: 500, length: 25 },
            ],
        );
        let intervals = frag.intervals().unwrap();
        assert_eq!(intervals, vec![(1000, 1050), (1500, 1525)]);
    }

    #[rstest]
    fn test_contiguous() {
        let frag = Fragment::contiguous(2, Strand::Reverse, 10, 40);
        assert_eq!(frag.intervals().unwrap(), vec![(10, 40)]);
    }

    #[rstest]
    #[case(u32::MAX - 5, 0, 10)]
    #[case(u32::MAX - 5, 10, 1)]
    fn test_overflowing_block_is_an_error(#[case] start: u32, #[case] offset: u32, #[case] length: u32) {
        let frag = Fragment::new(0, Strand::Forward, start, vec![FragmentBlock { offset, length }]);
        assert!(matches!(
            frag.intervals(),
            Err(CoreError::CoordinateOverflow { .. })
        ));
    }
}
