//! Read-time lookup services the scorer consumes.
//!
//! Splice-junction counting and spanning-point indices are built elsewhere; the
//! scorer only queries them by coordinate. `strand` is `None` when scoring a
//! non-directional library, in which case implementors sum both strands.

use fxhash::FxHashMap;

use covblocks_core::Strand;

pub trait JunctionLookup: Sync {
    /// Reads spliced exactly from `start` to `end`.
    fn exact(&self, chrom: &str, start: u32, end: u32, strand: Option<Strand>) -> u32;

    /// Reads with a junction starting at `pos`, whatever its end.
    fn left(&self, chrom: &str, pos: u32, strand: Option<Strand>) -> u32;

    /// Reads with a junction ending at `pos`, whatever its start.
    fn right(&self, chrom: &str, pos: u32, strand: Option<Strand>) -> u32;
}

pub trait SpanLookup: Sync {
    /// Reads crossing `pos` without a splice at it.
    fn lookup(&self, chrom: &str, pos: u32, strand: Option<Strand>) -> u32;
}

fn strand_sum(counts: &[u32; 2], strand: Option<Strand>) -> u32 {
    match strand {
        Some(Strand::Reverse) => counts[0],
        Some(Strand::Forward) => counts[1],
        None => counts[0] + counts[1],
    }
}

fn strand_slot(strand: Strand) -> usize {
    if strand.is_forward() { 1 } else { 0 }
}

///
/// In-memory junction counts keyed by `(chrom, start, end)`, per strand.
///
#[derive(Debug, Clone, Default)]
pub struct JunctionTable {
    exact: FxHashMap<(String, u32, u32), [u32; 2]>,
    left: FxHashMap<(String, u32), [u32; 2]>,
    right: FxHashMap<(String, u32), [u32; 2]>,
}

impl JunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, chrom: &str, start: u32, end: u32, strand: Strand, count: u32) {
        let slot = strand_slot(strand);
        self.exact.entry((chrom.to_string(), start, end)).or_default()[slot] += count;
        self.left.entry((chrom.to_string(), start)).or_default()[slot] += count;
        self.right.entry((chrom.to_string(), end)).or_default()[slot] += count;
    }
}

impl JunctionLookup for JunctionTable {
    fn exact(&self, chrom: &str, start: u32, end: u32, strand: Option<Strand>) -> u32 {
        self.exact
            .get(&(chrom.to_string(), start, end))
            .map(|c| strand_sum(c, strand))
            .unwrap_or(0)
    }

    fn left(&self, chrom: &str, pos: u32, strand: Option<Strand>) -> u32 {
        self.left
            .get(&(chrom.to_string(), pos))
            .map(|c| strand_sum(c, strand))
            .unwrap_or(0)
    }

    fn right(&self, chrom: &str, pos: u32, strand: Option<Strand>) -> u32 {
        self.right
            .get(&(chrom.to_string(), pos))
            .map(|c| strand_sum(c, strand))
            .unwrap_or(0)
    }
}

///
/// In-memory spanning-read counts keyed by `(chrom, pos)`, per strand.
///
#[derive(Debug, Clone, Default)]
pub struct SpanTable {
    counts: FxHashMap<(String, u32), [u32; 2]>,
}

impl SpanTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, chrom: &str, pos: u32, strand: Strand, count: u32) {
        self.counts.entry((chrom.to_string(), pos)).or_default()[strand_slot(strand)] += count;
    }
}

impl SpanLookup for SpanTable {
    fn lookup(&self, chrom: &str, pos: u32, strand: Option<Strand>) -> u32 {
        self.counts
            .get(&(chrom.to_string(), pos))
            .map(|c| strand_sum(c, strand))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_junction_table() {
        let mut table = JunctionTable::new();
        table.add("chr1", 100, 200, Strand::Forward, 5);
        table.add("chr1", 100, 300, Strand::Reverse, 2);

        assert_eq!(table.exact("chr1", 100, 200, None), 5);
        assert_eq!(table.exact("chr1", 100, 200, Some(Strand::Reverse)), 0);
        assert_eq!(table.left("chr1", 100, None), 7);
        assert_eq!(table.left("chr1", 100, Some(Strand::Reverse)), 2);
        assert_eq!(table.right("chr1", 300, Some(Strand::Reverse)), 2);
        assert_eq!(table.right("chr2", 300, None), 0);
    }

    #[rstest]
    fn test_span_table() {
        let mut table = SpanTable::new();
        table.add("chr1", 150, Strand::Forward, 3);
        table.add("chr1", 150, Strand::Reverse, 4);
        assert_eq!(table.lookup("chr1", 150, None), 7);
        assert_eq!(table.lookup("chr1", 150, Some(Strand::Forward)), 3);
        assert_eq!(table.lookup("chr1", 151, None), 0);
    }
}
