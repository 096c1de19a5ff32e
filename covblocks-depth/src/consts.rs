/// Fragments ingested between two automatic compactions of the pending delta buffer.
pub const DEFAULT_COMPACTION_BATCH: u64 = 1_000_000;

/// Number of strand classes tracked per chromosome.
pub const N_STRAND_CLASSES: usize = 3;
