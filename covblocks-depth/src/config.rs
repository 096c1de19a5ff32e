#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_COMPACTION_BATCH;

///
/// Tuning knobs for a [`FragmentsMap`](crate::FragmentsMap).
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AccumulatorConfig {
    /// Compact pending delta events every this many fragments. Affects memory
    /// and timing only, never the finalized depth.
    pub compaction_batch: u64,
}

impl Default for AccumulatorConfig {
    fn default() -> Self {
        AccumulatorConfig {
            compaction_batch: DEFAULT_COMPACTION_BATCH,
        }
    }
}
