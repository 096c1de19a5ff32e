use std::sync::Arc;

use covblocks_core::{ChromosomeRegistry, StrandClass};
use covblocks_depth::{DepthError, DepthSource, DepthTrack};

///
/// Every track of a COV container held in memory.
///
/// Serves depth queries exactly like the finalized accumulator it was written from,
/// so it can stand in for one during scoring.
///
#[derive(Debug, Clone)]
pub struct CovTracks {
    registry: Arc<ChromosomeRegistry>,
    // [class][ref_id]
    tracks: Vec<Vec<Option<DepthTrack>>>,
}

impl CovTracks {
    pub fn empty(registry: Arc<ChromosomeRegistry>) -> Self {
        let tracks = StrandClass::ALL
            .iter()
            .map(|_| vec![None; registry.len()])
            .collect();
        CovTracks { registry, tracks }
    }

    pub(crate) fn insert(&mut self, ref_id: u32, class: StrandClass, track: DepthTrack) {
        if let Some(slot) = self.tracks[class.index()].get_mut(ref_id as usize) {
            *slot = Some(track);
        }
    }
}

impl DepthSource for CovTracks {
    fn registry(&self) -> &ChromosomeRegistry {
        &self.registry
    }

    fn track(&self, ref_id: u32, class: StrandClass) -> Result<Option<&DepthTrack>, DepthError> {
        Ok(self.tracks[class.index()]
            .get(ref_id as usize)
            .and_then(|track| track.as_ref()))
    }
}
