use std::mem;
use std::sync::Arc;

use log::{debug, info};
use rayon::prelude::*;

use covblocks_core::{ChromosomeRegistry, Fragment, StrandClass};

use crate::config::AccumulatorConfig;
use crate::consts::N_STRAND_CLASSES;
use crate::errors::{DepthError, Result};
use crate::track::{DepthSource, DepthTrack};

type Deltas = Vec<(u32, i64)>;

///
/// Per-chromosome, per-strand-class depth accumulator.
///
/// Every storage vector is indexed first by [`StrandClass::index`] and then by
/// chromosome ref id. Ingestion only appends delta events; nothing is ordered until
/// [`FragmentsMap::finalize`].
///
#[derive(Debug, Clone)]
pub struct FragmentsMap {
    registry: Arc<ChromosomeRegistry>,
    config: AccumulatorConfig,
    // raw events since the last compaction
    pending: Vec<Vec<Deltas>>,
    // sorted, position-unique, non-zero net deltas
    compacted: Vec<Vec<Deltas>>,
    finalized: Vec<Vec<DepthTrack>>,
    is_finalized: bool,
    fragment_count: u64,
}

fn per_class_storage<T: Clone + Default>(n_chroms: usize) -> Vec<Vec<T>> {
    (0..N_STRAND_CLASSES)
        .map(|_| vec![T::default(); n_chroms])
        .collect()
}

///
/// Sort delta events and merge the ones sharing a position, dropping net-zero
/// positions.
///
fn collapse(deltas: &mut Deltas) {
    deltas.sort_unstable_by_key(|&(position, _)| position);

    let collapsed: Deltas = deltas
        .chunk_by(|a, b| a.0 == b.0)
        .map(|group| (group[0].0, group.iter().map(|&(_, d)| d).sum::<i64>()))
        .filter(|&(_, delta)| delta != 0)
        .collect();

    *deltas = collapsed;
}

///
/// Linear merge of two collapsed delta lists into one collapsed list.
///
fn merge_collapsed(a: Deltas, b: Deltas) -> Deltas {
    if a.is_empty() {
        return b;
    }
    if b.is_empty() {
        return a;
    }

    let mut merged = Vec::with_capacity(a.len() + b.len());
    let mut a = a.into_iter().peekable();
    let mut b = b.into_iter().peekable();
    loop {
        let next = match (a.peek(), b.peek()) {
            (Some(&(pa, da)), Some(&(pb, db))) => {
                if pa < pb {
                    a.next();
                    (pa, da)
                } else if pb < pa {
                    b.next();
                    (pb, db)
                } else {
                    a.next();
                    b.next();
                    (pa, da + db)
                }
            }
            (Some(_), None) => {
                merged.extend(a.by_ref());
                break;
            }
            (None, Some(_)) => {
                merged.extend(b.by_ref());
                break;
            }
            (None, None) => break,
        };
        if next.1 != 0 {
            merged.push(next);
        }
    }
    merged
}

impl FragmentsMap {
    pub fn new(registry: Arc<ChromosomeRegistry>) -> Self {
        FragmentsMap::with_config(registry, AccumulatorConfig::default())
    }

    pub fn with_config(registry: Arc<ChromosomeRegistry>, config: AccumulatorConfig) -> Self {
        let n_chroms = registry.len();
        FragmentsMap {
            registry,
            config,
            pending: per_class_storage(n_chroms),
            compacted: per_class_storage(n_chroms),
            finalized: per_class_storage(n_chroms),
            is_finalized: false,
            fragment_count: 0,
        }
    }

    pub fn registry(&self) -> &Arc<ChromosomeRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &AccumulatorConfig {
        &self.config
    }

    pub fn is_finalized(&self) -> bool {
        self.is_finalized
    }

    /// Number of fragments ingested, summed over every combined shard.
    pub fn fragment_count(&self) -> u64 {
        self.fragment_count
    }

    ///
    /// Record one fragment.
    ///
    /// Each block adds a `+1` event at its start and a `-1` event at its end, both in
    /// the fragment's own strand track and in the combined track.
    ///
    pub fn ingest(&mut self, fragment: &Fragment) -> Result<()> {
        if self.is_finalized {
            return Err(DepthError::AlreadyFinalized);
        }
        let chrom = self
            .registry
            .by_ref_id(fragment.ref_id)
            .ok_or(DepthError::UnknownRefId(fragment.ref_id))?;
        let ref_id = fragment.ref_id as usize;

        // validate every block before recording any of them
        let intervals = fragment.intervals()?;
        if let Some(&(start, end)) = intervals.iter().find(|&&(_, end)| end > chrom.length) {
            return Err(DepthError::BlockOutOfBounds {
                chrom: chrom.name.clone(),
                start,
                end,
                length: chrom.length,
            });
        }

        let stranded = StrandClass::from(fragment.strand).index();
        let combined = StrandClass::Combined.index();

        for (start, end) in intervals {
            for class in [stranded, combined] {
                let events = &mut self.pending[class][ref_id];
                events.push((start, 1));
                events.push((end, -1));
            }
        }

        self.fragment_count += 1;
        if self.fragment_count % self.config.compaction_batch.max(1) == 0 {
            self.compact_pending();
            debug!("Compacted delta buffers after {} fragments", self.fragment_count);
        }
        Ok(())
    }

    /// Ingest every fragment of `fragments`, stopping at the first error.
    pub fn ingest_all<'a, I>(&mut self, fragments: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Fragment>,
    {
        for fragment in fragments {
            self.ingest(fragment)?;
        }
        Ok(())
    }

    ///
    /// Fold the pending event buffers into the compacted lists and clear them.
    ///
    fn compact_pending(&mut self) {
        for (pending, compacted) in self.pending.iter_mut().zip(self.compacted.iter_mut()) {
            pending
                .par_iter_mut()
                .zip(compacted.par_iter_mut())
                .filter(|(events, _)| !events.is_empty())
                .for_each(|(events, net)| {
                    // only the new batch is sorted; the running list is merged linearly
                    let mut batch = mem::take(events);
                    collapse(&mut batch);
                    *net = merge_collapsed(mem::take(net), batch);
                });
        }
    }

    ///
    /// Turn finalized tracks back into delta events so they can be merged again.
    ///
    fn reopen(&mut self) {
        for (tracks, compacted) in self.finalized.iter_mut().zip(self.compacted.iter_mut()) {
            for (track, net) in tracks.iter_mut().zip(compacted.iter_mut()) {
                let deltas: Deltas = track.to_deltas().filter(|&(_, delta)| delta != 0).collect();
                *net = merge_collapsed(mem::take(net), deltas);
                *track = DepthTrack::default();
            }
        }
        self.is_finalized = false;
    }

    ///
    /// Merge another accumulator's state into this one.
    ///
    /// Two non-finalized maps simply concatenate their event buffers. Two finalized
    /// maps are both reopened and must be finalized again. Combining a finalized map
    /// with a non-finalized one is rejected.
    ///
    pub fn combine(&mut self, mut other: FragmentsMap) -> Result<()> {
        if !Arc::ptr_eq(&self.registry, &other.registry)
            && !self.registry.is_compatible(&other.registry)
        {
            return Err(DepthError::RegistryMismatch);
        }

        match (self.is_finalized, other.is_finalized) {
            (false, false) => {}
            (true, true) => {
                self.reopen();
                other.reopen();
                info!("Reopened finalized depth tracks for combine");
            }
            _ => return Err(DepthError::MixedFinalizeState),
        }

        for (mine, theirs) in self.pending.iter_mut().zip(other.pending.iter_mut()) {
            for (a, b) in mine.iter_mut().zip(theirs.iter_mut()) {
                a.append(b);
            }
        }
        for (mine, theirs) in self.compacted.iter_mut().zip(other.compacted.iter_mut()) {
            for (a, b) in mine.iter_mut().zip(theirs.iter_mut()) {
                *a = merge_collapsed(mem::take(a), mem::take(b));
            }
        }
        self.fragment_count += other.fragment_count;

        Ok(())
    }

    ///
    /// Sort all events and sweep them into run-length tracks.
    ///
    /// Calling this on an already finalized map does nothing.
    ///
    pub fn finalize(&mut self) {
        if self.is_finalized {
            return;
        }
        self.compact_pending();

        for (compacted, tracks) in self.compacted.iter_mut().zip(self.finalized.iter_mut()) {
            compacted
                .par_iter_mut()
                .zip(tracks.par_iter_mut())
                .for_each(|(net, track)| {
                    *track = DepthTrack::from_deltas(mem::take(net));
                });
        }
        self.is_finalized = true;

        let n_runs: usize = self.finalized.iter().flatten().map(|t| t.len()).sum();
        info!(
            "Finalized depth for {} fragments over {} chromosomes ({} runs)",
            self.fragment_count,
            self.registry.len(),
            n_runs
        );
    }

    ///
    /// All finalized tracks of one strand class, indexed by ref id.
    ///
    pub fn tracks(&self, class: StrandClass) -> Result<&[DepthTrack]> {
        if !self.is_finalized {
            return Err(DepthError::NotFinalized);
        }
        Ok(&self.finalized[class.index()])
    }
}

impl DepthSource for FragmentsMap {
    fn registry(&self) -> &ChromosomeRegistry {
        &self.registry
    }

    fn track(&self, ref_id: u32, class: StrandClass) -> Result<Option<&DepthTrack>> {
        Ok(self.tracks(class)?.get(ref_id as usize))
    }
}
