use covblocks_core::{ChromosomeRegistry, StrandClass};

use crate::errors::{DepthError, Result};
use crate::histogram::DepthHistogram;

///
/// A depth breakpoint: `depth` holds from `position` up to, but not including,
/// the next run's position.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthRun {
    pub position: u32,
    pub depth: u32,
}

impl DepthRun {
    pub fn new(position: u32, depth: u32) -> Self {
        DepthRun { position, depth }
    }
}

///
/// Finalized run-length depth for one chromosome and strand class.
///
/// Runs are strictly increasing in position and no two consecutive runs share a
/// depth. Positions before the first run have depth zero, as does everything after
/// a trailing zero run.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepthTrack {
    runs: Vec<DepthRun>,
}

impl DepthTrack {
    ///
    /// Sort delta events and sweep them into runs.
    ///
    /// A running depth is kept across the sorted events; a run is emitted only when the
    /// summed depth at a position differs from the last emitted one.
    ///
    pub fn from_deltas(mut deltas: Vec<(u32, i64)>) -> DepthTrack {
        deltas.sort_unstable_by_key(|&(position, _)| position);

        let mut runs: Vec<DepthRun> = Vec::new();
        let mut depth: i64 = 0;
        let mut emitted: i64 = 0;

        for group in deltas.chunk_by(|a, b| a.0 == b.0) {
            depth += group.iter().map(|&(_, delta)| delta).sum::<i64>();
            debug_assert!(depth >= 0, "depth went negative at {}", group[0].0);

            if depth != emitted {
                runs.push(DepthRun::new(group[0].0, depth.clamp(0, u32::MAX as i64) as u32));
                emitted = depth;
            }
        }

        DepthTrack { runs }
    }

    ///
    /// Wrap an already collapsed run list, checking the run invariants.
    ///
    pub fn from_runs(runs: Vec<DepthRun>) -> Result<DepthTrack> {
        for pair in runs.windows(2) {
            if pair[1].position <= pair[0].position {
                return Err(DepthError::InvalidTrack(format!(
                    "run positions not strictly increasing at {}",
                    pair[1].position
                )));
            }
            if pair[1].depth == pair[0].depth {
                return Err(DepthError::InvalidTrack(format!(
                    "consecutive runs share depth {} at {}",
                    pair[1].depth, pair[1].position
                )));
            }
        }
        Ok(DepthTrack { runs })
    }

    pub fn runs(&self) -> &[DepthRun] {
        &self.runs
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    ///
    /// The run list turned back into delta events, one per breakpoint.
    ///
    pub fn to_deltas(&self) -> impl Iterator<Item = (u32, i64)> + '_ {
        let mut previous = 0i64;
        self.runs.iter().map(move |run| {
            let delta = run.depth as i64 - previous;
            previous = run.depth as i64;
            (run.position, delta)
        })
    }

    pub fn depth_at(&self, position: u32) -> u32 {
        let idx = self.runs.partition_point(|run| run.position <= position);
        if idx == 0 { 0 } else { self.runs[idx - 1].depth }
    }

    ///
    /// Add the bases of `[start, end)` to `hist`, bucketed by depth.
    ///
    /// Binary search finds the run covering `start`; the walk then moves forward one
    /// run at a time until the cursor reaches `end`.
    ///
    pub fn accumulate(&self, hist: &mut DepthHistogram, start: u32, end: u32) {
        if start >= end {
            return;
        }

        let mut idx = self.runs.partition_point(|run| run.position <= start);
        let mut depth = if idx == 0 { 0 } else { self.runs[idx - 1].depth };
        let mut cursor = start;

        while cursor < end {
            match self.runs.get(idx) {
                Some(next) if next.position < end => {
                    hist.add(depth, (next.position - cursor) as u64);
                    cursor = next.position;
                    depth = next.depth;
                    idx += 1;
                }
                _ => {
                    hist.add(depth, (end - cursor) as u64);
                    cursor = end;
                }
            }
        }
    }

    ///
    /// Contiguous `(start, end, depth)` segments tiling `[0, chrom_len)`.
    ///
    pub fn segments(&self, chrom_len: u32) -> Vec<(u32, u32, u32)> {
        let mut segments = Vec::with_capacity(self.runs.len() + 1);
        let mut cursor = 0u32;
        let mut depth = 0u32;

        for run in self.runs.iter().take_while(|run| run.position < chrom_len) {
            if run.position > cursor {
                segments.push((cursor, run.position, depth));
            }
            cursor = run.position;
            depth = run.depth;
        }
        if cursor < chrom_len {
            segments.push((cursor, chrom_len, depth));
        }
        segments
    }
}

///
/// Anything that can hand out finalized depth tracks by chromosome and strand class:
/// a live [`FragmentsMap`](crate::FragmentsMap) or a reloaded track container.
///
/// Implementors must be safe to share across scoring workers.
///
pub trait DepthSource: Sync {
    fn registry(&self) -> &ChromosomeRegistry;

    /// The finalized track, or `None` when nothing was recorded for it.
    fn track(&self, ref_id: u32, class: StrandClass) -> Result<Option<&DepthTrack>>;

    ///
    /// Add the depth histogram of `chrom:[start, end)` to `hist`.
    ///
    /// Chromosomes missing from the registry, and tracks with no data, count as zero
    /// coverage over the whole interval.
    ///
    fn fill_histogram(
        &self,
        hist: &mut DepthHistogram,
        chrom: &str,
        start: u32,
        end: u32,
        class: StrandClass,
    ) -> Result<()> {
        if start >= end {
            return Ok(());
        }
        let track = match self.registry().ref_id(chrom) {
            Some(ref_id) => self.track(ref_id, class)?,
            None => None,
        };
        match track {
            Some(track) => track.accumulate(hist, start, end),
            None => hist.add(0, (end - start) as u64),
        }
        Ok(())
    }

    fn query(&self, chrom: &str, start: u32, end: u32, class: StrandClass) -> Result<DepthHistogram> {
        let mut hist = DepthHistogram::new();
        self.fill_histogram(&mut hist, chrom, start, end, class)?;
        Ok(hist)
    }
}
