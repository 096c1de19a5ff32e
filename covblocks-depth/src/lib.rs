//! Per-base read depth over a genome, without a per-base array.
//!
//! Fragment blocks are ingested into a [`FragmentsMap`] as unsorted `+1`/`-1` delta
//! events. Ingestion is cheap and shards freely: one map per worker, merged with
//! [`FragmentsMap::combine`]. A single [`FragmentsMap::finalize`] pass then sorts the
//! events and sweeps them into run-length [`DepthTrack`]s, which answer region queries
//! as a [`DepthHistogram`] (depth -> number of bases).
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use covblocks_core::{ChromosomeRegistry, Fragment, Strand, StrandClass};
//! use covblocks_depth::{DepthSource, FragmentsMap};
//!
//! let registry = Arc::new(ChromosomeRegistry::from_sizes(&[("chr1", 1000)]).unwrap());
//! let mut map = FragmentsMap::new(registry);
//!
//! map.ingest(&Fragment::contiguous(0, Strand::Forward, 100, 200)).unwrap();
//! map.ingest(&Fragment::contiguous(0, Strand::Forward, 150, 250)).unwrap();
//! map.finalize();
//!
//! let hist = map.query("chr1", 100, 250, StrandClass::Forward).unwrap();
//! assert_eq!(hist.count(1), 100);
//! assert_eq!(hist.count(2), 50);
//! ```
pub mod config;
pub mod consts;
pub mod errors;
pub mod exclusions;
pub mod fragments_map;
pub mod histogram;
pub mod sharded;
pub mod track;

// re-exports
pub use config::AccumulatorConfig;
pub use errors::{DepthError, Result};
pub use exclusions::write_low_coverage_regions;
pub use fragments_map::FragmentsMap;
pub use histogram::DepthHistogram;
pub use sharded::accumulate_sharded;
pub use track::{DepthRun, DepthSource, DepthTrack};
