//! COV containers: compressed, indexed, seekable storage for finalized depth tracks.
//!
//! A container holds, for each chromosome and strand class, one gzip-compressed run
//! list encoded as `(position delta, depth)` pairs. A trailing index maps every
//! `(chromosome, strand class)` to the byte range of its track, so
//! [`CovReader`] decompresses only what a query needs.
//!
//! Reloaded histograms are identical to those of the live accumulator.
//!
//! # Example
//!
//! ```rust
//! use std::io::Cursor;
//! use std::sync::Arc;
//! use covblocks_core::{ChromosomeRegistry, Fragment, Strand, StrandClass};
//! use covblocks_depth::FragmentsMap;
//! use covblocks_io::{CovReader, CovWrite};
//!
//! let registry = Arc::new(ChromosomeRegistry::from_sizes(&[("chr1", 1000)]).unwrap());
//! let mut map = FragmentsMap::new(registry);
//! map.ingest(&Fragment::contiguous(0, Strand::Reverse, 0, 10)).unwrap();
//! map.finalize();
//!
//! let bytes = map.write_cov(Vec::new(), false).unwrap();
//! let mut reader = CovReader::new(Cursor::new(bytes)).unwrap();
//! let hist = reader.histogram("chr1", 0, 20, StrandClass::Reverse).unwrap();
//! assert_eq!(hist.count(1), 10);
//! ```
pub mod consts;
pub mod cov_write;
pub mod error;
pub mod reader;
pub mod tracks;
pub mod writer;

// re-exports
pub use cov_write::CovWrite;
pub use error::{CovError, Result};
pub use reader::CovReader;
pub use tracks::CovTracks;
pub use writer::{CovWriter, TrackIndex};
