//! Core models shared by every covblocks crate.
//!
//! The [`ChromosomeRegistry`](models::ChromosomeRegistry) is established once, before any
//! fragment is ingested, and fixes the numeric reference id used to index every
//! per-chromosome vector downstream. [`Strand`](models::Strand) and
//! [`StrandClass`](models::StrandClass) describe which of the three depth tracks a
//! fragment block contributes to.
pub mod errors;
pub mod models;
pub mod utils;

// re-export for cleaner imports
pub use errors::CoreError;
pub use models::{ChromEntry, ChromosomeRegistry, Fragment, FragmentBlock, Strand, StrandClass};
