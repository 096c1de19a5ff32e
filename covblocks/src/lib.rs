//! # covblocks
//!
//! Read-depth accumulation over reference chromosomes, a compressed binary
//! coverage track format, and per-intron coverage scoring.
//!
//! Each part lives in its own crate and is re-exported here behind a feature flag.

#[cfg(feature = "core")]
#[doc(inline)]
pub use covblocks_core as core;

#[cfg(feature = "depth")]
#[doc(inline)]
pub use covblocks_depth as depth;

#[cfg(feature = "io")]
#[doc(inline)]
pub use covblocks_io as io;

#[cfg(feature = "scoring")]
#[doc(inline)]
pub use covblocks_scoring as scoring;
