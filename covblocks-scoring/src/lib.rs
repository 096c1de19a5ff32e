//! Scores named, multi-block genomic features (introns) against finalized depth.
//!
//! Each feature's sub-blocks are queried as depth histograms, summarized with a
//! trimmed mean, coverage fraction and quartiles, then combined with splice-junction
//! and exon-intron crossing counts from external lookups into an intron-retention
//! ratio and a QC status. Any [`DepthSource`](covblocks_depth::DepthSource) works: a
//! live accumulator or a reloaded COV container.
//!
//! Features are BED12 lines whose name column is a composite key, parsed into a
//! [`FeatureName`]:
//!
//! ```text
//! nd/SAMD11/ENSG00000187634/+/2/860569/861301/732/121/anti-over
//! ```
//!
//! mode, gene symbol, gene id, strand, intron index, intron start, intron end, total
//! length, excluded bases and type tag.
pub mod config;
pub mod consts;
pub mod coverage_blocks;
pub mod errors;
pub mod feature;
pub mod lookups;
pub mod report;
pub mod scorer;

// re-exports
pub use config::{Directionality, ScoringConfig};
pub use coverage_blocks::{CoverageBlocks, LoadedFeatures, load_features, load_features_from_path};
pub use errors::{FeatureError, Result, ScoringError};
pub use feature::{Feature, FeatureCategory, FeatureMode, FeatureName, parse_feature_line};
pub use lookups::{JunctionLookup, JunctionTable, SpanLookup, SpanTable};
pub use report::{QcSums, ScoringReport};
pub use scorer::{IntronStatus, ReportRow, format_float, ir_ratio, score_feature};
