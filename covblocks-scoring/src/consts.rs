/// Central percentage kept by the primary trimmed-mean depth estimate.
pub const DEFAULT_TRIM_CENTER: u32 = 40;

/// Flank windows start this many bases inside the intron.
pub const FLANK_OFFSET: u32 = 5;
pub const FLANK_WIDTH: u32 = 50;

// status thresholds
pub const MIN_TOTAL_COVER: f64 = 10.0;
pub const MIN_EXACT_SPLICING: u32 = 4;
pub const MINOR_ISOFORM_RATIO: f64 = 1.333_333_33;
pub const NON_UNIFORM_MARGIN: f64 = 2.0;
pub const NON_UNIFORM_RATIO: f64 = 1.5;

pub const DIRECTIONAL_PREFIX: &str = "dir";
pub const NON_DIRECTIONAL_PREFIX: &str = "nd";

pub const CLEAN_TAG_PREFIX: &str = "clean";
pub const KNOWN_EXON_TAG: &str = "known-exon";

/// Number of leading `/`-separated fields read from a composite feature name.
pub const COMPOSITE_NAME_FIELDS: usize = 10;

/// Report columns after the leading chromosome column.
pub const REPORT_COLUMNS: &[&str] = &[
    "Start",
    "End",
    "Name",
    "Null",
    "Strand",
    "ExcludedBases",
    "Coverage",
    "IntronDepth",
    "IntronDepth25Percentile",
    "IntronDepth50Percentile",
    "IntronDepth75Percentile",
    "ExonToIntronReadsLeft",
    "ExonToIntronReadsRight",
    "IntronDepthFirst50bp",
    "IntronDepthLast50bp",
    "SpliceLeft",
    "SpliceRight",
    "SpliceExact",
    "IRratio",
    "Warnings",
];
