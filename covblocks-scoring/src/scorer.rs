use std::fmt::{self, Display};

use covblocks_core::Strand;
use covblocks_depth::{DepthHistogram, DepthSource, Result as DepthResult};

use crate::config::ScoringConfig;
use crate::consts::{
    FLANK_OFFSET, FLANK_WIDTH, MIN_EXACT_SPLICING, MIN_TOTAL_COVER, MINOR_ISOFORM_RATIO,
    NON_UNIFORM_MARGIN, NON_UNIFORM_RATIO,
};
use crate::feature::{Feature, FeatureCategory};
use crate::lookups::{JunctionLookup, SpanLookup};

///
/// Categorical QC call for one intron, checked in declaration order.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntronStatus {
    /// Exact junction reads plus intron depth below the minimum.
    LowCover,
    /// Too few reads splice exactly across the intron.
    LowSplicing,
    /// Another junction sharing one end is clearly more used.
    MinorIsoform,
    /// Exon-intron crossing reads disagree with the intron depth.
    NonUniformIntronCover,
    Ok,
}

impl IntronStatus {
    pub fn classify(
        intron_depth: f64,
        splice_left: u32,
        splice_right: u32,
        splice_exact: u32,
        span_left: u32,
        span_right: u32,
    ) -> IntronStatus {
        let max_splice = splice_left.max(splice_right) as f64;
        let max_span = span_left.max(span_right) as f64;
        let min_span = span_left.min(span_right) as f64;

        if splice_exact as f64 + intron_depth < MIN_TOTAL_COVER {
            IntronStatus::LowCover
        } else if splice_exact < MIN_EXACT_SPLICING {
            IntronStatus::LowSplicing
        } else if splice_exact as f64 * MINOR_ISOFORM_RATIO < max_splice {
            IntronStatus::MinorIsoform
        } else if (max_span > intron_depth + NON_UNIFORM_MARGIN
            && max_span > intron_depth * NON_UNIFORM_RATIO)
            || (min_span + NON_UNIFORM_MARGIN < intron_depth
                && min_span * NON_UNIFORM_RATIO < intron_depth)
        {
            IntronStatus::NonUniformIntronCover
        } else {
            IntronStatus::Ok
        }
    }
}

impl Display for IntronStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntronStatus::LowCover => write!(f, "LowCover"),
            IntronStatus::LowSplicing => write!(f, "LowSplicing"),
            IntronStatus::MinorIsoform => write!(f, "MinorIsoform"),
            IntronStatus::NonUniformIntronCover => write!(f, "NonUniformIntronCover"),
            IntronStatus::Ok => write!(f, "-"),
        }
    }
}

///
/// Intron-retention ratio: intron depth against the better-used flanking junction.
///
/// Below a depth of one, coverage fraction stands in for depth.
///
pub fn ir_ratio(intron_depth: f64, coverage: f64, splice_left: u32, splice_right: u32) -> f64 {
    let max_splice = splice_left.max(splice_right) as f64;
    if intron_depth == 0.0 && splice_left == 0 && splice_right == 0 {
        0.0
    } else if intron_depth < 1.0 {
        coverage / (coverage + max_splice)
    } else {
        intron_depth / (intron_depth + max_splice)
    }
}

/// One scored feature.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub chrom: String,
    pub intron_start: u32,
    pub intron_end: u32,
    pub name: String,
    pub strand: Strand,
    pub category: FeatureCategory,
    pub excluded_bases: u32,
    pub coverage: f64,
    pub intron_depth: f64,
    pub percentile_25: f64,
    pub percentile_50: f64,
    pub percentile_75: f64,
    pub span_left: u32,
    pub span_right: u32,
    pub flank_first: f64,
    pub flank_last: f64,
    pub splice_left: u32,
    pub splice_right: u32,
    pub splice_exact: u32,
    pub ir_ratio: f64,
    pub status: IntronStatus,
}

///
/// Format a float the way a default-configured C++ stream does: six significant
/// digits, trailing zeros dropped, scientific notation outside `[1e-4, 1e6)`.
///
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    // rounding to six digits can bump the exponent, so take it from the rounded form
    let sci = format!("{value:.5e}");
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..6).contains(&exponent) {
        let decimals = (5 - exponent) as usize;
        trim_zeros(&format!("{value:.decimals$}"))
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_zeros(mantissa), sign, exponent.abs())
    }
}

fn trim_zeros(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}

impl Display for ReportRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t0\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.chrom,
            self.intron_start,
            self.intron_end,
            self.name,
            self.strand,
            self.excluded_bases,
            format_float(self.coverage),
            format_float(self.intron_depth),
            format_float(self.percentile_25),
            format_float(self.percentile_50),
            format_float(self.percentile_75),
            self.span_left,
            self.span_right,
            format_float(self.flank_first),
            format_float(self.flank_last),
            self.splice_left,
            self.splice_right,
            self.splice_exact,
            format_float(self.ir_ratio),
            self.status
        )
    }
}

///
/// Score a single feature against finalized depth and the lookup services.
///
/// Depth is read from the strand class selected by the configured directionality.
/// Junction and span lookups happen at the intron bounds carried by the feature name.
///
pub fn score_feature<S, J, P>(
    feature: &Feature,
    source: &S,
    junctions: &J,
    spans: &P,
    config: &ScoringConfig,
) -> DepthResult<ReportRow>
where
    S: DepthSource + ?Sized,
    J: JunctionLookup + ?Sized,
    P: SpanLookup + ?Sized,
{
    let name = &feature.name;
    let chrom = feature.chrom.as_str();
    let class = config.directionality.strand_class(feature.strand);
    let strand = config.directionality.measured_strand(feature.strand);
    let (intron_start, intron_end) = (name.intron_start, name.intron_end);

    let mut hist = DepthHistogram::new();
    for &(start, end) in &feature.blocks {
        source.fill_histogram(&mut hist, chrom, start, end, class)?;
    }
    let intron_depth = hist.trimmed_mean(config.center_percent);
    let coverage = hist.coverage_fraction();

    let first = intron_start.saturating_add(FLANK_OFFSET);
    let last = intron_end.saturating_sub(FLANK_OFFSET);
    let flank_first = source
        .query(chrom, first, first.saturating_add(FLANK_WIDTH), class)?
        .trimmed_mean(config.center_percent);
    let flank_last = source
        .query(chrom, last.saturating_sub(FLANK_WIDTH), last, class)?
        .trimmed_mean(config.center_percent);

    let span_left = spans.lookup(chrom, intron_start, strand);
    let span_right = spans.lookup(chrom, intron_end, strand);
    let splice_left = junctions.left(chrom, intron_start, strand);
    let splice_right = junctions.right(chrom, intron_end, strand);
    let splice_exact = junctions.exact(chrom, intron_start, intron_end, strand);

    Ok(ReportRow {
        chrom: feature.chrom.clone(),
        intron_start,
        intron_end,
        name: name.short_name(),
        strand: feature.strand,
        category: name.category(),
        excluded_bases: name.excluded_bases,
        coverage,
        intron_depth,
        percentile_25: hist.percentile(25),
        percentile_50: hist.percentile(50),
        percentile_75: hist.percentile(75),
        span_left,
        span_right,
        flank_first,
        flank_last,
        splice_left,
        splice_right,
        splice_exact,
        ir_ratio: ir_ratio(intron_depth, coverage, splice_left, splice_right),
        status: IntronStatus::classify(
            intron_depth,
            splice_left,
            splice_right,
            splice_exact,
            span_left,
            span_right,
        ),
    })
}
