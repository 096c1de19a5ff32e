use std::fmt::{self, Display};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use covblocks_core::Strand;

use crate::config::Directionality;
use crate::consts::{
    CLEAN_TAG_PREFIX, COMPOSITE_NAME_FIELDS, DIRECTIONAL_PREFIX, KNOWN_EXON_TAG,
    NON_DIRECTIONAL_PREFIX,
};
use crate::errors::FeatureError;

///
/// Which scoring mode a feature was built for.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FeatureMode {
    Directional,
    NonDirectional,
}

impl FeatureMode {
    /// Directional features are scored by both directional modes.
    pub fn matches(&self, directionality: Directionality) -> bool {
        match self {
            FeatureMode::Directional => directionality.is_directional(),
            FeatureMode::NonDirectional => !directionality.is_directional(),
        }
    }
}

impl FromStr for FeatureMode {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            DIRECTIONAL_PREFIX => Ok(FeatureMode::Directional),
            NON_DIRECTIONAL_PREFIX => Ok(FeatureMode::NonDirectional),
            other => Err(FeatureError::UnknownMode(other.to_string())),
        }
    }
}

impl Display for FeatureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureMode::Directional => write!(f, "{DIRECTIONAL_PREFIX}"),
            FeatureMode::NonDirectional => write!(f, "{NON_DIRECTIONAL_PREFIX}"),
        }
    }
}

///
/// QC bucket a feature's depth is summed into, derived from its type tag.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureCategory {
    Clean,
    KnownExon,
    Other,
}

impl FeatureCategory {
    pub fn from_tag(tag: &str) -> Self {
        if tag.starts_with(CLEAN_TAG_PREFIX) {
            FeatureCategory::Clean
        } else if tag.contains(KNOWN_EXON_TAG) {
            FeatureCategory::KnownExon
        } else {
            FeatureCategory::Other
        }
    }
}

///
/// The structured form of a composite feature name, e.g.
/// `nd/SAMD11/ENSG00000187634/+/2/860569/861301/732/121/anti-over`.
///
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeatureName {
    pub mode: FeatureMode,
    pub gene_symbol: String,
    pub gene_id: String,
    pub strand: Strand,
    pub intron_index: u32,
    pub intron_start: u32,
    pub intron_end: u32,
    pub total_length: u32,
    pub excluded_bases: u32,
    pub tag: String,
}

fn parse_name_int(field: &'static str, value: &str) -> Result<u32, FeatureError> {
    value.parse::<u32>().map_err(|_| FeatureError::InvalidNameField {
        field,
        value: value.to_string(),
    })
}

impl FeatureName {
    pub fn category(&self) -> FeatureCategory {
        FeatureCategory::from_tag(&self.tag)
    }

    /// `symbol/id/tag`, the name printed in reports.
    pub fn short_name(&self) -> String {
        format!("{}/{}/{}", self.gene_symbol, self.gene_id, self.tag)
    }
}

impl FromStr for FeatureName {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // anything after the tag field is ignored
        let fields: Vec<&str> = s.split('/').collect();
        let [mode, symbol, id, strand, index, start, end, length, excluded, tag, ..] = fields.as_slice() else {
            return Err(FeatureError::CompositeFieldCount {
                expected: COMPOSITE_NAME_FIELDS,
                found: fields.len(),
            });
        };

        let strand = strand
            .parse::<Strand>()
            .map_err(|_| FeatureError::InvalidNameField {
                field: "strand",
                value: strand.to_string(),
            })?;

        let name = FeatureName {
            mode: mode.parse()?,
            gene_symbol: symbol.to_string(),
            gene_id: id.to_string(),
            strand,
            intron_index: parse_name_int("intron_index", index)?,
            intron_start: parse_name_int("intron_start", start)?,
            intron_end: parse_name_int("intron_end", end)?,
            total_length: parse_name_int("total_length", length)?,
            excluded_bases: parse_name_int("excluded_bases", excluded)?,
            tag: tag.to_string(),
        };

        if name.intron_end < name.intron_start {
            return Err(FeatureError::InvalidNameField {
                field: "intron_end",
                value: end.to_string(),
            });
        }
        Ok(name)
    }
}

impl Display for FeatureName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}/{}/{}/{}/{}/{}",
            self.mode,
            self.gene_symbol,
            self.gene_id,
            self.strand,
            self.intron_index,
            self.intron_start,
            self.intron_end,
            self.total_length,
            self.excluded_bases,
            self.tag
        )
    }
}

///
/// A scored feature: one line of the feature definition file.
///
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Feature {
    pub chrom: String,
    pub start: u32,
    pub end: u32,
    pub name: FeatureName,
    pub strand: Strand,
    /// Absolute `[start, end)` sub-blocks whose depth is measured.
    pub blocks: Vec<(u32, u32)>,
}

fn column<'a, I: Iterator<Item = &'a str>>(
    fields: &mut I,
    name: &'static str,
) -> Result<&'a str, FeatureError> {
    fields.next().ok_or(FeatureError::MissingColumn(name))
}

fn parse_int(column: &'static str, value: &str) -> Result<u32, FeatureError> {
    value.trim().parse::<u32>().map_err(|_| FeatureError::InvalidInteger {
        column,
        value: value.to_string(),
    })
}

fn parse_int_list(column: &'static str, value: &str) -> Result<Vec<u32>, FeatureError> {
    value
        .split(',')
        .filter(|v| !v.trim().is_empty())
        .map(|v| parse_int(column, v))
        .collect()
}

impl FromStr for Feature {
    type Err = FeatureError;

    ///
    /// Parse a BED12 line: chromosome, start, end, composite name, score, strand,
    /// thick start, thick end, color, block count, block lengths, block offsets.
    ///
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut fields = line.trim_end_matches(['\r', '\n']).split('\t');

        let chrom = column(&mut fields, "chrom")?.to_string();
        let start = parse_int("start", column(&mut fields, "start")?)?;
        let end = parse_int("end", column(&mut fields, "end")?)?;
        let name: FeatureName = column(&mut fields, "name")?.parse()?;
        column(&mut fields, "score")?;
        let strand = Strand::from_bed_field(column(&mut fields, "strand")?);
        column(&mut fields, "thick_start")?;
        column(&mut fields, "thick_end")?;
        column(&mut fields, "item_rgb")?;
        let block_count = parse_int("block_count", column(&mut fields, "block_count")?)? as usize;
        let lengths = parse_int_list("block_sizes", column(&mut fields, "block_sizes")?)?;
        let offsets = parse_int_list("block_starts", column(&mut fields, "block_starts")?)?;

        if lengths.len() < block_count || offsets.len() < block_count {
            return Err(FeatureError::BlockCountMismatch {
                declared: block_count,
                lengths: lengths.len(),
                offsets: offsets.len(),
            });
        }

        let blocks = offsets
            .iter()
            .zip(lengths.iter())
            .take(block_count)
            .map(|(&offset, &length)| {
                let block_start = start.saturating_add(offset);
                (block_start, block_start.saturating_add(length))
            })
            .collect();

        Ok(Feature {
            chrom,
            start,
            end,
            name,
            strand,
            blocks,
        })
    }
}

/// Parse one feature definition line.
pub fn parse_feature_line(line: &str) -> Result<Feature, FeatureError> {
    line.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    const ND_LINE: &str = "1\t860574\t861258\tnd/SAMD11/ENSG00000187634/+/2/860569/861301/732/121/anti-over\t0\t+\t860574\t861258\t255,0,0\t2\t538,73\t0,611";

    #[rstest]
    fn test_parse_feature_line() {
        let feature = parse_feature_line(ND_LINE).unwrap();
        assert_eq!(feature.chrom, "1");
        assert_eq!(feature.strand, Strand::Forward);
        assert_eq!(feature.blocks, vec![(860574, 861112), (861185, 861258)]);
        assert_eq!(feature.name.mode, FeatureMode::NonDirectional);
        assert_eq!(feature.name.intron_start, 860569);
        assert_eq!(feature.name.intron_end, 861301);
        assert_eq!(feature.name.excluded_bases, 121);
        assert_eq!(feature.name.short_name(), "SAMD11/ENSG00000187634/anti-over");
        assert_eq!(feature.name.category(), FeatureCategory::Other);
    }

    #[rstest]
    fn test_name_display_round_trips() {
        let raw = "dir/PHF13/ENSG00000116273/+/3/6676918/6679862/2944/10/clean";
        assert_eq!(raw.parse::<FeatureName>().unwrap().to_string(), raw);
    }

    #[rstest]
    fn test_tag_stops_at_next_separator() {
        let name: FeatureName = "nd/A/B/+/1/10/20/30/4/clean/extra/fields".parse().unwrap();
        assert_eq!(name.tag, "clean");
        assert_eq!(name.short_name(), "A/B/clean");
        assert_eq!(name.category(), FeatureCategory::Clean);
    }

    #[rstest]
    #[case("clean", FeatureCategory::Clean)]
    #[case("clean-ish", FeatureCategory::Clean)]
    #[case("anti-known-exon", FeatureCategory::KnownExon)]
    #[case("anti-near", FeatureCategory::Other)]
    fn test_category(#[case] tag: &str, #[case] expected: FeatureCategory) {
        assert_eq!(FeatureCategory::from_tag(tag), expected);
    }

    #[rstest]
    #[case("nd/A/B/+/1/10/20/30", FeatureError::CompositeFieldCount { expected: 10, found: 8 })]
    #[case("xx/A/B/+/1/10/20/30/4/clean", FeatureError::UnknownMode("xx".to_string()))]
    #[case("nd/A/B/+/1/ten/20/30/4/clean", FeatureError::InvalidNameField { field: "intron_start", value: "ten".to_string() })]
    #[case("nd/A/B/*/1/10/20/30/4/clean", FeatureError::InvalidNameField { field: "strand", value: "*".to_string() })]
    #[case("nd/A/B/+/1/30/20/30/4/clean", FeatureError::InvalidNameField { field: "intron_end", value: "20".to_string() })]
    fn test_bad_composite_names(#[case] raw: &str, #[case] expected: FeatureError) {
        assert_eq!(raw.parse::<FeatureName>().unwrap_err(), expected);
    }

    #[rstest]
    fn test_bad_lines() {
        let truncated = "chr1\t10\t20\tnd/A/B/+/1/10/20/30/4/clean\t0\t+";
        assert_eq!(
            parse_feature_line(truncated).unwrap_err(),
            FeatureError::MissingColumn("thick_start")
        );

        let bad_offsets = "chr1\t10\t20\tnd/A/B/+/1/10/20/30/4/clean\t0\t+\t10\t20\t0\t2\t5,5\t0,x";
        assert!(matches!(
            parse_feature_line(bad_offsets),
            Err(FeatureError::InvalidInteger { column: "block_starts", .. })
        ));

        let short_blocks = "chr1\t10\t20\tnd/A/B/+/1/10/20/30/4/clean\t0\t-\t10\t20\t0\t3\t5,5,\t0,5,";
        assert_eq!(
            parse_feature_line(short_blocks).unwrap_err(),
            FeatureError::BlockCountMismatch { declared: 3, lengths: 2, offsets: 2 }
        );
    }

    #[rstest]
    fn test_trailing_commas_are_accepted() {
        let line = "chr1\t100\t200\tdir/A/B/-/1/90/210/400/20/clean\t0\t-\t100\t200\t0\t2\t10,20,\t0,80,";
        let feature = parse_feature_line(line).unwrap();
        assert_eq!(feature.strand, Strand::Reverse);
        assert_eq!(feature.blocks, vec![(100, 110), (180, 200)]);
    }
}
