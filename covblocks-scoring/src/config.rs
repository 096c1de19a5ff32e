use std::fmt::{self, Display};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use covblocks_core::{Strand, StrandClass};

use crate::consts::DEFAULT_TRIM_CENTER;
use crate::errors::ScoringError;

///
/// Library strandedness the depth tracks were built from.
///
/// `Reverse` libraries sequence the strand opposite to the feature, so depth and
/// lookups are measured on the flipped strand.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Directionality {
    #[default]
    NonDirectional,
    Forward,
    Reverse,
}

impl Directionality {
    pub fn is_directional(&self) -> bool {
        !matches!(self, Directionality::NonDirectional)
    }

    /// The strand depth and lookups are measured on for a feature on `feature_strand`,
    /// or `None` when strand is ignored.
    pub fn measured_strand(&self, feature_strand: Strand) -> Option<Strand> {
        match self {
            Directionality::NonDirectional => None,
            Directionality::Forward => Some(feature_strand),
            Directionality::Reverse => Some(feature_strand.flip()),
        }
    }

    pub fn strand_class(&self, feature_strand: Strand) -> StrandClass {
        self.measured_strand(feature_strand)
            .map(StrandClass::from)
            .unwrap_or(StrandClass::Combined)
    }
}

impl TryFrom<i32> for Directionality {
    type Error = ScoringError;

    /// `0` non-directional, `1` forward, `-1` reverse.
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Directionality::NonDirectional),
            1 => Ok(Directionality::Forward),
            -1 => Ok(Directionality::Reverse),
            other => Err(ScoringError::InvalidDirectionality(other.to_string())),
        }
    }
}

impl FromStr for Directionality {
    type Err = ScoringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nd" | "nondirectional" | "non-directional" | "0" => Ok(Directionality::NonDirectional),
            "fwd" | "forward" | "1" => Ok(Directionality::Forward),
            "rev" | "reverse" | "-1" => Ok(Directionality::Reverse),
            _ => Err(ScoringError::InvalidDirectionality(s.to_string())),
        }
    }
}

impl Display for Directionality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directionality::NonDirectional => write!(f, "non-directional"),
            Directionality::Forward => write!(f, "forward"),
            Directionality::Reverse => write!(f, "reverse"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScoringConfig {
    /// Worker threads for scoring, and the number of contiguous feature shards.
    pub n_threads: usize,
    pub directionality: Directionality,
    /// Central percentage kept by the trimmed-mean depth estimates.
    pub center_percent: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            n_threads: 1,
            directionality: Directionality::NonDirectional,
            center_percent: DEFAULT_TRIM_CENTER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case(Directionality::NonDirectional, Strand::Forward, StrandClass::Combined)]
    #[case(Directionality::Forward, Strand::Forward, StrandClass::Forward)]
    #[case(Directionality::Reverse, Strand::Forward, StrandClass::Reverse)]
    #[case(Directionality::Reverse, Strand::Reverse, StrandClass::Forward)]
    fn test_strand_class(
        #[case] directionality: Directionality,
        #[case] strand: Strand,
        #[case] expected: StrandClass,
    ) {
        assert_eq!(directionality.strand_class(strand), expected);
    }

    #[rstest]
    #[case(0, Directionality::NonDirectional)]
    #[case(1, Directionality::Forward)]
    #[case(-1, Directionality::Reverse)]
    fn test_from_legacy_code(#[case] code: i32, #[case] expected: Directionality) {
        assert_eq!(Directionality::try_from(code).unwrap(), expected);
    }

    #[rstest]
    fn test_parse() {
        assert_eq!("Reverse".parse::<Directionality>().unwrap(), Directionality::Reverse);
        assert!("sideways".parse::<Directionality>().is_err());
        assert!(Directionality::try_from(2).is_err());
    }
}
