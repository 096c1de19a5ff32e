use std::fmt::{self, Display};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

///
/// Strand a fragment (or feature) was aligned to.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn is_forward(&self) -> bool {
        matches!(self, Strand::Forward)
    }

    /// The opposite strand, used for reverse-stranded libraries.
    pub fn flip(&self) -> Strand {
        match self {
            Strand::Forward => Strand::Reverse,
            Strand::Reverse => Strand::Forward,
        }
    }

    /// Anything other than `+` is treated as the reverse strand, the same way
    /// BED readers fold `-` and `.` together.
    pub fn from_bed_field(field: &str) -> Strand {
        if field == "+" {
            Strand::Forward
        } else {
            Strand::Reverse
        }
    }
}

impl From<bool> for Strand {
    fn from(forward: bool) -> Self {
        if forward {
            Strand::Forward
        } else {
            Strand::Reverse
        }
    }
}

impl FromStr for Strand {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            _ => Err(CoreError::InvalidStrand(s.to_string())),
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
        }
    }
}

///
/// One of the three independent depth tracks kept per chromosome.
///
/// The discriminant is the on-disk track index, so the order matters.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum StrandClass {
    Reverse = 0,
    Forward = 1,
    Combined = 2,
}

impl StrandClass {
    pub const ALL: [StrandClass; 3] = [StrandClass::Reverse, StrandClass::Forward, StrandClass::Combined];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<StrandClass> {
        StrandClass::ALL.get(index).copied()
    }
}

impl From<Strand> for StrandClass {
    fn from(strand: Strand) -> Self {
        match strand {
            Strand::Forward => StrandClass::Forward,
            Strand::Reverse => StrandClass::Reverse,
        }
    }
}

impl Display for StrandClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrandClass::Reverse => write!(f, "reverse"),
            StrandClass::Forward => write!(f, "forward"),
            StrandClass::Combined => write!(f, "combined"),
        }
    }
}
