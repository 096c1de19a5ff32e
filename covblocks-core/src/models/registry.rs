use std::io::BufRead;
use std::path::Path;

use fxhash::FxHashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::utils::get_dynamic_reader;

///
/// One entry of the chromosome catalogue.
///
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChromEntry {
    pub name: String,
    pub length: u32,
    pub ref_id: u32,
}

impl ChromEntry {
    pub fn new(name: &str, length: u32, ref_id: u32) -> Self {
        ChromEntry {
            name: name.to_string(),
            length,
            ref_id,
        }
    }
}

///
/// Ordered `(name, length, ref_id)` catalogue shared by every component.
///
/// Entries keep the order they were supplied in; that order drives every
/// per-chromosome output. The `ref_id` values must form a permutation of
/// `0..n`, which is what lets accumulators index plain vectors by ref id.
///
#[derive(Debug, Clone, Default)]
pub struct ChromosomeRegistry {
    entries: Vec<ChromEntry>,
    // ref_id -> position in `entries`
    by_ref_id: Vec<usize>,
    by_name: FxHashMap<String, u32>,
}

impl ChromosomeRegistry {
    pub fn new(entries: Vec<ChromEntry>) -> Result<Self, CoreError> {
        let n = entries.len();
        let mut by_ref_id = vec![usize::MAX; n];
        let mut by_name: FxHashMap<String, u32> = FxHashMap::default();

        for (i, entry) in entries.iter().enumerate() {
            let slot = by_ref_id
                .get_mut(entry.ref_id as usize)
                .filter(|slot| **slot == usize::MAX)
                .ok_or(CoreError::InvalidRefId {
                    expected: n,
                    found: entry.ref_id,
                })?;
            *slot = i;

            if by_name.insert(entry.name.clone(), entry.ref_id).is_some() {
                return Err(CoreError::DuplicateChromosome(entry.name.clone()));
            }
        }

        Ok(ChromosomeRegistry {
            entries,
            by_ref_id,
            by_name,
        })
    }

    ///
    /// Build a registry from `(name, length)` pairs, assigning ref ids in the
    /// given order.
    ///
    pub fn from_sizes<S: AsRef<str>>(sizes: &[(S, u32)]) -> Result<Self, CoreError> {
        let entries = sizes
            .iter()
            .enumerate()
            .map(|(i, (name, len))| ChromEntry::new(name.as_ref(), *len, i as u32))
            .collect();
        ChromosomeRegistry::new(entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in registry order.
    pub fn entries(&self) -> &[ChromEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChromEntry> {
        self.entries.iter()
    }

    pub fn ref_id(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }

    pub fn by_ref_id(&self, ref_id: u32) -> Option<&ChromEntry> {
        self.by_ref_id
            .get(ref_id as usize)
            .map(|&i| &self.entries[i])
    }

    pub fn by_name(&self, name: &str) -> Option<&ChromEntry> {
        self.ref_id(name).and_then(|id| self.by_ref_id(id))
    }

    /// Two registries are compatible when they describe the same chromosomes
    /// under the same ref ids.
    pub fn is_compatible(&self, other: &ChromosomeRegistry) -> bool {
        self.entries == other.entries
    }
}

impl PartialEq for ChromosomeRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.is_compatible(other)
    }
}

impl Eq for ChromosomeRegistry {}

impl TryFrom<&Path> for ChromosomeRegistry {
    type Error = CoreError;

    ///
    /// Create a new [ChromosomeRegistry] from a `chrom.sizes` file (plain or gzipped).
    ///
    /// # Arguments:
    /// - value: path to a two column `name<TAB>length` file
    fn try_from(value: &Path) -> Result<Self, CoreError> {
        let reader =
            get_dynamic_reader(value).map_err(|e| CoreError::FileReadError(format!("{e:#}")))?;

        let mut sizes: Vec<(String, u32)> = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut iter = line.split_whitespace();
            let name = iter.next().ok_or_else(|| CoreError::ChromSizesParseError {
                line: i + 1,
                reason: "missing chromosome name".to_string(),
            })?;
            let length = iter
                .next()
                .ok_or_else(|| CoreError::ChromSizesParseError {
                    line: i + 1,
                    reason: "missing chromosome length".to_string(),
                })?
                .parse::<u32>()
                .map_err(|e| CoreError::ChromSizesParseError {
                    line: i + 1,
                    reason: e.to_string(),
                })?;

            sizes.push((name.to_string(), length));
        }

        ChromosomeRegistry::from_sizes(&sizes)
    }
}

impl TryFrom<&str> for ChromosomeRegistry {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self, CoreError> {
        ChromosomeRegistry::try_from(Path::new(value))
    }
}
