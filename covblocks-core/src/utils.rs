use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, Read};
use std::ops::Range;
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use rayon::ThreadPool;

use crate::errors::CoreError;

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

///
/// Build a rayon pool with exactly `n_threads` workers.
///
/// A worker count below one is a caller error and is rejected before any
/// work is scheduled.
///
pub fn build_thread_pool(n_threads: usize) -> Result<ThreadPool, CoreError> {
    if n_threads < 1 {
        return Err(CoreError::InvalidThreadCount(n_threads));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build()
        .map_err(|e| CoreError::ThreadPool(e.to_string()))
}

///
/// Split `len` items into at most `n_shards` contiguous ranges.
///
/// Every shard except possibly the last holds `1 + len / n_shards` items, so
/// trailing shards may be empty and are dropped. Shard order follows item order.
///
pub fn shard_ranges(len: usize, n_shards: usize) -> Vec<Range<usize>> {
    let n_shards = n_shards.max(1);
    let per_shard = 1 + len / n_shards;

    (0..n_shards)
        .map(|i| (i * per_shard).min(len)..((i + 1) * per_shard).min(len))
        .filter(|r| !r.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::{BufRead, Write};

    #[rstest]
    #[case(10, 3, vec![0..4, 4..8, 8..10])]
    #[case(2, 4, vec![0..1, 1..2])]
    #[case(0, 4, vec![])]
    #[case(5, 1, vec![0..5])]
    fn test_shard_ranges(#[case] len: usize, #[case] n: usize, #[case] expected: Vec<Range<usize>>) {
        assert_eq!(shard_ranges(len, n), expected);
    }

    #[rstest]
    fn test_thread_pool_rejects_zero() {
        assert!(matches!(
            build_thread_pool(0),
            Err(CoreError::InvalidThreadCount(0))
        ));
        assert_eq!(build_thread_pool(2).unwrap().current_num_threads(), 2);
    }

    #[rstest]
    fn test_dynamic_reader_reads_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sizes.txt.gz");
        let file = File::create(&path).unwrap();
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::best());
        writeln!(encoder, "chr1\t100").unwrap();
        encoder.finish().unwrap();

        let reader = get_dynamic_reader(&path).unwrap();
        let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, vec!["chr1\t100".to_string()]);
    }
}
