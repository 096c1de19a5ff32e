use std::io::BufRead;
use std::path::Path;

use anyhow::Context;
use log::{info, warn};
use rayon::prelude::*;

use covblocks_core::utils::{build_thread_pool, get_dynamic_reader, shard_ranges};
use covblocks_depth::DepthSource;

use crate::config::ScoringConfig;
use crate::errors::{FeatureError, Result};
use crate::feature::{Feature, parse_feature_line};
use crate::lookups::{JunctionLookup, SpanLookup};
use crate::report::{QcSums, ScoringReport};
use crate::scorer::{ReportRow, score_feature};

///
/// Features that parsed, and the 1-based line numbers of those that did not.
///
#[derive(Debug, Clone, Default)]
pub struct LoadedFeatures {
    pub features: Vec<Feature>,
    pub errors: Vec<(usize, FeatureError)>,
}

///
/// Parse a feature definition stream, skipping and reporting malformed lines.
///
/// Blank lines and `#` comments are ignored. Only I/O failures abort loading.
///
pub fn load_features<R: BufRead>(reader: R) -> std::io::Result<LoadedFeatures> {
    let mut loaded = LoadedFeatures::default();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_feature_line(&line) {
            Ok(feature) => loaded.features.push(feature),
            Err(e) => {
                warn!("Skipping malformed feature at line {}: {}", i + 1, e);
                loaded.errors.push((i + 1, e));
            }
        }
    }
    Ok(loaded)
}

/// Load features from a plain or gzipped file.
pub fn load_features_from_path(path: &Path) -> anyhow::Result<LoadedFeatures> {
    let reader = get_dynamic_reader(path)?;
    load_features(reader).with_context(|| format!("Failed to read features from {:?}", path))
}

///
/// A loaded feature set and the settings it is scored with.
///
#[derive(Debug, Clone)]
pub struct CoverageBlocks {
    features: Vec<Feature>,
    config: ScoringConfig,
}

impl CoverageBlocks {
    pub fn new(features: Vec<Feature>, config: ScoringConfig) -> Self {
        CoverageBlocks { features, config }
    }

    pub fn from_path(path: &Path, config: ScoringConfig) -> anyhow::Result<Self> {
        let loaded = load_features_from_path(path)?;
        if !loaded.errors.is_empty() {
            warn!("{} malformed feature lines skipped", loaded.errors.len());
        }
        Ok(CoverageBlocks::new(loaded.features, config))
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    ///
    /// Score every feature built for the configured directionality.
    ///
    /// Features are split into one contiguous shard per worker. Each shard is scored
    /// independently against the read-only depth source and keeps its own QC sums;
    /// shard outputs are joined in shard order, so output never depends on scheduling.
    ///
    pub fn score_all<S, J, P>(&self, source: &S, junctions: &J, spans: &P) -> Result<ScoringReport>
    where
        S: DepthSource + ?Sized,
        J: JunctionLookup + ?Sized,
        P: SpanLookup + ?Sized,
    {
        let config = &self.config;
        let pool = build_thread_pool(config.n_threads)?;

        let selected: Vec<&Feature> = self
            .features
            .iter()
            .filter(|f| f.name.mode.matches(config.directionality))
            .collect();
        let shards = shard_ranges(selected.len(), config.n_threads);
        info!(
            "Scoring {} of {} features ({}) in {} shards",
            selected.len(),
            self.features.len(),
            config.directionality,
            shards.len()
        );

        let shard_outputs = pool.install(|| {
            shards
                .par_iter()
                .map(|range| -> Result<(Vec<ReportRow>, QcSums)> {
                    let mut qc = QcSums::default();
                    let rows = selected[range.clone()]
                        .iter()
                        .map(|feature| -> Result<ReportRow> {
                            let row = score_feature(feature, source, junctions, spans, config)?;
                            qc.add(row.category, row.intron_depth, config.directionality);
                            Ok(row)
                        })
                        .collect::<Result<Vec<ReportRow>>>()?;
                    Ok((rows, qc))
                })
                .collect::<Result<Vec<(Vec<ReportRow>, QcSums)>>>()
        })?;

        let mut report = ScoringReport {
            directionality: config.directionality,
            rows: Vec::with_capacity(selected.len()),
            qc: QcSums::default(),
        };
        for (rows, qc) in shard_outputs {
            report.rows.extend(rows);
            report.qc.merge(&qc);
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;
    use std::sync::Arc;

    use covblocks_core::{ChromosomeRegistry, CoreError, Fragment, Strand};
    use covblocks_depth::FragmentsMap;
    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::config::Directionality;
    use crate::errors::ScoringError;
    use crate::lookups::{JunctionTable, SpanTable};
    use crate::scorer::IntronStatus;

    const FEATURES: &str = "\
chr1\t100\t200\tnd/GENE1/ID1/+/1/95/205/300/10/clean\t0\t+\t100\t200\t255,0,0\t1\t100\t0
chr1\t300\t400\tnd/GENE2/ID2/-/1/295/405/300/10/anti-near\t0\t-\t300\t400\t255,0,0\t1\t100\t0
chr1\t100\t200\tdir/GENE1/ID1/+/1/95/205/300/10/clean\t0\t+\t100\t200\t255,0,0\t1\t100\t0
broken line
chr1\t500\t600\tnd/GENE3/ID3/+/2/495/605/300/10/known-exon\t0\t+\t500\t600\t255,0,0\t2\t40,40\t0,60
";

    #[fixture]
    fn map() -> FragmentsMap {
        let registry = Arc::new(ChromosomeRegistry::from_sizes(&[("chr1", 1000)]).unwrap());
        let mut map = FragmentsMap::new(registry);
        for _ in 0..12 {
            map.ingest(&Fragment::contiguous(0, Strand::Forward, 50, 450)).unwrap();
        }
        for _ in 0..3 {
            map.ingest(&Fragment::contiguous(0, Strand::Reverse, 100, 200)).unwrap();
        }
        map.finalize();
        map
    }

    #[fixture]
    fn lookups() -> (JunctionTable, SpanTable) {
        let mut junctions = JunctionTable::new();
        junctions.add("chr1", 95, 205, Strand::Forward, 12);
        let mut spans = SpanTable::new();
        spans.add("chr1", 95, Strand::Forward, 14);
        spans.add("chr1", 205, Strand::Forward, 13);
        (junctions, spans)
    }

    #[rstest]
    fn test_load_features_reports_bad_lines() {
        let loaded = load_features(Cursor::new(FEATURES)).unwrap();
        assert_eq!(loaded.features.len(), 4);
        assert_eq!(loaded.errors.len(), 1);
        assert_eq!(loaded.errors[0].0, 4);
    }

    #[rstest]
    fn test_load_gzipped_features() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("introns.bed.gz");
        let file = std::fs::File::create(&path).unwrap();
        let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        encoder.write_all(FEATURES.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let loaded = load_features_from_path(&path).unwrap();
        assert_eq!(loaded.features.len(), 4);
        assert_eq!(loaded.errors.len(), 1);
        assert!(load_features_from_path(&dir.path().join("missing.bed")).is_err());
    }

    #[rstest]
    fn test_non_directional_scoring(map: FragmentsMap, lookups: (JunctionTable, SpanTable)) {
        let (junctions, spans) = lookups;
        let features = load_features(Cursor::new(FEATURES)).unwrap().features;
        let blocks = CoverageBlocks::new(features, ScoringConfig::default());

        let report = blocks.score_all(&map, &junctions, &spans).unwrap();
        let names: Vec<&str> = report.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["GENE1/ID1/clean", "GENE2/ID2/anti-near", "GENE3/ID3/known-exon"]);

        let first = &report.rows[0];
        assert_eq!(first.intron_depth, 15.0);
        assert_eq!(first.coverage, 1.0);
        assert_eq!(first.splice_exact, 12);
        assert_eq!(first.status, IntronStatus::Ok);
        assert!((first.ir_ratio - 15.0 / 27.0).abs() < 1e-12);

        // 12 forward fragments cover [300,400); the last block of GENE3 is uncovered
        assert_eq!(report.rows[1].intron_depth, 12.0);
        assert_eq!(report.rows[1].status, IntronStatus::LowSplicing);
        assert_eq!(report.rows[2].coverage, 0.0);
        assert_eq!(report.rows[2].status, IntronStatus::LowCover);

        assert_eq!(report.qc.clean, 15.0);
        assert_eq!(report.qc.anti_sense, 12.0);
        assert_eq!(report.qc.known_exon, 0.0);
    }

    #[rstest]
    #[case(Directionality::Forward, 12.0, 12)]
    #[case(Directionality::Reverse, 3.0, 0)]
    fn test_directional_scoring(
        map: FragmentsMap,
        lookups: (JunctionTable, SpanTable),
        #[case] directionality: Directionality,
        #[case] depth: f64,
        #[case] exact: u32,
    ) {
        let (junctions, spans) = lookups;
        let features = load_features(Cursor::new(FEATURES)).unwrap().features;
        let config = ScoringConfig {
            directionality,
            ..ScoringConfig::default()
        };
        let report = CoverageBlocks::new(features, config)
            .score_all(&map, &junctions, &spans)
            .unwrap();

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].intron_depth, depth);
        assert_eq!(report.rows[0].splice_exact, exact);
        assert_eq!(report.qc.clean, depth);
    }

    #[rstest]
    fn test_output_is_independent_of_thread_count(map: FragmentsMap, lookups: (JunctionTable, SpanTable)) {
        let (junctions, spans) = lookups;
        let mut features = load_features(Cursor::new(FEATURES)).unwrap().features;
        // pad with copies so every shard has work
        let extra = features.clone();
        for _ in 0..10 {
            features.extend(extra.iter().cloned());
        }

        let score = |n_threads: usize| {
            let config = ScoringConfig {
                n_threads,
                ..ScoringConfig::default()
            };
            CoverageBlocks::new(features.clone(), config)
                .score_all(&map, &junctions, &spans)
                .unwrap()
        };
        let single = score(1);
        for n in [2, 3, 7] {
            assert_eq!(score(n).rows, single.rows);
        }
    }

    #[rstest]
    fn test_zero_threads_is_rejected(map: FragmentsMap, lookups: (JunctionTable, SpanTable)) {
        let (junctions, spans) = lookups;
        let config = ScoringConfig {
            n_threads: 0,
            ..ScoringConfig::default()
        };
        let result = CoverageBlocks::new(vec![], config).score_all(&map, &junctions, &spans);
        assert!(matches!(
            result,
            Err(ScoringError::Core(CoreError::InvalidThreadCount(0)))
        ));
    }

    #[rstest]
    fn test_unfinalized_source_is_an_error(lookups: (JunctionTable, SpanTable)) {
        let (junctions, spans) = lookups;
        let registry = Arc::new(ChromosomeRegistry::from_sizes(&[("chr1", 1000)]).unwrap());
        let map = FragmentsMap::new(registry);
        let features = load_features(Cursor::new(FEATURES)).unwrap().features;
        let result = CoverageBlocks::new(features, ScoringConfig::default())
            .score_all(&map, &junctions, &spans);
        assert!(matches!(result, Err(ScoringError::Depth(_))));
    }
}
