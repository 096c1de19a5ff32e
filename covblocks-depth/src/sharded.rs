use std::sync::Arc;

use log::info;
use rayon::prelude::*;

use covblocks_core::utils::build_thread_pool;
use covblocks_core::{ChromosomeRegistry, Fragment};

use crate::config::AccumulatorConfig;
use crate::errors::Result;
use crate::fragments_map::FragmentsMap;

///
/// Accumulate fragment batches on a dedicated pool and return one finalized map.
///
/// Each batch is ingested into its own [`FragmentsMap`] with no cross-shard
/// synchronization. Shard maps are combined in batch order and finalized once.
///
/// # Arguments
/// - registry: chromosome registry shared by every shard
/// - batches: fragment batches, one shard each
/// - n_threads: worker count, must be at least 1
/// - config: accumulator settings applied to every shard
///
pub fn accumulate_sharded<B>(
    registry: Arc<ChromosomeRegistry>,
    batches: &[B],
    n_threads: usize,
    config: AccumulatorConfig,
) -> Result<FragmentsMap>
where
    B: AsRef<[Fragment]> + Sync,
{
    let pool = build_thread_pool(n_threads)?;
    info!(
        "Accumulating {} fragment batches on {} threads",
        batches.len(),
        n_threads
    );

    pool.install(|| -> Result<FragmentsMap> {
        let shards: Vec<FragmentsMap> = batches
            .par_iter()
            .map(|batch| -> Result<FragmentsMap> {
                let mut shard = FragmentsMap::with_config(registry.clone(), config);
                shard.ingest_all(batch.as_ref())?;
                Ok(shard)
            })
            .collect::<Result<Vec<_>>>()?;

        let mut merged = FragmentsMap::with_config(registry.clone(), config);
        for shard in shards {
            merged.combine(shard)?;
        }
        merged.finalize();
        Ok(merged)
    })
}
