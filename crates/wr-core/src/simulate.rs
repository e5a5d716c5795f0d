//! Chunked, seeded Monte Carlo runner.
//!
//! Trials are split into fixed-size chunks. Chunk `i` draws from its own
//! `StdRng` seeded with `mix(seed, i)`, so the merged result depends only on
//! the seed and the trial count, never on the worker count. Chunks run on
//! scoped threads in batches of `workers` and are merged in chunk order.

use std::thread;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;
use wr_common::{Error, Result};
use wr_config::SimulationPolicy;

use crate::log_event;
use crate::logging::{event_names, Stage};

/// Trials per chunk.
pub const CHUNK_SIZE: usize = 1024;

/// Seed and parallelism for one Monte Carlo call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    /// `None` draws a fresh seed per call.
    pub seed: Option<u64>,
    /// Worker threads; values below 1 are treated as 1.
    pub workers: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            seed: None,
            workers: default_workers(),
        }
    }
}

impl SimulationConfig {
    /// Deterministic config with the default worker count.
    pub fn seeded(seed: u64) -> Self {
        SimulationConfig {
            seed: Some(seed),
            ..Default::default()
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn from_policy(policy: &SimulationPolicy) -> Self {
        SimulationConfig {
            seed: policy.seed,
            workers: policy.workers.unwrap_or_else(default_workers).max(1),
        }
    }
}

fn default_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// SplitMix64 finaliser.
pub fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed of chunk `index` under `base`.
pub fn chunk_seed(base: u64, index: u64) -> u64 {
    splitmix64(base ^ splitmix64(index))
}

/// Resolve the base seed, drawing one from the OS when unset.
pub fn resolve_seed(config: &SimulationConfig) -> u64 {
    match config.seed {
        Some(seed) => seed,
        None => {
            let seed = rand::random::<u64>();
            debug!(
                event = event_names::SIMULATE_STARTED,
                stage = %Stage::Simulate,
                seed,
                "drew fresh simulation seed"
            );
            seed
        }
    }
}

/// Run `trials` trials through `chunk_fn(rng, len)` and return one result
/// per chunk, in chunk order.
pub fn run_chunked<T, F>(config: &SimulationConfig, trials: usize, chunk_fn: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(&mut StdRng, usize) -> T + Sync,
{
    let base = resolve_seed(config);
    let n_chunks = trials.div_ceil(CHUNK_SIZE);
    let workers = config.workers.clamp(1, n_chunks.max(1));

    let chunk_len = |index: usize| CHUNK_SIZE.min(trials - index * CHUNK_SIZE);
    let run_one = |index: usize| {
        let mut rng = StdRng::seed_from_u64(chunk_seed(base, index as u64));
        chunk_fn(&mut rng, chunk_len(index))
    };

    if workers == 1 {
        let results: Vec<T> = (0..n_chunks).map(run_one).collect();
        finished(base, trials, n_chunks, workers);
        return Ok(results);
    }

    let indices: Vec<usize> = (0..n_chunks).collect();
    let mut results = Vec::with_capacity(n_chunks);
    for batch in indices.chunks(workers) {
        let batch_results = thread::scope(|s| {
            let handles: Vec<_> = batch
                .iter()
                .map(|&index| s.spawn(move || run_one(index)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join())
                .collect::<Vec<_>>()
        });
        for joined in batch_results {
            match joined {
                Ok(value) => results.push(value),
                Err(_) => {
                    return Err(Error::InvalidSimulation(
                        "simulation worker thread panicked".to_string(),
                    ))
                }
            }
        }
    }
    finished(base, trials, n_chunks, workers);
    Ok(results)
}

fn finished(seed: u64, trials: usize, chunks: usize, workers: usize) {
    log_event!(
        DEBUG,
        event_names::SIMULATE_FINISHED,
        Stage::Simulate,
        "simulation finished",
        seed = seed,
        trials = trials as u64,
        chunks = chunks as u64,
        workers = workers as u64
    );
}
