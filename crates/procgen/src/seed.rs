//! Seed resolution and the deterministic random stream used by generation.

use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use xxhash_rust::xxh3::{xxh3_64, xxh3_64_with_seed};

use crate::catalog::ConstraintCatalog;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedChoice {
    /// Passed to the generation call.
    Explicit(u64),
    /// Taken from the catalog.
    Catalog(u64),
    /// Neither was set; derived from the clock.
    Generated(u64),
}

impl SeedChoice {
    pub fn value(self) -> u64 {
        match self {
            Self::Explicit(seed) | Self::Catalog(seed) | Self::Generated(seed) => seed,
        }
    }
}

pub fn resolve_seed(explicit: Option<u64>, catalog: &ConstraintCatalog) -> SeedChoice {
    match (explicit, catalog.seed) {
        (Some(seed), _) => SeedChoice::Explicit(seed),
        (None, Some(seed)) => SeedChoice::Catalog(seed),
        (None, None) => SeedChoice::Generated(generate_runtime_seed()),
    }
}

static RUNTIME_SEED_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Seed for callers that supplied none: clock, process id and a per-process
/// counter hashed together.
pub fn generate_runtime_seed() -> u64 {
    let now_nanos =
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0_u128, |elapsed| elapsed.as_nanos());
    let counter = RUNTIME_SEED_COUNTER.fetch_add(1, Ordering::Relaxed);

    let mut entropy = [0_u8; 28];
    entropy[..16].copy_from_slice(&now_nanos.to_le_bytes());
    entropy[16..20].copy_from_slice(&process::id().to_le_bytes());
    entropy[20..].copy_from_slice(&counter.to_le_bytes());
    xxh3_64(&entropy)
}

/// Seed for retry number `attempt` of a caller-driven retry loop. Attempt 0
/// keeps the base seed so the first try is reproducible from it.
pub fn derive_attempt_seed(seed: u64, attempt: u32) -> u64 {
    if attempt == 0 {
        return seed;
    }
    xxh3_64_with_seed(&attempt.to_le_bytes(), seed)
}

pub fn rng_from_seed(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Uniform index in `0..len`. `len` must be non-zero.
pub(crate) fn random_index(rng: &mut ChaCha8Rng, len: usize) -> usize {
    debug_assert!(len > 0);
    (rng.next_u64() % len as u64) as usize
}
