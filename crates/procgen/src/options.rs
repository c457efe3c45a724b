//! Weighted option pools.
//!
//! A pool is a flat list where each value appears once per unit of weight, so
//! a uniform pick from the list is a weighted pick over the values. Pools only
//! shrink: intersection drops the entries whose value is no longer permitted
//! and keeps the multiplicity of the rest.

use std::collections::BTreeSet;
use std::iter;

use rand_chacha::ChaCha8Rng;

use crate::catalog::ConstraintCatalog;
use crate::seed::random_index;

/// Every value in `[0, possibility_count)`, repeated by its weight.
pub fn weighted_pool(catalog: &ConstraintCatalog) -> Vec<u32> {
    let mut pool = Vec::new();
    for value in 0..catalog.possibility_count {
        let weight = catalog.weight(value) as usize;
        pool.extend(iter::repeat_n(value, weight));
    }
    pool
}

pub fn pick_option(options: &[u32], rng: &mut ChaCha8Rng) -> Option<u32> {
    if options.is_empty() {
        return None;
    }
    Some(options[random_index(rng, options.len())])
}

pub fn intersect_options(options: &mut Vec<u32>, allowed: &BTreeSet<u32>) {
    options.retain(|value| allowed.contains(value));
}
