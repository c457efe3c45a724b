use anyhow::{Result, bail};
use clap::Parser;
use procgen::{ConstraintCatalog, Direction, GenerationError, generate};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 42)]
    seed: u64,
    #[arg(short, long, default_value_t = 1000)]
    runs: u32,
    /// Largest width and height to try
    #[arg(long, default_value_t = 12)]
    max_size: usize,
}

fn below(rng: &mut ChaCha8Rng, bound: u64) -> u64 {
    rng.next_u64() % bound
}

/// Symmetric rules so that every finished grid must satisfy all four tables.
fn random_catalog(rng: &mut ChaCha8Rng) -> ConstraintCatalog {
    let possibility_count = below(rng, 6) as u32 + 1;
    let mut catalog = ConstraintCatalog::new(possibility_count);
    for direction in [Direction::Above, Direction::Right] {
        for from in 0..possibility_count {
            for to in 0..possibility_count {
                if below(rng, 4) != 0 {
                    catalog.allow_symmetric(direction, from, to);
                }
            }
        }
    }
    for value in 0..possibility_count {
        catalog.weights.insert(value, below(rng, 5) as u32 + 1);
    }
    catalog
}

fn main() -> Result<()> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(seed = args.seed, runs = args.runs, "starting generator fuzz");
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let max_size = args.max_size.max(1) as u64;

    let mut completed = 0_u32;
    let mut contradictions = 0_u32;
    for run in 0..args.runs {
        let catalog = random_catalog(&mut rng);
        let width = below(&mut rng, max_size) as usize + 1;
        let height = below(&mut rng, max_size) as usize + 1;
        let seed = rng.next_u64();

        let outcome = generate(width, height, &catalog, Some(seed));
        if outcome != generate(width, height, &catalog, Some(seed)) {
            bail!("Invariant failed: run {run} is not deterministic for seed {seed}");
        }

        match outcome {
            Ok(grid) => {
                if !grid.is_complete() {
                    bail!("Invariant failed: run {run} returned an unfinished grid");
                }
                let violations = grid.violations(&catalog);
                if !violations.is_empty() {
                    bail!("Invariant failed: run {run} broke adjacency rules: {violations:?}");
                }
                completed += 1;
            }
            Err(GenerationError::Contradiction(contradiction)) => {
                let failing = contradiction.y * width + contradiction.x;
                if contradiction.assigned.get(failing) != Some(&None) {
                    bail!("Invariant failed: run {run} blamed a collapsed cell");
                }
                debug!(run, width, height, seed, "contradiction");
                contradictions += 1;
            }
            Err(other) => bail!("Invariant failed: run {run} rejected a valid catalog: {other}"),
        }
    }

    info!(completed, contradictions, "fuzzing completed successfully");
    Ok(())
}
