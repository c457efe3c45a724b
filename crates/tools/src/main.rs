mod presets;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use procgen::{ConstraintCatalog, Grid, derive_attempt_seed, generate, resolve_seed};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Wave Function Collapse grid generator", long_about = None)]
struct Args {
    /// Grid width in cells
    #[arg(long, default_value_t = 24)]
    width: usize,
    /// Grid height in cells
    #[arg(long, default_value_t = 12)]
    height: usize,
    /// Path to a JSON constraint catalog; the built-in road preset is used when absent
    #[arg(short, long)]
    catalog: Option<PathBuf>,
    /// Seed for the first attempt; overrides the catalog's seed
    #[arg(short, long)]
    seed: Option<u64>,
    /// How many seeds to try before giving up on contradictions
    #[arg(short, long, default_value_t = 10)]
    attempts: u32,
    /// Print raw value IDs instead of road glyphs
    #[arg(long, default_value_t = false)]
    raw: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let (catalog, use_glyphs) = match &args.catalog {
        Some(path) => {
            let catalog = ConstraintCatalog::load(path)
                .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
            (catalog, false)
        }
        None => (presets::roads(), !args.raw),
    };
    catalog.validate().context("Catalog is not usable")?;

    let base_seed = resolve_seed(args.seed, &catalog);
    info!(?base_seed, width = args.width, height = args.height, "generating grid");

    for attempt in 0..args.attempts.max(1) {
        let seed = derive_attempt_seed(base_seed.value(), attempt);
        match generate(args.width, args.height, &catalog, Some(seed)) {
            Ok(grid) => {
                info!(attempt, seed, "grid complete");
                print_grid(&grid, use_glyphs);
                return Ok(());
            }
            Err(error) if error.is_contradiction() => {
                warn!(attempt, seed, "contradiction, retrying with a new seed");
                debug!("{error}");
            }
            Err(error) => return Err(error).context("Generation failed"),
        }
    }

    bail!("no grid produced after {} attempts", args.attempts.max(1))
}

fn print_grid(grid: &Grid, use_glyphs: bool) {
    // y grows upwards, so the top row is printed first.
    for row in grid.rows().rev() {
        let line: Vec<String> = row
            .iter()
            .filter_map(|cell| cell.value())
            .map(|value| {
                if use_glyphs { presets::glyph(value).to_string() } else { value.to_string() }
            })
            .collect();
        let separator = if use_glyphs { "" } else { " " };
        println!("{}", line.join(separator));
    }
}
