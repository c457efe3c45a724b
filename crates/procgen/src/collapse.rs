//! The collapse engine.
//!
//! One generation call owns its grid from start to finish: every cell starts
//! with the full weighted pool, a random cell is collapsed first, and then the
//! unset cell with the fewest remaining options is collapsed until the grid is
//! complete or some unset cell has nothing left. Constraints only travel one
//! hop, to the four direct neighbours of the cell just collapsed, and nothing
//! is ever undone. Retrying after a contradiction is up to the caller.

use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument, trace, warn};

use crate::catalog::{ConstraintCatalog, Direction};
use crate::cell::{Cell, Grid};
use crate::error::{ConfigurationError, ContradictionError, GenerationError};
use crate::options::{intersect_options, pick_option, weighted_pool};
use crate::seed::{SeedChoice, random_index, resolve_seed, rng_from_seed};

/// Lifecycle of one generation call, as reported in logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationState {
    Initialized,
    Collapsing,
    Complete,
    Contradiction,
}

/// A successful generation call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Generation {
    pub grid: Grid,
    pub seed: SeedChoice,
    pub collapses: usize,
}

/// Stateless generator for grids of one size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridGenerator {
    width: usize,
    height: usize,
}

impl GridGenerator {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn generate(
        &self,
        catalog: &ConstraintCatalog,
        seed: Option<u64>,
    ) -> Result<Grid, GenerationError> {
        self.run(catalog, seed).map(|generation| generation.grid)
    }

    /// Like [`GridGenerator::generate`], but also reports the seed that was used.
    #[instrument(
        level = "debug",
        skip(self, catalog),
        fields(width = self.width, height = self.height)
    )]
    pub fn run(
        &self,
        catalog: &ConstraintCatalog,
        seed: Option<u64>,
    ) -> Result<Generation, GenerationError> {
        catalog.validate()?;
        let asymmetries = catalog.asymmetries();
        if !asymmetries.is_empty() {
            warn!(
                count = asymmetries.len(),
                "catalog adjacency rules are asymmetric; \
                 only the rule consulted at collapse time holds"
            );
        }

        let mut grid = initialize_grid(self.width, self.height, catalog)?;
        let seed = resolve_seed(seed, catalog);
        let mut rng = rng_from_seed(seed.value());
        debug!(state = ?GenerationState::Initialized, ?seed, "grid initialized");

        let collapses = collapse_all(&mut grid, catalog, &mut rng).inspect_err(|error| {
            if let GenerationError::Contradiction(contradiction) = error {
                warn!(
                    state = ?GenerationState::Contradiction,
                    x = contradiction.x,
                    y = contradiction.y,
                    unset = grid.unset_count(),
                    "generation ran out of options"
                );
            }
        })?;

        debug!(state = ?GenerationState::Complete, collapses, "grid complete");
        Ok(Generation { grid, seed, collapses })
    }
}

/// Generates a `width` x `height` grid. `seed` overrides the catalog's seed.
pub fn generate(
    width: usize,
    height: usize,
    catalog: &ConstraintCatalog,
    seed: Option<u64>,
) -> Result<Grid, GenerationError> {
    GridGenerator::new(width, height).generate(catalog, seed)
}

/// Fresh grid where every cell is unset and holds the full weighted pool.
pub fn initialize_grid(
    width: usize,
    height: usize,
    catalog: &ConstraintCatalog,
) -> Result<Grid, ConfigurationError> {
    if width == 0 || height == 0 {
        return Err(ConfigurationError::InvalidDimensions { width, height });
    }
    let pool = weighted_pool(catalog);
    if pool.is_empty() {
        return Err(ConfigurationError::NoPossibilities);
    }
    if !fits_in_memory(width, height, pool.len()) {
        return Err(ConfigurationError::InvalidDimensions { width, height });
    }
    Ok(Grid::filled(width, height, &pool))
}

/// Whether the cells and their option pools can be addressed at all.
fn fits_in_memory(width: usize, height: usize, pool_len: usize) -> bool {
    let per_cell = pool_len
        .checked_mul(size_of::<u32>())
        .and_then(|options| options.checked_add(size_of::<Cell>()));
    width
        .checked_mul(height)
        .zip(per_cell)
        .and_then(|(cells, per_cell)| cells.checked_mul(per_cell))
        .is_some_and(|bytes| bytes <= isize::MAX as usize)
}

fn collapse_all(
    grid: &mut Grid,
    catalog: &ConstraintCatalog,
    rng: &mut ChaCha8Rng,
) -> Result<usize, GenerationError> {
    let first_x = random_index(rng, grid.width());
    let first_y = random_index(rng, grid.height());
    trace!(state = ?GenerationState::Collapsing, first_x, first_y, "collapsing start cell");
    collapse_cell(grid, catalog, first_x, first_y, rng)?;

    let mut collapses = 1;
    while let Some((x, y)) = next_cell(grid) {
        collapse_cell(grid, catalog, x, y, rng)?;
        collapses += 1;
    }
    Ok(collapses)
}

/// The unset cell with the fewest options. Ties go to the first cell in
/// row-major order.
fn next_cell(grid: &Grid) -> Option<(usize, usize)> {
    grid.cells()
        .iter()
        .filter(|cell| !cell.is_collapsed())
        .min_by_key(|cell| cell.entropy())
        .map(|cell| (cell.x(), cell.y()))
}

/// Collapses the cell at `(x, y)` to a weighted pick from its options and
/// returns the chosen value.
pub fn collapse_cell(
    grid: &mut Grid,
    catalog: &ConstraintCatalog,
    x: usize,
    y: usize,
    rng: &mut ChaCha8Rng,
) -> Result<u32, GenerationError> {
    let cell = grid.cell(x, y).ok_or_else(|| out_of_bounds(grid, x, y))?;
    let Some(value) = pick_option(cell.options(), rng) else {
        return Err(contradiction_at(grid, x, y).into());
    };
    collapse_cell_with(grid, catalog, x, y, value)?;
    Ok(value)
}

/// Assigns `value` to the unset cell at `(x, y)` and propagates to its
/// neighbours. A collapsed cell keeps its value.
pub fn collapse_cell_with(
    grid: &mut Grid,
    catalog: &ConstraintCatalog,
    x: usize,
    y: usize,
    value: u32,
) -> Result<(), GenerationError> {
    if value >= catalog.possibility_count {
        return Err(ConfigurationError::ValueOutOfRange {
            context: "collapsed cell",
            value,
            possibility_count: catalog.possibility_count,
        }
        .into());
    }
    let out_of_bounds = out_of_bounds(grid, x, y);
    let cell = grid.cell_mut(x, y).ok_or(out_of_bounds)?;
    if let Some(assigned) = cell.value() {
        return Err(ConfigurationError::CellAlreadyCollapsed { x, y, value: assigned }.into());
    }
    cell.assign(value);
    trace!(x, y, value, "collapsed cell");
    propagate(grid, catalog, x, y, value)
}

/// Narrows the options of the unset neighbours of `(x, y)` to what `value`
/// permits in each direction. Stops at the first neighbour left without options.
pub fn propagate(
    grid: &mut Grid,
    catalog: &ConstraintCatalog,
    x: usize,
    y: usize,
    value: u32,
) -> Result<(), GenerationError> {
    for direction in Direction::ALL {
        let Some((nx, ny)) = grid.neighbor(x, y, direction) else {
            continue;
        };
        let allowed = catalog
            .allowed(direction, value)
            .ok_or(ConfigurationError::MissingAdjacency { direction, value })?;
        let Some(neighbor) = grid.cell_mut(nx, ny) else {
            continue;
        };
        if neighbor.is_collapsed() {
            continue;
        }
        intersect_options(neighbor.options_mut(), allowed);
        if neighbor.options().is_empty() {
            return Err(contradiction_at(grid, nx, ny).into());
        }
    }
    Ok(())
}

fn contradiction_at(grid: &Grid, x: usize, y: usize) -> ContradictionError {
    ContradictionError {
        width: grid.width(),
        height: grid.height(),
        x,
        y,
        assigned: grid.values(),
    }
}

fn out_of_bounds(grid: &Grid, x: usize, y: usize) -> ConfigurationError {
    ConfigurationError::CellOutOfBounds { x, y, width: grid.width(), height: grid.height() }
}
