//! Wave Function Collapse over rectangular grids.
//!
//! Callers describe which values may sit next to each other in a
//! [`ConstraintCatalog`] and ask for a grid of a given size. Generation is
//! deterministic for a given seed and never backtracks: a contradiction ends
//! the call with an error and retrying is up to the caller.

pub mod catalog;
pub mod cell;
pub mod collapse;
pub mod error;
pub mod options;
pub mod seed;
pub mod task;

pub use catalog::{AdjacencyTable, ConstraintCatalog, Direction};
pub use cell::{AdjacencyViolation, Cell, Grid};
pub use collapse::{
    Generation, GenerationState, GridGenerator, collapse_cell, collapse_cell_with, generate,
    initialize_grid, propagate,
};
pub use error::{ConfigurationError, ContradictionError, GenerationError};
pub use seed::{
    SeedChoice, derive_attempt_seed, generate_runtime_seed, resolve_seed, rng_from_seed,
};
pub use task::generate_async;
