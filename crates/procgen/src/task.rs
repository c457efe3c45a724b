//! Off-thread generation on tokio's blocking pool.

use std::panic;
use std::sync::Arc;

use tokio::task;

use crate::catalog::ConstraintCatalog;
use crate::cell::Grid;
use crate::collapse::generate;
use crate::error::GenerationError;

/// Runs [`generate`] on the blocking pool of the current tokio runtime.
///
/// The catalog is shared, never mutated, so one `Arc` can feed any number of
/// concurrent calls. There is no cancellation: once started, the call runs to
/// completion or error.
pub async fn generate_async(
    width: usize,
    height: usize,
    catalog: Arc<ConstraintCatalog>,
    seed: Option<u64>,
) -> Result<Grid, GenerationError> {
    let handle = task::spawn_blocking(move || generate(width, height, &catalog, seed));
    match handle.await {
        Ok(result) => result,
        Err(join_error) if join_error.is_panic() => panic::resume_unwind(join_error.into_panic()),
        Err(join_error) => Err(GenerationError::Background(join_error.to_string())),
    }
}
