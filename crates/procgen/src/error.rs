//! Error taxonomy for grid generation.
//!
//! Configuration problems are detected before any cell is collapsed.
//! Contradictions are detected while collapsing and carry the assigned values
//! so far for diagnostics. Neither is retried by the library.

use std::error::Error;
use std::fmt;

use crate::catalog::Direction;

/// The catalog or the requested dimensions cannot produce a grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Width or height is zero, or the grid is too large to allocate.
    InvalidDimensions { width: usize, height: usize },
    /// The catalog declares no possible values.
    NoPossibilities,
    /// A value that can be collapsed has no adjacency entry for a direction.
    MissingAdjacency { direction: Direction, value: u32 },
    /// A table references a value outside `[0, possibility_count)`.
    ValueOutOfRange { context: &'static str, value: u32, possibility_count: u32 },
    /// Weights must be positive.
    ZeroWeight { value: u32 },
    /// A collapse was requested outside the grid.
    CellOutOfBounds { x: usize, y: usize, width: usize, height: usize },
    /// A collapse was requested for a cell that already holds a value.
    CellAlreadyCollapsed { x: usize, y: usize, value: u32 },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDimensions { width, height } => {
                write!(f, "grid dimensions must be positive and allocatable, got {width}x{height}")
            }
            Self::NoPossibilities => write!(f, "catalog declares no possible values"),
            Self::MissingAdjacency { direction, value } => {
                write!(f, "catalog has no {direction} adjacency entry for value {value}")
            }
            Self::ValueOutOfRange { context, value, possibility_count } => write!(
                f,
                "{context} references value {value}, outside [0, {possibility_count})"
            ),
            Self::ZeroWeight { value } => write!(f, "weight for value {value} must be positive"),
            Self::CellOutOfBounds { x, y, width, height } => {
                write!(f, "cell ({x},{y}) is outside the {width}x{height} grid")
            }
            Self::CellAlreadyCollapsed { x, y, value } => {
                write!(f, "cell ({x},{y}) is already collapsed to {value}")
            }
        }
    }
}

impl Error for ConfigurationError {}

/// Some unset cell ran out of options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContradictionError {
    pub width: usize,
    pub height: usize,
    /// Coordinates of the first cell found without options.
    pub x: usize,
    pub y: usize,
    /// Row-major assigned values at the time of failure.
    pub assigned: Vec<Option<u32>>,
}

impl fmt::Display for ContradictionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "no possible value left for cell ({},{}) in {}x{} grid; assigned so far:",
            self.x, self.y, self.width, self.height
        )?;
        for (row_index, row) in self.assigned.chunks(self.width.max(1)).enumerate() {
            if row_index > 0 {
                writeln!(f)?;
            }
            write_row(f, row)?;
        }
        Ok(())
    }
}

impl Error for ContradictionError {}

pub(crate) fn write_row(f: &mut fmt::Formatter<'_>, row: &[Option<u32>]) -> fmt::Result {
    for (index, value) in row.iter().enumerate() {
        if index > 0 {
            write!(f, ", ")?;
        }
        match value {
            Some(value) => write!(f, "{value}")?,
            None => write!(f, "-1")?,
        }
    }
    Ok(())
}

/// Any failure of a generation call. No partial grid accompanies it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GenerationError {
    Configuration(ConfigurationError),
    Contradiction(ContradictionError),
    /// The background worker ended without producing a result.
    Background(String),
}

impl GenerationError {
    pub fn is_contradiction(&self) -> bool {
        matches!(self, Self::Contradiction(_))
    }
}

impl fmt::Display for GenerationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(e) => write!(f, "invalid generation configuration: {e}"),
            Self::Contradiction(e) => write!(f, "generation hit a contradiction: {e}"),
            Self::Background(message) => write!(f, "background generation failed: {message}"),
        }
    }
}

impl Error for GenerationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Configuration(e) => Some(e),
            Self::Contradiction(e) => Some(e),
            Self::Background(_) => None,
        }
    }
}

impl From<ConfigurationError> for GenerationError {
    fn from(error: ConfigurationError) -> Self {
        Self::Configuration(error)
    }
}

impl From<ContradictionError> for GenerationError {
    fn from(error: ContradictionError) -> Self {
        Self::Contradiction(error)
    }
}
