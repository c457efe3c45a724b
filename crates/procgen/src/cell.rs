//! Grid cells and the rectangular grid the collapse engine fills in.

use std::fmt;

use xxhash_rust::xxh3::xxh3_64;

use crate::catalog::{ConstraintCatalog, Direction};
use crate::error::write_row;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    x: usize,
    y: usize,
    value: Option<u32>,
    options: Vec<u32>,
}

impl Cell {
    pub fn new(x: usize, y: usize, options: Vec<u32>) -> Self {
        Self { x, y, value: None, options }
    }

    pub fn x(&self) -> usize {
        self.x
    }

    pub fn y(&self) -> usize {
        self.y
    }

    pub fn value(&self) -> Option<u32> {
        self.value
    }

    pub fn is_collapsed(&self) -> bool {
        self.value.is_some()
    }

    /// Remaining weighted candidates. Not consulted once the cell is collapsed.
    pub fn options(&self) -> &[u32] {
        &self.options
    }

    pub fn entropy(&self) -> usize {
        self.options.len()
    }

    pub(crate) fn options_mut(&mut self) -> &mut Vec<u32> {
        &mut self.options
    }

    pub(crate) fn assign(&mut self, value: u32) {
        self.value = Some(value);
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{}):{{", self.x, self.y)?;
        for option in &self.options {
            write!(f, "{option},")?;
        }
        write!(f, "}}")
    }
}

/// A neighbour whose value is not permitted by the source cell's table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdjacencyViolation {
    pub x: usize,
    pub y: usize,
    pub direction: Direction,
    pub value: u32,
    pub neighbor_value: u32,
}

/// `height` rows of `width` cells, stored row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Every cell starts unset with a copy of `options`.
    pub(crate) fn filled(width: usize, height: usize, options: &[u32]) -> Self {
        let mut cells = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                cells.push(Cell::new(x, y, options.to_vec()));
            }
        }
        Self { width, height, cells }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        self.index(x, y).map(|index| &self.cells[index])
    }

    pub fn cell_mut(&mut self, x: usize, y: usize) -> Option<&mut Cell> {
        self.index(x, y).map(|index| &mut self.cells[index])
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn rows(&self) -> impl DoubleEndedIterator<Item = &[Cell]> {
        self.cells.chunks(self.width)
    }

    pub fn values(&self) -> Vec<Option<u32>> {
        self.cells.iter().map(Cell::value).collect()
    }

    pub fn unset_count(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_collapsed()).count()
    }

    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Cell::is_collapsed)
    }

    /// First unset cell without options, in row-major order.
    pub fn first_contradiction(&self) -> Option<&Cell> {
        self.cells.iter().find(|cell| !cell.is_collapsed() && cell.options.is_empty())
    }

    pub fn has_contradiction(&self) -> bool {
        self.first_contradiction().is_some()
    }

    /// Coordinates of the cell one step in `direction`, if it is on the grid.
    pub fn neighbor(&self, x: usize, y: usize, direction: Direction) -> Option<(usize, usize)> {
        let (dx, dy) = direction.offset();
        let nx = x.checked_add_signed(dx)?;
        let ny = y.checked_add_signed(dy)?;
        self.index(nx, ny).map(|_| (nx, ny))
    }

    /// Checks every collapsed pair of neighbours against `catalog`, in all
    /// four directions.
    pub fn violations(&self, catalog: &ConstraintCatalog) -> Vec<AdjacencyViolation> {
        let mut found = Vec::new();
        for cell in &self.cells {
            let Some(value) = cell.value else {
                continue;
            };
            for direction in Direction::ALL {
                let Some((nx, ny)) = self.neighbor(cell.x, cell.y, direction) else {
                    continue;
                };
                let Some(neighbor_value) = self.cells[ny * self.width + nx].value else {
                    continue;
                };
                let permitted = catalog
                    .allowed(direction, value)
                    .is_some_and(|allowed| allowed.contains(&neighbor_value));
                if !permitted {
                    found.push(AdjacencyViolation {
                        x: cell.x,
                        y: cell.y,
                        direction,
                        value,
                        neighbor_value,
                    });
                }
            }
        }
        found
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(8 + self.cells.len() * 4);
        bytes.extend((self.width as u32).to_le_bytes());
        bytes.extend((self.height as u32).to_le_bytes());
        for cell in &self.cells {
            bytes.extend(cell.value.unwrap_or(u32::MAX).to_le_bytes());
        }
        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self.values();
        for (row_index, row) in values.chunks(self.width).enumerate() {
            if row_index > 0 {
                writeln!(f)?;
            }
            write_row(f, row)?;
        }
        Ok(())
    }
}
