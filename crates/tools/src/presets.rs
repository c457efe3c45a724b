//! Built-in catalogs for trying the generator without a catalog file.

use procgen::{ConstraintCatalog, Direction};

pub const BLANK: u32 = 0;
pub const ROAD_HORIZONTAL: u32 = 1;
pub const ROAD_VERTICAL: u32 = 2;

/// Blank ground with horizontal and vertical road pieces that never touch
/// each other. Roads may run alongside roads of the same orientation.
pub fn roads() -> ConstraintCatalog {
    let mut catalog = ConstraintCatalog::new(3);
    for direction in Direction::ALL {
        for value in [BLANK, ROAD_HORIZONTAL, ROAD_VERTICAL] {
            catalog.allow_symmetric(direction, BLANK, value);
        }
        catalog.allow_symmetric(direction, ROAD_HORIZONTAL, ROAD_HORIZONTAL);
        catalog.allow_symmetric(direction, ROAD_VERTICAL, ROAD_VERTICAL);
    }
    catalog.with_weight(BLANK, 4).with_weight(ROAD_HORIZONTAL, 2).with_weight(ROAD_VERTICAL, 2)
}

pub fn glyph(value: u32) -> char {
    match value {
        BLANK => '.',
        ROAD_HORIZONTAL => '-',
        ROAD_VERTICAL => '|',
        _ => '?',
    }
}
