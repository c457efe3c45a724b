use procgen::{ConstraintCatalog, Direction, GenerationError, generate};
use proptest::prelude::*;
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{Rng, SeedableRng},
};

/// Symmetric rules drawn from `catalog_seed`: roughly two thirds of all
/// pairs are permitted, weights range over 1..=4.
fn random_symmetric_catalog(catalog_seed: u64, possibility_count: u32) -> ConstraintCatalog {
    let mut rng = ChaCha8Rng::seed_from_u64(catalog_seed);
    let mut catalog = ConstraintCatalog::new(possibility_count);
    for direction in [Direction::Above, Direction::Right] {
        for from in 0..possibility_count {
            for to in 0..possibility_count {
                if rng.next_u64() % 3 != 0 {
                    catalog.allow_symmetric(direction, from, to);
                }
            }
        }
    }
    for value in 0..possibility_count {
        catalog.weights.insert(value, (rng.next_u64() % 4) as u32 + 1);
    }
    catalog
}

/// Two values that exclude each other and themselves in every direction.
fn isolated_catalog() -> ConstraintCatalog {
    ConstraintCatalog::new(2)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]
    #[test]
    fn successful_grids_are_complete_and_respect_every_rule(
        catalog_seed in any::<u64>(),
        seed in any::<u64>(),
        possibility_count in 1_u32..=5,
        width in 1_usize..=8,
        height in 1_usize..=8,
    ) {
        let catalog = random_symmetric_catalog(catalog_seed, possibility_count);
        match generate(width, height, &catalog, Some(seed)) {
            Ok(grid) => {
                prop_assert_eq!(grid.width(), width);
                prop_assert_eq!(grid.height(), height);
                for cell in grid.cells() {
                    let value = cell.value();
                    prop_assert!(
                        value.is_some_and(|value| value < possibility_count),
                        "cell ({}, {}) holds {:?}", cell.x(), cell.y(), value
                    );
                }
                let violations = grid.violations(&catalog);
                prop_assert!(violations.is_empty(), "violations: {violations:?}");
            }
            Err(GenerationError::Contradiction(contradiction)) => {
                prop_assert_eq!(contradiction.assigned.len(), width * height);
                let failing = contradiction.y * width + contradiction.x;
                prop_assert_eq!(contradiction.assigned[failing], None);
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    #[test]
    fn same_seed_gives_same_outcome(
        catalog_seed in any::<u64>(),
        seed in any::<u64>(),
        width in 1_usize..=6,
        height in 1_usize..=6,
    ) {
        let catalog = random_symmetric_catalog(catalog_seed, 3);
        prop_assert_eq!(
            generate(width, height, &catalog, Some(seed)),
            generate(width, height, &catalog, Some(seed))
        );
    }
}

#[test]
fn heavy_value_dominates_unrestricted_grids() {
    let catalog = ConstraintCatalog::unrestricted(3).with_weight(1, 100);
    let mut heavy = 0_usize;
    let mut total = 0_usize;
    for seed in 0..20 {
        let grid = generate(10, 10, &catalog, Some(seed)).expect("unrestricted catalog");
        heavy += grid.cells().iter().filter(|cell| cell.value() == Some(1)).count();
        total += grid.cells().len();
    }
    assert!(heavy * 10 > total * 8, "weight 100 should dominate: {heavy}/{total}");
}

#[test]
fn single_cell_grids_follow_the_weighted_pool() {
    let catalog = ConstraintCatalog::unrestricted(2).with_weight(0, 100);
    let zeros = (0..200)
        .filter(|&seed| {
            let grid = generate(1, 1, &catalog, Some(seed)).expect("lone cell");
            grid.cells()[0].value() == Some(0)
        })
        .count();
    assert!(zeros > 180, "weight 100 should dominate single cells: {zeros}/200");
}

#[test]
fn unsatisfiable_catalog_never_returns_a_grid() {
    let catalog = isolated_catalog();
    for (width, height) in [(2, 1), (1, 2), (4, 4)] {
        for seed in 0..10 {
            let result = generate(width, height, &catalog, Some(seed));
            assert!(
                matches!(result, Err(GenerationError::Contradiction(_))),
                "{width}x{height} seed={seed} should contradict, got {result:?}"
            );
        }
    }
}
