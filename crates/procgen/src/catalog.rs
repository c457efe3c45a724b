//! Constraint catalog: per-direction adjacency rules and spawn weights.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::io;
use std::iter;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigurationError;

/// Value ID -> values permitted next to it in one direction.
pub type AdjacencyTable = BTreeMap<u32, BTreeSet<u32>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// `(x, y + 1)`
    Above,
    /// `(x, y - 1)`
    Below,
    /// `(x - 1, y)`
    Left,
    /// `(x + 1, y)`
    Right,
}

impl Direction {
    pub const ALL: [Self; 4] = [Self::Above, Self::Below, Self::Left, Self::Right];

    pub fn opposite(self) -> Self {
        match self {
            Self::Above => Self::Below,
            Self::Below => Self::Above,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// `(dx, dy)` step for this direction.
    pub fn offset(self) -> (isize, isize) {
        match self {
            Self::Above => (0, 1),
            Self::Below => (0, -1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Above => "above",
            Self::Below => "below",
            Self::Left => "left",
            Self::Right => "right",
        })
    }
}

/// Everything the collapse engine needs to know about the values it may place.
///
/// The catalog is read-only during generation and can be shared between
/// concurrent, independent generation calls.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintCatalog {
    #[serde(alias = "possibilities")]
    pub possibility_count: u32,
    /// Absent (or negative in a config file) means non-deterministic.
    #[serde(
        default,
        deserialize_with = "deserialize_seed",
        skip_serializing_if = "Option::is_none"
    )]
    pub seed: Option<u64>,
    #[serde(default)]
    pub above: AdjacencyTable,
    #[serde(default)]
    pub below: AdjacencyTable,
    #[serde(default)]
    pub left: AdjacencyTable,
    #[serde(default)]
    pub right: AdjacencyTable,
    /// Missing entries weigh 1.
    #[serde(default)]
    pub weights: BTreeMap<u32, u32>,
}

impl ConstraintCatalog {
    /// Every value starts with an entry in each table that permits nothing.
    pub fn new(possibility_count: u32) -> Self {
        Self::filled(possibility_count, &BTreeSet::new())
    }

    /// Every value may sit next to every value in every direction.
    pub fn unrestricted(possibility_count: u32) -> Self {
        Self::filled(possibility_count, &(0..possibility_count).collect())
    }

    fn filled(possibility_count: u32, allowed: &BTreeSet<u32>) -> Self {
        let mut catalog = Self { possibility_count, ..Self::default() };
        for direction in Direction::ALL {
            let table = catalog.table_mut(direction);
            for value in 0..possibility_count {
                table.insert(value, allowed.clone());
            }
        }
        catalog
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_weight(mut self, value: u32, weight: u32) -> Self {
        self.weights.insert(value, weight);
        self
    }

    /// Permit `to` in `direction` of `from`.
    pub fn allow(&mut self, direction: Direction, from: u32, to: u32) -> &mut Self {
        self.table_mut(direction).entry(from).or_default().insert(to);
        self
    }

    /// Permit `to` in `direction` of `from`, and `from` in the opposite direction of `to`.
    pub fn allow_symmetric(&mut self, direction: Direction, from: u32, to: u32) -> &mut Self {
        self.allow(direction, from, to);
        self.allow(direction.opposite(), to, from)
    }

    pub fn table(&self, direction: Direction) -> &AdjacencyTable {
        match direction {
            Direction::Above => &self.above,
            Direction::Below => &self.below,
            Direction::Left => &self.left,
            Direction::Right => &self.right,
        }
    }

    fn table_mut(&mut self, direction: Direction) -> &mut AdjacencyTable {
        match direction {
            Direction::Above => &mut self.above,
            Direction::Below => &mut self.below,
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        }
    }

    pub fn allowed(&self, direction: Direction, value: u32) -> Option<&BTreeSet<u32>> {
        self.table(direction).get(&value)
    }

    pub fn weight(&self, value: u32) -> u32 {
        self.weights.get(&value).copied().unwrap_or(1)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let count = self.possibility_count;
        if count == 0 {
            return Err(ConfigurationError::NoPossibilities);
        }

        for (&value, &weight) in &self.weights {
            if value >= count {
                return Err(ConfigurationError::ValueOutOfRange {
                    context: "weights",
                    value,
                    possibility_count: count,
                });
            }
            if weight == 0 {
                return Err(ConfigurationError::ZeroWeight { value });
            }
        }

        for direction in Direction::ALL {
            let table = self.table(direction);
            let context = table_context(direction);
            for (&from, allowed) in table {
                if let Some(&value) =
                    iter::once(&from).chain(allowed).find(|&&value| value >= count)
                {
                    return Err(ConfigurationError::ValueOutOfRange {
                        context,
                        value,
                        possibility_count: count,
                    });
                }
            }
            // Every weight is positive, so every value can be collapsed.
            if let Some(value) = (0..count).find(|value| !table.contains_key(value)) {
                return Err(ConfigurationError::MissingAdjacency { direction, value });
            }
        }

        Ok(())
    }

    /// `(direction, from, to)` triples where `to` may follow `from` but the
    /// reverse rule is missing.
    pub fn asymmetries(&self) -> Vec<(Direction, u32, u32)> {
        let mut found = Vec::new();
        for direction in Direction::ALL {
            for (&from, allowed) in self.table(direction) {
                for &to in allowed {
                    let reverse = self.allowed(direction.opposite(), to);
                    if !reverse.is_some_and(|reverse| reverse.contains(&from)) {
                        found.push((direction, from, to));
                    }
                }
            }
        }
        found
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

fn table_context(direction: Direction) -> &'static str {
    match direction {
        Direction::Above => "above table",
        Direction::Below => "below table",
        Direction::Left => "left table",
        Direction::Right => "right table",
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSeed {
    Unsigned(u64),
    Signed(i64),
}

fn deserialize_seed<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<RawSeed>::deserialize(deserializer)? {
        Some(RawSeed::Unsigned(seed)) => Some(seed),
        Some(RawSeed::Signed(_)) | None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn unrestricted_catalog_validates() {
        let catalog = ConstraintCatalog::unrestricted(3);
        assert_eq!(catalog.validate(), Ok(()));
        assert!(catalog.asymmetries().is_empty());
        assert_eq!(catalog.allowed(Direction::Left, 2).map(BTreeSet::len), Some(3));
    }

    #[test]
    fn zero_possibilities_is_rejected() {
        assert_eq!(ConstraintCatalog::new(0).validate(), Err(ConfigurationError::NoPossibilities));
    }

    #[test]
    fn missing_adjacency_entry_is_rejected() {
        let mut catalog = ConstraintCatalog::unrestricted(2);
        catalog.right.remove(&1);
        assert_eq!(
            catalog.validate(),
            Err(ConfigurationError::MissingAdjacency { direction: Direction::Right, value: 1 })
        );
    }

    #[test]
    fn out_of_range_references_are_rejected() {
        let mut catalog = ConstraintCatalog::unrestricted(2);
        catalog.allow(Direction::Below, 0, 5);
        assert_eq!(
            catalog.validate(),
            Err(ConfigurationError::ValueOutOfRange {
                context: "below table",
                value: 5,
                possibility_count: 2
            })
        );

        let weighted = ConstraintCatalog::unrestricted(2).with_weight(2, 4);
        assert!(matches!(
            weighted.validate(),
            Err(ConfigurationError::ValueOutOfRange { context: "weights", value: 2, .. })
        ));
    }

    #[test]
    fn zero_weight_is_rejected() {
        let catalog = ConstraintCatalog::unrestricted(2).with_weight(1, 0);
        assert_eq!(catalog.validate(), Err(ConfigurationError::ZeroWeight { value: 1 }));
    }

    #[test]
    fn weight_defaults_to_one() {
        let catalog = ConstraintCatalog::unrestricted(3).with_weight(1, 7);
        assert_eq!(catalog.weight(0), 1);
        assert_eq!(catalog.weight(1), 7);
    }

    #[test]
    fn allow_symmetric_writes_both_directions() {
        let mut catalog = ConstraintCatalog::new(2);
        catalog.allow_symmetric(Direction::Above, 0, 1);
        assert!(catalog.allowed(Direction::Above, 0).is_some_and(|set| set.contains(&1)));
        assert!(catalog.allowed(Direction::Below, 1).is_some_and(|set| set.contains(&0)));
        assert!(catalog.asymmetries().is_empty());

        catalog.allow(Direction::Left, 1, 0);
        assert_eq!(catalog.asymmetries(), vec![(Direction::Left, 1, 0)]);
    }

    #[test]
    fn negative_seed_in_config_means_no_seed() {
        let catalog = ConstraintCatalog::from_json(r#"{ "possibilities": 1, "seed": -1 }"#)
            .expect("catalog should parse");
        assert_eq!(catalog.possibility_count, 1);
        assert_eq!(catalog.seed, None);

        let seeded = ConstraintCatalog::from_json(r#"{ "possibility_count": 1, "seed": 42 }"#)
            .expect("catalog should parse");
        assert_eq!(seeded.seed, Some(42));
    }

    #[test]
    fn catalog_loads_from_json_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("catalog.json");
        let catalog = ConstraintCatalog::unrestricted(2).with_seed(9).with_weight(0, 3);
        fs::write(&path, serde_json::to_string_pretty(&catalog).expect("serialize"))
            .expect("write");

        let loaded = ConstraintCatalog::load(&path).expect("load");
        assert_eq!(loaded, catalog);
    }

    #[test]
    fn malformed_catalog_file_is_invalid_data() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("catalog.json");
        fs::write(&path, "{ not json").expect("write");

        let err = ConstraintCatalog::load(&path).expect_err("malformed json should fail");
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
