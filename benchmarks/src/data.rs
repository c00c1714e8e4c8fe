//! Synthetic bestiaries for benchmarks.

use forest_machine::{Table, TableError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Feature columns of a generated bestiary.
pub const FEATURES: [&str; 4] = ["Level", "Health", "Energy", "Sanity"];

/// Generated monsters with a known labelling rule.
#[derive(Debug, Clone)]
pub struct Bestiary {
    /// Feature and `Rarity` columns.
    pub table: Table,
    /// Feature columns only, ready for batch prediction.
    pub features: Table,
    pub labels: Vec<String>,
}

impl Bestiary {
    /// `n` monsters with uniform features in `[0, 100)`.
    ///
    /// Rarity is `Legendary` above level 90, `Rare` above 50 and `Common`
    /// otherwise.
    pub fn generate(n: usize, seed: u64) -> Result<Self, TableError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(n); FEATURES.len()];
        for _ in 0..n {
            for column in columns.iter_mut() {
                column.push(rng.random_range(0.0..100.0));
            }
        }

        let labels: Vec<String> = columns[0]
            .iter()
            .map(|&level| {
                if level > 90.0 {
                    "Legendary"
                } else if level > 50.0 {
                    "Rare"
                } else {
                    "Common"
                }
                .to_string()
            })
            .collect();

        let mut features = Table::new();
        for (name, values) in FEATURES.iter().zip(columns) {
            features = features.with_numeric(*name, values)?;
        }
        let table = features.clone().with_categorical("Rarity", labels.clone())?;

        Ok(Self {
            table,
            features,
            labels,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// A single-row table for one monster.
    pub fn row(level: f64, health: f64, energy: f64, sanity: f64) -> Result<Table, TableError> {
        Table::from_row(FEATURES.into_iter().zip([level, health, energy, sanity]))
    }
}
