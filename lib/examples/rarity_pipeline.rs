//! Monster rarity prediction, end to end.
//!
//! Generates a synthetic bestiary where a monster is `Rare` iff its level is
//! above 50, trains a machine on it, queries a few monsters, then saves the
//! machine and opens it again.
//!
//! Run with `RUST_LOG=debug` to see per-tree growth.

use forest_machine::{Machine, Table, Trainer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::error::Error;
use tracing_subscriber::EnvFilter;

const N_MONSTERS: usize = 100;

fn create_bestiary(seed: u64) -> Result<Table, Box<dyn Error>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut level = Vec::with_capacity(N_MONSTERS);
    let mut health = Vec::with_capacity(N_MONSTERS);
    let mut energy = Vec::with_capacity(N_MONSTERS);
    let mut sanity = Vec::with_capacity(N_MONSTERS);
    let mut rarity = Vec::with_capacity(N_MONSTERS);

    for _ in 0..N_MONSTERS {
        let l: f64 = rng.random_range(0.0..100.0);
        level.push(l);
        health.push(rng.random_range(0.0..100.0));
        energy.push(rng.random_range(0.0..100.0));
        sanity.push(rng.random_range(0.0..100.0));
        rarity.push(if l > 50.0 { "Rare" } else { "Common" }.to_string());
    }

    Ok(Table::new()
        .with_numeric("Level", level)?
        .with_numeric("Health", health)?
        .with_numeric("Energy", energy)?
        .with_numeric("Sanity", sanity)?
        .with_categorical("Rarity", rarity)?)
}

fn monster(level: f64, health: f64, energy: f64, sanity: f64) -> Result<Table, Box<dyn Error>> {
    Ok(Table::from_row([
        ("Level", level),
        ("Health", health),
        ("Energy", energy),
        ("Sanity", sanity),
    ])?)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Monster Rarity Pipeline ===\n");

    // 1. Training data
    let bestiary = create_bestiary(7)?;
    println!(
        "Bestiary: {} monsters, columns {:?}",
        bestiary.n_rows(),
        bestiary.column_names()
    );

    // 2. Train
    let trainer = Trainer::builder().n_estimators(100).seed(7).build()?;
    let machine = trainer.fit(&bestiary)?;
    println!(
        "Trained {} trees over classes {:?}\n",
        machine.n_trees(),
        machine.classes()
    );

    // 3. Predict
    let queries = [
        ("veteran", monster(90.0, 40.0, 60.0, 20.0)?),
        ("borderline", monster(52.0, 75.0, 10.0, 90.0)?),
        ("hatchling", monster(8.0, 95.0, 30.0, 50.0)?),
    ];
    for (name, row) in &queries {
        let prediction = machine.predict(row)?;
        let dist = machine.predict_proba(row)?;
        println!(
            "{:>10}: {} (confidence {:.2})",
            name, prediction.label, prediction.confidence
        );
        for (class, fraction) in dist.iter() {
            println!("{:>14} {:.2}", class, fraction);
        }
    }

    // 4. Save and reopen
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("rarity.machine");
    machine.save(&path)?;
    let reopened = Machine::open(&path)?;
    let (_, veteran) = &queries[0];
    assert_eq!(reopened.predict(veteran)?, machine.predict(veteran)?);
    println!("\nReopened from {}", path.display());
    println!("{}", reopened.describe());

    Ok(())
}
