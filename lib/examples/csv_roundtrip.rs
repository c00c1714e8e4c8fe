//! Train from a CSV export and score a batch.
//!
//! Writes a small export that still carries the store's `_id` column, reads
//! it back through [`CsvSource`] with that column dropped, trains with
//! settings parsed from TOML, and predicts every exported row.

use forest_machine::{CsvSource, TableSource, Trainer, TrainerConfig};
use std::error::Error;
use std::fmt::Write as _;
use tracing_subscriber::EnvFilter;

const TRAINER_TOML: &str = r#"
[forest]
n_estimators = 60
seed = 11
criterion = "entropy"
"#;

fn export_csv() -> String {
    let mut out = String::from("_id,Level,Health,Energy,Sanity,Rarity\n");
    for i in 0..60u32 {
        let level = (i * 37 % 100) as f64;
        let health = (i * 13 % 100) as f64;
        let energy = (i * 7 % 100) as f64;
        let sanity = (i * 53 % 100) as f64;
        let rarity = if level > 50.0 { "Rare" } else { "Common" };
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "{:024x},{},{},{},{},{}",
            i, level, health, energy, sanity, rarity
        );
    }
    out
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("monsters.csv");
    std::fs::write(&path, export_csv())?;

    let source = CsvSource::new(&path).drop_column("_id");
    let config = TrainerConfig::from_toml_str(TRAINER_TOML)?;
    println!("Trainer config: {:?}", config);

    let machine = Trainer::from_config(config)?.fit_source(&source)?;

    let mut rows = source.fetch()?;
    let truth = rows.labels("Rarity")?;
    rows.drop_column("Rarity");
    let predictions = machine.predict_batch(&rows)?;

    let correct = predictions
        .iter()
        .zip(&truth)
        .filter(|(p, t)| p.label == **t)
        .count();
    println!(
        "Training accuracy: {}/{} ({:.1}%)",
        correct,
        truth.len(),
        100.0 * correct as f64 / truth.len() as f64
    );
    println!("{}", machine.describe());

    Ok(())
}
