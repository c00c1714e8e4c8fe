//! CSV-backed table source.
//!
//! A column is loaded as [`Column::Numeric`] when every cell parses as `f64`
//! (after trimming) and as [`Column::Categorical`] otherwise.

use ::csv::ReaderBuilder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use crate::dataset::{Column, Table, TableError, TableSource};

/// Reads a whole CSV file (with a header row) as a [`Table`].
#[derive(Clone, Debug)]
pub struct CsvSource {
    path: PathBuf,
    drop_columns: Vec<String>,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            drop_columns: Vec::new(),
        }
    }

    /// Drop a column after loading, e.g. a store-assigned record id.
    ///
    /// Absent columns are ignored.
    pub fn drop_column(mut self, name: impl Into<String>) -> Self {
        self.drop_columns.push(name.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TableSource for CsvSource {
    fn fetch(&self) -> Result<Table, TableError> {
        let file = File::open(&self.path).map_err(|source| TableError::Io {
            path: self.path.clone(),
            source,
        })?;
        let mut table = read_csv(BufReader::new(file))?;
        for name in &self.drop_columns {
            table.drop_column(name);
        }
        tracing::debug!(
            path = %self.path.display(),
            rows = table.n_rows(),
            columns = table.n_columns(),
            "loaded CSV table"
        );
        Ok(table)
    }
}

/// Parse CSV data with a header row into a [`Table`].
pub fn read_csv<R: Read>(reader: R) -> Result<Table, TableError> {
    let mut rdr = ReaderBuilder::new().from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for result in rdr.records() {
        let record = result?;
        for (col, value) in record.iter().enumerate() {
            if let Some(column) = cells.get_mut(col) {
                column.push(value.to_string());
            }
        }
    }

    let mut table = Table::new();
    for (name, values) in headers.into_iter().zip(cells) {
        table.push_column(name, infer_column(values))?;
    }
    Ok(table)
}

fn infer_column(values: Vec<String>) -> Column {
    let parsed: Option<Vec<f64>> = values.iter().map(|v| v.trim().parse().ok()).collect();
    match parsed {
        Some(numbers) => Column::Numeric(numbers),
        None => Column::Categorical(values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MONSTERS: &str = "\
_id,Name,Level,Health,Energy,Sanity,Rarity
a1,Goblin,3,12.5,40,90,Common
b2,Dragon,91,88.25,77,10,Rare
";

    #[test]
    fn test_read_csv_infers_column_kinds() {
        let table = read_csv(MONSTERS.as_bytes()).unwrap();
        assert_eq!(table.n_rows(), 2);
        assert_eq!(
            table.column("Level"),
            Some(&Column::Numeric(vec![3.0, 91.0]))
        );
        assert!(matches!(table.column("Rarity"), Some(Column::Categorical(_))));
        assert!(matches!(table.column("_id"), Some(Column::Categorical(_))));
    }

    #[test]
    fn test_read_csv_header_only() {
        let table = read_csv("Level,Rarity\n".as_bytes()).unwrap();
        assert_eq!(table.n_columns(), 2);
        assert_eq!(table.n_rows(), 0);
    }

    #[test]
    fn test_read_csv_ragged_rows_fail() {
        let result = read_csv("Level,Rarity\n1,Common\n2\n".as_bytes());
        assert!(matches!(result, Err(TableError::Csv(_))));
    }

    #[test]
    fn test_csv_source_drops_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("monsters.csv");
        let mut file = File::create(&path).unwrap();
        file.write_all(MONSTERS.as_bytes()).unwrap();

        let table = CsvSource::new(&path).drop_column("_id").fetch().unwrap();
        assert!(table.column("_id").is_none());
        assert_eq!(table.column_names()[0], "Name");
    }

    #[test]
    fn test_csv_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = CsvSource::new(dir.path().join("absent.csv")).fetch();
        assert!(matches!(result, Err(TableError::Io { .. })));
    }
}
