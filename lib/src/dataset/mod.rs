//! Tabular data with named columns.
//!
//! A [`Table`] is the input boundary of the library: training data and
//! prediction rows are both tables. Columns are addressed by name and hold
//! either numeric values (features) or categorical strings (labels).
//!
//! Tables are usually fetched from a [`TableSource`], which hides where the
//! records come from (an in-memory table, a CSV export, a document store).
//!
//! # Example
//!
//! ```rust
//! use forest_machine::dataset::{Column, Table};
//!
//! let table = Table::new()
//!     .with_numeric("Level", vec![12.0, 87.0])
//!     .unwrap()
//!     .with_categorical("Rarity", vec!["Common".into(), "Rare".into()])
//!     .unwrap();
//!
//! assert_eq!(table.n_rows(), 2);
//! assert!(matches!(table.column("Level"), Some(Column::Numeric(_))));
//! ```

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

pub mod csv;
pub mod memory;

pub use self::csv::CsvSource;
pub use self::memory::InMemorySource;

/// Error type for table construction and loading.
#[derive(Debug, Error)]
pub enum TableError {
    /// A column with this name already exists.
    #[error("Duplicate column '{0}'")]
    DuplicateColumn(String),
    /// A column's length differs from the table's row count.
    #[error("Column '{column}' has {got} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },
    /// A requested column is absent.
    #[error("Missing column '{0}'")]
    MissingColumn(String),
    /// A column used as a feature holds categorical values.
    #[error("Column '{0}' is not numeric")]
    NotNumeric(String),
    /// Malformed CSV input.
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
    /// The source could not be read.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A single named column of a [`Table`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Column {
    /// Real-valued data, usable as a feature.
    Numeric(Vec<f64>),
    /// String data, usable as a label.
    Categorical(Vec<String>),
}

impl Column {
    /// Number of values in the column.
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(values) => values.len(),
            Column::Categorical(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric values, or `None` for a categorical column.
    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            Column::Numeric(values) => Some(values),
            Column::Categorical(_) => None,
        }
    }

    /// Values rendered as label strings.
    ///
    /// Numeric columns are formatted with `f64`'s `Display`, so `2.0`
    /// becomes `"2"`.
    pub fn to_labels(&self) -> Vec<String> {
        match self {
            Column::Numeric(values) => values.iter().map(|v| v.to_string()).collect(),
            Column::Categorical(values) => values.clone(),
        }
    }
}

/// Ordered collection of uniquely named, equally long columns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Column>,
}

impl Table {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a single-row table of numeric values, e.g. a prediction input.
    ///
    /// Column order follows the iterator order.
    pub fn from_row<I, S>(values: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut table = Table::new();
        for (name, value) in values {
            table.push_column(name, Column::Numeric(vec![value]))?;
        }
        Ok(table)
    }

    /// Append a column.
    ///
    /// The first column fixes the row count; later columns must match it.
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        column: Column,
    ) -> Result<(), TableError> {
        let name = name.into();
        if self.names.iter().any(|n| *n == name) {
            return Err(TableError::DuplicateColumn(name));
        }
        if let Some(first) = self.columns.first() {
            if first.len() != column.len() {
                return Err(TableError::LengthMismatch {
                    column: name,
                    expected: first.len(),
                    got: column.len(),
                });
            }
        }
        self.names.push(name);
        self.columns.push(column);
        Ok(())
    }

    /// Builder form of [`Table::push_column`] for numeric data.
    pub fn with_numeric(
        mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<Self, TableError> {
        self.push_column(name, Column::Numeric(values))?;
        Ok(self)
    }

    /// Builder form of [`Table::push_column`] for categorical data.
    pub fn with_categorical(
        mut self,
        name: impl Into<String>,
        values: Vec<String>,
    ) -> Result<Self, TableError> {
        self.push_column(name, Column::Categorical(values))?;
        Ok(self)
    }

    /// Remove a column, returning it if it existed.
    pub fn drop_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.names.iter().position(|n| n == name)?;
        self.names.remove(idx);
        Some(self.columns.remove(idx))
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map_or(0, Column::len)
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    /// Column names in table order.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        let idx = self.names.iter().position(|n| n == name)?;
        self.columns.get(idx)
    }

    /// Iterate `(name, column)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter())
    }

    /// Extract an `(n_rows, names.len())` feature matrix, columns in the
    /// order given by `names`.
    pub fn feature_matrix<S: AsRef<str>>(&self, names: &[S]) -> Result<Array2<f64>, TableError> {
        let mut selected = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let column = self
                .column(name)
                .ok_or_else(|| TableError::MissingColumn(name.to_string()))?;
            let values = column
                .as_numeric()
                .ok_or_else(|| TableError::NotNumeric(name.to_string()))?;
            selected.push(values);
        }
        Ok(Array2::from_shape_fn(
            (self.n_rows(), selected.len()),
            |(row, col)| selected[col][row],
        ))
    }

    /// Extract a label vector from the named column.
    pub fn labels(&self, name: &str) -> Result<Vec<String>, TableError> {
        self.column(name)
            .map(Column::to_labels)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }
}

/// Anything that can hand out all of its records as a [`Table`].
///
/// Implementations decide where the records live; callers only see the
/// resulting table.
pub trait TableSource {
    /// Fetch every record.
    fn fetch(&self) -> Result<Table, TableError>;
}
