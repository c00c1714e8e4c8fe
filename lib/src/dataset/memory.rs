use crate::dataset::{Table, TableError, TableSource};

/// A [`TableSource`] backed by a table held in memory.
#[derive(Clone, Debug)]
pub struct InMemorySource {
    table: Table,
}

impl InMemorySource {
    pub fn new(table: Table) -> Self {
        Self { table }
    }
}

impl From<Table> for InMemorySource {
    fn from(table: Table) -> Self {
        Self::new(table)
    }
}

impl TableSource for InMemorySource {
    fn fetch(&self) -> Result<Table, TableError> {
        Ok(self.table.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_returns_copy() {
        let table = Table::new().with_numeric("Level", vec![1.0, 2.0]).unwrap();
        let source = InMemorySource::from(table.clone());
        assert_eq!(source.fetch().unwrap(), table);
        assert_eq!(source.fetch().unwrap(), table);
    }
}
