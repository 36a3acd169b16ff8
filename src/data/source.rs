use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use super::loader::{load_file, LoadError};
use super::model::CustomerTable;

/// Once-initialised holder for the base customer table.
///
/// The first successful [`DataSource::load`] reads the file; every later call
/// hands out the same `Arc` without touching the filesystem. A failed load is
/// not remembered, so the caller may retry. There is no invalidation: the
/// source is treated as static for the life of the process.
#[derive(Debug)]
pub struct DataSource {
    path: PathBuf,
    table: OnceLock<Arc<CustomerTable>>,
}

impl DataSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: OnceLock::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loaded(&self) -> bool {
        self.table.get().is_some()
    }

    pub fn load(&self) -> Result<Arc<CustomerTable>, LoadError> {
        if let Some(table) = self.table.get() {
            log::debug!("Reusing cached customer table ({} rows)", table.len());
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(load_file(&self.path)?);
        Ok(Arc::clone(self.table.get_or_init(|| table)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "customer_status,age,gender,marital_status,income_category,card_category,\
no_of_products,months_inactive_12_mon,contacts_count_12_mon,credit_limit,total_trans_amt,\
total_trans_ct,avg_utilization_ratio\n\
Attrited Customer,40,M,Married,Unknown,Blue,2,3,3,1500.0,800,18,0.9\n";

    #[test]
    fn second_load_reuses_the_first_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.csv");
        std::fs::write(&path, CSV).unwrap();

        let source = DataSource::new(&path);
        assert!(!source.is_loaded());
        let first = source.load().unwrap();

        // The file is gone, so a second read would fail.
        std::fs::remove_file(&path).unwrap();
        let second = source.load().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(source.is_loaded());
        assert_eq!(second.churned_count(), 1);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.csv");
        let source = DataSource::new(&path);

        assert!(source.load().is_err());
        assert!(!source.is_loaded());

        std::fs::write(&path, CSV).unwrap();
        assert_eq!(source.load().unwrap().len(), 1);
    }
}
