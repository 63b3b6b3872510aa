//! CSV data loading functions for populating the in-memory SQLite database.
//!
//! Each table is created from its CSV snapshot in one transaction: the
//! header row names the columns, [`TableSchema::infer`] picks the column
//! types, and every row is inserted through a prepared statement.
//!
//! # Dataset Layout
//!
//! A dataset directory holds three files, loaded in this order:
//!
//! - `Book_madang.csv`: `bookid,bookname,publisher,price`
//! - `Customer_madang.csv`: `custid,name,address,phone`
//! - `Orders_madang.csv`: `orderid,custid,bookid,saleprice,orderdate`

use crate::schema::{MadangTable, TableSchema};
use crate::Database;
use anyhow::Context;
use std::path::Path;

impl Database {
    /// Open a new database and load all three tables from `base_dir`.
    ///
    /// Any missing or malformed file aborts the whole load; the partially
    /// filled database is dropped with the error.
    pub fn open_dataset(base_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let db = Self::new()?;
        db.load_dataset(base_dir)?;
        Ok(db)
    }

    /// Load `Book`, `Customer` and `Orders` from the CSV files in `base_dir`.
    pub fn load_dataset(&self, base_dir: impl AsRef<Path>) -> anyhow::Result<()> {
        let base_dir = base_dir.as_ref();
        for table in MadangTable::ALL {
            let path = base_dir.join(table.file_name());
            let csv_data = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            self.load_table(table, &csv_data)
                .with_context(|| format!("failed to load {}", path.display()))?;
        }
        log::info!(
            "[Madang Debug] loader: Loaded dataset from {}",
            base_dir.display()
        );
        Ok(())
    }

    /// Create `table` from CSV text (with headers) and insert its rows.
    ///
    /// Returns the number of rows loaded. Ragged rows, bad headers, or a
    /// required column with the wrong type fail the load. A table can only
    /// be loaded once per database.
    ///
    /// # Example CSV
    /// ```text
    /// custid,name,address,phone
    /// 1,박지성,영국 맨체스타,000-5000-0001
    /// ```
    pub fn load_table(&self, table: MadangTable, csv_data: &str) -> anyhow::Result<usize> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(csv_data.as_bytes());

        let headers = rdr.headers()?.clone();
        let records = rdr
            .records()
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("{}: malformed CSV row", table))?;

        let mut schema = TableSchema::infer(table.table_name(), &headers, &records)?;
        schema.reconcile(table.required_columns())?;

        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;
        tx.execute_batch(&schema.create_sql())
            .with_context(|| format!("failed to create table {}", table))?;
        {
            let mut stmt = tx.prepare(&schema.insert_sql())?;
            for (idx, record) in records.iter().enumerate() {
                let values = schema
                    .row_values(record)
                    .with_context(|| format!("{}: bad value in data row {}", table, idx + 1))?;
                stmt.execute(rusqlite::params_from_iter(values))
                    .with_context(|| format!("{}: failed to insert data row {}", table, idx + 1))?;
            }
        }
        tx.commit()?;

        log::info!(
            "[Madang Debug] loader: Loaded {} rows into {} ({} columns)",
            records.len(),
            table,
            schema.columns.len()
        );
        Ok(records.len())
    }
}
