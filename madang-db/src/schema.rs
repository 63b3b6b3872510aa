//! Table definitions inferred from CSV snapshots.
//!
//! The Madang CSV files carry no schema of their own, so each table is
//! created from its header row with a column type inferred from the cell
//! contents. The columns the query service depends on are declared per
//! table in [`MadangTable::required_columns`] and checked against the
//! inferred schema before anything is created.

use anyhow::bail;
use csv::StringRecord;
use madang_utils::dates::is_iso_date;
use rusqlite::types::Value;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// The three tables of the Madang dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MadangTable {
    Book,
    Customer,
    Orders,
}

/// A column the queries rely on, with the type it is declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredColumn {
    pub name: &'static str,
    pub column_type: ColumnType,
    /// Wider type accepted when the CSV values do not fit `column_type`.
    /// `Text` accepts any values and stores them as text.
    pub widens_to: Option<ColumnType>,
    pub not_null: bool,
}

const fn required(name: &'static str, column_type: ColumnType, not_null: bool) -> RequiredColumn {
    RequiredColumn {
        name,
        column_type,
        widens_to: None,
        not_null,
    }
}

const fn widening(
    name: &'static str,
    column_type: ColumnType,
    widens_to: ColumnType,
    not_null: bool,
) -> RequiredColumn {
    RequiredColumn {
        name,
        column_type,
        widens_to: Some(widens_to),
        not_null,
    }
}

impl RequiredColumn {
    /// Type the column is created with, given the type inferred from `values`
    /// non-empty cells. `None` means the values cannot serve this column.
    pub fn resolve(&self, inferred: ColumnType, values: usize) -> Option<ColumnType> {
        if values == 0 || inferred == self.column_type {
            return Some(self.column_type);
        }
        match (self.column_type, self.widens_to) {
            (ColumnType::Text, _) | (_, Some(ColumnType::Text)) => Some(ColumnType::Text),
            (_, Some(wider)) if wider == inferred => Some(wider),
            _ => None,
        }
    }
}

const BOOK_COLUMNS: &[RequiredColumn] = &[
    required("bookid", ColumnType::Integer, true),
    required("bookname", ColumnType::Text, true),
    required("publisher", ColumnType::Text, false),
    widening("price", ColumnType::Integer, ColumnType::Real, false),
];

const CUSTOMER_COLUMNS: &[RequiredColumn] = &[
    required("custid", ColumnType::Integer, true),
    required("name", ColumnType::Text, true),
    required("address", ColumnType::Text, false),
    required("phone", ColumnType::Text, false),
];

const ORDERS_COLUMNS: &[RequiredColumn] = &[
    required("orderid", ColumnType::Integer, true),
    required("custid", ColumnType::Integer, true),
    required("bookid", ColumnType::Integer, true),
    widening("saleprice", ColumnType::Integer, ColumnType::Real, true),
    widening("orderdate", ColumnType::Date, ColumnType::Text, false),
];

impl MadangTable {
    /// All tables, in load order.
    pub const ALL: [MadangTable; 3] = [MadangTable::Book, MadangTable::Customer, MadangTable::Orders];

    /// SQL table name.
    pub fn table_name(self) -> &'static str {
        match self {
            MadangTable::Book => "Book",
            MadangTable::Customer => "Customer",
            MadangTable::Orders => "Orders",
        }
    }

    /// CSV file name inside the dataset directory.
    pub fn file_name(self) -> &'static str {
        match self {
            MadangTable::Book => "Book_madang.csv",
            MadangTable::Customer => "Customer_madang.csv",
            MadangTable::Orders => "Orders_madang.csv",
        }
    }

    /// Columns the query service reads from this table.
    pub fn required_columns(self) -> &'static [RequiredColumn] {
        match self {
            MadangTable::Book => BOOK_COLUMNS,
            MadangTable::Customer => CUSTOMER_COLUMNS,
            MadangTable::Orders => ORDERS_COLUMNS,
        }
    }
}

impl fmt::Display for MadangTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

impl FromStr for MadangTable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "book" | "books" => Ok(MadangTable::Book),
            "customer" | "customers" => Ok(MadangTable::Customer),
            "order" | "orders" => Ok(MadangTable::Orders),
            other => Err(format!(
                "unknown table '{}', expected one of: book, customer, orders",
                other
            )),
        }
    }
}

/// Column type inferred from CSV contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ColumnType {
    Integer,
    Real,
    /// ISO `YYYY-MM-DD` calendar date, stored as text.
    Date,
    Text,
}

impl ColumnType {
    /// Declared SQLite column type.
    ///
    /// Dates are declared `TEXT` so the ISO strings keep text affinity and
    /// sort chronologically.
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Date | ColumnType::Text => "TEXT",
        }
    }

    /// Infer a column type from its cells.
    ///
    /// Empty cells are ignored. The narrowest type that accepts every
    /// remaining cell wins, in the order integer, real, date, text. A column
    /// with no values at all is text.
    pub fn infer<'a>(cells: impl IntoIterator<Item = &'a str>) -> ColumnType {
        let mut seen = false;
        let mut integer = true;
        let mut real = true;
        let mut date = true;

        for cell in cells {
            let cell = cell.trim();
            if cell.is_empty() {
                continue;
            }
            seen = true;
            integer = integer && cell.parse::<i64>().is_ok();
            real = real && cell.parse::<f64>().map(f64::is_finite).unwrap_or(false);
            date = date && is_iso_date(cell);
            if !integer && !real && !date {
                break;
            }
        }

        match (seen, integer, real, date) {
            (false, ..) => ColumnType::Text,
            (true, true, _, _) => ColumnType::Integer,
            (true, false, true, _) => ColumnType::Real,
            (true, false, false, true) => ColumnType::Date,
            _ => ColumnType::Text,
        }
    }

    /// Convert one CSV cell into the SQL value stored for this type.
    pub fn to_value(self, cell: &str) -> anyhow::Result<Value> {
        let cell = cell.trim();
        if cell.is_empty() {
            return Ok(Value::Null);
        }
        Ok(match self {
            ColumnType::Integer => Value::Integer(cell.parse()?),
            ColumnType::Real => Value::Real(cell.parse()?),
            ColumnType::Date | ColumnType::Text => Value::Text(cell.to_string()),
        })
    }
}

/// One column of an inferred table.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
    pub not_null: bool,
    /// Number of non-empty cells seen for this column.
    pub values: usize,
}

/// Schema of a table built from a CSV snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    /// Infer a schema from a header row and the data rows beneath it.
    ///
    /// Fails if the header is missing, a header name is empty, or two
    /// names collide (SQLite identifiers are case-insensitive).
    pub fn infer(table: &str, headers: &StringRecord, rows: &[StringRecord]) -> anyhow::Result<Self> {
        if headers.is_empty() {
            bail!("{}: CSV has no header row", table);
        }

        let mut columns: Vec<ColumnDef> = Vec::with_capacity(headers.len());
        for (idx, raw) in headers.iter().enumerate() {
            let name = raw.trim();
            if name.is_empty() {
                bail!("{}: header column {} is empty", table, idx + 1);
            }
            if columns.iter().any(|c| c.name.eq_ignore_ascii_case(name)) {
                bail!("{}: duplicate header column '{}'", table, name);
            }
            let cells = rows.iter().map(move |r| r.get(idx).unwrap_or(""));
            columns.push(ColumnDef {
                name: name.to_string(),
                column_type: ColumnType::infer(cells.clone()),
                not_null: false,
                values: cells.filter(|c| !c.trim().is_empty()).count(),
            });
        }

        Ok(Self {
            table: table.to_string(),
            columns,
        })
    }

    /// Check the inferred columns against the columns the queries need.
    ///
    /// A required column that is absent, or whose values fit neither its
    /// declared type nor its wider fallback, makes the CSV malformed. A
    /// required column with no values takes its declared type.
    pub fn reconcile(&mut self, required: &[RequiredColumn]) -> anyhow::Result<()> {
        for req in required {
            let Some(column) = self
                .columns
                .iter_mut()
                .find(|c| c.name.eq_ignore_ascii_case(req.name))
            else {
                bail!("{}: missing required column '{}'", self.table, req.name);
            };

            let Some(resolved) = req.resolve(column.column_type, column.values) else {
                bail!(
                    "{}: column '{}' should be {:?} but holds {:?} values",
                    self.table,
                    column.name,
                    req.column_type,
                    column.column_type
                );
            };
            if resolved != req.column_type {
                log::info!(
                    "[Madang Debug] schema: {}.{} widened from {:?} to {:?}",
                    self.table,
                    column.name,
                    req.column_type,
                    resolved
                );
            }
            column.column_type = resolved;
            column.not_null = req.not_null;
        }
        Ok(())
    }

    /// `CREATE TABLE` statement for this schema.
    pub fn create_sql(&self) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let mut def = format!("{} {}", quote_ident(&c.name), c.column_type.sql_type());
                if c.not_null {
                    def.push_str(" NOT NULL");
                }
                def
            })
            .collect();
        format!(
            "CREATE TABLE {} (\n    {}\n)",
            quote_ident(&self.table),
            columns.join(",\n    ")
        )
    }

    /// Parameterized `INSERT` statement covering every column.
    pub fn insert_sql(&self) -> String {
        let names: Vec<String> = self.columns.iter().map(|c| quote_ident(&c.name)).collect();
        let placeholders: Vec<String> = (1..=self.columns.len()).map(|i| format!("?{}", i)).collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(&self.table),
            names.join(", "),
            placeholders.join(", ")
        )
    }

    /// Convert a CSV record into bound values in column order.
    pub fn row_values(&self, record: &StringRecord) -> anyhow::Result<Vec<Value>> {
        self.columns
            .iter()
            .enumerate()
            .map(|(idx, c)| c.column_type.to_value(record.get(idx).unwrap_or("")))
            .collect()
    }
}

/// Quote an SQL identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
