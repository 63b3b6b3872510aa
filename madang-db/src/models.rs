//! Query result model structs for the Madang views.
//!
//! All structs derive `Serialize` so the command layer can print them as
//! JSON as well as plain-text tables.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, Value, ValueRef};
use serde::Serialize;
use std::fmt;

/// A row of the `Customer` table.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Customer {
    pub custid: i64,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// A price or price sum read back from SQLite.
///
/// Whole-number price columns stay integers; a CSV with fractional prices
/// loads its column as `REAL` and yields `Real` here.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, PartialOrd)]
#[serde(untagged)]
pub enum Amount {
    Integer(i64),
    Real(f64),
}

impl Amount {
    pub fn as_f64(self) -> f64 {
        match self {
            Amount::Integer(i) => i as f64,
            Amount::Real(r) => r,
        }
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Integer(i) => Ok(Amount::Integer(i)),
            ValueRef::Real(r) => Ok(Amount::Real(r)),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Integer(i) => write!(f, "{}", i),
            Amount::Real(r) => write!(f, "{}", r),
        }
    }
}

/// Summed sale price for one customer or book, as shown in the top-10 views.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SalesTotal {
    /// Customer name or book name.
    pub label: String,
    /// Sum of `saleprice` over the grouped orders.
    pub total_sales: Amount,
}

/// A (label, total) pair ready for a bar chart.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

impl From<&SalesTotal> for ChartPoint {
    fn from(total: &SalesTotal) -> Self {
        ChartPoint {
            label: total.label.clone(),
            value: total.total_sales.as_f64(),
        }
    }
}

/// Convert a revenue ranking into bar chart points, preserving rank order.
pub fn chart_series(totals: &[SalesTotal]) -> Vec<ChartPoint> {
    totals.iter().map(ChartPoint::from).collect()
}

/// One order matched by the customer name search.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderMatch {
    pub name: String,
    pub bookname: String,
    /// Order date as stored, normally ISO `YYYY-MM-DD`; absent when the
    /// source row had no date.
    pub orderdate: Option<String>,
    pub saleprice: Amount,
}

/// A `(bookid, bookname)` entry for the order form's book selector.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BookChoice {
    pub bookid: i64,
    pub bookname: String,
}

impl fmt::Display for BookChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.bookid, self.bookname)
    }
}

/// The row written by an order insert.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InsertedOrder {
    pub orderid: i64,
    pub custid: i64,
    pub bookid: i64,
    pub saleprice: i64,
    pub orderdate: String,
}

/// A single SQL value from the raw table browser.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<Value> for CellValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => CellValue::Null,
            Value::Integer(i) => CellValue::Integer(i),
            Value::Real(r) => CellValue::Real(r),
            Value::Text(t) => CellValue::Text(t),
            Value::Blob(b) => CellValue::Text(format!("<{} bytes>", b.len())),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Real(r) => write!(f, "{}", r),
            CellValue::Text(t) => f.write_str(t),
        }
    }
}

/// Raw contents of one table: column names and rows in storage order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TableView {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_series_keeps_rank_order() {
        let totals = vec![
            SalesTotal {
                label: "Park".to_string(),
                total_sales: Amount::Integer(39000),
            },
            SalesTotal {
                label: "Choo".to_string(),
                total_sales: Amount::Real(33000.5),
            },
        ];
        let series = chart_series(&totals);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].label, "Park");
        assert!((series[0].value - 39000.0).abs() < 0.01);
        assert_eq!(series[1].label, "Choo");
        assert!((series[1].value - 33000.5).abs() < 0.01);
    }

    #[test]
    fn amounts_keep_their_sql_type() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let (int, real): (Amount, Amount) = conn
            .query_row("SELECT 6000, 6000.5", [], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap();
        assert_eq!(int, Amount::Integer(6000));
        assert_eq!(real, Amount::Real(6000.5));
        assert_eq!(serde_json::to_string(&[int, real]).unwrap(), "[6000,6000.5]");
        assert_eq!(real.to_string(), "6000.5");
        assert!(conn
            .query_row("SELECT 'free'", [], |row| row.get::<_, Amount>(0))
            .is_err());
    }

    #[test]
    fn cell_values_serialize_as_plain_json() {
        let row = vec![
            CellValue::Integer(5),
            CellValue::Text("박세리".to_string()),
            CellValue::Null,
        ];
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"[5,"박세리",null]"#);
    }

    #[test]
    fn null_cells_display_empty() {
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(CellValue::Real(1.5).to_string(), "1.5");
    }
}
