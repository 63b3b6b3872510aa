//! In-memory SQLite database layer for the Madang bookstore dataset.
//!
//! This crate loads the three Madang CSV snapshots (books, customers,
//! orders) into an in-memory SQLite database and exposes typed query
//! methods for the reporting views.
//!
//! # Architecture
//!
//! - `Rc<RefCell<Connection>>` wrapper so one store handle can be created at
//!   startup and passed to every view in a single-threaded process
//! - In-memory SQLite via `rusqlite`; nothing is persisted, the CSVs are
//!   re-read on every cold start
//! - Table columns and types are inferred from each CSV (see [`schema`])
//! - Every user-supplied value reaches SQLite as a bound parameter
//! - Name search folds case with a Unicode-aware SQL function
//!
//! # Usage
//!
//! ```rust
//! use madang_db::{Database, MadangTable};
//!
//! let db = Database::new().unwrap();
//! db.load_table(MadangTable::Customer, "custid,name,address,phone\n1,Kim,Seoul,010\n").unwrap();
//! db.apply_seed_patch().unwrap();
//!
//! let customers = db.query_customers().unwrap();
//! assert_eq!(customers.len(), 2);
//! ```
//!
//! # Tables
//!
//! - `Book` - `bookid`, `bookname`, `publisher`, `price`
//! - `Customer` - `custid`, `name`, `address`, `phone`
//! - `Orders` - `orderid`, `custid`, `bookid`, `saleprice`, `orderdate`
//!
//! Extra CSV columns are loaded as well; the columns above are the ones
//! the queries rely on.

pub mod schema;
mod functions;
mod loader;
mod seed;
mod queries;
mod orders;
pub mod models;

pub use orders::NewOrder;
pub use queries::TOP_N;
pub use schema::MadangTable;
pub use seed::{SeedCustomer, SEED_CUSTOMER};

use rusqlite::Connection;
use std::cell::RefCell;
use std::rc::Rc;

/// In-memory SQLite database holding the Madang tables.
///
/// This struct is cheaply cloneable (via `Rc`); clones share the same
/// connection, so an order inserted through one clone is visible to all.
///
/// # Example
///
/// ```rust
/// use madang_db::{Database, MadangTable};
///
/// let db = Database::new().unwrap();
/// let rows = db
///     .load_table(MadangTable::Book, "bookid,bookname,publisher,price\n1,Golf Bible,Daehan,35000\n")
///     .unwrap();
/// assert_eq!(rows, 1);
/// ```
#[derive(Clone)]
pub struct Database {
    conn: Rc<RefCell<Connection>>,
}

impl Database {
    /// Create a new, empty in-memory database.
    ///
    /// Tables do not exist until they are loaded; use [`Database::load_table`]
    /// or [`Database::open_dataset`].
    pub fn new() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        functions::register(&conn)?;
        Ok(Self {
            conn: Rc::new(RefCell::new(conn)),
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::Database;
    use std::path::PathBuf;

    /// The checked-in `fixtures/` directory at the workspace root.
    pub fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../fixtures")
    }

    /// Database loaded from the checked-in Madang fixtures, without the seed patch.
    pub fn fixture_db() -> Database {
        Database::open_dataset(fixtures_dir()).unwrap()
    }

    /// Small database with ASCII names, for case-insensitivity checks.
    pub fn sample_db() -> Database {
        let db = Database::new().unwrap();
        db.load_table(
            crate::MadangTable::Book,
            "\
bookid,bookname,publisher,price
1,Football History,Good Sports,7000
2,Golf Bible,Daehan Media,35000
3,Olympic Champions,Pearson,13000
",
        )
        .unwrap();
        db.load_table(
            crate::MadangTable::Customer,
            "\
custid,name,address,phone
1,Kim Yuna,Seoul,000-6000-0001
2,Park Jisung,Manchester,000-5000-0001
3,Jang Miran,Gangwon,
",
        )
        .unwrap();
        db.load_table(
            crate::MadangTable::Orders,
            "\
orderid,custid,bookid,saleprice,orderdate
1,1,1,6000,2014-07-03
2,2,2,21000,2014-07-01
3,1,3,8000,2014-07-02
4,3,3,12000,2014-07-05
",
        )
        .unwrap();
        db
    }
}
