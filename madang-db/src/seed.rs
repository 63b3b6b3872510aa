//! Post-load patch that guarantees the demo customer row exists.

use crate::models::Customer;
use crate::Database;
use rusqlite::params;

/// Fixture customer written by [`Database::apply_seed_patch`].
pub struct SeedCustomer {
    pub custid: i64,
    pub name: &'static str,
    pub address: &'static str,
    pub phone: &'static str,
}

pub const SEED_CUSTOMER: SeedCustomer = SeedCustomer {
    custid: 6,
    name: "정혜령",
    address: "대한민국 인천",
    phone: "010-2873-1807",
};

impl SeedCustomer {
    /// The fixture as a `Customer` row.
    pub fn to_customer(&self) -> Customer {
        Customer {
            custid: self.custid,
            name: self.name.to_string(),
            address: Some(self.address.to_string()),
            phone: Some(self.phone.to_string()),
        }
    }
}

impl Database {
    /// Replace every `Customer` row carrying the fixture id with the fixture row.
    ///
    /// Must run after the `Customer` table is loaded and before queries are
    /// served. Delete and insert share one transaction, so afterwards exactly
    /// one row has the fixture id whether or not the CSV contained it.
    pub fn apply_seed_patch(&self) -> anyhow::Result<()> {
        let seed = &SEED_CUSTOMER;
        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM Customer WHERE custid = ?1", params![seed.custid])?;
        tx.execute(
            "INSERT INTO Customer (custid, name, address, phone) VALUES (?1, ?2, ?3, ?4)",
            params![seed.custid, seed.name, seed.address, seed.phone],
        )?;
        tx.commit()?;
        log::info!(
            "[Madang Debug] seed: Patched customer {} (replaced {} existing rows)",
            seed.custid,
            removed
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SEED_CUSTOMER;
    use crate::test_support::fixture_db;
    use crate::{Database, MadangTable};

    fn seeded_rows(db: &Database) -> Vec<crate::models::Customer> {
        db.query_customers()
            .unwrap()
            .into_iter()
            .filter(|c| c.custid == SEED_CUSTOMER.custid)
            .collect()
    }

    #[test]
    fn seed_patch_adds_missing_customer() {
        let db = fixture_db();
        assert!(seeded_rows(&db).is_empty(), "Fixture CSV has no custid 6");

        db.apply_seed_patch().unwrap();

        assert_eq!(seeded_rows(&db), vec![SEED_CUSTOMER.to_customer()]);
        assert_eq!(db.query_table_count(MadangTable::Customer).unwrap(), 6);
    }

    #[test]
    fn seed_patch_replaces_existing_customer() {
        let db = Database::new().unwrap();
        let csv = "\
custid,name,address,phone
1,Kim,Seoul,000-6000-0001
6,Someone Else,Busan,000-0000-0006
6,Duplicate,Daegu,000-0000-0066
";
        db.load_table(MadangTable::Customer, csv).unwrap();

        db.apply_seed_patch().unwrap();

        assert_eq!(seeded_rows(&db), vec![SEED_CUSTOMER.to_customer()]);
        assert_eq!(db.query_table_count(MadangTable::Customer).unwrap(), 2);
    }

    #[test]
    fn seed_patch_is_repeatable() {
        let db = fixture_db();
        db.apply_seed_patch().unwrap();
        db.apply_seed_patch().unwrap();
        assert_eq!(seeded_rows(&db).len(), 1);
    }

    #[test]
    fn seed_patch_requires_customer_table() {
        let db = Database::new().unwrap();
        assert!(db.apply_seed_patch().is_err());
    }
}
