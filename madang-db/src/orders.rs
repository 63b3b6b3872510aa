//! Manual order entry.

use crate::models::InsertedOrder;
use crate::Database;
use chrono::NaiveDate;
use madang_utils::dates;
use madang_utils::error::FieldError;
use madang_utils::fields::parse_int_field;
use rusqlite::{params, Transaction};

/// A validated order waiting to be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewOrder {
    pub custid: i64,
    pub bookid: i64,
    pub saleprice: i64,
}

impl NewOrder {
    /// Validate the raw order form fields.
    ///
    /// Each field must be an integer (surrounding whitespace is ignored).
    /// The first invalid field is reported; nothing touches the database.
    pub fn parse(custid: &str, bookid: &str, saleprice: &str) -> Result<Self, FieldError> {
        Ok(Self {
            custid: parse_int_field("custid", custid)?,
            bookid: parse_int_field("bookid", bookid)?,
            saleprice: parse_int_field("saleprice", saleprice)?,
        })
    }
}

impl Database {
    /// Append an order dated today (local time).
    pub fn insert_order(&self, order: &NewOrder) -> anyhow::Result<InsertedOrder> {
        self.insert_order_on(order, dates::today())
    }

    /// Validate raw form fields and append the order dated today.
    ///
    /// A validation failure is returned as a [`FieldError`] inside the
    /// `anyhow::Error` and leaves `Orders` untouched.
    pub fn insert_order_form(
        &self,
        custid: &str,
        bookid: &str,
        saleprice: &str,
    ) -> anyhow::Result<InsertedOrder> {
        let order = NewOrder::parse(custid, bookid, saleprice)?;
        self.insert_order(&order)
    }

    /// Append an order with an explicit order date.
    ///
    /// The new `orderid` is one more than the largest existing id (1 for an
    /// empty table). Reading the maximum and inserting happen in one
    /// transaction. Unknown customer or book ids are logged and the row is
    /// still written.
    pub fn insert_order_on(
        &self,
        order: &NewOrder,
        orderdate: NaiveDate,
    ) -> anyhow::Result<InsertedOrder> {
        let orderdate = dates::format_date(&orderdate);
        let mut conn = self.conn.borrow_mut();
        let tx = conn.transaction()?;

        let orderid: i64 = tx.query_row(
            "SELECT COALESCE(MAX(orderid), 0) + 1 FROM Orders",
            [],
            |row| row.get(0),
        )?;
        warn_on_dangling_refs(&tx, order)?;

        tx.execute(
            "INSERT INTO Orders (orderid, custid, bookid, saleprice, orderdate)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![orderid, order.custid, order.bookid, order.saleprice, orderdate],
        )?;
        tx.commit()?;

        log::info!(
            "[Madang Debug] orders: Inserted order {} (custid {}, bookid {}, saleprice {})",
            orderid,
            order.custid,
            order.bookid,
            order.saleprice
        );
        Ok(InsertedOrder {
            orderid,
            custid: order.custid,
            bookid: order.bookid,
            saleprice: order.saleprice,
            orderdate,
        })
    }
}

fn warn_on_dangling_refs(tx: &Transaction<'_>, order: &NewOrder) -> anyhow::Result<()> {
    let customer_known: bool = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM Customer WHERE custid = ?1)",
        params![order.custid],
        |row| row.get(0),
    )?;
    if !customer_known {
        log::warn!(
            "[Madang Debug] orders: custid {} has no Customer row",
            order.custid
        );
    }

    let book_known: bool = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM Book WHERE bookid = ?1)",
        params![order.bookid],
        |row| row.get(0),
    )?;
    if !book_known {
        log::warn!(
            "[Madang Debug] orders: bookid {} has no Book row",
            order.bookid
        );
    }
    Ok(())
}
