//! Typed query methods backing the dashboard views.
//!
//! All queries return typed structs from [`crate::models`]. Free-text input
//! is always passed as a bound parameter.

use crate::models::{BookChoice, CellValue, Customer, OrderMatch, SalesTotal, TableView};
use crate::schema::{quote_ident, MadangTable};
use crate::Database;
use rusqlite::params;
use rusqlite::types::Value;

/// Number of entries in the revenue rankings.
pub const TOP_N: i64 = 10;

impl Database {
    /// Get every customer, in storage order.
    pub fn query_customers(&self) -> anyhow::Result<Vec<Customer>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare("SELECT custid, name, address, phone FROM Customer ORDER BY rowid")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Customer {
                    custid: row.get(0)?,
                    name: row.get(1)?,
                    address: row.get(2)?,
                    phone: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::info!(
            "[Madang Debug] query: query_customers returned {} records",
            rows.len()
        );
        Ok(rows)
    }

    /// Get the top customers by total sale price.
    ///
    /// Orders are joined to `Customer` and grouped by customer name, so two
    /// customers sharing a name are reported together. Orders whose `custid`
    /// has no customer row drop out of the join. Ties keep whatever order
    /// SQLite produces.
    pub fn query_customer_revenue(&self) -> anyhow::Result<Vec<SalesTotal>> {
        let rows = self.query_sales_totals(
            "SELECT c.name, SUM(o.saleprice) AS total_sales
             FROM Orders o
             JOIN Customer c ON o.custid = c.custid
             GROUP BY c.name
             ORDER BY total_sales DESC
             LIMIT ?1",
        )?;
        log::info!(
            "[Madang Debug] query: query_customer_revenue returned {} records",
            rows.len()
        );
        Ok(rows)
    }

    /// Get the top books by total sale price.
    ///
    /// Same shape as [`query_customer_revenue`](Self::query_customer_revenue),
    /// grouped by book name through the `Book` join.
    pub fn query_book_revenue(&self) -> anyhow::Result<Vec<SalesTotal>> {
        let rows = self.query_sales_totals(
            "SELECT b.bookname, SUM(o.saleprice) AS total_sales
             FROM Orders o
             JOIN Book b ON o.bookid = b.bookid
             GROUP BY b.bookname
             ORDER BY total_sales DESC
             LIMIT ?1",
        )?;
        log::info!(
            "[Madang Debug] query: query_book_revenue returned {} records",
            rows.len()
        );
        Ok(rows)
    }

    fn query_sales_totals(&self, sql: &str) -> anyhow::Result<Vec<SalesTotal>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params![TOP_N], |row| {
                Ok(SalesTotal {
                    label: row.get(0)?,
                    total_sales: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Search orders by a fragment of the customer name.
    ///
    /// Returns `None` without touching the database when `fragment` is
    /// empty. Otherwise matches customers whose lower-cased name contains the
    /// lower-cased fragment as a plain substring and returns their orders
    /// oldest first; `Some` of an empty vector means nothing matched. Case is
    /// folded with Unicode rules, not just for ASCII letters.
    pub fn search_orders(&self, fragment: &str) -> anyhow::Result<Option<Vec<OrderMatch>>> {
        if fragment.is_empty() {
            return Ok(None);
        }

        let conn = self.conn.borrow();
        // instr() instead of LIKE so '%' and '_' in the input match literally
        let mut stmt = conn.prepare(
            "SELECT c.name, b.bookname, o.orderdate, o.saleprice
             FROM Orders o
             JOIN Customer c ON o.custid = c.custid
             JOIN Book b ON o.bookid = b.bookid
             WHERE instr(unicode_lower(c.name), unicode_lower(?1)) > 0
             ORDER BY o.orderdate, o.orderid",
        )?;
        let rows = stmt
            .query_map(params![fragment], |row| {
                Ok(OrderMatch {
                    name: row.get(0)?,
                    bookname: row.get(1)?,
                    orderdate: row.get(2)?,
                    saleprice: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::info!(
            "[Madang Debug] query: search_orders returned {} records",
            rows.len()
        );
        Ok(Some(rows))
    }

    /// Get `(bookid, bookname)` pairs for the order form, ordered by id.
    pub fn query_book_choices(&self) -> anyhow::Result<Vec<BookChoice>> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare("SELECT bookid, bookname FROM Book ORDER BY bookid")?;
        let rows = stmt
            .query_map([], |row| {
                Ok(BookChoice {
                    bookid: row.get(0)?,
                    bookname: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::info!(
            "[Madang Debug] query: query_book_choices returned {} records",
            rows.len()
        );
        Ok(rows)
    }

    /// Get the raw contents of a table, every column, in storage order.
    pub fn query_table(&self, table: MadangTable) -> anyhow::Result<TableView> {
        let conn = self.conn.borrow();
        let mut stmt = conn.prepare(&format!(
            "SELECT * FROM {} ORDER BY rowid",
            quote_ident(table.table_name())
        ))?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();
        let rows = stmt
            .query_map([], |row| {
                (0..width)
                    .map(|idx| row.get::<_, Value>(idx).map(CellValue::from))
                    .collect::<Result<Vec<_>, _>>()
            })?
            .collect::<Result<Vec<_>, _>>()?;
        log::info!(
            "[Madang Debug] query: query_table({}) returned {} records",
            table,
            rows.len()
        );
        Ok(TableView {
            table: table.table_name().to_string(),
            columns,
            rows,
        })
    }

    /// Number of rows currently in `table`.
    pub fn query_table_count(&self, table: MadangTable) -> anyhow::Result<i64> {
        let conn = self.conn.borrow();
        let count = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", quote_ident(table.table_name())),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{Amount, CellValue, SalesTotal};
    use crate::test_support::{fixture_db, sample_db};
    use crate::{Database, MadangTable, TOP_N};

    fn total(label: &str, total_sales: i64) -> SalesTotal {
        SalesTotal {
            label: label.to_string(),
            total_sales: Amount::Integer(total_sales),
        }
    }

    fn assert_descending(totals: &[SalesTotal]) {
        for pair in totals.windows(2) {
            assert!(
                pair[0].total_sales >= pair[1].total_sales,
                "{:?} should not rank above {:?}",
                pair[1],
                pair[0]
            );
        }
    }

    /// Sum of `saleprice` over orders whose joined label is one of `labels`.
    fn orders_sum(db: &Database, join: &str, label_col: &str, labels: &[String]) -> i64 {
        let conn = db.conn.borrow();
        let mut sum = 0;
        for label in labels {
            let part: i64 = conn
                .query_row(
                    &format!(
                        "SELECT COALESCE(SUM(o.saleprice), 0) FROM Orders o {} WHERE {} = ?1",
                        join, label_col
                    ),
                    [label],
                    |row| row.get(0),
                )
                .unwrap();
            sum += part;
        }
        sum
    }

    #[test]
    fn query_customers_returns_all_rows_in_storage_order() {
        let db = fixture_db();
        let customers = db.query_customers().unwrap();
        assert_eq!(customers.len(), 5);
        let ids: Vec<i64> = customers.iter().map(|c| c.custid).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(customers[0].name, "박지성");
        assert_eq!(customers[4].phone, None);
    }

    #[test]
    fn query_customers_follows_insertion_not_key_order() {
        let db = Database::new().unwrap();
        db.load_table(
            MadangTable::Customer,
            "custid,name,address,phone\n3,Choo,Cleveland,\n1,Park,Manchester,\n2,Kim,Seoul,\n",
        )
        .unwrap();
        let ids: Vec<i64> = db.query_customers().unwrap().iter().map(|c| c.custid).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn query_customers_is_stable_between_calls() {
        let db = fixture_db();
        db.apply_seed_patch().unwrap();
        let first = db.query_customers().unwrap();
        let second = db.query_customers().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn query_customer_revenue_ranks_by_total() {
        let db = fixture_db();
        let totals = db.query_customer_revenue().unwrap();
        assert_eq!(
            totals,
            vec![
                total("박지성", 39000),
                total("추신수", 33000),
                total("장미란", 31000),
                total("김연아", 15000),
            ]
        );
    }

    #[test]
    fn query_book_revenue_ranks_by_total() {
        let db = fixture_db();
        let totals = db.query_book_revenue().unwrap();
        assert_eq!(totals.len(), 8, "Books 4 and 9 were never ordered");
        assert_descending(&totals);
        assert_eq!(totals[0], total("야구를 부탁해", 26000));
        assert_eq!(totals[1], total("축구의 이해", 21000));
        assert_eq!(totals[3], total("Olympic Champions", 19000));
        // The two 6000 entries tie; only their membership is fixed.
        let mut tail: Vec<&str> = totals[6..].iter().map(|t| t.label.as_str()).collect();
        tail.sort();
        assert_eq!(tail, vec!["역도 단계별기술", "축구의 역사"]);
    }

    #[test]
    fn revenue_totals_match_order_sums() {
        let db = fixture_db();

        let customers = db.query_customer_revenue().unwrap();
        let labels: Vec<String> = customers.iter().map(|t| t.label.clone()).collect();
        assert_eq!(
            customers.iter().map(|t| t.total_sales.as_f64()).sum::<f64>(),
            orders_sum(&db, "JOIN Customer c ON o.custid = c.custid", "c.name", &labels) as f64
        );

        let books = db.query_book_revenue().unwrap();
        let labels: Vec<String> = books.iter().map(|t| t.label.clone()).collect();
        assert_eq!(
            books.iter().map(|t| t.total_sales.as_f64()).sum::<f64>(),
            orders_sum(&db, "JOIN Book b ON o.bookid = b.bookid", "b.bookname", &labels) as f64
        );
    }

    #[test]
    fn revenue_rankings_stop_at_top_n() {
        let db = Database::new().unwrap();
        let mut books = String::from("bookid,bookname,publisher,price\n");
        let mut orders = String::from("orderid,custid,bookid,saleprice,orderdate\n");
        for id in 1..=12 {
            books.push_str(&format!("{id},Book {id},Pub,1000\n"));
            orders.push_str(&format!("{id},1,{id},{},2014-07-01\n", id * 1000));
        }
        db.load_table(MadangTable::Book, &books).unwrap();
        db.load_table(MadangTable::Orders, &orders).unwrap();

        let totals = db.query_book_revenue().unwrap();
        assert_eq!(totals.len() as i64, TOP_N);
        assert_descending(&totals);
        assert_eq!(totals[0], total("Book 12", 12000));
        assert_eq!(totals[9], total("Book 3", 3000));
    }

    #[test]
    fn customer_revenue_skips_dangling_orders() {
        let db = sample_db();
        {
            let conn = db.conn.borrow();
            conn.execute(
                "INSERT INTO Orders (orderid, custid, bookid, saleprice, orderdate)
                 VALUES (5, 99, 1, 50000, '2014-07-06')",
                [],
            )
            .unwrap();
        }
        let totals = db.query_customer_revenue().unwrap();
        assert_eq!(
            totals,
            vec![
                total("Park Jisung", 21000),
                total("Kim Yuna", 14000),
                total("Jang Miran", 12000),
            ]
        );
    }

    #[test]
    fn search_orders_empty_input_runs_nothing() {
        // No tables at all: an executed query would fail.
        let db = Database::new().unwrap();
        assert_eq!(db.search_orders("").unwrap(), None);
    }

    #[test]
    fn search_orders_no_match_is_empty_not_error() {
        let db = sample_db();
        assert_eq!(db.search_orders("zzz").unwrap(), Some(vec![]));
    }

    #[test]
    fn search_orders_is_case_insensitive() {
        let db = sample_db();
        let lower = db.search_orders("kim").unwrap().unwrap();
        let upper = db.search_orders("KIM").unwrap().unwrap();
        assert_eq!(lower, upper);
        assert_eq!(lower.len(), 2);
        assert!(lower.iter().all(|m| m.name == "Kim Yuna"));
    }

    #[test]
    fn search_orders_sorted_by_order_date() {
        let db = sample_db();
        // "i" appears in every sample name
        let matches = db.search_orders("i").unwrap().unwrap();
        let dates: Vec<&str> = matches
            .iter()
            .map(|m| m.orderdate.as_deref().unwrap())
            .collect();
        assert_eq!(dates, vec!["2014-07-01", "2014-07-02", "2014-07-03", "2014-07-05"]);
        assert_eq!(matches[0].bookname, "Golf Bible");
        assert_eq!(matches[0].saleprice, Amount::Integer(21000));
    }

    #[test]
    fn search_orders_folds_non_ascii_case() {
        let db = Database::new().unwrap();
        db.load_table(MadangTable::Book, "bookid,bookname,publisher,price\n1,Golf Bible,Daehan,35000\n")
            .unwrap();
        db.load_table(
            MadangTable::Customer,
            "custid,name,address,phone\n1,ÉMILE ÖZ,Lyon,\n2,Иван Петров,Moscow,\n",
        )
        .unwrap();
        db.load_table(
            MadangTable::Orders,
            "orderid,custid,bookid,saleprice,orderdate\n1,1,1,35000,2014-07-01\n2,2,1,30000,2014-07-02\n",
        )
        .unwrap();

        let upper = db.search_orders("ÉMILE").unwrap().unwrap();
        let lower = db.search_orders("émile").unwrap().unwrap();
        assert_eq!(upper.len(), 1);
        assert_eq!(upper, lower);
        assert_eq!(db.search_orders("öz").unwrap().unwrap(), upper);

        let cyrillic = db.search_orders("ИВАН").unwrap().unwrap();
        assert_eq!(cyrillic.len(), 1);
        assert_eq!(cyrillic[0].name, "Иван Петров");
        assert_eq!(db.search_orders("петров").unwrap().unwrap(), cyrillic);
    }

    #[test]
    fn search_orders_treats_input_literally() {
        let db = sample_db();
        for hostile in ["%", "_", "'", "' OR '1'='1", "Kim'; DROP TABLE Orders; --"] {
            assert_eq!(
                db.search_orders(hostile).unwrap(),
                Some(vec![]),
                "{:?} should match nothing",
                hostile
            );
        }
        assert_eq!(db.query_table_count(MadangTable::Orders).unwrap(), 4);
    }

    #[test]
    fn search_orders_matches_korean_names() {
        let db = fixture_db();
        let matches = db.search_orders("박").unwrap().unwrap();
        // 박지성 has three orders, 박세리 has none
        assert_eq!(matches.len(), 3);
        assert!(matches.iter().all(|m| m.name == "박지성"));
    }

    #[test]
    fn query_book_choices_ordered_by_id() {
        let db = fixture_db();
        let choices = db.query_book_choices().unwrap();
        assert_eq!(choices.len(), 10);
        assert_eq!(choices[0].bookid, 1);
        assert_eq!(choices[0].bookname, "축구의 역사");
        assert_eq!(choices[9].to_string(), "10 - Olympic Champions");
    }

    #[test]
    fn query_table_returns_raw_rows() {
        let db = fixture_db();
        let view = db.query_table(MadangTable::Orders).unwrap();
        assert_eq!(view.table, "Orders");
        assert_eq!(
            view.columns,
            vec!["orderid", "custid", "bookid", "saleprice", "orderdate"]
        );
        assert_eq!(view.rows.len(), 10);
        assert_eq!(
            view.rows[0],
            vec![
                CellValue::Integer(1),
                CellValue::Integer(1),
                CellValue::Integer(1),
                CellValue::Integer(6000),
                CellValue::Text("2014-07-01".to_string()),
            ]
        );
    }

    #[test]
    fn query_table_count_matches_view() {
        let db = fixture_db();
        for table in MadangTable::ALL {
            let view = db.query_table(table).unwrap();
            assert_eq!(db.query_table_count(table).unwrap(), view.rows.len() as i64);
        }
    }
}
