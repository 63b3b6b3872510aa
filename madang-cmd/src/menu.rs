//! Interactive menu over one open store.
//!
//! Reads choices from any `BufRead` so the whole session can be driven
//! from a script or a test. End of input quits.

use crate::views;
use crate::OutputFormat;
use madang_db::{Database, MadangTable};
use madang_utils::error::FieldError;
use std::io::{BufRead, Write};

const MENU: &str = "\
Madang Bookstore Dashboard
  1) Table view
  2) Total sales by customer
  3) Total sales by book
  4) Customer name search
  5) Order entry
  q) Quit";

/// Print `label`, then read one line without its line ending.
///
/// Returns `None` at end of input.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    label: &str,
) -> anyhow::Result<Option<String>> {
    write!(out, "{}", label)?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(Some(line))
}

pub fn run_menu<R: BufRead, W: Write>(
    db: &Database,
    format: OutputFormat,
    input: &mut R,
    out: &mut W,
) -> anyhow::Result<()> {
    loop {
        writeln!(out, "{}", MENU)?;
        let Some(choice) = prompt(input, out, "> ")? else {
            return Ok(());
        };

        let result = match choice.trim() {
            "1" => views::show_table(db, MadangTable::Customer, format, out),
            "2" => views::show_customer_revenue(db, format, out),
            "3" => views::show_book_revenue(db, format, out),
            "4" => match prompt(input, out, "Customer name: ")? {
                Some(name) => views::show_search(db, &name, format, out),
                None => return Ok(()),
            },
            "5" => match order_form(db, format, input, out) {
                Ok(true) => Ok(()),
                Ok(false) => return Ok(()),
                Err(e) => Err(e),
            },
            "q" | "Q" | "quit" => return Ok(()),
            "" => Ok(()),
            other => {
                writeln!(out, "Unknown choice '{}'", other)?;
                Ok(())
            }
        };

        // A failed view leaves the store usable for the next choice.
        if let Err(e) = result {
            log::warn!("view failed: {:#}", e);
            writeln!(out, "Error: {:#}", e)?;
        }
        writeln!(out)?;
    }
}

/// Order entry form. Re-prompts after a validation failure; a blank
/// customer id cancels. Returns `false` at end of input.
fn order_form<R: BufRead, W: Write>(
    db: &Database,
    format: OutputFormat,
    input: &mut R,
    out: &mut W,
) -> anyhow::Result<bool> {
    writeln!(out, "Books:")?;
    views::show_book_choices(db, OutputFormat::Text, out)?;

    loop {
        let Some(custid) = prompt(input, out, "Customer id (blank to cancel): ")? else {
            return Ok(false);
        };
        if custid.trim().is_empty() {
            return Ok(true);
        }
        let Some(bookid) = prompt(input, out, "Book id: ")? else {
            return Ok(false);
        };
        let Some(price) = prompt(input, out, "Sale price: ")? else {
            return Ok(false);
        };

        match views::submit_order(db, &custid, &bookid, &price, format, out) {
            Ok(()) => return Ok(true),
            Err(e) => match e.downcast_ref::<FieldError>() {
                Some(field) => writeln!(out, "Invalid input: {}. Please try again.", field)?,
                None => return Err(e),
            },
        }
    }
}
