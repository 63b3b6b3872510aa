//! The dashboard views, each writing one query result as text or JSON.

use crate::render::{render_bar_chart, render_table};
use crate::OutputFormat;
use madang_db::models::{chart_series, SalesTotal};
use madang_db::{Database, MadangTable};
use serde::Serialize;
use std::io::Write;

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Raw table browser.
pub fn show_table<W: Write>(
    db: &Database,
    table: MadangTable,
    format: OutputFormat,
    out: &mut W,
) -> anyhow::Result<()> {
    let view = db.query_table(table)?;
    match format {
        OutputFormat::Json => write_json(out, &view),
        OutputFormat::Text => {
            let headers: Vec<&str> = view.columns.iter().map(String::as_str).collect();
            let rows: Vec<Vec<String>> = view
                .rows
                .iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect();
            writeln!(out, "{} table", view.table)?;
            write!(out, "{}", render_table(&headers, &rows))?;
            Ok(())
        }
    }
}

fn show_ranking<W: Write>(
    title: &str,
    label_header: &str,
    totals: &[SalesTotal],
    format: OutputFormat,
    out: &mut W,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => write_json(out, totals),
        OutputFormat::Text => {
            let rows: Vec<Vec<String>> = totals
                .iter()
                .map(|t| vec![t.label.clone(), t.total_sales.to_string()])
                .collect();
            writeln!(out, "{}", title)?;
            write!(out, "{}", render_table(&[label_header, "total_sales"], &rows))?;
            writeln!(out)?;
            write!(out, "{}", render_bar_chart(&chart_series(totals)))?;
            Ok(())
        }
    }
}

/// Top 10 customers by total sale price, as a table and a bar chart.
pub fn show_customer_revenue<W: Write>(
    db: &Database,
    format: OutputFormat,
    out: &mut W,
) -> anyhow::Result<()> {
    let totals = db.query_customer_revenue()?;
    show_ranking("Total sales by customer (top 10)", "name", &totals, format, out)
}

/// Top 10 books by total sale price, as a table and a bar chart.
pub fn show_book_revenue<W: Write>(
    db: &Database,
    format: OutputFormat,
    out: &mut W,
) -> anyhow::Result<()> {
    let totals = db.query_book_revenue()?;
    show_ranking("Total sales by book (top 10)", "bookname", &totals, format, out)
}

/// Orders of customers whose name contains `fragment`.
///
/// Empty input prints nothing at all; a search with no hits prints an
/// explicit notice.
pub fn show_search<W: Write>(
    db: &Database,
    fragment: &str,
    format: OutputFormat,
    out: &mut W,
) -> anyhow::Result<()> {
    let Some(matches) = db.search_orders(fragment)? else {
        return Ok(());
    };
    match format {
        OutputFormat::Json => write_json(out, &matches),
        OutputFormat::Text if matches.is_empty() => {
            writeln!(out, "No orders found for customers matching '{}'.", fragment)?;
            Ok(())
        }
        OutputFormat::Text => {
            let rows: Vec<Vec<String>> = matches
                .iter()
                .map(|m| {
                    vec![
                        m.name.clone(),
                        m.bookname.clone(),
                        m.orderdate.clone().unwrap_or_default(),
                        m.saleprice.to_string(),
                    ]
                })
                .collect();
            write!(
                out,
                "{}",
                render_table(&["name", "bookname", "orderdate", "saleprice"], &rows)
            )?;
            Ok(())
        }
    }
}

/// The `(bookid, bookname)` list offered by the order form.
pub fn show_book_choices<W: Write>(
    db: &Database,
    format: OutputFormat,
    out: &mut W,
) -> anyhow::Result<()> {
    let choices = db.query_book_choices()?;
    match format {
        OutputFormat::Json => write_json(out, &choices),
        OutputFormat::Text => {
            for choice in &choices {
                writeln!(out, "{}", choice)?;
            }
            Ok(())
        }
    }
}

/// Validate the order form fields and append the order dated today.
///
/// Validation failures come back as errors wrapping a
/// [`madang_utils::error::FieldError`]; nothing is written in that case.
pub fn submit_order<W: Write>(
    db: &Database,
    custid: &str,
    bookid: &str,
    price: &str,
    format: OutputFormat,
    out: &mut W,
) -> anyhow::Result<()> {
    let inserted = db.insert_order_form(custid, bookid, price)?;
    match format {
        OutputFormat::Json => write_json(out, &inserted),
        OutputFormat::Text => {
            writeln!(
                out,
                "Order {} added: custid {}, bookid {}, saleprice {}, orderdate {}",
                inserted.orderid,
                inserted.custid,
                inserted.bookid,
                inserted.saleprice,
                inserted.orderdate
            )?;
            Ok(())
        }
    }
}
