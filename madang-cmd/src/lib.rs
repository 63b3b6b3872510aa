//! Command implementations for the Madang dashboard CLI.
//!
//! Every command runs against one [`Database`] opened at startup: the
//! three CSV snapshots are loaded, the seed patch applied, and the handle
//! passed to the selected view.

use clap::{Args, Subcommand};
use madang_db::Database;

pub use madang_db::MadangTable;
use std::io::{BufRead, Write};
use std::path::PathBuf;

pub mod menu;
pub mod render;
pub mod views;

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct Options {
    /// Directory holding Book_madang.csv, Customer_madang.csv and Orders_madang.csv
    #[arg(short = 'd', long, global = true, default_value = "fixtures")]
    pub data_dir: PathBuf,

    /// Do not replace customer 6 with the demo fixture after loading
    #[arg(long, global = true)]
    pub skip_seed: bool,

    /// Print results as JSON instead of text tables
    #[arg(long, global = true)]
    pub json: bool,
}

impl Options {
    pub fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// How views write their results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show the raw contents of a table
    Table {
        /// Table to show: book, customer or orders
        #[arg(short, long, default_value = "customer")]
        name: MadangTable,
    },

    /// Top 10 customers by total sale price
    CustomerRevenue,

    /// Top 10 books by total sale price
    BookRevenue,

    /// Search orders by part of a customer name (case-insensitive)
    Search {
        /// Name fragment; empty input shows nothing
        fragment: Option<String>,
    },

    /// List (bookid, bookname) pairs for order entry
    Books,

    /// Add an order dated today
    Order {
        /// Customer id
        #[arg(long)]
        custid: String,

        /// Book id (see `books`)
        #[arg(long)]
        bookid: String,

        /// Sale price
        #[arg(long)]
        price: String,
    },

    /// Interactive menu over all views
    Menu,
}

/// Load the dataset from `options.data_dir` and apply the seed patch.
pub fn open_store(options: &Options) -> anyhow::Result<Database> {
    let db = Database::open_dataset(&options.data_dir)?;
    if options.skip_seed {
        log::info!("Skipping seed patch");
    } else {
        db.apply_seed_patch()?;
    }
    Ok(db)
}

pub fn run(options: &Options, command: Command) -> anyhow::Result<()> {
    let db = open_store(options)?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_command(&db, options.format(), command, &mut stdin.lock(), &mut stdout.lock())
}

/// Run one command against an open store.
///
/// `input` is only read by the interactive menu.
pub fn run_command<R: BufRead, W: Write>(
    db: &Database,
    format: OutputFormat,
    command: Command,
    input: &mut R,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        Command::Table { name } => views::show_table(db, name, format, out),
        Command::CustomerRevenue => views::show_customer_revenue(db, format, out),
        Command::BookRevenue => views::show_book_revenue(db, format, out),
        Command::Search { fragment } => {
            views::show_search(db, fragment.as_deref().unwrap_or(""), format, out)
        }
        Command::Books => views::show_book_choices(db, format, out),
        Command::Order {
            custid,
            bookid,
            price,
        } => views::submit_order(db, &custid, &bookid, &price, format, out),
        Command::Menu => menu::run_menu(db, format, input, out),
    }
}
