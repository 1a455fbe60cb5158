// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use finance_tracker::{
    init_file_logging, init_stderr_logging, parse_date, CsvFormat, Transaction, TransactionInput,
    TransactionStore, DATE_FORMAT, DEFAULT_DATA_FILE,
};

/// Personal income and expense ledger backed by a CSV file.
#[derive(Parser, Debug)]
#[command(name = "finance-tracker", version, about, long_about = None)]
struct Cli {
    /// Path to the ledger file
    #[arg(short, long, default_value = DEFAULT_DATA_FILE)]
    data_file: PathBuf,

    /// File format: plain (unquoted, historical layout) or quoted (RFC 4180)
    #[arg(short, long, default_value = "plain")]
    format: CsvFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a transaction and save the ledger
    Add {
        #[arg(long)]
        description: String,

        #[arg(long, allow_hyphen_values = true)]
        amount: String,

        /// income or expense
        #[arg(long, default_value = "expense")]
        kind: String,

        #[arg(long)]
        category: String,

        /// Date as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show every transaction in insertion order
    List {
        #[arg(long)]
        json: bool,
    },

    /// Show total income, total expenses and balance
    Summary {
        #[arg(long)]
        json: bool,
    },

    /// Show transactions in one category (case-insensitive)
    Category {
        name: String,

        #[arg(long)]
        json: bool,
    },

    /// Show transactions between two dates, both inclusive
    Dates {
        start: String,
        end: String,

        #[arg(long)]
        json: bool,
    },

    /// Interactive terminal UI (default)
    Tui,
}

fn main() -> Result<()> {
    let Cli {
        data_file,
        format,
        log_level,
        command,
    } = Cli::parse();

    let command = command.unwrap_or(Command::Tui);

    if matches!(command, Command::Tui) {
        init_file_logging(log_dir(&data_file), &log_level)?;
    } else {
        init_stderr_logging(&log_level);
    }

    match command {
        Command::Add {
            description,
            amount,
            kind,
            category,
            date,
        } => {
            let date = date
                .unwrap_or_else(|| Local::now().date_naive().format(DATE_FORMAT).to_string());
            let input = TransactionInput {
                description,
                amount,
                kind,
                category,
                date,
            };
            run_add(&data_file, format, &input)?;
        }
        Command::List { json } => {
            let store = open_store(&data_file, format)?;
            let all: Vec<&Transaction> = store.list().iter().collect();
            print_transactions(&all, json)?;
        }
        Command::Summary { json } => {
            let store = open_store(&data_file, format)?;
            let summary = store.summary();
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!("Financial Summary");
                println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
                println!("Total Income:    ${:>12.2}", summary.total_income);
                println!("Total Expenses:  ${:>12.2}", summary.total_expenses);
                println!("Current Balance: ${:>12.2}", summary.balance);
            }
        }
        Command::Category { name, json } => {
            let store = open_store(&data_file, format)?;
            // A blank category means no filter was asked for.
            let matches: Vec<&Transaction> = if name.trim().is_empty() {
                store.list().iter().collect()
            } else {
                store.filter_by_category(&name)
            };
            print_transactions(&matches, json)?;
        }
        Command::Dates { start, end, json } => {
            let start = parse_date(&start).context("Invalid start date, use YYYY-MM-DD")?;
            let end = parse_date(&end).context("Invalid end date, use YYYY-MM-DD")?;
            let store = open_store(&data_file, format)?;
            print_transactions(&store.filter_by_date_range(start, end), json)?;
        }
        Command::Tui => run_ui_mode(data_file, format)?,
    }

    Ok(())
}

fn open_store(data_file: &Path, format: CsvFormat) -> Result<TransactionStore> {
    let mut store = TransactionStore::with_format(format);
    store
        .load(data_file)
        .with_context(|| format!("Failed to load ledger from {}", data_file.display()))?;
    Ok(store)
}

fn run_add(data_file: &Path, format: CsvFormat, input: &TransactionInput) -> Result<()> {
    let mut store = open_store(data_file, format)?;

    let added = store
        .add_input(input)
        .context("Transaction rejected")?
        .clone();

    store
        .save(data_file)
        .with_context(|| format!("Failed to save ledger to {}", data_file.display()))?;

    println!("✓ Added transaction");
    print_transactions(&[&added], false)?;
    println!("✓ Ledger now holds {} transactions", store.len());
    Ok(())
}

fn print_transactions(transactions: &[&Transaction], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(transactions)?);
        return Ok(());
    }

    println!(
        "{:<10}  {:<30}  {:>12}  {:<7}  {:<20}",
        "Date", "Description", "Amount ($)", "Type", "Category"
    );
    for tx in transactions {
        println!(
            "{:<10}  {:<30}  {:>12}  {:<7}  {:<20}",
            tx.display_date(),
            tx.description(),
            tx.display_amount(),
            tx.kind(),
            tx.category()
        );
    }
    println!("({} transactions)", transactions.len());
    Ok(())
}

/// Directory the TUI log file goes in: next to the data file
fn log_dir(data_file: &Path) -> &Path {
    match data_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[cfg(feature = "tui")]
fn run_ui_mode(data_file: PathBuf, format: CsvFormat) -> Result<()> {
    let store = open_store(&data_file, format)?;
    let today = Local::now().date_naive();

    let mut app = ui::App::new(store, data_file, today);
    ui::run_ui(&mut app)?;

    if app.dirty {
        println!("⚠️  Exited without saving {} unsaved change(s)", app.unsaved_changes);
    }
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_data_file: PathBuf, _format: CsvFormat) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use a command: finance-tracker list | summary | add ...");
    std::process::exit(1);
}
