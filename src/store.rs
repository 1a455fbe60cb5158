// Transaction Store - owns the ledger
// Append-only, insertion order preserved. Load/save go through the CSV codec.

use chrono::NaiveDate;
use std::fs;
use std::io;
use std::path::Path;

use crate::codec::CsvFormat;
use crate::error::{LedgerError, Result, ValidationError};
use crate::input::TransactionInput;
use crate::query::{self, Summary};
use crate::transaction::{Kind, Transaction};

/// Default data file name, relative to the working directory
pub const DEFAULT_DATA_FILE: &str = "transactions.csv";

/// What a `load` found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOutcome {
    pub loaded: usize,
    pub skipped: usize,
    pub file_found: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionStore {
    transactions: Vec<Transaction>,
    format: CsvFormat,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(format: CsvFormat) -> Self {
        TransactionStore {
            transactions: Vec::new(),
            format,
        }
    }

    pub fn format(&self) -> CsvFormat {
        self.format
    }

    // ========================================================================
    // MUTATION
    // ========================================================================

    /// Validate and append a transaction, returning the stored value.
    ///
    /// Description and category are trimmed and must not end up empty. The
    /// amount may be negative or zero but must be finite. Nothing is appended
    /// on error.
    pub fn add(
        &mut self,
        description: &str,
        amount: f64,
        kind: Kind,
        category: &str,
        date: NaiveDate,
    ) -> Result<&Transaction> {
        let description = description.trim();
        let category = category.trim();

        if description.is_empty() {
            return Err(ValidationError::EmptyDescription.into());
        }
        if category.is_empty() {
            return Err(ValidationError::EmptyCategory.into());
        }
        if !amount.is_finite() {
            return Err(ValidationError::InvalidAmount(amount.to_string()).into());
        }

        self.transactions
            .push(Transaction::new(date, description, amount, kind, category));

        let added = &self.transactions[self.transactions.len() - 1];
        tracing::debug!(
            date = %added.date(),
            kind = %added.kind(),
            amount = added.amount(),
            "Added transaction"
        );
        Ok(added)
    }

    /// Parse raw form fields, then `add`
    pub fn add_input(&mut self, input: &TransactionInput) -> Result<&Transaction> {
        let parsed = input.parse()?;
        self.add(
            &parsed.description,
            parsed.amount,
            parsed.kind,
            &parsed.category,
            parsed.date,
        )
    }

    // ========================================================================
    // READ
    // ========================================================================

    /// The whole ledger, in insertion order
    pub fn list(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn summary(&self) -> Summary {
        query::summarize(&self.transactions)
    }

    pub fn filter_by_category(&self, category: &str) -> Vec<&Transaction> {
        query::filter_by_category(&self.transactions, category)
    }

    pub fn filter_by_date_range(&self, start: NaiveDate, end: NaiveDate) -> Vec<&Transaction> {
        query::filter_by_date_range(&self.transactions, start, end)
    }

    // ========================================================================
    // PERSISTENCE
    // ========================================================================

    /// Replace the ledger with the contents of `path`.
    ///
    /// A missing file is an empty ledger. Malformed records are skipped. Any
    /// other read failure leaves the current ledger untouched.
    pub fn load(&mut self, path: &Path) -> Result<LoadOutcome> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::info!(
                    "No data file found at {}. Starting with an empty ledger.",
                    path.display()
                );
                self.transactions.clear();
                return Ok(LoadOutcome {
                    loaded: 0,
                    skipped: 0,
                    file_found: false,
                });
            }
            Err(source) => {
                tracing::error!("Error loading transactions from {}: {source}", path.display());
                return Err(LedgerError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let decoded = self.format.decode(&text);
        self.transactions = decoded.transactions;

        tracing::info!(
            skipped = decoded.skipped,
            "Loaded {} transactions from {}",
            self.transactions.len(),
            path.display()
        );

        Ok(LoadOutcome {
            loaded: self.transactions.len(),
            skipped: decoded.skipped,
            file_found: true,
        })
    }

    /// Overwrite `path` with the full ledger. The file is only touched once
    /// the whole ledger has been encoded.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = self.format.encode(&self.transactions)?;

        fs::write(path, text).map_err(|source| {
            tracing::error!("Error saving transactions to {}: {source}", path.display());
            LedgerError::Write {
                path: path.to_path_buf(),
                source,
            }
        })?;

        tracing::info!(
            "Saved {} transactions to {}",
            self.transactions.len(),
            path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn populated_store(format: CsvFormat) -> TransactionStore {
        let mut store = TransactionStore::with_format(format);
        store
            .add("Paycheck", 2500.0, Kind::Income, "Salary", date(2024, 1, 15))
            .unwrap();
        store
            .add("Groceries", 54.32, Kind::Expense, "Food", date(2024, 1, 16))
            .unwrap();
        store
    }

    #[test]
    fn test_add_appends_last() {
        let mut store = populated_store(CsvFormat::Plain);

        let added = store
            .add("Bus pass", 45.0, Kind::Expense, "Transport", date(2024, 1, 20))
            .unwrap()
            .clone();

        assert_eq!(store.len(), 3);
        assert_eq!(store.list().last(), Some(&added));
        assert_eq!(store.list().iter().filter(|tx| **tx == added).count(), 1);
    }

    #[test]
    fn test_add_trims_labels() {
        let mut store = TransactionStore::new();

        let added = store
            .add("  Coffee ", 3.5, Kind::Expense, " Food\t", date(2024, 2, 1))
            .unwrap();

        assert_eq!(added.description(), "Coffee");
        assert_eq!(added.category(), "Food");
    }

    #[test]
    fn test_add_rejects_blank_labels() {
        let mut store = populated_store(CsvFormat::Plain);
        let before = store.list().to_vec();

        let err = store
            .add("   ", 10.0, Kind::Expense, "Food", date(2024, 1, 1))
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::EmptyDescription)
        ));

        let err = store
            .add("Lunch", 10.0, Kind::Expense, "", date(2024, 1, 1))
            .unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Validation(ValidationError::EmptyCategory)
        ));

        assert_eq!(store.list(), before.as_slice());
    }

    #[test]
    fn test_add_allows_negative_and_zero_amounts() {
        let mut store = TransactionStore::new();

        store
            .add("Correction", -20.0, Kind::Expense, "Misc", date(2024, 1, 1))
            .unwrap();
        store
            .add("Nothing", 0.0, Kind::Income, "Misc", date(2024, 1, 1))
            .unwrap();

        assert_eq!(store.len(), 2);
        assert!(store
            .add("Broken", f64::NAN, Kind::Income, "Misc", date(2024, 1, 1))
            .is_err());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_add_input_parses_boundary_fields() {
        let mut store = TransactionStore::new();
        let input = TransactionInput {
            description: "Paycheck".to_string(),
            amount: "2500".to_string(),
            kind: "Income".to_string(),
            category: "Salary".to_string(),
            date: "2024-01-15".to_string(),
        };

        let added = store.add_input(&input).unwrap();
        assert_eq!(added.amount(), 2500.0);
        assert_eq!(added.kind(), Kind::Income);

        let bad = TransactionInput {
            amount: "twenty".to_string(),
            ..input
        };
        assert!(matches!(
            store.add_input(&bad),
            Err(LedgerError::Validation(ValidationError::InvalidAmount(_)))
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let mut store = populated_store(CsvFormat::Plain);

        let outcome = store.load(&dir.path().join("missing.csv")).unwrap();

        assert!(!outcome.file_found);
        assert_eq!(outcome.loaded, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_unreadable_path_keeps_ledger() {
        let dir = TempDir::new().unwrap();
        let mut store = populated_store(CsvFormat::Plain);

        // A directory exists but cannot be read as a file.
        let err = store.load(dir.path()).unwrap_err();

        assert!(matches!(err, LedgerError::Read { .. }));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_save_then_load_plain() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_DATA_FILE);
        let store = populated_store(CsvFormat::Plain);

        store.save(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "date,description,amount,type,category\n\
             2024-01-15,Paycheck,2500.0,income,Salary\n\
             2024-01-16,Groceries,54.32,expense,Food\n"
        );

        let mut reloaded = TransactionStore::new();
        let outcome = reloaded.load(&path).unwrap();

        assert_eq!(outcome.loaded, 2);
        assert_eq!(outcome.skipped, 0);
        assert_eq!(reloaded.list(), store.list());
    }

    #[test]
    fn test_save_overwrites_previous_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_DATA_FILE);

        populated_store(CsvFormat::Plain).save(&path).unwrap();
        TransactionStore::new().save(&path).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "date,description,amount,type,category\n"
        );
    }

    #[test]
    fn test_save_then_load_quoted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quoted.csv");
        let mut store = populated_store(CsvFormat::Quoted);
        store
            .add("Rent, March", 900.0, Kind::Expense, "Housing", date(2024, 3, 1))
            .unwrap();

        store.save(&path).unwrap();

        let mut reloaded = TransactionStore::with_format(CsvFormat::Quoted);
        reloaded.load(&path).unwrap();

        assert_eq!(reloaded.list(), store.list());
        assert_eq!(reloaded.list()[2].description(), "Rent, March");
    }

    #[test]
    fn test_load_replaces_existing_ledger() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_DATA_FILE);
        fs::write(
            &path,
            "date,description,amount,type,category\n\
             2024-02-01,Bus,2.5,expense,Transport\n",
        )
        .unwrap();

        let mut store = populated_store(CsvFormat::Plain);
        let outcome = store.load(&path).unwrap();

        assert_eq!(outcome.loaded, 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].description(), "Bus");
    }

    #[test]
    fn test_load_skips_malformed_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_DATA_FILE);
        fs::write(
            &path,
            "date,description,amount,type,category\n\
             2024-01-15,Paycheck,2500.0,income,Salary\n\
             2024-01-16,Groceries,54.32,expense\n\
             2024-13-01,Bad date,1.0,expense,Food\n",
        )
        .unwrap();

        let mut store = TransactionStore::new();
        let outcome = store.load(&path).unwrap();

        assert_eq!(outcome.loaded, 1);
        assert_eq!(outcome.skipped, 2);
        assert_eq!(store.list()[0].description(), "Paycheck");
    }

    #[test]
    fn test_save_to_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no-such-dir").join(DEFAULT_DATA_FILE);
        let store = populated_store(CsvFormat::Plain);

        let err = store.save(&path).unwrap_err();

        assert!(matches!(err, LedgerError::Write { .. }));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_store_queries_delegate() {
        let store = populated_store(CsvFormat::Plain);

        assert_eq!(store.summary().balance, 2500.0 - 54.32);
        assert_eq!(store.filter_by_category("FOOD").len(), 1);
        assert_eq!(
            store
                .filter_by_date_range(date(2024, 1, 16), date(2024, 1, 31))
                .len(),
            1
        );
    }
}
