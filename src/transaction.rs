// Transaction - the single ledger entity
// Immutable value: fields are private, read through accessors

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Storage/display format for dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// KIND
// ============================================================================

/// Kind - Income or expense. The stored amount is a magnitude, the kind
/// carries the direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Income,
    Expense,
}

impl Kind {
    /// Literal token used in the data file
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Income => "income",
            Kind::Expense => "expense",
        }
    }

    /// Human-readable label for display
    pub fn label(&self) -> &'static str {
        match self {
            Kind::Income => "Income",
            Kind::Expense => "Expense",
        }
    }

    /// Case-insensitive parse for user input. Stored tokens go through
    /// `FromStr`, which is exact.
    pub fn parse_loose(s: &str) -> Result<Self, ValidationError> {
        s.trim().to_lowercase().parse()
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Kind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Kind::Income),
            "expense" => Ok(Kind::Expense),
            other => Err(ValidationError::UnknownKind(other.to_string())),
        }
    }
}

// ============================================================================
// TRANSACTION
// ============================================================================

/// One financial event. Field order matches the file's column order, which
/// the quoted CSV format relies on when it derives its header from serde.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    date: NaiveDate,
    description: String,
    amount: f64,
    #[serde(rename = "type")]
    kind: Kind,
    category: String,
}

impl Transaction {
    /// Trusted constructor. Performs no validation; `TransactionStore::add`
    /// is the validating entry point for user input.
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: f64,
        kind: Kind,
        category: impl Into<String>,
    ) -> Self {
        Transaction {
            date,
            description: description.into(),
            amount,
            kind,
            category: category.into(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn is_income(&self) -> bool {
        self.kind == Kind::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == Kind::Expense
    }

    /// Amount with the direction applied: positive for income, negative for expenses
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            Kind::Income => self.amount,
            Kind::Expense => -self.amount,
        }
    }

    /// Amount rounded to cents for tables. Storage keeps the full value.
    pub fn display_amount(&self) -> String {
        format!("{:.2}", self.amount)
    }

    pub fn display_date(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }
}

/// Parse a strict `YYYY-MM-DD` date (zero-padded, 4-digit year)
pub fn parse_date(s: &str) -> Result<NaiveDate, ValidationError> {
    let is_shaped = s.len() == 10
        && s.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });

    if !is_shaped {
        return Err(ValidationError::InvalidDate(s.to_string()));
    }

    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

/// Parse a finite decimal amount. Surrounding whitespace is ignored; sign and
/// zero are allowed.
pub fn parse_amount(s: &str) -> Result<f64, ValidationError> {
    match s.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(amount),
        _ => Err(ValidationError::InvalidAmount(s.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_kind_parse_is_exact() {
        assert_eq!("income".parse::<Kind>().unwrap(), Kind::Income);
        assert_eq!("expense".parse::<Kind>().unwrap(), Kind::Expense);
        assert_eq!(
            "Income".parse::<Kind>(),
            Err(ValidationError::UnknownKind("Income".to_string()))
        );
        assert!("transfer".parse::<Kind>().is_err());
    }

    #[test]
    fn test_kind_parse_loose() {
        assert_eq!(Kind::parse_loose(" EXPENSE ").unwrap(), Kind::Expense);
        assert_eq!(Kind::parse_loose("Income").unwrap(), Kind::Income);
        assert!(Kind::parse_loose("refund").is_err());
    }

    #[test]
    fn test_signed_and_display_amount() {
        let tx = Transaction::new(date(2024, 1, 16), "Groceries", 54.321, Kind::Expense, "Food");

        assert_eq!(tx.signed_amount(), -54.321);
        assert_eq!(tx.display_amount(), "54.32");
        assert_eq!(tx.display_date(), "2024-01-16");
        assert!(tx.is_expense());
        assert!(!tx.is_income());
    }

    #[test]
    fn test_parse_date_strict() {
        assert_eq!(parse_date("2024-01-15").unwrap(), date(2024, 1, 15));
        assert_eq!(parse_date("2024-02-29").unwrap(), date(2024, 2, 29));

        assert!(parse_date("2024-1-15").is_err());
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("15/01/2024").is_err());
        assert!(parse_date(" 2024-01-15").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("2500.0").unwrap(), 2500.0);
        assert_eq!(parse_amount(" 54.32 ").unwrap(), 54.32);
        assert_eq!(parse_amount("-3").unwrap(), -3.0);
        assert_eq!(parse_amount("0").unwrap(), 0.0);

        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("").is_err());
        assert!(parse_amount("NaN").is_err());
        assert!(parse_amount("inf").is_err());
    }
}
