// Boundary parsing for user-entered transactions

use chrono::NaiveDate;

use crate::error::ValidationError;
use crate::transaction::{parse_amount, parse_date, Kind, DATE_FORMAT};

/// Raw text as typed into a form or passed on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionInput {
    pub description: String,
    pub amount: String,
    pub kind: String,
    pub category: String,
    pub date: String,
}

/// Input whose amount, kind and date have been parsed. Emptiness of
/// description/category is checked by the store when it is added.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedInput {
    pub description: String,
    pub amount: f64,
    pub kind: Kind,
    pub category: String,
    pub date: NaiveDate,
}

impl TransactionInput {
    /// Empty form with the date pre-filled
    pub fn dated(date: NaiveDate) -> Self {
        TransactionInput {
            kind: Kind::Expense.to_string(),
            date: date.format(DATE_FORMAT).to_string(),
            ..Default::default()
        }
    }

    pub fn parse(&self) -> Result<ParsedInput, ValidationError> {
        let amount = parse_amount(&self.amount)?;
        let kind = Kind::parse_loose(&self.kind)?;
        let date = parse_date(self.date.trim())?;

        Ok(ParsedInput {
            description: self.description.clone(),
            amount,
            kind,
            category: self.category.clone(),
            date,
        })
    }
}
