// Query / Aggregation - pure functions over a borrowed ledger
// Nothing here mutates; filters return references into the input, in input order.

use chrono::NaiveDate;
use serde::Serialize;

use crate::transaction::{Kind, Transaction};

// ============================================================================
// SUMMARY
// ============================================================================

/// Totals over a set of transactions
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub balance: f64,
}

impl Summary {
    /// One-line human summary with amounts rounded to cents
    pub fn describe(&self) -> String {
        format!(
            "Total Income: ${:.2} | Total Expenses: ${:.2} | Current Balance: ${:.2}",
            self.total_income, self.total_expenses, self.balance
        )
    }
}

/// Sum income and expense amounts. The balance is income minus expenses;
/// an empty ledger yields all zeros.
pub fn summarize(transactions: &[Transaction]) -> Summary {
    let total_income: f64 = transactions
        .iter()
        .filter(|tx| tx.kind() == Kind::Income)
        .map(Transaction::amount)
        .sum();

    let total_expenses: f64 = transactions
        .iter()
        .filter(|tx| tx.kind() == Kind::Expense)
        .map(Transaction::amount)
        .sum();

    Summary {
        total_income,
        total_expenses,
        balance: total_income - total_expenses,
    }
}

// ============================================================================
// FILTERS
// ============================================================================

/// Transactions whose category equals `category`, ignoring case. The query is
/// trimmed; stored categories are compared as they are.
///
/// Callers treat a blank query as "no filter" and should not call this with one.
pub fn filter_by_category<'a>(
    transactions: &'a [Transaction],
    category: &str,
) -> Vec<&'a Transaction> {
    let wanted = category.trim().to_lowercase();

    transactions
        .iter()
        .filter(|tx| tx.category().to_lowercase() == wanted)
        .collect()
}

/// Transactions dated within `start..=end`. An inverted range matches nothing.
pub fn filter_by_date_range(
    transactions: &[Transaction],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<&Transaction> {
    transactions
        .iter()
        .filter(|tx| start <= tx.date() && tx.date() <= end)
        .collect()
}

pub fn filter_by_kind(transactions: &[Transaction], kind: Kind) -> Vec<&Transaction> {
    transactions.iter().filter(|tx| tx.kind() == kind).collect()
}

// ============================================================================
// CATEGORY BREAKDOWN
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub count: usize,
    pub income: f64,
    pub expenses: f64,
}

impl CategoryTotal {
    pub fn net(&self) -> f64 {
        self.income - self.expenses
    }
}

/// Per-category totals, in the order each category first appears.
/// Categories that differ only by case are grouped together under the
/// spelling seen first, matching `filter_by_category`.
pub fn category_totals(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();

    for tx in transactions {
        let key = tx.category().to_lowercase();
        let index = match totals.iter().position(|t| t.category.to_lowercase() == key) {
            Some(index) => index,
            None => {
                totals.push(CategoryTotal {
                    category: tx.category().to_string(),
                    count: 0,
                    income: 0.0,
                    expenses: 0.0,
                });
                totals.len() - 1
            }
        };

        let entry = &mut totals[index];
        entry.count += 1;
        match tx.kind() {
            Kind::Income => entry.income += tx.amount(),
            Kind::Expense => entry.expenses += tx.amount(),
        }
    }

    totals
}
