// CSV Codec - Transaction <-> text
// Plain format: unquoted, comma-joined, one header line. Quoted format: RFC 4180 via the csv crate.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, Result};
use crate::transaction::{parse_amount, parse_date, Kind, Transaction, DATE_FORMAT};

/// Column names, in file order
pub const HEADER_FIELDS: [&str; 5] = ["date", "description", "amount", "type", "category"];

/// Header line written at the top of every data file
pub const HEADER: &str = "date,description,amount,type,category";

// ============================================================================
// DECODE SKIP
// ============================================================================

/// Why a stored line was dropped during load. Not an error: the rest of the
/// file still loads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeSkip {
    #[error("expected 5 fields, found {0}")]
    FieldCount(usize),

    #[error("invalid date \"{0}\"")]
    InvalidDate(String),

    #[error("invalid amount \"{0}\"")]
    InvalidAmount(String),

    #[error("unknown type \"{0}\"")]
    UnknownKind(String),

    /// The csv reader could not split the record (quoted format only)
    #[error("unreadable record: {0}")]
    Unreadable(String),
}

impl DecodeSkip {
    /// Field-count mismatches are dropped quietly; the rest deserve a warning.
    pub fn is_silent(&self) -> bool {
        matches!(self, DecodeSkip::FieldCount(_))
    }
}

/// Output of decoding a whole file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Decoded {
    pub transactions: Vec<Transaction>,
    pub skipped: usize,
}

// ============================================================================
// PLAIN FORMAT
// ============================================================================

/// Encode one transaction as a plain CSV line (no trailing newline).
///
/// The amount keeps its full round-trippable value (`2500.0`, `54.32`), not
/// the 2-decimal display form.
pub fn encode_line(tx: &Transaction) -> String {
    format!(
        "{},{},{:?},{},{}",
        tx.date().format(DATE_FORMAT),
        tx.description(),
        tx.amount(),
        tx.kind(),
        tx.category()
    )
}

/// Decode one plain CSV line.
///
/// Trailing empty fields are dropped before counting, so a line ending in
/// `,` has lost its category and is skipped as too short.
pub fn decode_line(line: &str) -> std::result::Result<Transaction, DecodeSkip> {
    let mut fields: Vec<&str> = line.split(',').collect();
    drop_trailing_empty(&mut fields);
    decode_fields(&fields)
}

fn drop_trailing_empty(fields: &mut Vec<&str>) {
    while fields.len() > 1 && fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }
}

/// Header followed by one encoded line per transaction, in order
pub fn encode_all(transactions: &[Transaction]) -> Vec<String> {
    std::iter::once(HEADER.to_string())
        .chain(transactions.iter().map(encode_line))
        .collect()
}

/// Decode every line after the first. The first line is assumed to be the
/// header and is not checked.
pub fn decode_all<I, S>(lines: I) -> Vec<Transaction>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    decode_report(lines).transactions
}

/// Same as [`decode_all`] but also counts the skipped lines.
pub fn decode_report<I, S>(lines: I) -> Decoded
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut decoded = Decoded::default();

    for (index, line) in lines.into_iter().enumerate().skip(1) {
        let line = line.as_ref();
        match decode_line(line) {
            Ok(tx) => decoded.transactions.push(tx),
            Err(skip) => {
                decoded.skipped += 1;
                log_skip(index + 1, line, &skip);
            }
        }
    }

    decoded
}

fn decode_fields(fields: &[&str]) -> std::result::Result<Transaction, DecodeSkip> {
    let [date, description, amount, kind, category] = fields[..] else {
        return Err(DecodeSkip::FieldCount(fields.len()));
    };

    let date = parse_date(date).map_err(|_| DecodeSkip::InvalidDate(date.to_string()))?;
    let amount = parse_amount(amount).map_err(|_| DecodeSkip::InvalidAmount(amount.to_string()))?;
    let kind = kind
        .parse::<Kind>()
        .map_err(|_| DecodeSkip::UnknownKind(kind.to_string()))?;

    Ok(Transaction::new(date, description, amount, kind, category))
}

fn log_skip(line_number: usize, line: &str, skip: &DecodeSkip) {
    if skip.is_silent() {
        tracing::debug!(line_number, "Dropping line in data file: {skip}");
    } else {
        tracing::warn!(line_number, "Skipping malformed line in data file ({skip}): {line}");
    }
}

// ============================================================================
// QUOTED FORMAT
// ============================================================================

/// One record as read by the csv crate, before any field is interpreted
#[derive(Debug, Deserialize)]
struct RawRecord {
    date: String,
    description: String,
    amount: String,
    kind: String,
    category: String,
}

fn encode_quoted(transactions: &[Transaction]) -> Result<String> {
    // Header is written by hand so an empty ledger still gets one.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(HEADER_FIELDS)?;
    for tx in transactions {
        writer.serialize(tx)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| LedgerError::from(csv::Error::from(e.into_error())))?;
    Ok(String::from_utf8(bytes)?)
}

fn decode_quoted(text: &str) -> Decoded {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    // The header record is consumed by the reader and never looked at.
    // Columns are taken by position.
    let mut decoded = Decoded::default();

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                decoded.skipped += 1;
                let line_number = err.position().map(|p| p.line()).unwrap_or_default();
                log_skip(line_number as usize, "", &DecodeSkip::Unreadable(err.to_string()));
                continue;
            }
        };

        let mut fields: Vec<&str> = record.iter().collect();
        drop_trailing_empty(&mut fields);

        let outcome = if fields.len() != HEADER_FIELDS.len() {
            Err(DecodeSkip::FieldCount(fields.len()))
        } else {
            record
                .deserialize::<RawRecord>(None)
                .map_err(|e| DecodeSkip::Unreadable(e.to_string()))
                .and_then(|raw| {
                    decode_fields(&[
                        raw.date.as_str(),
                        raw.description.as_str(),
                        raw.amount.as_str(),
                        raw.kind.as_str(),
                        raw.category.as_str(),
                    ])
                })
        };

        match outcome {
            Ok(tx) => decoded.transactions.push(tx),
            Err(skip) => {
                decoded.skipped += 1;
                let line_number = record.position().map(|p| p.line()).unwrap_or_default();
                let line = record.iter().collect::<Vec<_>>().join(",");
                log_skip(line_number as usize, &line, &skip);
            }
        }
    }

    decoded
}

// ============================================================================
// FORMAT SELECTION
// ============================================================================

/// On-disk dialect. `Plain` is the historical, byte-compatible layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CsvFormat {
    #[default]
    Plain,
    Quoted,
}

impl CsvFormat {
    pub fn name(&self) -> &'static str {
        match self {
            CsvFormat::Plain => "plain",
            CsvFormat::Quoted => "quoted",
        }
    }

    /// Render the full file contents, header included
    pub fn encode(&self, transactions: &[Transaction]) -> Result<String> {
        match self {
            CsvFormat::Plain => {
                let mut text = encode_all(transactions).join("\n");
                text.push('\n');
                Ok(text)
            }
            CsvFormat::Quoted => encode_quoted(transactions),
        }
    }

    pub fn decode(&self, text: &str) -> Decoded {
        match self {
            CsvFormat::Plain => decode_report(text.lines()),
            CsvFormat::Quoted => decode_quoted(text),
        }
    }
}

impl fmt::Display for CsvFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CsvFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" => Ok(CsvFormat::Plain),
            "quoted" => Ok(CsvFormat::Quoted),
            other => Err(format!("unknown format \"{other}\", expected plain or quoted")),
        }
    }
}
