// Finance Tracker - Core Library
// Transaction store, CSV codec and queries, shared by the CLI and the terminal UI

pub mod codec;
pub mod error;
pub mod input;
pub mod logging;
pub mod query;
pub mod store;
pub mod transaction;

// Re-export commonly used types
pub use codec::{
    decode_all, decode_line, decode_report, encode_all, encode_line,
    CsvFormat, DecodeSkip, Decoded, HEADER,
};
pub use error::{LedgerError, ValidationError};
pub use input::{ParsedInput, TransactionInput};
pub use logging::{init_file_logging, init_stderr_logging};
pub use query::{
    category_totals, filter_by_category, filter_by_date_range, filter_by_kind, summarize,
    CategoryTotal, Summary,
};
pub use store::{LoadOutcome, TransactionStore, DEFAULT_DATA_FILE};
pub use transaction::{parse_amount, parse_date, Kind, Transaction, DATE_FORMAT};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
