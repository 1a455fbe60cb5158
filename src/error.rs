//! Error types for the ledger core.
use std::io;
use std::path::PathBuf;
use std::string::FromUtf8Error;

/// User input that cannot become a transaction.
///
/// Raised before anything is appended, so a rejected transaction never
/// reaches the store.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("description cannot be empty")]
    EmptyDescription,

    #[error("category cannot be empty")]
    EmptyCategory,

    /// The amount text is not a finite decimal number.
    #[error("invalid amount \"{0}\"")]
    InvalidAmount(String),

    /// The date text is not a valid `YYYY-MM-DD` calendar date.
    #[error("invalid date \"{0}\", expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("unknown transaction type \"{0}\", expected income or expense")]
    UnknownKind(String),
}

/// The errors the store reports to its caller.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The data file exists but could not be read.
    #[error("could not read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    /// The data file could not be written.
    #[error("could not write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },

    /// The csv writer rejected a record while encoding the quoted format.
    #[error("could not encode transactions")]
    Encode(#[from] csv::Error),

    #[error("encoded ledger is not valid UTF-8")]
    NotUtf8(#[from] FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_encode_error_keeps_source() {
        let csv_err = csv::Error::from(io::Error::new(io::ErrorKind::Other, "disk on fire"));

        let err = LedgerError::from(csv_err);

        assert!(matches!(err, LedgerError::Encode(_)));
        assert_eq!(err.to_string(), "could not encode transactions");
        assert!(err.source().unwrap().to_string().contains("disk on fire"));
    }
}
