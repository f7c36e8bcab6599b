//! Errors raised while resolving references.
//!
//! An unknown variable or a query that matches nothing is not an error; those
//! come back as `Ok(None)`. Everything here is a hard failure that aborts the
//! enclosing resolution or render.

use molder_jpath::JPathError;
use molder_types::{ValueError, VarType};
use molder_xpath1::XPathError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Index {index} is out of range for '{reference}' (length {len})")]
    IndexOutOfRange {
        reference: String,
        index: i64,
        len: usize,
    },
    #[error("Row {row} is out of range for '{reference}' ({rows} rows)")]
    RowOutOfRange {
        reference: String,
        row: i64,
        rows: usize,
    },
    #[error("Column {column} is out of range for '{reference}' ({columns} columns)")]
    ColumnOutOfRange {
        reference: String,
        column: i64,
        columns: usize,
    },
    #[error("Missing or malformed row selector in '{0}'")]
    InvalidRow(String),
    #[error("Missing column selector in '{0}'")]
    MissingColumnSelector(String),
    #[error("Unknown column '{column}' in '{reference}'")]
    UnknownColumn { reference: String, column: String },
    #[error("'{reference}' is declared as {expected} but holds a {found} value")]
    TypeMismatch {
        reference: String,
        expected: VarType,
        found: &'static str,
    },
    #[error("'{reference}' does not hold valid JSON: {source}")]
    InvalidJson {
        reference: String,
        #[source]
        source: ValueError,
    },
    #[error("'{reference}' does not hold valid XML: {source}")]
    InvalidXml {
        reference: String,
        #[source]
        source: ValueError,
    },
    #[error("JSON path error: {0}")]
    JPath(#[from] JPathError),
    #[error("XPath error: {0}")]
    XPath(#[from] XPathError),
}

impl ResolveError {
    /// True for out-of-range or malformed index, row and column selectors.
    pub fn is_indexing_error(&self) -> bool {
        matches!(
            self,
            ResolveError::IndexOutOfRange { .. }
                | ResolveError::RowOutOfRange { .. }
                | ResolveError::ColumnOutOfRange { .. }
                | ResolveError::InvalidRow(_)
                | ResolveError::MissingColumnSelector(_)
                | ResolveError::UnknownColumn { .. }
        )
    }
}
