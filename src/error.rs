use molder_core::ResolveError;
use thiserror::Error;

/// Errors surfaced by the `molder` binary.
#[derive(Error, Debug)]
pub enum MolderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Variables file must contain a JSON object, found {0}")]
    NotAnObject(&'static str),
    #[error("Unknown template grammar '{0}' (expected 'xml' or 'json')")]
    UnknownGrammar(String),
    #[error("Resolution error: {0}")]
    Resolve(#[from] ResolveError),
}
