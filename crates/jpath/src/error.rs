use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JPathError {
    #[error("JPath parse error in '{0}': {1}")]
    JPathParse(String, String),

    #[error("Empty JPath expression")]
    EmptyPath,
}
