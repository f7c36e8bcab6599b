use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValueError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("XML document has no root element")]
    NoDocumentElement,

    #[error("row {row} has {found} cells but the result set has {expected} columns")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("record {0} is not a JSON object")]
    NotARecord(usize),

    #[error("CSV output error: {0}")]
    Csv(#[from] csv::Error),
}
