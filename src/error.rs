use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Master source unreadable: {0}")]
    SourceUnreadable(String),

    #[error("Ledger unreadable: {0}")]
    LedgerUnreadable(String),

    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    #[error("Company processing failed for '{company}': {details}")]
    CompanyError { company: String, details: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
