use thiserror::Error;

#[derive(Error, Debug)]
pub enum FolioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not find header row")]
    HeaderNotFound,

    #[error("Invalid column mapping: {0}")]
    InvalidMapping(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Unknown custodian: {0}")]
    UnknownCustodian(String),

    #[error(
        "{custodian} detected at {confidence}% confidence (auto-accept needs {threshold}%); \
         supply a mapping with --map, e.g. --map symbol=0 --map shares=2, or pass --force"
    )]
    NeedsMapping {
        custodian: String,
        confidence: u8,
        threshold: u8,
    },

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, FolioError>;
