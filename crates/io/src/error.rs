use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to open workbook: {0}")]
    Workbook(String),

    #[error("sheet '{0}' not found")]
    SheetNotFound(String),

    #[error("workbook contains no sheets")]
    NoSheets,

    #[error("unsupported source format: {0}")]
    UnsupportedFormat(String),
}
