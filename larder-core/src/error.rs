use thiserror::Error;

/// The source table could not be read at all. Fatal for a load.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("Unsupported table format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to read table: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid JSON table: {0}")]
    Json(String),

    #[error("Table has no worksheets")]
    NoWorksheet,
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    #[error("Catalog query failed: {0}")]
    Database(String),

    #[error("Conflicting catalog write: {0}")]
    Conflict(String),
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
