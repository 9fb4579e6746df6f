use thiserror::Error;

/// Load-time failures. All of them are fatal: the dashboard has nothing to
/// show without the listing table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("Table '{0}' not found in data source")]
    MissingTable(String),

    #[error("Required column '{0}' is missing")]
    MissingColumn(&'static str),
}
