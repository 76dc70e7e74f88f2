//! Catalog connection trait and extraction errors

use crate::value::CatalogValue;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// One result row, values in SELECT-list order
pub type RawRow = Vec<CatalogValue>;

/// Receiving end of a running statement
///
/// Dropping the receiver stops the producer, which then closes its cursor.
pub type RowReceiver = mpsc::Receiver<Result<RawRow, ExtractError>>;

/// Errors that can occur while extracting catalog metadata
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtractError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Column discovery failed for {view}: {message}")]
    ColumnDiscovery { view: String, message: String },

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Row scan failed: {0}")]
    RowScan(String),

    #[error("Correlation error: {0}")]
    Correlation(String),

    #[error("Sink write failed: {0}")]
    Sink(String),

    #[error("Unknown catalog dialect: {0}")]
    UnknownDialect(String),

    #[error("Extraction cancelled")]
    Cancelled,
}

impl ExtractError {
    /// Create a ColumnDiscovery error
    pub fn discovery(view: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ColumnDiscovery {
            view: view.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ExtractError {
    fn from(e: std::io::Error) -> Self {
        Self::Sink(e.to_string())
    }
}

/// A live connection to a DB2 catalog
///
/// Implementations must allow several statements to run concurrently;
/// the pipeline reads tables and columns at the same time.
#[async_trait::async_trait]
pub trait CatalogConnection: Send + Sync {
    /// Connection kind (e.g., "ODBC", "Mock")
    fn name(&self) -> &'static str;

    /// Execute `sql` and stream its rows
    ///
    /// Rows arrive in result order. An execution failure arrives as the
    /// single `Err` item of the stream. The producer stops at its next row
    /// once `cancel` fires or the receiver is dropped.
    fn query(&self, sql: String, cancel: CancellationToken) -> RowReceiver;

    /// Test the connection
    async fn test_connection(&self) -> Result<(), ExtractError>;
}
