//! DB2 through the IBM ODBC/CLI driver
//!
//! Requires the `db2` feature and an installed IBM Data Server Driver.
//! The driver API is blocking, so every statement runs on a blocking thread
//! and forwards its rows over a bounded channel. Each statement opens its
//! own connection, which lets the table and column statements run at the
//! same time.

use crate::adapter::{CatalogConnection, ExtractError, RowReceiver};
use db2meta_core::DataSourceName;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[cfg(feature = "db2")]
use crate::adapter::RawRow;
#[cfg(feature = "db2")]
use crate::value::CatalogValue;
#[cfg(feature = "db2")]
use odbc_api::{buffers::TextRowSet, ConnectionOptions, Cursor, Environment, ResultSetMetadata};
#[cfg(feature = "db2")]
use tracing::{debug, info};

/// Rows fetched per driver round trip
#[cfg(feature = "db2")]
const FETCH_BATCH: usize = 500;

/// Longest catalog comment in characters (QSYS2 LONG_COMMENT is VARGRAPHIC(2000))
#[cfg_attr(not(feature = "db2"), allow(dead_code))]
const LONGEST_COMMENT_CHARS: usize = 2000;

/// Text buffer per value in bytes; a UTF-16 code unit takes at most three bytes in UTF-8
#[cfg_attr(not(feature = "db2"), allow(dead_code))]
const MAX_TEXT_LEN: usize = (LONGEST_COMMENT_CHARS * 3).next_power_of_two();

/// Catalog connection over ODBC
pub struct OdbcCatalog {
    #[cfg(feature = "db2")]
    env: Arc<Environment>,

    #[cfg_attr(not(feature = "db2"), allow(dead_code))]
    connection_string: String,
}

impl OdbcCatalog {
    /// Prepare connections to `dsn`; the first statement opens one
    #[cfg(feature = "db2")]
    pub async fn connect(dsn: &dyn DataSourceName) -> Result<Self, ExtractError> {
        let env = Environment::new().map_err(|e| {
            ExtractError::Connection(format!(
                "Failed to create ODBC environment: {}. \
                 Make sure the IBM Data Server Driver for ODBC and CLI is installed.",
                e
            ))
        })?;

        info!("Using DB2 via ODBC: {}", dsn.redacted());
        Ok(Self {
            env: Arc::new(env),
            connection_string: dsn.connection_string(),
        })
    }

    #[cfg(not(feature = "db2"))]
    pub async fn connect(dsn: &dyn DataSourceName) -> Result<Self, ExtractError> {
        let _ = dsn;
        Err(ExtractError::Connection(
            "DB2 support not compiled. Rebuild with: cargo build --features db2".to_string(),
        ))
    }
}

#[cfg(feature = "db2")]
fn stream_rows(
    env: &Environment,
    connection_string: &str,
    sql: &str,
    tx: &mpsc::Sender<Result<RawRow, ExtractError>>,
    cancel: &CancellationToken,
) -> Result<(), ExtractError> {
    let conn = env
        .connect_with_connection_string(connection_string, ConnectionOptions::default())
        .map_err(|e| ExtractError::Connection(format!("ODBC connection failed: {}", e)))?;

    let Some(mut cursor) = conn
        .execute(sql, ())
        .map_err(|e| ExtractError::Query(format!("{} - SQL: {}", e, sql)))?
    else {
        return Ok(());
    };

    let num_cols = cursor
        .num_result_cols()
        .map_err(|e| ExtractError::Query(format!("Failed to get column count: {}", e)))?
        as usize;

    let mut buffers = TextRowSet::for_cursor(FETCH_BATCH, &mut cursor, Some(MAX_TEXT_LEN))
        .map_err(|e| ExtractError::Query(format!("Failed to create row buffer: {}", e)))?;
    let mut row_cursor = cursor
        .bind_buffer(&mut buffers)
        .map_err(|e| ExtractError::Query(format!("Failed to bind buffer: {}", e)))?;

    // A value longer than the buffer fails the fetch instead of being cut
    while let Some(batch) = row_cursor.fetch_with_truncation_check(true).map_err(fetch_error)? {
        for row_idx in 0..batch.num_rows() {
            if cancel.is_cancelled() {
                debug!("Fetch cancelled");
                return Ok(());
            }

            let row: RawRow = (0..num_cols)
                .map(|col_idx| match batch.at(col_idx, row_idx) {
                    Some(bytes) => CatalogValue::Text(String::from_utf8_lossy(bytes).into_owned()),
                    None => CatalogValue::Null,
                })
                .collect();

            // Receiver gone: the consumer stopped reading
            if tx.blocking_send(Ok(row)).is_err() {
                return Ok(());
            }
        }
    }
    Ok(())
}

#[cfg(feature = "db2")]
fn fetch_error(e: odbc_api::Error) -> ExtractError {
    match e {
        odbc_api::Error::TooLargeValueForBuffer { .. } => ExtractError::RowScan(format!(
            "Value longer than {} bytes: {}",
            MAX_TEXT_LEN, e
        )),
        other => ExtractError::RowScan(format!("Failed to fetch rows: {}", other)),
    }
}

#[async_trait::async_trait]
impl CatalogConnection for OdbcCatalog {
    fn name(&self) -> &'static str {
        "ODBC"
    }

    #[cfg(feature = "db2")]
    fn query(&self, sql: String, cancel: CancellationToken) -> RowReceiver {
        let (tx, rx) = mpsc::channel(FETCH_BATCH);
        let env = Arc::clone(&self.env);
        let connection_string = self.connection_string.clone();

        tokio::task::spawn_blocking(move || {
            if let Err(e) = stream_rows(&env, &connection_string, &sql, &tx, &cancel) {
                let _ = tx.blocking_send(Err(e));
            }
        });
        rx
    }

    #[cfg(not(feature = "db2"))]
    fn query(&self, sql: String, cancel: CancellationToken) -> RowReceiver {
        let _ = (sql, cancel);
        let (tx, rx) = mpsc::channel(1);
        let _ = tx.try_send(Err(ExtractError::Connection(
            "DB2 support not compiled. Rebuild with: cargo build --features db2".to_string(),
        )));
        rx
    }

    #[cfg(feature = "db2")]
    async fn test_connection(&self) -> Result<(), ExtractError> {
        let env = Arc::clone(&self.env);
        let connection_string = self.connection_string.clone();

        tokio::task::spawn_blocking(move || {
            let conn = env
                .connect_with_connection_string(&connection_string, ConnectionOptions::default())
                .map_err(|e| {
                    ExtractError::Connection(format!(
                        "Failed to connect to DB2 via ODBC: {}. Check hostname, port and credentials.",
                        e
                    ))
                })?;
            conn.execute("SELECT 1 FROM SYSIBM.SYSDUMMY1", ())
                .map_err(|e| ExtractError::Connection(e.to_string()))?;
            Ok(())
        })
        .await
        .map_err(|e| ExtractError::Connection(format!("Connection test panicked: {}", e)))?
    }

    #[cfg(not(feature = "db2"))]
    async fn test_connection(&self) -> Result<(), ExtractError> {
        Err(ExtractError::Connection(
            "DB2 support not compiled. Rebuild with: cargo build --features db2".to_string(),
        ))
    }
}

/// Connect to the catalog described by `dsn`
pub async fn connect(dsn: &dyn DataSourceName) -> Result<Arc<dyn CatalogConnection>, ExtractError> {
    let catalog = OdbcCatalog::connect(dsn).await?;
    Ok(Arc::new(catalog))
}
