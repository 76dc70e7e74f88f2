//! Streaming merge of tables and their columns
//!
//! Both inputs arrive ordered by the same qualified key. The correlator holds
//! at most one table and one column at a time and emits each table as soon as
//! a column for a different key (or the end of the column stream) shows that
//! it is complete.
//!
//! A column is only ever appended to the table whose key it carries. A pulled
//! table that does not own the waiting column has no columns and is emitted
//! as is. A column whose table cannot be found, or whose table was already
//! emitted, stops the run with [`ExtractError::Correlation`].

use crate::adapter::ExtractError;
use db2meta_core::{Column, Metadata};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// A table draft with its qualified key
pub type KeyedTable = (Metadata, String);

/// A column draft with the qualified key of its table
pub type KeyedColumn = (Column, String);

/// Producer side of the table queue
pub type TableSender = mpsc::Sender<Result<KeyedTable, ExtractError>>;

/// Producer side of the column queue
pub type ColumnSender = mpsc::Sender<Result<KeyedColumn, ExtractError>>;

/// Groups columns under their tables
pub struct Correlator {
    tables: mpsc::Receiver<Result<KeyedTable, ExtractError>>,
    columns: mpsc::Receiver<Result<KeyedColumn, ExtractError>>,
    cancel: CancellationToken,

    /// Table currently accumulating columns
    current: Option<KeyedTable>,

    /// Column read but not yet placed
    pending: Option<KeyedColumn>,

    /// Key of the last emitted table
    last_key: Option<String>,

    columns_done: bool,
    done: bool,
}

impl Correlator {
    pub fn new(
        tables: mpsc::Receiver<Result<KeyedTable, ExtractError>>,
        columns: mpsc::Receiver<Result<KeyedColumn, ExtractError>>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            tables,
            columns,
            cancel,
            current: None,
            pending: None,
            last_key: None,
            columns_done: false,
            done: false,
        }
    }

    /// Next complete table, `None` once both inputs are exhausted
    ///
    /// After an error the correlator is finished and returns `None`.
    pub async fn next(&mut self) -> Option<Result<Metadata, ExtractError>> {
        if self.done {
            return None;
        }
        match self.step().await {
            Ok(Some(meta)) => Some(Ok(meta)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }

    async fn step(&mut self) -> Result<Option<Metadata>, ExtractError> {
        loop {
            if self.pending.is_none() && !self.columns_done {
                match recv(&mut self.columns, &self.cancel).await? {
                    Some(column) => self.pending = Some(column),
                    None => self.columns_done = true,
                }
            }

            let Some((column, key)) = self.pending.take() else {
                // Column stream exhausted: flush the current table, then any
                // tables that never had a column.
                if let Some(table) = self.current.take() {
                    return Ok(Some(self.complete(table)));
                }
                return match recv(&mut self.tables, &self.cancel).await? {
                    Some(table) => Ok(Some(self.complete(table))),
                    None => Ok(None),
                };
            };

            let owns = self.current.as_ref().map(|(_, current)| *current == key);
            match owns {
                Some(true) => {
                    if let Some((meta, _)) = self.current.as_mut() {
                        if let Some(previous) = meta.columns.last() {
                            if column.order < previous.order {
                                warn!(
                                    "{}: column {} (order {}) follows {} (order {})",
                                    key, column.name, column.order, previous.name, previous.order
                                );
                            }
                        }
                        meta.columns.push(column);
                    }
                }
                Some(false) => {
                    self.pending = Some((column, key));
                    if let Some(table) = self.current.take() {
                        return Ok(Some(self.complete(table)));
                    }
                }
                None => {
                    if self.last_key.as_deref() == Some(key.as_str()) {
                        return Err(ExtractError::Correlation(format!(
                            "column {} of {} arrived after its table was completed",
                            column.name, key
                        )));
                    }
                    match recv(&mut self.tables, &self.cancel).await? {
                        Some(table) => {
                            self.current = Some(table);
                            self.pending = Some((column, key));
                        }
                        None => {
                            return Err(ExtractError::Correlation(format!(
                                "column {} references {}, which is not among the extracted tables",
                                column.name, key
                            )));
                        }
                    }
                }
            }
        }
    }

    fn complete(&mut self, (meta, key): KeyedTable) -> Metadata {
        debug!("Table {} complete with {} columns", key, meta.columns.len());
        self.last_key = Some(key);
        meta
    }
}

/// Receive from a queue unless the run is cancelled first
async fn recv<T>(
    rx: &mut mpsc::Receiver<Result<T, ExtractError>>,
    cancel: &CancellationToken,
) -> Result<Option<T>, ExtractError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ExtractError::Cancelled),
        item = rx.recv() => item.transpose(),
    }
}
