//! Version-tolerant catalog queries
//!
//! The column set of a catalog view differs between DB2 releases and
//! platforms (`KEYSEQ` on one, `IS_IDENTITY` on another), so view columns
//! are never hard-coded. Instead the catalog's own column view is asked
//! which columns the target view exposes right now, and the SELECT list is
//! built from that answer.
//!
//! Rows of such a statement are scanned into a [`CatalogRecord`]. The
//! record decides once per statement which resolved column feeds which of
//! its fields; at scan time each non-empty canonical value is handed to
//! its field and empty values are skipped, so "field populated" means
//! "catalog value present".

use crate::adapter::{CatalogConnection, ExtractError, RawRow, RowReceiver};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// A catalog view, e.g. `SYSCAT.TABLES`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogView {
    /// Owning schema of the view
    pub schema: &'static str,

    /// View name
    pub name: &'static str,
}

impl CatalogView {
    pub const fn new(schema: &'static str, name: &'static str) -> Self {
        Self { schema, name }
    }

    /// `SCHEMA.NAME`
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

/// Layout of the catalog view that describes view columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnCatalog {
    /// The column view itself, e.g. `SYSCAT.COLUMNS`
    pub view: CatalogView,

    /// Column holding the column name
    pub name_column: &'static str,

    /// Column holding the owning schema
    pub schema_column: &'static str,

    /// Column holding the owning table
    pub table_column: &'static str,

    /// Column holding the physical position
    pub position_column: &'static str,
}

impl ColumnCatalog {
    /// Statement listing the columns of `target` in physical order
    pub fn discovery_sql(&self, target: &CatalogView) -> String {
        format!(
            "SELECT {} FROM {} WHERE {}='{}' AND {}='{}' ORDER BY {}",
            self.name_column,
            self.view.qualified(),
            self.schema_column,
            target.schema,
            self.table_column,
            target.name,
            self.position_column,
        )
    }
}

/// Ask the catalog which columns `target` currently exposes
///
/// Returns the column names in physical order. Any failure, including an
/// empty answer, is a [`ExtractError::ColumnDiscovery`] for `target`.
pub async fn resolve_columns(
    conn: &dyn CatalogConnection,
    catalog: &ColumnCatalog,
    target: &CatalogView,
    cancel: &CancellationToken,
) -> Result<Vec<String>, ExtractError> {
    let sql = catalog.discovery_sql(target);
    debug!("Column discovery: {}", sql);

    let mut rows = conn.query(sql, cancel.clone());
    let mut columns = Vec::new();

    loop {
        let item = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ExtractError::Cancelled),
            item = rows.recv() => item,
        };
        let Some(item) = item else { break };

        let row = item.map_err(|e| match e {
            ExtractError::Cancelled => ExtractError::Cancelled,
            other => ExtractError::discovery(target.qualified(), other.to_string()),
        })?;

        if let Some(value) = row.first() {
            let name = value.canonical().trim().to_string();
            if !name.is_empty() {
                columns.push(name);
            }
        }
    }

    if columns.is_empty() {
        return Err(ExtractError::discovery(
            target.qualified(),
            "catalog reports no columns",
        ));
    }

    info!("Resolved {} columns for {}", columns.len(), target.qualified());
    debug!("{} columns: {}", target.qualified(), columns.join(","));
    Ok(columns)
}

/// A SELECT whose column list was resolved at run time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    columns: Vec<String>,
    clause: String,
}

impl Query {
    /// Combine resolved columns with a trusted `FROM ...` clause
    pub fn new(columns: Vec<String>, clause: impl Into<String>) -> Self {
        Self {
            columns,
            clause: clause.into(),
        }
    }

    /// Resolved column names in SELECT-list order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Full statement text
    pub fn stmt(&self) -> String {
        format!("SELECT {} {}", self.columns.join(","), self.clause)
    }

    /// Execute and scan every row into `R`
    pub fn stream<R: CatalogRecord>(
        &self,
        conn: &dyn CatalogConnection,
        cancel: &CancellationToken,
    ) -> RecordStream<R> {
        let sql = self.stmt();
        debug!("Executing: {}", sql);
        RecordStream::new(conn.query(sql, cancel.clone()), &self.columns, cancel.clone())
    }
}

/// A row type populated from resolved catalog columns
pub trait CatalogRecord: Default + Send + 'static {
    /// What `bind` hands back for a column the record uses
    type Binding: Clone + Send + Sync + 'static;

    /// Binding for `column`, or `None` when the record ignores it
    fn bind(column: &str) -> Option<Self::Binding>;

    /// Store a non-empty canonical value through `binding`
    fn assign(&mut self, binding: &Self::Binding, value: String);
}

/// Lazy, single-pass sequence of scanned records
///
/// Dropping the stream closes the underlying cursor.
pub struct RecordStream<R: CatalogRecord> {
    rows: RowReceiver,
    bindings: Vec<Option<R::Binding>>,
    cancel: CancellationToken,
}

impl<R: CatalogRecord> RecordStream<R> {
    /// Wrap a running statement whose SELECT list is `columns`
    pub fn new(rows: RowReceiver, columns: &[String], cancel: CancellationToken) -> Self {
        Self {
            rows,
            bindings: columns.iter().map(|c| R::bind(c)).collect(),
            cancel,
        }
    }

    /// Next record, `None` once the statement is exhausted
    pub async fn next(&mut self) -> Option<Result<R, ExtractError>> {
        let item = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Some(Err(ExtractError::Cancelled)),
            item = self.rows.recv() => item,
        };
        match item {
            Some(Ok(row)) => Some(self.scan(row)),
            Some(Err(e)) => Some(Err(e)),
            None => None,
        }
    }

    /// Scan one raw row, skipping values whose canonical form is empty
    pub fn scan(&self, row: RawRow) -> Result<R, ExtractError> {
        if row.len() != self.bindings.len() {
            return Err(ExtractError::RowScan(format!(
                "expected {} values, got {}",
                self.bindings.len(),
                row.len()
            )));
        }

        let mut record = R::default();
        for (binding, value) in self.bindings.iter().zip(row) {
            let Some(binding) = binding else { continue };
            let text = value.canonical();
            if text.is_empty() {
                continue;
            }
            record.assign(binding, text.into_owned());
        }
        Ok(record)
    }
}
