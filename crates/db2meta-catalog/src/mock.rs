//! Mock catalog connection for testing
//!
//! Answers statements from in-memory rows without a database. It's useful
//! for:
//! - Unit testing the correlator and the dialect mappers end to end
//! - Simulating catalog views of different DB2 releases
//! - Simulating connection and query failures
//!
//! ## Usage
//!
//! ```rust,ignore
//! use db2meta_catalog::{CatalogValue, MockCatalog};
//!
//! let catalog = MockCatalog::new()
//!     .with_view_columns("TABNAME='TABLES'", "COLNAME", &["TABSCHEMA", "TABNAME", "REMARKS"])
//!     .with_rows(
//!         "FROM SYSCAT.TABLES WHERE",
//!         &["TABSCHEMA", "TABNAME"],
//!         vec![vec!["DB2INST1".into(), "EMP".into()]],
//!     );
//! ```
//!
//! A statement is answered by the first registered rule whose fragment it
//! contains. Registered rows are projected onto the statement's SELECT list:
//! columns the rule does not know come back as NULL, so a catalog that
//! lacks a column can be simulated by simply not registering it.

use crate::adapter::{CatalogConnection, ExtractError, RawRow, RowReceiver};
use crate::value::CatalogValue;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// How a matching statement is answered
#[derive(Debug, Clone)]
enum Response {
    Rows { columns: Vec<String>, rows: Vec<RawRow> },
    Fail(ExtractError),
}

#[derive(Debug, Clone)]
struct Rule {
    fragment: String,
    response: Response,
}

/// In-memory catalog connection
#[derive(Debug, Clone)]
pub struct MockCatalog {
    /// Rules in registration order
    rules: Arc<Vec<Rule>>,

    /// Every statement received, in order
    executed: Arc<Mutex<Vec<String>>>,

    /// Simulate connection failure
    fail_connection: bool,

    /// Simulated latency per row (milliseconds)
    latency_ms: u64,
}

impl MockCatalog {
    /// Create a mock catalog that knows no statements
    pub fn new() -> Self {
        Self {
            rules: Arc::new(Vec::new()),
            executed: Arc::new(Mutex::new(Vec::new())),
            fail_connection: false,
            latency_ms: 0,
        }
    }

    /// Answer statements containing `fragment` with `rows`
    ///
    /// Each row holds one value per entry of `columns`.
    pub fn with_rows(mut self, fragment: &str, columns: &[&str], rows: Vec<RawRow>) -> Self {
        self.push(
            fragment,
            Response::Rows {
                columns: columns.iter().map(|c| c.to_string()).collect(),
                rows,
            },
        );
        self
    }

    /// Answer a column discovery statement containing `fragment`
    pub fn with_view_columns(self, fragment: &str, name_column: &str, names: &[&str]) -> Self {
        let rows = names.iter().map(|n| vec![CatalogValue::from(*n)]).collect();
        self.with_rows(fragment, &[name_column], rows)
    }

    /// Fail statements containing `fragment` with `error`
    pub fn with_failure(mut self, fragment: &str, error: ExtractError) -> Self {
        self.push(fragment, Response::Fail(error));
        self
    }

    /// Configure to fail all connection tests
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Delay every row by `latency_ms`
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Statements received so far
    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .map(|log| log.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn push(&mut self, fragment: &str, response: Response) {
        Arc::make_mut(&mut self.rules).push(Rule {
            fragment: fragment.to_string(),
            response,
        });
    }

    fn record(&self, sql: &str) {
        let mut log = match self.executed.lock() {
            Ok(log) => log,
            Err(poisoned) => poisoned.into_inner(),
        };
        log.push(sql.to_string());
    }

    /// Rows for `sql`, projected onto its SELECT list
    fn respond(&self, sql: &str) -> Result<Vec<RawRow>, ExtractError> {
        let rule = self
            .rules
            .iter()
            .find(|rule| sql.contains(&rule.fragment))
            .ok_or_else(|| ExtractError::Query(format!("Mock catalog has no answer for: {}", sql)))?;

        let (columns, rows) = match &rule.response {
            Response::Fail(e) => return Err(e.clone()),
            Response::Rows { columns, rows } => (columns, rows),
        };

        let indexes: Vec<Option<usize>> = select_list(sql)
            .iter()
            .map(|wanted| columns.iter().position(|c| c == wanted))
            .collect();

        Ok(rows
            .iter()
            .map(|row| {
                indexes
                    .iter()
                    .map(|idx| idx.and_then(|i| row.get(i).cloned()).unwrap_or(CatalogValue::Null))
                    .collect()
            })
            .collect())
    }
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Column names between `SELECT` and the first `FROM`
fn select_list(sql: &str) -> Vec<String> {
    let Some(rest) = sql.trim_start().strip_prefix("SELECT ") else {
        return Vec::new();
    };
    let list = rest.split(" FROM ").next().unwrap_or_default();
    list.split(',').map(|c| c.trim().to_string()).collect()
}

#[async_trait::async_trait]
impl CatalogConnection for MockCatalog {
    fn name(&self) -> &'static str {
        "Mock"
    }

    fn query(&self, sql: String, cancel: CancellationToken) -> RowReceiver {
        let (tx, rx) = mpsc::channel(1);
        self.record(&sql);
        let response = self.respond(&sql);
        let latency = std::time::Duration::from_millis(self.latency_ms);

        tokio::spawn(async move {
            let rows = match response {
                Ok(rows) => rows,
                Err(e) => {
                    let _ = tx.send(Err(e)).await;
                    return;
                }
            };

            for row in rows {
                if !latency.is_zero() {
                    tokio::select! {
                        _ = cancel.cancelled() => return,
                        _ = tokio::time::sleep(latency) => {}
                    }
                }
                if cancel.is_cancelled() || tx.send(Ok(row)).await.is_err() {
                    return;
                }
            }
        });
        rx
    }

    async fn test_connection(&self) -> Result<(), ExtractError> {
        if self.fail_connection {
            Err(ExtractError::Connection(
                "Simulated connection failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn drain(mut rx: RowReceiver) -> Vec<Result<RawRow, ExtractError>> {
        let mut out = Vec::new();
        while let Some(item) = rx.recv().await {
            out.push(item);
        }
        out
    }

    #[test]
    fn parses_select_list() {
        assert_eq!(select_list("SELECT A,B , C FROM X WHERE Y"), vec!["A", "B", "C"]);
        assert!(select_list("VALUES 1").is_empty());
    }

    #[tokio::test]
    async fn projects_rows_onto_select_list() {
        let mock = MockCatalog::new().with_rows(
            "FROM T",
            &["A", "B"],
            vec![vec!["a1".into(), "b1".into()], vec!["a2".into(), CatalogValue::Null]],
        );

        let rows = drain(mock.query("SELECT B,Z,A FROM T".into(), CancellationToken::new())).await;
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0].as_ref().unwrap(),
            &vec![CatalogValue::from("b1"), CatalogValue::Null, CatalogValue::from("a1")]
        );
        assert_eq!(rows[1].as_ref().unwrap()[0], CatalogValue::Null);
        assert_eq!(mock.executed(), vec!["SELECT B,Z,A FROM T"]);
    }

    #[tokio::test]
    async fn first_matching_rule_wins() {
        let mock = MockCatalog::new()
            .with_failure("FROM BROKEN", ExtractError::Query("SQL0551N".into()))
            .with_view_columns("FROM", "NAME", &["X"]);

        let failed = drain(mock.query("SELECT NAME FROM BROKEN".into(), CancellationToken::new())).await;
        assert_eq!(failed, vec![Err(ExtractError::Query("SQL0551N".into()))]);

        let ok = drain(mock.query("SELECT NAME FROM OTHER".into(), CancellationToken::new())).await;
        assert_eq!(ok, vec![Ok(vec![CatalogValue::from("X")])]);
    }

    #[tokio::test]
    async fn unknown_statement_fails() {
        let mock = MockCatalog::new();
        let rows = drain(mock.query("SELECT 1 FROM NOWHERE".into(), CancellationToken::new())).await;
        assert!(matches!(rows.as_slice(), [Err(ExtractError::Query(_))]));
    }

    #[tokio::test]
    async fn connection_failure() {
        assert!(MockCatalog::new().test_connection().await.is_ok());
        assert!(MockCatalog::new().with_connection_failure().test_connection().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_rows() {
        let mock = MockCatalog::new()
            .with_view_columns("FROM T", "N", &["1", "2", "3"])
            .with_latency(100);
        let cancel = CancellationToken::new();
        let mut rx = mock.query("SELECT N FROM T".into(), cancel.clone());

        assert!(rx.recv().await.is_some());
        cancel.cancel();
        assert!(rx.recv().await.is_none());
    }
}
