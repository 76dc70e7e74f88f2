//! Extraction pipeline
//!
//! ```text
//! resolve table columns ─┐
//! resolve column columns ┤
//!                        ├─ table producer  ──┐
//!                        └─ column producer ──┴─ correlator ── sink
//! ```
//!
//! The producers run as separate tasks and hand mapped drafts to the
//! correlator over single-slot queues, so a slow sink stalls the database
//! reads instead of buffering the catalog. Every stage watches one
//! cancellation token, which is also fired when the run ends for any reason.

use crate::adapter::{CatalogConnection, ExtractError};
use crate::correlate::Correlator;
use crate::dialect::{CatalogDialect, Dialect, MappingContext};
use crate::qsys2::Qsys2;
use crate::query::{resolve_columns, CatalogRecord, Query, RecordStream};
use crate::sink::CsvSink;
use crate::syscat::Syscat;
use crate::sysibm::Sysibm;
use db2meta_core::config::DEFAULT_DRIVER;
use db2meta_core::{in_clause, Config, DataSourceName};
use std::time::{Duration, Instant};
use tokio::io::AsyncWrite;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Outcome of a successful extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Table records written
    pub tables: usize,

    /// Column records written
    pub columns: usize,

    /// Wall time of the run
    pub elapsed: Duration,
}

/// Extracts table and column metadata of the target schemas
#[derive(Debug, Clone)]
pub struct Extractor {
    dialect: Dialect,
    ctx: MappingContext,
    schemas: Vec<String>,
}

impl Extractor {
    pub fn new(dialect: Dialect, ctx: MappingContext, schemas: Vec<String>) -> Self {
        Self {
            dialect,
            ctx,
            schemas,
        }
    }

    /// Extractor for the dialect, language, remark routing and schemas in `config`
    pub fn from_config(config: &Config) -> Result<Self, ExtractError> {
        let dialect = Dialect::lookup(&config.driver, &config.system_schema).ok_or_else(|| {
            let supported: Vec<&str> = Dialect::ALL.iter().map(Dialect::system_schema).collect();
            ExtractError::UnknownDialect(format!(
                "{}:{} (supported: {} with {})",
                config.driver,
                config.system_schema,
                DEFAULT_DRIVER,
                supported.join(", ")
            ))
        })?;

        Ok(Self::new(
            dialect,
            MappingContext::from_config(config),
            config.target_schema.clone(),
        ))
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn schemas(&self) -> &[String] {
        &self.schemas
    }

    /// Fail when there is nothing to extract
    pub fn check_targets(&self) -> Result<(), ExtractError> {
        if self.schemas.is_empty() {
            return Err(ExtractError::Config(
                "No target schemas configured; run schema discovery first".to_string(),
            ));
        }
        Ok(())
    }

    /// Connect to `dsn` and stream every target table into `sink`
    pub async fn run<W>(
        &self,
        dsn: &dyn DataSourceName,
        sink: &mut CsvSink<W>,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, ExtractError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        let conn = crate::odbc::connect(dsn).await?;
        self.run_with(conn.as_ref(), sink, cancel).await
    }

    /// Stream every target table into `sink` over an open connection
    ///
    /// Records already written stay in the sink when the run fails.
    pub async fn run_with<W>(
        &self,
        conn: &dyn CatalogConnection,
        sink: &mut CsvSink<W>,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, ExtractError>
    where
        W: AsyncWrite + Unpin + Send,
    {
        match self.dialect {
            Dialect::Syscat => self.pipeline::<Syscat, W>(conn, sink, cancel).await,
            Dialect::Qsys2 => self.pipeline::<Qsys2, W>(conn, sink, cancel).await,
            Dialect::Sysibm => self.pipeline::<Sysibm, W>(conn, sink, cancel).await,
        }
    }

    async fn pipeline<D, W>(
        &self,
        conn: &dyn CatalogConnection,
        sink: &mut CsvSink<W>,
        cancel: &CancellationToken,
    ) -> Result<RunSummary, ExtractError>
    where
        D: CatalogDialect,
        W: AsyncWrite + Unpin + Send,
    {
        self.check_targets()?;

        let start = Instant::now();
        let cancel = cancel.child_token();
        let _stop = cancel.clone().drop_guard();

        conn.test_connection().await?;
        info!(
            "Extracting {} schema(s) from {} ({}) via {}",
            self.schemas.len(),
            D::NAME,
            self.dialect.platform(),
            conn.name()
        );

        let table_columns =
            resolve_columns(conn, &D::COLUMN_CATALOG, &D::TABLE_VIEW, &cancel).await?;
        let column_columns =
            resolve_columns(conn, &D::COLUMN_CATALOG, &D::COLUMN_VIEW, &cancel).await?;

        let schemas = in_clause(&self.schemas);
        let tables = Query::new(table_columns, D::tables_clause(&schemas));
        let columns = Query::new(column_columns, D::columns_clause(&schemas));

        let (table_tx, table_rx) = mpsc::channel(1);
        let (column_tx, column_rx) = mpsc::channel(1);

        tokio::spawn(produce(
            tables.stream::<D::TableRow>(conn, &cancel),
            D::to_table,
            self.ctx.clone(),
            table_tx,
        ));
        tokio::spawn(produce(
            columns.stream::<D::ColumnRow>(conn, &cancel),
            D::to_column,
            self.ctx.clone(),
            column_tx,
        ));

        let mut correlator = Correlator::new(table_rx, column_rx, cancel.clone());
        let mut summary = RunSummary::default();

        while let Some(meta) = correlator.next().await {
            let meta = meta?;
            if cancel.is_cancelled() {
                return Err(ExtractError::Cancelled);
            }
            sink.write(&meta).await?;

            summary.tables += 1;
            summary.columns += meta.columns.len();
        }

        summary.elapsed = start.elapsed();
        info!(
            "Extracted {} tables, {} columns in {:.2?}",
            summary.tables, summary.columns, summary.elapsed
        );
        Ok(summary)
    }

    /// Connect to `dsn` and list the owning schemas present in the catalog
    pub async fn find_schemas(
        &self,
        dsn: &dyn DataSourceName,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, ExtractError> {
        let conn = crate::odbc::connect(dsn).await?;
        self.find_schemas_with(conn.as_ref(), cancel).await
    }

    /// List the owning schemas present in the catalog, trimmed and in catalog order
    pub async fn find_schemas_with(
        &self,
        conn: &dyn CatalogConnection,
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, ExtractError> {
        let sql = match self.dialect {
            Dialect::Syscat => Syscat::schemas_sql(),
            Dialect::Qsys2 => Qsys2::schemas_sql(),
            Dialect::Sysibm => Sysibm::schemas_sql(),
        };

        let cancel = cancel.child_token();
        let _stop = cancel.clone().drop_guard();

        conn.test_connection().await?;
        debug!("Schema discovery: {}", sql);

        let mut rows = conn.query(sql, cancel.clone());
        let mut schemas: Vec<String> = Vec::new();

        loop {
            let item = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ExtractError::Cancelled),
                item = rows.recv() => item,
            };
            let Some(row) = item else { break };

            let name = row?
                .first()
                .map(|value| value.canonical().trim().to_string())
                .unwrap_or_default();
            if !name.is_empty() && schemas.last() != Some(&name) {
                schemas.push(name);
            }
        }

        info!("Found {} schemas in {}", schemas.len(), self.dialect);
        Ok(schemas)
    }
}

/// Map every scanned record and forward it to the correlator
///
/// Stops after the first error or once the correlator stops listening.
async fn produce<R, T>(
    mut stream: RecordStream<R>,
    map: fn(R, &MappingContext) -> T,
    ctx: MappingContext,
    tx: mpsc::Sender<Result<T, ExtractError>>,
) where
    R: CatalogRecord,
    T: Send + 'static,
{
    while let Some(item) = stream.next().await {
        let failed = item.is_err();
        if tx.send(item.map(|record| map(record, &ctx))).await.is_err() || failed {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockCatalog;
    use crate::value::CatalogValue;
    use db2meta_core::RemarkRouting;

    fn extractor(schemas: &[&str]) -> Extractor {
        Extractor::new(
            Dialect::Syscat,
            MappingContext::new("ja", RemarkRouting::default()),
            schemas.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[tokio::test]
    async fn empty_target_list_is_rejected() {
        let mut sink = CsvSink::new(Vec::new());
        let err = extractor(&[])
            .run_with(&MockCatalog::new(), &mut sink, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractError::Config(_)));
    }

    #[tokio::test]
    async fn schemas_are_trimmed_and_unique() {
        let mock = MockCatalog::new().with_rows(
            "GROUP BY TABSCHEMA",
            &["TABSCHEMA"],
            vec![
                vec!["DB2INST1".into()],
                vec!["SYSCAT  ".into()],
                vec!["SYSCAT".into()],
                vec![CatalogValue::Null],
            ],
        );

        let schemas = extractor(&[])
            .find_schemas_with(&mock, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(schemas, vec!["DB2INST1", "SYSCAT"]);
    }

    #[test]
    fn from_config_selects_dialect() {
        let mut config = Config::default();
        config.system_schema = "QSYS2".to_string();
        config.target_schema = vec!["QPGMR".to_string()];

        let extractor = Extractor::from_config(&config).unwrap();
        assert_eq!(extractor.dialect(), Dialect::Qsys2);
        assert_eq!(extractor.schemas(), ["QPGMR".to_string()]);

        config.system_schema = "INFORMATION_SCHEMA".to_string();
        match Extractor::from_config(&config) {
            Err(ExtractError::UnknownDialect(message)) => assert_eq!(
                message,
                "db2:INFORMATION_SCHEMA (supported: db2 with SYSCAT, QSYS2, SYSIBM)"
            ),
            other => panic!("expected unknown dialect, got {:?}", other),
        }
    }
}
