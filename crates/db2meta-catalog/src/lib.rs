//! DB2 catalog metadata extraction
//!
//! Reads table and column metadata from the system catalog of a DB2 database
//! and writes it as importer records, one table at a time.
//!
//! ## Features
//!
//! - `db2` - connect through the IBM ODBC/CLI driver (`odbc-api`)
//!
//! Without it only [`MockCatalog`] can serve the pipeline, which is what the
//! test suite uses.
//!
//! ## Example
//!
//! ```rust,ignore
//! use db2meta_catalog::{CsvSink, Extractor};
//! use db2meta_core::Config;
//! use tokio_util::sync::CancellationToken;
//!
//! let config = Config::from_file("config.json".as_ref())?;
//! let extractor = Extractor::from_config(&config)?;
//! let file = tokio::fs::File::create(&config.csv_file).await?;
//! let mut sink = CsvSink::new(file);
//! let summary = extractor.run(&config.dsn(), &mut sink, &CancellationToken::new()).await?;
//! ```

pub mod adapter;
pub mod value;
pub mod query;
pub mod dialect;
pub mod syscat;
pub mod qsys2;
pub mod sysibm;
pub mod correlate;
pub mod sink;
pub mod extractor;
pub mod odbc;
pub mod mock;

pub use adapter::{CatalogConnection, ExtractError, RawRow, RowReceiver};
pub use value::CatalogValue;
pub use query::{resolve_columns, CatalogRecord, CatalogView, ColumnCatalog, Query, RecordStream};
pub use dialect::{CatalogDialect, Dialect, MappingContext};
pub use syscat::Syscat;
pub use qsys2::Qsys2;
pub use sysibm::Sysibm;
pub use correlate::Correlator;
pub use sink::CsvSink;
pub use extractor::{Extractor, RunSummary};
pub use odbc::OdbcCatalog;
pub use mock::MockCatalog;
