//! db2meta Core
//!
//! Domain model, run configuration and the import record format shared by
//! the extraction pipeline and the CLI. The record layout is consumed by an
//! external importer; never change it without a new format version there.

pub mod schema;
pub mod config;
pub mod dsn;
pub mod record;

pub use schema::{Column, Constraint, KeyType, Metadata, MetaType, Mode, qualified_name};
pub use config::{Config, ConfigError, RemarkRouting, RemarkTarget, in_clause};
pub use dsn::{DataSourceName, Db2Dsn};
pub use record::{to_records, escape_field};
