//! Catalog dialects
//!
//! DB2 exposes its catalog under a different system schema per platform:
//!
//! | Dialect  | Platform                          | Tables view        | Columns view        |
//! |----------|-----------------------------------|--------------------|---------------------|
//! | `SYSCAT` | Db2 for Linux, UNIX and Windows   | `SYSCAT.TABLES`    | `SYSCAT.COLUMNS`    |
//! | `QSYS2`  | Db2 for i                         | `QSYS2.SYSTABLES`  | `QSYS2.SYSCOLUMNS`  |
//! | `SYSIBM` | Db2 for z/OS                      | `SYSIBM.SYSTABLES` | `SYSIBM.SYSCOLUMNS` |
//!
//! Each dialect is a [`CatalogDialect`]: where to discover view columns,
//! which rows to select, and how a scanned row becomes a table or column.
//! The set is closed; [`Dialect`] names it and is selected once per run.

use crate::query::{CatalogRecord, CatalogView, ColumnCatalog};
use db2meta_core::{Column, Config, KeyType, Metadata, Mode, RemarkRouting};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Run-wide values every mapper needs
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MappingContext {
    /// ISO 639-1 code copied into every table
    pub lang: String,

    /// Where catalog comments go
    pub remarks: RemarkRouting,
}

impl MappingContext {
    pub fn new(lang: impl Into<String>, remarks: RemarkRouting) -> Self {
        Self {
            lang: lang.into(),
            remarks,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.lang.clone(), config.remark_routing())
    }
}

/// A catalog layout and its row mappers
pub trait CatalogDialect: Send + Sync + 'static {
    /// Scanned row of the tables view
    type TableRow: CatalogRecord;

    /// Scanned row of the columns view
    type ColumnRow: CatalogRecord;

    /// System schema name
    const NAME: &'static str;

    /// Where view columns are discovered
    const COLUMN_CATALOG: ColumnCatalog;

    /// View listing tables
    const TABLE_VIEW: CatalogView;

    /// View listing columns
    const COLUMN_VIEW: CatalogView;

    /// `FROM ...` clause selecting tables of the listed schemas, ordered by key
    fn tables_clause(schemas: &str) -> String;

    /// `FROM ...` clause selecting their columns, ordered by key then position
    fn columns_clause(schemas: &str) -> String;

    /// Statement listing distinct owning schemas in its first column
    fn schemas_sql() -> String;

    /// Table draft (no columns) and its qualified key
    fn to_table(row: Self::TableRow, ctx: &MappingContext) -> (Metadata, String);

    /// Column draft and the qualified key of its table
    fn to_column(row: Self::ColumnRow, ctx: &MappingContext) -> (Column, String);
}

/// The supported catalog dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Db2 for Linux, UNIX and Windows
    Syscat,

    /// Db2 for i
    Qsys2,

    /// Db2 for z/OS
    Sysibm,
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::Syscat, Dialect::Qsys2, Dialect::Sysibm];

    /// Select the dialect for a driver key and system schema
    pub fn lookup(driver: &str, system_schema: &str) -> Option<Self> {
        if !driver.trim().eq_ignore_ascii_case(db2meta_core::config::DEFAULT_DRIVER) {
            return None;
        }
        system_schema.parse().ok()
    }

    /// System schema name
    pub fn system_schema(&self) -> &'static str {
        match self {
            Self::Syscat => crate::syscat::Syscat::NAME,
            Self::Qsys2 => crate::qsys2::Qsys2::NAME,
            Self::Sysibm => crate::sysibm::Sysibm::NAME,
        }
    }

    /// Platform description
    pub fn platform(&self) -> &'static str {
        match self {
            Self::Syscat => "Db2 for Linux, UNIX and Windows",
            Self::Qsys2 => "Db2 for i",
            Self::Sysibm => "Db2 for z/OS",
        }
    }
}

impl FromStr for Dialect {
    type Err = crate::adapter::ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SYSCAT" => Ok(Self::Syscat),
            "QSYS2" => Ok(Self::Qsys2),
            "SYSIBM" => Ok(Self::Sysibm),
            other => Err(crate::adapter::ExtractError::UnknownDialect(other.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.system_schema())
    }
}

/// Physical position, 0 when absent or unparsable
pub(crate) fn parse_order(value: Option<&str>, field: &str, owner: &str) -> i32 {
    let Some(value) = value else { return 0 };
    match value.trim().parse() {
        Ok(order) => order,
        Err(_) => {
            warn!("{}: unparsable {} '{}', using 0", owner, field, value);
            0
        }
    }
}

/// Key membership from a key sequence, primary when positive
pub(crate) fn key_sequence(value: Option<&str>, field: &str, owner: &str) -> KeyType {
    match parse_order(value, field, owner) {
        seq if seq > 0 => KeyType::primary(seq),
        _ => KeyType::default(),
    }
}

/// `Y` means nullable, any other flag required, no flag nullable
pub(crate) fn nullability(flag: Option<&str>) -> Mode {
    match flag.map(str::trim) {
        None | Some("Y") => Mode::Nullable,
        Some(_) => Mode::Required,
    }
}

/// Qualified key of a column's owning table
pub(crate) fn owner_key(schema: Option<&str>, table: Option<&str>) -> String {
    format!("{}.{}", schema.map(str::trim).unwrap_or_default(), table.unwrap_or_default())
}

/// Table draft shared by all dialects
pub(crate) fn table_draft(
    schema: Option<&str>,
    name: Option<String>,
    remark: Option<&str>,
    ctx: &MappingContext,
) -> (Metadata, String) {
    let name = name.unwrap_or_default();
    let formal_name = match schema {
        Some(schema) if !name.is_empty() => db2meta_core::qualified_name(schema, &name),
        _ => String::new(),
    };

    let mut meta = Metadata::table(name, formal_name, ctx.lang.clone());
    if let Some(remark) = remark {
        ctx.remarks.apply(remark, &mut meta.alias, &mut meta.description);
    }

    let key = meta.formal_name.clone();
    (meta, key)
}
