//! Import record format
//!
//! This format is consumed by the downstream catalog importer and is a
//! fixed contract. Each table becomes one table record followed by one
//! column record per column and a terminating blank line:
//!
//! ```text
//! 20,,<FormalName>,<Alias>,<Description>,<Lang>,<MetaType>
//! 30,,<Name>,<Alias>,<Description>,<Type>,<Mode>,<Constraint>
//!
//! ```
//!
//! The second field is the importer's record ID; leaving it empty makes the
//! importer register a new record.

use crate::schema::{Column, Metadata};
use std::borrow::Cow;

/// Record kind codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Table record
    Table,

    /// Column record
    Column,
}

impl RecordKind {
    /// Leading code of the record line
    pub fn code(&self) -> &'static str {
        match self {
            Self::Table => "20",
            Self::Column => "30",
        }
    }
}

/// Quote a field containing a separator, quote or line break
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Table record line, newline included
pub fn table_record(meta: &Metadata) -> String {
    format!(
        "{},,{},{},{},{},{}\n",
        RecordKind::Table.code(),
        escape_field(&meta.formal_name),
        escape_field(&meta.alias),
        escape_field(&meta.description),
        escape_field(&meta.lang),
        meta.meta_type.name(),
    )
}

/// Column record line, newline included
pub fn column_record(column: &Column) -> String {
    format!(
        "{},,{},{},{},{},{},{}\n",
        RecordKind::Column.code(),
        escape_field(&column.name),
        escape_field(&column.alias),
        escape_field(&column.description),
        escape_field(&column.data_type),
        column.mode.name(),
        column.key_type.constraint.name(),
    )
}

/// Complete record group for one table
pub fn to_records(meta: &Metadata) -> String {
    let mut buf = table_record(meta);
    for column in &meta.columns {
        buf.push_str(&column_record(column));
    }
    buf.push('\n');
    buf
}
