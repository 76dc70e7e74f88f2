//! Extracted metadata model
//!
//! One [`Metadata`] describes one catalog table together with its ordered
//! [`Column`]s. The numeric codes of the enums match the import format of
//! the downstream metadata catalog.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of metadata record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MetaType {
    /// Tabular data (the only kind catalog extraction produces)
    #[default]
    Table = 1,

    /// Data model
    Model = 2,

    /// Stream of records
    Stream = 3,

    /// File
    File = 4,
}

impl MetaType {
    /// Name written to the record format
    pub fn name(&self) -> &'static str {
        match self {
            Self::Table => "Table",
            Self::Model => "Model",
            Self::Stream => "Stream",
            Self::File => "File",
        }
    }
}

impl fmt::Display for MetaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Multiplicity of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    /// Value may be absent
    #[default]
    Nullable = 0,

    /// Value is always present
    Required = 1,

    /// Value repeats
    Repeated = 2,
}

impl Mode {
    /// Name written to the record format
    pub fn name(&self) -> &'static str {
        match self {
            Self::Nullable => "Nullable",
            Self::Required => "Required",
            Self::Repeated => "Repeated",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Key constraint attached to a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Constraint {
    /// Not part of a key
    #[default]
    None = 0,

    /// Part of the primary key
    Primary = 1,
}

impl Constraint {
    /// Name written to the record format (empty for [`Constraint::None`])
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "",
            Self::Primary => "Primary",
        }
    }
}

/// Key membership of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct KeyType {
    /// Constraint kind
    pub constraint: Constraint,

    /// 1-based position inside a composite key
    pub order: i32,
}

impl KeyType {
    /// Primary key member at `order`
    pub fn primary(order: i32) -> Self {
        Self {
            constraint: Constraint::Primary,
            order,
        }
    }
}

/// A column of an extracted table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,

    /// Display name
    pub alias: String,

    /// Free-text description
    pub description: String,

    /// Engine-native type name, not normalized
    pub data_type: String,

    /// Multiplicity
    pub mode: Mode,

    /// Physical position in the table (0 when the catalog value was unusable)
    pub order: i32,

    /// Key membership
    pub key_type: KeyType,
}

impl Column {
    /// Create a nullable column with the given name and native type
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            ..Self::default()
        }
    }

    /// Set the multiplicity
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the physical position
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Set key membership
    pub fn with_key_type(mut self, key_type: KeyType) -> Self {
        self.key_type = key_type;
        self
    }
}

/// One extracted table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Local table name
    pub name: String,

    /// Qualified `schema.name`, unique within one extraction run
    pub formal_name: String,

    /// Display name
    pub alias: String,

    /// Free-text description
    pub description: String,

    /// Record kind
    pub meta_type: MetaType,

    /// ISO 639-1 language code
    pub lang: String,

    /// Columns in catalog order
    pub columns: Vec<Column>,
}

impl Metadata {
    /// Create an empty table record
    pub fn table(
        name: impl Into<String>,
        formal_name: impl Into<String>,
        lang: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            formal_name: formal_name.into(),
            lang: lang.into(),
            meta_type: MetaType::Table,
            ..Self::default()
        }
    }

    /// Append columns
    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    /// Column names in order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Compose the qualified key `schema.name`
///
/// Fixed-width catalog columns pad the schema with trailing blanks, so the
/// schema part is trimmed. The table name is kept verbatim.
pub fn qualified_name(schema: &str, name: &str) -> String {
    format!("{}.{}", schema.trim(), name)
}
