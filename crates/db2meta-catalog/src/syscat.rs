//! Db2 for Linux, UNIX and Windows (`SYSCAT`)

use crate::dialect::{self, CatalogDialect, MappingContext};
use crate::query::{CatalogRecord, CatalogView, ColumnCatalog};
use db2meta_core::{Column, Metadata};

/// Tables, untyped tables, summary tables, views and typed views
const TABLE_TYPES: &str = "('S', 'T', 'U', 'V', 'W')";

/// The `SYSCAT` catalog
#[derive(Debug, Clone, Copy, Default)]
pub struct Syscat;

/// A `SYSCAT.TABLES` row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyscatTableRow {
    pub tabschema: Option<String>,
    pub tabname: Option<String>,
    pub remarks: Option<String>,
}

impl CatalogRecord for SyscatTableRow {
    type Binding = fn(&mut Self, String);

    fn bind(column: &str) -> Option<Self::Binding> {
        let set: fn(&mut Self, String) = match column {
            "TABSCHEMA" => |r: &mut Self, v: String| r.tabschema = Some(v),
            "TABNAME" => |r: &mut Self, v: String| r.tabname = Some(v),
            "REMARKS" => |r: &mut Self, v: String| r.remarks = Some(v),
            _ => return None,
        };
        Some(set)
    }

    fn assign(&mut self, binding: &Self::Binding, value: String) {
        binding(self, value)
    }
}

/// A `SYSCAT.COLUMNS` row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyscatColumnRow {
    pub tabschema: Option<String>,
    pub tabname: Option<String>,
    pub colname: Option<String>,
    pub colno: Option<String>,
    pub typeschema: Option<String>,
    pub typename: Option<String>,
    pub nulls: Option<String>,
    pub keyseq: Option<String>,
    pub remarks: Option<String>,
}

impl CatalogRecord for SyscatColumnRow {
    type Binding = fn(&mut Self, String);

    fn bind(column: &str) -> Option<Self::Binding> {
        let set: fn(&mut Self, String) = match column {
            "TABSCHEMA" => |r: &mut Self, v: String| r.tabschema = Some(v),
            "TABNAME" => |r: &mut Self, v: String| r.tabname = Some(v),
            "COLNAME" => |r: &mut Self, v: String| r.colname = Some(v),
            "COLNO" => |r: &mut Self, v: String| r.colno = Some(v),
            "TYPESCHEMA" => |r: &mut Self, v: String| r.typeschema = Some(v),
            "TYPENAME" => |r: &mut Self, v: String| r.typename = Some(v),
            "NULLS" => |r: &mut Self, v: String| r.nulls = Some(v),
            "KEYSEQ" => |r: &mut Self, v: String| r.keyseq = Some(v),
            "REMARKS" => |r: &mut Self, v: String| r.remarks = Some(v),
            _ => return None,
        };
        Some(set)
    }

    fn assign(&mut self, binding: &Self::Binding, value: String) {
        binding(self, value)
    }
}

impl CatalogDialect for Syscat {
    type TableRow = SyscatTableRow;
    type ColumnRow = SyscatColumnRow;

    const NAME: &'static str = "SYSCAT";

    const COLUMN_CATALOG: ColumnCatalog = ColumnCatalog {
        view: CatalogView::new("SYSCAT", "COLUMNS"),
        name_column: "COLNAME",
        schema_column: "TABSCHEMA",
        table_column: "TABNAME",
        position_column: "COLNO",
    };

    const TABLE_VIEW: CatalogView = CatalogView::new("SYSCAT", "TABLES");
    const COLUMN_VIEW: CatalogView = CatalogView::new("SYSCAT", "COLUMNS");

    fn tables_clause(schemas: &str) -> String {
        format!(
            "FROM SYSCAT.TABLES WHERE TYPE IN {} AND TABSCHEMA IN {} ORDER BY TABSCHEMA, TABNAME",
            TABLE_TYPES, schemas
        )
    }

    fn columns_clause(schemas: &str) -> String {
        format!(
            "FROM SYSCAT.COLUMNS C WHERE C.TABSCHEMA IN {} \
             AND EXISTS (SELECT 1 FROM SYSCAT.TABLES T WHERE T.TABSCHEMA = C.TABSCHEMA \
             AND T.TABNAME = C.TABNAME AND T.TYPE IN {}) \
             ORDER BY C.TABSCHEMA, C.TABNAME, C.COLNO",
            schemas, TABLE_TYPES
        )
    }

    fn schemas_sql() -> String {
        "SELECT TABSCHEMA FROM SYSCAT.TABLES GROUP BY TABSCHEMA ORDER BY TABSCHEMA".to_string()
    }

    fn to_table(row: SyscatTableRow, ctx: &MappingContext) -> (Metadata, String) {
        dialect::table_draft(row.tabschema.as_deref(), row.tabname, row.remarks.as_deref(), ctx)
    }

    fn to_column(row: SyscatColumnRow, ctx: &MappingContext) -> (Column, String) {
        let key = dialect::owner_key(row.tabschema.as_deref(), row.tabname.as_deref());
        let name = row.colname.unwrap_or_default();

        let data_type = match (row.typeschema.as_deref().map(str::trim), row.typename) {
            (Some(schema), Some(name)) if !schema.is_empty() => format!("{}.{}", schema, name),
            (_, name) => name.unwrap_or_default(),
        };

        let owner = format!("{}.{}", key, name);
        let mut column = Column::new(name, data_type)
            .with_mode(dialect::nullability(row.nulls.as_deref()))
            .with_order(dialect::parse_order(row.colno.as_deref(), "COLNO", &owner))
            .with_key_type(dialect::key_sequence(row.keyseq.as_deref(), "KEYSEQ", &owner));

        if let Some(remark) = row.remarks.as_deref() {
            ctx.remarks.apply(remark, &mut column.alias, &mut column.description);
        }

        (column, key)
    }
}
