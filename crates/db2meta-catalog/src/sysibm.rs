//! Db2 for z/OS (`SYSIBM`)

use crate::dialect::{self, CatalogDialect, MappingContext};
use crate::query::{CatalogRecord, CatalogView, ColumnCatalog};
use db2meta_core::{Column, Metadata};

/// Everything but aliases
const TABLE_FILTER: &str = "TYPE <> 'A'";

/// The `SYSIBM` catalog
#[derive(Debug, Clone, Copy, Default)]
pub struct Sysibm;

/// A `SYSIBM.SYSTABLES` row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SysibmTableRow {
    pub creator: Option<String>,
    pub name: Option<String>,
    pub remarks: Option<String>,
}

impl CatalogRecord for SysibmTableRow {
    type Binding = fn(&mut Self, String);

    fn bind(column: &str) -> Option<Self::Binding> {
        let set: fn(&mut Self, String) = match column {
            "CREATOR" => |r: &mut Self, v: String| r.creator = Some(v),
            "NAME" => |r: &mut Self, v: String| r.name = Some(v),
            "REMARKS" => |r: &mut Self, v: String| r.remarks = Some(v),
            _ => return None,
        };
        Some(set)
    }

    fn assign(&mut self, binding: &Self::Binding, value: String) {
        binding(self, value)
    }
}

/// A `SYSIBM.SYSCOLUMNS` row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SysibmColumnRow {
    pub tbcreator: Option<String>,
    pub tbname: Option<String>,
    pub name: Option<String>,
    pub colno: Option<String>,
    pub coltype: Option<String>,
    pub nulls: Option<String>,
    pub keyseq: Option<String>,
    pub remarks: Option<String>,
    pub label: Option<String>,
}

impl CatalogRecord for SysibmColumnRow {
    type Binding = fn(&mut Self, String);

    fn bind(column: &str) -> Option<Self::Binding> {
        let set: fn(&mut Self, String) = match column {
            "TBCREATOR" => |r: &mut Self, v: String| r.tbcreator = Some(v),
            "TBNAME" => |r: &mut Self, v: String| r.tbname = Some(v),
            "NAME" => |r: &mut Self, v: String| r.name = Some(v),
            "COLNO" => |r: &mut Self, v: String| r.colno = Some(v),
            "COLTYPE" => |r: &mut Self, v: String| r.coltype = Some(v),
            "NULLS" => |r: &mut Self, v: String| r.nulls = Some(v),
            "KEYSEQ" => |r: &mut Self, v: String| r.keyseq = Some(v),
            "REMARKS" => |r: &mut Self, v: String| r.remarks = Some(v),
            "LABEL" => |r: &mut Self, v: String| r.label = Some(v),
            _ => return None,
        };
        Some(set)
    }

    fn assign(&mut self, binding: &Self::Binding, value: String) {
        binding(self, value)
    }
}

impl CatalogDialect for Sysibm {
    type TableRow = SysibmTableRow;
    type ColumnRow = SysibmColumnRow;

    const NAME: &'static str = "SYSIBM";

    const COLUMN_CATALOG: ColumnCatalog = ColumnCatalog {
        view: CatalogView::new("SYSIBM", "SYSCOLUMNS"),
        name_column: "NAME",
        schema_column: "TBCREATOR",
        table_column: "TBNAME",
        position_column: "COLNO",
    };

    const TABLE_VIEW: CatalogView = CatalogView::new("SYSIBM", "SYSTABLES");
    const COLUMN_VIEW: CatalogView = CatalogView::new("SYSIBM", "SYSCOLUMNS");

    fn tables_clause(schemas: &str) -> String {
        format!(
            "FROM SYSIBM.SYSTABLES WHERE {} AND CREATOR IN {} ORDER BY CREATOR, NAME",
            TABLE_FILTER, schemas
        )
    }

    fn columns_clause(schemas: &str) -> String {
        format!(
            "FROM SYSIBM.SYSCOLUMNS C WHERE C.TBCREATOR IN {} \
             AND EXISTS (SELECT 1 FROM SYSIBM.SYSTABLES T WHERE T.CREATOR = C.TBCREATOR \
             AND T.NAME = C.TBNAME AND T.{}) \
             ORDER BY C.TBCREATOR, C.TBNAME, C.COLNO",
            schemas, TABLE_FILTER
        )
    }

    fn schemas_sql() -> String {
        "SELECT CREATOR FROM SYSIBM.SYSTABLES GROUP BY CREATOR ORDER BY CREATOR".to_string()
    }

    fn to_table(row: SysibmTableRow, ctx: &MappingContext) -> (Metadata, String) {
        dialect::table_draft(row.creator.as_deref(), row.name, row.remarks.as_deref(), ctx)
    }

    fn to_column(row: SysibmColumnRow, ctx: &MappingContext) -> (Column, String) {
        let key = dialect::owner_key(row.tbcreator.as_deref(), row.tbname.as_deref());
        let name = row.name.unwrap_or_default();
        let data_type = row.coltype.as_deref().map(str::trim).unwrap_or_default().to_string();

        let owner = format!("{}.{}", key, name);
        let mut column = Column::new(name, data_type)
            .with_mode(dialect::nullability(row.nulls.as_deref()))
            .with_order(dialect::parse_order(row.colno.as_deref(), "COLNO", &owner))
            .with_key_type(dialect::key_sequence(row.keyseq.as_deref(), "KEYSEQ", &owner));

        if let Some(remark) = row.remarks.as_deref() {
            ctx.remarks.apply(remark, &mut column.alias, &mut column.description);
        }
        if let Some(label) = row.label {
            column.alias = label;
        }

        (column, key)
    }
}
