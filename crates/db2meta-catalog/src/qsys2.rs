//! Db2 for i (`QSYS2`)

use crate::dialect::{self, CatalogDialect, MappingContext};
use crate::query::{CatalogRecord, CatalogView, ColumnCatalog};
use db2meta_core::{Column, KeyType, Metadata};

/// Everything but aliases
const TABLE_FILTER: &str = "TYPE <> 'A'";

/// The `QSYS2` catalog
#[derive(Debug, Clone, Copy, Default)]
pub struct Qsys2;

/// A `QSYS2.SYSTABLES` row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Qsys2TableRow {
    pub table_owner: Option<String>,
    pub table_name: Option<String>,
    pub long_comment: Option<String>,
}

impl CatalogRecord for Qsys2TableRow {
    type Binding = fn(&mut Self, String);

    fn bind(column: &str) -> Option<Self::Binding> {
        let set: fn(&mut Self, String) = match column {
            "TABLE_OWNER" => |r: &mut Self, v: String| r.table_owner = Some(v),
            "TABLE_NAME" => |r: &mut Self, v: String| r.table_name = Some(v),
            "LONG_COMMENT" => |r: &mut Self, v: String| r.long_comment = Some(v),
            _ => return None,
        };
        Some(set)
    }

    fn assign(&mut self, binding: &Self::Binding, value: String) {
        binding(self, value)
    }
}

/// A `QSYS2.SYSCOLUMNS` row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Qsys2ColumnRow {
    pub table_owner: Option<String>,
    pub table_name: Option<String>,
    pub column_name: Option<String>,
    pub ordinal_position: Option<String>,
    pub data_type: Option<String>,
    pub is_nullable: Option<String>,
    pub is_identity: Option<String>,
    pub column_text: Option<String>,
    pub column_heading: Option<String>,
}

impl CatalogRecord for Qsys2ColumnRow {
    type Binding = fn(&mut Self, String);

    fn bind(column: &str) -> Option<Self::Binding> {
        let set: fn(&mut Self, String) = match column {
            "TABLE_OWNER" => |r: &mut Self, v: String| r.table_owner = Some(v),
            "TABLE_NAME" => |r: &mut Self, v: String| r.table_name = Some(v),
            "COLUMN_NAME" => |r: &mut Self, v: String| r.column_name = Some(v),
            "ORDINAL_POSITION" => |r: &mut Self, v: String| r.ordinal_position = Some(v),
            "DATA_TYPE" => |r: &mut Self, v: String| r.data_type = Some(v),
            "IS_NULLABLE" => |r: &mut Self, v: String| r.is_nullable = Some(v),
            "IS_IDENTITY" => |r: &mut Self, v: String| r.is_identity = Some(v),
            "COLUMN_TEXT" => |r: &mut Self, v: String| r.column_text = Some(v),
            "COLUMN_HEADING" => |r: &mut Self, v: String| r.column_heading = Some(v),
            _ => return None,
        };
        Some(set)
    }

    fn assign(&mut self, binding: &Self::Binding, value: String) {
        binding(self, value)
    }
}

impl CatalogDialect for Qsys2 {
    type TableRow = Qsys2TableRow;
    type ColumnRow = Qsys2ColumnRow;

    const NAME: &'static str = "QSYS2";

    const COLUMN_CATALOG: ColumnCatalog = ColumnCatalog {
        view: CatalogView::new("QSYS2", "SYSCOLUMNS"),
        name_column: "COLUMN_NAME",
        schema_column: "TABLE_OWNER",
        table_column: "TABLE_NAME",
        position_column: "ORDINAL_POSITION",
    };

    const TABLE_VIEW: CatalogView = CatalogView::new("QSYS2", "SYSTABLES");
    const COLUMN_VIEW: CatalogView = CatalogView::new("QSYS2", "SYSCOLUMNS");

    fn tables_clause(schemas: &str) -> String {
        format!(
            "FROM QSYS2.SYSTABLES WHERE {} AND TABLE_OWNER IN {} ORDER BY TABLE_OWNER, TABLE_NAME",
            TABLE_FILTER, schemas
        )
    }

    fn columns_clause(schemas: &str) -> String {
        format!(
            "FROM QSYS2.SYSCOLUMNS C WHERE C.TABLE_OWNER IN {} \
             AND EXISTS (SELECT 1 FROM QSYS2.SYSTABLES T WHERE T.TABLE_OWNER = C.TABLE_OWNER \
             AND T.TABLE_NAME = C.TABLE_NAME AND T.{}) \
             ORDER BY C.TABLE_OWNER, C.TABLE_NAME, C.ORDINAL_POSITION",
            schemas, TABLE_FILTER
        )
    }

    fn schemas_sql() -> String {
        "SELECT TABLE_OWNER FROM QSYS2.SYSTABLES GROUP BY TABLE_OWNER ORDER BY TABLE_OWNER"
            .to_string()
    }

    fn to_table(row: Qsys2TableRow, ctx: &MappingContext) -> (Metadata, String) {
        dialect::table_draft(
            row.table_owner.as_deref(),
            row.table_name,
            row.long_comment.as_deref(),
            ctx,
        )
    }

    fn to_column(row: Qsys2ColumnRow, ctx: &MappingContext) -> (Column, String) {
        let key = dialect::owner_key(row.table_owner.as_deref(), row.table_name.as_deref());
        let name = row.column_name.unwrap_or_default();
        let data_type = row.data_type.as_deref().map(str::trim).unwrap_or_default().to_string();

        let owner = format!("{}.{}", key, name);
        let key_type = match row.is_identity.as_deref().map(str::trim) {
            Some("YES") => KeyType::primary(0),
            _ => KeyType::default(),
        };

        let mut column = Column::new(name, data_type)
            .with_mode(dialect::nullability(row.is_nullable.as_deref()))
            .with_order(dialect::parse_order(row.ordinal_position.as_deref(), "ORDINAL_POSITION", &owner))
            .with_key_type(key_type);

        if let Some(remark) = row.column_text.as_deref() {
            ctx.remarks.apply(remark, &mut column.alias, &mut column.description);
        }
        if let Some(heading) = row.column_heading {
            column.alias = heading;
        }

        (column, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use db2meta_core::{Constraint, Mode, RemarkRouting};

    fn routing() -> MappingContext {
        MappingContext::new("en", RemarkRouting { alias: true, description: true })
    }

    #[test]
    fn table_mapping_uses_owner() {
        let row = Qsys2TableRow {
            table_owner: Some("QPGMR     ".into()),
            table_name: Some("ORDERS".into()),
            long_comment: Some("Open orders".into()),
        };
        let (meta, key) = Qsys2::to_table(row, &routing());

        assert_eq!(key, "QPGMR.ORDERS");
        assert_eq!(meta.alias, "Open orders");
        assert_eq!(meta.description, "Open orders");
    }

    #[test]
    fn identity_marks_primary() {
        let row = Qsys2ColumnRow {
            table_owner: Some("QPGMR".into()),
            table_name: Some("ORDERS".into()),
            column_name: Some("ID".into()),
            ordinal_position: Some("1".into()),
            data_type: Some("INTEGER ".into()),
            is_nullable: Some("N".into()),
            is_identity: Some("YES".into()),
            ..Default::default()
        };
        let (column, key) = Qsys2::to_column(row, &routing());

        assert_eq!(key, "QPGMR.ORDERS");
        assert_eq!(column.data_type, "INTEGER");
        assert_eq!(column.mode, Mode::Required);
        assert_eq!(column.order, 1);
        assert_eq!(column.key_type, KeyType::primary(0));
    }

    #[test]
    fn heading_overwrites_remark_alias() {
        let row = Qsys2ColumnRow {
            table_owner: Some("QPGMR".into()),
            table_name: Some("ORDERS".into()),
            column_name: Some("QTY".into()),
            is_identity: Some("NO".into()),
            column_text: Some("Quantity ordered".into()),
            column_heading: Some("Qty".into()),
            ..Default::default()
        };
        let (column, _) = Qsys2::to_column(row, &routing());

        assert_eq!(column.alias, "Qty");
        assert_eq!(column.description, "Quantity ordered");
        assert_eq!(column.key_type.constraint, Constraint::None);
        assert_eq!(column.mode, Mode::Nullable);
    }

    #[test]
    fn schema_listing_groups_owners() {
        assert_eq!(
            Qsys2::schemas_sql(),
            "SELECT TABLE_OWNER FROM QSYS2.SYSTABLES GROUP BY TABLE_OWNER ORDER BY TABLE_OWNER"
        );
    }
}
