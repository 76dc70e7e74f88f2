//! Test fixtures for catalog extraction integration tests
//!
//! Each fixture is a [`MockCatalog`] shaped like the system catalog of one
//! DB2 platform: column discovery answers, table rows and column rows. Rows
//! carry native values (small integers, padded CHAR columns) the way the
//! driver returns them.

#![allow(dead_code)]

use db2meta_catalog::{CatalogValue, MockCatalog};

const NULL: CatalogValue = CatalogValue::Null;

fn text(s: &str) -> CatalogValue {
    CatalogValue::from(s)
}

fn small(n: i16) -> CatalogValue {
    CatalogValue::I16(n)
}

// =============================================================================
// SYSCAT (Db2 for Linux, UNIX and Windows)
// =============================================================================

pub const SYSCAT_TABLE_COLUMNS: &[&str] = &["TABSCHEMA", "TABNAME", "OWNER", "TYPE", "REMARKS"];

pub const SYSCAT_COLUMN_COLUMNS: &[&str] = &[
    "TABSCHEMA", "TABNAME", "COLNAME", "COLNO", "TYPESCHEMA", "TYPENAME", "LENGTH", "NULLS",
    "KEYSEQ", "REMARKS",
];

/// SYSCAT catalog whose column view exposes `column_columns`
///
/// Registered rows always carry every column; leaving one out of the
/// discovery answer simulates an older release.
pub fn syscat_catalog_with(column_columns: &[&str]) -> MockCatalog {
    MockCatalog::new()
        .with_view_columns("TABNAME='TABLES'", "COLNAME", SYSCAT_TABLE_COLUMNS)
        .with_view_columns("TABNAME='COLUMNS'", "COLNAME", column_columns)
        .with_rows(
            "FROM SYSCAT.TABLES WHERE",
            SYSCAT_TABLE_COLUMNS,
            vec![
                vec![text("DB2INST1"), text("DEPT"), text("DB2INST1"), text("T"), text("Departments")],
                vec![text("DB2INST1"), text("EMP"), text("DB2INST1"), text("T"), text("Employees, all")],
                vec![text("DB2INST1"), text("EMPTY_T"), text("DB2INST1"), text("T"), NULL],
            ],
        )
        .with_rows(
            "FROM SYSCAT.COLUMNS C WHERE",
            SYSCAT_COLUMN_COLUMNS,
            vec![
                vec![
                    text("DB2INST1"), text("DEPT"), text("DEPTNO"), small(0), text("SYSIBM  "),
                    text("CHARACTER"), CatalogValue::I32(3), text("N"), small(1),
                    text("Department number"),
                ],
                vec![
                    text("DB2INST1"), text("DEPT"), text("DEPTNAME"), small(1), text("SYSIBM  "),
                    text("VARCHAR"), CatalogValue::I32(36), text("N"), NULL, NULL,
                ],
                vec![
                    text("DB2INST1"), text("EMP"), text("EMPNO"), small(0), text("SYSIBM  "),
                    text("CHARACTER"), CatalogValue::I32(6), text("N"), small(1), NULL,
                ],
                vec![
                    text("DB2INST1"), text("EMP"), text("WORKDEPT"), small(1), text("SYSIBM  "),
                    text("CHARACTER"), CatalogValue::I32(3), text("Y"), NULL,
                    text("Dept, see DEPT"),
                ],
                vec![
                    text("DB2INST1"), text("EMP"), text("SALARY"), small(2), text("SYSIBM  "),
                    text("DECIMAL"), CatalogValue::I32(9), text("Y"), NULL, NULL,
                ],
            ],
        )
        .with_rows(
            "GROUP BY TABSCHEMA",
            &["TABSCHEMA"],
            vec![
                vec![text("DB2INST1")],
                vec![text("NULLID  ")],
                vec![text("SYSCAT  ")],
                vec![text("SYSIBM  ")],
            ],
        )
}

/// SYSCAT catalog of a current release
pub fn syscat_catalog() -> MockCatalog {
    syscat_catalog_with(SYSCAT_COLUMN_COLUMNS)
}

/// Records for [`syscat_catalog`], remarks routed to descriptions
pub const SYSCAT_RECORDS: &str = "\
20,,DB2INST1.DEPT,,Departments,ja,Table
30,,DEPTNO,,Department number,SYSIBM.CHARACTER,Required,Primary
30,,DEPTNAME,,,SYSIBM.VARCHAR,Required,

20,,DB2INST1.EMP,,\"Employees, all\",ja,Table
30,,EMPNO,,,SYSIBM.CHARACTER,Required,Primary
30,,WORKDEPT,,\"Dept, see DEPT\",SYSIBM.CHARACTER,Nullable,
30,,SALARY,,,SYSIBM.DECIMAL,Nullable,

20,,DB2INST1.EMPTY_T,,,ja,Table

";

// =============================================================================
// QSYS2 (Db2 for i)
// =============================================================================

pub const QSYS2_TABLE_COLUMNS: &[&str] = &["TABLE_NAME", "TABLE_OWNER", "TABLE_TYPE", "LONG_COMMENT"];

pub const QSYS2_COLUMN_COLUMNS: &[&str] = &[
    "COLUMN_NAME", "TABLE_NAME", "TABLE_OWNER", "ORDINAL_POSITION", "DATA_TYPE", "IS_NULLABLE",
    "IS_IDENTITY", "COLUMN_TEXT", "COLUMN_HEADING",
];

pub fn qsys2_catalog() -> MockCatalog {
    MockCatalog::new()
        .with_view_columns("TABLE_NAME='SYSTABLES'", "COLUMN_NAME", QSYS2_TABLE_COLUMNS)
        .with_view_columns("TABLE_NAME='SYSCOLUMNS'", "COLUMN_NAME", QSYS2_COLUMN_COLUMNS)
        .with_rows(
            "FROM QSYS2.SYSTABLES WHERE",
            QSYS2_TABLE_COLUMNS,
            vec![vec![text("ORDERS"), text("QPGMR     "), text("T"), text("Open orders")]],
        )
        .with_rows(
            "FROM QSYS2.SYSCOLUMNS C WHERE",
            QSYS2_COLUMN_COLUMNS,
            vec![
                vec![
                    text("ID"), text("ORDERS"), text("QPGMR     "), CatalogValue::I32(1),
                    text("INTEGER"), text("N"), text("YES"), text("Order id"), text("ORDER ID"),
                ],
                vec![
                    text("QTY"), text("ORDERS"), text("QPGMR     "), CatalogValue::I32(2),
                    text("DECIMAL"), text("Y"), text("NO"), text("Quantity"), NULL,
                ],
            ],
        )
        .with_rows(
            "GROUP BY TABLE_OWNER",
            &["TABLE_OWNER"],
            vec![vec![text("QPGMR     ")], vec![text("QSYS      ")]],
        )
}

/// Records for [`qsys2_catalog`], remarks routed to alias and description
pub const QSYS2_RECORDS: &str = "\
20,,QPGMR.ORDERS,Open orders,Open orders,en,Table
30,,ID,ORDER ID,Order id,INTEGER,Required,Primary
30,,QTY,Quantity,Quantity,DECIMAL,Nullable,

";

// =============================================================================
// SYSIBM (Db2 for z/OS)
// =============================================================================

pub const SYSIBM_TABLE_COLUMNS: &[&str] = &["NAME", "CREATOR", "TYPE", "REMARKS"];

pub const SYSIBM_COLUMN_COLUMNS: &[&str] = &[
    "NAME", "TBNAME", "TBCREATOR", "COLNO", "COLTYPE", "NULLS", "KEYSEQ", "REMARKS", "LABEL",
];

pub fn sysibm_catalog() -> MockCatalog {
    MockCatalog::new()
        .with_view_columns("TBNAME='SYSTABLES'", "NAME", SYSIBM_TABLE_COLUMNS)
        .with_view_columns("TBNAME='SYSCOLUMNS'", "NAME", SYSIBM_COLUMN_COLUMNS)
        .with_rows(
            "FROM SYSIBM.SYSTABLES WHERE",
            SYSIBM_TABLE_COLUMNS,
            vec![vec![text("EMP"), text("PAYROLL "), text("T"), text("Employees")]],
        )
        .with_rows(
            "FROM SYSIBM.SYSCOLUMNS C WHERE",
            SYSIBM_COLUMN_COLUMNS,
            vec![
                vec![
                    text("EMPNO"), text("EMP"), text("PAYROLL "), small(1), text("CHAR    "),
                    text("N"), small(1), NULL, text("Emp No"),
                ],
                vec![
                    text("SALARY"), text("EMP"), text("PAYROLL "), small(2), text("DECIMAL "),
                    text("Y"), small(0), text("Annual salary"), NULL,
                ],
            ],
        )
        .with_rows(
            "GROUP BY CREATOR",
            &["CREATOR"],
            vec![vec![text("PAYROLL ")], vec![text("SYSIBM  ")]],
        )
}

/// Records for [`sysibm_catalog`], remarks routed to alias
pub const SYSIBM_RECORDS: &str = "\
20,,PAYROLL.EMP,Employees,,ja,Table
30,,EMPNO,Emp No,,CHAR,Required,Primary
30,,SALARY,Annual salary,,DECIMAL,Nullable,

";
