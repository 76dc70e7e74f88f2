//! Connection descriptors

use std::fmt;

/// Produces the driver-specific connection string for a data source
pub trait DataSourceName: Send + Sync {
    /// Full connection string, credentials included
    fn connection_string(&self) -> String;

    /// Connection string safe for logs
    fn redacted(&self) -> String;
}

/// DB2 connection through the IBM ODBC/CLI driver
#[derive(Clone, PartialEq, Eq)]
pub struct Db2Dsn {
    pub hostname: String,
    pub database: String,
    pub port: u16,
    pub user_id: String,
    pub password: String,
    pub odbc_driver: String,
}

impl DataSourceName for Db2Dsn {
    fn connection_string(&self) -> String {
        format!(
            "DRIVER={{{}}};HOSTNAME={};DATABASE={};PORT={};PROTOCOL=TCPIP;UID={};PWD={};",
            self.odbc_driver, self.hostname, self.database, self.port, self.user_id, self.password
        )
    }

    fn redacted(&self) -> String {
        format!(
            "DRIVER={{{}}};HOSTNAME={};DATABASE={};PORT={};PROTOCOL=TCPIP;UID={};PWD=***;",
            self.odbc_driver, self.hostname, self.database, self.port, self.user_id
        )
    }
}

// Keep the password out of debug output
impl fmt::Debug for Db2Dsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db2Dsn")
            .field("hostname", &self.hostname)
            .field("database", &self.database)
            .field("port", &self.port)
            .field("user_id", &self.user_id)
            .field("odbc_driver", &self.odbc_driver)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dsn() -> Db2Dsn {
        Db2Dsn {
            hostname: "db.example.com".to_string(),
            database: "SAMPLE".to_string(),
            port: 50000,
            user_id: "db2inst1".to_string(),
            password: "secret".to_string(),
            odbc_driver: "IBM DB2 ODBC DRIVER".to_string(),
        }
    }

    #[test]
    fn connection_string() {
        assert_eq!(
            dsn().connection_string(),
            "DRIVER={IBM DB2 ODBC DRIVER};HOSTNAME=db.example.com;DATABASE=SAMPLE;PORT=50000;PROTOCOL=TCPIP;UID=db2inst1;PWD=secret;"
        );
    }

    #[test]
    fn password_is_hidden() {
        assert!(!dsn().redacted().contains("secret"));
        assert!(!format!("{:?}", dsn()).contains("secret"));
    }
}
