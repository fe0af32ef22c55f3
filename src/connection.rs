//! Connection descriptor parsing.
//!
//! A descriptor is a single colon-delimited string of the form
//! `host:port:database:schema:username:password`. No escaping is supported,
//! so none of the fields may contain a `:`.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Number of `:`-separated fields in a connection string.
pub const FIELD_COUNT: usize = 6;

/// Parsed connection settings for the destination store.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    pub host: String,
    pub port: String,
    pub database: String,
    pub schema: String,
    pub username: String,
    pub password: String,
}

impl ConnectionDescriptor {
    /// Parse a `host:port:database:schema:username:password` string.
    ///
    /// Only the field count is checked; the port is not validated until
    /// [`ConnectionDescriptor::to_pg_config`].
    pub fn parse(input: &str) -> Result<Self> {
        let parts: Vec<&str> = input.split(':').collect();

        if parts.len() != FIELD_COUNT {
            return Err(Error::Config(format!(
                "invalid connection string: expected {} ':'-separated fields, found {}",
                FIELD_COUNT,
                parts.len()
            )));
        }

        Ok(Self {
            host: parts[0].to_string(),
            port: parts[1].to_string(),
            database: parts[2].to_string(),
            schema: parts[3].to_string(),
            username: parts[4].to_string(),
            password: parts[5].to_string(),
        })
    }

    /// Build a driver configuration from this descriptor.
    pub fn to_pg_config(&self) -> Result<postgres::Config> {
        let port: u16 = self.port.parse().map_err(|_| {
            Error::Config(format!("invalid port '{}' in connection string", self.port))
        })?;

        let mut config = postgres::Config::new();
        config
            .host(&self.host)
            .port(port)
            .dbname(&self.database)
            .user(&self.username)
            .password(&self.password);
        Ok(config)
    }
}

impl FromStr for ConnectionDescriptor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// The password never reaches logs or panic messages.
impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}:{}/{} (schema {})",
            self.username, self.host, self.port, self.database, self.schema
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_six_fields() {
        let desc = ConnectionDescriptor::parse("db.local:5433:sales:public:loader:s3cret").unwrap();
        assert_eq!(desc.host, "db.local");
        assert_eq!(desc.port, "5433");
        assert_eq!(desc.database, "sales");
        assert_eq!(desc.schema, "public");
        assert_eq!(desc.username, "loader");
        assert_eq!(desc.password, "s3cret");
    }

    #[test]
    fn test_parse_five_fields_fails() {
        let result = ConnectionDescriptor::parse("host:5432:db:schema:user");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_parse_seven_fields_fails() {
        let result = ConnectionDescriptor::parse("host:5432:db:schema:user:pass:extra");
        let err = result.unwrap_err();
        assert!(format!("{}", err).contains("found 7"));
    }

    #[test]
    fn test_parse_empty_string_fails() {
        assert!(ConnectionDescriptor::parse("").is_err());
    }

    #[test]
    fn test_parse_allows_empty_fields() {
        let desc = ConnectionDescriptor::parse(":::::").unwrap();
        assert_eq!(desc.host, "");
        assert_eq!(desc.password, "");
    }

    #[test]
    fn test_parse_does_not_validate_port() {
        let desc: ConnectionDescriptor = "h:not-a-port:d:s:u:p".parse().unwrap();
        assert_eq!(desc.port, "not-a-port");
        assert!(matches!(desc.to_pg_config(), Err(Error::Config(_))));
    }

    #[test]
    fn test_pg_config_uses_parsed_port() {
        let desc = ConnectionDescriptor::parse("h:6543:d:s:u:p").unwrap();
        let config = desc.to_pg_config().unwrap();
        assert_eq!(config.get_ports(), &[6543]);
        assert_eq!(config.get_dbname(), Some("d"));
        assert_eq!(config.get_user(), Some("u"));
    }

    #[test]
    fn test_debug_and_display_hide_password() {
        let desc = ConnectionDescriptor::parse("h:5432:d:s:u:topsecret").unwrap();
        assert!(!format!("{:?}", desc).contains("topsecret"));
        assert!(!format!("{}", desc).contains("topsecret"));
        assert_eq!(format!("{}", desc), "u@h:5432/d (schema s)");
    }
}
