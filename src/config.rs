//! Load configuration.
//!
//! Settings come from an optional JSON properties file, e.g.
//!
//! ```json
//! {"batch_size": 1000, "date_fields": ["created", "updated"]}
//! ```
//!
//! and are then overridden or extended by command-line values. The batch
//! size has no default and must be set by one of the two.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::schema::DateFields;

/// Contents of a properties file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Properties {
    pub batch_size: Option<usize>,
    #[serde(default)]
    pub date_fields: DateFields,
}

impl Properties {
    /// Read a properties file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            Error::Config(format!(
                "cannot open properties file '{}': {}",
                path.display(),
                e
            ))
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            Error::Config(format!(
                "invalid properties file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

/// Settings for the batching driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadConfig {
    /// Rows per committed batch, always > 0.
    pub batch_size: usize,
    /// Rows consumed per file; 0 means unbounded.
    pub limit: u64,
    /// Drop each table before creating it.
    pub drop_first: bool,
    /// Columns typed as `date`.
    pub date_fields: DateFields,
}

impl LoadConfig {
    pub fn new(batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::Config("batch size must be greater than 0".to_string()));
        }
        Ok(Self {
            batch_size,
            limit: 0,
            drop_first: false,
            date_fields: DateFields::new(),
        })
    }

    /// Merge a properties file with command-line values.
    ///
    /// `batch_size` overrides the file's value; `extra_date_fields` are added
    /// to the file's set.
    pub fn from_properties(
        properties: Properties,
        batch_size: Option<usize>,
        extra_date_fields: &[String],
    ) -> Result<Self> {
        let batch_size = batch_size.or(properties.batch_size).ok_or_else(|| {
            Error::Config(
                "batch size is not configured; set it in the properties file or with --batch-size"
                    .to_string(),
            )
        })?;

        let mut date_fields = properties.date_fields;
        date_fields.extend(extra_date_fields.iter().cloned());

        Ok(Self::new(batch_size)?.with_date_fields(date_fields))
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_drop_first(mut self, drop_first: bool) -> Self {
        self.drop_first = drop_first;
        self
    }

    pub fn with_date_fields(mut self, date_fields: DateFields) -> Self {
        self.date_fields = date_fields;
        self
    }

    /// True once `consumed` rows have reached a positive limit.
    pub fn limit_reached(&self, consumed: u64) -> bool {
        self.limit != 0 && consumed >= self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn properties_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        assert!(matches!(LoadConfig::new(0), Err(Error::Config(_))));
    }

    #[test]
    fn test_limit_reached() {
        let config = LoadConfig::new(10).unwrap();
        assert!(!config.limit_reached(1_000_000));

        let config = config.with_limit(3);
        assert!(!config.limit_reached(2));
        assert!(config.limit_reached(3));
        assert!(config.limit_reached(4));
    }

    #[test]
    fn test_properties_from_file() {
        let file = properties_file(r#"{"batch_size": 500, "date_fields": ["created"]}"#);
        let props = Properties::from_file(file.path()).unwrap();
        assert_eq!(props.batch_size, Some(500));
        assert!(props.date_fields.contains("created"));
    }

    #[test]
    fn test_properties_keys_are_optional() {
        let file = properties_file("{}");
        assert_eq!(
            Properties::from_file(file.path()).unwrap(),
            Properties::default()
        );
    }

    #[test]
    fn test_properties_unknown_key_rejected() {
        let file = properties_file(r#"{"batchsize": 10}"#);
        let err = Properties::from_file(file.path()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_properties_missing_file() {
        assert!(Properties::from_file(Path::new("/no/such/props.json")).is_err());
    }

    #[test]
    fn test_cli_batch_size_overrides_properties() {
        let props = Properties {
            batch_size: Some(100),
            date_fields: DateFields::new(),
        };
        let config = LoadConfig::from_properties(props, Some(7), &[]).unwrap();
        assert_eq!(config.batch_size, 7);
    }

    #[test]
    fn test_date_fields_are_merged() {
        let props = Properties {
            batch_size: Some(100),
            date_fields: ["a"].into_iter().collect(),
        };
        let config = LoadConfig::from_properties(props, None, &["b".to_string()]).unwrap();
        assert!(config.date_fields.contains("a"));
        assert!(config.date_fields.contains("b"));
    }

    #[test]
    fn test_missing_batch_size_is_config_error() {
        let err = LoadConfig::from_properties(Properties::default(), None, &[]).unwrap_err();
        assert!(format!("{}", err).contains("batch size is not configured"));
    }
}
