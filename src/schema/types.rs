//! Core types for destination table representation.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Column types the loader can create.
///
/// Every CSV value is read as text; only columns named in the
/// [`DateFields`] set are declared as `date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Date,
    Text,
}

impl ColumnType {
    /// Returns the PostgreSQL type name used in DDL.
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Date => "date",
            ColumnType::Text => "text",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Set of column names that are typed as `date`.
///
/// Matching is exact and case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateFields(IndexSet<String>);

impl DateFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.0.insert(name.into())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Type a column by name.
    pub fn column_type(&self, name: &str) -> ColumnType {
        if self.contains(name) {
            ColumnType::Date
        } else {
            ColumnType::Text
        }
    }
}

impl<S: Into<String>> FromIterator<S> for DateFields {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> Extend<S> for DateFields {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

/// A single non-key column of a destination table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub column_type: ColumnType,
}

/// Destination table derived from a CSV header row.
///
/// Columns keep header order, which is also the positional order of every
/// row inserted into the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    name: String,
    columns: Vec<ColumnDef>,
}

impl TableSpec {
    /// Build a table spec from a header row.
    ///
    /// Fails if the table name or any column name is empty, if a column
    /// name repeats, or if a column collides with the generated primary key.
    pub fn from_headers<S: AsRef<str>>(
        name: &str,
        headers: &[S],
        date_fields: &DateFields,
    ) -> Result<Self> {
        let schema_error = |message: String| Error::Schema {
            table: name.to_string(),
            message,
        };

        if name.is_empty() {
            return Err(schema_error("table name is empty".to_string()));
        }
        if headers.is_empty() {
            return Err(schema_error("header row has no columns".to_string()));
        }

        let primary_key = format!("{}_pk", name);
        let mut seen = IndexSet::with_capacity(headers.len());
        let mut columns = Vec::with_capacity(headers.len());

        for (i, header) in headers.iter().enumerate() {
            let header = header.as_ref();
            if header.is_empty() {
                return Err(schema_error(format!("column {} has an empty name", i + 1)));
            }
            if !seen.insert(header) {
                return Err(schema_error(format!("duplicate column '{}'", header)));
            }
            if header == primary_key {
                return Err(schema_error(format!(
                    "column '{}' clashes with the generated primary key",
                    header
                )));
            }
            columns.push(ColumnDef {
                name: header.to_string(),
                column_type: date_fields.column_type(header),
            });
        }

        Ok(Self {
            name: name.to_string(),
            columns,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Name of the generated primary key column, `<table>_pk`.
    pub fn primary_key(&self) -> String {
        format!("{}_pk", self.name)
    }

    /// Name of the primary key constraint, `<table>_pk_pkey`.
    pub fn primary_key_constraint(&self) -> String {
        format!("{}_pkey", self.primary_key())
    }
}
