//! In-memory store.
//!
//! Mirrors the PostgreSQL store's table semantics (conditional drop,
//! create-if-not-exists, all-or-nothing inserts) without a server. Used by
//! `--dry-run` and by tests, which inspect the recorded operations.

use indexmap::IndexMap;
use log::{debug, info};

use super::{validate_rows, Store};
use crate::error::{Error, Result};
use crate::input::Row;
use crate::schema::ddl::create_table_sql;
use crate::schema::TableSpec;

/// Operation applied to a [`MemoryStore`], in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    Drop { table: String },
    Create { table: String, created: bool },
    Insert { table: String, rows: Vec<Row> },
}

#[derive(Debug, Clone, Default)]
pub struct MemoryTable {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    schema: String,
    tables: IndexMap<String, MemoryTable>,
    ops: Vec<StoreOp>,
    failing_table: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_schema("public")
    }

    pub fn with_schema(schema: &str) -> Self {
        Self {
            schema: schema.to_string(),
            ..Default::default()
        }
    }

    /// Make every insert into `table` fail.
    pub fn fail_inserts_into(mut self, table: &str) -> Self {
        self.failing_table = Some(table.to_string());
        self
    }

    pub fn table(&self, name: &str) -> Option<&MemoryTable> {
        self.tables.get(name)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn ops(&self) -> &[StoreOp] {
        &self.ops
    }

    /// Row batches passed to successful inserts into `table`, in order.
    pub fn inserts_into(&self, table: &str) -> Vec<&[Row]> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                StoreOp::Insert { table: t, rows } if t == table => Some(rows.as_slice()),
                _ => None,
            })
            .collect()
    }
}

impl Store for MemoryStore {
    fn provision(&mut self, spec: &TableSpec, drop_first: bool) -> Result<String> {
        let table = spec.name().to_string();

        if drop_first {
            self.tables.shift_remove(&table);
            self.ops.push(StoreOp::Drop {
                table: table.clone(),
            });
        }

        debug!("{}", create_table_sql(&self.schema, spec));
        let created = !self.tables.contains_key(&table);
        if created {
            self.tables.insert(
                table.clone(),
                MemoryTable {
                    columns: spec.column_names().map(str::to_string).collect(),
                    rows: Vec::new(),
                },
            );
        }
        self.ops.push(StoreOp::Create {
            table: table.clone(),
            created,
        });
        info!("Create table: \"{}\".\"{}\" - successful", self.schema, table);

        Ok(table)
    }

    fn insert(&mut self, spec: &TableSpec, rows: &[Row]) -> Result<()> {
        validate_rows(spec, rows)?;
        if rows.is_empty() {
            return Ok(());
        }

        let insert_error = |message: &str| Error::Insert {
            table: spec.name().to_string(),
            message: message.to_string(),
        };

        if self.failing_table.as_deref() == Some(spec.name()) {
            return Err(insert_error("injected failure"));
        }

        let target = self
            .tables
            .get_mut(spec.name())
            .ok_or_else(|| insert_error("relation does not exist"))?;
        if target.columns.len() != spec.len() {
            return Err(insert_error("column list does not match table"));
        }

        target.rows.extend_from_slice(rows);
        self.ops.push(StoreOp::Insert {
            table: spec.name().to_string(),
            rows: rows.to_vec(),
        });
        Ok(())
    }
}
