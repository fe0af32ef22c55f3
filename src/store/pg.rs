//! PostgreSQL store.

use log::{debug, info};
use postgres::types::ToSql;
use postgres::{Client, NoTls};

use super::{validate_rows, Store};
use crate::connection::ConnectionDescriptor;
use crate::error::{Error, Result};
use crate::input::Row;
use crate::schema::ddl::{
    create_table_sql, drop_table_sql, insert_sql, max_rows_per_statement, qualified_name,
};
use crate::schema::TableSpec;

/// Store backed by a single PostgreSQL connection, used serially.
///
/// The connection closes when the store is dropped.
pub struct PgStore {
    client: Client,
    schema: String,
}

impl PgStore {
    /// Connect using a parsed descriptor.
    pub fn connect(descriptor: &ConnectionDescriptor) -> Result<Self> {
        let config = descriptor.to_pg_config()?;
        let client = config
            .connect(NoTls)
            .map_err(|e| Error::Connection(format!("{}: {}", descriptor, e)))?;

        info!("Connection successful");
        Ok(Self::new(client, &descriptor.schema))
    }

    /// Wrap an existing client; tables are created in `schema`.
    pub fn new(client: Client, schema: &str) -> Self {
        Self {
            client,
            schema: schema.to_string(),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Run one DDL statement in its own committed transaction.
    fn execute_ddl(&mut self, table: &str, sql: &str) -> Result<()> {
        let schema_error = |e: postgres::Error| Error::Schema {
            table: table.to_string(),
            message: e.to_string(),
        };

        let mut tx = self.client.transaction().map_err(schema_error)?;
        tx.batch_execute(sql).map_err(schema_error)?;
        tx.commit().map_err(schema_error)
    }
}

impl Store for PgStore {
    fn provision(&mut self, spec: &TableSpec, drop_first: bool) -> Result<String> {
        let table = spec.name();
        let target = qualified_name(&self.schema, table);

        info!("Tablename: {}", table);
        info!("Primary Key: {}", spec.primary_key());

        if drop_first {
            let sql = drop_table_sql(&self.schema, spec);
            self.execute_ddl(table, &sql)?;
            info!("Drop table: {} - successful", target);
        }

        let sql = create_table_sql(&self.schema, spec);
        debug!("{}", sql);
        self.execute_ddl(table, &sql)?;
        info!("Create table: {} - successful", target);

        Ok(table.to_string())
    }

    fn insert(&mut self, spec: &TableSpec, rows: &[Row]) -> Result<()> {
        validate_rows(spec, rows)?;
        if rows.is_empty() {
            return Ok(());
        }

        let insert_error = |e: postgres::Error| Error::Insert {
            table: spec.name().to_string(),
            message: e.to_string(),
        };

        // Oversized batches span several statements in one transaction.
        let mut tx = self.client.transaction().map_err(insert_error)?;
        for chunk in rows.chunks(max_rows_per_statement(spec)) {
            let sql = insert_sql(&self.schema, spec, chunk.len());
            let params: Vec<&(dyn ToSql + Sync)> = chunk
                .iter()
                .flatten()
                .map(|value| value as &(dyn ToSql + Sync))
                .collect();
            tx.execute(sql.as_str(), &params).map_err(insert_error)?;
        }
        tx.commit().map_err(insert_error)
    }
}
