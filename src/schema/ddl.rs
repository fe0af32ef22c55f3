//! SQL rendering for table provisioning and batch inserts.
//!
//! All identifiers are double-quoted and schema-qualified. Rendering is
//! kept free of any connection so the statement shapes can be checked
//! directly.

use crate::schema::types::{ColumnType, TableSpec};

/// PostgreSQL's limit on bind parameters in a single statement.
pub const MAX_BIND_PARAMS: usize = 65_535;

/// Quote an identifier, doubling any embedded double quote.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// `"schema"."table"`
pub fn qualified_name(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

/// Render the conditional drop statement.
pub fn drop_table_sql(schema: &str, spec: &TableSpec) -> String {
    format!(
        "DROP TABLE IF EXISTS {}",
        qualified_name(schema, spec.name())
    )
}

/// Render the conditional create statement.
///
/// Output format:
/// ```sql
/// CREATE TABLE IF NOT EXISTS "public"."orders" (
///   "orders_pk" uuid NOT NULL DEFAULT gen_random_uuid(),
///   "id" text NOT NULL,
///   "ordered" date NOT NULL,
///   CONSTRAINT "orders_pk_pkey" PRIMARY KEY ("orders_pk")
/// )
/// ```
pub fn create_table_sql(schema: &str, spec: &TableSpec) -> String {
    let primary_key = quote_ident(&spec.primary_key());

    let mut lines = Vec::with_capacity(spec.len() + 2);
    lines.push(format!(
        "  {} uuid NOT NULL DEFAULT gen_random_uuid()",
        primary_key
    ));
    lines.extend(spec.columns().iter().map(|column| {
        format!(
            "  {} {} NOT NULL",
            quote_ident(&column.name),
            column.column_type
        )
    }));
    lines.push(format!(
        "  CONSTRAINT {} PRIMARY KEY ({})",
        quote_ident(&spec.primary_key_constraint()),
        primary_key
    ));

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
        qualified_name(schema, spec.name()),
        lines.join(",\n")
    )
}

/// Largest number of rows that fit in one insert statement for `spec`.
pub fn max_rows_per_statement(spec: &TableSpec) -> usize {
    (MAX_BIND_PARAMS / spec.len().max(1)).max(1)
}

/// Render a multi-row parameterized insert for `row_count` rows.
///
/// Placeholders are numbered row-major. Values are always bound as text;
/// date columns cast the bound text to `date` server-side.
pub fn insert_sql(schema: &str, spec: &TableSpec, row_count: usize) -> String {
    let columns = spec
        .column_names()
        .map(quote_ident)
        .collect::<Vec<_>>()
        .join(", ");

    let mut sql = format!(
        "INSERT INTO {} ({}) VALUES ",
        qualified_name(schema, spec.name()),
        columns
    );

    let width = spec.len();
    let values = (0..row_count)
        .map(|row| {
            let placeholders = spec
                .columns()
                .iter()
                .enumerate()
                .map(|(i, column)| {
                    let placeholder = row * width + i + 1;
                    match column.column_type {
                        ColumnType::Text => format!("${}::text", placeholder),
                        ColumnType::Date => format!("${}::text::date", placeholder),
                    }
                })
                .collect::<Vec<_>>();
            format!("({})", placeholders.join(", "))
        })
        .collect::<Vec<_>>();

    sql.push_str(&values.join(", "));
    sql
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::DateFields;
    use pretty_assertions::assert_eq;

    fn spec(name: &str, headers: &[&str], dates: &[&str]) -> TableSpec {
        let dates: DateFields = dates.iter().copied().collect();
        TableSpec::from_headers(name, headers, &dates).unwrap()
    }

    #[test]
    fn test_quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("plain"), "\"plain\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_drop_table_sql() {
        let s = spec("orders", &["a"], &[]);
        assert_eq!(
            drop_table_sql("public", &s),
            "DROP TABLE IF EXISTS \"public\".\"orders\""
        );
    }

    #[test]
    fn test_create_table_sql_shape() {
        let s = spec("orders", &["id", "ordered"], &["ordered"]);
        let expected = "CREATE TABLE IF NOT EXISTS \"public\".\"orders\" (\n\
                        \x20 \"orders_pk\" uuid NOT NULL DEFAULT gen_random_uuid(),\n\
                        \x20 \"id\" text NOT NULL,\n\
                        \x20 \"ordered\" date NOT NULL,\n\
                        \x20 CONSTRAINT \"orders_pk_pkey\" PRIMARY KEY (\"orders_pk\")\n\
                        )";
        assert_eq!(create_table_sql("public", &s), expected);
    }

    #[test]
    fn test_create_table_sql_single_primary_key() {
        let s = spec("t", &["a", "b", "c"], &[]);
        let sql = create_table_sql("s", &s);
        assert_eq!(sql.matches("PRIMARY KEY").count(), 1);
        assert_eq!(sql.matches("NOT NULL").count(), 4);
    }

    #[test]
    fn test_insert_sql_numbers_row_major() {
        let s = spec("t", &["a", "d"], &["d"]);
        assert_eq!(
            insert_sql("s", &s, 2),
            "INSERT INTO \"s\".\"t\" (\"a\", \"d\") VALUES \
             ($1::text, $2::text::date), ($3::text, $4::text::date)"
        );
    }

    #[test]
    fn test_max_rows_per_statement() {
        let s = spec("t", &["a", "b", "c"], &[]);
        assert_eq!(max_rows_per_statement(&s), 21_845);
    }
}
