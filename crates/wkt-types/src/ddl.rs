//! PostgreSQL DDL generation for well-known type columns.
//!
//! Each [`WktKind`] maps to the column type its writer targets by default
//! (see [`WktKind::column_type`]), spelled the way it appears in DDL.

use crate::kind::WktKind;

/// Trait for generating DDL type strings.
pub trait ToDdl {
    /// Convert a kind to a DDL type string.
    fn to_ddl(&self, kind: &WktKind) -> String;

    /// Generate a complete CREATE TABLE statement.
    fn to_create_table(&self, table_name: &str, columns: &[(String, WktKind, bool)]) -> String;
}

/// PostgreSQL DDL generator.
pub struct PostgreSQLDdl;

impl ToDdl for PostgreSQLDdl {
    fn to_ddl(&self, kind: &WktKind) -> String {
        match kind {
            WktKind::Timestamp => "TIMESTAMPTZ".to_string(),
            WktKind::Double => "DOUBLE PRECISION".to_string(),
            WktKind::Float => "REAL".to_string(),
            WktKind::Int64 => "BIGINT".to_string(),
            // Wide enough for u64::MAX, 20 digits
            WktKind::UInt64 => "NUMERIC(20, 0)".to_string(),
            WktKind::Int32 => "INTEGER".to_string(),
            WktKind::UInt32 => "BIGINT".to_string(),
            WktKind::Bool => "BOOLEAN".to_string(),
            WktKind::String => "TEXT".to_string(),
            WktKind::Bytes => "BYTEA".to_string(),
        }
    }

    fn to_create_table(&self, table_name: &str, columns: &[(String, WktKind, bool)]) -> String {
        let column_defs: Vec<String> = columns
            .iter()
            .map(|(name, kind, nullable)| {
                let null_clause = if *nullable { "NULL" } else { "NOT NULL" };
                format!("  \"{}\" {} {}", name, self.to_ddl(kind), null_clause)
            })
            .collect();

        format!(
            "CREATE TABLE \"{}\" (\n{}\n);",
            table_name,
            column_defs.join(",\n")
        )
    }
}

impl PostgreSQLDdl {
    /// Generate a CREATE TEMP TABLE statement; the table is dropped with the session.
    pub fn to_create_temp_table(
        &self,
        table_name: &str,
        columns: &[(String, WktKind, bool)],
    ) -> String {
        self.to_create_table(table_name, columns)
            .replacen("CREATE TABLE", "CREATE TEMP TABLE", 1)
    }

    /// Generate an INSERT statement template.
    pub fn to_insert(&self, table_name: &str, columns: &[String]) -> String {
        let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("${i}")).collect();
        format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            table_name,
            columns
                .iter()
                .map(|c| format!("\"{c}\""))
                .collect::<Vec<_>>()
                .join(", "),
            placeholders.join(", ")
        )
    }

    /// Generate a SELECT statement listing `columns` in order.
    pub fn to_select(&self, table_name: &str, columns: &[String]) -> String {
        format!(
            "SELECT {} FROM \"{}\"",
            columns
                .iter()
                .map(|c| format!("\"{c}\""))
                .collect::<Vec<_>>()
                .join(", "),
            table_name
        )
    }
}
