//! PostgreSQL/PostGIS DDL for generated models
//!
//! Each table renders as one `CREATE TABLE` statement followed by one
//! `CREATE INDEX` statement per index. Tables are ordered so that every
//! foreign key target inside the batch is created first.

use std::collections::HashSet;

use crate::models::{AnnotationModel, ColumnType, ModelSet, Table};
use crate::utils::naming::quote_identifier;

/// Statement enabling PostGIS, emitted before any table with a geometry column
pub const POSTGIS_EXTENSION_SQL: &str = "CREATE EXTENSION IF NOT EXISTS postgis";

/// Type of a generated integer primary key
pub const SERIAL_KEY_SQL_TYPE: &str = "BIGSERIAL";

/// Type of a column referencing a generated primary key.
///
/// PostgreSQL only accepts a foreign key between comparable types, so
/// `root_id` and `target_id` columns render as the key type regardless of
/// their schema type.
pub const KEY_REFERENCE_SQL_TYPE: &str = "BIGINT";

/// DDL generator for generated models
#[derive(Debug, Clone)]
pub struct DdlGenerator {
    if_not_exists: bool,
}

impl Default for DdlGenerator {
    fn default() -> Self {
        Self { if_not_exists: true }
    }
}

impl DdlGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit plain `CREATE TABLE` / `CREATE INDEX` without `IF NOT EXISTS`
    pub fn strict(mut self) -> Self {
        self.if_not_exists = false;
        self
    }

    /// Statements creating every model of a model set
    pub fn create_model_set_sql(&self, model_set: &ModelSet) -> Vec<String> {
        self.create_all_sql(model_set.values().flat_map(|models| models.values().map(|m| m.as_ref())))
    }

    /// Statements creating the given models in dependency order
    pub fn create_all_sql<'m, I>(&self, models: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'m AnnotationModel>,
    {
        let ordered = dependency_order(models.into_iter().collect());
        let mut statements = Vec::new();

        if ordered.iter().any(|m| !m.spatial_columns().is_empty()) {
            statements.push(POSTGIS_EXTENSION_SQL.to_string());
        }

        for model in ordered {
            statements.extend(self.create_table_sql(&model.table));
        }

        statements
    }

    /// `CREATE TABLE` plus index statements for one table
    pub fn create_table_sql(&self, table: &Table) -> Vec<String> {
        let if_not_exists = if self.if_not_exists { "IF NOT EXISTS " } else { "" };
        let table_name = quote_identifier(&table.name);
        let pk_columns: Vec<&str> = table
            .primary_key
            .as_ref()
            .map(|pk| pk.columns.iter().map(String::as_str).collect())
            .unwrap_or_default();

        let mut column_defs = Vec::new();
        for column in &table.columns {
            let serial = pk_columns.len() == 1
                && pk_columns[0] == column.name
                && column.column_type == ColumnType::Integer;
            let data_type = if serial {
                SERIAL_KEY_SQL_TYPE.to_string()
            } else if table.foreign_key_on(&column.name).is_some() {
                KEY_REFERENCE_SQL_TYPE.to_string()
            } else {
                column.column_type.sql_type()
            };
            let nullable = if column.nullable { "" } else { " NOT NULL" };

            column_defs.push(format!(
                "  {} {}{}",
                quote_identifier(&column.name),
                data_type,
                nullable
            ));
        }

        if let Some(pk) = &table.primary_key {
            let columns: Vec<String> = pk.columns.iter().map(|c| quote_identifier(c)).collect();
            let constraint = pk
                .name
                .as_ref()
                .map(|name| format!("CONSTRAINT {} ", quote_identifier(name)))
                .unwrap_or_default();
            column_defs.push(format!("  {}PRIMARY KEY ({})", constraint, columns.join(", ")));
        }

        for fk in &table.foreign_keys {
            let columns: Vec<String> = fk.columns.iter().map(|c| quote_identifier(c)).collect();
            let ref_columns: Vec<String> =
                fk.ref_columns.iter().map(|c| quote_identifier(c)).collect();

            column_defs.push(format!(
                "  CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
                quote_identifier(&fk.name),
                columns.join(", "),
                quote_identifier(&fk.ref_table),
                ref_columns.join(", ")
            ));
        }

        let mut statements = vec![format!(
            "CREATE TABLE {}{} (\n{}\n)",
            if_not_exists,
            table_name,
            column_defs.join(",\n")
        )];

        for index in &table.indexes {
            let unique = if index.is_unique { "UNIQUE " } else { "" };
            let columns: Vec<String> = index.columns.iter().map(|c| quote_identifier(c)).collect();

            statements.push(format!(
                "CREATE {}INDEX {}{} ON {} ({})",
                unique,
                if_not_exists,
                quote_identifier(&index.name),
                table_name,
                columns.join(", ")
            ));
        }

        statements
    }
}

/// Order models so referenced tables come before the tables pointing at them.
///
/// Duplicate tables are dropped; a reference cycle falls back to name order.
pub fn dependency_order(mut models: Vec<&AnnotationModel>) -> Vec<&AnnotationModel> {
    models.sort_by(|a, b| a.table_name().cmp(b.table_name()));
    models.dedup_by(|a, b| a.table_name() == b.table_name());

    let in_batch: HashSet<&str> = models.iter().map(|m| m.table_name()).collect();
    let mut created: HashSet<&str> = HashSet::new();
    let mut ordered = Vec::with_capacity(models.len());
    let mut pending = models;

    while !pending.is_empty() {
        let (ready, blocked): (Vec<&AnnotationModel>, Vec<&AnnotationModel>) =
            pending.into_iter().partition(|model| {
                model.referenced_tables().iter().all(|table| {
                    *table == model.table_name() || !in_batch.contains(table) || created.contains(table)
                })
            });

        if ready.is_empty() {
            tracing::warn!(tables = blocked.len(), "Foreign key cycle between generated tables");
            ordered.extend(blocked);
            break;
        }

        created.extend(ready.iter().map(|m| m.table_name()));
        ordered.extend(ready);
        pending = blocked;
    }

    ordered
}
