//! SQL executor
//!
//! Runs generated DDL against a database connection.

use crate::db::connection::DatabaseConnection;
use crate::error::Result;

/// SQL executor for running generated statements
pub struct SqlExecutor {
    connection: DatabaseConnection,
}

impl SqlExecutor {
    /// Create a new SQL executor
    pub fn new(connection: DatabaseConnection) -> Self {
        Self { connection }
    }

    /// Execute a single SQL statement
    pub async fn execute(&self, sql: &str) -> Result<()> {
        tracing::debug!(sql, "Executing statement");
        self.connection.execute(sql).await
    }

    /// Execute statements in order, stopping at the first failure
    pub async fn execute_batch(&self, statements: &[String]) -> Result<()> {
        for statement in statements {
            self.execute(statement).await?;
        }

        tracing::info!(statements = statements.len(), "Executed statement batch");
        Ok(())
    }
}
