use anyhow::{Context, Result};

use super::connection::DbConn;

/// Creates the rating table and its index when missing. Safe to run repeatedly.
pub fn ensure_schema(conn: &mut DbConn, table: &str) -> Result<()> {
    let schema_sql = include_str!("schema.sql").replace("{table}", table);
    let statements = split_sql_statements(&schema_sql);

    for (idx, statement) in statements.iter().enumerate() {
        execute_sql(conn, statement)
            .with_context(|| format!("Failed to execute statement {}", idx + 1))?;
    }

    log::info!("Rating table '{}' is ready", table);
    Ok(())
}

fn split_sql_statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn execute_sql(conn: &mut DbConn, sql: &str) -> Result<()> {
    conn.execute(sql, [])
        .context("Failed to execute SQL statement")
        .map(|_| ())
}
