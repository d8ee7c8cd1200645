use chrono::NaiveDateTime;
use rusqlite::{OptionalExtension, params};

use super::connection::DbConn;
use super::models::{LedgerAggregate, RatingRecord};
use crate::errors::LedgerError;

type Result<T> = std::result::Result<T, LedgerError>;

pub fn update_rating(
    conn: &mut DbConn,
    table: &str,
    score: u8,
    modified: NaiveDateTime,
    user_id: &str,
    dataset_id: &str,
) -> Result<usize> {
    let sql = format!(
        "UPDATE {} SET rating = ?1, modified = ?2 WHERE user_id = ?3 AND package_id = ?4",
        table
    );

    Ok(conn.execute(&sql, params![score, modified, user_id, dataset_id])?)
}

/// A concurrent insert for the same pair lands on the unique constraint and only
/// refreshes score and modified.
pub fn insert_rating(
    conn: &mut DbConn,
    table: &str,
    user_id: &str,
    dataset_id: &str,
    score: u8,
    created: NaiveDateTime,
    modified: NaiveDateTime,
) -> Result<usize> {
    let sql = format!(
        "INSERT INTO {} (user_id, package_id, rating, created, modified) VALUES (?1, ?2, ?3, ?4, ?5) \
         ON CONFLICT (user_id, package_id) DO UPDATE SET rating = excluded.rating, modified = excluded.modified",
        table
    );

    Ok(conn.execute(&sql, params![user_id, dataset_id, score, created, modified])?)
}

pub fn aggregate_for_dataset(
    conn: &mut DbConn,
    table: &str,
    dataset_id: &str,
) -> Result<Option<LedgerAggregate>> {
    let sql = format!(
        "SELECT package_id, COUNT(*) AS count, AVG(rating) AS rating FROM {} WHERE package_id = ?1 GROUP BY package_id",
        table
    );

    let aggregate = conn
        .query_row(&sql, params![dataset_id], |row| {
            Ok(LedgerAggregate {
                dataset_id: row.get(0)?,
                count: row.get(1)?,
                mean: row.get(2)?,
            })
        })
        .optional()?;

    Ok(aggregate)
}

fn parse_rating_row(row: &rusqlite::Row) -> rusqlite::Result<RatingRecord> {
    Ok(RatingRecord {
        user_id: row.get(0)?,
        dataset_id: row.get(1)?,
        score: row.get(2)?,
        created: row.get(3)?,
        modified: row.get(4)?,
    })
}

pub fn find_rating(
    conn: &mut DbConn,
    table: &str,
    user_id: &str,
    dataset_id: &str,
) -> Result<Option<RatingRecord>> {
    let sql = format!(
        "SELECT user_id, package_id, rating, created, modified FROM {} WHERE user_id = ?1 AND package_id = ?2",
        table
    );

    Ok(conn
        .query_row(&sql, params![user_id, dataset_id], parse_rating_row)
        .optional()?)
}

pub fn list_for_dataset(
    conn: &mut DbConn,
    table: &str,
    dataset_id: &str,
) -> Result<Vec<RatingRecord>> {
    let sql = format!(
        "SELECT user_id, package_id, rating, created, modified FROM {} WHERE package_id = ?1 ORDER BY modified DESC, user_id",
        table
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params![dataset_id], parse_rating_row)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(rows)
}
