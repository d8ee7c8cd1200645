use anyhow::Result as AnyResult;
use chrono::NaiveDateTime;
use regex::Regex;

use super::connection::{self, DbPool};
use super::models::{LedgerAggregate, RatingRecord};
use super::{ratings, setup};
use crate::config::LedgerSettings;
use crate::errors::LedgerError;
use crate::rating::Score;

const TABLE_NAME_PATTERN: &str = "^[A-Za-z_][A-Za-z0-9_]*$";

/// Durable store of one rating row per (user, dataset) pair
pub trait LedgerStore {
    /// Rewrites score and modified of an existing row. Returns rows affected.
    fn update_rating(
        &self,
        score: Score,
        modified: NaiveDateTime,
        user_id: &str,
        dataset_id: &str,
    ) -> Result<usize, LedgerError>;

    fn insert_rating(
        &self,
        user_id: &str,
        dataset_id: &str,
        score: Score,
        created: NaiveDateTime,
        modified: NaiveDateTime,
    ) -> Result<usize, LedgerError>;

    /// Count and mean score for a dataset, `None` when it has no rows
    fn aggregate_rating(&self, dataset_id: &str) -> Result<Option<LedgerAggregate>, LedgerError>;
}

/// SQLite-backed ledger
pub struct SqliteLedger {
    pool: DbPool,
    table: String,
}

impl SqliteLedger {
    pub fn new(pool: DbPool, table: &str) -> Result<Self, LedgerError> {
        if !is_valid_table_name(table) {
            return Err(LedgerError::InvalidTable(table.to_string()));
        }

        Ok(Self {
            pool,
            table: table.to_string(),
        })
    }

    /// Opens the database file from settings and makes sure the table exists
    pub fn open(settings: &LedgerSettings) -> AnyResult<Self> {
        let pool = connection::create_pool(&settings.database_path)?;
        let ledger = Self::new(pool, &settings.table)?;
        ledger.ensure_schema()?;
        Ok(ledger)
    }

    pub fn in_memory(table: &str) -> AnyResult<Self> {
        let pool = connection::create_memory_pool()?;
        let ledger = Self::new(pool, table)?;
        ledger.ensure_schema()?;
        Ok(ledger)
    }

    pub fn ensure_schema(&self) -> AnyResult<()> {
        let mut conn = connection::get_connection(&self.pool)?;
        setup::ensure_schema(&mut conn, &self.table)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn find_rating(
        &self,
        user_id: &str,
        dataset_id: &str,
    ) -> Result<Option<RatingRecord>, LedgerError> {
        let mut conn = connection::get_connection(&self.pool)?;
        ratings::find_rating(&mut conn, &self.table, user_id, dataset_id)
    }

    pub fn list_for_dataset(&self, dataset_id: &str) -> Result<Vec<RatingRecord>, LedgerError> {
        let mut conn = connection::get_connection(&self.pool)?;
        ratings::list_for_dataset(&mut conn, &self.table, dataset_id)
    }
}

impl LedgerStore for SqliteLedger {
    fn update_rating(
        &self,
        score: Score,
        modified: NaiveDateTime,
        user_id: &str,
        dataset_id: &str,
    ) -> Result<usize, LedgerError> {
        let mut conn = connection::get_connection(&self.pool)?;
        ratings::update_rating(&mut conn, &self.table, score.value(), modified, user_id, dataset_id)
    }

    fn insert_rating(
        &self,
        user_id: &str,
        dataset_id: &str,
        score: Score,
        created: NaiveDateTime,
        modified: NaiveDateTime,
    ) -> Result<usize, LedgerError> {
        let mut conn = connection::get_connection(&self.pool)?;
        ratings::insert_rating(
            &mut conn,
            &self.table,
            user_id,
            dataset_id,
            score.value(),
            created,
            modified,
        )
    }

    fn aggregate_rating(&self, dataset_id: &str) -> Result<Option<LedgerAggregate>, LedgerError> {
        let mut conn = connection::get_connection(&self.pool)?;
        ratings::aggregate_for_dataset(&mut conn, &self.table, dataset_id)
    }
}

fn is_valid_table_name(table: &str) -> bool {
    Regex::new(TABLE_NAME_PATTERN)
        .map(|re| re.is_match(table))
        .unwrap_or(false)
}
