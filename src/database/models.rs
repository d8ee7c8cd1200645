use chrono::NaiveDateTime;
use serde::Serialize;

/// One ledger row: the live vote of a user on a dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingRecord {
    pub user_id: String,
    pub dataset_id: String,
    pub score: i64,
    pub created: NaiveDateTime,
    pub modified: NaiveDateTime,
}

/// Grouped ledger aggregate as the driver returns it
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerAggregate {
    pub dataset_id: String,
    pub count: i64,
    pub mean: f64,
}
