use serde::{Deserialize, Serialize};

use crate::database::LedgerAggregate;
use crate::errors::{LedgerError, RatingError};

pub const MIN_SCORE: i64 = 1;
pub const MAX_SCORE: i64 = 5;

/// A single vote, guaranteed to be within 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Score(u8);

impl Score {
    pub fn new(value: i64) -> Result<Self, RatingError> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
            return Err(RatingError::validation(
                "score",
                format!("Rating must be in [1,2,3,4,5], got {}", value),
            ));
        }
        // lossless: range checked above
        Ok(Score(value as u8))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// Public view of a dataset's crowd rating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingSummary {
    #[serde(rename = "dataset")]
    pub dataset_id: String,
    pub count: u32,
    pub rating: u8,
}

impl RatingSummary {
    pub fn new(dataset_id: &str, count: u32, rating: u8) -> Self {
        Self {
            dataset_id: dataset_id.to_string(),
            count,
            rating,
        }
    }
}

/// Ledger aggregate converted into the rating domain
#[derive(Debug, Clone, PartialEq)]
pub struct RatingAggregate {
    pub count: u32,
    pub average: f64,
}

impl RatingAggregate {
    /// A zero count means the dataset has no rows. A negative or oversized count and a
    /// non-finite mean are values the ledger should never produce.
    pub fn from_ledger(aggregate: LedgerAggregate) -> Result<Self, RatingError> {
        if aggregate.count == 0 {
            return Err(RatingError::Aggregation {
                dataset_id: aggregate.dataset_id,
                reason: "ledger returned an empty group".to_string(),
            });
        }

        let count = match u32::try_from(aggregate.count) {
            Ok(count) => count,
            Err(_) => {
                let detail = format!("rating count {}", aggregate.count);
                return Err(out_of_domain(aggregate.dataset_id, detail));
            }
        };

        if !aggregate.mean.is_finite() {
            let detail = format!("rating mean {}", aggregate.mean);
            return Err(out_of_domain(aggregate.dataset_id, detail));
        }

        Ok(Self {
            count,
            average: aggregate.mean,
        })
    }
}

fn out_of_domain(dataset_id: String, detail: String) -> RatingError {
    RatingError::Ledger {
        dataset_id,
        user_id: None,
        source: LedgerError::OutOfDomain(detail),
    }
}
