use chrono::{NaiveDateTime, Utc};
use log::{debug, info, warn};
use serde_json::{Value, json};

use super::rounding::round_average;
use super::types::{RatingAggregate, RatingSummary, Score};
use crate::catalog::{CatalogClient, Dataset, spatial};
use crate::database::LedgerStore;
use crate::errors::RatingError;

pub const RATING_COUNT_KEY: &str = "rating_count";
pub const RATING_AVERAGE_INT_KEY: &str = "rating_average_int";
pub const RATING_AVERAGE_KEY: &str = "rating_average";

/// Reads and writes dataset ratings, keeping the ledger and the catalog's
/// rating extras in step. Holds no state between calls.
pub struct RatingEngine<L, C> {
    ledger: L,
    catalog: C,
}

impl<L, C> RatingEngine<L, C>
where
    L: LedgerStore,
    C: CatalogClient,
{
    pub fn new(ledger: L, catalog: C) -> Self {
        Self { ledger, catalog }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Current rating as mirrored on the dataset's extras. Missing or malformed
    /// fields read as 0.
    pub fn get_rating(&self, dataset_id: &str) -> Result<RatingSummary, RatingError> {
        validate_dataset_id(dataset_id)?;

        let dataset = self.fetch_dataset(dataset_id)?;
        let count = read_count(&dataset);
        let rating = read_rounded_average(&dataset);
        debug!("current count: {} average: {} [{}]", count, rating, dataset_id);

        Ok(RatingSummary::new(dataset_id, count, rating))
    }

    /// Records `user_id`'s vote on the dataset and pushes the new aggregate to the catalog.
    ///
    /// The ledger write is never rolled back: if the final catalog update fails the
    /// two stores stay out of step until the next successful call.
    pub fn post_rating(
        &self,
        dataset_id: &str,
        user_id: &str,
        score: i64,
    ) -> Result<RatingSummary, RatingError> {
        let score = Score::new(score)?;
        validate_user_id(user_id)?;
        validate_dataset_id(dataset_id)?;

        let mut dataset = self.fetch_dataset(dataset_id)?;
        let geometry = spatial::normalize_spatial_extra(&mut dataset);

        let now = Utc::now().naive_utc();
        self.upsert_vote(dataset_id, user_id, score, now)?;

        let aggregate = self.recompute_aggregate(dataset_id, user_id)?;
        let rounded = round_average(aggregate.average)?;

        merge_rating_extras(&mut dataset, &aggregate, rounded);
        if let Some(geometry) = geometry {
            spatial::finalize_spatial(&mut dataset, &geometry);
        }

        self.push_dataset(dataset_id, &dataset)?;
        info!(
            "rating updated: avg {} count {} [{}]",
            rounded, aggregate.count, dataset_id
        );

        Ok(RatingSummary::new(dataset_id, aggregate.count, rounded))
    }

    // --- Helper Methods ---

    fn fetch_dataset(&self, dataset_id: &str) -> Result<Dataset, RatingError> {
        self.catalog
            .fetch_dataset(dataset_id)
            .map_err(|source| RatingError::RemoteFetch {
                dataset_id: dataset_id.to_string(),
                source,
            })
    }

    fn upsert_vote(
        &self,
        dataset_id: &str,
        user_id: &str,
        score: Score,
        now: NaiveDateTime,
    ) -> Result<(), RatingError> {
        let ledger_error = |source| RatingError::Ledger {
            dataset_id: dataset_id.to_string(),
            user_id: Some(user_id.to_string()),
            source,
        };

        let updated = self
            .ledger
            .update_rating(score, now, user_id, dataset_id)
            .map_err(ledger_error)?;

        if updated == 0 {
            debug!(
                "No existing rating found for user '{}' on dataset '{}'. Need to create a new one",
                user_id, dataset_id
            );
            self.ledger
                .insert_rating(user_id, dataset_id, score, now, now)
                .map_err(ledger_error)?;
        }

        Ok(())
    }

    fn recompute_aggregate(
        &self,
        dataset_id: &str,
        user_id: &str,
    ) -> Result<RatingAggregate, RatingError> {
        let aggregate = self
            .ledger
            .aggregate_rating(dataset_id)
            .map_err(|source| RatingError::Ledger {
                dataset_id: dataset_id.to_string(),
                user_id: Some(user_id.to_string()),
                source,
            })?
            .ok_or_else(|| RatingError::Aggregation {
                dataset_id: dataset_id.to_string(),
                reason: "no ledger rows after upsert".to_string(),
            })?;

        RatingAggregate::from_ledger(aggregate)
    }

    fn push_dataset(&self, dataset_id: &str, dataset: &Dataset) -> Result<(), RatingError> {
        match self.catalog.update_dataset(dataset) {
            Ok(updated) => {
                debug!("catalog accepted update of {:?}", updated.id());
                Ok(())
            }
            Err(source) => {
                warn!(
                    "ledger updated but catalog push failed for dataset '{}': {}",
                    dataset_id, source
                );
                Err(RatingError::RemoteUpdate {
                    dataset_id: dataset_id.to_string(),
                    source,
                })
            }
        }
    }
}

/// Writes the three rating fields into the extras, in place when present.
pub fn merge_rating_extras(dataset: &mut Dataset, aggregate: &RatingAggregate, rounded: u8) {
    dataset
        .extras
        .upsert(RATING_COUNT_KEY, json!(aggregate.count));
    dataset
        .extras
        .upsert(RATING_AVERAGE_INT_KEY, json!(rounded));
    dataset
        .extras
        .upsert(RATING_AVERAGE_KEY, average_value(aggregate.average));
}

fn average_value(average: f64) -> Value {
    serde_json::Number::from_f64(average)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn read_count(dataset: &Dataset) -> u32 {
    dataset
        .extras
        .integer_value(RATING_COUNT_KEY)
        .and_then(|c| u32::try_from(c).ok())
        .unwrap_or(0)
}

fn read_rounded_average(dataset: &Dataset) -> u8 {
    dataset
        .extras
        .integer_value(RATING_AVERAGE_INT_KEY)
        .and_then(|r| u8::try_from(r).ok())
        .filter(|&r| r <= 5)
        .unwrap_or(0)
}

fn validate_user_id(user_id: &str) -> Result<(), RatingError> {
    if user_id.is_empty() {
        return Err(RatingError::validation("user_id", "User is mandatory"));
    }
    Ok(())
}

fn validate_dataset_id(dataset_id: &str) -> Result<(), RatingError> {
    if dataset_id.is_empty() {
        return Err(RatingError::validation("dataset_id", "Dataset is mandatory"));
    }
    Ok(())
}
