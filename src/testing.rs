//! In-process collaborators for exercising the engine without a catalog server.

use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::catalog::{CatalogClient, Dataset};
use crate::database::{LedgerAggregate, LedgerStore};
use crate::errors::{CatalogError, LedgerError};
use crate::rating::Score;

/// Catalog that keeps documents in memory and counts calls
#[derive(Default)]
pub struct MemoryCatalog {
    datasets: Mutex<HashMap<String, Dataset>>,
    fetches: AtomicUsize,
    updates: AtomicUsize,
    fail_updates: AtomicBool,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, dataset: Dataset) {
        let id = dataset.id().unwrap_or_default().to_string();
        self.datasets.lock().unwrap().insert(id, dataset);
    }

    pub fn get(&self, dataset_id: &str) -> Option<Dataset> {
        self.datasets.lock().unwrap().get(dataset_id).cloned()
    }

    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

impl CatalogClient for MemoryCatalog {
    fn fetch_dataset(&self, dataset_id: &str) -> Result<Dataset, CatalogError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.get(dataset_id)
            .ok_or_else(|| CatalogError::NotFound(dataset_id.to_string()))
    }

    fn update_dataset(&self, dataset: &Dataset) -> Result<Dataset, CatalogError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(CatalogError::Status {
                status: 503,
                body: "catalog unavailable".to_string(),
            });
        }
        self.insert(dataset.clone());
        Ok(dataset.clone())
    }
}

/// Ledger wrapper that counts every call reaching the store
pub struct CountingLedger<L> {
    inner: L,
    calls: AtomicUsize,
}

impl<L> CountingLedger<L> {
    pub fn new(inner: L) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl<L: LedgerStore> LedgerStore for CountingLedger<L> {
    fn update_rating(
        &self,
        score: Score,
        modified: NaiveDateTime,
        user_id: &str,
        dataset_id: &str,
    ) -> Result<usize, LedgerError> {
        self.record();
        self.inner.update_rating(score, modified, user_id, dataset_id)
    }

    fn insert_rating(
        &self,
        user_id: &str,
        dataset_id: &str,
        score: Score,
        created: NaiveDateTime,
        modified: NaiveDateTime,
    ) -> Result<usize, LedgerError> {
        self.record();
        self.inner
            .insert_rating(user_id, dataset_id, score, created, modified)
    }

    fn aggregate_rating(&self, dataset_id: &str) -> Result<Option<LedgerAggregate>, LedgerError> {
        self.record();
        self.inner.aggregate_rating(dataset_id)
    }
}

/// What `ScriptedLedger` answers once the vote has been written
#[derive(Debug, Clone, Copy)]
pub enum AggregateScript {
    Missing,
    Mean(f64),
    Fail,
}

/// Ledger that accepts every vote and answers the aggregate query from a script
pub struct ScriptedLedger {
    script: AggregateScript,
}

impl ScriptedLedger {
    pub fn new(script: AggregateScript) -> Self {
        Self { script }
    }
}

impl LedgerStore for ScriptedLedger {
    fn update_rating(
        &self,
        _score: Score,
        _modified: NaiveDateTime,
        _user_id: &str,
        _dataset_id: &str,
    ) -> Result<usize, LedgerError> {
        Ok(0)
    }

    fn insert_rating(
        &self,
        _user_id: &str,
        _dataset_id: &str,
        _score: Score,
        _created: NaiveDateTime,
        _modified: NaiveDateTime,
    ) -> Result<usize, LedgerError> {
        Ok(1)
    }

    fn aggregate_rating(&self, dataset_id: &str) -> Result<Option<LedgerAggregate>, LedgerError> {
        match self.script {
            AggregateScript::Missing => Ok(None),
            AggregateScript::Mean(mean) => Ok(Some(LedgerAggregate {
                dataset_id: dataset_id.to_string(),
                count: 1,
                mean,
            })),
            AggregateScript::Fail => Err(LedgerError::Sqlite(rusqlite::Error::InvalidQuery)),
        }
    }
}
