use thiserror::Error;

/// Failures raised by the catalog API client
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("catalog returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("catalog API error {error_type}: {message}")]
    Api { error_type: String, message: String },

    #[error("dataset '{0}' not found in catalog")]
    NotFound(String),

    #[error("failed to decode catalog response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failures raised by the rating ledger
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to get ledger connection: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("ledger query failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid ledger table name '{0}'")]
    InvalidTable(String),

    #[error("ledger returned out-of-domain value: {0}")]
    OutOfDomain(String),
}

/// Every way a rating read or write can fail
#[derive(Debug, Error)]
pub enum RatingError {
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("failed to fetch dataset '{dataset_id}': {source}")]
    RemoteFetch {
        dataset_id: String,
        #[source]
        source: CatalogError,
    },

    #[error("failed to update dataset '{dataset_id}': {source}")]
    RemoteUpdate {
        dataset_id: String,
        #[source]
        source: CatalogError,
    },

    #[error("ledger failure for dataset '{dataset_id}' (user {user_id:?}): {source}")]
    Ledger {
        dataset_id: String,
        user_id: Option<String>,
        #[source]
        source: LedgerError,
    },

    #[error("no aggregate for dataset '{dataset_id}': {reason}")]
    Aggregation { dataset_id: String, reason: String },

    #[error("rating {value} is out of range 0-5")]
    Invariant { value: f64 },
}

impl RatingError {
    /// Stable label for logs and API responses
    pub fn kind(&self) -> &'static str {
        match self {
            RatingError::Validation { .. } => "validation_error",
            RatingError::RemoteFetch { .. } => "remote_fetch_error",
            RatingError::RemoteUpdate { .. } => "remote_update_error",
            RatingError::Ledger { .. } => "ledger_error",
            RatingError::Aggregation { .. } => "aggregation_error",
            RatingError::Invariant { .. } => "invariant_error",
        }
    }

    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        RatingError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RatingError::RemoteFetch {
                source: CatalogError::NotFound(_),
                ..
            }
        )
    }
}
