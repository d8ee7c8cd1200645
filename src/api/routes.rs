use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::api::handlers::{AppState, ratings};
use crate::catalog::CatalogClient;
use crate::database::LedgerStore;

pub fn create_router<L, C>(state: Arc<AppState<L, C>>) -> Router
where
    L: LedgerStore + Send + Sync + 'static,
    C: CatalogClient + Send + Sync + 'static,
{
    Router::new()
        .route("/api/rating/:dataset_id", get(ratings::get_rating::<L, C>))
        .route("/api/rating", post(ratings::post_rating::<L, C>))
        .with_state(state)
}
