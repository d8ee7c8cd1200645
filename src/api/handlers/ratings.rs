use axum::{
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use log::{error, warn};
use std::sync::Arc;
use tokio::task::JoinError;

use super::AppState;
use crate::api::models::{ErrorBody, PostRatingRequest};
use crate::catalog::CatalogClient;
use crate::database::LedgerStore;
use crate::errors::RatingError;
use crate::rating::RatingSummary;

pub async fn get_rating<L, C>(
    State(state): State<Arc<AppState<L, C>>>,
    Path(dataset_id): Path<String>,
) -> Response
where
    L: LedgerStore + Send + Sync + 'static,
    C: CatalogClient + Send + Sync + 'static,
{
    let result = tokio::task::spawn_blocking(move || state.engine.get_rating(&dataset_id)).await;
    rating_response(result)
}

pub async fn post_rating<L, C>(
    State(state): State<Arc<AppState<L, C>>>,
    payload: Result<Json<PostRatingRequest>, JsonRejection>,
) -> Response
where
    L: LedgerStore + Send + Sync + 'static,
    C: CatalogClient + Send + Sync + 'static,
{
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(&rejection),
    };

    let result = tokio::task::spawn_blocking(move || {
        state
            .engine
            .post_rating(&request.dataset, &request.user, request.rating)
    })
    .await;
    rating_response(result)
}

fn rating_response(result: Result<Result<RatingSummary, RatingError>, JoinError>) -> Response {
    match result {
        Ok(Ok(summary)) => Json(summary).into_response(),
        Ok(Err(e)) => error_response(&e),
        Err(e) => {
            error!("Rating task failed: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: "internal_error".to_string(),
                    message: "rating task failed".to_string(),
                }),
            )
                .into_response()
        }
    }
}

fn rejection_response(rejection: &JsonRejection) -> Response {
    warn!("rejected rating request: {}", rejection.body_text());
    let body = ErrorBody {
        error: "validation_error".to_string(),
        message: rejection.body_text(),
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

fn error_response(err: &RatingError) -> Response {
    let status = status_for(err);
    if status.is_server_error() {
        error!("{}: {}", err.kind(), err);
    } else {
        warn!("{}: {}", err.kind(), err);
    }

    let body = ErrorBody {
        error: err.kind().to_string(),
        message: err.to_string(),
    };
    (status, Json(body)).into_response()
}

fn status_for(err: &RatingError) -> StatusCode {
    match err {
        RatingError::Validation { .. } => StatusCode::BAD_REQUEST,
        e if e.is_not_found() => StatusCode::NOT_FOUND,
        RatingError::RemoteFetch { .. } | RatingError::RemoteUpdate { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::routes::create_router;
    use crate::database::SqliteLedger;
    use crate::rating::RatingEngine;
    use crate::testing::MemoryCatalog;
    use axum::body::Body;
    use axum::http::{Request, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn test_state() -> Arc<AppState<SqliteLedger, MemoryCatalog>> {
        let catalog = MemoryCatalog::new();
        catalog.insert(
            serde_json::from_value(json!({
                "id": "ds-1",
                "extras": [
                    {"key": "rating_count", "value": "2"},
                    {"key": "rating_average_int", "value": "3"},
                ]
            }))
            .unwrap(),
        );
        let ledger = SqliteLedger::in_memory("package_rating").unwrap();
        Arc::new(AppState::new(RatingEngine::new(ledger, catalog)))
    }

    async fn send(state: Arc<AppState<SqliteLedger, MemoryCatalog>>, request: Request<Body>) -> (StatusCode, Value) {
        let response = create_router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/rating")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(path: &str) -> Request<Body> {
        Request::builder().uri(path).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_get_rating_route() {
        let (status, body) = send(test_state(), get("/api/rating/ds-1")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"dataset": "ds-1", "count": 2, "rating": 3}));
    }

    #[tokio::test]
    async fn test_get_unknown_dataset_is_404() {
        let (status, body) = send(test_state(), get("/api/rating/missing")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "remote_fetch_error");
    }

    #[tokio::test]
    async fn test_post_rating_route() {
        let state = test_state();
        let (status, body) = send(
            Arc::clone(&state),
            post(json!({"dataset": "ds-1", "user": "alice", "rating": 4})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"dataset": "ds-1", "count": 1, "rating": 4}));

        let (_, body) = send(state, get("/api/rating/ds-1")).await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["rating"], 4);
    }

    #[tokio::test]
    async fn test_post_invalid_score_is_400() {
        let (status, body) = send(
            test_state(),
            post(json!({"dataset": "ds-1", "user": "alice", "rating": 6})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_post_without_user_is_400() {
        let (status, body) = send(test_state(), post(json!({"dataset": "ds-1", "rating": 3}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_post_malformed_bodies_are_400_json() {
        for body in [
            json!({"user": "alice", "rating": 3}),
            json!({"dataset": "ds-1", "user": "alice"}),
            json!({"dataset": "ds-1", "user": "alice", "rating": "four"}),
            json!({"dataset": "ds-1", "user": "alice", "rating": 3.5}),
        ] {
            let (status, response) = send(test_state(), post(body.clone())).await;

            assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", body);
            assert_eq!(response["error"], "validation_error");
            assert!(response["message"].is_string());
        }
    }

    #[tokio::test]
    async fn test_post_non_json_body_is_400_json() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/rating")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("dataset=ds-1"))
            .unwrap();

        let (status, response) = send(test_state(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "validation_error");
    }

    #[test]
    fn test_status_mapping() {
        use crate::errors::CatalogError;

        let update_failure = RatingError::RemoteUpdate {
            dataset_id: "d".to_string(),
            source: CatalogError::Status {
                status: 503,
                body: String::new(),
            },
        };
        assert_eq!(status_for(&update_failure), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status_for(&RatingError::Invariant { value: 6.0 }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
