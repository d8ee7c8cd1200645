use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct PostRatingRequest {
    pub dataset: String,
    #[serde(default)]
    pub user: String,
    pub rating: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}
